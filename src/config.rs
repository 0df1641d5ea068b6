use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "areca-backend")]
#[command(about = "Business management backend for areca collection tracking")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // General API rate limit: max requests per window
    #[arg(long, default_value_t = 200)]
    pub rate_limit: u32,

    // General API rate limit window in seconds
    #[arg(long, default_value_t = 900)]
    pub rate_window: u64,

    // Auth rate limit: max attempts per window
    #[arg(long, default_value_t = 20)]
    pub auth_rate_limit: u32,

    // Auth rate limit window in seconds
    #[arg(long, default_value_t = 900)]
    pub auth_rate_window: u64,
}
