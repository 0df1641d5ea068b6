use axum::{
    Router,
    routing::{get, post, put},
};
use clap::Parser;
use std::sync::Arc;

mod auth;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod payment_status;
mod rate_limit;
mod state;
mod store;

use config::Args;
use state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() {
    // parse cli arguments
    let args = Args::parse();

    // creating shared state
    let state = Arc::new(AppState::new(&args));

    // creating the router with routes
    let app = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/auth/register", post(handlers::register_handler))
        .route("/api/auth/login", post(handlers::login_handler))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route("/api/auth/me", get(handlers::me_handler))
        .route(
            "/api/user/profile",
            get(handlers::get_profile_handler).put(handlers::update_profile_handler),
        )
        .route(
            "/api/user/change-password",
            post(handlers::change_password_handler),
        )
        .route("/api/user/avatar", put(handlers::update_avatar_handler))
        .route(
            "/api/employees",
            get(handlers::list_employees_handler).post(handlers::create_employee_handler),
        )
        .route(
            "/api/employees/{id}",
            get(handlers::get_employee_handler)
                .put(handlers::update_employee_handler)
                .delete(handlers::delete_employee_handler),
        )
        .route(
            "/api/work-records",
            get(handlers::list_work_records_handler).post(handlers::create_work_record_handler),
        )
        .route(
            "/api/work-records/{id}",
            put(handlers::update_work_record_handler).delete(handlers::delete_work_record_handler),
        )
        .route(
            "/api/payments",
            get(handlers::list_payments_handler).post(handlers::create_payment_handler),
        )
        .route(
            "/api/payments/status",
            get(handlers::payment_status_handler).post(handlers::mark_paid_handler),
        )
        .route(
            "/api/payments/{id}",
            get(handlers::get_payment_handler).put(handlers::update_payment_handler),
        )
        .route(
            "/api/dispatch",
            get(handlers::list_dispatches_handler).post(handlers::create_dispatch_handler),
        )
        .route(
            "/api/configurations",
            get(handlers::list_configurations_handler).post(handlers::set_configuration_handler),
        )
        .route("/api/dashboard", get(handlers::dashboard_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    println!("ARECA backend running on http://localhost:{}", args.port);
    println!(
        "Auth rate limit: {} requests per {} seconds",
        args.auth_rate_limit, args.auth_rate_window
    );
    println!(
        "API rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    axum::serve(listener, app).await.unwrap();
}
