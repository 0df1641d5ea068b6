use prometheus::{Encoder, TextEncoder};

use crate::error::{ApiError, ApiResult};

// metrics endpoint for prometheus scraping
pub async fn metrics_handler() -> ApiResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| ApiError::Internal(format!("Failed to encode metrics: {}", e)))
}
