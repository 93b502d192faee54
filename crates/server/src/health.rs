use api_types::{ApiInfo, Health};
use axum::Json;

pub async fn root() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Family Money App API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
    })
}
