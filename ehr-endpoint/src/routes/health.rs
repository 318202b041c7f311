//! Health and Dockerflow routes
use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use serde_json::json;

use ehr_common::util::now_rfc3339;

use crate::server::AppState;

/// Handle the `/health` and `/__heartbeat__` routes
pub async fn health_route(state: Data<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": now_rfc3339(),
        "hbase_url": state.settings.store_url,
        "uptime": state.started.elapsed().as_secs_f64(),
    }))
}

/// Handle the `/status` route
pub async fn status_route() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handle the `/__lbheartbeat__` route
pub async fn lb_heartbeat_route() -> HttpResponse {
    // Used by the load balancers, just return OK.
    HttpResponse::Ok().finish()
}
