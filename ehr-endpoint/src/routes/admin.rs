//! Store setup and sample data routes
use actix_web::{web::Data, HttpResponse};
use serde_json::json;

use ehr_common::records::{SampleLoadOutcome, TableInitOutcome};
use ehr_common::sample::sample_patients;
use ehr_common::schema::RecordKind;

use crate::error::ApiResult;
use crate::server::AppState;

/// Handle the `/api/test-hbase` route
pub async fn test_store_route(state: Data<AppState>) -> ApiResult<HttpResponse> {
    let cluster_info = state
        .records
        .cluster_version()
        .await
        .map_err(|e| state.fail("HBase connection failed", e))?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "hbase_status": "connected",
        "cluster_info": cluster_info,
    })))
}

/// Handle the `/api/init-tables` route
pub async fn init_tables_route(state: Data<AppState>) -> HttpResponse {
    let results = state.records.init_tables().await;
    let failed = results
        .iter()
        .filter(|r| matches!(r.outcome, TableInitOutcome::Error { .. }))
        .count();
    if failed > 0 {
        warn!("{} of {} tables failed to initialize", failed, results.len());
    }
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "HBase tables initialization completed",
        "results": results,
    }))
}

/// Handle the `/api/sample-data` route
pub async fn sample_data_route() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "sample_patients": sample_patients() }))
}

/// Handle the `/api/load-sample-data` route
pub async fn load_sample_data_route(state: Data<AppState>) -> HttpResponse {
    let results = state.records.load_sample_data(&sample_patients()).await;
    for result in &results {
        if result.outcome == SampleLoadOutcome::Added {
            state.record_written(RecordKind::Patient);
        }
    }
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Sample data loading completed",
        "results": results,
    }))
}
