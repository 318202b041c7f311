//! Dashboard statistics and patient search routes
use actix_web::{
    web::{Data, Query},
    HttpResponse,
};
use serde_derive::Deserialize;
use serde_json::json;

use ehr_common::dashboard::{condition_options, global_search, DashboardStats, PatientFilter};
use ehr_common::models::PatientSummary;
use ehr_common::schema::RecordKind;

use crate::error::ApiResult;
use crate::server::AppState;

/// Query string of the search route. `q` selects the global search and
/// ignores the other criteria.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(flatten)]
    pub filter: PatientFilter,
    #[serde(default)]
    pub q: Option<String>,
}

/// Handle the `/api/dashboard` route
pub async fn dashboard_route(state: Data<AppState>) -> ApiResult<HttpResponse> {
    let patients = state
        .records
        .all_records()
        .await
        .map_err(|e| state.fail("Failed to load dashboard", e))?;
    state.record_read(RecordKind::Patient);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "stats": DashboardStats::collect(&patients),
        "condition_options": condition_options(&patients),
    })))
}

/// Handle the `/api/patients/search` route
pub async fn search_route(
    state: Data<AppState>,
    query: Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    let patients = state
        .records
        .all_records()
        .await
        .map_err(|e| state.fail("Failed to search patients", e))?;
    state.record_read(RecordKind::Patient);
    let found = match &query.q {
        Some(keyword) => global_search(&patients, keyword),
        None => query.filter.apply(&patients),
    };
    let summaries: Vec<PatientSummary> = found.into_iter().map(|p| p.summary()).collect();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": summaries.len(),
        "patients": summaries,
    })))
}
