//! Patient record routes
use actix_web::{
    web::{Data, Json, Path},
    HttpResponse,
};
use serde_json::json;

use ehr_common::models::{Fields, NewPatient};
use ehr_common::schema::RecordKind;

use crate::error::ApiResult;
use crate::server::AppState;

/// Handle the `GET /api/patients` route
pub async fn list_patients_route(state: Data<AppState>) -> ApiResult<HttpResponse> {
    let patients = state
        .records
        .list_patients()
        .await
        .map_err(|e| state.fail("Failed to fetch patients", e))?;
    state.record_read(RecordKind::Patient);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": patients.len(),
        "patients": patients,
    })))
}

/// Handle the `POST /api/patients` route
pub async fn add_patient_route(
    state: Data<AppState>,
    patient: Json<NewPatient>,
) -> ApiResult<HttpResponse> {
    const FAILED: &str = "Failed to add patient";
    let (patient_id, demographics) = patient
        .into_inner()
        .validate()
        .map_err(|e| state.fail(FAILED, e.into()))?;
    state
        .records
        .add_patient(&patient_id, &demographics)
        .await
        .map_err(|e| state.fail(FAILED, e))?;
    state.record_written(RecordKind::Patient);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "patient_id": patient_id,
        "message": "Patient added successfully",
    })))
}

/// Handle the `GET /api/patients/{patient_id}` route
pub async fn get_patient_route(
    state: Data<AppState>,
    patient_id: Path<String>,
) -> ApiResult<HttpResponse> {
    let patient = state
        .records
        .get_patient(&patient_id)
        .await
        .map_err(|e| state.fail("Failed to fetch patient record", e))?;
    state.record_read(RecordKind::Patient);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "patient": patient,
    })))
}

/// Append a sub-record and report the generated row key.
async fn add_sub_record(
    state: Data<AppState>,
    kind: RecordKind,
    owner: &str,
    input: Fields,
    failed: &'static str,
    added: &'static str,
) -> ApiResult<HttpResponse> {
    let record_id = state
        .records
        .add_sub_record(kind, owner, &input)
        .await
        .map_err(|e| state.fail(failed, e))?;
    state.record_written(kind);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": added,
        "record_id": record_id,
    })))
}

/// Handle the `POST /api/patients/{patient_id}/medical-history` route
pub async fn add_condition_route(
    state: Data<AppState>,
    patient_id: Path<String>,
    input: Json<Fields>,
) -> ApiResult<HttpResponse> {
    add_sub_record(
        state,
        RecordKind::MedicalHistory,
        &patient_id,
        input.into_inner(),
        "Failed to add medical condition",
        "Medical condition added successfully",
    )
    .await
}

/// Handle the `POST /api/patients/{patient_id}/prescriptions` route
pub async fn add_prescription_route(
    state: Data<AppState>,
    patient_id: Path<String>,
    input: Json<Fields>,
) -> ApiResult<HttpResponse> {
    add_sub_record(
        state,
        RecordKind::Prescription,
        &patient_id,
        input.into_inner(),
        "Failed to add prescription",
        "Prescription added successfully",
    )
    .await
}

/// Handle the `POST /api/patients/{patient_id}/lab-reports` route
pub async fn add_lab_report_route(
    state: Data<AppState>,
    patient_id: Path<String>,
    input: Json<Fields>,
) -> ApiResult<HttpResponse> {
    add_sub_record(
        state,
        RecordKind::LabReport,
        &patient_id,
        input.into_inner(),
        "Failed to add lab report",
        "Lab report added successfully",
    )
    .await
}

/// Handle the `POST /api/patients/{patient_id}/visits` route
pub async fn add_visit_route(
    state: Data<AppState>,
    patient_id: Path<String>,
    input: Json<Fields>,
) -> ApiResult<HttpResponse> {
    add_sub_record(
        state,
        RecordKind::Visit,
        &patient_id,
        input.into_inner(),
        "Failed to add visit",
        "Visit added successfully",
    )
    .await
}
