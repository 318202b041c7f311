//! Read grouped cell sets into the public record shapes.
//!
//! Every projection is total: a missing family or qualifier becomes `None`
//! (or an empty string / map), never an error.
use std::collections::BTreeMap;

use super::GroupedCellSet;
use crate::models::{
    ConditionEntry, Demographics, LabReport, PatientSummary, Prescription, Visit,
};
use crate::schema::{FieldShape, RecordKind};

/// The family a nested field is flattened into.
fn nested_family(kind: RecordKind, field: &str) -> Option<&'static str> {
    kind.schema()
        .route(field)
        .filter(|route| matches!(route.shape, FieldShape::Nested { .. }))
        .map(|route| route.family)
}

fn nested(grouped: &GroupedCellSet, kind: RecordKind, field: &str) -> BTreeMap<String, String> {
    nested_family(kind, field)
        .and_then(|family| grouped.family(family))
        .cloned()
        .unwrap_or_default()
}

/// One line of the patient list. `row_key` is the decoded row key.
pub fn summary(row_key: &str, grouped: &GroupedCellSet) -> PatientSummary {
    let schema = RecordKind::Patient.schema();
    let text = |field| grouped.field(schema, field).unwrap_or_default();
    PatientSummary {
        patient_id: row_key.to_owned(),
        first_name: text("first_name"),
        last_name: text("last_name"),
        age: text("age"),
        gender: text("gender"),
        phone: text("phone"),
        email: text("email"),
    }
}

pub fn demographics(grouped: &GroupedCellSet) -> Demographics {
    let schema = RecordKind::Patient.schema();
    let field = |name| grouped.field(schema, name);
    Demographics {
        first_name: field("first_name"),
        last_name: field("last_name"),
        date_of_birth: field("date_of_birth"),
        age: field("age"),
        gender: field("gender"),
        blood_type: field("blood_type"),
        phone: field("phone"),
        email: field("email"),
        address: field("address"),
        emergency_contact: nested(grouped, RecordKind::Patient, "emergency_contact"),
    }
}

pub fn condition(grouped: &GroupedCellSet) -> ConditionEntry {
    let schema = RecordKind::MedicalHistory.schema();
    let field = |name| grouped.field(schema, name);
    ConditionEntry {
        condition: field("condition"),
        diagnosed_date: field("diagnosed_date"),
        status: field("status"),
        severity: field("severity"),
        notes: field("notes"),
    }
}

pub fn prescription(grouped: &GroupedCellSet) -> Prescription {
    let schema = RecordKind::Prescription.schema();
    let field = |name| grouped.field(schema, name);
    Prescription {
        medication: field("medication"),
        dosage: field("dosage"),
        frequency: field("frequency"),
        prescribed_date: field("prescribed_date"),
        prescribing_doctor: field("prescribing_doctor"),
        status: field("status"),
    }
}

pub fn lab_report(grouped: &GroupedCellSet) -> LabReport {
    let schema = RecordKind::LabReport.schema();
    let field = |name| grouped.field(schema, name);
    LabReport {
        test_date: field("test_date"),
        test_type: field("test_type"),
        results: nested(grouped, RecordKind::LabReport, "results"),
        ordered_by: field("ordered_by"),
    }
}

pub fn visit(grouped: &GroupedCellSet) -> Visit {
    let schema = RecordKind::Visit.schema();
    let field = |name| grouped.field(schema, name);
    Visit {
        visit_date: field("visit_date"),
        visit_type: field("visit_type"),
        doctor: field("doctor"),
        chief_complaint: field("chief_complaint"),
        diagnosis: field("diagnosis"),
        treatment_plan: field("treatment_plan"),
    }
}
