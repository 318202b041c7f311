//! Public record shapes, as accepted from and returned to API callers.
use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mapper::ValidationError;
use crate::schema::{RecordKind, OWNER_QUALIFIER};

/// A free-form input record: field name to scalar or one level object.
pub type Fields = Map<String, Value>;

/// Request body for creating a patient.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewPatient {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub demographics: Option<Fields>,
}

impl NewPatient {
    /// Both the identifier and the demographics are required.
    pub fn validate(self) -> Result<(String, Fields), ValidationError> {
        let patient_id = self.patient_id.filter(|id| !id.is_empty());
        match (patient_id, self.demographics) {
            (Some(id), Some(demographics)) => Ok((id, demographics)),
            (id, demographics) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push(OWNER_QUALIFIER.to_owned());
                }
                if demographics.is_none() {
                    missing.push("demographics".to_owned());
                }
                Err(ValidationError::new(RecordKind::Patient, missing))
            }
        }
    }
}

/// One line of the patient list.
///
/// Unset fields are empty strings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub emergency_contact: BTreeMap<String, String>,
}

/// A medical history entry
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConditionEntry {
    pub condition: Option<String>,
    pub diagnosed_date: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Prescription {
    pub medication: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub prescribed_date: Option<String>,
    pub prescribing_doctor: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct LabReport {
    pub test_date: Option<String>,
    pub test_type: Option<String>,
    /// Test name to result. A report stored from a plain value has the
    /// single entry `result`.
    #[serde(default)]
    pub results: BTreeMap<String, String>,
    pub ordered_by: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Visit {
    pub visit_date: Option<String>,
    pub visit_type: Option<String>,
    pub doctor: Option<String>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment_plan: Option<String>,
}

/// Everything stored for one patient.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PatientRecord {
    pub patient_id: String,
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub medical_history: Vec<ConditionEntry>,
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    #[serde(default)]
    pub lab_reports: Vec<LabReport>,
    #[serde(default)]
    pub visits: Vec<Visit>,
}

impl PatientRecord {
    pub fn summary(&self) -> PatientSummary {
        let d = &self.demographics;
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        PatientSummary {
            patient_id: self.patient_id.clone(),
            first_name: text(&d.first_name),
            last_name: text(&d.last_name),
            age: text(&d.age),
            gender: text(&d.gender),
            phone: text(&d.phone),
            email: text(&d.email),
        }
    }
}
