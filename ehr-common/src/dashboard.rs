//! Statistics and filtering over a set of loaded patient records.
//!
//! All functions take the patients they work on explicitly; nothing here
//! keeps state between calls.
use std::collections::{BTreeMap, BTreeSet};

use serde_derive::{Deserialize, Serialize};

use crate::models::PatientRecord;

const ACTIVE: &str = "Active";

/// Upper bound (inclusive) and label of each age bucket.
const AGE_BUCKETS: [(u32, &str); 4] = [(17, "0-17"), (30, "18-30"), (45, "31-45"), (60, "46-60")];
const OLDEST_BUCKET: &str = "61+";

fn age_bucket(age: &str) -> Option<&'static str> {
    let age: u32 = age.trim().parse().ok()?;
    Some(
        AGE_BUCKETS
            .iter()
            .find(|(max, _)| age <= *max)
            .map_or(OLDEST_BUCKET, |(_, label)| *label),
    )
}

fn is_active(status: &Option<String>) -> bool {
    status.as_deref() == Some(ACTIVE)
}

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub active_prescriptions: usize,
    pub lab_reports: usize,
    pub visits: usize,
    /// Patients per gender. Patients without a gender are not counted.
    pub genders: BTreeMap<String, usize>,
    /// Active history entries per condition.
    pub conditions: BTreeMap<String, usize>,
    /// Patients per age bucket. Unparsable ages are not counted.
    pub age_groups: BTreeMap<&'static str, usize>,
    /// Active prescriptions per medication.
    pub medications: BTreeMap<String, usize>,
}

impl DashboardStats {
    pub fn collect(patients: &[PatientRecord]) -> Self {
        let mut stats = Self {
            total_patients: patients.len(),
            age_groups: AGE_BUCKETS
                .iter()
                .map(|(_, label)| *label)
                .chain([OLDEST_BUCKET])
                .map(|label| (label, 0))
                .collect(),
            ..Default::default()
        };
        for patient in patients {
            let demographics = &patient.demographics;
            if let Some(gender) = &demographics.gender {
                *stats.genders.entry(gender.clone()).or_default() += 1;
            }
            if let Some(bucket) = demographics.age.as_deref().and_then(age_bucket) {
                *stats.age_groups.entry(bucket).or_default() += 1;
            }
            for entry in &patient.medical_history {
                if let (true, Some(condition)) = (is_active(&entry.status), &entry.condition) {
                    *stats.conditions.entry(condition.clone()).or_default() += 1;
                }
            }
            for prescription in &patient.prescriptions {
                if !is_active(&prescription.status) {
                    continue;
                }
                stats.active_prescriptions += 1;
                if let Some(medication) = &prescription.medication {
                    *stats.medications.entry(medication.clone()).or_default() += 1;
                }
            }
            stats.lab_reports += patient.lab_reports.len();
            stats.visits += patient.visits.len();
        }
        stats
    }
}

/// Patient list filter. Unset or empty criteria match everything.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PatientFilter {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl PatientFilter {
    pub fn matches(&self, patient: &PatientRecord) -> bool {
        let demographics = &patient.demographics;
        let gender = criterion(&self.gender)
            .map_or(true, |gender| demographics.gender.as_deref() == Some(gender));
        let condition = criterion(&self.condition).map_or(true, |condition| {
            patient
                .medical_history
                .iter()
                .any(|entry| entry.condition.as_deref() == Some(condition))
        });
        let keyword = criterion(&self.keyword).map_or(true, |keyword| {
            let keyword = keyword.to_lowercase();
            [
                Some(patient.patient_id.as_str()),
                demographics.first_name.as_deref(),
                demographics.last_name.as_deref(),
            ]
            .into_iter()
            .any(|field| contains_folded(field, &keyword))
        });
        gender && condition && keyword
    }

    pub fn apply<'a>(&self, patients: &'a [PatientRecord]) -> Vec<&'a PatientRecord> {
        patients.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Patients whose identifier, name or any condition contains `keyword`,
/// ignoring case. An empty keyword matches nothing.
pub fn global_search<'a>(patients: &'a [PatientRecord], keyword: &str) -> Vec<&'a PatientRecord> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return vec![];
    }
    patients
        .iter()
        .filter(|p| {
            contains_folded(Some(p.patient_id.as_str()), &keyword)
                || contains_folded(p.demographics.first_name.as_deref(), &keyword)
                || contains_folded(p.demographics.last_name.as_deref(), &keyword)
                || p
                    .medical_history
                    .iter()
                    .any(|entry| contains_folded(entry.condition.as_deref(), &keyword))
        })
        .collect()
}

/// Every distinct condition on record, sorted.
pub fn condition_options(patients: &[PatientRecord]) -> Vec<String> {
    patients
        .iter()
        .flat_map(|p| &p.medical_history)
        .filter_map(|entry| entry.condition.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
