//! Static table catalogue and field-to-family routing for every record kind.
//!
//! The mapper only ever writes the fields declared here, in the order they
//! are declared. Adding a field to a record kind means adding a route.
use std::fmt;

use serde_derive::{Deserialize, Serialize};

/// Qualifier of the owner cell carried by every sub-record row.
pub const OWNER_QUALIFIER: &str = "patient_id";

/// A table and its column families.
#[derive(Debug, Eq, PartialEq)]
pub struct TableSchema {
    pub name: &'static str,
    pub families: &'static [&'static str],
}

pub const PATIENT_DEMOGRAPHICS: TableSchema = TableSchema {
    name: "patient_demographics",
    families: &["personal_info", "contact_info", "emergency_contact"],
};

pub const MEDICAL_HISTORY: TableSchema = TableSchema {
    name: "medical_history",
    families: &["conditions", "timeline", "severity"],
};

pub const PRESCRIPTIONS: TableSchema = TableSchema {
    name: "prescriptions",
    families: &["medications", "dosage_info", "prescriber_info"],
};

pub const LAB_REPORTS: TableSchema = TableSchema {
    name: "lab_reports",
    families: &["test_results", "orders", "values"],
};

pub const PATIENT_VISITS: TableSchema = TableSchema {
    name: "patient_visits",
    families: &["visit_details", "diagnosis", "treatment"],
};

/// Every table, in creation order.
pub const TABLES: [&TableSchema; 5] = [
    &PATIENT_DEMOGRAPHICS,
    &MEDICAL_HISTORY,
    &PRESCRIPTIONS,
    &LAB_REPORTS,
    &PATIENT_VISITS,
];

/// Value substituted when a field is absent or falsy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldDefault {
    /// Omit the cell.
    None,
    Literal(&'static str),
    /// The current UTC date as `YYYY-MM-DD`.
    Today,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldShape {
    /// One cell at `family:qualifier`.
    Scalar { qualifier: &'static str },
    /// An object flattened one level: each inner key becomes a qualifier of
    /// the family. An array is flattened the same way with its indices as
    /// qualifiers. Inner values are stored as text without omission, so an
    /// inner `null` becomes an empty cell. A scalar is stored under
    /// `scalar_qualifier` if one is given.
    Nested {
        scalar_qualifier: Option<&'static str>,
    },
}

/// Where one input field lives in the store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldRoute {
    pub field: &'static str,
    pub family: &'static str,
    pub shape: FieldShape,
    pub default: FieldDefault,
}

impl FieldRoute {
    const fn scalar(field: &'static str, family: &'static str) -> Self {
        Self {
            field,
            family,
            shape: FieldShape::Scalar { qualifier: field },
            default: FieldDefault::None,
        }
    }

    const fn renamed(field: &'static str, family: &'static str, qualifier: &'static str) -> Self {
        Self {
            field,
            family,
            shape: FieldShape::Scalar { qualifier },
            default: FieldDefault::None,
        }
    }

    const fn nested(
        field: &'static str,
        family: &'static str,
        scalar_qualifier: Option<&'static str>,
    ) -> Self {
        Self {
            field,
            family,
            shape: FieldShape::Nested { scalar_qualifier },
            default: FieldDefault::None,
        }
    }

    const fn or(self, default: FieldDefault) -> Self {
        Self { default, ..self }
    }

    /// The qualifier of a scalar route.
    pub fn qualifier(&self) -> Option<&'static str> {
        match self.shape {
            FieldShape::Scalar { qualifier } => Some(qualifier),
            FieldShape::Nested { .. } => None,
        }
    }
}

/// The kinds of record the mapper knows how to store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Patient demographics, keyed by the patient identifier.
    Patient,
    MedicalHistory,
    Prescription,
    LabReport,
    Visit,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Patient => "patient",
            RecordKind::MedicalHistory => "medical history",
            RecordKind::Prescription => "prescription",
            RecordKind::LabReport => "lab report",
            RecordKind::Visit => "visit",
        };
        f.write_str(name)
    }
}

/// The routing table for one record kind.
#[derive(Debug)]
pub struct RecordSchema {
    pub kind: RecordKind,
    pub table: &'static TableSchema,
    /// Fields that must be present (and truthy) in the input.
    pub required: &'static [&'static str],
    /// Family holding the owner cell. `None` for keyed entities.
    pub owner_family: Option<&'static str>,
    pub routes: &'static [FieldRoute],
}

impl RecordSchema {
    pub fn route(&self, field: &str) -> Option<&FieldRoute> {
        self.routes.iter().find(|route| route.field == field)
    }

    pub fn is_sub_record(&self) -> bool {
        self.owner_family.is_some()
    }
}

static PATIENT_SCHEMA: RecordSchema = RecordSchema {
    kind: RecordKind::Patient,
    table: &PATIENT_DEMOGRAPHICS,
    required: &[],
    owner_family: None,
    routes: &[
        FieldRoute::scalar("first_name", "personal_info"),
        FieldRoute::scalar("last_name", "personal_info"),
        FieldRoute::scalar("date_of_birth", "personal_info"),
        FieldRoute::scalar("age", "personal_info"),
        FieldRoute::scalar("gender", "personal_info"),
        FieldRoute::scalar("blood_type", "personal_info"),
        FieldRoute::scalar("phone", "contact_info"),
        FieldRoute::scalar("email", "contact_info"),
        FieldRoute::scalar("address", "contact_info"),
        FieldRoute::nested("emergency_contact", "emergency_contact", None),
    ],
};

static MEDICAL_HISTORY_SCHEMA: RecordSchema = RecordSchema {
    kind: RecordKind::MedicalHistory,
    table: &MEDICAL_HISTORY,
    required: &["condition", "diagnosed_date"],
    owner_family: Some("conditions"),
    routes: &[
        FieldRoute::scalar("condition", "conditions"),
        FieldRoute::scalar("diagnosed_date", "timeline"),
        FieldRoute::scalar("status", "conditions").or(FieldDefault::Literal("Active")),
        FieldRoute::renamed("severity", "severity", "level").or(FieldDefault::Literal("Unknown")),
        FieldRoute::scalar("notes", "conditions"),
    ],
};

static PRESCRIPTION_SCHEMA: RecordSchema = RecordSchema {
    kind: RecordKind::Prescription,
    table: &PRESCRIPTIONS,
    required: &["medication", "dosage"],
    owner_family: Some("medications"),
    routes: &[
        FieldRoute::scalar("medication", "medications"),
        FieldRoute::scalar("dosage", "dosage_info"),
        FieldRoute::scalar("frequency", "dosage_info").or(FieldDefault::Literal("As needed")),
        FieldRoute::scalar("prescribed_date", "prescriber_info").or(FieldDefault::Today),
        FieldRoute::renamed("prescribing_doctor", "prescriber_info", "doctor")
            .or(FieldDefault::Literal("Unknown")),
        FieldRoute::scalar("status", "medications").or(FieldDefault::Literal("Active")),
    ],
};

static LAB_REPORT_SCHEMA: RecordSchema = RecordSchema {
    kind: RecordKind::LabReport,
    table: &LAB_REPORTS,
    required: &["test_type", "results"],
    owner_family: Some("orders"),
    routes: &[
        FieldRoute::scalar("test_date", "orders").or(FieldDefault::Today),
        FieldRoute::scalar("test_type", "orders"),
        FieldRoute::scalar("ordered_by", "orders").or(FieldDefault::Literal("Unknown")),
        FieldRoute::nested("results", "test_results", Some("result")),
    ],
};

static VISIT_SCHEMA: RecordSchema = RecordSchema {
    kind: RecordKind::Visit,
    table: &PATIENT_VISITS,
    required: &["visit_date", "visit_type"],
    owner_family: Some("visit_details"),
    routes: &[
        FieldRoute::scalar("visit_date", "visit_details"),
        FieldRoute::scalar("visit_type", "visit_details"),
        FieldRoute::scalar("doctor", "visit_details").or(FieldDefault::Literal("Unknown")),
        FieldRoute::scalar("chief_complaint", "visit_details"),
        FieldRoute::scalar("diagnosis", "diagnosis"),
        FieldRoute::scalar("treatment_plan", "treatment"),
    ],
};

impl RecordKind {
    pub fn schema(&self) -> &'static RecordSchema {
        match self {
            RecordKind::Patient => &PATIENT_SCHEMA,
            RecordKind::MedicalHistory => &MEDICAL_HISTORY_SCHEMA,
            RecordKind::Prescription => &PRESCRIPTION_SCHEMA,
            RecordKind::LabReport => &LAB_REPORT_SCHEMA,
            RecordKind::Visit => &VISIT_SCHEMA,
        }
    }

    pub fn table(&self) -> &'static str {
        self.schema().table.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [RecordKind; 5] = [
        RecordKind::Patient,
        RecordKind::MedicalHistory,
        RecordKind::Prescription,
        RecordKind::LabReport,
        RecordKind::Visit,
    ];

    #[test]
    fn routes_use_declared_families() {
        for kind in KINDS {
            let schema = kind.schema();
            assert_eq!(schema.kind, kind);
            for route in schema.routes {
                assert!(
                    schema.table.families.contains(&route.family),
                    "{kind}: {} routes to undeclared family {}",
                    route.field,
                    route.family
                );
            }
            if let Some(owner) = schema.owner_family {
                assert!(schema.table.families.contains(&owner));
            }
            for field in schema.required {
                assert!(schema.route(field).is_some(), "{kind}: {field} unrouted");
            }
        }
    }

    #[test]
    fn columns_are_unique() {
        for kind in KINDS {
            let schema = kind.schema();
            let mut columns: Vec<(&str, &str)> = schema
                .routes
                .iter()
                .filter_map(|r| r.qualifier().map(|q| (r.family, q)))
                .collect();
            if let Some(owner) = schema.owner_family {
                columns.push((owner, OWNER_QUALIFIER));
            }
            let total = columns.len();
            columns.sort();
            columns.dedup();
            assert_eq!(columns.len(), total, "{kind} has a duplicate column");
        }
    }

    #[test]
    fn families_have_no_separator() {
        for table in TABLES {
            for family in table.families {
                assert!(!family.contains(crate::db::COLUMN_SEPARATOR));
            }
        }
    }

    #[test]
    fn keyed_entity_is_not_sub_record() {
        assert!(!RecordKind::Patient.schema().is_sub_record());
        assert!(RecordKind::Visit.schema().is_sub_record());
        assert_eq!(RecordKind::Prescription.table(), "prescriptions");
    }
}
