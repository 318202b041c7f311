use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_derive::Deserialize;
use serde_json::{Map, Value};

use super::ValidationError;
use crate::db::{cell::Cell, RowKey};
use crate::schema::{FieldDefault, FieldShape, RecordKind, RecordSchema, OWNER_QUALIFIER};
use crate::util::{is_unset, scalar_to_string, timing::date_iso};

/// How sub-record row keys are generated.
///
/// Both shapes start with `{owner}_{millis}`. Two appends for the same
/// owner within the same millisecond get the same `Timestamp` key and the
/// later write silently replaces the earlier row. `TimestampSuffix` adds a
/// random component to avoid that.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RowKeyStrategy {
    /// `{owner}_{millis}`
    #[default]
    Timestamp,
    /// `{owner}_{millis}_{8 hex digits}`
    TimestampSuffix,
}

/// The time and key policy a write is performed with.
#[derive(Clone, Debug)]
pub struct WriteContext {
    pub at: DateTime<Utc>,
    pub keys: RowKeyStrategy,
}

impl WriteContext {
    pub fn now(keys: RowKeyStrategy) -> Self {
        Self {
            at: Utc::now(),
            keys,
        }
    }

    fn timestamp_millis(&self) -> i64 {
        self.at.timestamp_millis()
    }

    /// Generate the key of a sub-record owned by `owner`.
    pub fn sub_record_key(&self, owner: &str) -> RowKey {
        match self.keys {
            RowKeyStrategy::Timestamp => format!("{}_{}", owner, self.timestamp_millis()),
            RowKeyStrategy::TimestampSuffix => format!(
                "{}_{}_{:08x}",
                owner,
                self.timestamp_millis(),
                rand::thread_rng().gen::<u32>()
            ),
        }
    }
}

/// A row ready to be written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlatRecord {
    pub row_key: RowKey,
    pub cells: Vec<Cell>,
}

impl FlatRecord {
    /// Look up a written value by column.
    pub fn value(&self, family: &str, qualifier: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.family == family && c.qualifier == qualifier)
            .map(|c| c.value.as_str())
    }
}

impl fmt::Display for FlatRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} cells)", self.row_key, self.cells.len())
    }
}

/// Names of the required fields missing (or falsy) in `input`.
fn missing_fields(schema: &RecordSchema, input: &Map<String, Value>, id: &str) -> Vec<String> {
    let mut missing = Vec::new();
    if id.is_empty() {
        missing.push(OWNER_QUALIFIER.to_owned());
    }
    missing.extend(
        schema
            .required
            .iter()
            .filter(|field| input.get(**field).map_or(true, is_unset))
            .map(|field| (*field).to_owned()),
    );
    missing
}

/// Flatten a domain record into its row key and cells.
///
/// `id` is the patient identifier: the row key of a patient record, or the
/// owner of a sub-record. Fields absent or falsy in `input` produce no cell
/// unless their route declares a default. Cells come out in route
/// declaration order, preceded by the owner cell for sub-records.
pub fn flatten(
    kind: RecordKind,
    input: &Map<String, Value>,
    id: &str,
    ctx: &WriteContext,
) -> Result<FlatRecord, ValidationError> {
    let schema = kind.schema();
    let missing = missing_fields(schema, input, id);
    if !missing.is_empty() {
        return Err(ValidationError::new(kind, missing));
    }

    let mut cells = Vec::with_capacity(schema.routes.len() + 1);
    let row_key = match schema.owner_family {
        Some(owner_family) => {
            cells.push(Cell::new(owner_family, OWNER_QUALIFIER, id));
            ctx.sub_record_key(id)
        }
        None => id.to_owned(),
    };

    for route in schema.routes {
        let value = input.get(route.field).filter(|v| !is_unset(v));
        match route.shape {
            FieldShape::Scalar { qualifier } => {
                let text = match (value, route.default) {
                    (Some(v), _) => scalar_to_string(v),
                    (None, FieldDefault::Literal(default)) => default.to_owned(),
                    (None, FieldDefault::Today) => date_iso(ctx.at),
                    (None, FieldDefault::None) => continue,
                };
                cells.push(Cell::new(route.family, qualifier, text));
            }
            FieldShape::Nested { scalar_qualifier } => match (value, scalar_qualifier) {
                (Some(Value::Object(inner)), _) => cells.extend(
                    inner
                        .iter()
                        .map(|(key, v)| Cell::new(route.family, key, scalar_to_string(v))),
                ),
                (Some(Value::Array(items)), _) => {
                    cells.extend(items.iter().enumerate().map(|(i, v)| {
                        Cell::new(route.family, &i.to_string(), scalar_to_string(v))
                    }))
                }
                (Some(v), Some(qualifier)) => {
                    cells.push(Cell::new(route.family, qualifier, scalar_to_string(v)))
                }
                (Some(_), None) => {
                    warn!("🧩 Ignoring non-object {} for {}", route.field, kind);
                }
                (None, _) => {}
            },
        }
    }

    Ok(FlatRecord { row_key, cells })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    const TS: u64 = 1_696_161_600_000;

    fn ctx() -> WriteContext {
        WriteContext {
            at: Utc.timestamp_millis_opt(TS as i64).unwrap(),
            keys: RowKeyStrategy::Timestamp,
        }
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn columns(record: &FlatRecord) -> Vec<String> {
        record.cells.iter().map(Cell::column).collect()
    }

    #[test]
    fn condition_scenario() {
        let input = fields(json!({"condition": "Asthma", "diagnosed_date": "2010-03-10"}));
        let record = flatten(RecordKind::MedicalHistory, &input, "PAT_002", &ctx()).unwrap();
        assert_eq!(record.row_key, format!("PAT_002_{TS}"));
        assert_eq!(record.value("conditions", "patient_id"), Some("PAT_002"));
        assert_eq!(record.value("conditions", "condition"), Some("Asthma"));
        assert_eq!(record.value("timeline", "diagnosed_date"), Some("2010-03-10"));
        assert_eq!(record.value("conditions", "status"), Some("Active"));
        assert_eq!(record.value("severity", "level"), Some("Unknown"));
        assert_eq!(record.value("conditions", "notes"), None);
        assert_eq!(
            columns(&record),
            vec![
                "conditions:patient_id",
                "conditions:condition",
                "timeline:diagnosed_date",
                "conditions:status",
                "severity:level",
            ]
        );
    }

    #[test]
    fn prescription_defaults() {
        let input = fields(json!({"medication": "Metformin", "dosage": "500mg"}));
        let record = flatten(RecordKind::Prescription, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.value("medications", "status"), Some("Active"));
        assert_eq!(record.value("dosage_info", "frequency"), Some("As needed"));
        assert_eq!(record.value("prescriber_info", "doctor"), Some("Unknown"));
        assert_eq!(
            record.value("prescriber_info", "prescribed_date"),
            Some("2023-10-01")
        );

        let input = fields(json!({
            "medication": "Lisinopril",
            "dosage": "10mg",
            "status": "Discontinued",
            "prescribing_doctor": "Dr. Johnson",
        }));
        let record = flatten(RecordKind::Prescription, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.value("medications", "status"), Some("Discontinued"));
        assert_eq!(record.value("prescriber_info", "doctor"), Some("Dr. Johnson"));
    }

    #[test]
    fn falsy_fields_take_default_or_vanish() {
        let input = fields(json!({
            "condition": "Hypertension",
            "diagnosed_date": "2020-05-15",
            "status": "",
            "notes": null,
        }));
        let record = flatten(RecordKind::MedicalHistory, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.value("conditions", "status"), Some("Active"));
        assert!(!columns(&record).contains(&"conditions:notes".to_owned()));
    }

    #[test]
    fn missing_required_fields() {
        let input = fields(json!({"diagnosed_date": "2010-03-10"}));
        let err = flatten(RecordKind::MedicalHistory, &input, "PAT_002", &ctx()).unwrap_err();
        assert_eq!(err.kind, RecordKind::MedicalHistory);
        assert_eq!(err.missing, vec!["condition"]);
        assert!(err.to_string().contains("condition"));

        let err = flatten(RecordKind::Prescription, &Map::new(), "", &ctx()).unwrap_err();
        assert_eq!(err.missing, vec!["patient_id", "medication", "dosage"]);
    }

    #[test]
    fn patient_keyed_by_identifier() {
        let input = fields(json!({
            "first_name": "John",
            "last_name": "Smith",
            "age": 38,
            "gender": "Male",
            "phone": "555-0123",
            "unknown_field": "dropped",
            "emergency_contact": {"name": "Jane Smith", "relationship": "Spouse"},
        }));
        let record = flatten(RecordKind::Patient, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.row_key, "PAT_001");
        assert_eq!(
            columns(&record),
            vec![
                "personal_info:first_name",
                "personal_info:last_name",
                "personal_info:age",
                "personal_info:gender",
                "contact_info:phone",
                "emergency_contact:name",
                "emergency_contact:relationship",
            ]
        );
        assert_eq!(record.value("personal_info", "age"), Some("38"));
    }

    #[test]
    fn lab_results_object_or_scalar() {
        let input = fields(json!({
            "test_type": "Blood Panel",
            "results": {"glucose": "95 mg/dL", "hemoglobin": 14.2},
            "ordered_by": "Dr. Williams",
        }));
        let record = flatten(RecordKind::LabReport, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.value("orders", "patient_id"), Some("PAT_001"));
        assert_eq!(record.value("orders", "test_date"), Some("2023-10-01"));
        assert_eq!(record.value("test_results", "glucose"), Some("95 mg/dL"));
        assert_eq!(record.value("test_results", "hemoglobin"), Some("14.2"));
        assert_eq!(record.value("test_results", "result"), None);

        let input = fields(json!({"test_type": "Rapid Strep", "results": "Negative"}));
        let record = flatten(RecordKind::LabReport, &input, "PAT_002", &ctx()).unwrap();
        assert_eq!(record.value("test_results", "result"), Some("Negative"));
        assert_eq!(record.value("orders", "ordered_by"), Some("Unknown"));
    }

    #[test]
    fn lab_results_array_by_index() {
        let input = fields(json!({"test_type": "Panel", "results": ["95", 14.2]}));
        let record = flatten(RecordKind::LabReport, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.value("test_results", "0"), Some("95"));
        assert_eq!(record.value("test_results", "1"), Some("14.2"));
        assert_eq!(record.value("test_results", "result"), None);
    }

    #[test]
    fn nested_null_is_empty() {
        let input = fields(json!({
            "first_name": "John",
            "emergency_contact": {"name": null, "phone": "555-0124"},
        }));
        let record = flatten(RecordKind::Patient, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.value("emergency_contact", "name"), Some(""));
        assert_eq!(record.value("emergency_contact", "phone"), Some("555-0124"));
    }

    #[test]
    fn pre_epoch_key_keeps_sign() {
        let ctx = WriteContext {
            at: Utc.timestamp_millis_opt(-5).unwrap(),
            keys: RowKeyStrategy::Timestamp,
        };
        assert_eq!(ctx.sub_record_key("P"), "P_-5");
    }

    #[test]
    fn visit_record() {
        let input = fields(json!({
            "visit_date": "2023-09-01",
            "visit_type": "Regular Checkup",
            "diagnosis": "Diabetes Type 2, Hypertension",
        }));
        let record = flatten(RecordKind::Visit, &input, "PAT_001", &ctx()).unwrap();
        assert_eq!(record.value("visit_details", "patient_id"), Some("PAT_001"));
        assert_eq!(record.value("visit_details", "doctor"), Some("Unknown"));
        assert_eq!(
            record.value("diagnosis", "diagnosis"),
            Some("Diabetes Type 2, Hypertension")
        );
        assert_eq!(record.value("treatment", "treatment_plan"), None);
    }

    #[test]
    fn suffixed_keys() {
        let ctx = WriteContext {
            keys: RowKeyStrategy::TimestampSuffix,
            ..ctx()
        };
        let key = ctx.sub_record_key("PAT_001");
        let prefix = format!("PAT_001_{TS}_");
        assert!(key.starts_with(&prefix), "{key}");
        let suffix = &key[prefix.len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
