//! Built-in sample patients for quick testing of a fresh store.
use serde_derive::Serialize;
use serde_json::{json, Value};

use crate::models::Fields;

#[derive(Clone, Debug, Serialize)]
pub struct SamplePatient {
    pub patient_id: String,
    pub demographics: Fields,
}

impl SamplePatient {
    fn new(patient_id: &str, demographics: Value) -> Self {
        Self {
            patient_id: patient_id.to_owned(),
            demographics: match demographics {
                Value::Object(map) => map,
                _ => Fields::new(),
            },
        }
    }
}

pub fn sample_patients() -> Vec<SamplePatient> {
    vec![
        SamplePatient::new(
            "PAT_001",
            json!({
                "first_name": "John",
                "last_name": "Smith",
                "date_of_birth": "1985-03-15",
                "age": 38,
                "gender": "Male",
                "blood_type": "A+",
                "phone": "555-0123",
                "email": "john.smith@email.com",
                "address": "123 Main Street, Austin, TX",
                "emergency_contact": {
                    "name": "Jane Smith",
                    "relationship": "Spouse",
                    "phone": "555-0124"
                }
            }),
        ),
        SamplePatient::new(
            "PAT_002",
            json!({
                "first_name": "Sarah",
                "last_name": "Johnson",
                "date_of_birth": "1992-07-20",
                "age": 31,
                "gender": "Female",
                "blood_type": "O-",
                "phone": "555-0234",
                "email": "sarah.johnson@email.com",
                "address": "456 Oak Avenue, Dallas, TX",
                "emergency_contact": {
                    "name": "Michael Johnson",
                    "relationship": "Husband",
                    "phone": "555-0235"
                }
            }),
        ),
    ]
}
