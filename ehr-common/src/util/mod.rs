//! Various small utilities shared by the record layer
use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub mod timing;

pub use self::timing::now_rfc3339;

/// Read a whole number of seconds into a [Duration].
pub fn deserialize_u32_to_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds: u32 = Deserialize::deserialize(deserializer)?;
    Ok(Duration::from_secs(seconds.into()))
}

/// Render a JSON scalar the way it is stored in a cell.
///
/// Strings are stored without quotes; numbers and booleans use their
/// canonical JSON text. Objects and arrays fall back to JSON text.
pub fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A value that should not produce a cell: `null`, `""`, `false` or `0`.
pub fn is_unset(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("Asthma")), "Asthma");
        assert_eq!(scalar_to_string(&json!(38)), "38");
        assert_eq!(scalar_to_string(&json!(true)), "true");
        assert_eq!(scalar_to_string(&json!(null)), "");
    }

    #[test]
    fn test_is_unset() {
        assert!(is_unset(&json!(null)));
        assert!(is_unset(&json!("")));
        assert!(is_unset(&json!(0)));
        assert!(is_unset(&json!(false)));
        assert!(!is_unset(&json!("0")));
        assert!(!is_unset(&json!(31)));
        assert!(!is_unset(&json!({})));
    }

    #[test]
    fn test_seconds_to_duration() {
        #[derive(serde_derive::Deserialize)]
        struct Timeout {
            #[serde(deserialize_with = "deserialize_u32_to_duration")]
            timeout: Duration,
        }
        let t: Timeout = serde_json::from_value(json!({"timeout": 10})).unwrap();
        assert_eq!(t.timeout, Duration::from_secs(10));
    }
}
