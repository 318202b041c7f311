use chrono::prelude::*;

/// The current UTC time in RFC 3339 form, with millisecond precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a timestamp as a `YYYY-MM-DD` date.
pub fn date_iso(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_iso() {
        let at = Utc.with_ymd_and_hms(2023, 9, 1, 23, 59, 59).unwrap();
        assert_eq!(date_iso(at), "2023-09-01");
    }

    #[test]
    fn test_now_rfc3339() {
        let now = now_rfc3339();
        assert!(now.ends_with('Z'), "{now}");
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
