//! Lenient deserialization helpers.
//!
//! Numeric fields on billing and payroll records come from hand-edited
//! forms and imported documents; a missing or non-numeric value must
//! read as 0 rather than fail the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize any scalar into an `f64`, coercing garbage to 0.
///
/// Accepts numbers, numeric strings ("12.5"), and treats everything
/// else (null, booleans, arbitrary strings) as 0. Non-finite values
/// are also swept to 0.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

/// Same coercion for optional update fields: absent/null leaves the
/// stored value untouched, anything present coerces like `lenient_f64`.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| coerce_f64(&v)))
}

/// Bson datetime serde for optional fields; the driver's
/// `chrono_datetime_as_bson_datetime` helper only covers the required
/// case.
pub mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => bson::DateTime::from_chrono(*dt).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<bson::DateTime>::deserialize(deserializer)?;
        Ok(value.map(|dt| dt.to_chrono()))
    }
}

fn coerce_f64(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_f64")]
        amount: f64,
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        amount: Option<f64>,
    }

    #[test]
    fn numeric_values_pass_through() {
        let row: Row = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        assert_eq!(row.amount, 12.5);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let row: Row = serde_json::from_str(r#"{"amount": " 7.25 "}"#).unwrap();
        assert_eq!(row.amount, 7.25);
    }

    #[test]
    fn optional_fields_distinguish_absent_from_garbage() {
        let patch: Patch = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(patch.amount, None);

        let patch: Patch = serde_json::from_str(r#"{"amount": "abc"}"#).unwrap();
        assert_eq!(patch.amount, Some(0.0));

        let patch: Patch = serde_json::from_str(r#"{"amount": "3.5"}"#).unwrap();
        assert_eq!(patch.amount, Some(3.5));
    }

    #[test]
    fn garbage_coerces_to_zero() {
        for raw in [
            r#"{"amount": "abc"}"#,
            r#"{"amount": null}"#,
            r#"{"amount": true}"#,
            r#"{"amount": {}}"#,
            r#"{}"#,
        ] {
            let row: Row = serde_json::from_str(raw).unwrap();
            assert_eq!(row.amount, 0.0, "input {raw} should coerce to 0");
        }
    }
}
