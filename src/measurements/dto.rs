use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::AppError,
    measurements::repo_types::NewMeasurement,
    validation::{self, FieldErrors},
};

/// Raw query string of `GET /systems/{id}/measurements/`.
#[derive(Debug, Default, Deserialize)]
pub struct MeasurementListParams {
    pub ph_min: Option<String>,
    pub ph_max: Option<String>,
    pub temperature_min: Option<String>,
    pub temperature_max: Option<String>,
    pub tds_min: Option<String>,
    pub tds_max: Option<String>,
    pub timestamp_after: Option<String>,
    pub timestamp_before: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
}

impl NewMeasurement {
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let body = validation::object(body)?;
        let mut errors = FieldErrors::new();
        let ph = validation::float(&mut errors, body, "ph");
        let temperature = validation::float(&mut errors, body, "temperature");
        let tds = validation::integer(&mut errors, body, "tds");
        let timestamp = validation::optional_datetime(&mut errors, body, "timestamp");
        match (ph, temperature, tds) {
            (Some(ph), Some(temperature), Some(tds)) if errors.is_empty() => Ok(Self {
                ph,
                temperature,
                tds,
                timestamp,
            }),
            _ => Err(errors.into_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_readings_are_required() {
        match NewMeasurement::from_json(&json!({})).unwrap_err() {
            AppError::Fields(map) => {
                let keys: Vec<_> = map.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["ph", "tds", "temperature"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn accepts_the_dashboard_payload() {
        let m = NewMeasurement::from_json(&json!({ "ph": "6.5", "temperature": "22", "tds": "500" }))
            .unwrap();
        assert_eq!(m.ph, 6.5);
        assert_eq!(m.temperature, 22.0);
        assert_eq!(m.tds, 500);
        assert!(m.timestamp.is_none());
    }
}
