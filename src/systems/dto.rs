use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::AppError,
    measurements::repo_types::Measurement,
    systems::repo_types::{HydroponicSystem, NewSystem},
    validation::{self, FieldErrors},
};

pub const MAX_TEXT_CHARS: usize = 255;

/// Raw query string of `GET /systems/`; unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SystemListParams {
    pub name: Option<String>,
    pub location: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
}

/// Response of `GET /systems/{id}/`.
#[derive(Debug, Serialize)]
pub struct SystemDetails {
    pub hydroponic_system: HydroponicSystem,
    pub latest_measurements: Vec<Measurement>,
}

impl NewSystem {
    /// Validates a POST/PUT body. `id`, `owner` and `created_at` are read-only
    /// and silently ignored when sent.
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let body = validation::object(body)?;
        let mut errors = FieldErrors::new();
        let name = validation::text(&mut errors, body, "name", MAX_TEXT_CHARS);
        let location = validation::text(&mut errors, body, "location", MAX_TEXT_CHARS);
        match (name, location) {
            (Some(name), Some(location)) if errors.is_empty() => Ok(Self { name, location }),
            _ => Err(errors.into_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_requires_name_and_location() {
        let err = NewSystem::from_json(&json!({ "name": "Greenhouse A" })).unwrap_err();
        match err {
            AppError::Fields(map) => {
                assert_eq!(map.len(), 1);
                assert_eq!(map["location"], vec![validation::REQUIRED]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn read_only_fields_are_ignored() {
        let body = json!({ "name": "A", "location": "Farm #1", "owner": 99, "id": 5 });
        let system = NewSystem::from_json(&body).unwrap();
        assert_eq!(
            system,
            NewSystem { name: "A".into(), location: "Farm #1".into() }
        );
    }
}
