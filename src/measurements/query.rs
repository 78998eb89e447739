use time::OffsetDateTime;

use crate::{
    error::AppError,
    listing::{day_end, day_start, non_empty, SortOrder},
    measurements::dto::MeasurementListParams,
    validation::{parse_float, parse_integer, FieldErrors, INVALID_INTEGER, INVALID_NUMBER},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementSortField {
    Id,
    #[default]
    Timestamp,
    Ph,
    Temperature,
    Tds,
}

impl MeasurementSortField {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            None | Some("timestamp") => Ok(Self::Timestamp),
            Some("id") => Ok(Self::Id),
            Some("ph") => Ok(Self::Ph),
            Some("temperature") => Ok(Self::Temperature),
            Some("tds") => Ok(Self::Tds),
            Some(_) => Err(AppError::BadRequest(
                "Invalid value for 'sort_by'. Use one of: id, timestamp, ph, temperature, tds."
                    .into(),
            )),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Timestamp => "recorded_at",
            Self::Ph => "ph",
            Self::Temperature => "temperature",
            Self::Tds => "tds",
        }
    }
}

/// Inclusive `[min, max]` bound; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementQuery {
    pub ph: Range<f64>,
    pub temperature: Range<f64>,
    pub tds: Range<i64>,
    /// `timestamp >= recorded_from`
    pub recorded_from: Option<OffsetDateTime>,
    /// `timestamp < recorded_until`
    pub recorded_until: Option<OffsetDateTime>,
    pub sort: MeasurementSortField,
    pub order: SortOrder,
}

const INVALID_TIMESTAMP: &str = "Invalid timestamp format. Expected format: YYYY-MM-DD.";

fn float_param(errors: &mut FieldErrors, name: &str, raw: &Option<String>) -> Option<f64> {
    let raw = non_empty(raw)?;
    let parsed = parse_float(raw);
    if parsed.is_none() {
        errors.add(name, INVALID_NUMBER);
    }
    parsed
}

fn integer_param(errors: &mut FieldErrors, name: &str, raw: &Option<String>) -> Option<i64> {
    let raw = non_empty(raw)?;
    let parsed = parse_integer(raw);
    if parsed.is_none() {
        errors.add(name, INVALID_INTEGER);
    }
    parsed
}

impl MeasurementQuery {
    pub fn from_params(p: &MeasurementListParams) -> Result<Self, AppError> {
        let mut errors = FieldErrors::new();
        let ph = Range {
            min: float_param(&mut errors, "ph_min", &p.ph_min),
            max: float_param(&mut errors, "ph_max", &p.ph_max),
        };
        let temperature = Range {
            min: float_param(&mut errors, "temperature_min", &p.temperature_min),
            max: float_param(&mut errors, "temperature_max", &p.temperature_max),
        };
        let tds = Range {
            min: integer_param(&mut errors, "tds_min", &p.tds_min),
            max: integer_param(&mut errors, "tds_max", &p.tds_max),
        };
        errors.finish()?;

        let invalid = || AppError::BadRequest(INVALID_TIMESTAMP.into());
        let recorded_from = non_empty(&p.timestamp_after)
            .map(|raw| day_start(raw).ok_or_else(invalid))
            .transpose()?;
        let recorded_until = non_empty(&p.timestamp_before)
            .map(|raw| day_end(raw).ok_or_else(invalid))
            .transpose()?;

        Ok(Self {
            ph,
            temperature,
            tds,
            recorded_from,
            recorded_until,
            sort: MeasurementSortField::parse(p.sort_by.as_deref())?,
            order: SortOrder::parse(p.sort_order.as_deref())?,
        })
    }
}
