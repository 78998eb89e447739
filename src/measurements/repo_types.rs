use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Sensor reading row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Measurement {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub ph: f64,
    pub temperature: f64,
    pub tds: i64,
    pub system: i64, // owning system's id
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMeasurement {
    pub ph: f64,
    pub temperature: f64,
    pub tds: i64,
    /// Client-supplied reading time; the store stamps `now()` otherwise.
    pub timestamp: Option<OffsetDateTime>,
}
