use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Hydroponic system row, serialized as-is to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HydroponicSystem {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub owner: Uuid, // owning user's id
}

/// Writable part of a system: the only fields POST and PUT may set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSystem {
    pub name: String,
    pub location: String,
}
