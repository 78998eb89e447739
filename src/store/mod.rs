//! Persistence seam. Handlers only see `Arc<dyn Store>`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::repo_types::User,
    measurements::{
        query::MeasurementQuery,
        repo_types::{Measurement, NewMeasurement},
    },
    systems::{
        query::SystemQuery,
        repo_types::{HydroponicSystem, NewSystem},
    },
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// One page of rows plus the number of rows matching the whole query.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// `None` when a user with this email already exists.
    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>>;

    async fn list_systems(
        &self,
        owner: Uuid,
        query: &SystemQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<HydroponicSystem>>;
    async fn create_system(&self, owner: Uuid, system: &NewSystem)
        -> anyhow::Result<HydroponicSystem>;
    async fn get_system(&self, id: i64) -> anyhow::Result<Option<HydroponicSystem>>;
    async fn update_system(
        &self,
        id: i64,
        system: &NewSystem,
    ) -> anyhow::Result<Option<HydroponicSystem>>;
    /// Also removes the system's measurements. `false` if nothing was deleted.
    async fn delete_system(&self, id: i64) -> anyhow::Result<bool>;

    async fn create_measurement(
        &self,
        system_id: i64,
        measurement: &NewMeasurement,
    ) -> anyhow::Result<Measurement>;
    async fn list_measurements(
        &self,
        system_id: i64,
        query: &MeasurementQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<Measurement>>;
    /// Newest first, at most `limit`.
    async fn latest_measurements(
        &self,
        system_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Measurement>>;
}
