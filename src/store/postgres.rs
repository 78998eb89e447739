use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{Page, Store};
use crate::{
    auth::repo_types::User,
    config::AppConfig,
    measurements::{
        query::MeasurementQuery,
        repo_types::{Measurement, NewMeasurement},
    },
    systems::{
        query::SystemQuery,
        repo_types::{HydroponicSystem, NewSystem},
    },
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        User::find_by_email(&self.db, email).await
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        User::create(&self.db, email, password_hash).await
    }

    async fn list_systems(
        &self,
        owner: Uuid,
        query: &SystemQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<HydroponicSystem>> {
        HydroponicSystem::list_by_owner(&self.db, owner, query, limit, offset).await
    }

    async fn create_system(
        &self,
        owner: Uuid,
        system: &NewSystem,
    ) -> anyhow::Result<HydroponicSystem> {
        HydroponicSystem::create(&self.db, owner, system).await
    }

    async fn get_system(&self, id: i64) -> anyhow::Result<Option<HydroponicSystem>> {
        HydroponicSystem::find(&self.db, id).await
    }

    async fn update_system(
        &self,
        id: i64,
        system: &NewSystem,
    ) -> anyhow::Result<Option<HydroponicSystem>> {
        HydroponicSystem::update(&self.db, id, system).await
    }

    async fn delete_system(&self, id: i64) -> anyhow::Result<bool> {
        HydroponicSystem::delete(&self.db, id).await
    }

    async fn create_measurement(
        &self,
        system_id: i64,
        measurement: &NewMeasurement,
    ) -> anyhow::Result<Measurement> {
        Measurement::create(&self.db, system_id, measurement).await
    }

    async fn list_measurements(
        &self,
        system_id: i64,
        query: &MeasurementQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<Measurement>> {
        Measurement::list_by_system(&self.db, system_id, query, limit, offset).await
    }

    async fn latest_measurements(
        &self,
        system_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Measurement>> {
        Measurement::latest(&self.db, system_id, limit).await
    }
}
