//! In-memory store backing the handler tests. Mirrors the SQL semantics of
//! [`super::PgStore`]: same predicates, same ordering with `id ASC` as the
//! tie-break, cascade on system delete.

use std::{cmp::Ordering, collections::BTreeMap};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Page, Store};
use crate::{
    auth::repo_types::User,
    listing::SortOrder,
    measurements::{
        query::{MeasurementQuery, MeasurementSortField},
        repo_types::{Measurement, NewMeasurement},
    },
    systems::{
        query::{SystemQuery, SystemSortField},
        repo_types::{HydroponicSystem, NewSystem},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    systems: BTreeMap<i64, HydroponicSystem>,
    measurements: BTreeMap<i64, Measurement>,
    next_system_id: i64,
    next_measurement_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn system_matches(q: &SystemQuery, s: &HydroponicSystem) -> bool {
    q.name.as_deref().map_or(true, |n| contains_ci(&s.name, n))
        && q.location.as_deref().map_or(true, |l| contains_ci(&s.location, l))
        && q.created_from.map_or(true, |from| s.created_at >= from)
        && q.created_until.map_or(true, |until| s.created_at < until)
}

fn system_order(q: &SystemQuery, a: &HydroponicSystem, b: &HydroponicSystem) -> Ordering {
    let primary = match q.sort {
        SystemSortField::Id => a.id.cmp(&b.id),
        SystemSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SystemSortField::Location => a.location.to_lowercase().cmp(&b.location.to_lowercase()),
        SystemSortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    directed(primary, q.order).then(a.id.cmp(&b.id))
}

fn measurement_matches(q: &MeasurementQuery, m: &Measurement) -> bool {
    q.ph.contains(m.ph)
        && q.temperature.contains(m.temperature)
        && q.tds.contains(m.tds)
        && q.recorded_from.map_or(true, |from| m.timestamp >= from)
        && q.recorded_until.map_or(true, |until| m.timestamp < until)
}

fn measurement_order(q: &MeasurementQuery, a: &Measurement, b: &Measurement) -> Ordering {
    let primary = match q.sort {
        MeasurementSortField::Id => a.id.cmp(&b.id),
        MeasurementSortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        MeasurementSortField::Ph => a.ph.total_cmp(&b.ph),
        MeasurementSortField::Temperature => a.temperature.total_cmp(&b.temperature),
        MeasurementSortField::Tds => a.tds.cmp(&b.tds),
    };
    directed(primary, q.order).then(a.id.cmp(&b.id))
}

fn directed(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Page<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    Page { items, total }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(Some(user))
    }

    async fn list_systems(
        &self,
        owner: Uuid,
        query: &SystemQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<HydroponicSystem>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .systems
            .values()
            .filter(|s| s.owner == owner && system_matches(query, s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| system_order(query, a, b));
        Ok(page(rows, limit, offset))
    }

    async fn create_system(
        &self,
        owner: Uuid,
        system: &NewSystem,
    ) -> anyhow::Result<HydroponicSystem> {
        let mut tables = self.tables.write().await;
        tables.next_system_id += 1;
        let row = HydroponicSystem {
            id: tables.next_system_id,
            name: system.name.clone(),
            location: system.location.clone(),
            created_at: OffsetDateTime::now_utc(),
            owner,
        };
        tables.systems.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_system(&self, id: i64) -> anyhow::Result<Option<HydroponicSystem>> {
        Ok(self.tables.read().await.systems.get(&id).cloned())
    }

    async fn update_system(
        &self,
        id: i64,
        system: &NewSystem,
    ) -> anyhow::Result<Option<HydroponicSystem>> {
        let mut tables = self.tables.write().await;
        Ok(tables.systems.get_mut(&id).map(|row| {
            row.name = system.name.clone();
            row.location = system.location.clone();
            row.clone()
        }))
    }

    async fn delete_system(&self, id: i64) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.systems.remove(&id).is_none() {
            return Ok(false);
        }
        tables.measurements.retain(|_, m| m.system != id);
        Ok(true)
    }

    async fn create_measurement(
        &self,
        system_id: i64,
        measurement: &NewMeasurement,
    ) -> anyhow::Result<Measurement> {
        let mut tables = self.tables.write().await;
        anyhow::ensure!(
            tables.systems.contains_key(&system_id),
            "system {system_id} does not exist"
        );
        tables.next_measurement_id += 1;
        let row = Measurement {
            id: tables.next_measurement_id,
            timestamp: measurement.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            ph: measurement.ph,
            temperature: measurement.temperature,
            tds: measurement.tds,
            system: system_id,
        };
        tables.measurements.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_measurements(
        &self,
        system_id: i64,
        query: &MeasurementQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<Measurement>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .measurements
            .values()
            .filter(|m| m.system == system_id && measurement_matches(query, m))
            .cloned()
            .collect();
        rows.sort_by(|a, b| measurement_order(query, a, b));
        Ok(page(rows, limit, offset))
    }

    async fn latest_measurements(
        &self,
        system_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Measurement>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .measurements
            .values()
            .filter(|m| m.system == system_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
