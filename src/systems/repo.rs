use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    store::Page,
    systems::{
        query::SystemQuery,
        repo_types::{HydroponicSystem, NewSystem},
    },
};

const COLUMNS: &str = "id, name, location, created_at, owner_id AS owner";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, owner: Uuid, q: &SystemQuery) {
    qb.push(" WHERE owner_id = ").push_bind(owner);
    if let Some(name) = &q.name {
        qb.push(" AND strpos(lower(name), lower(")
            .push_bind(name.clone())
            .push(")) > 0");
    }
    if let Some(location) = &q.location {
        qb.push(" AND strpos(lower(location), lower(")
            .push_bind(location.clone())
            .push(")) > 0");
    }
    if let Some(from) = q.created_from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(until) = q.created_until {
        qb.push(" AND created_at < ").push_bind(until);
    }
}

impl HydroponicSystem {
    /// One page of the owner's systems matching `q`, plus the total match count.
    pub async fn list_by_owner(
        db: &PgPool,
        owner: Uuid,
        q: &SystemQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<HydroponicSystem>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM hydroponic_systems");
        push_filters(&mut count, owner, q);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await
            .context("count systems")?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM hydroponic_systems"));
        push_filters(&mut select, owner, q);
        select
            .push(" ORDER BY ")
            .push(q.sort.column())
            .push(" ")
            .push(q.order.keyword())
            .push(", id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let items = select
            .build_query_as::<HydroponicSystem>()
            .fetch_all(db)
            .await
            .context("list systems")?;

        Ok(Page { items, total })
    }

    pub async fn create(
        db: &PgPool,
        owner: Uuid,
        system: &NewSystem,
    ) -> anyhow::Result<HydroponicSystem> {
        let row = sqlx::query_as::<_, HydroponicSystem>(&format!(
            "INSERT INTO hydroponic_systems (name, location, owner_id) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(&system.name)
        .bind(&system.location)
        .bind(owner)
        .fetch_one(db)
        .await
        .context("insert system")?;
        Ok(row)
    }

    /// Unscoped lookup; callers decide what a foreign owner means.
    pub async fn find(db: &PgPool, id: i64) -> anyhow::Result<Option<HydroponicSystem>> {
        let row = sqlx::query_as::<_, HydroponicSystem>(&format!(
            "SELECT {COLUMNS} FROM hydroponic_systems WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find system")?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        id: i64,
        system: &NewSystem,
    ) -> anyhow::Result<Option<HydroponicSystem>> {
        let row = sqlx::query_as::<_, HydroponicSystem>(&format!(
            "UPDATE hydroponic_systems SET name = $2, location = $3 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&system.name)
        .bind(&system.location)
        .fetch_optional(db)
        .await
        .context("update system")?;
        Ok(row)
    }

    /// Removes the system; its measurements go with it (`ON DELETE CASCADE`).
    pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM hydroponic_systems WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete system")?;
        Ok(res.rows_affected() > 0)
    }
}
