use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    measurements::{
        query::{MeasurementQuery, Range},
        repo_types::{Measurement, NewMeasurement},
    },
    store::Page,
};

const COLUMNS: &str =
    r#"id, recorded_at AS "timestamp", ph, temperature, tds, system_id AS system"#;

fn push_range<T>(qb: &mut QueryBuilder<'_, Postgres>, column: &str, range: &Range<T>)
where
    T: Copy + Send + 'static + sqlx::Type<Postgres> + for<'q> sqlx::Encode<'q, Postgres>,
{
    if let Some(min) = range.min {
        qb.push(format!(" AND {column} >= ")).push_bind(min);
    }
    if let Some(max) = range.max {
        qb.push(format!(" AND {column} <= ")).push_bind(max);
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, system_id: i64, q: &MeasurementQuery) {
    qb.push(" WHERE system_id = ").push_bind(system_id);
    push_range(qb, "ph", &q.ph);
    push_range(qb, "temperature", &q.temperature);
    push_range(qb, "tds", &q.tds);
    if let Some(from) = q.recorded_from {
        qb.push(" AND recorded_at >= ").push_bind(from);
    }
    if let Some(until) = q.recorded_until {
        qb.push(" AND recorded_at < ").push_bind(until);
    }
}

impl Measurement {
    pub async fn list_by_system(
        db: &PgPool,
        system_id: i64,
        q: &MeasurementQuery,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Page<Measurement>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM measurements");
        push_filters(&mut count, system_id, q);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await
            .context("count measurements")?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM measurements"));
        push_filters(&mut select, system_id, q);
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
            .build_query_as::<Measurement>()
            .fetch_all(db)
            .await
            .context("list measurements")?;

        Ok(Page { items, total })
    }

    /// Newest first.
    pub async fn latest(
        db: &PgPool,
        system_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Measurement>> {
        let rows = sqlx::query_as::<_, Measurement>(&format!(
            "SELECT {COLUMNS} FROM measurements WHERE system_id = $1 \
             ORDER BY recorded_at DESC, id DESC LIMIT $2"
        ))
        .bind(system_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("latest measurements")?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        system_id: i64,
        m: &NewMeasurement,
    ) -> anyhow::Result<Measurement> {
        let row = sqlx::query_as::<_, Measurement>(&format!(
            "INSERT INTO measurements (system_id, recorded_at, ph, temperature, tds) \
             VALUES ($1, COALESCE($2, now()), $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(system_id)
        .bind(m.timestamp)
        .bind(m.ph)
        .bind(m.temperature)
        .bind(m.tds)
        .fetch_one(db)
        .await
        .context("insert measurement")?;
        Ok(row)
    }
}
