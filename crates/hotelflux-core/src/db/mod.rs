use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, QueryBuilder};
use tracing::info;

use crate::modeling::FinalRecord;

pub type DbPool = Pool<Postgres>;

pub const DEFAULT_TABLE: &str = "hotel_daily_activity";

/// Columns written on insert, in bind order. Timestamps are server-side.
const INSERT_COLUMNS: [&str; 16] = [
    "hotel_id",
    "hotel_name",
    "date_jour",
    "date_extraction",
    "segment_code",
    "segment_label",
    "pms_type",
    "ca_ttc",
    "rooms_occupied",
    "pax",
    "enf",
    "arrivals",
    "ville",
    "pays",
    "devise",
    "type_contrat",
];

/// Postgres caps one statement at 65535 bind parameters.
pub const MAX_UPSERT_BATCH_SIZE: usize = 65_535 / INSERT_COLUMNS.len();

const CONFLICT_KEY: [&str; 4] = ["hotel_id", "date_jour", "segment_code", "date_extraction"];

/// Establish a new Postgres connection pool using sensible defaults for the
/// pipeline.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .with_context(|| "failed to connect to Postgres")
}

/// Run database migrations embedded at compile-time.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .with_context(|| "failed to run database migrations")
}

/// `DATABASE_URL`, then `HOTELFLUX_DATABASE_URL`, then a URL assembled from
/// the `POSTGRES_*` variables.
pub fn database_url_from_env() -> String {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("HOTELFLUX_DATABASE_URL"))
        .unwrap_or_else(|_| {
            let var = |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_string());
            format!(
                "postgres://{}:{}@{}:{}/{}",
                var("POSTGRES_USER", "etl_user"),
                var("POSTGRES_PASSWORD", "etl_pass"),
                var("POSTGRES_HOST", "localhost"),
                var("POSTGRES_PORT", "5433"),
                var("POSTGRES_DB", "etl_db"),
            )
        })
}

/// Table names are spliced into SQL, so only plain identifiers are allowed.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_lowercase() || ch == '_');
    if !valid_start || !chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
        bail!("invalid table name '{name}': expected [a-z_][a-z0-9_]*");
    }
    Ok(())
}

/// Insert-or-update every row on the natural key inside one transaction.
/// Returns the number of rows written.
pub async fn upsert_final_records(
    pool: &DbPool,
    table: &str,
    records: &[FinalRecord],
    batch_size: usize,
) -> Result<u64> {
    validate_table_name(table)?;
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut affected = 0;
    for chunk in records.chunks(batch_size.clamp(1, MAX_UPSERT_BATCH_SIZE)) {
        let mut builder = upsert_query(table, chunk);
        affected += builder
            .build()
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to upsert into {table}"))?
            .rows_affected();
    }
    tx.commit().await?;

    info!(table, rows = affected, "rows upserted");
    Ok(affected)
}

pub fn upsert_query<'a>(table: &str, records: &'a [FinalRecord]) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {table} ({}, created_at, updated_at) ",
        INSERT_COLUMNS.join(", ")
    ));

    builder.push_values(records, |mut row, record| {
        row.push_bind(record.hotel_id.as_deref())
            .push_bind(record.hotel_name.as_deref())
            .push_bind(record.date_jour)
            .push_bind(record.date_extraction)
            .push_bind(record.segment_code.as_deref())
            .push_bind(record.segment_label.as_deref())
            .push_bind(record.pms_type.as_deref())
            .push_bind(record.ca_ttc)
            .push_bind(record.rooms_occupied)
            .push_bind(record.pax)
            .push_bind(record.enf)
            .push_bind(record.arrivals)
            .push_bind(record.ville.as_deref())
            .push_bind(record.pays.as_deref())
            .push_bind(record.devise.as_deref())
            .push_bind(record.type_contrat.as_deref())
            .push("NOW()")
            .push("NOW()");
    });

    let updates: Vec<String> = INSERT_COLUMNS
        .iter()
        .filter(|column| !CONFLICT_KEY.contains(column))
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .collect();

    builder.push(format!(
        " ON CONFLICT ({}) DO UPDATE SET {}, updated_at = NOW()",
        CONFLICT_KEY.join(", "),
        updates.join(", ")
    ));

    builder
}
