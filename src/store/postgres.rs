//! PostgreSQL beer table: DDL, database bootstrap and the sqlx-backed repository.

use crate::error::AppError;
use crate::model::{Beer, BeerStyle};
use crate::store::BeerRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use uuid::Uuid;

const BEER_COLUMNS: &str =
    "id, version, created_date, last_modified_date, beer_name, beer_style, upc, price, min_on_hand, quantity_to_brew";

/// Create the beer table if it does not exist.
pub async fn ensure_beer_table(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS beer (
            id UUID PRIMARY KEY,
            version BIGINT NOT NULL DEFAULT 1,
            created_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            last_modified_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            beer_name TEXT,
            beer_style TEXT,
            upc BIGINT UNIQUE,
            price NUMERIC(19, 2),
            min_on_hand INTEGER,
            quantity_to_brew INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Connect to the `postgres` maintenance database and create the target database if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(sqlx::FromRow)]
struct BeerRow {
    id: Uuid,
    version: i64,
    created_date: DateTime<Utc>,
    last_modified_date: DateTime<Utc>,
    beer_name: Option<String>,
    beer_style: Option<String>,
    upc: Option<i64>,
    price: Option<Decimal>,
    min_on_hand: Option<i32>,
    quantity_to_brew: Option<i32>,
}

impl TryFrom<BeerRow> for Beer {
    type Error = AppError;

    fn try_from(row: BeerRow) -> Result<Self, Self::Error> {
        let beer_style = row
            .beer_style
            .as_deref()
            .map(BeerStyle::from_str)
            .transpose()
            .map_err(|e| AppError::Db(sqlx::Error::Decode(Box::new(e))))?;
        Ok(Beer {
            id: Some(row.id),
            version: Some(row.version),
            created_date: Some(row.created_date),
            last_modified_date: Some(row.last_modified_date),
            beer_name: row.beer_name,
            beer_style,
            upc: row.upc,
            price: row.price,
            min_on_hand: row.min_on_hand,
            quantity_to_brew: row.quantity_to_brew,
        })
    }
}

/// Postgres names the `upc BIGINT UNIQUE` constraint `beer_upc_key`.
const UPC_CONSTRAINT: &str = "beer_upc_key";

fn map_write_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() && db.constraint() == Some(UPC_CONSTRAINT) => {
            AppError::Conflict("upc already in use".into())
        }
        _ => AppError::Db(e),
    }
}

pub struct PgBeerRepository {
    pool: PgPool,
}

impl PgBeerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, id: Uuid, beer: &Beer) -> Result<Option<BeerRow>, AppError> {
        let sql = format!(
            "INSERT INTO beer (id, beer_name, beer_style, upc, price, min_on_hand, quantity_to_brew) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            BEER_COLUMNS
        );
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, BeerRow>(&sql)
            .bind(id)
            .bind(&beer.beer_name)
            .bind(beer.beer_style.map(|s| s.as_str()))
            .bind(beer.upc)
            .bind(beer.price)
            .bind(beer.min_on_hand)
            .bind(beer.quantity_to_brew)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, beer: &Beer) -> Result<Option<BeerRow>, AppError> {
        let sql = format!(
            "UPDATE beer SET beer_name = $2, beer_style = $3, upc = $4, price = $5, \
             min_on_hand = $6, quantity_to_brew = $7, version = version + 1, last_modified_date = NOW() \
             WHERE id = $1 RETURNING {}",
            BEER_COLUMNS
        );
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, BeerRow>(&sql)
            .bind(id)
            .bind(&beer.beer_name)
            .bind(beer.beer_style.map(|s| s.as_str()))
            .bind(beer.upc)
            .bind(beer.price)
            .bind(beer.min_on_hand)
            .bind(beer.quantity_to_brew)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row)
    }
}

#[async_trait]
impl BeerRepository for PgBeerRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Beer>, AppError> {
        let sql = format!("SELECT {} FROM beer WHERE id = $1", BEER_COLUMNS);
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, BeerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Beer::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn save(&self, beer: Beer) -> Result<Beer, AppError> {
        let row = match beer.id {
            Some(id) => match self.update(id, &beer).await? {
                Some(row) => Some(row),
                None => self.insert(id, &beer).await?,
            },
            None => self.insert(Uuid::new_v4(), &beer).await?,
        };
        Beer::try_from(row.ok_or(AppError::Db(sqlx::Error::RowNotFound))?)
    }
}
