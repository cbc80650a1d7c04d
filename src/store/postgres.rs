use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::EventsStore;
use crate::models::{Event, UpsertEvent};
use crate::utils::error::AppResult;

const EVENT_COLUMNS: &str = "id, club_id, title, description, location, start_time, end_time, \
                             tags, featured, created_at, updated_at";
// Byte-order ids, matching the in-memory store regardless of database collation.
const ORDER_BY: &str = "ORDER BY start_time, id COLLATE \"C\"";

/// PostgreSQL-backed store over the `events` table.
#[derive(Clone)]
pub struct PgEventsStore {
    pool: PgPool,
}

impl PgEventsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    async fn fetch_where(&self, condition: &str) -> AppResult<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events WHERE {} {}",
            EVENT_COLUMNS, condition, ORDER_BY
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl EventsStore for PgEventsStore {
    async fn find_all(&self) -> AppResult<Vec<Event>> {
        self.fetch_where("TRUE").await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Event>> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_club(&self, club_id: &str) -> AppResult<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events WHERE club_id = $1 {}",
            EVENT_COLUMNS, ORDER_BY
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(club_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_ongoing(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events WHERE start_time <= $1 AND end_time >= $1 {}",
            EVENT_COLUMNS, ORDER_BY
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_past(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events WHERE end_time < $1 {}",
            EVENT_COLUMNS, ORDER_BY
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_featured(&self) -> AppResult<Vec<Event>> {
        self.fetch_where("featured").await
    }

    async fn find_by_tags(&self, tags: &[String]) -> AppResult<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events WHERE tags && $1 {}",
            EVENT_COLUMNS, ORDER_BY
        );
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(tags.to_vec())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn save(&self, event: UpsertEvent) -> AppResult<Event> {
        let sql = format!(
            "INSERT INTO events (id, club_id, title, description, location, start_time, end_time, \
             tags, featured, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW()) \
             ON CONFLICT (id) DO UPDATE SET \
             club_id = EXCLUDED.club_id, \
             title = EXCLUDED.title, \
             description = EXCLUDED.description, \
             location = EXCLUDED.location, \
             start_time = EXCLUDED.start_time, \
             end_time = EXCLUDED.end_time, \
             tags = EXCLUDED.tags, \
             featured = EXCLUDED.featured, \
             updated_at = NOW() \
             RETURNING {}",
            EVENT_COLUMNS
        );

        let saved = sqlx::query_as::<_, Event>(&sql)
            .bind(&event.id)
            .bind(&event.club_id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(&event.tags)
            .bind(event.featured)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(event_id = %saved.id, "Upserted event row");
        Ok(saved)
    }

    async fn delete_by_id(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
