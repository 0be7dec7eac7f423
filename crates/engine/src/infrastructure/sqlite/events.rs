//! SQLite-backed event storage.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use whatif_domain::{Event, EventCode, EventId, EventRecord};

use super::{parse_timestamp, timestamp, write_error, Database};
use crate::infrastructure::ports::{EventRepo, RepoError};

const EVENT_COLUMNS: &str = "id, event_code, event_type, title, description, min_age, max_age, \
     prerequisites, choices, tags, branch_weight, rarity_factor, source, ai_signature_hash, \
     is_active, created_at";

pub struct SqliteEventRepo {
    db: Database,
}

impl SqliteEventRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepoError> {
    serde_json::to_string(value).map_err(RepoError::serialization)
}

fn from_json<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T, RepoError> {
    serde_json::from_str(raw)
        .map_err(|e| RepoError::serialization(format!("events.{column}: {e}")))
}

fn row_to_event(row: &SqliteRow) -> Result<Event, RepoError> {
    let read = |e: sqlx::Error| RepoError::serialization(format!("events row: {e}"));

    let code: String = row.try_get("event_code").map_err(read)?;
    let event_type: String = row.try_get("event_type").map_err(read)?;
    let source: String = row.try_get("source").map_err(read)?;
    let choices: String = row.try_get("choices").map_err(read)?;
    let tags: String = row.try_get("tags").map_err(read)?;
    let prerequisites: Option<String> = row.try_get("prerequisites").map_err(read)?;
    let created_at: String = row.try_get("created_at").map_err(read)?;

    let record = EventRecord {
        id: EventId::from_string(row.try_get::<String, _>("id").map_err(read)?),
        event_id: code.clone(),
        event_type: event_type.parse().map_err(RepoError::serialization)?,
        title: row.try_get("title").map_err(read)?,
        description: row.try_get("description").map_err(read)?,
        min_age: row.try_get("min_age").map_err(read)?,
        max_age: row.try_get("max_age").map_err(read)?,
        choices: from_json("choices", &choices)?,
        tags: from_json("tags", &tags)?,
        branch_weight: row.try_get("branch_weight").map_err(read)?,
        rarity_factor: row.try_get("rarity_factor").map_err(read)?,
        source: source.parse().map_err(RepoError::serialization)?,
        prerequisites: prerequisites
            .as_deref()
            .map(|raw| from_json("prerequisites", raw))
            .transpose()?,
        ai_signature_hash: row.try_get("ai_signature_hash").map_err(read)?,
        created_at: parse_timestamp(&created_at)?,
        is_active: row.try_get("is_active").map_err(read)?,
    };

    Event::from_data(record)
        .map_err(|e| RepoError::serialization(format!("event {code} failed validation: {e}")))
}

#[async_trait]
impl EventRepo for SqliteEventRepo {
    async fn save(&self, event: &Event) -> Result<(), RepoError> {
        let prerequisites = event.prerequisites().map(to_json).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO events (id, event_code, event_type, title, description, min_age, max_age,
                prerequisites, choices, tags, branch_weight, rarity_factor, source,
                ai_signature_hash, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_code) DO UPDATE SET
                event_type = excluded.event_type,
                title = excluded.title,
                description = excluded.description,
                min_age = excluded.min_age,
                max_age = excluded.max_age,
                prerequisites = excluded.prerequisites,
                choices = excluded.choices,
                tags = excluded.tags,
                branch_weight = excluded.branch_weight,
                rarity_factor = excluded.rarity_factor,
                source = excluded.source,
                ai_signature_hash = excluded.ai_signature_hash,
                is_active = excluded.is_active
            "#,
        )
        .bind(event.id().as_str())
        .bind(event.event_code().as_str())
        .bind(event.event_type().as_str())
        .bind(event.title())
        .bind(event.description())
        .bind(event.min_age())
        .bind(event.max_age())
        .bind(prerequisites)
        .bind(to_json(&event.choices())?)
        .bind(to_json(&event.tags())?)
        .bind(event.branch_weight())
        .bind(event.rarity_factor())
        .bind(event.source().as_str())
        .bind(event.ai_signature_hash())
        .bind(event.is_active())
        .bind(timestamp(event.created_at()))
        .execute(self.db.pool())
        .await
        .map_err(|e| write_error("events.save", e))?;

        Ok(())
    }

    async fn get_by_code(&self, code: &EventCode) -> Result<Option<Event>, RepoError> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_code = ?");
        let row = sqlx::query(&query)
            .bind(code.as_str())
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| RepoError::database("events.get_by_code", e))?;

        row.as_ref().map(row_to_event).transpose()
    }

    async fn list_active(&self) -> Result<Vec<Event>, RepoError> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active = 1 ORDER BY event_code"
        );
        let rows = sqlx::query(&query)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| RepoError::database("events.list_active", e))?;

        rows.iter().map(row_to_event).collect()
    }
}
