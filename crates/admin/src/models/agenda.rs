//! Agenda item model and the symmetric agenda-to-agenda relationship table.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::content::reconcile::{AgendaPair, reconcile};

use super::merge_data_blob;

/// Agenda record (a scheduled conference session).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgendaItem {
    pub id: i32,

    pub title: String,

    /// Session start, local wall-clock time.
    pub start: Option<NaiveTime>,

    /// Session end, local wall-clock time.
    pub stop: Option<NaiveTime>,

    /// Track index into the configured track labels.
    pub category: i32,

    pub description: Option<String>,

    pub published: bool,

    /// Hosted-asset id or path of the session image.
    pub image: Option<String>,

    /// Free-form extra fields, merged into the top level on reads.
    pub data: Option<serde_json::Value>,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Input for creating an agenda item.
#[derive(Debug, Clone)]
pub struct NewAgendaItem {
    pub title: String,
    pub start: NaiveTime,
    pub stop: NaiveTime,
    pub category: i32,
    pub description: Option<String>,
    pub published: bool,
    pub image: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// How an update treats the stored image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    Keep,
    Replace(String),
    Clear,
}

/// Input for updating an agenda item.
#[derive(Debug, Clone)]
pub struct AgendaChanges {
    pub title: String,
    pub start: NaiveTime,
    pub stop: NaiveTime,
    pub category: i32,
    pub description: Option<String>,
    pub published: bool,
    pub image: ImageChange,
    pub data: Option<serde_json::Value>,
}

const COLUMNS: &str = "id, title, start, stop, category, description, published, image, data, created, modified";

impl AgendaItem {
    /// Find an agenda item by id.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, AgendaItem>(&format!(
            "SELECT {COLUMNS} FROM agenda WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch agenda item by id")?;

        Ok(item)
    }

    /// List agenda items, optionally restricted to the given ids.
    ///
    /// Ordered by start time, then track, then title.
    pub async fn list(pool: &PgPool, only: Option<&[i32]>) -> Result<Vec<Self>> {
        let items = if let Some(ids) = only {
            sqlx::query_as::<_, AgendaItem>(&format!(
                "SELECT {COLUMNS} FROM agenda WHERE id = ANY($1) ORDER BY start ASC, category ASC, title ASC"
            ))
            .bind(ids)
            .fetch_all(pool)
            .await
        } else {
            sqlx::query_as::<_, AgendaItem>(&format!(
                "SELECT {COLUMNS} FROM agenda ORDER BY start ASC, category ASC, title ASC"
            ))
            .fetch_all(pool)
            .await
        }
        .context("failed to list agenda items")?;

        Ok(items)
    }

    /// List published agenda items for front-of-site rendering.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Self>> {
        let items = sqlx::query_as::<_, AgendaItem>(&format!(
            "SELECT {COLUMNS} FROM agenda WHERE published = TRUE ORDER BY start ASC, category ASC"
        ))
        .fetch_all(pool)
        .await
        .context("failed to list published agenda items")?;

        Ok(items)
    }

    /// Insert a new agenda item, returning its id.
    pub async fn insert(pool: &PgPool, input: &NewAgendaItem) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO agenda (title, start, stop, category, description, published, image, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(input.start)
        .bind(input.stop)
        .bind(input.category)
        .bind(&input.description)
        .bind(input.published)
        .bind(&input.image)
        .bind(&input.data)
        .fetch_one(pool)
        .await
        .context("failed to insert agenda item")?;

        Ok(id)
    }

    /// Update an agenda item, bumping its modified timestamp server-side.
    pub async fn update(pool: &PgPool, id: i32, changes: &AgendaChanges) -> Result<()> {
        let (clear_image, replacement) = match &changes.image {
            ImageChange::Keep => (false, None),
            ImageChange::Replace(reference) => (false, Some(reference.clone())),
            ImageChange::Clear => (true, None),
        };

        sqlx::query(
            r#"
            UPDATE agenda SET
                title = $1,
                start = $2,
                stop = $3,
                category = $4,
                description = $5,
                published = $6,
                data = $7,
                image = CASE
                    WHEN $8 THEN NULL
                    WHEN $9::varchar IS NOT NULL THEN $9
                    ELSE image
                END,
                modified = NOW()
            WHERE id = $10
            "#,
        )
        .bind(&changes.title)
        .bind(changes.start)
        .bind(changes.stop)
        .bind(changes.category)
        .bind(&changes.description)
        .bind(changes.published)
        .bind(&changes.data)
        .bind(clear_image)
        .bind(replacement)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update agenda item")?;

        Ok(())
    }

    /// Delete an agenda item.
    ///
    /// Relationship and tag-assignment rows go with it via cascading
    /// foreign keys.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM agenda WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete agenda item")?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch just the stored image reference.
    pub async fn image_ref(pool: &PgPool, id: i32) -> Result<Option<String>> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("SELECT image FROM agenda WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("failed to fetch agenda image reference")?;

        Ok(image.flatten())
    }

    /// Shape this row for the page-assembly and admin layers.
    ///
    /// Times are rendered as "HH:MM" and the `data` blob is merged into the
    /// top level, overriding columns of the same name.
    pub fn into_value(self) -> serde_json::Value {
        let mut value = json!({
            "id": self.id,
            "title": self.title,
            "start": self.start.map(|t| t.format("%H:%M").to_string()),
            "stop": self.stop.map(|t| t.format("%H:%M").to_string()),
            "category": self.category,
            "description": self.description,
            "published": self.published,
            "image": self.image,
            "modified": self.modified,
        });
        merge_data_blob(&mut value, self.data);
        value
    }
}

/// Stored row of the symmetric agenda-to-agenda relationship.
///
/// Invariant: `agenda_from < agenda_to`, enforced by [`AgendaPair`]
/// canonicalization on every write and by a check constraint in the schema.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgendaRelationship {
    pub id: i32,
    pub agenda_from: i32,
    pub agenda_to: i32,
}

impl AgendaRelationship {
    /// The canonical unordered-pair key for this row.
    pub fn pair(&self) -> AgendaPair {
        AgendaPair::new(self.agenda_from, self.agenda_to)
    }

    /// All relationship rows touching the given agenda, from either side.
    pub async fn for_agenda(pool: &PgPool, agenda: i32) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, AgendaRelationship>(
            "SELECT id, agenda_from, agenda_to FROM agenda_agendas WHERE agenda_from = $1 OR agenda_to = $1",
        )
        .bind(agenda)
        .fetch_all(pool)
        .await
        .context("failed to fetch agenda relationships")?;

        Ok(rows)
    }

    /// Make the stored edges for `agenda` match `related` exactly.
    ///
    /// Runs as a single transaction: the current rows are read `FOR UPDATE`,
    /// diffed against the canonicalized desired pairs, and the resulting
    /// inserts and deletes are issued as two batch statements. The unique
    /// constraint on the pair backstops concurrent saves of the same owner.
    pub async fn reconcile(pool: &PgPool, agenda: i32, related: &[i32]) -> Result<()> {
        let mut tx = pool
            .begin()
            .await
            .context("failed to start relationship transaction")?;

        let current = sqlx::query_as::<_, AgendaRelationship>(
            "SELECT id, agenda_from, agenda_to FROM agenda_agendas WHERE agenda_from = $1 OR agenda_to = $1 FOR UPDATE",
        )
        .bind(agenda)
        .fetch_all(&mut *tx)
        .await
        .context("failed to lock agenda relationships")?;

        let desired = related.iter().map(|&to| AgendaPair::new(agenda, to));
        let plan = reconcile(desired, &current, |row| (row.id, row.pair()));

        if !plan.insert.is_empty() {
            let from: Vec<i32> = plan.insert.iter().map(|p| p.from).collect();
            let to: Vec<i32> = plan.insert.iter().map(|p| p.to).collect();
            sqlx::query(
                "INSERT INTO agenda_agendas (agenda_from, agenda_to) SELECT * FROM unnest($1::int4[], $2::int4[])",
            )
            .bind(from)
            .bind(to)
            .execute(&mut *tx)
            .await
            .context("failed to insert agenda relationships")?;
        }

        if !plan.delete.is_empty() {
            sqlx::query("DELETE FROM agenda_agendas WHERE id = ANY($1)")
                .bind(&plan.delete)
                .execute(&mut *tx)
                .await
                .context("failed to delete agenda relationships")?;
        }

        tx.commit()
            .await
            .context("failed to commit relationship transaction")?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn row_pair_is_canonical_regardless_of_storage_order() {
        let row = AgendaRelationship {
            id: 1,
            agenda_from: 3,
            agenda_to: 8,
        };
        assert_eq!(row.pair(), AgendaPair::new(8, 3));
    }

    #[test]
    fn into_value_formats_times_and_merges_data() {
        let item = AgendaItem {
            id: 4,
            title: "Closing words".to_string(),
            start: NaiveTime::from_hms_opt(16, 30, 0),
            stop: NaiveTime::from_hms_opt(17, 0, 0),
            category: 1,
            description: None,
            published: true,
            image: None,
            data: Some(serde_json::json!({"room": "Aurora", "title": "Closing"})),
            created: Utc::now(),
            modified: Utc::now(),
        };

        let value = item.into_value();
        assert_eq!(value["start"], "16:30");
        assert_eq!(value["stop"], "17:00");
        assert_eq!(value["room"], "Aurora");
        // The blob wins over the column.
        assert_eq!(value["title"], "Closing");
    }
}
