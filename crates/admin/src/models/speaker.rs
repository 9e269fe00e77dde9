//! Speaker model and the speaker-to-agenda association table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::content::reconcile::reconcile;

use super::agenda::ImageChange;
use super::{fill_missing, merge_data_blob};

/// Speaker record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Speaker {
    pub id: i32,

    /// Listing page index when multi-page speaker listings are enabled.
    pub page: i32,

    pub name: String,

    pub description: Option<String>,

    /// Social and media links keyed by link type (twitter, github, ...).
    pub links: Option<serde_json::Value>,

    pub published: bool,

    /// Hosted-asset id or path of the portrait image.
    pub image: Option<String>,

    /// Free-form extra fields, merged into the top level on reads.
    pub data: Option<serde_json::Value>,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Input for creating a speaker.
#[derive(Debug, Clone)]
pub struct NewSpeaker {
    pub page: i32,
    pub name: String,
    pub description: Option<String>,
    pub links: serde_json::Value,
    pub published: bool,
    pub image: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// Input for updating a speaker.
#[derive(Debug, Clone)]
pub struct SpeakerChanges {
    pub page: i32,
    pub name: String,
    pub description: Option<String>,
    pub links: serde_json::Value,
    pub published: bool,
    pub image: ImageChange,
    pub data: Option<serde_json::Value>,
}

const COLUMNS: &str = "id, page, name, description, links, published, image, data, created, modified";

impl Speaker {
    /// Find a speaker by id.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let speaker = sqlx::query_as::<_, Speaker>(&format!(
            "SELECT {COLUMNS} FROM speakers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch speaker by id")?;

        Ok(speaker)
    }

    /// List speakers ordered by name, with optional page and id filters.
    pub async fn list(pool: &PgPool, page: Option<i32>, only: Option<&[i32]>) -> Result<Vec<Self>> {
        let mut sql = format!("SELECT {COLUMNS} FROM speakers WHERE 1=1");
        let mut param_idx = 1;
        if page.is_some() {
            sql.push_str(&format!(" AND page = ${param_idx}"));
            param_idx += 1;
        }
        if only.is_some() {
            sql.push_str(&format!(" AND id = ANY(${param_idx})"));
        }
        sql.push_str(" ORDER BY name ASC");

        let mut query = sqlx::query_as::<_, Speaker>(&sql);
        if let Some(page) = page {
            query = query.bind(page);
        }
        if let Some(ids) = only {
            query = query.bind(ids);
        }

        let speakers = query
            .fetch_all(pool)
            .await
            .context("failed to list speakers")?;

        Ok(speakers)
    }

    /// List published speakers for front-of-site rendering.
    pub async fn list_published(pool: &PgPool, page: Option<i32>) -> Result<Vec<Self>> {
        let speakers = if let Some(page) = page {
            sqlx::query_as::<_, Speaker>(&format!(
                "SELECT {COLUMNS} FROM speakers WHERE published = TRUE AND page = $1 ORDER BY name ASC"
            ))
            .bind(page)
            .fetch_all(pool)
            .await
        } else {
            sqlx::query_as::<_, Speaker>(&format!(
                "SELECT {COLUMNS} FROM speakers WHERE published = TRUE ORDER BY name ASC"
            ))
            .fetch_all(pool)
            .await
        }
        .context("failed to list published speakers")?;

        Ok(speakers)
    }

    /// Insert a new speaker, returning its id.
    pub async fn insert(pool: &PgPool, input: &NewSpeaker) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO speakers (page, name, description, links, published, image, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.page)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.links)
        .bind(input.published)
        .bind(&input.image)
        .bind(&input.data)
        .fetch_one(pool)
        .await
        .context("failed to insert speaker")?;

        Ok(id)
    }

    /// Update a speaker, bumping its modified timestamp server-side.
    pub async fn update(pool: &PgPool, id: i32, changes: &SpeakerChanges) -> Result<()> {
        let (clear_image, replacement) = match &changes.image {
            ImageChange::Keep => (false, None),
            ImageChange::Replace(reference) => (false, Some(reference.clone())),
            ImageChange::Clear => (true, None),
        };

        sqlx::query(
            r#"
            UPDATE speakers SET
                page = $1,
                name = $2,
                description = $3,
                links = $4,
                published = $5,
                data = $6,
                image = CASE
                    WHEN $7 THEN NULL
                    WHEN $8::varchar IS NOT NULL THEN $8
                    ELSE image
                END,
                modified = NOW()
            WHERE id = $9
            "#,
        )
        .bind(changes.page)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.links)
        .bind(changes.published)
        .bind(&changes.data)
        .bind(clear_image)
        .bind(replacement)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update speaker")?;

        Ok(())
    }

    /// Delete a speaker; association rows cascade.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM speakers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete speaker")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every speaker on the given listing page.
    pub async fn delete_by_page(pool: &PgPool, page: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM speakers WHERE page = $1")
            .bind(page)
            .execute(pool)
            .await
            .context("failed to delete speakers by page")?;

        Ok(result.rows_affected())
    }

    /// Fetch just the stored image reference.
    pub async fn image_ref(pool: &PgPool, id: i32) -> Result<Option<String>> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("SELECT image FROM speakers WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("failed to fetch speaker image reference")?;

        Ok(image.flatten())
    }

    /// Shape this row for the page-assembly and admin layers.
    ///
    /// Link types surface as top-level keys where no column claims the name;
    /// the `data` blob then merges in, overriding columns.
    pub fn into_value(self) -> serde_json::Value {
        let mut value = json!({
            "id": self.id,
            "page": self.page,
            "name": self.name,
            "description": self.description,
            "published": self.published,
            "image": self.image,
            "modified": self.modified,
        });
        fill_missing(&mut value, self.links);
        merge_data_blob(&mut value, self.data);
        value
    }
}

/// Stored row of the speaker-to-agenda association.
///
/// At most one row exists per (speaker, agenda) pair.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpeakerAgenda {
    pub id: i32,
    pub speaker: i32,
    pub agenda: i32,
}

impl SpeakerAgenda {
    /// Association rows for one speaker.
    pub async fn for_speaker(pool: &PgPool, speaker: i32) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, SpeakerAgenda>(
            "SELECT id, speaker, agenda FROM speaker_agendas WHERE speaker = $1",
        )
        .bind(speaker)
        .fetch_all(pool)
        .await
        .context("failed to fetch agenda associations for speaker")?;

        Ok(rows)
    }

    /// Association rows for one agenda item.
    pub async fn for_agenda(pool: &PgPool, agenda: i32) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, SpeakerAgenda>(
            "SELECT id, speaker, agenda FROM speaker_agendas WHERE agenda = $1",
        )
        .bind(agenda)
        .fetch_all(pool)
        .await
        .context("failed to fetch speaker associations for agenda")?;

        Ok(rows)
    }

    /// Make the stored associations for `agenda` match `speakers` exactly.
    pub async fn reconcile_for_agenda(pool: &PgPool, agenda: i32, speakers: &[i32]) -> Result<()> {
        Self::reconcile(pool, "agenda", agenda, "speaker", speakers).await
    }

    /// Make the stored associations for `speaker` match `agendas` exactly.
    pub async fn reconcile_for_speaker(pool: &PgPool, speaker: i32, agendas: &[i32]) -> Result<()> {
        Self::reconcile(pool, "speaker", speaker, "agenda", agendas).await
    }

    /// Shared diff-and-apply for either direction of the association.
    ///
    /// The association is semantically unordered, so reconciling from the
    /// speaker side keys rows by agenda id and vice versa. Same transaction
    /// discipline as the agenda-pair table.
    async fn reconcile(
        pool: &PgPool,
        owner_column: &str,
        owner: i32,
        related_column: &str,
        related: &[i32],
    ) -> Result<()> {
        let mut tx = pool
            .begin()
            .await
            .context("failed to start association transaction")?;

        let current: Vec<(i32, i32)> = sqlx::query_as(&format!(
            "SELECT id, {related_column} FROM speaker_agendas WHERE {owner_column} = $1 FOR UPDATE"
        ))
        .bind(owner)
        .fetch_all(&mut *tx)
        .await
        .context("failed to lock speaker associations")?;

        let plan = reconcile(related.iter().copied(), &current, |&(id, key)| (id, key));

        if !plan.insert.is_empty() {
            let owners: Vec<i32> = plan.insert.iter().map(|_| owner).collect();
            sqlx::query(&format!(
                "INSERT INTO speaker_agendas ({owner_column}, {related_column}) SELECT * FROM unnest($1::int4[], $2::int4[])"
            ))
            .bind(owners)
            .bind(&plan.insert)
            .execute(&mut *tx)
            .await
            .context("failed to insert speaker associations")?;
        }

        if !plan.delete.is_empty() {
            sqlx::query("DELETE FROM speaker_agendas WHERE id = ANY($1)")
                .bind(&plan.delete)
                .execute(&mut *tx)
                .await
                .context("failed to delete speaker associations")?;
        }

        tx.commit()
            .await
            .context("failed to commit association transaction")?;

        Ok(())
    }
}
