//! Free-text tags on agenda items.
//!
//! Tag input arrives as one comma-separated string; assignments live in a
//! join table and are reconciled the same way relationship rows are.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::content::reconcile::reconcile;

/// Split raw tag input into trimmed, de-duplicated names.
pub fn separate(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Tag names assigned to an agenda item, alphabetical.
pub async fn for_agenda(pool: &PgPool, agenda: i32) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT t.name FROM agenda_tags at
        JOIN tag t ON t.id = at.tag
        WHERE at.agenda = $1
        ORDER BY t.name ASC
        "#,
    )
    .bind(agenda)
    .fetch_all(pool)
    .await
    .context("failed to fetch agenda tags")?;

    Ok(names)
}

/// Make the tag assignments for `agenda` match `names` exactly.
///
/// Missing tag rows are created first (existing names are reused), then the
/// assignment table is diffed by tag id under the same transaction.
pub async fn reconcile_for_agenda(pool: &PgPool, agenda: i32, names: &[String]) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to start tag transaction")?;

    let desired: Vec<i32> = if names.is_empty() {
        Vec::new()
    } else {
        sqlx::query("INSERT INTO tag (name) SELECT * FROM unnest($1::varchar[]) ON CONFLICT (name) DO NOTHING")
            .bind(names)
            .execute(&mut *tx)
            .await
            .context("failed to ensure tags exist")?;

        sqlx::query_scalar("SELECT id FROM tag WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&mut *tx)
            .await
            .context("failed to resolve tag ids")?
    };

    let current: Vec<(i32, i32)> =
        sqlx::query_as("SELECT id, tag FROM agenda_tags WHERE agenda = $1 FOR UPDATE")
            .bind(agenda)
            .fetch_all(&mut *tx)
            .await
            .context("failed to lock tag assignments")?;

    let plan = reconcile(desired, &current, |&(id, tag)| (id, tag));

    if !plan.insert.is_empty() {
        let agendas: Vec<i32> = plan.insert.iter().map(|_| agenda).collect();
        sqlx::query(
            "INSERT INTO agenda_tags (agenda, tag) SELECT * FROM unnest($1::int4[], $2::int4[])",
        )
        .bind(agendas)
        .bind(&plan.insert)
        .execute(&mut *tx)
        .await
        .context("failed to insert tag assignments")?;
    }

    if !plan.delete.is_empty() {
        sqlx::query("DELETE FROM agenda_tags WHERE id = ANY($1)")
            .bind(&plan.delete)
            .execute(&mut *tx)
            .await
            .context("failed to delete tag assignments")?;
    }

    tx.commit().await.context("failed to commit tag transaction")?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn separate_trims_and_drops_empties() {
        assert_eq!(
            separate("  rust , web,,  backend "),
            vec!["rust", "web", "backend"]
        );
    }

    #[test]
    fn separate_dedupes_case_insensitively() {
        assert_eq!(separate("Rust, rust, RUST, async"), vec!["Rust", "async"]);
    }

    #[test]
    fn separate_of_empty_input_is_empty() {
        assert!(separate("").is_empty());
        assert!(separate(" , , ").is_empty());
    }
}
