//! Read-only ticketing queries backing the attendee CSV export.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One ticket item joined to its order, as exported per agenda.
///
/// Orders without items can appear from the left join; the export skips
/// them since a CSV row exists per ticket item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketExportRow {
    /// Order id (also exported as the `ticket` column).
    pub order_id: String,

    /// Ticket item id (exported as the `id` column).
    pub item_id: Option<i32>,

    /// Attendee details captured at purchase time.
    pub ticket: Option<serde_json::Value>,
}

impl TicketExportRow {
    /// Rows for every ticket item sold under the given ticket type.
    pub async fn for_ticket_type(pool: &PgPool, ticket_type: &str) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, TicketExportRow>(
            r#"
            SELECT o.id AS order_id, i.item_id, i.ticket
            FROM ticket_order o
            LEFT JOIN ticket_items i ON o.id = i.tid
            WHERE o.ticket_type = $1
            ORDER BY o.created_at ASC, i.item_id ASC
            "#,
        )
        .bind(ticket_type)
        .fetch_all(pool)
        .await
        .context("failed to fetch ticket export rows")?;

        Ok(rows)
    }
}
