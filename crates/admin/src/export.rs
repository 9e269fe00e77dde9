//! Attendee CSV rendering.
//!
//! The spreadsheet-facing format is fixed: a `sep=;` hint line, a header
//! row, then one row per ticket item with every field double-quoted.

use crate::models::TicketExportRow;

/// Exported columns, in order. `id` is the ticket item id and `ticket` the
/// order id; the rest come from the attendee details blob.
pub const COLUMNS: [&str; 11] = [
    "id", "ticket", "firstName", "lastName", "email", "company", "city", "country", "twitter",
    "lat", "long",
];

/// Render export rows into the final CSV body.
///
/// With no rows this still yields the hint and header lines.
pub fn render_csv(rows: &[TicketExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push("sep=;".to_string());
    lines.push(COLUMNS.join(","));

    for row in rows {
        // A left-join miss means an order without items: nothing to export.
        let Some(item_id) = row.item_id else {
            continue;
        };

        let mut ticket = match row.ticket.clone() {
            Some(serde_json::Value::Object(fields)) => fields,
            _ => serde_json::Map::new(),
        };
        ticket.insert("id".to_string(), serde_json::json!(item_id));
        ticket.insert("ticket".to_string(), serde_json::json!(row.order_id));

        let fields: Vec<String> = COLUMNS
            .iter()
            .map(|column| quoted(ticket.get(*column)))
            .collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Quote a single field, doubling embedded quotes.
fn quoted(value: Option<&serde_json::Value>) -> String {
    let text = match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    format!("\"{}\"", text.replace('"', "\"\""))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(order_id: &str, item_id: i32, ticket: serde_json::Value) -> TicketExportRow {
        TicketExportRow {
            order_id: order_id.to_string(),
            item_id: Some(item_id),
            ticket: Some(ticket),
        }
    }

    #[test]
    fn empty_export_has_hint_and_header_only() {
        let csv = render_csv(&[]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "sep=;");
        assert_eq!(
            lines[1],
            "id,ticket,firstName,lastName,email,company,city,country,twitter,lat,long"
        );
    }

    #[test]
    fn item_and_order_ids_land_in_the_first_two_columns() {
        let csv = render_csv(&[row(
            "ord-1",
            42,
            json!({"firstName": "Grace", "lastName": "Hopper", "email": "grace@example.com"}),
        )]);
        let last = csv.lines().last().unwrap();
        assert!(last.starts_with("\"42\",\"ord-1\",\"Grace\",\"Hopper\",\"grace@example.com\""));
    }

    #[test]
    fn missing_fields_export_as_empty_quoted_strings() {
        let csv = render_csv(&[row("ord-2", 7, json!({"firstName": "Alan"}))]);
        let last = csv.lines().last().unwrap();
        assert_eq!(
            last,
            "\"7\",\"ord-2\",\"Alan\",\"\",\"\",\"\",\"\",\"\",\"\",\"\",\"\""
        );
    }

    #[test]
    fn numeric_fields_render_unquoted_json_inside_quotes() {
        let csv = render_csv(&[row("ord-3", 1, json!({"lat": 59.33, "long": 18.07}))]);
        let last = csv.lines().last().unwrap();
        assert!(last.ends_with("\"59.33\",\"18.07\""));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let csv = render_csv(&[row("ord-4", 2, json!({"company": "\"Quoted\" AB"}))]);
        assert!(csv.contains("\"\"\"Quoted\"\" AB\""));
    }

    #[test]
    fn orders_without_items_are_skipped() {
        let rows = vec![TicketExportRow {
            order_id: "ord-5".to_string(),
            item_id: None,
            ticket: None,
        }];
        let csv = render_csv(&rows);
        assert_eq!(csv.lines().count(), 2);
    }
}
