#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for the attendee CSV export format.

use rostrum_admin::export::{COLUMNS, render_csv};
use rostrum_admin::models::TicketExportRow;
use serde_json::json;

fn row(order_id: &str, item_id: i32, ticket: serde_json::Value) -> TicketExportRow {
    TicketExportRow {
        order_id: order_id.to_string(),
        item_id: Some(item_id),
        ticket: Some(ticket),
    }
}

#[test]
fn export_always_starts_with_separator_hint_and_header() {
    let csv = render_csv(&[]);
    let mut lines = csv.lines();

    assert_eq!(lines.next(), Some("sep=;"));
    assert_eq!(lines.next(), Some(COLUMNS.join(",").as_str()));
    assert_eq!(lines.next(), None);
}

#[test]
fn full_ticket_renders_one_quoted_row() {
    let csv = render_csv(&[row(
        "a1b2c3",
        11,
        json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "company": "Navy",
            "city": "Arlington",
            "country": "US",
            "twitter": "@grace",
            "lat": 38.88,
            "long": -77.09,
        }),
    )]);

    let last = csv.lines().last().unwrap();
    assert_eq!(
        last,
        "\"11\",\"a1b2c3\",\"Grace\",\"Hopper\",\"grace@example.com\",\"Navy\",\"Arlington\",\"US\",\"@grace\",\"38.88\",\"-77.09\""
    );
}

#[test]
fn ticket_blob_cannot_override_item_and_order_ids() {
    // A blob that tries to smuggle its own id/ticket columns loses to the
    // joined row values.
    let csv = render_csv(&[row("real-order", 5, json!({"id": 999, "ticket": "fake"}))]);

    let last = csv.lines().last().unwrap();
    assert!(last.starts_with("\"5\",\"real-order\""));
}

#[test]
fn rows_without_ticket_items_are_omitted() {
    let rows = vec![
        TicketExportRow {
            order_id: "empty".to_string(),
            item_id: None,
            ticket: None,
        },
        row("full", 1, json!({"firstName": "Alan"})),
    ];

    let csv = render_csv(&rows);
    assert_eq!(csv.lines().count(), 3);
    assert!(!csv.contains("empty"));
}

#[test]
fn malformed_ticket_blob_still_exports_ids() {
    let csv = render_csv(&[TicketExportRow {
        order_id: "odd".to_string(),
        item_id: Some(3),
        ticket: Some(json!("not an object")),
    }]);

    let last = csv.lines().last().unwrap();
    assert!(last.starts_with("\"3\",\"odd\","));
}
