//! Database models and CRUD operations.

pub mod agenda;
pub mod speaker;
pub mod tag;
pub mod ticket;

pub use agenda::{AgendaChanges, AgendaItem, AgendaRelationship, ImageChange, NewAgendaItem};
pub use speaker::{NewSpeaker, Speaker, SpeakerAgenda, SpeakerChanges};
pub use ticket::TicketExportRow;

/// Merge a free-form `data` blob into an entity value.
///
/// Blob entries override columns of the same name; non-object blobs are
/// ignored.
pub(crate) fn merge_data_blob(target: &mut serde_json::Value, data: Option<serde_json::Value>) {
    let (Some(target), Some(serde_json::Value::Object(entries))) = (target.as_object_mut(), data)
    else {
        return;
    };
    for (key, value) in entries {
        target.insert(key, value);
    }
}

/// Copy entries into an entity value without overriding existing keys.
///
/// Used for the speaker `links` map: a link type only surfaces at the top
/// level when no column already claimed that name.
pub(crate) fn fill_missing(target: &mut serde_json::Value, entries: Option<serde_json::Value>) {
    let (Some(target), Some(serde_json::Value::Object(entries))) = (target.as_object_mut(), entries)
    else {
        return;
    };
    for (key, value) in entries {
        if !target.contains_key(&key) {
            target.insert(key, value);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_blob_overrides_columns() {
        let mut value = json!({"id": 1, "title": "Opening"});
        merge_data_blob(&mut value, Some(json!({"title": "Keynote", "room": "A1"})));

        assert_eq!(value["title"], "Keynote");
        assert_eq!(value["room"], "A1");
        assert_eq!(value["id"], 1);
    }

    #[test]
    fn non_object_blob_is_ignored() {
        let mut value = json!({"id": 1});
        merge_data_blob(&mut value, Some(json!("garbage")));
        merge_data_blob(&mut value, None);
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn fill_missing_never_overrides() {
        let mut value = json!({"id": 1, "twitter": "@kept"});
        fill_missing(
            &mut value,
            Some(json!({"twitter": "@dropped", "github": "octocat"})),
        );

        assert_eq!(value["twitter"], "@kept");
        assert_eq!(value["github"], "octocat");
    }
}
