//! Agenda form shape and validation.

use chrono::NaiveTime;
use serde::Deserialize;

use crate::models::tag;

use super::{validate_length, validate_time};

fn default_true() -> bool {
    true
}

/// Submitted agenda form fields, as posted by the admin UI.
#[derive(Debug, Clone, Deserialize)]
pub struct AgendaFormData {
    /// Present on update, absent on create.
    pub id: Option<i32>,

    pub title: String,

    /// "HH:MM" start time.
    pub start: String,

    /// "HH:MM" end time.
    pub stop: String,

    /// Track index.
    pub category: i32,

    #[serde(default)]
    pub description: Option<String>,

    /// Replacement image reference from the upload widget.
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub delete_image: bool,

    /// Comma-separated tag names.
    #[serde(default)]
    pub tags: String,

    #[serde(default = "default_true")]
    pub published: bool,

    /// Related agenda ids (unordered cross-references).
    #[serde(default)]
    pub related_agendas: Vec<i32>,

    /// Related speaker ids.
    #[serde(default)]
    pub speakers: Vec<i32>,

    /// Free-form extra fields.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// A validated agenda submission, ready for the manager.
#[derive(Debug, Clone)]
pub struct AgendaSubmission {
    pub id: Option<i32>,
    pub title: String,
    pub start: NaiveTime,
    pub stop: NaiveTime,
    pub category: i32,
    pub description: Option<String>,
    pub image: Option<String>,
    pub delete_image: bool,
    pub tags: Vec<String>,
    pub published: bool,
    pub related_agendas: Vec<i32>,
    pub speakers: Vec<i32>,
    pub data: Option<serde_json::Value>,
}

impl AgendaFormData {
    /// Validate the submission against the configured tracks.
    ///
    /// Collects every failure rather than stopping at the first. A related
    /// agenda id equal to the item's own id is rejected: the symmetric
    /// relationship has no meaningful self-edge.
    pub fn validate(self, tracks: &[String]) -> Result<AgendaSubmission, Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_length("title", &self.title, 255) {
            errors.push(e);
        }

        let start = validate_time(&self.start).map_err(|e| errors.push(e));
        let stop = validate_time(&self.stop).map_err(|e| errors.push(e));

        if self.category < 0 || self.category as usize >= tracks.len() {
            errors.push(format!("\"{}\" is not a known track", self.category));
        }

        if let Some(id) = self.id
            && self.related_agendas.contains(&id)
        {
            errors.push("an agenda item cannot relate to itself".to_string());
        }

        let (Ok(start), Ok(stop)) = (start, stop) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(AgendaSubmission {
            id: self.id,
            title: self.title,
            start,
            stop,
            category: self.category,
            description: self.description.filter(|d| !d.trim().is_empty()),
            image: self.image.filter(|i| !i.is_empty()),
            delete_image: self.delete_image,
            tags: tag::separate(&self.tags),
            published: self.published,
            related_agendas: self.related_agendas,
            speakers: self.speakers,
            data: self.data,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn tracks() -> Vec<String> {
        vec!["Left".to_string(), "Right".to_string()]
    }

    fn form() -> AgendaFormData {
        AgendaFormData {
            id: None,
            title: "Opening keynote".to_string(),
            start: "09:00".to_string(),
            stop: "09:45".to_string(),
            category: 0,
            description: None,
            image: None,
            delete_image: false,
            tags: "keynote, rust".to_string(),
            published: true,
            related_agendas: vec![],
            speakers: vec![],
            data: None,
        }
    }

    #[test]
    fn valid_form_passes() {
        let submission = form().validate(&tracks()).unwrap();
        assert_eq!(submission.start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(submission.tags, vec!["keynote", "rust"]);
    }

    #[test]
    fn all_failures_are_collected() {
        let mut bad = form();
        bad.title = String::new();
        bad.start = "25:00".to_string();
        bad.category = 9;

        let errors = bad.validate(&tracks()).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut bad = form();
        bad.id = Some(12);
        bad.related_agendas = vec![3, 12];

        let errors = bad.validate(&tracks()).unwrap_err();
        assert_eq!(errors, vec!["an agenda item cannot relate to itself"]);
    }

    #[test]
    fn empty_image_is_treated_as_absent() {
        let mut f = form();
        f.image = Some(String::new());
        let submission = f.validate(&tracks()).unwrap();
        assert!(submission.image.is_none());
    }
}
