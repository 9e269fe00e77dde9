//! Speaker form shape and validation.

use serde::Deserialize;
use serde_json::json;

use super::validate_length;

fn default_true() -> bool {
    true
}

/// Submitted speaker form fields.
///
/// Link types post as individual fields and are folded back into the stored
/// `links` map on save.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerFormData {
    /// Present on update, absent on create.
    pub id: Option<i32>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub delete_image: bool,

    #[serde(default)]
    pub twitter: Option<String>,

    #[serde(default)]
    pub github: Option<String>,

    #[serde(default)]
    pub linkedin: Option<String>,

    #[serde(default)]
    pub dribbble: Option<String>,

    #[serde(default)]
    pub video: Option<String>,

    #[serde(default)]
    pub blog: Option<String>,

    #[serde(default = "default_true")]
    pub published: bool,

    /// Agenda items this speaker appears in.
    #[serde(default)]
    pub related_agendas: Vec<i32>,

    /// Listing page, when multi-page listings are enabled.
    #[serde(default)]
    pub page: Option<i32>,

    /// Free-form extra fields.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// A validated speaker submission, ready for the manager.
#[derive(Debug, Clone)]
pub struct SpeakerSubmission {
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub links: serde_json::Value,
    pub image: Option<String>,
    pub delete_image: bool,
    pub published: bool,
    pub related_agendas: Vec<i32>,
    pub page: i32,
    pub data: Option<serde_json::Value>,
}

impl SpeakerFormData {
    /// Validate the submission.
    pub fn validate(self) -> Result<SpeakerSubmission, Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_length("name", &self.name, 255) {
            errors.push(e);
        }

        if let Some(description) = &self.description
            && description.chars().count() > 255
        {
            errors.push("description must be at most 255 characters".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let links = Self::links_map([
            ("twitter", &self.twitter),
            ("github", &self.github),
            ("linkedin", &self.linkedin),
            ("dribbble", &self.dribbble),
            ("video", &self.video),
            ("blog", &self.blog),
        ]);

        Ok(SpeakerSubmission {
            id: self.id,
            name: self.name,
            description: self.description.filter(|d| !d.trim().is_empty()),
            links,
            image: self.image.filter(|i| !i.is_empty()),
            delete_image: self.delete_image,
            published: self.published,
            related_agendas: self.related_agendas,
            page: self.page.unwrap_or(0),
            data: self.data,
        })
    }

    /// Fold the individual link fields into the stored map, dropping blanks.
    fn links_map<'a>(entries: impl IntoIterator<Item = (&'a str, &'a Option<String>)>) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (link_type, value) in entries {
            if let Some(url) = value
                && !url.trim().is_empty()
            {
                map.insert(link_type.to_string(), json!(url));
            }
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn form() -> SpeakerFormData {
        SpeakerFormData {
            id: None,
            name: "Ada Lovelace".to_string(),
            description: Some("Analytical engines".to_string()),
            image: None,
            delete_image: false,
            twitter: Some("@ada".to_string()),
            github: None,
            linkedin: Some("  ".to_string()),
            dribbble: None,
            video: None,
            blog: None,
            published: true,
            related_agendas: vec![1, 2],
            page: None,
            data: None,
        }
    }

    #[test]
    fn blank_links_are_dropped() {
        let submission = form().validate().unwrap();
        assert_eq!(submission.links, json!({"twitter": "@ada"}));
    }

    #[test]
    fn page_defaults_to_zero() {
        assert_eq!(form().validate().unwrap().page, 0);
    }

    #[test]
    fn name_is_required() {
        let mut bad = form();
        bad.name = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn long_description_is_rejected() {
        let mut bad = form();
        bad.description = Some("x".repeat(300));
        assert!(bad.validate().is_err());
    }
}
