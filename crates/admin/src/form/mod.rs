//! Form definitions and submission validation.
//!
//! The admin UI is assembled elsewhere; this module produces serializable
//! form definitions for it and validates the submitted shapes before they
//! reach the managers.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod agenda;
mod speaker;

pub use agenda::{AgendaFormData, AgendaSubmission};
pub use speaker::{SpeakerFormData, SpeakerSubmission};

/// A complete form definition.
#[derive(Debug, Clone, Serialize)]
pub struct Form {
    /// Unique form identifier (e.g., "agenda_form").
    pub form_id: String,

    /// Unique build id for this form instance.
    pub form_build_id: String,

    /// Form action URL.
    pub action: String,

    /// HTTP method.
    pub method: String,

    /// Ordered form elements.
    pub elements: Vec<FormElement>,
}

impl Form {
    /// Create a new form with the given id and action.
    pub fn new(form_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            form_build_id: uuid::Uuid::new_v4().to_string(),
            action: action.into(),
            method: "post".to_string(),
            elements: Vec::new(),
        }
    }

    /// Add an element to the form.
    pub fn element(mut self, element: FormElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Bind default values from an entity shape.
    ///
    /// Elements pick up the value under their own name; absent keys leave
    /// the element untouched.
    pub fn with_values(mut self, values: &Value) -> Self {
        let Some(values) = values.as_object() else {
            return self;
        };
        for element in &mut self.elements {
            if let Some(value) = values.get(&element.name) {
                element.default_value = Some(value.clone());
            }
        }
        self
    }
}

/// A single form element.
#[derive(Debug, Clone, Serialize)]
pub struct FormElement {
    pub name: String,

    #[serde(flatten)]
    pub element_type: ElementType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl FormElement {
    fn new(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            label: None,
            required: false,
            default_value: None,
        }
    }

    /// Hidden scalar carrier (ids, flags).
    pub fn hidden(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Hidden)
    }

    pub fn textfield(name: impl Into<String>) -> Self {
        Self::new(
            name,
            ElementType::Textfield {
                max_length: Some(255),
            },
        )
    }

    pub fn textarea(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Textarea { rows: 5 })
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Checkbox)
    }

    pub fn radios(name: impl Into<String>, options: Vec<(String, String)>) -> Self {
        Self::new(name, ElementType::Radios { options })
    }

    pub fn multi_select(name: impl Into<String>, options: Vec<(String, String)>) -> Self {
        Self::new(
            name,
            ElementType::Select {
                options,
                multiple: true,
            },
        )
    }

    /// Image reference managed through the asset-host widget.
    pub fn image(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Image)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Element type with type-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementType {
    Hidden,
    Textfield {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
    },
    Textarea {
        rows: u32,
    },
    Checkbox,
    Radios {
        options: Vec<(String, String)>,
    },
    Select {
        options: Vec<(String, String)>,
        multiple: bool,
    },
    Image,
}

/// Parse a wall-clock time in "HH:MM" form.
///
/// Accepts `.`, `,` and `:` as separators; hours must be below 24 and
/// minutes below 60. Seconds are not accepted.
pub fn validate_time(input: &str) -> Result<NaiveTime, String> {
    let message = || format!("\"{input}\" is not a valid time in the format \"HH:MM\"");

    let mut parts = input.split(['.', ',', ':']);
    let (Some(hours), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(message());
    };

    let hours: u32 = hours.trim().parse().map_err(|_| message())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| message())?;

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(message)
}

/// Require a non-empty value no longer than `max` characters.
pub fn validate_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn time_accepts_all_separators() {
        for input in ["09:30", "09.30", "09,30"] {
            assert_eq!(
                validate_time(input).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap()
            );
        }
    }

    #[test]
    fn time_accepts_single_digit_parts() {
        assert_eq!(
            validate_time("7:5").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap()
        );
    }

    #[test]
    fn time_rejects_out_of_range_parts() {
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("12:60").is_err());
        assert!(validate_time("-1:00").is_err());
    }

    #[test]
    fn time_rejects_malformed_input() {
        assert!(validate_time("").is_err());
        assert!(validate_time("noon").is_err());
        assert!(validate_time("12").is_err());
        assert!(validate_time("12:00:00").is_err());
    }

    #[test]
    fn length_check_requires_content() {
        assert!(validate_length("title", "   ", 255).is_err());
        assert!(validate_length("title", "ok", 255).is_ok());
        assert!(validate_length("title", &"x".repeat(256), 255).is_err());
    }

    #[test]
    fn with_values_binds_matching_elements() {
        let form = Form::new("agenda_form", "/admin/agenda")
            .element(FormElement::textfield("title"))
            .element(FormElement::checkbox("published"));

        let bound = form.with_values(&serde_json::json!({"title": "Opening"}));
        assert_eq!(
            bound.elements[0].default_value,
            Some(serde_json::json!("Opening"))
        );
        assert!(bound.elements[1].default_value.is_none());
    }
}
