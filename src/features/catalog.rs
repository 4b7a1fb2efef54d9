//! Registry of field types: default footprint on creation, the control a
//! field implies when rendered, and how entered values are normalized.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::document::FieldSize;
use crate::error::EditorError;

pub const INITIALS_MAX_CHARS: usize = 2;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Signature,
    Text,
    Date,
    Checkbox,
    Initial,
}

/// Interactive control implied by a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldControl {
    SignaturePlaceholder,
    TextInput,
    DatePicker,
    Checkbox,
    InitialsInput { max_chars: usize },
}

impl FieldType {
    /// Palette order shown in the editor sidebar.
    pub const ALL: [FieldType; 5] = [
        FieldType::Signature,
        FieldType::Text,
        FieldType::Date,
        FieldType::Checkbox,
        FieldType::Initial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Signature => "signature",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::Initial => "initial",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldType::Signature => "Signature",
            FieldType::Text => "Text",
            FieldType::Date => "Date",
            FieldType::Checkbox => "Checkbox",
            FieldType::Initial => "Initial",
        }
    }

    /// Footprint given to a newly dropped field; existing fields keep theirs.
    pub fn default_size(self) -> FieldSize {
        match self {
            FieldType::Signature => FieldSize::new(200.0, 50.0),
            FieldType::Text => FieldSize::new(200.0, 40.0),
            FieldType::Date => FieldSize::new(150.0, 40.0),
            FieldType::Checkbox => FieldSize::new(30.0, 30.0),
            FieldType::Initial => FieldSize::new(100.0, 50.0),
        }
    }

    pub fn control(self) -> FieldControl {
        match self {
            FieldType::Signature => FieldControl::SignaturePlaceholder,
            FieldType::Text => FieldControl::TextInput,
            FieldType::Date => FieldControl::DatePicker,
            FieldType::Checkbox => FieldControl::Checkbox,
            FieldType::Initial => FieldControl::InitialsInput {
                max_chars: INITIALS_MAX_CHARS,
            },
        }
    }

    /// Canonical form of a value entered while signing. An empty result
    /// means "not filled".
    pub fn normalize_value(self, raw: &str) -> Result<String, String> {
        match self {
            FieldType::Signature | FieldType::Text => Ok(raw.to_string()),
            FieldType::Initial => Ok(raw.trim().chars().take(INITIALS_MAX_CHARS).collect()),
            FieldType::Checkbox => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" | "checked" => Ok("true".into()),
                "" | "false" | "0" | "off" | "no" => Ok(String::new()),
                other => Err(format!("not a checkbox state: {other}")),
            },
            FieldType::Date => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(String::new());
                }
                NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .map_err(|e| format!("not a date ({DATE_FORMAT}): {e}"))
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| EditorError::InvalidFieldType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sizes_match_catalog() {
        assert_eq!(FieldType::Signature.default_size(), FieldSize::new(200.0, 50.0));
        assert_eq!(FieldType::Text.default_size(), FieldSize::new(200.0, 40.0));
        assert_eq!(FieldType::Date.default_size(), FieldSize::new(150.0, 40.0));
        assert_eq!(FieldType::Checkbox.default_size(), FieldSize::new(30.0, 30.0));
        assert_eq!(FieldType::Initial.default_size(), FieldSize::new(100.0, 50.0));
    }

    #[test]
    fn parses_known_tokens_and_rejects_others() {
        for t in FieldType::ALL {
            assert_eq!(t.as_str().parse::<FieldType>(), Ok(t));
        }
        assert_eq!(
            "stamp".parse::<FieldType>(),
            Err(EditorError::InvalidFieldType("stamp".into()))
        );
        assert!("".parse::<FieldType>().is_err());
        assert!("Signature".parse::<FieldType>().is_err());
    }

    #[test]
    fn initials_control_limits_to_two_chars() {
        assert_eq!(
            FieldType::Initial.control(),
            FieldControl::InitialsInput { max_chars: 2 }
        );
        assert_eq!(FieldType::Initial.normalize_value(" JDX ").unwrap(), "JD");
    }

    #[test]
    fn checkbox_values_normalize_to_true_or_empty() {
        assert_eq!(FieldType::Checkbox.normalize_value("on").unwrap(), "true");
        assert_eq!(FieldType::Checkbox.normalize_value("false").unwrap(), "");
        assert!(FieldType::Checkbox.normalize_value("maybe").is_err());
    }

    #[test]
    fn dates_must_be_iso_calendar_days() {
        assert_eq!(
            FieldType::Date.normalize_value("2024-02-29").unwrap(),
            "2024-02-29"
        );
        assert!(FieldType::Date.normalize_value("2023-02-29").is_err());
        assert_eq!(FieldType::Date.normalize_value("  ").unwrap(), "");
    }

    #[test]
    fn field_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(FieldType::Checkbox).unwrap(),
            serde_json::json!("checkbox")
        );
        assert_eq!(
            serde_json::to_value(FieldType::Initial.control()).unwrap(),
            serde_json::json!({"kind": "initials_input", "max_chars": 2})
        );
    }
}
