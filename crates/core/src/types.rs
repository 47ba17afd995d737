//! Domain types for the feedback payload and the grouped report content.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level input for one report.
///
/// Every field tolerates being absent; placeholders are applied at render
/// time so a half-filled intake form still produces a deck.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    /// Facility the visit report is about.
    #[serde(default, deserialize_with = "scalar_string")]
    pub hospital: Option<String>,

    /// Intake ticket identifier, also embedded in the download filename.
    #[serde(default, deserialize_with = "scalar_string")]
    pub ticket_id: Option<String>,

    /// The observation categories, in any of the three accepted shapes.
    #[serde(default)]
    pub categories: Option<CategoriesInput>,
}

impl FeedbackPayload {
    /// Parse a payload out of an already-decoded JSON value.
    ///
    /// Anything but a JSON object counts as an empty submission, not a
    /// server fault.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        if !value.is_object() {
            log::debug!("rejecting non-object payload");
            return Err(crate::Error::EmptyCategories);
        }
        serde_json::from_value(value).map_err(|e| {
            log::debug!("rejecting malformed payload: {}", e);
            crate::Error::EmptyCategories
        })
    }
}

/// Accept any JSON scalar where display text is expected.
///
/// Intake clients have sent numeric ticket ids and subcategory codes;
/// numbers and booleans are rendered as their text form. Non-scalars
/// count as unset.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// The `categories` collection as it arrives on the wire.
///
/// Intake clients have historically sent three shapes. They are resolved
/// into one flat list of [`Category`] by
/// [`normalize_categories`](crate::normalize::normalize_categories) before
/// any business logic runs; nothing downstream sees the wire shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoriesInput {
    /// An array of category objects.
    Sequence(Vec<Value>),

    /// An object keyed by category name. Each value is either a full
    /// category object (whose own `name` wins) or a bare array of notes
    /// (the map key becomes the category name). Kinds may be mixed.
    Map(BTreeMap<String, Value>),

    /// Anything else. Normalizes to no categories at all.
    Other(Value),
}

/// A named group of visit notes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,

    /// Raw note entries; non-object entries are dropped at normalization.
    #[serde(default)]
    pub notes: Vec<Value>,
}

/// A single observation recorded during the visit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, deserialize_with = "scalar_string")]
    pub sub_category: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub observation: Option<String>,

    /// How many times the observation recurred. Accepted from the intake
    /// form but never rendered in the deck.
    #[serde(default)]
    pub repeat_count: Option<i64>,
}

/// A note after normalization, tagged with its resolved names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedNote {
    pub category: String,
    pub sub_category: String,
    pub observation: String,
    /// Carried through from [`Note::repeat_count`], defaulted to 1.
    pub repeat_count: i64,
}

/// All notes sharing one category + subcategory display key.
///
/// Each group renders as one slide; groups are ordered lexicographically
/// by `key`, not by input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGroup {
    /// Display key, `"<category> ( <subcategory> )"`.
    pub key: String,
    pub notes: Vec<GroupedNote>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_from_object() {
        let payload = FeedbackPayload::from_value(json!({
            "hospital": "مستشفى الملك",
            "ticketId": "T-100",
            "categories": []
        }))
        .unwrap();

        assert_eq!(payload.hospital.as_deref(), Some("مستشفى الملك"));
        assert_eq!(payload.ticket_id.as_deref(), Some("T-100"));
        assert!(matches!(
            payload.categories,
            Some(CategoriesInput::Sequence(ref v)) if v.is_empty()
        ));
    }

    #[test]
    fn test_payload_fields_default_to_none() {
        let payload = FeedbackPayload::from_value(json!({})).unwrap();
        assert!(payload.hospital.is_none());
        assert!(payload.ticket_id.is_none());
        assert!(payload.categories.is_none());
    }

    #[test]
    fn test_scalar_hospital_and_ticket_become_text() {
        let payload = FeedbackPayload::from_value(json!({
            "hospital": 5,
            "ticketId": 9,
            "categories": [{"name": "أ", "notes": [{"subCategory": "ب"}]}]
        }))
        .unwrap();

        assert_eq!(payload.hospital.as_deref(), Some("5"));
        assert_eq!(payload.ticket_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_non_scalar_hospital_and_ticket_count_as_unset() {
        let payload = FeedbackPayload::from_value(json!({
            "hospital": ["قائمة"],
            "ticketId": {"رقم": 1}
        }))
        .unwrap();

        assert!(payload.hospital.is_none());
        assert!(payload.ticket_id.is_none());

        let payload = FeedbackPayload::from_value(json!({"ticketId": null})).unwrap();
        assert!(payload.ticket_id.is_none());
    }

    #[test]
    fn test_payload_from_non_object_is_validation_error() {
        let err = FeedbackPayload::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(err.is_validation());

        let err = FeedbackPayload::from_value(json!("نص")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_categories_shapes_deserialize_to_expected_variants() {
        let seq: CategoriesInput = serde_json::from_value(json!([{"name": "أ"}])).unwrap();
        assert!(matches!(seq, CategoriesInput::Sequence(_)));

        let map: CategoriesInput =
            serde_json::from_value(json!({"أ": {"name": "أ", "notes": []}})).unwrap();
        assert!(matches!(map, CategoriesInput::Map(_)));

        let other: CategoriesInput = serde_json::from_value(json!("كلام")).unwrap();
        assert!(matches!(other, CategoriesInput::Other(_)));
    }

    #[test]
    fn test_note_accepts_missing_fields() {
        let note: Note = serde_json::from_value(json!({})).unwrap();
        assert!(note.sub_category.is_none());
        assert!(note.observation.is_none());
        assert!(note.repeat_count.is_none());

        let note: Note =
            serde_json::from_value(json!({"subCategory": "نظافة", "repeatCount": 3})).unwrap();
        assert_eq!(note.sub_category.as_deref(), Some("نظافة"));
        assert_eq!(note.repeat_count, Some(3));
    }
}
