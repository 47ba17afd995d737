//! Payload normalization and note grouping.
//!
//! The wire format tolerates three shapes for `categories` (an array of
//! category objects, a map of category objects, a map of bare note arrays)
//! plus assorted malformed entries. Everything is resolved here, once,
//! into a flat category list before grouping; the rest of the pipeline
//! never sees the wire shapes.

use crate::report;
use crate::types::{CategoriesInput, Category, FeedbackPayload, GroupedNote, Note, NoteGroup};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resolve the wire-shape `categories` into a flat category list.
///
/// Entries that are not object-shaped (and map values that are neither
/// objects nor note arrays) are dropped with a log line, not errors.
pub fn normalize_categories(input: &CategoriesInput) -> Vec<Category> {
    match input {
        CategoriesInput::Sequence(entries) => entries
            .iter()
            .filter_map(|entry| category_from_value(entry, None))
            .collect(),
        CategoriesInput::Map(map) => map
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Object(_) => category_from_value(value, Some(key)),
                Value::Array(notes) => Some(Category {
                    name: Some(key.clone()),
                    notes: notes.clone(),
                }),
                other => {
                    log::warn!("dropping category {:?}: unsupported value {}", key, other);
                    None
                }
            })
            .collect(),
        CategoriesInput::Other(value) => {
            log::warn!("categories has unsupported shape: {}", value);
            Vec::new()
        }
    }
}

/// Group every usable note under its `"<category> ( <subcategory> )"` key.
///
/// Output order is the lexicographic order of the composed key; note order
/// within a group follows the input. Missing names take the placeholder,
/// missing observations become empty, missing repeat counts become 1.
pub fn group_notes(categories: &[Category]) -> Vec<NoteGroup> {
    let mut by_key: BTreeMap<String, Vec<GroupedNote>> = BTreeMap::new();

    for category in categories {
        let category_name = category
            .name
            .clone()
            .unwrap_or_else(|| report::PLACEHOLDER.to_string());

        for entry in &category.notes {
            let Some(note) = note_from_value(entry, &category_name) else {
                continue;
            };

            let sub_category = note
                .sub_category
                .unwrap_or_else(|| report::PLACEHOLDER.to_string());
            let key = report::group_key(&category_name, &sub_category);

            by_key.entry(key).or_default().push(GroupedNote {
                category: category_name.clone(),
                sub_category,
                observation: note.observation.unwrap_or_default(),
                repeat_count: note.repeat_count.unwrap_or(1),
            });
        }
    }

    by_key
        .into_iter()
        .map(|(key, notes)| NoteGroup { key, notes })
        .collect()
}

/// Validate a payload and produce its render-ready note groups.
///
/// Fails before any template I/O: [`Error::EmptyCategories`] when the
/// collection is missing or empty, [`Error::NoValidNotes`] when nothing
/// usable survives normalization.
pub fn resolve_groups(payload: &FeedbackPayload) -> Result<Vec<NoteGroup>> {
    let input = payload.categories.as_ref().ok_or(Error::EmptyCategories)?;
    match input {
        CategoriesInput::Sequence(entries) if entries.is_empty() => {
            return Err(Error::EmptyCategories)
        }
        CategoriesInput::Map(map) if map.is_empty() => return Err(Error::EmptyCategories),
        _ => {}
    }

    let categories = normalize_categories(input);
    let groups = group_notes(&categories);
    if groups.is_empty() {
        return Err(Error::NoValidNotes);
    }

    Ok(groups)
}

/// Decode one category entry, which must be object-shaped.
///
/// `map_key` is only used for log context when the entry came from a map.
fn category_from_value(value: &Value, map_key: Option<&str>) -> Option<Category> {
    if !value.is_object() {
        log::warn!("dropping non-object category entry: {}", value);
        return None;
    }

    match serde_json::from_value(value.clone()) {
        Ok(category) => Some(category),
        Err(e) => {
            match map_key {
                Some(key) => log::warn!("dropping category {:?}: {}", key, e),
                None => log::warn!("dropping category entry: {}", e),
            }
            None
        }
    }
}

/// Decode one note entry, which must be object-shaped.
fn note_from_value(value: &Value, category_name: &str) -> Option<Note> {
    if !value.is_object() {
        log::warn!(
            "dropping non-object note in {:?}: {}",
            category_name,
            value
        );
        return None;
    }

    match serde_json::from_value(value.clone()) {
        Ok(note) => Some(note),
        Err(e) => {
            log::warn!("dropping note in {:?}: {}", category_name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(categories: Value) -> FeedbackPayload {
        FeedbackPayload::from_value(json!({ "categories": categories })).unwrap()
    }

    fn groups_of(categories: Value) -> Vec<NoteGroup> {
        resolve_groups(&payload(categories)).unwrap()
    }

    #[test]
    fn test_missing_categories_is_empty_error() {
        let err = resolve_groups(&FeedbackPayload::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyCategories));
    }

    #[test]
    fn test_empty_sequence_and_map_are_empty_errors() {
        assert!(matches!(
            resolve_groups(&payload(json!([]))),
            Err(Error::EmptyCategories)
        ));
        assert!(matches!(
            resolve_groups(&payload(json!({}))),
            Err(Error::EmptyCategories)
        ));
    }

    #[test]
    fn test_unsupported_shape_yields_no_valid_notes() {
        assert!(matches!(
            resolve_groups(&payload(json!("كلام"))),
            Err(Error::NoValidNotes)
        ));
        assert!(matches!(
            resolve_groups(&payload(json!(7))),
            Err(Error::NoValidNotes)
        ));
    }

    #[test]
    fn test_categories_with_only_malformed_notes_yield_no_valid_notes() {
        let err = resolve_groups(&payload(json!([
            {"name": "أ", "notes": ["نص عادي", "آخر"]},
            {"name": "ب", "notes": []}
        ])))
        .unwrap_err();
        assert!(matches!(err, Error::NoValidNotes));
    }

    #[test]
    fn test_basic_grouping() {
        let groups = groups_of(json!([
            {"name": "النظافة", "notes": [
                {"subCategory": "الممرات", "observation": "غبار"},
                {"subCategory": "الممرات", "observation": "نفايات"}
            ]}
        ]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "النظافة ( الممرات )");
        assert_eq!(groups[0].notes.len(), 2);
        assert_eq!(groups[0].notes[0].observation, "غبار");
        assert_eq!(groups[0].notes[1].observation, "نفايات");
    }

    #[test]
    fn test_group_order_is_lexicographic_not_input_order() {
        let groups = groups_of(json!([
            {"name": "ب", "notes": [{"subCategory": "س"}]},
            {"name": "أ", "notes": [{"subCategory": "ص"}]},
            {"name": "أ", "notes": [{"subCategory": "س"}]}
        ]));

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["أ ( س )", "أ ( ص )", "ب ( س )"]);

        // Same input reversed gives the same order.
        let reversed = groups_of(json!([
            {"name": "أ", "notes": [{"subCategory": "س"}]},
            {"name": "أ", "notes": [{"subCategory": "ص"}]},
            {"name": "ب", "notes": [{"subCategory": "س"}]}
        ]));
        let reversed_keys: Vec<&str> = reversed.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, reversed_keys);
    }

    #[test]
    fn test_same_subcategory_in_different_categories_stays_separate() {
        let groups = groups_of(json!([
            {"name": "الاستقبال", "notes": [{"subCategory": "الانتظار"}]},
            {"name": "الطوارئ", "notes": [{"subCategory": "الانتظار"}]}
        ]));
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_map_of_note_arrays_matches_equivalent_sequence() {
        let from_map = groups_of(json!({
            "النظافة": [{"subCategory": "الممرات", "observation": "غبار"}],
            "الأمن": [{"subCategory": "البوابة", "observation": "ازدحام"}]
        }));
        let from_seq = groups_of(json!([
            {"name": "النظافة", "notes": [{"subCategory": "الممرات", "observation": "غبار"}]},
            {"name": "الأمن", "notes": [{"subCategory": "البوابة", "observation": "ازدحام"}]}
        ]));

        assert_eq!(from_map, from_seq);
    }

    #[test]
    fn test_map_of_category_objects_uses_inner_name() {
        let groups = groups_of(json!({
            "مفتاح مهمل": {"name": "الصيدلية", "notes": [{"subCategory": "الصرف"}]}
        }));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "الصيدلية ( الصرف )");
    }

    #[test]
    fn test_map_with_mixed_value_kinds() {
        let groups = groups_of(json!({
            "التموين": [{"subCategory": "الوجبات"}],
            "أيا كان": {"name": "الاستقبال", "notes": [{"subCategory": "اللوحات"}]},
            "مهمل": "ليس فئة"
        }));

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["الاستقبال ( اللوحات )", "التموين ( الوجبات )"]);
    }

    #[test]
    fn test_string_entries_are_dropped_silently() {
        let groups = groups_of(json!([
            "ليست فئة",
            {"name": "أ", "notes": ["ليست ملاحظة", {"subCategory": "ب", "observation": "ج"}]}
        ]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].notes.len(), 1);
        assert_eq!(groups[0].notes[0].observation, "ج");
    }

    #[test]
    fn test_array_shaped_note_entries_are_dropped() {
        let groups = resolve_groups(&payload(json!([
            {"name": "أ", "notes": [["ب"], {"subCategory": "ج"}]}
        ])))
        .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "أ ( ج )");
    }

    #[test]
    fn test_placeholders_for_missing_names() {
        let groups = groups_of(json!([{"notes": [{"observation": "شيء"}]}]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "غير محدد ( غير محدد )");
        assert_eq!(groups[0].notes[0].category, "غير محدد");
        assert_eq!(groups[0].notes[0].sub_category, "غير محدد");
    }

    #[test]
    fn test_numeric_display_fields_render_as_text() {
        let groups = groups_of(json!([
            {"name": 7, "notes": [{"subCategory": 3, "observation": 12}]}
        ]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "7 ( 3 )");
        assert_eq!(groups[0].notes[0].observation, "12");
    }

    #[test]
    fn test_repeat_count_is_carried_and_defaulted() {
        let groups = groups_of(json!([
            {"name": "أ", "notes": [
                {"subCategory": "ب", "repeatCount": 4},
                {"subCategory": "ب"}
            ]}
        ]));

        assert_eq!(groups[0].notes[0].repeat_count, 4);
        assert_eq!(groups[0].notes[1].repeat_count, 1);
    }

    #[test]
    fn test_missing_observation_becomes_empty() {
        let groups = groups_of(json!([{"name": "أ", "notes": [{"subCategory": "ب"}]}]));
        assert_eq!(groups[0].notes[0].observation, "");
    }
}
