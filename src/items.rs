use crate::fields::FieldPatch;
use crate::statics;
use crate::value::FormValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A row as stored in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedItem {
    pub value: i64,
    pub label: String,
}

impl PersistedItem {
    pub fn to_value(&self) -> FormValue {
        let mut row = IndexMap::new();
        row.insert(statics::ITEM_VALUE.to_string(), FormValue::from(self.value));
        row.insert(statics::ITEM_LABEL.to_string(), FormValue::from(self.label.as_str()));
        FormValue::Object(row)
    }
}

/// A row as shown in the property editor. `value` is fixed once the row exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableItem {
    value: i64,
    pub label: String,
    display_label: Option<&'static str>,
}

impl EditableItem {
    pub fn new(value: i64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            display_label: caption_for(value),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn display_label(&self) -> Option<&'static str> {
        self.display_label
    }

    pub fn relabel(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn to_persisted(&self) -> PersistedItem {
        PersistedItem {
            value: self.value,
            label: self.label.clone(),
        }
    }

    /// Editor-side representation, caption included.
    pub fn to_value(&self) -> FormValue {
        let mut row = IndexMap::new();
        row.insert(statics::ITEM_VALUE.to_string(), FormValue::from(self.value));
        row.insert(
            statics::ITEM_DISPLAY_LABEL.to_string(),
            FormValue::from(self.display_label),
        );
        row.insert(statics::ITEM_LABEL.to_string(), FormValue::from(self.label.as_str()));
        FormValue::Object(row)
    }
}

/// Read-only caption for an item value.
pub fn caption_for(value: i64) -> Option<&'static str> {
    match value {
        statics::OPTION_OPT_IN => Some(statics::EN_CAPTION_OPT_IN),
        statics::OPTION_OPT_OUT => Some(statics::EN_CAPTION_OPT_OUT),
        statics::OPTION_NO_CHANGE => Some(statics::EN_CAPTION_NO_CHANGE),
        _ => None,
    }
}

pub fn default_items() -> Vec<EditableItem> {
    vec![
        EditableItem::new(statics::OPTION_OPT_IN, statics::EN_ITEM_LABEL_OPT_IN),
        EditableItem::new(statics::OPTION_OPT_OUT, statics::EN_ITEM_LABEL_OPT_OUT),
        EditableItem::new(statics::OPTION_NO_CHANGE, statics::EN_ITEM_LABEL_NO_CHANGE),
    ]
}

/// True when the rows match the default list value-for-value and label-for-label, in order.
pub fn is_default(items: &[EditableItem]) -> bool {
    let defaults = default_items();
    items.len() == defaults.len()
        && items
            .iter()
            .zip(&defaults)
            .all(|(a, b)| a.value == b.value && a.label == b.label)
}

/// Persistence patch for the `items` member.
pub fn save_items(items: &[EditableItem]) -> FieldPatch {
    if is_default(items) {
        return FieldPatch::remove(statics::FIELD_ITEMS);
    }

    let rows = items.iter().map(|i| i.to_persisted().to_value()).collect();
    FieldPatch::update(statics::FIELD_ITEMS, FormValue::Array(rows))
}

/// Editable rows for a persisted `items` member, or the defaults when it is missing.
pub fn load_items(persisted: Option<&FormValue>) -> Vec<EditableItem> {
    match persisted {
        None | Some(FormValue::Null) => default_items(),
        Some(value @ FormValue::Array(_)) => parse_persisted(value)
            .into_iter()
            .map(|p| EditableItem::new(p.value, p.label))
            .collect(),
        Some(other) => {
            warn!(found = other.type_name(), "items member is not an array, using defaults");
            default_items()
        }
    }
}

/// Reads `{value, label}` rows; any stored caption is ignored.
pub fn parse_persisted(value: &FormValue) -> Vec<PersistedItem> {
    let Some(rows) = value.as_array() else {
        warn!(found = value.type_name(), "items member is not an array");
        return Vec::new();
    };

    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let value = row.get(statics::ITEM_VALUE).and_then(FormValue::as_i64);
            let label = row.get(statics::ITEM_LABEL).and_then(FormValue::as_str);
            match (value, label) {
                (Some(value), Some(label)) => Some(PersistedItem {
                    value,
                    label: label.to_string(),
                }),
                _ => {
                    warn!(index, "skipping malformed option row");
                    None
                }
            }
        })
        .collect()
}

pub fn items_to_value(items: &[EditableItem]) -> FormValue {
    FormValue::Array(items.iter().map(EditableItem::to_value).collect())
}

/// Move a row; returns false when either index is out of range.
pub fn move_item(items: &mut Vec<EditableItem>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let row = items.remove(from);
    items.insert(to, row);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rows_carry_captions() {
        let rows = default_items();
        let summary: Vec<(i64, &str, Option<&str>)> = rows
            .iter()
            .map(|r| (r.value(), r.label.as_str(), r.display_label()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Opt In", Some("Opt in")),
                (0, "Opt Out", Some("Opt out")),
                (2, "No Change", Some("No change")),
            ]
        );
    }

    #[test]
    fn untouched_default_is_removed_on_save() {
        let patch = save_items(&default_items());
        assert!(patch.update.is_empty());
        assert_eq!(patch.remove, vec![statics::FIELD_ITEMS.to_string()]);
    }

    #[test]
    fn relabeled_rows_save_without_captions() {
        let mut rows = default_items();
        rows[0].relabel("Yes please");
        let patch = save_items(&rows);

        assert!(patch.remove.is_empty());
        let saved = patch.update.get(statics::FIELD_ITEMS).unwrap();
        let first = &saved.as_array().unwrap()[0];
        assert_eq!(first.get(statics::ITEM_LABEL).and_then(FormValue::as_str), Some("Yes please"));
        assert!(first.get(statics::ITEM_DISPLAY_LABEL).is_none());
    }

    #[test]
    fn reordered_default_labels_are_not_default() {
        let mut rows = default_items();
        assert!(move_item(&mut rows, 2, 0));
        assert!(!is_default(&rows));
        let patch = save_items(&rows);
        let saved = patch.update.get(statics::FIELD_ITEMS).unwrap().as_array().unwrap();
        let values: Vec<i64> = saved.iter().filter_map(|r| r.get("value")?.as_i64()).collect();
        assert_eq!(values, vec![2, 1, 0]);
    }

    #[test]
    fn load_regenerates_captions_and_ignores_stored_ones() {
        let stored = FormValue::parse_json5(
            "[{ value: 0, label: 'Nope', displayLabel: 'stale' }, { value: 1, label: 'Sure' }]",
        )
        .unwrap();
        let rows = load_items(Some(&stored));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].display_label(), Some("Opt out"));
        assert_eq!(rows[0].label, "Nope");
        assert_eq!(rows[1].display_label(), Some("Opt in"));
    }

    #[test]
    fn load_without_items_yields_defaults() {
        assert_eq!(load_items(None), default_items());
        assert_eq!(load_items(Some(&FormValue::Null)), default_items());
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let stored = FormValue::parse_json5("[{ value: 'x', label: 'a' }, { value: 2, label: 'Keep' }, 5]").unwrap();
        let rows = parse_persisted(&stored);
        assert_eq!(
            rows,
            vec![PersistedItem {
                value: 2,
                label: "Keep".to_string()
            }]
        );
    }

    #[test]
    fn non_array_items_fall_back_to_defaults() {
        assert_eq!(load_items(Some(&FormValue::from("oops"))), default_items());
    }

    #[test]
    fn move_item_rejects_out_of_range() {
        let mut rows = default_items();
        assert!(!move_item(&mut rows, 0, 3));
        assert_eq!(rows, default_items());
    }
}
