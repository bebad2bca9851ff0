use crate::host::SelectOption;
use crate::items::{self, EditableItem};
use crate::schema::ElementKind;
use crate::statics;
use crate::sync::{self, Watcher};
use crate::value::FormValue;
use indexmap::IndexMap;
use serde::Serialize;

/// Member updates and removals returned by a field's `save` override.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldPatch {
    pub update: IndexMap<String, FormValue>,
    pub remove: Vec<String>,
}

impl FieldPatch {
    pub fn update(key: &str, value: FormValue) -> Self {
        let mut update = IndexMap::new();
        update.insert(key.to_string(), value);
        Self {
            update,
            remove: Vec::new(),
        }
    }

    pub fn remove(key: &str) -> Self {
        Self {
            update: IndexMap::new(),
            remove: vec![key.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.remove.is_empty()
    }
}

/// A fixed choice of a radio group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: FormValue,
    pub label: &'static str,
}

impl Choice {
    fn new(value: impl Into<FormValue>, label: &'static str) -> Self {
        Self {
            value: value.into(),
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubFieldKind {
    Hidden {
        meta: bool,
    },
    Static {
        content: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<&'static str>,
    },
    #[serde(rename_all = "camelCase")]
    Select {
        items: Vec<SelectOption>,
        search: bool,
        placeholder: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        no_options_text: Option<&'static str>,
        allow_absent: bool,
    },
    Radiogroup {
        items: Vec<Choice>,
        default: FormValue,
        tabs: bool,
    },
    List {
        default: Vec<EditableItem>,
        placeholder: &'static str,
        sort: bool,
        add: bool,
        remove: bool,
    },
}

/// Declarative description of one editor input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubField {
    pub key: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_columns: Option<u8>,
    #[serde(flatten)]
    pub kind: SubFieldKind,
}

impl SubField {
    fn new(key: &'static str, kind: SubFieldKind) -> Self {
        Self {
            key,
            label: None,
            label_columns: None,
            kind,
        }
    }

    fn labeled(mut self, label: &'static str, columns: Option<u8>) -> Self {
        self.label = Some(label);
        self.label_columns = columns;
        self
    }
}

/// State a field's schema may depend on.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    pub kind: ElementKind,
    /// Channels not held by another element.
    pub channel_options: Vec<SelectOption>,
}

/// One pluggable editor module of the property panel. It declares the
/// sub-fields it renders, and may override persistence (`save`), editor
/// population (`load`), or declare derived-field watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Type,
    Id,
    Default,
    View,
    Channel,
    Statement,
    Mode,
    OnlyAllowOptOut,
    ShowChannel,
    Items,
}

static ID_WATCHERS: [Watcher; 1] = [Watcher {
    target: statics::FIELD_ID,
    sources: &[statics::FIELD_CHANNEL, statics::FIELD_STATEMENT],
    recompute: sync::composite_id,
}];

static DEFAULT_WATCHERS: [Watcher; 1] = [Watcher {
    target: statics::FIELD_DEFAULT,
    sources: &[statics::FIELD_MODE, statics::FIELD_ONLY_ALLOW_OPT_OUT],
    recompute: sync::default_for_mode,
}];

impl PropertyField {
    /// The member this field edits.
    pub fn key(self) -> &'static str {
        match self {
            PropertyField::Type => statics::FIELD_TYPE,
            PropertyField::Id => statics::FIELD_ID,
            PropertyField::Default => statics::FIELD_DEFAULT,
            PropertyField::View => statics::FIELD_VIEW,
            PropertyField::Channel => statics::FIELD_CHANNEL,
            PropertyField::Statement => statics::FIELD_STATEMENT,
            PropertyField::Mode => statics::FIELD_MODE,
            PropertyField::OnlyAllowOptOut => statics::FIELD_ONLY_ALLOW_OPT_OUT,
            PropertyField::ShowChannel => statics::FIELD_SHOW_CHANNEL,
            PropertyField::Items => statics::FIELD_ITEMS,
        }
    }

    pub fn schema(self, ctx: &SchemaContext) -> Vec<SubField> {
        match self {
            PropertyField::Type => vec![SubField::new(
                statics::FIELD_TYPE,
                SubFieldKind::Static {
                    content: ctx.kind.label(),
                    description: Some(ctx.kind.description()),
                },
            )],
            PropertyField::Id => vec![SubField::new(statics::FIELD_ID, SubFieldKind::Hidden { meta: true })],
            PropertyField::Default => vec![SubField::new(
                statics::FIELD_DEFAULT,
                SubFieldKind::Hidden { meta: true },
            )],
            PropertyField::View => vec![
                SubField::new(
                    statics::FIELD_VIEW,
                    SubFieldKind::Radiogroup {
                        items: vec![
                            Choice::new(statics::VIEW_DEFAULT, statics::EN_CHOICE_DEFAULT),
                            Choice::new(statics::VIEW_TABS, statics::EN_CHOICE_TABS),
                            Choice::new(statics::VIEW_BLOCKS, statics::EN_CHOICE_BLOCKS),
                        ],
                        default: FormValue::from(statics::VIEW_DEFAULT),
                        tabs: true,
                    },
                )
                .labeled(statics::EN_LABEL_VIEW, Some(5)),
            ],
            PropertyField::Channel => vec![
                SubField::new(
                    statics::FIELD_CHANNEL,
                    SubFieldKind::Select {
                        items: ctx.channel_options.clone(),
                        search: true,
                        placeholder: statics::EN_PLACEHOLDER_CHANNEL,
                        no_options_text: None,
                        allow_absent: false,
                    },
                )
                .labeled(statics::EN_LABEL_CHANNEL, Some(3)),
            ],
            // Options arrive through the widget once a channel is known.
            PropertyField::Statement => vec![
                SubField::new(
                    statics::FIELD_STATEMENT,
                    SubFieldKind::Select {
                        items: Vec::new(),
                        search: true,
                        placeholder: statics::EN_PLACEHOLDER_STATEMENT,
                        no_options_text: Some(statics::EN_NO_STATEMENTS),
                        allow_absent: true,
                    },
                )
                .labeled(statics::EN_LABEL_STATEMENT, Some(3)),
            ],
            PropertyField::Mode => vec![SubField::new(
                statics::FIELD_MODE,
                SubFieldKind::Radiogroup {
                    items: vec![
                        Choice::new(statics::MODE_BINARY, statics::EN_CHOICE_BINARY),
                        Choice::new(statics::MODE_TRINARY, statics::EN_CHOICE_TRINARY),
                    ],
                    default: FormValue::from(statics::MODE_BINARY),
                    tabs: true,
                },
            )],
            PropertyField::OnlyAllowOptOut => vec![
                SubField::new(statics::FIELD_ONLY_ALLOW_OPT_OUT, on_off(0))
                    .labeled(statics::EN_LABEL_ONLY_ALLOW_OPT_OUT, Some(8)),
            ],
            PropertyField::ShowChannel => vec![
                SubField::new(statics::FIELD_SHOW_CHANNEL, on_off(1))
                    .labeled(statics::EN_LABEL_SHOW_CHANNEL, Some(8)),
            ],
            PropertyField::Items => vec![
                SubField::new(
                    statics::FIELD_SUBTITLE_ITEMS,
                    SubFieldKind::Static {
                        content: statics::EN_LABEL_OPTIONS,
                        description: None,
                    },
                ),
                SubField::new(
                    statics::FIELD_ITEMS,
                    SubFieldKind::List {
                        default: items::default_items(),
                        placeholder: statics::EN_LABEL_ITEM_PLACEHOLDER,
                        sort: true,
                        add: false,
                        remove: false,
                    },
                ),
            ],
        }
    }

    /// Persistence override. `None` means the host stores `new` under `key` as-is.
    pub fn save(self, new: &FormValue, _old: Option<&FormValue>, _key: &str, _path: &str) -> Option<FieldPatch> {
        match self {
            PropertyField::Items => Some(items::save_items(&items::load_items(Some(new)))),
            _ => None,
        }
    }

    /// Initial editable values derived from persisted element data, run once per population.
    pub fn load(self, data: &IndexMap<String, FormValue>) -> Option<IndexMap<String, FormValue>> {
        match self {
            PropertyField::Items => {
                let rows = items::load_items(data.get(statics::FIELD_ITEMS));
                let mut loaded = IndexMap::new();
                loaded.insert(statics::FIELD_ITEMS.to_string(), items::items_to_value(&rows));
                Some(loaded)
            }
            _ => None,
        }
    }

    pub fn watchers(self) -> &'static [Watcher] {
        match self {
            PropertyField::Id => &ID_WATCHERS,
            PropertyField::Default => &DEFAULT_WATCHERS,
            _ => &[],
        }
    }
}

fn on_off(default: i64) -> SubFieldKind {
    SubFieldKind::Radiogroup {
        items: vec![
            Choice::new(1_i64, statics::EN_CHOICE_ON),
            Choice::new(0_i64, statics::EN_CHOICE_OFF),
        ],
        default: FormValue::from(default),
        tabs: true,
    }
}

const RADIO_FIELDS: &[PropertyField] = &[
    PropertyField::Type,
    PropertyField::Id,
    PropertyField::Default,
    PropertyField::View,
    PropertyField::Channel,
    PropertyField::Statement,
    PropertyField::Mode,
    PropertyField::OnlyAllowOptOut,
    PropertyField::ShowChannel,
    PropertyField::Items,
];

const SWITCH_FIELDS: &[PropertyField] = &[
    PropertyField::Type,
    PropertyField::Id,
    PropertyField::Channel,
    PropertyField::Statement,
    PropertyField::ShowChannel,
];

const RADIO_SEPARATORS: &[&[&str]] = &[
    &[statics::FIELD_TYPE, statics::FIELD_ID, statics::FIELD_DEFAULT, statics::FIELD_VIEW],
    &[statics::FIELD_CHANNEL, statics::FIELD_STATEMENT],
    &[statics::FIELD_MODE, statics::FIELD_ONLY_ALLOW_OPT_OUT, statics::FIELD_SHOW_CHANNEL],
    &[statics::FIELD_ITEMS],
];

const SWITCH_SEPARATORS: &[&[&str]] = &[
    &[statics::FIELD_TYPE, statics::FIELD_ID, statics::FIELD_CHANNEL, statics::FIELD_STATEMENT],
    &[statics::FIELD_SHOW_CHANNEL],
];

impl ElementKind {
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Radio => statics::EN_KIND_RADIO_LABEL,
            ElementKind::Checkbox => statics::EN_KIND_CHECKBOX_LABEL,
            ElementKind::Toggle => statics::EN_KIND_TOGGLE_LABEL,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ElementKind::Radio => statics::EN_KIND_RADIO_DESCRIPTION,
            ElementKind::Checkbox => statics::EN_KIND_CHECKBOX_DESCRIPTION,
            ElementKind::Toggle => statics::EN_KIND_TOGGLE_DESCRIPTION,
        }
    }

    /// Property fields in panel order.
    pub fn property_fields(self) -> &'static [PropertyField] {
        match self {
            ElementKind::Radio => RADIO_FIELDS,
            ElementKind::Checkbox | ElementKind::Toggle => SWITCH_FIELDS,
        }
    }

    /// Groups of field keys rendered between separators.
    pub fn separators(self) -> &'static [&'static [&'static str]] {
        match self {
            ElementKind::Radio => RADIO_SEPARATORS,
            ElementKind::Checkbox | ElementKind::Toggle => SWITCH_SEPARATORS,
        }
    }

    pub fn has_field(self, field: PropertyField) -> bool {
        self.property_fields().contains(&field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(kind: ElementKind) -> SchemaContext {
        SchemaContext {
            kind,
            channel_options: vec![SelectOption {
                value: 2,
                label: "Email".to_string(),
            }],
        }
    }

    #[test]
    fn channel_schema_lists_context_options() {
        let fields = PropertyField::Channel.schema(&ctx(ElementKind::Radio));
        assert_eq!(fields.len(), 1);
        match &fields[0].kind {
            SubFieldKind::Select { items, placeholder, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(*placeholder, "Select a channel");
            }
            other => panic!("expected select, got {other:?}"),
        }
    }

    #[test]
    fn type_header_describes_the_kind() {
        let fields = PropertyField::Type.schema(&ctx(ElementKind::Toggle));
        assert_eq!(
            fields[0].kind,
            SubFieldKind::Static {
                content: statics::EN_KIND_TOGGLE_LABEL,
                description: Some(statics::EN_KIND_TOGGLE_DESCRIPTION),
            }
        );
        let items = PropertyField::Items.schema(&ctx(ElementKind::Radio));
        assert!(matches!(items[0].kind, SubFieldKind::Static { description: None, .. }));
    }

    #[test]
    fn statement_schema_starts_empty_with_hint() {
        let fields = PropertyField::Statement.schema(&ctx(ElementKind::Toggle));
        match &fields[0].kind {
            SubFieldKind::Select {
                items,
                no_options_text,
                allow_absent,
                ..
            } => {
                assert!(items.is_empty());
                assert!(no_options_text.is_some());
                assert!(*allow_absent);
            }
            other => panic!("expected select, got {other:?}"),
        }
    }

    #[test]
    fn toggles_default_as_in_the_builder() {
        let opt_out = PropertyField::OnlyAllowOptOut.schema(&ctx(ElementKind::Radio));
        let show = PropertyField::ShowChannel.schema(&ctx(ElementKind::Radio));
        assert!(matches!(&opt_out[0].kind, SubFieldKind::Radiogroup { default, .. } if *default == FormValue::from(0)));
        assert!(matches!(&show[0].kind, SubFieldKind::Radiogroup { default, .. } if *default == FormValue::from(1)));
    }

    #[test]
    fn only_items_overrides_save_and_load() {
        let data = IndexMap::new();
        for field in RADIO_FIELDS {
            let overrides = field.save(&FormValue::Null, None, field.key(), "p").is_some();
            assert_eq!(overrides, *field == PropertyField::Items, "{field:?}");
            assert_eq!(field.load(&data).is_some(), *field == PropertyField::Items, "{field:?}");
        }
    }

    #[test]
    fn items_load_then_save_compacts_default() {
        let loaded = PropertyField::Items.load(&IndexMap::new()).unwrap();
        let rows = loaded.get(statics::FIELD_ITEMS).unwrap();
        assert_eq!(rows.as_array().map(<[FormValue]>::len), Some(3));

        let patch = PropertyField::Items.save(rows, None, statics::FIELD_ITEMS, "p").unwrap();
        assert_eq!(patch, FieldPatch::remove(statics::FIELD_ITEMS));
    }

    #[test]
    fn element_kinds_carry_their_fields() {
        assert!(ElementKind::Radio.has_field(PropertyField::Items));
        assert!(ElementKind::Radio.has_field(PropertyField::Default));
        assert!(!ElementKind::Checkbox.has_field(PropertyField::Items));
        assert!(!ElementKind::Toggle.has_field(PropertyField::Mode));

        for kind in ElementKind::ALL {
            let grouped: Vec<&str> = kind.separators().iter().flat_map(|g| g.iter().copied()).collect();
            let keys: Vec<&str> = kind.property_fields().iter().map(|f| f.key()).collect();
            assert_eq!(grouped, keys, "{kind:?}");
        }
    }
}
