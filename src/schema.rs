use crate::catalog::{ChannelId, StatementId};
use crate::items::{self, PersistedItem};
use crate::statics;
use crate::value::FormValue;
use indexmap::IndexMap;

/// The three preference element flavors offered by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Radio,
    Checkbox,
    Toggle,
}

impl ElementKind {
    pub const ALL: [ElementKind; 3] = [ElementKind::Radio, ElementKind::Checkbox, ElementKind::Toggle];

    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name {
            statics::SC_TYPE_RADIO_PREFERENCE => Some(ElementKind::Radio),
            statics::SC_TYPE_CHECKBOX_PREFERENCE => Some(ElementKind::Checkbox),
            statics::SC_TYPE_TOGGLE_PREFERENCE => Some(ElementKind::Toggle),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            ElementKind::Radio => statics::SC_TYPE_RADIO_PREFERENCE,
            ElementKind::Checkbox => statics::SC_TYPE_CHECKBOX_PREFERENCE,
            ElementKind::Toggle => statics::SC_TYPE_TOGGLE_PREFERENCE,
        }
    }
}

/// Whether a radio preference offers a "no change" option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Binary,
    Trinary,
}

impl Mode {
    /// Missing or unrecognized values read as the editor default, `binary`.
    pub fn from_value(value: Option<&FormValue>) -> Self {
        match value.and_then(FormValue::as_str) {
            Some(statics::MODE_TRINARY) => Mode::Trinary,
            _ => Mode::Binary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Binary => statics::MODE_BINARY,
            Mode::Trinary => statics::MODE_TRINARY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceElement {
    pub path: String,
    pub kind: ElementKind,
    pub channel: Option<ChannelId>,
    pub statement: Option<StatementId>,
    pub mode: Mode,
    pub only_allow_opt_out: bool,
    pub items: Option<Vec<PersistedItem>>,
}

impl PreferenceElement {
    /// An element with nothing assigned yet.
    pub fn new(path: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            path: path.into(),
            kind,
            channel: None,
            statement: None,
            mode: Mode::default(),
            only_allow_opt_out: false,
            items: None,
        }
    }

    pub fn with_assignment(mut self, channel: Option<ChannelId>, statement: Option<StatementId>) -> Self {
        self.channel = channel;
        self.statement = statement;
        self
    }

    fn from_members(path: String, kind: ElementKind, members: &IndexMap<String, FormValue>) -> Self {
        Self {
            path,
            kind,
            channel: members
                .get(statics::FIELD_CHANNEL)
                .and_then(FormValue::as_i64)
                .map(ChannelId),
            statement: members
                .get(statics::FIELD_STATEMENT)
                .and_then(FormValue::as_i64)
                .map(StatementId),
            mode: Mode::from_value(members.get(statics::FIELD_MODE)),
            only_allow_opt_out: members
                .get(statics::FIELD_ONLY_ALLOW_OPT_OUT)
                .is_some_and(FormValue::is_truthy),
            items: members.get(statics::FIELD_ITEMS).map(items::parse_persisted),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Container { path: String, children: Vec<SchemaNode> },
    Preference(PreferenceElement),
    Other { path: String, kind: String },
}

impl SchemaNode {
    pub fn path(&self) -> &str {
        match self {
            SchemaNode::Container { path, .. } => path,
            SchemaNode::Preference(element) => &element.path,
            SchemaNode::Other { path, .. } => path,
        }
    }

    pub fn as_preference(&self) -> Option<&PreferenceElement> {
        match self {
            SchemaNode::Preference(element) => Some(element),
            _ => None,
        }
    }
}

/// Snapshot of a schema document as typed nodes, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaTree {
    roots: Vec<SchemaNode>,
}

impl SchemaTree {
    pub fn new(roots: Vec<SchemaNode>) -> Self {
        Self { roots }
    }

    /// Build from a document root: either `{ schema: {...} }` or the schema itself.
    pub fn from_document(root: &FormValue) -> Self {
        Self {
            roots: build_nodes(schema_of_document(root), ""),
        }
    }

    pub fn roots(&self) -> &[SchemaNode] {
        &self.roots
    }

    /// Depth-first, pre-order list of every node.
    pub fn nodes(&self) -> Vec<&SchemaNode> {
        fn walk<'a>(nodes: &'a [SchemaNode], out: &mut Vec<&'a SchemaNode>) {
            for node in nodes {
                out.push(node);
                if let SchemaNode::Container { children, .. } = node {
                    walk(children, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }

    pub fn find(&self, path: &str) -> Option<&SchemaNode> {
        self.nodes().into_iter().find(|n| n.path() == path)
    }

    pub fn preference(&self, path: &str) -> Option<&PreferenceElement> {
        self.find(path).and_then(SchemaNode::as_preference)
    }
}

pub(crate) fn schema_of_document(root: &FormValue) -> &FormValue {
    match root.get(statics::SC_SCHEMA) {
        Some(inner @ (FormValue::Object(_) | FormValue::Array(_))) => inner,
        _ => root,
    }
}

/// Only `None` when `root` claims a nested schema it does not have.
pub(crate) fn schema_of_document_mut(root: &mut FormValue) -> Option<&mut FormValue> {
    if has_nested_schema(root) { root.get_mut(statics::SC_SCHEMA) } else { Some(root) }
}

/// A document either wraps its top level in `schema` or is the top level itself.
fn has_nested_schema(root: &FormValue) -> bool {
    matches!(
        root.get(statics::SC_SCHEMA),
        Some(FormValue::Object(_) | FormValue::Array(_))
    )
}

/// Named entries of a schema level. Object-shaped levels are keyed by element
/// name; array-shaped levels name each entry through its `name` member.
pub(crate) fn entries(schema: &FormValue) -> Vec<(&str, &FormValue)> {
    match schema {
        FormValue::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        FormValue::Array(values) => values
            .iter()
            .filter_map(|v| Some((v.get(statics::SC_NAME)?.as_str()?, v)))
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn entry_mut<'a>(schema: &'a mut FormValue, name: &str) -> Option<&'a mut FormValue> {
    match schema {
        FormValue::Object(map) => map.get_mut(name),
        FormValue::Array(values) => values
            .iter_mut()
            .find(|v| v.get(statics::SC_NAME).and_then(FormValue::as_str) == Some(name)),
        _ => None,
    }
}

pub(crate) fn is_container_type(type_name: &str) -> bool {
    type_name == statics::SC_TYPE_OBJECT || type_name == statics::SC_TYPE_GROUP
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{}{name}", statics::PATH_SEPARATOR)
    }
}

fn build_nodes(schema: &FormValue, prefix: &str) -> Vec<SchemaNode> {
    let mut nodes = Vec::new();

    for (name, element) in entries(schema) {
        let path = join_path(prefix, name);
        let type_name = element
            .get(statics::SC_TYPE)
            .and_then(FormValue::as_str)
            .unwrap_or(statics::EN_EMPTY);

        if let Some(kind) = ElementKind::from_type_name(type_name) {
            let empty = IndexMap::new();
            let members = element.as_object().unwrap_or(&empty);
            nodes.push(SchemaNode::Preference(PreferenceElement::from_members(
                path, kind, members,
            )));
        } else if is_container_type(type_name) {
            let children = element
                .get(statics::SC_SCHEMA)
                .map(|inner| build_nodes(inner, &path))
                .unwrap_or_default();
            nodes.push(SchemaNode::Container { path, children });
        } else {
            nodes.push(SchemaNode::Other {
                path,
                kind: type_name.to_string(),
            });
        }
    }

    nodes
}
