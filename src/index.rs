use crate::catalog::{ChannelId, StatementId};
use crate::schema::{SchemaNode, SchemaTree};

/// One preference element's current assignment, derived from the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceAssignment {
    pub path: String,
    pub channel: Option<ChannelId>,
    pub statement: Option<StatementId>,
}

/// Flattened list of every preference element in a schema, in document order.
/// Rebuilt on demand whenever the tree may have changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceIndex {
    assignments: Vec<PreferenceAssignment>,
}

impl PreferenceIndex {
    pub fn collect(tree: &SchemaTree) -> Self {
        Self {
            assignments: build_assignments(tree.roots()),
        }
    }

    pub fn assignments(&self) -> &[PreferenceAssignment] {
        &self.assignments
    }

    pub fn by_path(&self, path: &str) -> Option<&PreferenceAssignment> {
        self.assignments.iter().find(|a| a.path == path)
    }

    /// Paths of every element holding `channel`.
    pub fn channel_owners(&self, channel: ChannelId) -> impl Iterator<Item = &str> {
        self.assignments
            .iter()
            .filter(move |a| a.channel == Some(channel))
            .map(|a| a.path.as_str())
    }

    /// Paths of every element holding `statement`, whatever its channel.
    pub fn statement_owners(&self, statement: StatementId) -> impl Iterator<Item = &str> {
        self.assignments
            .iter()
            .filter(move |a| a.statement == Some(statement))
            .map(|a| a.path.as_str())
    }
}

fn build_assignments(nodes: &[SchemaNode]) -> Vec<PreferenceAssignment> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            SchemaNode::Preference(element) => out.push(PreferenceAssignment {
                path: element.path.clone(),
                channel: element.channel,
                statement: element.statement,
            }),
            SchemaNode::Container { children, .. } => out.extend(build_assignments(children)),
            SchemaNode::Other { .. } => {}
        }
    }
    out
}
