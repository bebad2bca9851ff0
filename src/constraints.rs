use crate::catalog::{Catalog, Channel, ChannelId, Statement};
use crate::index::{PreferenceAssignment, PreferenceIndex};
use crate::schema::SchemaTree;
use tracing::debug;

/// Legal channel and statement options for one element. Channels and
/// statements are unique across the whole schema: an option held by any other
/// preference element is not offered, whatever that element's channel.
pub struct ConstraintResolver<'a> {
    catalog: &'a Catalog,
    index: PreferenceIndex,
}

impl<'a> ConstraintResolver<'a> {
    pub fn new(tree: &SchemaTree, catalog: &'a Catalog) -> Self {
        Self::from_index(PreferenceIndex::collect(tree), catalog)
    }

    /// Exclusion goes by the stored ids, stale or not. A stale reference
    /// (unknown channel, or a statement outside its element's channel) only
    /// reads as absent in that element's own lists, where it is never offered.
    pub fn from_index(index: PreferenceIndex, catalog: &'a Catalog) -> Self {
        for assignment in index.assignments() {
            log_stale(assignment, catalog);
        }
        Self { catalog, index }
    }

    pub fn index(&self) -> &PreferenceIndex {
        &self.index
    }

    /// Catalog channels not held by another element. The element's own
    /// channel is always offered so the editor never shows a blank value.
    pub fn available_channels(&self, self_path: &str) -> Vec<&'a Channel> {
        let catalog: &'a Catalog = self.catalog;
        let own = self.index.by_path(self_path).and_then(|a| a.channel);

        catalog
            .channels()
            .iter()
            .filter(|channel| {
                own == Some(channel.value)
                    || self
                        .index
                        .channel_owners(channel.value)
                        .all(|owner| owner == self_path)
            })
            .collect()
    }

    /// Statements of `channel` not held by another element of any channel.
    pub fn available_statements(&self, self_path: &str, channel: ChannelId) -> Vec<&'a Statement> {
        let catalog: &'a Catalog = self.catalog;
        catalog
            .statements_for(channel)
            .iter()
            .filter(|statement| {
                self.index
                    .statement_owners(statement.value)
                    .all(|owner| owner == self_path)
            })
            .collect()
    }
}

pub fn available_channels<'a>(tree: &SchemaTree, self_path: &str, catalog: &'a Catalog) -> Vec<&'a Channel> {
    ConstraintResolver::new(tree, catalog).available_channels(self_path)
}

pub fn available_statements<'a>(
    tree: &SchemaTree,
    self_path: &str,
    channel: ChannelId,
    catalog: &'a Catalog,
) -> Vec<&'a Statement> {
    ConstraintResolver::new(tree, catalog).available_statements(self_path, channel)
}

fn log_stale(assignment: &PreferenceAssignment, catalog: &Catalog) {
    let known = assignment.channel.filter(|c| catalog.channel(*c).is_some());
    if known.is_none() && assignment.channel.is_some() {
        debug!(path = %assignment.path, channel = ?assignment.channel, "unknown channel reads as absent");
    }
    if let Some(statement) = assignment.statement {
        if !known.is_some_and(|c| catalog.statement_belongs_to(statement, c)) {
            debug!(path = %assignment.path, %statement, "stale statement still excludes others");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StatementId;
    use crate::schema::{ElementKind, PreferenceElement, SchemaNode};

    fn catalog() -> Catalog {
        Catalog::from_json5(
            r#"[
                { value: 1, label: 'Forget', statements: [{ value: 1, label: 'Forget me' }] },
                { value: 2, label: 'Email', statements: [{ value: 2, label: 'Email me' }] },
                { value: 3, label: 'SMS', statements: [{ value: 3, label: 'Text me' }, { value: 4, label: 'Another' }] },
            ]"#,
        )
        .unwrap()
    }

    fn pref(path: &str, channel: Option<i64>, statement: Option<i64>) -> SchemaNode {
        SchemaNode::Preference(
            PreferenceElement::new(path, ElementKind::Radio)
                .with_assignment(channel.map(ChannelId), statement.map(StatementId)),
        )
    }

    fn channel_ids(channels: &[&Channel]) -> Vec<i64> {
        channels.iter().map(|c| c.value.0).collect()
    }

    fn statement_ids(statements: &[&Statement]) -> Vec<i64> {
        statements.iter().map(|s| s.value.0).collect()
    }

    #[test]
    fn other_elements_hide_their_channel_and_statement() {
        let catalog = catalog();
        let tree = SchemaTree::new(vec![
            pref("a", Some(3), Some(3)),
            SchemaNode::Container {
                path: "box".into(),
                children: vec![pref("box.b", None, None)],
            },
        ]);

        assert_eq!(channel_ids(&available_channels(&tree, "box.b", &catalog)), vec![1, 2]);
        assert_eq!(
            statement_ids(&available_statements(&tree, "box.b", ChannelId(3), &catalog)),
            vec![4]
        );
    }

    #[test]
    fn own_assignment_stays_available() {
        let catalog = catalog();
        let tree = SchemaTree::new(vec![pref("a", Some(3), Some(3)), pref("b", Some(2), Some(2))]);

        assert_eq!(channel_ids(&available_channels(&tree, "a", &catalog)), vec![1, 3]);
        assert_eq!(
            statement_ids(&available_statements(&tree, "a", ChannelId(3), &catalog)),
            vec![3, 4]
        );
    }

    #[test]
    fn stale_statement_still_excludes_others() {
        let catalog = catalog();
        // Statement 4 belongs to channel 3, not channel 2.
        let tree = SchemaTree::new(vec![pref("a", Some(2), Some(4)), pref("b", None, None)]);
        let resolver = ConstraintResolver::new(&tree, &catalog);

        assert_eq!(resolver.index().by_path("a").and_then(|a| a.statement), Some(StatementId(4)));
        assert_eq!(statement_ids(&resolver.available_statements("b", ChannelId(3))), vec![3]);
        // a's own list for its channel never shows the stale statement.
        assert_eq!(statement_ids(&resolver.available_statements("a", ChannelId(2))), vec![2]);
        assert_eq!(statement_ids(&resolver.available_statements("a", ChannelId(3))), vec![3, 4]);
    }

    #[test]
    fn unknown_channel_is_never_offered() {
        let catalog = catalog();
        let tree = SchemaTree::new(vec![pref("a", Some(99), Some(1)), pref("b", None, None)]);
        let resolver = ConstraintResolver::new(&tree, &catalog);

        assert_eq!(channel_ids(&resolver.available_channels("a")), vec![1, 2, 3]);
        assert_eq!(channel_ids(&resolver.available_channels("b")), vec![1, 2, 3]);
        assert!(statement_ids(&resolver.available_statements("b", ChannelId(1))).is_empty());
        assert!(resolver.available_statements("a", ChannelId(99)).is_empty());
    }

    #[test]
    fn duplicated_channel_is_still_offered_to_its_holders() {
        let catalog = catalog();
        let tree = SchemaTree::new(vec![
            pref("a", Some(3), Some(3)),
            pref("b", Some(3), None),
            pref("c", None, None),
        ]);
        let resolver = ConstraintResolver::new(&tree, &catalog);

        assert!(channel_ids(&resolver.available_channels("b")).contains(&3));
        assert!(!channel_ids(&resolver.available_channels("c")).contains(&3));
        assert_eq!(statement_ids(&resolver.available_statements("b", ChannelId(3))), vec![4]);
    }
}
