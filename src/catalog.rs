use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Raw catalog value of a channel, as referenced by persisted elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub i64);

/// Raw catalog value of a statement, as referenced by persisted elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementId(pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub value: StatementId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub value: ChannelId,
    pub label: String,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

/// Ordered, immutable channel catalog with an index from statement to owning channel.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    channels: Vec<Channel>,
    statement_owner: HashMap<StatementId, ChannelId>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate channel ids and statement ids reused anywhere.
    pub fn new(channels: Vec<Channel>) -> Result<Self> {
        let mut seen_channels = HashSet::with_capacity(channels.len());
        let mut statement_owner = HashMap::new();

        for channel in &channels {
            if !seen_channels.insert(channel.value) {
                return Err(Error::DuplicateChannel {
                    channel: channel.value.0,
                });
            }
            for statement in &channel.statements {
                if let Some(first) = statement_owner.insert(statement.value, channel.value) {
                    return Err(Error::DuplicateStatement {
                        statement: statement.value.0,
                        first: first.0,
                        second: channel.value.0,
                    });
                }
            }
        }

        Ok(Self {
            channels,
            statement_owner,
        })
    }

    /// Parse the `[{value, label, statements: [{value, label}]}]` shape.
    pub fn from_json5(text: &str) -> Result<Self> {
        let channels: Vec<Channel> = json5::from_str(text)?;
        Self::new(channels)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.value == id)
    }

    /// Statements offered under a channel; empty for unknown channels.
    pub fn statements_for(&self, channel: ChannelId) -> &[Statement] {
        self.channel(channel)
            .map(|c| c.statements.as_slice())
            .unwrap_or(&[])
    }

    pub fn statement(&self, id: StatementId) -> Option<&Statement> {
        let owner = self.statement_owner.get(&id)?;
        self.statements_for(*owner).iter().find(|s| s.value == id)
    }

    pub fn channel_of_statement(&self, id: StatementId) -> Option<ChannelId> {
        self.statement_owner.get(&id).copied()
    }

    pub fn statement_belongs_to(&self, statement: StatementId, channel: ChannelId) -> bool {
        self.channel_of_statement(statement) == Some(channel)
    }
}
