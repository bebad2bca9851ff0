use crate::catalog::{Catalog, ChannelId, StatementId};
use crate::constraints::ConstraintResolver;
use crate::error::{Error, Result};
use crate::host::{Host, SelectOption, TickTask};
use crate::statics;
use crate::value::FormValue;
use std::rc::Rc;
use tracing::debug;

/// Who is driving a channel update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// The editor is being populated from persisted state.
    Loading,
    /// The user picked a value.
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    ChannelChanging,
}

/// Outcome of [`SelectionController::on_channel_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelChange {
    /// New and old value were equal; nothing ran.
    Unchanged,
    /// Options refreshed during loading; the stored statement was kept.
    Loaded,
    /// Exactly one statement remained; it is assigned on the next tick.
    AutoSelectScheduled(StatementId),
    /// Zero or several statements remained; the statement was cleared.
    Cleared,
}

/// Channel/statement selection for the element being edited. A user channel
/// change refreshes the statement options, then schedules the only remaining
/// statement for the next tick or clears the statement. Loading never touches
/// the stored statement.
#[derive(Debug)]
pub struct SelectionController {
    catalog: Rc<Catalog>,
    state: ControllerState,
    last_selected: Option<String>,
}

impl SelectionController {
    pub fn new(catalog: Rc<Catalog>) -> Self {
        Self {
            catalog,
            state: ControllerState::Idle,
            last_selected: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The selected path seen by the last render.
    pub fn last_selected(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    /// Channel options for the selected element.
    pub fn channel_options<H: Host + ?Sized>(&self, host: &H) -> Vec<SelectOption> {
        let path = host.selected_path().unwrap_or_default();
        let tree = host.tree();
        ConstraintResolver::new(&tree, &self.catalog)
            .available_channels(&path)
            .into_iter()
            .map(|c| SelectOption {
                value: c.value.0,
                label: c.label.clone(),
            })
            .collect()
    }

    /// Statement options of `channel` for the selected element; empty without a channel.
    pub fn statement_options<H: Host + ?Sized>(&self, host: &H, channel: Option<ChannelId>) -> Vec<SelectOption> {
        let Some(channel) = channel else {
            return Vec::new();
        };
        let path = host.selected_path().unwrap_or_default();
        let tree = host.tree();
        ConstraintResolver::new(&tree, &self.catalog)
            .available_statements(&path, channel)
            .into_iter()
            .map(|s| SelectOption {
                value: s.value.0,
                label: s.label.clone(),
            })
            .collect()
    }

    pub fn on_channel_change<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        new: Option<ChannelId>,
        old: Option<ChannelId>,
        mode: UpdateMode,
    ) -> Result<ChannelChange> {
        if new == old {
            return Ok(ChannelChange::Unchanged);
        }
        let path = host.selected_path().ok_or(Error::NoSelection)?;

        self.state = ControllerState::ChannelChanging;
        let outcome = self.apply_channel(host, &path, new, mode);
        self.state = ControllerState::Idle;
        outcome
    }

    fn apply_channel<H: Host + ?Sized>(
        &self,
        host: &mut H,
        path: &str,
        channel: Option<ChannelId>,
        mode: UpdateMode,
    ) -> Result<ChannelChange> {
        let options = self.statement_options(&*host, channel);
        debug!(path, channel = ?channel, options = options.len(), ?mode, "channel changed");
        let only = match options.as_slice() {
            [only] => Some(StatementId(only.value)),
            _ => None,
        };
        host.set_field_options(statics::FIELD_STATEMENT, options);

        // An absent member already reads as "no channel".
        let persisted = FormValue::from(channel.map(|c| c.0));
        if host.field_value(path, statics::FIELD_CHANNEL).unwrap_or_default() != persisted {
            host.set_field_value(path, statics::FIELD_CHANNEL, persisted)?;
        }

        if mode == UpdateMode::Loading {
            return Ok(ChannelChange::Loaded);
        }

        match only {
            // The widget accepts the value only once it shows the new list.
            Some(statement) => {
                host.schedule_next_tick(TickTask::SelectStatement {
                    path: path.to_string(),
                    statement,
                });
                Ok(ChannelChange::AutoSelectScheduled(statement))
            }
            None => {
                host.set_field_value(path, statics::FIELD_STATEMENT, FormValue::Null)?;
                Ok(ChannelChange::Cleared)
            }
        }
    }

    /// Detect a switch to another element and refresh its statement options.
    /// Returns true when a refresh happened.
    pub fn on_render<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let current = host.selected_path();
        if current == self.last_selected {
            return false;
        }
        self.last_selected = current.clone();

        let Some(path) = current else {
            return false;
        };
        let channel = host
            .field_value(&path, statics::FIELD_CHANNEL)
            .and_then(|v| v.as_i64())
            .map(ChannelId);
        let options = self.statement_options(&*host, channel);
        debug!(path = %path, channel = ?channel, options = options.len(), "selection switched, refreshing statements");
        host.set_field_options(statics::FIELD_STATEMENT, options);
        true
    }

    /// Apply a deferred task to the element it was scheduled for, selected or not.
    pub fn run_task<H: Host + ?Sized>(&mut self, host: &mut H, task: TickTask) -> Result<()> {
        match task {
            TickTask::SelectStatement { path, statement } => {
                if host.selected_path().as_deref() != Some(path.as_str()) {
                    debug!(path = %path, %statement, "auto-select lands after selection moved");
                }
                host.set_field_value(&path, statics::FIELD_STATEMENT, FormValue::from(statement.0))
            }
        }
    }
}
