use crate::catalog::StatementId;
use crate::error::Result;
use crate::schema::SchemaTree;
use crate::value::FormValue;
use serde::Serialize;

/// One entry of a select widget's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
}

/// Work deferred to the host's next tick, after the current update pass has rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickTask {
    /// Assign the only remaining statement once its option list is visible.
    SelectStatement { path: String, statement: StatementId },
}

/// What the engine reads and patches in the embedding editor. The host owns
/// the document, the selected path and the property panel's widget state.
pub trait Host {
    /// Current schema snapshot.
    fn tree(&self) -> SchemaTree;

    fn field_value(&self, path: &str, key: &str) -> Option<FormValue>;

    /// Write a member. Hosts may refuse values their widgets cannot show.
    fn set_field_value(&mut self, path: &str, key: &str, value: FormValue) -> Result<()>;

    fn remove_field(&mut self, path: &str, key: &str);

    fn selected_path(&self) -> Option<String>;

    /// Replace a select widget's option list; it becomes visible on the next render.
    fn set_field_options(&mut self, key: &str, options: Vec<SelectOption>);

    fn schedule_next_tick(&mut self, task: TickTask);
}
