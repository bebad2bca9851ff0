//! Core library for preference elements in form-builder schemas.
//! Keeps channel/statement assignments unique across a schema tree, derives the composite id
//! and default members, and normalizes the persisted option list of radio preferences.

mod catalog;
mod constraints;
mod controller;
mod document;
mod error;
mod fields;
mod host;
mod index;
pub mod items;
mod schema;
mod session;
pub mod statics;
pub mod sync;
pub mod theme;
mod value;

pub use catalog::{Catalog, Channel, ChannelId, Statement, StatementId};
pub use constraints::{ConstraintResolver, available_channels, available_statements};
pub use controller::{ChannelChange, ControllerState, SelectionController, UpdateMode};
pub use document::FormDocument;
pub use error::{Error, Result};
pub use fields::{Choice, FieldPatch, PropertyField, SchemaContext, SubField, SubFieldKind};
pub use host::{Host, SelectOption, TickTask};
pub use index::{PreferenceAssignment, PreferenceIndex};
pub use items::{EditableItem, PersistedItem};
pub use schema::{ElementKind, Mode, PreferenceElement, SchemaNode, SchemaTree};
pub use session::{DocumentHost, EditorSession};
pub use sync::{WatchTable, Watcher};
pub use value::{FormNumber, FormValue};
