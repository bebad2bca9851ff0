use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine's public API.
///
/// Missing or stale channel/statement references are not errors; they read as absent.
#[derive(Debug, Error)]
pub enum Error {
    /// No element lives at the given path
    #[error("element not found: {path}")]
    ElementNotFound { path: String },

    /// An edit was issued while no element is selected
    #[error("no element selected")]
    NoSelection,

    /// A select widget refused a value that is not among its visible options
    #[error("value {value} is not among the rendered options of '{field}'")]
    OptionNotRendered { field: String, value: i64 },

    /// Two catalog channels share an id
    #[error("duplicate channel id in catalog: {channel}")]
    DuplicateChannel { channel: i64 },

    /// A statement id appears more than once across the catalog
    #[error("statement {statement} is listed under channel {first} and channel {second}")]
    DuplicateStatement {
        statement: i64,
        first: i64,
        second: i64,
    },

    /// Catalog text could not be parsed
    #[error("invalid catalog: {0}")]
    CatalogParse(#[from] json5::Error),

    /// A length value uses a unit the theme loader does not understand
    #[error("could not resolve length for '{field}': {value}")]
    UnresolvedLength { field: String, value: String },

    /// A `var(--vf-*)` chain did not terminate within the lookup bound
    #[error("variable chain for '{field}' exceeds {depth} lookups")]
    LengthReferenceTooDeep { field: String, depth: usize },

    /// A `var(--vf-*)` reference names a variable that is not set
    #[error("variable '{variable}' referenced by '{field}' is not set")]
    MissingVariable { field: String, variable: String },
}
