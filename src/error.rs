use thiserror::Error;

/// Errors raised while defining derived properties.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObservableError {
    #[error("derived property `{property}` must not specify a value; provide a `get` function")]
    ValueNotAllowed { property: String },

    #[error(
        "derived property `{property}` needs an evaluator function or a descriptor with a `get` function"
    )]
    MissingGetter { property: String },
}

pub type Result<T> = std::result::Result<T, ObservableError>;
