use thiserror::Error;

/// Fatal conditions raised by the content walker.
///
/// Everything else (HTTP failures, decode errors) travels as `anyhow::Error`;
/// these variants can be recovered with `downcast_ref` when a caller needs to
/// tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("Component \"{0}\" not found in component list")]
    UnknownComponent(String),

    #[error("Field \"{field}\" belongs to a node without a component type")]
    UntypedNode { field: String },

    #[error("Field \"{field}\" not found in component \"{component}\"")]
    UnknownField { component: String, field: String },

    #[error(
        "Detected source language ({detected}) is different from previously detected languages ({previous}). \
         You might want to state a fixed source language using the --source-lang parameter."
    )]
    SourceLanguageMismatch { detected: String, previous: String },
}
