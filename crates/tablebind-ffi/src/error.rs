//! Binding generation error types.

/// Errors that can occur while parsing declarations or generating bindings.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The declaration is not a well-formed function signature, or its
    /// buffer/length parameters are not paired.
    #[error("malformed declaration `{declaration}`: {detail}")]
    MalformedDeclaration { declaration: String, detail: String },

    /// A parameter type outside the recognized set.
    #[error("unsupported parameter type '{type_name}' in `{declaration}`")]
    UnsupportedParameterType { declaration: String, type_name: String },

    /// A return type outside the recognized set.
    #[error("unsupported return type '{type_name}' in `{declaration}`")]
    UnsupportedReturnType { declaration: String, type_name: String },

    /// Failed to validate a binding manifest.
    #[error("invalid binding manifest: {detail}")]
    InvalidManifest { detail: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindError {
    pub(crate) fn malformed(declaration: &str, detail: impl Into<String>) -> Self {
        BindError::MalformedDeclaration {
            declaration: declaration.to_string(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
