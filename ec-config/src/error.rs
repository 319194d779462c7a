//! Errors produced while moving configuration between its typed and
//! semi-structured forms.
//!
//! There are only two failure classes. Encoding failures mean a typed value
//! could not be serialized, which is a defect in the type definition and is
//! not worth retrying. Decoding failures cover everything read from outside:
//! malformed YAML, a malformed patch, or a merged document that does not fit
//! the schema. Callers decide whether those are worth retrying.

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to {context}: {source}")]
    Encoding {
        context: &'static str,
        #[source]
        source: FormatError,
    },

    #[error("failed to {context}: {source}")]
    Decoding {
        context: &'static str,
        #[source]
        source: FormatError,
    },
}

impl Error {
    pub(crate) fn encoding(context: &'static str, source: impl Into<FormatError>) -> Self {
        Error::Encoding {
            context,
            source: source.into(),
        }
    }

    pub(crate) fn decoding(context: &'static str, source: impl Into<FormatError>) -> Self {
        Error::Decoding {
            context,
            source: source.into(),
        }
    }

    pub fn is_encoding(&self) -> bool {
        matches!(self, Error::Encoding { .. })
    }

    pub fn is_decoding(&self) -> bool {
        matches!(self, Error::Decoding { .. })
    }
}

/// The underlying cause of an [`Error`].
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed, but carries fields the schema does not declare.
    #[error("undeclared fields: {}", .0.join(", "))]
    UndeclaredFields(Vec<String>),
}
