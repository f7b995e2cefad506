//! Error types for SQL rendering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rendering a relation tree to SQL.
///
/// Every variant is fatal. A renderer that fails never hands back partial
/// text, and retrying with the same tree fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The tree breaks an invariant the analyzer is supposed to uphold.
    #[error("Structural violation: {0}")]
    Structural(String),

    /// Nesting went deeper than the configured bound.
    #[error("Structural violation: nesting exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// The tree is valid but has no rendering rule.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Returns true if the error indicates a malformed tree (an analyzer bug)
    /// rather than a deliberate gap in what can be rendered.
    pub fn is_structural(&self) -> bool {
        match self {
            Error::Structural(..) | Error::DepthExceeded { .. } => true,
            Error::Unsupported(..) => false,
        }
    }
}

/// Logs and builds a structural error. These indicate a bug in whatever
/// built the tree, so they are reported at error level.
pub(crate) fn structural(msg: String) -> Error {
    tracing::error!(%msg, "malformed relation tree");
    Error::Structural(msg)
}
