//! Error handling for yarn-lock
//!
//! This module provides the strongly-typed error surface for both parsing and
//! graph construction. Every failure mode is a dedicated variant of
//! [`YarnLockError`], so callers can match on exactly what went wrong instead
//! of string-probing messages.
//!
//! All parser variants carry the 1-based line number of the offending input
//! line. Parsing is fail-fast: the first structural violation aborts with no
//! partial result.
//!
//! # Examples
//!
//! ```rust
//! use yarn_lock::{YarnLockError, parser};
//!
//! let err = parser::parse("key-without-value").unwrap_err();
//! assert_eq!(err, YarnLockError::MissingValue { line: 1 });
//! ```

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, YarnLockError>;

/// The error type for lock-file parsing and graph construction
///
/// Parser variants are raised while turning raw text into the key/value tree;
/// [`UnresolvedDependency`] is raised while wiring the dependency graph.
///
/// [`UnresolvedDependency`]: YarnLockError::UnresolvedDependency
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YarnLockError {
    /// Space and tab indentation mixed in one file
    ///
    /// The first indented line fixes the indentation character for the whole
    /// file; any later indentation run containing a different whitespace
    /// character is rejected, including runs on comment lines.
    #[error("mixed indentation characters at line {line}")]
    MixedIndentStyle {
        /// 1-based line whose indentation run mixes characters
        line: usize,
    },

    /// Indentation width is not a multiple of the established unit
    ///
    /// The width of the first indentation run defines the unit (commonly two
    /// spaces); every later run must be an exact multiple of it.
    #[error("inconsistent indentation depth at line {line}")]
    MixedIndentSize {
        /// 1-based line with the off-unit indentation run
        line: usize,
    },

    /// A line is indented deeper than the structure allows
    ///
    /// A line may be nested at most one level below the block opened by the
    /// preceding structural line.
    #[error("unexpected indentation at line {line}")]
    UnexpectedIndentation {
        /// 1-based line that over-indents
        line: usize,
    },

    /// A block was opened but the input dedents before any child appears
    #[error("expected a property at line {line}")]
    MissingProperty {
        /// 1-based line where a child entry was expected
        line: usize,
    },

    /// A key/value line carries no value
    ///
    /// Unquoted keys are separated from their value by the first space; a
    /// line without one has nothing to bind.
    #[error("expected a value at line {line}")]
    MissingValue {
        /// 1-based line lacking a value token
        line: usize,
    },

    /// The input ended while a block still required its first child
    #[error("unexpected end of input at line {line}, expected a property")]
    UnexpectedEof {
        /// 1-based number of the final input line
        line: usize,
    },

    /// A dependency references a `(name, range)` pair not present in the file
    ///
    /// Raised during edge wiring when a declaration's dependency entry cannot
    /// be matched against any header request in the same lock file.
    ///
    /// # Fields
    /// - `package`: name of the package whose declaration holds the entry
    /// - `dependency`: name of the referenced package
    /// - `range`: the range the reference asked for
    #[error("package '{package}' references unresolved dependency '{dependency}@{range}'")]
    UnresolvedDependency {
        /// Name of the package whose declaration holds the dangling entry
        package: String,
        /// Name of the referenced package
        dependency: String,
        /// Range the reference asked for
        range: String,
    },
}

impl YarnLockError {
    /// The 1-based input line an error points at, when it has one.
    ///
    /// Parser errors always carry a line; [`UnresolvedDependency`] does not,
    /// since the graph is built from the already-parsed tree.
    ///
    /// [`UnresolvedDependency`]: YarnLockError::UnresolvedDependency
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MixedIndentStyle { line }
            | Self::MixedIndentSize { line }
            | Self::UnexpectedIndentation { line }
            | Self::MissingProperty { line }
            | Self::MissingValue { line }
            | Self::UnexpectedEof { line } => Some(*line),
            Self::UnresolvedDependency { .. } => None,
        }
    }
}
