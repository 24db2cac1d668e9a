//! Yarn lock-file parsing and dependency graphs
//!
//! This crate reads the indentation-sensitive lock-file format Yarn v1
//! writes (`yarn.lock`) and exposes the result in two forms: a plain
//! associative tree of the file's entries, and a typed dependency graph
//! with per-package depth information.
//!
//! A lock file records one entry per resolved package. The entry header
//! lists every version request that resolved to it, and the indented block
//! below carries the pinned version, the resolution locator, and up to four
//! maps of dependency declarations:
//!
//! ```text
//! # yarn lockfile v1
//!
//! minimist@^1.1.1, minimist@^1.2.0:
//!   version "1.2.8"
//!   resolved "https://registry.yarnpkg.com/minimist/-/minimist-1.2.8.tgz#c1a464e7693302e082a075cee0c057741ac4772c"
//!   dependencies:
//!     some-dep "^2.0.0"
//! ```
//!
//! Parsing is strict: inconsistent indentation, properties without values,
//! and truncated blocks are reported with one-based line numbers rather
//! than papered over. Graph construction is equally strict about dangling
//! references, since a lock file is supposed to be closed over its own
//! dependencies.
//!
//! # Modules
//!
//! - [`parser`] - Structural parser for the indented format, plus helpers
//!   for splitting entry headers into `(name, range)` requests
//! - [`value`] - The parse-tree value type and scalar coercion rules
//! - [`lock`] - Dependency graph construction, package queries, and the
//!   depth engine
//! - [`package`] - Package nodes, their handles, and the four dependency
//!   classifications
//! - [`error`] - The error type shared by parsing and graph building
//!
//! # Examples
//!
//! ```rust
//! use yarn_lock::{DependencyType, YarnLock};
//!
//! let input = "\
//! # yarn lockfile v1
//!
//! ms@2.1.2:
//!   version \"2.1.2\"
//!   resolved \"https://registry.yarnpkg.com/ms/-/ms-2.1.2.tgz#d09d1f357b443f493382a8eb3ccd183872ae6009\"
//!
//! debug@^4.1.0:
//!   version \"4.3.4\"
//!   resolved \"https://registry.yarnpkg.com/debug/-/debug-4.3.4.tgz#1319f6579357f2338d3337d2cdd4914bb5dcc865\"
//!   dependencies:
//!     ms \"2.1.2\"
//! ";
//!
//! let mut lock = YarnLock::parse(input)?;
//! assert_eq!(lock.package_count(), 2);
//!
//! let debug = lock.package("debug", Some("^4.1.0")).ok_or("missing")?;
//! assert_eq!(debug.version(), "4.3.4");
//! let deps = lock.dependencies_of(debug.id(), DependencyType::ProdRequired);
//! assert_eq!(deps[0].to_string(), "ms@2.1.2");
//!
//! lock.calculate_depth(None);
//! assert_eq!(lock.package("ms", None).and_then(|p| p.depth()), Some(1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Callers that only want the raw tree can stop at [`parser::parse`], which
//! returns the entries as an ordered [`Map`] without building a graph.

pub mod error;
pub mod lock;
pub mod package;
pub mod parser;
pub mod value;

pub use error::{Result, YarnLockError};
pub use lock::YarnLock;
pub use package::{DependencyType, Package, PackageId};
pub use value::{Map, Value};
