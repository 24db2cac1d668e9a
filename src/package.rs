//! Package entities and dependency typing
//!
//! A [`Package`] is one resolved lock-file entry: the node type of the
//! dependency graph. Packages are created once per header and shared by
//! every range request under that header, so identity questions ("did these
//! two ranges collapse onto one entry?") are answered with [`PackageId`]
//! handles rather than field equality.
//!
//! [`DependencyType`] enumerates the four dependency sub-maps a declaration
//! can carry and doubles as the edge weight of the graph.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Stable handle to a package node inside a [`YarnLock`] graph.
///
/// Handles are cheap to copy, hashable, and compare by node identity. They
/// stay valid for the lifetime of the graph they came from.
///
/// [`YarnLock`]: crate::YarnLock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub(crate) NodeIndex);

/// The four dependency relationships a lock-file declaration can record
///
/// Each variant names one sub-map of a package declaration. The declaration
/// key doubles as the serde representation, so the type round-trips through
/// JSON as the exact key found in lock files.
///
/// # Examples
///
/// ```rust
/// use yarn_lock::DependencyType;
///
/// assert_eq!(DependencyType::ProdOptional.key(), "optionalDependencies");
/// assert_eq!(DependencyType::from_key("devDependencies"), Some(DependencyType::DevRequired));
///
/// let json = serde_json::to_string(&DependencyType::PeerRequired).unwrap();
/// assert_eq!(json, "\"peerDependencies\"");
/// let back: DependencyType = serde_json::from_str(&json).unwrap();
/// assert_eq!(back, DependencyType::PeerRequired);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// Entry under `dependencies`: required at runtime.
    #[serde(rename = "dependencies")]
    ProdRequired,
    /// Entry under `optionalDependencies`: installation may skip it.
    #[serde(rename = "optionalDependencies")]
    ProdOptional,
    /// Entry under `peerDependencies`: expected alongside, not installed by.
    #[serde(rename = "peerDependencies")]
    PeerRequired,
    /// Entry under `devDependencies`: required for development only.
    #[serde(rename = "devDependencies")]
    DevRequired,
}

impl DependencyType {
    /// All variants, in declaration order. Edge wiring and combined
    /// dependency listings iterate in this order.
    pub const ALL: [Self; 4] =
        [Self::ProdRequired, Self::ProdOptional, Self::PeerRequired, Self::DevRequired];

    /// The declaration key this variant reads from.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ProdRequired => "dependencies",
            Self::ProdOptional => "optionalDependencies",
            Self::PeerRequired => "peerDependencies",
            Self::DevRequired => "devDependencies",
        }
    }

    /// Maps a declaration key back to its variant.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One resolved package entry from a lock file
///
/// Carries the resolved `version`, the distribution locator (`resolved`),
/// and every range string the entry was requested under, in file order. Both
/// `version` and `resolved` are empty strings when the declaration lacks the
/// field. Depth is unset until the owning graph runs a depth calculation.
///
/// Displays as `name@version`:
///
/// ```rust
/// use yarn_lock::YarnLock;
///
/// let lock = YarnLock::parse("left-pad@^1.3.0:\n  version \"1.3.0\"\n").unwrap();
/// let package = lock.package("left-pad", None).unwrap();
/// assert_eq!(package.to_string(), "left-pad@1.3.0");
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) resolved: String,
    pub(crate) satisfied_ranges: Vec<String>,
    pub(crate) depth: Option<usize>,
    pub(crate) id: PackageId,
}

impl Package {
    pub(crate) fn new(name: String, version: String, resolved: String) -> Self {
        Self {
            name,
            version,
            resolved,
            satisfied_ranges: Vec::new(),
            depth: None,
            id: PackageId(NodeIndex::end()),
        }
    }

    /// The package name shared by all ranges under the entry's header.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The single resolved version recorded for this entry.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The distribution locator (registry tarball URL or similar).
    #[must_use]
    pub fn resolved(&self) -> &str {
        &self.resolved
    }

    /// Every range this package was requested under, in request order.
    #[must_use]
    pub fn satisfied_ranges(&self) -> &[String] {
        &self.satisfied_ranges
    }

    /// Whether `version_or_range` names this package: either its exact
    /// resolved version or one of its satisfied ranges.
    #[must_use]
    pub fn satisfies(&self, version_or_range: &str) -> bool {
        self.version == version_or_range
            || self.satisfied_ranges.iter().any(|range| range == version_or_range)
    }

    /// Hops from the nearest root, set by the graph's depth calculation.
    /// `None` before the calculation ran, and afterwards for packages the
    /// root set never reached.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// This package's node handle in the owning graph.
    #[must_use]
    pub fn id(&self) -> PackageId {
        self.id
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
