//! Lock-file dependency graphs
//!
//! [`YarnLock`] is the queryable form of a lock file: one [`Package`] node
//! per header entry, directed edges for every declared dependency, and a
//! [`DependencyType`] weight on each edge. Multiple range requests under one
//! header collapse onto a single node, so a diamond in the lock file is a
//! diamond in the graph, not a duplicated subtree.
//!
//! Construction runs in two passes over the parsed tree. The first pass
//! creates nodes and registers every `(name, range)` request in a lookup
//! table; the second wires edges by resolving each dependency entry through
//! that table. A dangling reference fails the build with
//! [`YarnLockError::UnresolvedDependency`].
//!
//! Depth (hops from the nearest root) is computed lazily, at most once per
//! graph, by a multi-source breadth-first search over all four edge types.
//! Roots default to packages nothing depends on; callers may supply their
//! own root set instead. Queries that need depth trigger the calculation
//! through `&mut self`.
//!
//! # Examples
//!
//! ```rust
//! use yarn_lock::YarnLock;
//!
//! let input = "\
//! has-flag@^4.0.0:
//!   version \"4.0.0\"
//!
//! supports-color@^7.1.0:
//!   version \"7.2.0\"
//!   dependencies:
//!     has-flag \"^4.0.0\"
//! ";
//! let mut lock = YarnLock::parse(input).unwrap();
//! assert!(lock.has_package("has-flag", Some("^4.0.0")));
//! assert_eq!(lock.max_depth(), 2);
//!
//! let root = lock.package("supports-color", None).unwrap();
//! assert_eq!(root.depth(), Some(0));
//! ```

use std::borrow::Cow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Index;
use std::str::FromStr;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::error::{Result, YarnLockError};
use crate::package::{DependencyType, Package, PackageId};
use crate::parser;
use crate::value::{Map, Value};

/// A parsed lock file as a typed dependency graph.
///
/// See the [module documentation](self) for construction and depth
/// semantics.
#[derive(Debug, Clone)]
pub struct YarnLock {
    graph: DiGraph<Package, DependencyType>,
    depth_calculated: bool,
}

impl YarnLock {
    /// Parses lock-file text and builds the dependency graph.
    ///
    /// # Errors
    ///
    /// Returns any structural parser error, or
    /// [`YarnLockError::UnresolvedDependency`] when a declaration references
    /// a `(name, range)` pair no header in the file provides.
    pub fn parse(input: &str) -> Result<Self> {
        let tree = parser::parse(input)?;
        Self::from_tree(&tree)
    }

    /// Builds the dependency graph from an already-parsed tree.
    ///
    /// Useful when the caller wants both the associative form and the graph
    /// form of one file without parsing twice.
    ///
    /// # Errors
    ///
    /// Returns [`YarnLockError::UnresolvedDependency`] when a declaration
    /// references a `(name, range)` pair no header in the tree provides.
    pub fn from_tree(tree: &Map) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut lookup: HashMap<String, HashMap<String, NodeIndex>> = HashMap::new();
        let mut entries: Vec<(NodeIndex, &Map)> = Vec::new();

        for (header, declaration) in tree {
            let Some(declaration) = declaration.as_map() else {
                debug!("skipping top-level scalar entry '{}'", header);
                continue;
            };
            let requests = parser::split_requests(header);
            let Some(first) = requests.first() else {
                debug!("skipping header '{}' without request strings", header);
                continue;
            };
            let (name, _) = parser::split_name_range(first);
            let version = field_text(declaration, "version");
            let resolved = field_text(declaration, "resolved");

            let node = graph.add_node(Package::new(name.to_string(), version, resolved));
            graph[node].id = PackageId(node);
            let ranges = lookup.entry(name.to_string()).or_default();
            for request in &requests {
                let (_, range) = parser::split_name_range(request);
                graph[node].satisfied_ranges.push(range.to_string());
                ranges.insert(range.to_string(), node);
            }
            entries.push((node, declaration));
        }
        debug!("created {} packages", graph.node_count());

        let mut lock = Self {
            graph,
            depth_calculated: false,
        };
        for (node, declaration) in entries {
            for kind in DependencyType::ALL {
                let Some(Value::Map(dependencies)) = declaration.get(kind.key()) else {
                    continue;
                };
                for (dep_name, dep_range) in dependencies {
                    let Some(range) = scalar_text(dep_range) else {
                        debug!("skipping non-scalar range for dependency '{}'", dep_name);
                        continue;
                    };
                    let target = lookup
                        .get(dep_name.as_str())
                        .and_then(|ranges| ranges.get(range.as_ref()))
                        .copied();
                    let Some(target) = target else {
                        return Err(YarnLockError::UnresolvedDependency {
                            package: lock.graph[node].name.clone(),
                            dependency: dep_name.clone(),
                            range: range.into_owned(),
                        });
                    };
                    lock.add_dependency(PackageId(node), PackageId(target), kind);
                }
            }
        }
        debug!("wired {} dependency edges", lock.graph.edge_count());
        Ok(lock)
    }

    /// Adds a typed dependency edge. Adding an edge that already exists
    /// (same source, target, and type) is a no-op, so edge sets never hold
    /// duplicates.
    pub fn add_dependency(&mut self, from: PackageId, to: PackageId, kind: DependencyType) {
        let duplicate = self
            .graph
            .edges_connecting(from.0, to.0)
            .any(|edge| *edge.weight() == kind);
        if !duplicate {
            self.graph.add_edge(from.0, to.0, kind);
        }
    }

    /// All packages, in lock-file order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.graph.node_weights()
    }

    /// Number of packages in the graph.
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All packages with the given name, in lock-file order.
    #[must_use]
    pub fn packages_by_name(&self, name: &str) -> Vec<&Package> {
        self.packages().filter(|package| package.name == name).collect()
    }

    /// Looks up a package by name, and optionally by exact version or one of
    /// its satisfied ranges. With `None` the first package of that name in
    /// file order wins.
    #[must_use]
    pub fn package(&self, name: &str, version_or_range: Option<&str>) -> Option<&Package> {
        self.packages().find(|package| {
            package.name == name
                && version_or_range.is_none_or(|wanted| package.satisfies(wanted))
        })
    }

    /// Whether [`package`](Self::package) would find a match.
    #[must_use]
    pub fn has_package(&self, name: &str, version_or_range: Option<&str>) -> bool {
        self.package(name, version_or_range).is_some()
    }

    /// Direct dependencies of one type, in declaration order.
    #[must_use]
    pub fn dependencies_of(&self, id: PackageId, kind: DependencyType) -> Vec<&Package> {
        let mut dependencies: Vec<&Package> = self
            .graph
            .edges_directed(id.0, Direction::Outgoing)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| &self.graph[edge.target()])
            .collect();
        dependencies.reverse();
        dependencies
    }

    /// Direct dependencies of every type, concatenated in declaration-key
    /// order (dependencies, optionalDependencies, peerDependencies,
    /// devDependencies). A package listed under several types appears once
    /// per type.
    #[must_use]
    pub fn all_dependencies_of(&self, id: PackageId) -> Vec<&Package> {
        DependencyType::ALL
            .into_iter()
            .flat_map(|kind| self.dependencies_of(id, kind))
            .collect()
    }

    /// The packages that depend on `id`, deduplicated by node, in edge
    /// insertion order.
    #[must_use]
    pub fn resolvers_of(&self, id: PackageId) -> Vec<&Package> {
        let mut sources: Vec<NodeIndex> = self
            .graph
            .edges_directed(id.0, Direction::Incoming)
            .map(|edge| edge.source())
            .collect();
        sources.reverse();
        let mut seen = HashSet::new();
        sources.retain(|node| seen.insert(*node));
        sources.into_iter().map(|node| &self.graph[node]).collect()
    }

    /// Assigns every package its depth: the minimum number of dependency
    /// hops from the root set, over all four edge types.
    ///
    /// Without explicit roots, every package no other package depends on is
    /// a root at depth zero. Packages the root set cannot reach keep an
    /// unassigned depth.
    ///
    /// The calculation runs at most once per graph: the first call wins and
    /// every later call is a no-op, whatever roots it passes. An explicit
    /// empty root set assigns nothing but still counts as that first call.
    pub fn calculate_depth(&mut self, roots: Option<&[PackageId]>) {
        if self.depth_calculated {
            return;
        }
        self.depth_calculated = true;

        let roots: Vec<NodeIndex> = match roots {
            Some(explicit) => explicit.iter().map(|id| id.0).collect(),
            None => self.graph.externals(Direction::Incoming).collect(),
        };
        let mut queue = VecDeque::new();
        for root in roots {
            if self.graph[root].depth.is_none_or(|current| current > 0) {
                self.graph[root].depth = Some(0);
                queue.push_back(root);
            }
        }
        let root_count = queue.len();

        // Multi-source BFS; a node is only re-queued when its depth strictly
        // improves, which terminates on cycles.
        while let Some(node) = queue.pop_front() {
            let next = match self.graph[node].depth {
                Some(depth) => depth + 1,
                None => continue,
            };
            let mut dependencies = self.graph.neighbors(node).detach();
            while let Some(dependency) = dependencies.next_node(&self.graph) {
                if self.graph[dependency].depth.is_none_or(|current| current > next) {
                    self.graph[dependency].depth = Some(next);
                    queue.push_back(dependency);
                }
            }
        }
        debug!("assigned depths from {} root packages", root_count);
    }

    /// Packages whose depth `d` satisfies `start <= d < end`.
    ///
    /// An `end` of `None` means unbounded above and additionally admits
    /// packages whose depth was never assigned. Forces depth calculation
    /// with default roots.
    pub fn packages_by_depth(&mut self, start: usize, end: Option<usize>) -> Vec<&Package> {
        self.calculate_depth(None);
        self.packages()
            .filter(|package| match package.depth {
                None => end.is_none(),
                Some(depth) => depth >= start && end.is_none_or(|bound| depth < bound),
            })
            .collect()
    }

    /// Packages at exactly the given depth. Forces depth calculation with
    /// default roots.
    pub fn packages_at_depth(&mut self, depth: usize) -> Vec<&Package> {
        self.packages_by_depth(depth, Some(depth + 1))
    }

    /// One more than the deepest assigned depth, i.e. the number of depth
    /// levels; `1` when nothing has a depth. Forces depth calculation with
    /// default roots.
    pub fn max_depth(&mut self) -> usize {
        self.calculate_depth(None);
        1 + self.packages().filter_map(Package::depth).max().unwrap_or(0)
    }
}

impl Index<PackageId> for YarnLock {
    type Output = Package;

    fn index(&self, id: PackageId) -> &Package {
        &self.graph[id.0]
    }
}

impl FromStr for YarnLock {
    type Err = YarnLockError;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

/// Text form of a declaration field that should hold a string but may have
/// been coerced to a number. Empty when the field is absent or not scalar.
fn field_text(declaration: &Map, key: &str) -> String {
    declaration
        .get(key)
        .and_then(scalar_text)
        .map(Cow::into_owned)
        .unwrap_or_default()
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text)),
        Value::Integer(number) => Some(Cow::Owned(number.to_string())),
        Value::Float(number) => Some(Cow::Owned(number.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"package-1@^1.0.0:
  version "1.0.3"
  resolved "https://registry.npmjs.org/package-1/-/package-1-1.0.3.tgz"
package-2@^2.0.0:
  version "2.0.1"
  resolved "https://registry.npmjs.org/package-2/-/package-2-2.0.1.tgz"
  dependencies:
    package-4 "^4.0.0"
package-3@^3.0.0:
  version "3.1.9"
  resolved "https://registry.npmjs.org/package-3/-/package-3-3.1.9.tgz"
  dependencies:
    package-4 "^4.5.0"
package-4@^4.0.0, package-4@^4.5.0:
  version "4.6.3"
  resolved "https://registry.npmjs.org/package-4/-/package-4-4.6.3.tgz"
"#;

    const SHARED: &str = r#"app@1:
  version "1.0.0"
  dependencies:
    util "^1"
  peerDependencies:
    util "^1"
util@^1:
  version "1.5.0"
"#;

    #[test]
    fn builds_one_package_per_header() {
        let lock = YarnLock::parse(VALID).unwrap();
        assert_eq!(lock.package_count(), 4);
        let names: Vec<&str> = lock.packages().map(Package::name).collect();
        assert_eq!(names, vec!["package-1", "package-2", "package-3", "package-4"]);
    }

    #[test]
    fn ranges_collapse_onto_one_node() {
        let lock = YarnLock::parse(VALID).unwrap();
        let by_first = lock.package("package-4", Some("^4.0.0")).unwrap();
        let by_second = lock.package("package-4", Some("^4.5.0")).unwrap();
        assert_eq!(by_first.id(), by_second.id());
        assert_eq!(by_first.version(), "4.6.3");
        assert_eq!(by_first.satisfied_ranges(), ["^4.0.0", "^4.5.0"]);
    }

    #[test]
    fn finds_packages_by_version_or_range() {
        let lock = YarnLock::parse(VALID).unwrap();
        assert!(lock.has_package("package-1", None));
        assert!(lock.has_package("package-1", Some("^1.0.0")));
        assert!(lock.has_package("package-1", Some("1.0.3")));
        assert!(!lock.has_package("package-1", Some("^2.0.0")));
        assert!(!lock.has_package("package-5", None));
        assert_eq!(
            lock.package("package-2", None).unwrap().resolved(),
            "https://registry.npmjs.org/package-2/-/package-2-2.0.1.tgz"
        );
    }

    #[test]
    fn same_name_entries_stay_separate_in_file_order() {
        let input = "dup@^1.0.0:\n  version \"1.9.0\"\ndup@^2.0.0:\n  version \"2.3.0\"\n";
        let lock = YarnLock::parse(input).unwrap();
        let versions: Vec<&str> =
            lock.packages_by_name("dup").iter().map(|p| p.version()).collect();
        assert_eq!(versions, vec!["1.9.0", "2.3.0"]);
        assert_eq!(lock.package("dup", None).unwrap().version(), "1.9.0");
        assert_eq!(lock.package("dup", Some("^2.0.0")).unwrap().version(), "2.3.0");
    }

    #[test]
    fn wires_typed_edges() {
        let lock = YarnLock::parse(VALID).unwrap();
        let p2 = lock.package("package-2", None).unwrap().id();
        let p4 = lock.package("package-4", None).unwrap().id();
        let deps = lock.dependencies_of(p2, DependencyType::ProdRequired);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id(), p4);
        assert!(lock.dependencies_of(p2, DependencyType::DevRequired).is_empty());
        assert!(lock.dependencies_of(p4, DependencyType::ProdRequired).is_empty());
    }

    #[test]
    fn combined_listing_keeps_one_entry_per_type() {
        let lock = YarnLock::parse(SHARED).unwrap();
        let app = lock.package("app", None).unwrap().id();
        let all = lock.all_dependencies_of(app);
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|package| package.name() == "util"));
    }

    #[test]
    fn duplicate_edges_are_no_ops() {
        let mut lock = YarnLock::parse(SHARED).unwrap();
        let app = lock.package("app", None).unwrap().id();
        let util = lock.package("util", None).unwrap().id();
        lock.add_dependency(app, util, DependencyType::ProdRequired);
        lock.add_dependency(app, util, DependencyType::ProdRequired);
        assert_eq!(lock.dependencies_of(app, DependencyType::ProdRequired).len(), 1);
    }

    #[test]
    fn resolvers_deduplicate_across_edge_types() {
        let lock = YarnLock::parse(SHARED).unwrap();
        let app = lock.package("app", None).unwrap();
        let util = lock.package("util", None).unwrap();
        let resolvers = lock.resolvers_of(util.id());
        assert_eq!(resolvers.len(), 1);
        assert_eq!(resolvers[0].id(), app.id());
        assert!(lock.resolvers_of(app.id()).is_empty());
    }

    #[test]
    fn dangling_references_fail_the_build() {
        let input = "app@1:\n  version \"1.0.0\"\n  dependencies:\n    util \"^2\"\nutil@^1:\n  version \"1.5.0\"\n";
        let err = YarnLock::parse(input).unwrap_err();
        assert_eq!(
            err,
            YarnLockError::UnresolvedDependency {
                package: "app".to_string(),
                dependency: "util".to_string(),
                range: "^2".to_string(),
            }
        );
    }

    #[test]
    fn numeric_ranges_match_their_header_form() {
        let input = "app@1:\n  version \"1.0.0\"\n  dependencies:\n    pin 2\npin@2:\n  version \"2.0.0\"\n";
        let lock = YarnLock::parse(input).unwrap();
        let app = lock.package("app", None).unwrap().id();
        let deps = lock.dependencies_of(app, DependencyType::ProdRequired);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name(), "pin");
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let lock = YarnLock::parse("bare@*:\n  version \"0.0.1\"\n").unwrap();
        let package = lock.package("bare", None).unwrap();
        assert_eq!(package.resolved(), "");
        let lock = YarnLock::parse("bare@*:\n  resolved \"file:bare\"\n").unwrap();
        assert_eq!(lock.package("bare", None).unwrap().version(), "");
    }

    #[test]
    fn scalar_top_level_entries_are_ignored() {
        let input = "stray 4\napp@1:\n  version \"1.0.0\"\n";
        let lock = YarnLock::parse(input).unwrap();
        assert_eq!(lock.package_count(), 1);
        assert!(lock.has_package("app", None));
    }

    #[test]
    fn from_tree_matches_parse() {
        let tree = parser::parse(VALID).unwrap();
        let lock = YarnLock::from_tree(&tree).unwrap();
        assert_eq!(lock.package_count(), 4);
        // The tree is still usable afterwards.
        assert!(tree.contains_key("package-1@^1.0.0"));
    }

    #[test]
    fn from_str_round_trips_through_parse() {
        let lock: YarnLock = VALID.parse().unwrap();
        assert_eq!(lock.package_count(), 4);
    }

    #[test]
    fn index_returns_the_package_for_a_handle() {
        let lock = YarnLock::parse(VALID).unwrap();
        let id = lock.package("package-3", None).unwrap().id();
        assert_eq!(lock[id].to_string(), "package-3@3.1.9");
    }

    #[test]
    fn depth_follows_dependency_hops() {
        let input = "\
a@1:
  version \"1.0.0\"
  dependencies:
    b \"2\"
b@2:
  version \"2.0.0\"
  dependencies:
    c \"3\"
c@3:
  version \"3.0.0\"
";
        let mut lock = YarnLock::parse(input).unwrap();
        lock.calculate_depth(None);
        assert_eq!(lock.package("a", None).unwrap().depth(), Some(0));
        assert_eq!(lock.package("b", None).unwrap().depth(), Some(1));
        assert_eq!(lock.package("c", None).unwrap().depth(), Some(2));
        assert_eq!(lock.max_depth(), 3);
    }

    #[test]
    fn depth_takes_the_shortest_path_through_diamonds() {
        let input = "\
app@1:
  version \"1.0.0\"
  dependencies:
    left \"1\"
    right \"1\"
left@1:
  version \"1.0.0\"
  dependencies:
    shared \"1\"
right@1:
  version \"1.0.0\"
  dependencies:
    mid \"1\"
mid@1:
  version \"1.0.0\"
  dependencies:
    shared \"1\"
shared@1:
  version \"1.0.0\"
";
        let mut lock = YarnLock::parse(input).unwrap();
        lock.calculate_depth(None);
        assert_eq!(lock.package("shared", None).unwrap().depth(), Some(2));
        assert_eq!(lock.package("mid", None).unwrap().depth(), Some(2));
        assert_eq!(lock.max_depth(), 3);
    }

    #[test]
    fn depth_terminates_on_cycles() {
        let input = "\
r@1:
  version \"1.0.0\"
  dependencies:
    a \"1\"
a@1:
  version \"1.0.0\"
  dependencies:
    b \"1\"
b@1:
  version \"1.0.0\"
  dependencies:
    c \"1\"
c@1:
  version \"1.0.0\"
  dependencies:
    a \"1\"
";
        let mut lock = YarnLock::parse(input).unwrap();
        assert_eq!(lock.max_depth(), 4);
        assert_eq!(lock.package("c", None).unwrap().depth(), Some(3));
    }

    #[test]
    fn rootless_cycles_keep_unassigned_depths() {
        let input = "\
x@1:
  version \"1.0.0\"
  dependencies:
    y \"1\"
y@1:
  version \"1.0.0\"
  dependencies:
    x \"1\"
";
        let mut lock = YarnLock::parse(input).unwrap();
        assert_eq!(lock.max_depth(), 1);
        assert_eq!(lock.package("x", None).unwrap().depth(), None);
        // Unassigned depths only show up in the unbounded band.
        assert_eq!(lock.packages_by_depth(0, Some(5)).len(), 0);
        assert_eq!(lock.packages_by_depth(0, None).len(), 2);
    }

    #[test]
    fn explicit_roots_win_over_later_calls() {
        let input = "\
a@1:
  version \"1.0.0\"
  dependencies:
    b \"2\"
b@2:
  version \"2.0.0\"
  dependencies:
    c \"3\"
c@3:
  version \"3.0.0\"
";
        let mut lock = YarnLock::parse(input).unwrap();
        let b = lock.package("b", None).unwrap().id();
        lock.calculate_depth(Some(&[b]));
        assert_eq!(lock.package("b", None).unwrap().depth(), Some(0));
        assert_eq!(lock.package("c", None).unwrap().depth(), Some(1));
        assert_eq!(lock.package("a", None).unwrap().depth(), None);

        // The first calculation wins; default roots no longer apply.
        lock.calculate_depth(None);
        assert_eq!(lock.package("a", None).unwrap().depth(), None);
        assert_eq!(lock.max_depth(), 2);
    }

    #[test]
    fn empty_root_set_still_counts_as_the_first_call() {
        let mut lock = YarnLock::parse(VALID).unwrap();
        lock.calculate_depth(Some(&[]));
        lock.calculate_depth(None);
        assert!(lock.packages().all(|package| package.depth().is_none()));
        assert_eq!(lock.max_depth(), 1);
    }

    #[test]
    fn depth_bands_partition_the_package_set() {
        let mut lock = YarnLock::parse(VALID).unwrap();
        let shallow: Vec<String> =
            lock.packages_at_depth(0).iter().map(|p| p.to_string()).collect();
        let deep: Vec<String> = lock
            .packages_by_depth(1, None)
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(shallow.len() + deep.len(), lock.package_count());
        assert!(shallow.iter().all(|name| !deep.contains(name)));
        assert_eq!(deep, vec!["package-4@4.6.3"]);
        assert_eq!(lock.max_depth(), 2);
    }
}
