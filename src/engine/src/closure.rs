//! Hierarchy closure index
//!
//! Maps a group to itself plus every group nested under it, transitively.
//! The parent → children adjacency is built once from the nesting edges;
//! closures are computed on demand and memoized so an anchor reuses
//! whatever another anchor already walked.
//!
//! # Algorithm
//!
//! An explicit, iterative depth-first walk in the style of Tarjan's
//! strongly-connected-components algorithm:
//!
//! - Groups on the active path live on a stack. An edge leading back to a
//!   group on the active path is not descended into again; it only lowers
//!   the current group's low-link.
//! - A group whose low-link equals its own discovery index closes a
//!   component. Every member of that component receives the same closure:
//!   the union of what the members reached. Cycles therefore terminate and
//!   still produce complete closures.
//! - Finished components go into the memo. A later walk that reaches a
//!   memoized group merges its closure without descending, so each edge is
//!   traversed a bounded number of times however many anchors share it.

use adrole_core::types::{Group, NestingEdge};
use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Closure of a single group
pub type GroupSet = Arc<BTreeSet<String>>;

/// Statistics about closure memo usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// `closure` calls answered from the memo
    pub hits: usize,
    /// `closure` calls that had to walk the graph
    pub misses: usize,
    /// Memoized subgraphs merged during a walk instead of re-traversed
    pub shared: usize,
    /// Groups with a memoized closure
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the memo hit rate for `closure` calls
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memoized transitive closure over the group nesting graph
///
/// All query methods take `&self`; the memo is a `DashMap`, so an index can
/// be shared between threads once built.
pub struct ClosureIndex {
    /// Parent → sorted, deduplicated children
    children: HashMap<String, Vec<String>>,
    /// Every group id in the inventory
    groups: BTreeSet<String>,
    /// Group → full closure
    memo: DashMap<String, GroupSet>,
    edge_count: usize,
    dropped_edges: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
    shared: AtomicUsize,
}

impl ClosureIndex {
    /// Build the index from the group inventory and nesting edges
    ///
    /// Edges naming a group absent from the inventory are dropped, as are
    /// self-edges and duplicates.
    pub fn new(groups: &[Group], edges: &[NestingEdge]) -> Self {
        let known: BTreeSet<String> = groups.iter().map(|g| g.group_id.clone()).collect();

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut dropped = 0;

        for edge in edges {
            let parent = edge.parent_group_id.as_str();
            let child = edge.child_group_id.as_str();

            if !known.contains(parent) || !known.contains(child) {
                trace!(parent, child, "Dropping nesting edge with unknown endpoint");
                dropped += 1;
                continue;
            }
            if parent == child {
                continue;
            }
            children
                .entry(parent.to_string())
                .or_default()
                .push(child.to_string());
        }

        let mut edge_count = 0;
        for list in children.values_mut() {
            list.sort();
            list.dedup();
            edge_count += list.len();
        }

        if dropped > 0 {
            debug!(dropped, "Ignored nesting edges referencing unknown groups");
        }
        debug!(groups = known.len(), edges = edge_count, "Built closure index");

        Self {
            children,
            groups: known,
            memo: DashMap::new(),
            edge_count,
            dropped_edges: dropped,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            shared: AtomicUsize::new(0),
        }
    }

    /// Number of groups in the inventory
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of distinct nesting edges kept
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of input edges dropped for referencing unknown groups
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    pub fn contains(&self, group_id: &str) -> bool {
        self.groups.contains(group_id)
    }

    /// Direct children of a group
    pub fn children_of(&self, group_id: &str) -> &[String] {
        self.children
            .get(group_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The group itself plus every group nested under it
    ///
    /// Unknown groups yield an empty set.
    pub fn closure(&self, group_id: &str) -> GroupSet {
        if let Some(done) = self.cached(group_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return done;
        }
        if !self.contains(group_id) {
            return Arc::new(BTreeSet::new());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.walk(group_id);

        // The walk always finishes the root's component.
        self.cached(group_id)
            .unwrap_or_else(|| Arc::new(BTreeSet::new()))
    }

    /// Memoize the closure of every group
    ///
    /// Call before fanning out readers if the memo should be complete.
    pub fn precompute(&self) {
        for group_id in &self.groups {
            if self.cached(group_id).is_none() {
                self.walk(group_id);
            }
        }
        debug!(entries = self.memo.len(), "Precomputed group closures");
    }

    /// Groups that take part in nesting cycles
    ///
    /// Each entry is one cycle's members, sorted; entries are ordered by
    /// their first member.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut assigned: HashSet<&str> = HashSet::new();
        let mut cycles = Vec::new();

        for group_id in &self.groups {
            if assigned.contains(group_id.as_str()) {
                continue;
            }
            let reach = self.closure(group_id);
            let members: Vec<String> = reach
                .iter()
                .filter(|other| {
                    other.as_str() == group_id.as_str() || self.closure(other).contains(group_id)
                })
                .cloned()
                .collect();

            if members.len() > 1 {
                for member in &self.groups {
                    if members.binary_search(member).is_ok() {
                        assigned.insert(member.as_str());
                    }
                }
                cycles.push(members);
            }
        }

        cycles
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            shared: self.shared.load(Ordering::Relaxed),
            entries: self.memo.len(),
        }
    }

    /// Drop every memoized closure and reset statistics
    pub fn clear(&self) {
        self.memo.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.shared.store(0, Ordering::Relaxed);
    }

    fn cached(&self, group_id: &str) -> Option<GroupSet> {
        // Clone out of the guard so no shard lock outlives this call.
        self.memo.get(group_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Walk from `root` and memoize every component it finishes
    fn walk(&self, root: &str) {
        let mut walk = Walk::default();
        let mut path: Vec<Frame<'_>> = Vec::new();

        let Some(root) = self.groups.get(root) else {
            return;
        };
        walk.enter(root);
        path.push(Frame { node: root, next: 0 });

        while let Some(frame) = path.last_mut() {
            let node = frame.node;
            let children = self.children_of(node);

            if frame.next < children.len() {
                let child = children[frame.next].as_str();
                frame.next += 1;

                if let Some(done) = self.cached(child) {
                    self.shared.fetch_add(1, Ordering::Relaxed);
                    walk.merge(node, &done);
                } else if !walk.discovered(child) {
                    walk.enter(child);
                    path.push(Frame { node: child, next: 0 });
                } else if walk.on_path(child) {
                    // Already on the active path: do not descend again.
                    walk.lower(node, walk.index_of(child));
                }
                continue;
            }

            path.pop();

            let finished = if walk.is_component_root(node) {
                let members = walk.pop_component(node);
                let closure = walk.union_of(&members);
                if members.len() > 1 {
                    trace!(size = members.len(), "Closed nesting cycle");
                }
                for member in &members {
                    self.memo.insert((*member).to_string(), Arc::clone(&closure));
                }
                Some(closure)
            } else {
                None
            };

            if let Some(parent) = path.last() {
                let low = walk.low_of(node);
                walk.lower(parent.node, low);
                if let Some(closure) = finished {
                    walk.merge(parent.node, &closure);
                }
            }
        }
    }
}

/// A group on the active path and the next child to visit
struct Frame<'a> {
    node: &'a str,
    next: usize,
}

/// Per-walk bookkeeping
#[derive(Default)]
struct Walk<'a> {
    counter: usize,
    index: HashMap<&'a str, usize>,
    low: HashMap<&'a str, usize>,
    stack: Vec<&'a str>,
    on_stack: HashSet<&'a str>,
    reach: HashMap<&'a str, BTreeSet<String>>,
}

impl<'a> Walk<'a> {
    fn enter(&mut self, node: &'a str) {
        self.index.insert(node, self.counter);
        self.low.insert(node, self.counter);
        self.counter += 1;
        self.stack.push(node);
        self.on_stack.insert(node);
        self.reach.insert(node, BTreeSet::from([node.to_string()]));
    }

    fn discovered(&self, node: &str) -> bool {
        self.index.contains_key(node)
    }

    fn on_path(&self, node: &str) -> bool {
        self.on_stack.contains(node)
    }

    fn index_of(&self, node: &str) -> usize {
        self.index.get(node).copied().unwrap_or(usize::MAX)
    }

    fn low_of(&self, node: &str) -> usize {
        self.low.get(node).copied().unwrap_or(usize::MAX)
    }

    fn lower(&mut self, node: &str, candidate: usize) {
        if let Some(low) = self.low.get_mut(node) {
            *low = (*low).min(candidate);
        }
    }

    fn merge(&mut self, node: &str, closure: &BTreeSet<String>) {
        if let Some(reach) = self.reach.get_mut(node) {
            reach.extend(closure.iter().cloned());
        }
    }

    fn is_component_root(&self, node: &str) -> bool {
        self.low_of(node) == self.index_of(node)
    }

    fn pop_component(&mut self, root: &str) -> Vec<&'a str> {
        let mut members = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack.remove(member);
            members.push(member);
            if member == root {
                break;
            }
        }
        members
    }

    fn union_of(&mut self, members: &[&'a str]) -> GroupSet {
        let mut closure = BTreeSet::new();
        for member in members {
            if let Some(reach) = self.reach.remove(member) {
                closure.extend(reach);
            }
        }
        Arc::new(closure)
    }
}
