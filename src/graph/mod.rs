//! Id-indexed ontology graph arena.
//!
//! A [`Graph`] owns every [`TermRecord`] of one connected ontology fragment
//! and the adjacency between them. Records reference each other by id only,
//! never by pointer, so the arena is the single place where node identity,
//! symmetric adjacency, and bulk structural edits (copy, prune, splice) are
//! enforced.
//!
//! Navigation lives on [`Term`], a cheap handle binding a term id to its
//! owning graph.

pub mod snapshot;
pub mod term;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::remote::RemoteSource;

pub use term::Term;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Expansion status of one lazy direction (parents, children, or metadata).
///
/// `Unexpanded` means "never attempted", not "known empty". Once a fetch has
/// been attempted, or a shaping operation (focus, merge, detach) has frozen
/// the boundary, the direction is `Expanded` and the adjacency recorded in
/// the graph is authoritative, even when empty. There is no transition back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpansionState {
    #[default]
    Unexpanded,
    Expanded,
}

impl ExpansionState {
    pub fn is_expanded(self) -> bool {
        matches!(self, ExpansionState::Expanded)
    }

    /// Force the expanded (locked) state without a fetch.
    pub fn lock(&mut self) {
        *self = ExpansionState::Expanded;
    }
}

/// Kind of a term synonym, as classified by the remote metadata keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SynonymKind {
    Exact,
    Related,
    Narrow,
    Broad,
    AltId,
    Other(String),
}

impl SynonymKind {
    /// Classify a remote metadata key. `"exact_synonym"` → `Exact`, the bare
    /// `"alt_id"` key → `AltId`, any other `"<kind>_synonym"` → `Other(kind)`.
    /// Non-synonym keys yield `None`.
    pub fn from_metadata_key(key: &str) -> Option<Self> {
        if key == "alt_id" {
            return Some(SynonymKind::AltId);
        }
        let kind = key.strip_suffix("_synonym")?;
        Some(match kind {
            "exact" => SynonymKind::Exact,
            "related" => SynonymKind::Related,
            "narrow" => SynonymKind::Narrow,
            "broad" => SynonymKind::Broad,
            "alt_id" => SynonymKind::AltId,
            other => SynonymKind::Other(other.to_owned()),
        })
    }
}

/// One ontology term as stored in the arena.
///
/// Adjacency is kept as insertion-ordered, duplicate-free id lists; both
/// directions are maintained together by [`Graph::add_relationship`].
#[derive(Debug, Clone)]
pub struct TermRecord {
    pub id: String,
    pub name: String,
    pub definition: Option<String>,
    pub synonyms: std::collections::BTreeMap<SynonymKind, Vec<String>>,
    pub obsolete: Option<bool>,
    pub parent_ids: Vec<String>,
    pub child_ids: Vec<String>,
    pub parents: ExpansionState,
    pub children: ExpansionState,
    pub metadata: ExpansionState,
}

impl TermRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            definition: None,
            synonyms: std::collections::BTreeMap::new(),
            obsolete: None,
            parent_ids: Vec::new(),
            child_ids: Vec::new(),
            parents: ExpansionState::Unexpanded,
            children: ExpansionState::Unexpanded,
            metadata: ExpansionState::Unexpanded,
        }
    }

    /// Freeze both adjacency directions (focus/merge boundary locking).
    pub fn lock_expansion(&mut self) {
        self.parents.lock();
        self.children.lock();
    }
}

/// The owning structure for one connected ontology fragment.
///
/// Invariants:
/// - at most one record per id;
/// - symmetric adjacency: `b ∈ a.child_ids` iff `a ∈ b.parent_ids`.
///
/// Not safe for unsynchronized concurrent mutation; callers share a graph
/// through `Rc<RefCell<Graph>>` on a single thread.
pub struct Graph {
    remote: Rc<dyn RemoteSource>,
    nodes: HashMap<String, TermRecord>,
}

impl Graph {
    /// An empty graph bound to a remote source for lazy expansion.
    pub fn new(remote: Rc<dyn RemoteSource>) -> Self {
        Self {
            remote,
            nodes: HashMap::new(),
        }
    }

    /// Handle to the remote source shared by every term of this graph.
    pub fn remote(&self) -> Rc<dyn RemoteSource> {
        Rc::clone(&self.remote)
    }

    /// Insert a record if the id is absent. An existing record is left
    /// untouched, never overwritten.
    pub fn add_node(&mut self, id: &str, name: &str) {
        if !self.nodes.contains_key(id) {
            self.nodes
                .insert(id.to_owned(), TermRecord::new(id, name));
        }
    }

    /// Insert a pre-built record if the id is absent (used when splicing a
    /// subtree, where cached metadata and expansion flags travel with it).
    pub fn add_record(&mut self, record: TermRecord) {
        self.nodes.entry(record.id.clone()).or_insert(record);
    }

    /// Record a parent→child edge in both directions.
    ///
    /// Both endpoints must already be present; duplicates are ignored.
    pub fn add_relationship(&mut self, parent_id: &str, child_id: &str) -> GraphResult<()> {
        for id in [parent_id, child_id] {
            if !self.nodes.contains_key(id) {
                return Err(GraphError::NodeNotFound { id: id.to_owned() });
            }
        }

        let parent = self.nodes.get_mut(parent_id).expect("checked above");
        if !parent.child_ids.iter().any(|c| c == child_id) {
            parent.child_ids.push(child_id.to_owned());
        }
        let child = self.nodes.get_mut(child_id).expect("checked above");
        if !child.parent_ids.iter().any(|p| p == parent_id) {
            child.parent_ids.push(parent_id.to_owned());
        }
        Ok(())
    }

    /// O(1) record lookup. Never fetches.
    pub fn find(&self, id: &str) -> Option<&TermRecord> {
        self.nodes.get(id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TermRecord> {
        self.nodes.get_mut(id)
    }

    /// Record lookup that reports a missing id as an error.
    pub fn record(&self, id: &str) -> GraphResult<&TermRecord> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_owned() })
    }

    pub fn record_mut(&mut self, id: &str) -> GraphResult<&mut TermRecord> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_owned() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of records in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ids currently present (unordered).
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &TermRecord> {
        self.nodes.values()
    }

    /// Every parent→child pair present in the arena.
    pub fn edges(&self) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        for record in self.nodes.values() {
            for child in &record.child_ids {
                edges.push((record.id.clone(), child.clone()));
            }
        }
        edges
    }

    /// Duplicate the arena: identical topology and cached field values, but
    /// entirely fresh record identities. Mutating the copy never affects the
    /// source. The remote handle is shared.
    pub fn structural_copy(&self) -> Graph {
        Graph {
            remote: Rc::clone(&self.remote),
            nodes: self.nodes.clone(),
        }
    }

    /// Drop every record whose id is not in `keep`, then strip dangling
    /// adjacency references from the records that remain.
    pub fn retain(&mut self, keep: &HashSet<String>) {
        self.nodes.retain(|id, _| keep.contains(id));
        for record in self.nodes.values_mut() {
            record.parent_ids.retain(|p| keep.contains(p));
            record.child_ids.retain(|c| keep.contains(c));
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph").field("nodes", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::replay::ReplayRemote;

    fn empty_graph() -> Graph {
        Graph::new(Rc::new(ReplayRemote::new("test")))
    }

    #[test]
    fn add_node_is_noop_on_duplicate() {
        let mut g = empty_graph();
        g.add_node("EMAP:1", "embryo");
        g.add_node("EMAP:1", "something else entirely");
        assert_eq!(g.len(), 1);
        assert_eq!(g.find("EMAP:1").unwrap().name, "embryo");
    }

    #[test]
    fn add_relationship_is_symmetric_and_duplicate_free() {
        let mut g = empty_graph();
        g.add_node("EMAP:0", "root");
        g.add_node("EMAP:1", "embryo");
        g.add_relationship("EMAP:0", "EMAP:1").unwrap();
        g.add_relationship("EMAP:0", "EMAP:1").unwrap();

        assert_eq!(g.find("EMAP:0").unwrap().child_ids, vec!["EMAP:1"]);
        assert_eq!(g.find("EMAP:1").unwrap().parent_ids, vec!["EMAP:0"]);
    }

    #[test]
    fn add_relationship_requires_both_endpoints() {
        let mut g = empty_graph();
        g.add_node("EMAP:0", "root");
        let err = g.add_relationship("EMAP:0", "EMAP:99").unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound { id } if id == "EMAP:99"));
    }

    #[test]
    fn structural_copy_is_independent() {
        let mut g = empty_graph();
        g.add_node("EMAP:0", "root");
        g.add_node("EMAP:1", "embryo");
        g.add_relationship("EMAP:0", "EMAP:1").unwrap();

        let mut copy = g.structural_copy();
        copy.add_node("EMAP:2", "organ system");
        copy.add_relationship("EMAP:1", "EMAP:2").unwrap();
        copy.find_mut("EMAP:1").unwrap().name = "renamed".into();

        assert_eq!(g.len(), 2);
        assert_eq!(copy.len(), 3);
        assert_eq!(g.find("EMAP:1").unwrap().name, "embryo");
        assert!(g.find("EMAP:1").unwrap().child_ids.is_empty());
    }

    #[test]
    fn retain_strips_dangling_references() {
        let mut g = empty_graph();
        g.add_node("EMAP:0", "root");
        g.add_node("EMAP:1", "embryo");
        g.add_node("EMAP:2", "organ system");
        g.add_relationship("EMAP:0", "EMAP:1").unwrap();
        g.add_relationship("EMAP:0", "EMAP:2").unwrap();

        let keep: HashSet<String> = ["EMAP:0".to_owned(), "EMAP:1".to_owned()].into();
        g.retain(&keep);

        assert_eq!(g.len(), 2);
        assert_eq!(g.find("EMAP:0").unwrap().child_ids, vec!["EMAP:1"]);
        assert!(!g.contains("EMAP:2"));
    }

    #[test]
    fn synonym_kind_classification() {
        assert_eq!(
            SynonymKind::from_metadata_key("exact_synonym"),
            Some(SynonymKind::Exact)
        );
        assert_eq!(
            SynonymKind::from_metadata_key("alt_id"),
            Some(SynonymKind::AltId)
        );
        assert_eq!(
            SynonymKind::from_metadata_key("xref_synonym"),
            Some(SynonymKind::Other("xref".into()))
        );
        assert_eq!(SynonymKind::from_metadata_key("definition"), None);
    }

    #[test]
    fn expansion_state_locks_forward_only() {
        let mut state = ExpansionState::default();
        assert!(!state.is_expanded());
        state.lock();
        assert!(state.is_expanded());
        state.lock();
        assert!(state.is_expanded());
    }
}
