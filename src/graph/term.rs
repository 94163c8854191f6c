//! Term handles: lazy navigation and graph shaping.
//!
//! A [`Term`] binds one term id to its owning [`Graph`]. Navigation
//! (`parents`, `children`, ancestor/descendant accumulation) fetches lazily
//! from the remote source, at most once per node per direction; shaping
//! operations (`focus`, `merge`, `remove_parents`/`remove_children`) rewrite
//! the arena in bulk and freeze the affected expansion boundaries.
//!
//! Handles are cheap clones sharing one `Rc`: in-place shaping through one
//! handle is visible through every other handle of the same graph. The
//! copying variants (`focused`, `without_parents`, `without_children`)
//! operate on a structural copy and leave the original untouched.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use crate::error::{GraphError, OntoResult};
use crate::remote::{ALL_RELATION_KINDS, RemoteSource};

use super::{Graph, SynonymKind};

/// A node handle bound to exactly one graph.
#[derive(Clone)]
pub struct Term {
    graph: Rc<RefCell<Graph>>,
    id: String,
}

impl Term {
    /// A fresh single-node graph holding only this term.
    pub fn new(remote: Rc<dyn RemoteSource>, id: &str, name: &str) -> Term {
        let mut graph = Graph::new(remote);
        graph.add_node(id, name);
        Term {
            graph: Rc::new(RefCell::new(graph)),
            id: id.to_owned(),
        }
    }

    /// Handle for an id already present in an existing graph.
    pub fn from_graph(graph: Rc<RefCell<Graph>>, id: impl Into<String>) -> Term {
        Term {
            graph,
            id: id.into(),
        }
    }

    /// The stable ontology term id (e.g. `"EMAP:3018"`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display name, as recorded in the graph.
    pub fn name(&self) -> OntoResult<String> {
        Ok(self.graph.borrow().record(&self.id)?.name.clone())
    }

    /// The owning graph. Exposed for cache/snapshot plumbing.
    pub fn graph(&self) -> Rc<RefCell<Graph>> {
        Rc::clone(&self.graph)
    }

    fn handle(&self, id: &str) -> Term {
        Term {
            graph: Rc::clone(&self.graph),
            id: id.to_owned(),
        }
    }

    // -----------------------------------------------------------------------
    // Lazy adjacency
    // -----------------------------------------------------------------------

    /// Direct parents, fetched from the remote at most once.
    ///
    /// After the first (possibly empty) fetch the parent side is locked and
    /// the adjacency recorded in the graph is authoritative, including
    /// parents spliced in later by a merge.
    pub fn parents(&self) -> OntoResult<Vec<Term>> {
        if !self.graph.borrow().record(&self.id)?.parents.is_expanded() {
            let remote = self.graph.borrow().remote();
            tracing::debug!(id = %self.id, "fetching term parents");
            let stubs = remote.term_parents(&self.id)?;

            let mut graph = self.graph.borrow_mut();
            for stub in &stubs {
                graph.add_node(&stub.id, &stub.name);
                graph.add_relationship(&stub.id, &self.id)?;
            }
            // Empty is a valid, final state; lock unconditionally.
            graph.record_mut(&self.id)?.parents.lock();
        }

        let graph = self.graph.borrow();
        Ok(graph
            .record(&self.id)?
            .parent_ids
            .iter()
            .map(|id| self.handle(id))
            .collect())
    }

    /// Direct children, fetched from the remote at most once (distance 1,
    /// all relation kinds).
    pub fn children(&self) -> OntoResult<Vec<Term>> {
        if !self.graph.borrow().record(&self.id)?.children.is_expanded() {
            let remote = self.graph.borrow().remote();
            tracing::debug!(id = %self.id, "fetching term children");
            let stubs = remote.term_children(&self.id, 1, &ALL_RELATION_KINDS)?;

            let mut graph = self.graph.borrow_mut();
            for stub in &stubs {
                graph.add_node(&stub.id, &stub.name);
                graph.add_relationship(&self.id, &stub.id)?;
            }
            graph.record_mut(&self.id)?.children.lock();
        }

        let graph = self.graph.borrow();
        Ok(graph
            .record(&self.id)?
            .child_ids
            .iter()
            .map(|id| self.handle(id))
            .collect())
    }

    /// Direct child with the given id, if any.
    pub fn child(&self, id: &str) -> OntoResult<Option<Term>> {
        Ok(self.children()?.into_iter().find(|c| c.id == id))
    }

    pub fn is_root(&self) -> OntoResult<bool> {
        Ok(self.parents()?.is_empty())
    }

    pub fn is_leaf(&self) -> OntoResult<bool> {
        Ok(self.children()?.is_empty())
    }

    // -----------------------------------------------------------------------
    // Ancestor / descendant accumulation
    // -----------------------------------------------------------------------

    /// Every ancestor term, root first, most direct parents last.
    ///
    /// The object list is *not* deduplicated: in a poly-hierarchy an ancestor
    /// reachable along several paths appears once per path. The id and name
    /// accessors deduplicate; downstream consumers rely on both behaviors.
    pub fn all_parents(&self) -> OntoResult<Vec<Term>> {
        let mut layers: Vec<Vec<Term>> = Vec::new();
        let mut previous = self.parents()?;
        while !previous.is_empty() {
            let mut next = Vec::new();
            for term in &previous {
                next.extend(term.parents()?);
            }
            layers.push(previous);
            previous = next;
        }
        layers.reverse();
        Ok(layers.into_iter().flatten().collect())
    }

    /// Deduplicated ancestor ids, root first (first occurrence wins).
    pub fn all_parent_ids(&self) -> OntoResult<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .all_parents()?
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .map(|t| t.id)
            .collect())
    }

    /// Deduplicated ancestor names, root first.
    pub fn all_parent_names(&self) -> OntoResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for term in self.all_parents()? {
            let name = term.name()?;
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Every descendant term, breadth-first, most direct children first.
    ///
    /// No variant of the descendant accessors deduplicates: a node reachable
    /// along several paths appears once per path. This asymmetry with the
    /// ancestor accessors is deliberate.
    pub fn all_children(&self) -> OntoResult<Vec<Term>> {
        let mut collected = Vec::new();
        let mut layer = self.children()?;
        while !layer.is_empty() {
            let mut next = Vec::new();
            for term in &layer {
                next.extend(term.children()?);
            }
            collected.extend(layer);
            layer = next;
        }
        Ok(collected)
    }

    /// Descendant ids, breadth-first, not deduplicated.
    pub fn all_child_ids(&self) -> OntoResult<Vec<String>> {
        Ok(self.all_children()?.into_iter().map(|t| t.id).collect())
    }

    /// Descendant names, breadth-first, not deduplicated.
    pub fn all_child_names(&self) -> OntoResult<Vec<String>> {
        self.all_children()?.iter().map(|t| t.name()).collect()
    }

    // -----------------------------------------------------------------------
    // Position within the hierarchy
    // -----------------------------------------------------------------------

    /// Depth of this term: 0 for a root, else one more than the level of its
    /// *first* parent. In a poly-hierarchy only the first parent counts; a
    /// shortest-path policy is deliberately not implemented.
    pub fn level(&self) -> OntoResult<usize> {
        match self.parents()?.into_iter().next() {
            None => Ok(0),
            Some(parent) => Ok(1 + parent.level()?),
        }
    }

    /// The root term reached by following first parents upward.
    pub fn root(&self) -> OntoResult<Term> {
        let mut current = self.clone();
        loop {
            match current.parents()?.into_iter().next() {
                None => return Ok(current),
                Some(parent) => current = parent,
            }
        }
    }

    /// Number of unique terms in the hierarchy this term belongs to: the
    /// root plus every distinct descendant of the root.
    pub fn size(&self) -> OntoResult<usize> {
        let root = self.root()?;
        let unique: HashSet<String> = root.all_child_ids()?.into_iter().collect();
        Ok(unique.len() + 1)
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    fn ensure_metadata(&self) -> OntoResult<()> {
        if self.graph.borrow().record(&self.id)?.metadata.is_expanded() {
            return Ok(());
        }
        let remote = self.graph.borrow().remote();
        tracing::debug!(id = %self.id, "fetching term metadata");
        let entries = remote.term_metadata(&self.id)?;

        let mut graph = self.graph.borrow_mut();
        let record = graph.record_mut(&self.id)?;
        for (key, value) in entries {
            if key == "definition" {
                record.definition = Some(value);
            } else if let Some(kind) = SynonymKind::from_metadata_key(&key) {
                record.synonyms.entry(kind).or_default().push(value);
            }
        }
        record.metadata.lock();
        Ok(())
    }

    /// The term definition. `None` when the remote metadata carries no
    /// `"definition"` key. Absence is a valid final state, not an error.
    pub fn definition(&self) -> OntoResult<Option<String>> {
        self.ensure_metadata()?;
        Ok(self.graph.borrow().record(&self.id)?.definition.clone())
    }

    /// Synonyms grouped by kind, fetched together with the definition.
    pub fn synonyms(&self) -> OntoResult<BTreeMap<SynonymKind, Vec<String>>> {
        self.ensure_metadata()?;
        Ok(self.graph.borrow().record(&self.id)?.synonyms.clone())
    }

    /// Whether the remote flags this term obsolete. One remote call, memoized.
    pub fn is_obsolete(&self) -> OntoResult<bool> {
        if let Some(flag) = self.graph.borrow().record(&self.id)?.obsolete {
            return Ok(flag);
        }
        let remote = self.graph.borrow().remote();
        let flag = remote.is_obsolete(&self.id)?;
        self.graph.borrow_mut().record_mut(&self.id)?.obsolete = Some(flag);
        Ok(flag)
    }

    // -----------------------------------------------------------------------
    // Graph shaping
    // -----------------------------------------------------------------------

    /// Prune the owning graph down to this term, its ancestors and its
    /// descendants, in place.
    ///
    /// Every kept record's expansion flags are locked first, so the focused
    /// subgraph is complete as-is and never grows through later lazy fetches.
    /// All other records are dropped and dangling references stripped. Every
    /// handle sharing this graph observes the mutation.
    pub fn focus(&self) -> OntoResult<()> {
        tracing::debug!(id = %self.id, "focusing graph");
        let mut keep: HashSet<String> = HashSet::new();
        keep.insert(self.id.clone());
        keep.extend(self.all_parent_ids()?);
        keep.extend(self.all_child_ids()?);

        let mut graph = self.graph.borrow_mut();
        for id in &keep {
            if let Some(record) = graph.find_mut(id) {
                record.lock_expansion();
            }
        }
        graph.retain(&keep);
        Ok(())
    }

    /// Focus a structural copy, leaving this term's graph untouched.
    pub fn focused(&self) -> OntoResult<Term> {
        let copy = self.structural_copy();
        copy.focus()?;
        Ok(copy)
    }

    /// Handle to a structural copy of the whole graph: identical topology and
    /// cached values, fresh record identities.
    pub fn structural_copy(&self) -> Term {
        Term {
            graph: Rc::new(RefCell::new(self.graph.borrow().structural_copy())),
            id: self.id.clone(),
        }
    }

    /// Strip everything upstream of this term, in place: only this term and
    /// its descendants remain, and the parent side is locked so it reports
    /// empty without a remote re-fetch.
    pub fn remove_parents(&self) -> OntoResult<()> {
        let mut keep: HashSet<String> = self.all_child_ids()?.into_iter().collect();
        keep.insert(self.id.clone());

        let mut graph = self.graph.borrow_mut();
        graph.retain(&keep);
        graph.record_mut(&self.id)?.parents.lock();
        Ok(())
    }

    /// Detached copy: this term and its descendants in a fresh graph, with
    /// the parent side locked. The original graph is untouched.
    pub fn without_parents(&self) -> OntoResult<Term> {
        let copy = self.structural_copy();
        copy.remove_parents()?;
        Ok(copy)
    }

    /// Strip everything downstream of this term, in place; the child side is
    /// locked so it reports empty without a remote re-fetch.
    pub fn remove_children(&self) -> OntoResult<()> {
        let mut keep: HashSet<String> = self.all_parent_ids()?.into_iter().collect();
        keep.insert(self.id.clone());

        let mut graph = self.graph.borrow_mut();
        graph.retain(&keep);
        graph.record_mut(&self.id)?.children.lock();
        Ok(())
    }

    /// Copy of this term with its descendants stripped, in a fresh graph.
    pub fn without_children(&self) -> OntoResult<Term> {
        let copy = self.structural_copy();
        copy.remove_children()?;
        Ok(copy)
    }

    /// Splice `donor`'s subgraph into this term's graph.
    ///
    /// Both terms must descend from the same root. Donor-only subtrees are
    /// imported as detached structural copies. Records already present in
    /// the target always win and are never overwritten, and an edge between
    /// two pre-existing records is never imported. Children common to both
    /// sides are merged recursively and then locked, so a later independent
    /// fetch cannot grow them past the merged boundary. The donor's graph is
    /// never mutated.
    pub fn merge(&self, donor: &Term) -> OntoResult<()> {
        let target_root = self.root()?;
        let donor_root = donor.root()?;
        if target_root.id != donor_root.id {
            return Err(GraphError::RootsDiffer {
                target_root: target_root.id.clone(),
                donor_root: donor_root.id.clone(),
            }
            .into());
        }
        tracing::debug!(target = %self.id, donor = %donor.id, "merging subgraphs");
        merge_subtrees(&target_root, &donor_root)
    }
}

/// Recursive merge step operating on one matched pair of nodes.
fn merge_subtrees(target: &Term, donor: &Term) -> OntoResult<()> {
    let target_ids: HashSet<String> = target
        .children()?
        .into_iter()
        .map(|t| t.id().to_owned())
        .collect();

    for donor_child in donor.children()? {
        if target_ids.contains(donor_child.id()) {
            let target_child = Term::from_graph(target.graph(), donor_child.id());
            merge_subtrees(&target_child, &donor_child)?;
            // The merged child is now the union of both sides; freeze it.
            target
                .graph()
                .borrow_mut()
                .record_mut(donor_child.id())?
                .lock_expansion();
        } else {
            let detached = donor_child.without_parents()?;
            let subgraph = detached.graph();
            let sub = subgraph.borrow();

            let target_graph = target.graph();
            let mut graph = target_graph.borrow_mut();
            let pre_existing: HashSet<String> = sub
                .ids()
                .filter(|id| graph.contains(id))
                .map(str::to_owned)
                .collect();

            for record in sub.records() {
                if !pre_existing.contains(&record.id) {
                    let mut imported = record.clone();
                    imported.parent_ids.clear();
                    imported.child_ids.clear();
                    graph.add_record(imported);
                }
            }
            for (parent, child) in sub.edges() {
                if pre_existing.contains(&parent) && pre_existing.contains(&child) {
                    continue;
                }
                graph.add_relationship(&parent, &child)?;
            }
            graph.add_relationship(target.id(), donor_child.id())?;
        }
    }
    Ok(())
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self
            .graph
            .borrow()
            .find(&self.id)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        write!(f, "{} - {}", self.id, name)
    }
}

impl std::fmt::Debug for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Term").field("id", &self.id).finish()
    }
}
