//! Versioned, serializable snapshots of a graph.
//!
//! A snapshot is the explicit on-disk schema for one cached subgraph: an
//! ordered list of node records (id, name, cached metadata, expansion flags)
//! plus an edge list. Round-trip fidelity depends only on this schema, never
//! on a language runtime's object-graph encoder. The binary form is bincode
//! with the version checked on decode, in the same spirit as the versioned
//! store headers elsewhere in this family of tools.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GraphError;
use crate::remote::RemoteSource;

use super::{ExpansionState, Graph, SynonymKind, Term, TermRecord};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from snapshot encoding/decoding.
#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("snapshot codec error: {message}")]
    #[diagnostic(
        code(ontolook::snapshot::codec),
        help("The byte stream is not a valid ontolook graph snapshot.")
    )]
    Codec { message: String },

    #[error("unsupported snapshot version {found} (expected {expected})")]
    #[diagnostic(
        code(ontolook::snapshot::version),
        help(
            "This blob was written by an incompatible ontolook version. \
             Re-populate the cache to rewrite it in the current format."
        )
    )]
    Version { found: u32, expected: u32 },
}

/// One node record inside a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub name: String,
    pub definition: Option<String>,
    pub synonyms: BTreeMap<SynonymKind, Vec<String>>,
    pub obsolete: Option<bool>,
    pub parents: ExpansionState,
    pub children: ExpansionState,
    pub metadata: ExpansionState,
}

impl NodeSnapshot {
    fn from_record(record: &TermRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            definition: record.definition.clone(),
            synonyms: record.synonyms.clone(),
            obsolete: record.obsolete,
            parents: record.parents,
            children: record.children,
            metadata: record.metadata,
        }
    }

    fn into_record(self) -> TermRecord {
        let mut record = TermRecord::new(self.id, self.name);
        record.definition = self.definition;
        record.synonyms = self.synonyms;
        record.obsolete = self.obsolete;
        record.parents = self.parents;
        record.children = self.children;
        record.metadata = self.metadata;
        record
    }
}

/// Self-describing snapshot of one term's graph.
///
/// `term_id` names the handle the snapshot was taken from (for cache blobs,
/// the focused root term). Nodes are sorted by id and edges grouped by
/// parent, so identical graphs encode to identical bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    pub term_id: String,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<(String, String)>,
}

impl GraphSnapshot {
    /// Snapshot the given term's entire owning graph.
    pub fn capture(term: &Term) -> GraphSnapshot {
        let graph = term.graph();
        let graph = graph.borrow();

        let mut nodes: Vec<NodeSnapshot> =
            graph.records().map(NodeSnapshot::from_record).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges = Vec::new();
        for node in &nodes {
            let record = graph.find(&node.id).expect("record listed in snapshot");
            for child in &record.child_ids {
                edges.push((node.id.clone(), child.clone()));
            }
        }

        GraphSnapshot {
            version: SNAPSHOT_VERSION,
            term_id: term.id().to_owned(),
            nodes,
            edges,
        }
    }

    /// Encode to the binary blob form.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Codec {
            message: e.to_string(),
        })
    }

    /// Decode from the binary blob form, rejecting unknown versions.
    pub fn decode(bytes: &[u8]) -> Result<GraphSnapshot, SnapshotError> {
        let snapshot: GraphSnapshot =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::Codec {
                message: e.to_string(),
            })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Rebuild a standalone graph and return the handle for `term_id`.
    pub fn hydrate(&self, remote: Rc<dyn RemoteSource>) -> Result<Term, GraphError> {
        let mut graph = Graph::new(remote);
        for node in &self.nodes {
            graph.add_record(node.clone().into_record());
        }
        for (parent, child) in &self.edges {
            graph.add_relationship(parent, child)?;
        }
        if !graph.contains(&self.term_id) {
            return Err(GraphError::NodeNotFound {
                id: self.term_id.clone(),
            });
        }
        Ok(Term::from_graph(Rc::new(RefCell::new(graph)), &self.term_id))
    }

    /// All ids reachable downward from `term_id`, each listed once.
    ///
    /// The cache indexes a blob under these ids (plus `term_id` itself) so
    /// that any term inside a cached subgraph is a hit, not only its root.
    pub fn descendant_ids(&self) -> Vec<String> {
        let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
        for (parent, child) in &self.edges {
            children_of.entry(parent).or_default().push(child);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(&self.term_id);
        seen.insert(&self.term_id);

        let mut out = Vec::new();
        while let Some(id) = queue.pop_front() {
            for &child in children_of.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                if seen.insert(child) {
                    out.push(child.to_owned());
                    queue.push_back(child);
                }
            }
        }
        out
    }
}
