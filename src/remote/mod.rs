//! Contract for the remote ontology source.
//!
//! The graph core is transport-agnostic: everything it needs from the remote
//! service is expressed by the [`RemoteSource`] trait, one method per remote
//! query. A SOAP or REST adapter implements this trait out of tree; inside
//! the tree, [`replay::ReplayRemote`] serves canned responses for offline use
//! and tests.

pub mod replay;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Result type for remote source calls.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Relation kind codes understood by the remote children query.
///
/// The remote service distinguishes is-a, part-of and friends by numeric
/// code; term expansion always asks for all of them.
pub const ALL_RELATION_KINDS: [u32; 5] = [1, 2, 3, 4, 5];

/// An (id, name) pair as returned by the remote adjacency and root queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStub {
    pub id: String,
    pub name: String,
}

impl TermStub {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A remote ontology source, stateless per call.
///
/// Every method may fail with a transport error; the core propagates such
/// failures untouched and never retries. Name resolution (`term_name`)
/// follows the remote's echo convention: an unknown id comes back verbatim
/// as its own "name", and the caller treats that echo as not-found.
pub trait RemoteSource {
    /// Map of ontology short names to full names (e.g. `"GO"` → `"Gene Ontology"`).
    fn list_ontologies(&self) -> RemoteResult<BTreeMap<String, String>>;

    /// The root term(s) of the given ontology.
    fn root_terms(&self, ontology: &str) -> RemoteResult<Vec<TermStub>>;

    /// Resolve a term id to its display name.
    fn term_name(&self, id: &str) -> RemoteResult<String>;

    /// Direct parents of a term.
    fn term_parents(&self, id: &str) -> RemoteResult<Vec<TermStub>>;

    /// Children of a term within `distance` hops, limited to the given
    /// relation kinds.
    fn term_children(
        &self,
        id: &str,
        distance: u32,
        relation_kinds: &[u32],
    ) -> RemoteResult<Vec<TermStub>>;

    /// Raw metadata key/value pairs for a term. Keys include `"definition"`
    /// and `"<kind>_synonym"`.
    fn term_metadata(&self, id: &str) -> RemoteResult<Vec<(String, String)>>;

    /// Whether the term is flagged obsolete.
    fn is_obsolete(&self, id: &str) -> RemoteResult<bool>;

    /// Version string reported by the remote service.
    fn version(&self) -> RemoteResult<String>;
}
