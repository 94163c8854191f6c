//! Canned [`RemoteSource`] backed by recorded responses.
//!
//! `ReplayRemote` plays back a fixed set of ontology answers, the way the
//! original service would, without touching the network. Fixtures can be
//! built programmatically or loaded from a JSON recording, and every call is
//! counted so tests can assert that the expansion guards really prevent
//! repeat fetches.

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{RemoteError, RemoteResult, RemoteSource, TermStub};

/// One recorded term: its name, adjacency, and metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedTerm {
    pub name: String,
    #[serde(default)]
    pub parents: Vec<TermStub>,
    #[serde(default)]
    pub children: Vec<TermStub>,
    #[serde(default)]
    pub metadata: Vec<(String, String)>,
    #[serde(default)]
    pub obsolete: bool,
}

/// A replayable remote source.
///
/// Unknown ids follow the live service's echo convention: `term_name` returns
/// the query id unchanged, and the adjacency/metadata queries answer empty.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReplayRemote {
    #[serde(default)]
    version: String,
    #[serde(default)]
    ontologies: BTreeMap<String, String>,
    /// Ontology short name → root term stubs.
    #[serde(default)]
    roots: BTreeMap<String, Vec<TermStub>>,
    #[serde(default)]
    terms: BTreeMap<String, RecordedTerm>,
    /// Per-call counters, keyed `"<method>/<id>"`. Not part of the recording.
    #[serde(skip)]
    calls: RefCell<BTreeMap<String, usize>>,
    /// Injected transport failures by method name. Not part of the recording.
    #[serde(skip)]
    failures: BTreeMap<String, String>,
}

impl ReplayRemote {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Load a recording from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the recording to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Register an ontology short/full name pair.
    pub fn add_ontology(&mut self, short: impl Into<String>, full: impl Into<String>) {
        self.ontologies.insert(short.into(), full.into());
    }

    /// Record a term with no adjacency yet.
    pub fn add_term(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let id = id.into();
        self.terms.entry(id).or_default().name = name.into();
    }

    /// Record a parent/child edge between two already-recorded terms.
    ///
    /// Panics if either endpoint is unknown; fixtures are built up-front and
    /// a dangling edge is a bug in the fixture, not a runtime condition.
    pub fn add_edge(&mut self, parent_id: &str, child_id: &str) {
        let parent_name = self.terms[parent_id].name.clone();
        let child_name = self.terms[child_id].name.clone();
        self.terms
            .get_mut(parent_id)
            .expect("parent recorded")
            .children
            .push(TermStub::new(child_id, child_name));
        self.terms
            .get_mut(child_id)
            .expect("child recorded")
            .parents
            .push(TermStub::new(parent_id, parent_name));
    }

    /// Mark a recorded term as a root of the given ontology.
    ///
    /// Panics if the id is unknown, under the same fixture contract as
    /// [`Self::add_edge`].
    pub fn add_root(&mut self, ontology: &str, id: &str) {
        let name = self.terms[id].name.clone();
        self.roots
            .entry(ontology.to_owned())
            .or_default()
            .push(TermStub::new(id, name));
    }

    /// Attach raw metadata pairs to a recorded term.
    pub fn set_metadata(&mut self, id: &str, entries: Vec<(String, String)>) {
        self.terms.entry(id.to_owned()).or_default().metadata = entries;
    }

    /// Flag a recorded term as obsolete.
    pub fn set_obsolete(&mut self, id: &str, obsolete: bool) {
        self.terms.entry(id.to_owned()).or_default().obsolete = obsolete;
    }

    /// Make every later call to `method` fail with a transport error.
    ///
    /// The call is still counted before it fails, so tests can assert how
    /// often the core hit the broken method.
    pub fn fail_with(&mut self, method: &str, message: &str) {
        self.failures.insert(method.to_owned(), message.to_owned());
    }

    fn injected(&self, method: &str) -> RemoteResult<()> {
        match self.failures.get(method) {
            Some(message) => Err(RemoteError::Transport {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    /// How many times `method` was invoked for `id`.
    pub fn calls_for(&self, method: &str, id: &str) -> usize {
        *self
            .calls
            .borrow()
            .get(&format!("{method}/{id}"))
            .unwrap_or(&0)
    }

    /// How many times `method` was invoked across all ids.
    pub fn calls_to(&self, method: &str) -> usize {
        let prefix = format!("{method}/");
        self.calls
            .borrow()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, n)| n)
            .sum()
    }

    fn note(&self, method: &str, id: &str) {
        *self
            .calls
            .borrow_mut()
            .entry(format!("{method}/{id}"))
            .or_insert(0) += 1;
    }
}

impl RemoteSource for ReplayRemote {
    fn list_ontologies(&self) -> RemoteResult<BTreeMap<String, String>> {
        self.note("list_ontologies", "");
        self.injected("list_ontologies")?;
        Ok(self.ontologies.clone())
    }

    fn root_terms(&self, ontology: &str) -> RemoteResult<Vec<TermStub>> {
        self.note("root_terms", ontology);
        self.injected("root_terms")?;
        Ok(self.roots.get(ontology).cloned().unwrap_or_default())
    }

    fn term_name(&self, id: &str) -> RemoteResult<String> {
        self.note("term_name", id);
        self.injected("term_name")?;
        Ok(self
            .terms
            .get(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_owned()))
    }

    fn term_parents(&self, id: &str) -> RemoteResult<Vec<TermStub>> {
        self.note("term_parents", id);
        self.injected("term_parents")?;
        Ok(self
            .terms
            .get(id)
            .map(|t| t.parents.clone())
            .unwrap_or_default())
    }

    fn term_children(
        &self,
        id: &str,
        _distance: u32,
        _relation_kinds: &[u32],
    ) -> RemoteResult<Vec<TermStub>> {
        self.note("term_children", id);
        self.injected("term_children")?;
        Ok(self
            .terms
            .get(id)
            .map(|t| t.children.clone())
            .unwrap_or_default())
    }

    fn term_metadata(&self, id: &str) -> RemoteResult<Vec<(String, String)>> {
        self.note("term_metadata", id);
        self.injected("term_metadata")?;
        Ok(self
            .terms
            .get(id)
            .map(|t| t.metadata.clone())
            .unwrap_or_default())
    }

    fn is_obsolete(&self, id: &str) -> RemoteResult<bool> {
        self.note("is_obsolete", id);
        self.injected("is_obsolete")?;
        Ok(self.terms.get(id).map(|t| t.obsolete).unwrap_or(false))
    }

    fn version(&self) -> RemoteResult<String> {
        self.note("version", "");
        self.injected("version")?;
        Ok(self.version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_remote() -> ReplayRemote {
        let mut remote = ReplayRemote::new("1.4");
        remote.add_ontology("EMAP", "Mouse gross anatomy and development");
        remote.add_term("EMAP:0", "Mouse_anatomy_by_time_xproduct");
        remote.add_term("EMAP:1", "TS01,embryo");
        remote.add_edge("EMAP:0", "EMAP:1");
        remote.add_root("EMAP", "EMAP:0");
        remote
    }

    #[test]
    fn known_terms_resolve() {
        let remote = tiny_remote();
        assert_eq!(remote.term_name("EMAP:1").unwrap(), "TS01,embryo");
        assert_eq!(remote.term_parents("EMAP:1").unwrap()[0].id, "EMAP:0");
        assert_eq!(
            remote.term_children("EMAP:0", 1, &super::super::ALL_RELATION_KINDS).unwrap()[0].id,
            "EMAP:1"
        );
        assert_eq!(remote.root_terms("EMAP").unwrap().len(), 1);
    }

    #[test]
    fn unknown_id_is_echoed() {
        let remote = tiny_remote();
        assert_eq!(remote.term_name("MP:WIBBLE").unwrap(), "MP:WIBBLE");
        assert!(remote.term_parents("MP:WIBBLE").unwrap().is_empty());
        assert!(!remote.is_obsolete("MP:WIBBLE").unwrap());
    }

    #[test]
    fn calls_are_counted() {
        let remote = tiny_remote();
        remote.term_parents("EMAP:1").unwrap();
        remote.term_parents("EMAP:1").unwrap();
        remote.term_parents("EMAP:0").unwrap();
        assert_eq!(remote.calls_for("term_parents", "EMAP:1"), 2);
        assert_eq!(remote.calls_to("term_parents"), 3);
        assert_eq!(remote.calls_to("term_children"), 0);
    }

    #[test]
    fn injected_failures_replace_the_answer() {
        let mut remote = tiny_remote();
        remote.fail_with("term_children", "connection reset by peer");

        // Other methods keep answering.
        assert_eq!(remote.term_name("EMAP:0").unwrap(), "Mouse_anatomy_by_time_xproduct");

        let err = remote
            .term_children("EMAP:0", 1, &super::super::ALL_RELATION_KINDS)
            .unwrap_err();
        assert!(matches!(err, RemoteError::Transport { ref message } if message == "connection reset by peer"));
        // The failed call was still counted.
        assert_eq!(remote.calls_for("term_children", "EMAP:0"), 1);
    }

    #[test]
    #[should_panic]
    fn add_root_requires_a_recorded_term() {
        let mut remote = ReplayRemote::new("test");
        remote.add_root("EMAP", "EMAP:0");
    }

    #[test]
    fn json_round_trip() {
        let remote = tiny_remote();
        let json = remote.to_json().unwrap();
        let reloaded = ReplayRemote::from_json(&json).unwrap();
        assert_eq!(reloaded.version().unwrap(), "1.4");
        assert_eq!(reloaded.term_name("EMAP:1").unwrap(), "TS01,embryo");
        assert_eq!(reloaded.root_terms("EMAP").unwrap().len(), 1);
        // Counters are transient, not part of the recording.
        assert_eq!(reloaded.calls_to("term_name"), 1);
    }
}
