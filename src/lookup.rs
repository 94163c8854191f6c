//! Coordinating façade over the remote source and the optional cache.
//!
//! `Lookup` is the explicit context object callers construct once at their
//! entry point: it owns the remote handle and, optionally, a [`FileCache`].
//! Term resolution asks the cache first and falls through to the remote;
//! cache population and removal are delegated to the cache and fail when no
//! cache was configured.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::cache::FileCache;
use crate::error::{CacheError, LookupError, OntoResult};
use crate::graph::Term;
use crate::remote::RemoteSource;

/// Entry-point façade: find terms by id, list ontologies and roots, manage
/// the cache.
pub struct Lookup {
    remote: Rc<dyn RemoteSource>,
    cache: Option<FileCache>,
}

impl Lookup {
    /// A lookup without a cache; every resolution goes to the remote.
    pub fn new(remote: Rc<dyn RemoteSource>) -> Self {
        Self {
            remote,
            cache: None,
        }
    }

    /// A lookup backed by an on-disk cache at `directory` (created and
    /// hydrated on construction).
    pub fn with_cache(
        remote: Rc<dyn RemoteSource>,
        directory: impl Into<PathBuf>,
    ) -> OntoResult<Self> {
        let cache = FileCache::open(directory, Rc::clone(&remote))?;
        Ok(Self {
            remote,
            cache: Some(cache),
        })
    }

    /// Resolve a term id, cache first, remote second.
    ///
    /// The remote signals "not found" by echoing the query id back unchanged
    /// in place of a resolved name; that echo surfaces as
    /// [`LookupError::TermNotFound`].
    ///
    /// Cache hits for the same blob share one hydrated graph for the whole
    /// session, so shaping a hit in place (`focus`, `remove_parents`,
    /// `remove_children`) is visible through every later hit. Use the
    /// copying variants (`focused`, `without_*`) to leave the cached graph
    /// intact.
    pub fn find_by_id(&self, term_id: &str) -> OntoResult<Term> {
        if let Some(cache) = &self.cache {
            if let Some(term) = cache.find_by_id(term_id) {
                tracing::debug!(id = %term_id, "term served from cache");
                return Ok(term);
            }
        }

        let name = self.remote.term_name(term_id)?;
        if name == term_id {
            return Err(LookupError::TermNotFound {
                id: term_id.to_owned(),
            }
            .into());
        }
        Ok(Term::new(Rc::clone(&self.remote), term_id, &name))
    }

    /// Root terms of an ontology; cached roots win, otherwise each fresh
    /// root gets its own single-node graph ready for lazy expansion.
    pub fn root_terms(&self, ontology: &str) -> OntoResult<Vec<Term>> {
        if let Some(cache) = &self.cache {
            let cached = cache.root_terms(ontology);
            if !cached.is_empty() {
                tracing::debug!(%ontology, roots = cached.len(), "root terms served from cache");
                return Ok(cached);
            }
        }

        Ok(self
            .remote
            .root_terms(ontology)?
            .into_iter()
            .map(|stub| Term::new(Rc::clone(&self.remote), &stub.id, &stub.name))
            .collect())
    }

    /// Map of ontology short names to full names.
    pub fn ontologies(&self) -> OntoResult<BTreeMap<String, String>> {
        Ok(self.remote.list_ontologies()?)
    }

    /// Version string reported by the remote service.
    pub fn version(&self) -> OntoResult<String> {
        Ok(self.remote.version()?)
    }

    /// The configured cache, if any.
    pub fn cache(&self) -> Option<&FileCache> {
        self.cache.as_ref()
    }

    /// Short names of the currently cached ontologies (empty without a cache).
    pub fn cached_ontologies(&self) -> Vec<String> {
        self.cache
            .as_ref()
            .map(FileCache::cached_ontologies)
            .unwrap_or_default()
    }

    /// Populate (or refresh) one ontology in the cache.
    pub fn add_ontology_to_cache(&mut self, ontology: &str) -> OntoResult<()> {
        self.cache
            .as_mut()
            .ok_or(CacheError::NotConfigured)?
            .add_ontology_to_cache(ontology)
    }

    /// Drop one ontology from the cache.
    pub fn remove_ontology_from_cache(&mut self, ontology: &str) -> OntoResult<()> {
        self.cache
            .as_mut()
            .ok_or(CacheError::NotConfigured)?
            .remove_ontology_from_cache(ontology)
    }
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lookup")
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
