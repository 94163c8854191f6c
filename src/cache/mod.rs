//! On-disk subgraph cache.
//!
//! A cache directory holds one serialized, focused subgraph per cached root
//! term (a "blob", see [`GraphSnapshot`]) plus `catalogue.toml`, which maps
//! each ontology short name to its blob files and the date it was cached.
//!
//! On open, every listed blob is hydrated and indexed under its root id and
//! every descendant id, so any term inside a cached subgraph is a cache hit.
//! A blob that fails to load is skipped with a warning rather than failing
//! the whole cache. Writes are best
//! effort: there is no multi-file transaction, and a crash mid-population
//! can leave blobs and catalogue inconsistent until the next population run.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, OntoResult};
use crate::graph::Term;
use crate::graph::snapshot::GraphSnapshot;
use crate::remote::RemoteSource;

/// Name of the catalogue file inside the cache directory.
pub const CATALOGUE_FILE: &str = "catalogue.toml";

/// Catalogue entry for one cached ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    /// Blob filenames, one per cached root term.
    pub blobs: Vec<String>,
    /// Date the ontology was last cached.
    pub cached_on: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Catalogue {
    #[serde(default)]
    ontologies: BTreeMap<String, CatalogueEntry>,
}

/// Blob filename for a root term id: the id with `:` stripped, plus `.graph`
/// (`"EMAP:0"` → `"EMAP0.graph"`).
pub fn blob_filename(term_id: &str) -> String {
    format!("{}.graph", term_id.replace(':', ""))
}

/// Persistent store of focused subgraphs, keyed by ontology and by term id.
pub struct FileCache {
    directory: PathBuf,
    remote: Rc<dyn RemoteSource>,
    catalogue: Catalogue,
    /// Term id → blob filename, covering roots and descendants.
    index: HashMap<String, String>,
    /// Blob filename → hydrated root term (one shared graph per blob).
    hydrated: HashMap<String, Term>,
}

impl FileCache {
    /// Open (creating if needed) a cache directory and hydrate its contents.
    pub fn open(directory: impl Into<PathBuf>, remote: Rc<dyn RemoteSource>) -> OntoResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| CacheError::Io {
            path: directory.display().to_string(),
            source: e,
        })?;

        let mut cache = Self {
            directory,
            remote,
            catalogue: Catalogue::default(),
            index: HashMap::new(),
            hydrated: HashMap::new(),
        };
        cache.prepare()?;
        Ok(cache)
    }

    /// The cache directory on disk.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Re-read the catalogue and rebuild the full id index from every listed
    /// blob. There is no incremental indexing; this is always a full scan.
    fn prepare(&mut self) -> OntoResult<()> {
        self.catalogue = self.load_catalogue()?;
        self.index.clear();
        self.hydrated.clear();

        for (ontology, entry) in &self.catalogue.ontologies {
            for blob in &entry.blobs {
                let path = self.directory.join(blob);
                let bytes = match fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%ontology, %blob, error = %e, "skipping unreadable cache blob");
                        continue;
                    }
                };
                let snapshot = match GraphSnapshot::decode(&bytes) {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!(%ontology, %blob, error = %e, "skipping undecodable cache blob");
                        continue;
                    }
                };
                let root = match snapshot.hydrate(Rc::clone(&self.remote)) {
                    Ok(root) => root,
                    Err(e) => {
                        tracing::warn!(%ontology, %blob, error = %e, "skipping inconsistent cache blob");
                        continue;
                    }
                };

                self.index.insert(snapshot.term_id.clone(), blob.clone());
                for id in snapshot.descendant_ids() {
                    self.index.insert(id, blob.clone());
                }
                self.hydrated.insert(blob.clone(), root);
            }
        }
        Ok(())
    }

    fn catalogue_path(&self) -> PathBuf {
        self.directory.join(CATALOGUE_FILE)
    }

    fn load_catalogue(&self) -> OntoResult<Catalogue> {
        let path = self.catalogue_path();
        if !path.exists() {
            return Ok(Catalogue::default());
        }
        let text = fs::read_to_string(&path).map_err(|e| CacheError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let catalogue = toml::from_str(&text).map_err(|e| CacheError::Catalogue {
            message: e.to_string(),
        })?;
        Ok(catalogue)
    }

    fn persist_catalogue(&self) -> OntoResult<()> {
        let text = toml::to_string_pretty(&self.catalogue).map_err(|e| CacheError::Catalogue {
            message: e.to_string(),
        })?;
        let path = self.catalogue_path();
        fs::write(&path, text).map_err(|e| CacheError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// Pull a term out of the cache. `None` when no cached blob covers the
    /// id, in which case the caller falls through to the remote source.
    ///
    /// Handles returned for the same blob share one hydrated graph; take a
    /// `structural_copy` before shaping if the cached copy must stay intact.
    pub fn find_by_id(&self, term_id: &str) -> Option<Term> {
        let blob = self.index.get(term_id)?;
        let root = self.hydrated.get(blob)?;
        Some(Term::from_graph(root.graph(), term_id))
    }

    /// Short names of the currently cached ontologies.
    pub fn cached_ontologies(&self) -> Vec<String> {
        self.catalogue.ontologies.keys().cloned().collect()
    }

    /// Cached root terms of an ontology; empty when it is not cached.
    pub fn root_terms(&self, ontology: &str) -> Vec<Term> {
        let Some(entry) = self.catalogue.ontologies.get(ontology) else {
            return Vec::new();
        };
        entry
            .blobs
            .iter()
            .filter_map(|blob| self.hydrated.get(blob).cloned())
            .collect()
    }

    /// Fetch an ontology's root terms fresh from the remote, focus each one
    /// (bounding and locking its subgraph), and persist them as blobs.
    ///
    /// The catalogue entry is rewritten to exactly the new blob set; blobs no
    /// longer produced are deleted best-effort. Fails when `ontology` is not
    /// a short name known to the remote source.
    pub fn add_ontology_to_cache(&mut self, ontology: &str) -> OntoResult<()> {
        let known = self.remote.list_ontologies()?;
        if !known.contains_key(ontology) {
            return Err(CacheError::UnknownOntology {
                ontology: ontology.to_owned(),
            }
            .into());
        }

        let mut new_blobs = Vec::new();
        for stub in self.remote.root_terms(ontology)? {
            let root = Term::new(Rc::clone(&self.remote), &stub.id, &stub.name);
            root.focus()?;

            let snapshot = GraphSnapshot::capture(&root);
            let bytes = snapshot.encode().map_err(|e| CacheError::Encode {
                id: stub.id.clone(),
                message: e.to_string(),
            })?;

            let blob = blob_filename(&stub.id);
            let path = self.directory.join(&blob);
            fs::write(&path, bytes).map_err(|e| CacheError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            if !new_blobs.contains(&blob) {
                new_blobs.push(blob);
            }
        }

        if let Some(previous) = self.catalogue.ontologies.get(ontology) {
            for stale in previous.blobs.iter().filter(|b| !new_blobs.contains(b)) {
                let _ = fs::remove_file(self.directory.join(stale));
            }
        }

        tracing::info!(%ontology, blobs = new_blobs.len(), "cached ontology");
        self.catalogue.ontologies.insert(
            ontology.to_owned(),
            CatalogueEntry {
                blobs: new_blobs,
                cached_on: chrono::Local::now().date_naive(),
            },
        );
        self.persist_catalogue()?;
        self.prepare()
    }

    /// Delete an ontology's blobs and catalogue entry. Fails when the
    /// ontology was never cached.
    pub fn remove_ontology_from_cache(&mut self, ontology: &str) -> OntoResult<()> {
        let entry = self.catalogue.ontologies.remove(ontology).ok_or_else(|| {
            CacheError::NotCached {
                ontology: ontology.to_owned(),
            }
        })?;

        for blob in &entry.blobs {
            let path = self.directory.join(blob);
            fs::remove_file(&path).map_err(|e| CacheError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        }

        tracing::info!(%ontology, "removed ontology from cache");
        self.persist_catalogue()?;
        self.prepare()
    }
}

impl std::fmt::Debug for FileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCache")
            .field("directory", &self.directory)
            .field("ontologies", &self.cached_ontologies())
            .field("indexed_terms", &self.index.len())
            .finish()
    }
}
