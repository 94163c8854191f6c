//! # ontolook
//!
//! A navigable, locally-cacheable view of a remote ontology: a directed
//! acyclic, poly-hierarchical graph of terms fetched lazily from a remote
//! source and optionally persisted to disk so repeated lookups avoid
//! network calls.
//!
//! ## Architecture
//!
//! - **Graph engine** (`graph`): id-indexed arena of term records with lazy
//!   parent/child expansion, focus/prune, and subgraph merge
//! - **Snapshots** (`graph::snapshot`): versioned binary schema for one
//!   focused subgraph
//! - **Cache** (`cache`): directory of snapshot blobs plus a TOML catalogue
//! - **Remote contract** (`remote`): the `RemoteSource` trait and a canned
//!   replay implementation for offline use
//! - **Façade** (`lookup`): cache-first term resolution and cache management
//!
//! ## Library usage
//!
//! ```no_run
//! use std::rc::Rc;
//! use ontolook::lookup::Lookup;
//! use ontolook::remote::replay::ReplayRemote;
//!
//! let recording = std::fs::read_to_string("emap.json").unwrap();
//! let remote = Rc::new(ReplayRemote::from_json(&recording).unwrap());
//!
//! let mut lookup = Lookup::with_cache(remote, "./ontology-cache").unwrap();
//! lookup.add_ontology_to_cache("EMAP").unwrap();
//!
//! let term = lookup.find_by_id("EMAP:3018").unwrap();
//! println!("{term}");
//! for parent in term.parents().unwrap() {
//!     println!("  is-a {parent}");
//! }
//! ```

pub mod cache;
pub mod error;
pub mod graph;
pub mod lookup;
pub mod remote;

pub use cache::FileCache;
pub use error::{OntoError, OntoResult};
pub use graph::{Graph, Term};
pub use lookup::Lookup;
pub use remote::{RemoteSource, TermStub};
