//! Rich diagnostic error types for the ontolook crate.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the ontolook crate.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum OntoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup(#[from] LookupError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("term not present in graph: {id}")]
    #[diagnostic(
        code(ontolook::graph::node_not_found),
        help(
            "The graph holds no record for this term id. Add the node with \
             `Graph::add_node` before adding relationships, or check that the \
             id was not removed by a focus operation."
        )
    )]
    NodeNotFound { id: String },

    #[error("cannot merge: root terms differ ({target_root} != {donor_root})")]
    #[diagnostic(
        code(ontolook::graph::roots_differ),
        help(
            "Two ontology fragments can only be merged when they descend from \
             the same root term. Fetch both terms from the same ontology, or \
             focus them onto a shared root first."
        )
    )]
    RootsDiffer {
        target_root: String,
        donor_root: String,
    },
}

// ---------------------------------------------------------------------------
// Remote source errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RemoteError {
    #[error("remote transport failure: {message}")]
    #[diagnostic(
        code(ontolook::remote::transport),
        help(
            "The remote ontology source could not be reached or returned a \
             protocol-level failure. Retry/backoff is the transport adapter's \
             concern; the graph core never retries."
        )
    )]
    Transport { message: String },

    #[error("malformed remote response for {id}: {message}")]
    #[diagnostic(
        code(ontolook::remote::protocol),
        help(
            "The remote answered but the payload could not be interpreted. \
             Check that the adapter targets a compatible service version."
        )
    )]
    Protocol { id: String, message: String },
}

// ---------------------------------------------------------------------------
// Cache errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CacheError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(ontolook::cache::io),
        help(
            "A filesystem operation failed. Check that the cache directory \
             exists, has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode graph snapshot for {id}: {message}")]
    #[diagnostic(
        code(ontolook::cache::encode),
        help("The focused subgraph could not be serialized to a cache blob.")
    )]
    Encode { id: String, message: String },

    #[error("failed to read or write the cache catalogue: {message}")]
    #[diagnostic(
        code(ontolook::cache::catalogue),
        help(
            "The catalogue file (catalogue.toml) could not be parsed or \
             persisted. If it was edited by hand, restore it or delete it and \
             re-populate the cache."
        )
    )]
    Catalogue { message: String },

    #[error("'{ontology}' is not an ontology known to the remote source")]
    #[diagnostic(
        code(ontolook::cache::unknown_ontology),
        help("List valid short names with `Lookup::ontologies()`.")
    )]
    UnknownOntology { ontology: String },

    #[error("'{ontology}' is not part of the cache")]
    #[diagnostic(
        code(ontolook::cache::not_cached),
        help("List currently cached ontologies with `cached_ontologies()`.")
    )]
    NotCached { ontology: String },

    #[error("no cache directory was configured")]
    #[diagnostic(
        code(ontolook::cache::not_configured),
        help("Construct the lookup with `Lookup::with_cache(remote, dir)` to enable caching.")
    )]
    NotConfigured,
}

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LookupError {
    #[error("ontology term not found: {id}")]
    #[diagnostic(
        code(ontolook::lookup::term_not_found),
        help(
            "Neither the cache nor the remote source could resolve this id. \
             Term ids are namespaced per ontology (e.g. \"GO:0008150\"); \
             check the prefix and the numeric part."
        )
    )]
    TermNotFound { id: String },
}

/// Convenience alias for functions returning ontolook results.
pub type OntoResult<T> = std::result::Result<T, OntoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_converts_to_onto_error() {
        let err = GraphError::RootsDiffer {
            target_root: "EMAP:0".into(),
            donor_root: "GO:0008150".into(),
        };
        let onto: OntoError = err.into();
        assert!(matches!(
            onto,
            OntoError::Graph(GraphError::RootsDiffer { .. })
        ));
    }

    #[test]
    fn cache_error_converts_to_onto_error() {
        let err = CacheError::NotCached {
            ontology: "EMAP".into(),
        };
        let onto: OntoError = err.into();
        assert!(matches!(onto, OntoError::Cache(CacheError::NotCached { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = GraphError::RootsDiffer {
            target_root: "EMAP:0".into(),
            donor_root: "GO:0008150".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("EMAP:0"));
        assert!(msg.contains("GO:0008150"));

        let err = LookupError::TermNotFound {
            id: "MP:WIBBLE".into(),
        };
        assert!(format!("{err}").contains("MP:WIBBLE"));
    }
}
