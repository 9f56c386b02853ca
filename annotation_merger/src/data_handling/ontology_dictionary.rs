// src/data_handling/ontology_dictionary.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

use crate::config::MergeConfig;
use crate::models::{Namespace, OntologyDictionary};

#[derive(Debug, Deserialize)]
struct OntologyFile {
    /// Kept in file order so a later entry normalizing to the same id wins.
    term_hash: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct OntologyEntry {
    id: String,
    name: String,
}

/// Loads `{"term_hash": {key: {id, name}}}` into `NS:id -> name`, adding the
/// namespace prefix to ids that lack it.
pub fn read_ontology_dictionary(path: &Path, ns: &Namespace) -> Result<OntologyDictionary> {
    let file = File::open(path).with_context(|| format!("opening ontology dictionary {}", path.display()))?;
    let parsed: OntologyFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing ontology dictionary {}", path.display()))?;

    let mut entries = Vec::with_capacity(parsed.term_hash.len());
    for (key, value) in parsed.term_hash {
        let entry: OntologyEntry = serde_json::from_value(value)
            .with_context(|| format!("term `{}` in {}", key, path.display()))?;
        entries.push((ns.ensure_prefixed(&entry.id), entry.name));
    }
    let dictionary: OntologyDictionary = entries.into_iter().collect();
    if dictionary.is_empty() {
        warn!("{} has no terms; every {} term will be reported invalid", path.display(), ns);
    } else {
        info!("Loaded {} {} terms from {}", dictionary.len(), ns, path.display());
    }
    Ok(dictionary)
}

pub fn get_ontology_dict(config: &MergeConfig, ns: &Namespace) -> Result<OntologyDictionary> {
    let path = config.ontology_path(ns)?;
    read_ontology_dictionary(&path, ns)
}
