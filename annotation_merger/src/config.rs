// src/config.rs

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::helper_functions::project_root;
use crate::models::Namespace;

/// Ontology dictionary file per namespace, relative to the data dir.
pub const DEFAULT_ONTOLOGY_LOOKUP: &[(&str, &str)] = &[
    ("EC", "EC_ontologyDictionary.json"),
    ("GO", "GO_ontologyDictionary.json"),
    ("KO", "KEGG_KO_ontologyDictionary.json"),
    ("RO", "KEGG_RXN_ontologyDictionary.json"),
    ("META", "MetaCyc_RXN_ontologyDictionary.json"),
    ("MSRXN", "ModelSEED_RXN_ontologyDictionary.json"),
    ("SSO", "SSO_ontologyDictionary.json"),
];

pub const METHOD_SINGLE: &str = "Merge Annotations";
pub const METHOD_BULK: &str = "Bulk Merge Annotations";

pub fn method_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub staging_dir: PathBuf,
    /// Read annotation files from `<project_root>/test/test_data` instead of the staging dir.
    pub debug: bool,
    pub ontology_lookup: BTreeMap<String, String>,
}

impl MergeConfig {
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            data_dir: project_root.join("data"),
            staging_dir: project_root.join("staging"),
            project_root,
            debug: false,
            ontology_lookup: DEFAULT_ONTOLOGY_LOOKUP
                .iter()
                .map(|(ns, file)| (ns.to_string(), file.to_string()))
                .collect(),
        }
    }

    /// `PROJECT_ROOT`, `ONTOLOGY_DATA_DIR` and `STAGING_DIR` override the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new(project_root());
        if let Some(dir) = env::var_os("ONTOLOGY_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env::var_os("STAGING_DIR") {
            config.staging_dir = PathBuf::from(dir);
        }
        debug!("Config from env: {:?}", config);
        config
    }

    /// Merges a JSON object `{namespace: file_name}` over the lookup table.
    pub fn load_ontology_lookup(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading ontology lookup {}", path.display()))?;
        let overrides: BTreeMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing ontology lookup {}", path.display()))?;
        info!("Loaded {} ontology lookup overrides from {}", overrides.len(), path.display());
        for (ns, file) in overrides {
            self.ontology_lookup.insert(Namespace::new(&ns).as_str().to_string(), file);
        }
        Ok(())
    }

    pub fn annotation_path(&self, file_name: &str) -> PathBuf {
        if self.debug {
            self.project_root.join("test").join("test_data").join(file_name)
        } else {
            self.staging_dir.join(file_name)
        }
    }

    pub fn ontology_path(&self, ns: &Namespace) -> Result<PathBuf> {
        self.ontology_lookup
            .get(ns.as_str())
            .map(|file| self.data_dir.join(file))
            .ok_or_else(|| {
                anyhow!(
                    "no ontology dictionary configured for {} (known: {})",
                    ns,
                    self.ontology_lookup.keys().cloned().collect::<Vec<_>>().join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn debug_switches_annotation_dir() {
        let mut config = MergeConfig::new(PathBuf::from("/proj"));
        assert_eq!(config.annotation_path("a.tsv"), PathBuf::from("/proj/staging/a.tsv"));
        config.debug = true;
        assert_eq!(
            config.annotation_path("a.tsv"),
            PathBuf::from("/proj/test/test_data/a.tsv")
        );
    }

    #[test]
    fn ontology_path_is_case_insensitive_and_unknown_is_error() {
        let config = MergeConfig::new(PathBuf::from("/proj"));
        assert_eq!(
            config.ontology_path(&Namespace::new("go")).unwrap(),
            PathBuf::from("/proj/data/GO_ontologyDictionary.json")
        );
        assert!(config.ontology_path(&Namespace::new("PFAM")).is_err());
    }

    #[test]
    fn lookup_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"go": "go_custom.json", "pfam": "pfam.json"}}"#).unwrap();

        let mut config = MergeConfig::new(PathBuf::from("/proj"));
        config.load_ontology_lookup(file.path()).unwrap();
        assert_eq!(config.ontology_lookup["GO"], "go_custom.json");
        assert_eq!(config.ontology_lookup["PFAM"], "pfam.json");
        assert_eq!(config.ontology_lookup["EC"], "EC_ontologyDictionary.json");
    }
}
