// src/data_handling/genome_store.rs

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

use crate::models::Genome;

/// Reads a genome from JSON. Accepts either the bare genome object or the
/// genome-API envelope `{"genomes": [{"data": {...}}]}`.
pub fn load_genome(path: &Path) -> Result<Genome> {
    info!("Reading genome from {}", path.display());
    let file = File::open(path).with_context(|| format!("opening genome {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing genome {}", path.display()))?;
    let genome = genome_from_value(value).with_context(|| format!("decoding genome {}", path.display()))?;
    debug!(
        "Genome has {} features, {} ontology events",
        genome.features.len(),
        genome.ontology_events.as_ref().map_or(0, Vec::len)
    );
    Ok(genome)
}

pub fn genome_from_value(mut value: Value) -> Result<Genome> {
    if let Some(genomes) = value.get_mut("genomes") {
        let data = genomes
            .get_mut(0)
            .and_then(|entry| entry.get_mut("data"))
            .ok_or_else(|| anyhow!("`genomes` envelope has no `data` in its first entry"))?
            .take();
        return Ok(serde_json::from_value(data)?);
    }
    Ok(serde_json::from_value(value)?)
}

pub fn save_genome(genome: &Genome, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), genome)
        .with_context(|| format!("writing genome to {}", path.display()))?;
    info!("Wrote genome to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_and_bare_genome_both_load() {
        let bare = json!({"features": [{"id": "gene1"}]});
        let wrapped = json!({"genomes": [{"data": bare.clone(), "info": []}]});
        assert_eq!(genome_from_value(bare).unwrap().features[0].id, "gene1");
        assert_eq!(genome_from_value(wrapped).unwrap().features[0].id, "gene1");
    }

    #[test]
    fn empty_envelope_is_an_error() {
        assert!(genome_from_value(json!({"genomes": []})).is_err());
    }

    #[test]
    fn saved_genome_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.json");
        let genome = genome_from_value(json!({
            "id": "G",
            "features": [{"id": "gene1", "aliases": [["locus", "g1"]]}]
        }))
        .unwrap();

        save_genome(&genome, &path).unwrap();
        assert_eq!(load_genome(&path).unwrap(), genome);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_genome(Path::new("/nonexistent/genome.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/genome.json"));
    }
}
