// src/merge/resolver.rs

use std::collections::HashMap;
use tracing::debug;

use crate::models::{GeneRecord, GeneTable, Genome};

/// Lookup from feature id or alias value to the owning feature id.
///
/// Built in feature-list order and never overwritten, so when two features
/// share an alias the earlier feature owns it.
pub struct FeatureIndex<'g> {
    owners: HashMap<&'g str, &'g str>,
}

impl<'g> FeatureIndex<'g> {
    pub fn new(genome: &'g Genome) -> Self {
        let mut owners: HashMap<&'g str, &'g str> = HashMap::new();
        for feature in &genome.features {
            let id = feature.id.as_str();
            owners.entry(id).or_insert(id);
            for alias in &feature.aliases {
                owners.entry(alias.value()).or_insert(id);
            }
        }
        debug!(
            "Feature index: {} features, {} lookup keys",
            genome.features.len(),
            owners.len()
        );
        Self { owners }
    }

    pub fn lookup(&self, identifier: &str) -> Option<&'g str> {
        self.owners.get(identifier).copied()
    }
}

/// Returns `gene` with `resolved_feature_id` set to the first feature (in list
/// order) whose id or alias equals the uploaded identifier.
pub fn resolve_gene(mut gene: GeneRecord, index: &FeatureIndex<'_>) -> GeneRecord {
    gene.resolved_feature_id = index.lookup(&gene.id).map(str::to_string);
    gene
}

pub fn resolve_genes(genes: GeneTable, genome: &Genome) -> GeneTable {
    let index = FeatureIndex::new(genome);
    genes.map_records(|gene| resolve_gene(gene, &index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn genome() -> Genome {
        serde_json::from_value(json!({
            "features": [
                {"id": "gene1", "aliases": [["old_locus_tag", "g1"], ["gene", "shared"]]},
                {"id": "gene2", "aliases": [["gene", "shared"], ["old_locus_tag", "gene1_alt"]]},
                {"id": "gene3"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn direct_id_and_alias_both_resolve() {
        let genome = genome();
        let index = FeatureIndex::new(&genome);

        let direct = resolve_gene(GeneRecord::new("gene3"), &index);
        assert_eq!(direct.resolved_feature_id.as_deref(), Some("gene3"));
        assert!(direct.is_identifier_valid());

        let alias = resolve_gene(GeneRecord::new("g1"), &index);
        assert_eq!(alias.resolved_feature_id.as_deref(), Some("gene1"));
    }

    #[test]
    fn shared_alias_goes_to_first_feature_every_time() {
        let genome = genome();
        for _ in 0..5 {
            let index = FeatureIndex::new(&genome);
            let gene = resolve_gene(GeneRecord::new("shared"), &index);
            assert_eq!(gene.resolved_feature_id.as_deref(), Some("gene1"));
        }
    }

    #[test]
    fn unknown_identifier_stays_unresolved() {
        let genome = genome();
        let mut genes = GeneTable::new();
        genes.entry("nope").add_term("GO:1");
        genes.entry("g1").add_term("GO:1");

        let genes = resolve_genes(genes, &genome);
        let missing = genes.get("nope").unwrap();
        assert_eq!(missing.resolved_feature_id, None);
        assert!(!missing.is_identifier_valid());
        assert!(genes.get("g1").unwrap().is_identifier_valid());
    }
}
