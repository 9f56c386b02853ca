// src/merge/genome_merger.rs

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::models::{GeneRecord, GeneTable, Genome, Namespace, OntologiesPresent, OntologyEvent};

/// Counters from one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub features_touched: usize,
    pub terms_created: usize,
    pub events_appended: usize,
    pub names_added: usize,
}

/// Appends the provenance event for this run and returns its index, which is
/// the token every association created by the run points at.
pub fn add_ontology_event(
    genome: &mut Genome,
    ns: &Namespace,
    method: &str,
    method_version: &str,
    description: &str,
    timestamp: &str,
) -> usize {
    genome.ontologies_present.get_or_insert_with(OntologiesPresent::default);
    let events = genome.ontology_events.get_or_insert_with(Vec::new);
    events.push(OntologyEvent {
        id: ns.as_str().to_string(),
        method: method.to_string(),
        method_version: method_version.to_string(),
        description: description.to_string(),
        timestamp: timestamp.to_string(),
        extra: Default::default(),
    });
    let index = events.len() - 1;
    info!("Added ontology event {} ({}: {})", index, ns, description);
    index
}

/// Writes every valid term of every resolved gene into its feature's
/// `ontology_terms[ns]` and into `ontologies_present[ns]`, tagged with `event`.
///
/// Features are visited in genome order and genes in table order, so the
/// first gene to mention a term decides its display name. Missing
/// `ontology_terms` / `ontologies_present` maps are created on demand.
pub fn update_genome(genome: &mut Genome, ns: &Namespace, genes: &GeneTable, event: usize) -> MergeStats {
    let mut by_feature: HashMap<&str, Vec<&GeneRecord>> = HashMap::new();
    for gene in genes.iter().filter(|g| g.has_valid_annotations()) {
        if let Some(feature_id) = gene.resolved_feature_id.as_deref() {
            by_feature.entry(feature_id).or_default().push(gene);
        }
    }

    let mut stats = MergeStats::default();
    let present = genome.ontologies_present.get_or_insert_with(OntologiesPresent::default);

    for feature in genome.features.iter_mut() {
        let Some(matched) = by_feature.get(feature.id.as_str()) else {
            continue;
        };
        stats.features_touched += 1;

        let terms = feature.ontology_terms.get_or_insert_with(Default::default);
        terms.ensure_namespace(ns);

        for gene in matched {
            for check in gene.valid_checks() {
                if present.insert_first(ns, &check.term_id, &check.display_name) {
                    stats.names_added += 1;
                }
                let is_new = terms.events(ns, &check.term_id).is_none();
                if terms.append_event(ns, &check.term_id, event) {
                    if is_new {
                        stats.terms_created += 1;
                    } else {
                        stats.events_appended += 1;
                    }
                }
            }
        }
    }

    debug!("Merge stats for {} event {}: {:?}", ns, event, stats);
    stats
}
