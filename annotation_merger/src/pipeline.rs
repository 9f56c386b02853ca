// src/pipeline.rs

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{method_version, MergeConfig, METHOD_BULK, METHOD_SINGLE};
use crate::data_handling::annotation_files::{
    description_ontology_pairs, get_annotations_file, get_bulk_annotations_file, pair_annotations,
};
use crate::data_handling::genome_store::{load_genome, save_genome};
use crate::data_handling::ontology_dictionary::get_ontology_dict;
use crate::merge::genome_merger::{add_ontology_event, update_genome, MergeStats};
use crate::merge::ingest::annotations_to_genes;
use crate::merge::resolver::resolve_genes;
use crate::merge::summary::{summarize, MergeSummary};
use crate::merge::validator::validate_genes;
use crate::models::{GeneTable, Genome, Namespace, OntologyDictionary};

/// Everything one merge run produced.
#[derive(Debug)]
pub struct MergeOutcome {
    pub namespace: Namespace,
    pub description: String,
    pub event_index: usize,
    pub genes: GeneTable,
    pub stats: MergeStats,
    pub summary: MergeSummary,
}

/// One ontology event describing how the terms got here.
#[derive(Debug, Clone)]
pub struct EventInfo<'a> {
    pub method: &'a str,
    pub description: &'a str,
    pub timestamp: &'a str,
}

/// Ingest, resolve, validate, tag with a fresh ontology event, merge, summarize.
pub fn merge_annotations(
    genome: &mut Genome,
    ns: &Namespace,
    annotations: &[(String, String)],
    dictionary: &OntologyDictionary,
    event: &EventInfo<'_>,
) -> MergeOutcome {
    let mut genes = GeneTable::new();
    annotations_to_genes(
        annotations.iter().map(|(gene, term)| (gene.as_str(), term.as_str())),
        &mut genes,
    );
    if genes.is_empty() {
        warn!("No annotation rows to merge for '{}'", event.description);
    }
    let genes = resolve_genes(genes, genome);
    let genes = validate_genes(genes, dictionary, ns);

    let event_index = add_ontology_event(
        genome,
        ns,
        event.method,
        method_version(),
        event.description,
        event.timestamp,
    );
    let stats = update_genome(genome, ns, &genes, event_index);
    let summary = summarize(&genes);

    let counts = summary.counts();
    info!(
        "{}: {} valid / {} invalid genes, {} valid / {} invalid terms",
        ns, counts.valid_genes, counts.invalid_genes, counts.valid_terms, counts.invalid_terms
    );
    info!(
        "{}: touched {} features, {} new term links, {} appended events, {} new names",
        ns, stats.features_touched, stats.terms_created, stats.events_appended, stats.names_added
    );
    if counts.valid_terms == 0 {
        warn!("No valid {} terms were merged for '{}'", ns, event.description);
    }

    MergeOutcome {
        namespace: ns.clone(),
        description: event.description.to_string(),
        event_index,
        genes,
        stats,
        summary,
    }
}

#[derive(Debug, Clone)]
pub struct SingleRun {
    pub genome: PathBuf,
    pub annotation_file: String,
    pub ontology: String,
    pub description: String,
    pub output_genome: PathBuf,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct BulkRun {
    pub genome: PathBuf,
    pub annotation_file: String,
    pub output_genome: PathBuf,
    pub timestamp: String,
}

pub fn run_single(config: &MergeConfig, run: &SingleRun) -> Result<MergeOutcome> {
    let ns = Namespace::new(&run.ontology);
    let mut genome = load_genome(&run.genome)?;
    let dictionary = get_ontology_dict(config, &ns)?;
    let annotations = get_annotations_file(config, &run.annotation_file, &ns)?;

    let outcome = merge_annotations(
        &mut genome,
        &ns,
        &annotations,
        &dictionary,
        &EventInfo {
            method: METHOD_SINGLE,
            description: &run.description,
            timestamp: &run.timestamp,
        },
    );
    save_genome(&genome, &run.output_genome)?;
    Ok(outcome)
}

/// One merge per `(description, ontology)` group, each with its own event.
pub fn run_bulk(config: &MergeConfig, run: &BulkRun) -> Result<Vec<MergeOutcome>> {
    let mut genome = load_genome(&run.genome)?;
    let df = get_bulk_annotations_file(config, &run.annotation_file)?;
    let pairs = description_ontology_pairs(&df)?;
    info!("Bulk upload has {} description/ontology groups", pairs.len());

    let mut dictionaries: HashMap<Namespace, OntologyDictionary> = HashMap::new();
    let mut outcomes = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let ns = Namespace::new(&pair.ontology);
        if !dictionaries.contains_key(&ns) {
            dictionaries.insert(ns.clone(), get_ontology_dict(config, &ns)?);
        }
        let dictionary = &dictionaries[&ns];

        info!("Merging '{}' ({}, {} rows)", pair.description, ns, pair.count);
        let annotations = pair_annotations(&df, pair)?;
        outcomes.push(merge_annotations(
            &mut genome,
            &ns,
            &annotations,
            dictionary,
            &EventInfo {
                method: METHOD_BULK,
                description: &pair.description,
                timestamp: &run.timestamp,
            },
        ));
    }

    save_genome(&genome, &run.output_genome)?;
    Ok(outcomes)
}
