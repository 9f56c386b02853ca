// src/report.rs

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::merge::genome_merger::MergeStats;
use crate::merge::summary::MergeSummary;
use crate::pipeline::MergeOutcome;

#[derive(Debug, Serialize)]
struct OutcomeSummary<'a> {
    description: &'a str,
    ontology: &'a str,
    event_index: usize,
    stats: &'a MergeStats,
    summary: &'a MergeSummary,
}

/// Which upload produced the outcomes; decides the shape of `summary.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Single,
    Bulk,
}

/// `summary.json` plus `term_checks.tsv`. Single runs write the bare summary
/// object; bulk runs write one entry per group, even when there is only one.
pub fn write_reports(outcomes: &[MergeOutcome], mode: RunMode, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).with_context(|| format!("creating {}", output_dir.display()))?;

    let summary_path = output_dir.join("summary.json");
    let file = File::create(&summary_path).with_context(|| format!("creating {}", summary_path.display()))?;
    let writer = BufWriter::new(file);
    if mode == RunMode::Single {
        let single = outcomes
            .first()
            .ok_or_else(|| anyhow!("single run produced no outcome"))?;
        serde_json::to_writer_pretty(writer, &single.summary)?;
    } else {
        let entries: Vec<OutcomeSummary<'_>> = outcomes
            .iter()
            .map(|o| OutcomeSummary {
                description: &o.description,
                ontology: o.namespace.as_str(),
                event_index: o.event_index,
                stats: &o.stats,
                summary: &o.summary,
            })
            .collect();
        serde_json::to_writer_pretty(writer, &entries)?;
    }
    info!("Wrote {}", summary_path.display());

    let checks_path = output_dir.join("term_checks.tsv");
    write_term_checks(outcomes, &checks_path)?;
    info!("Wrote {}", checks_path.display());
    Ok(())
}

pub fn write_term_checks(outcomes: &[MergeOutcome], path: &Path) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(["gene", "feature_id", "ontology", "term_id", "name", "valid"])?;

    for outcome in outcomes {
        for gene in &outcome.genes {
            let feature_id = gene.resolved_feature_id.as_deref().unwrap_or("");
            for check in &gene.term_checks {
                wtr.write_record([
                    gene.id.as_str(),
                    feature_id,
                    outcome.namespace.as_str(),
                    check.term_id.as_str(),
                    check.display_name.as_str(),
                    if check.is_valid { "1" } else { "0" },
                ])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}
