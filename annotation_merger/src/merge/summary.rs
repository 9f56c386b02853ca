// src/merge/summary.rs

use serde::Serialize;

use crate::models::GeneTable;

/// Valid/invalid genes and terms from one merge run, in gene-table order.
/// Terms are not deduplicated: a term used by three genes appears three times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub valid_genes: Vec<String>,
    pub invalid_genes: Vec<String>,
    pub valid_terms: Vec<String>,
    pub invalid_terms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryCounts {
    pub valid_genes: usize,
    pub invalid_genes: usize,
    pub valid_terms: usize,
    pub invalid_terms: usize,
}

impl MergeSummary {
    pub fn counts(&self) -> SummaryCounts {
        SummaryCounts {
            valid_genes: self.valid_genes.len(),
            invalid_genes: self.invalid_genes.len(),
            valid_terms: self.valid_terms.len(),
            invalid_terms: self.invalid_terms.len(),
        }
    }
}

pub fn summarize(genes: &GeneTable) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for gene in genes {
        if gene.is_identifier_valid() {
            summary.valid_genes.push(gene.id.clone());
        } else {
            summary.invalid_genes.push(gene.id.clone());
        }

        for check in &gene.term_checks {
            if check.is_valid {
                summary.valid_terms.push(check.term_id.clone());
            } else {
                summary.invalid_terms.push(check.term_id.clone());
            }
        }
    }

    summary
}
