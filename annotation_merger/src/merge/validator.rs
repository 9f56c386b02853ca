// src/merge/validator.rs

use tracing::debug;

use crate::models::{GeneRecord, GeneTable, Namespace, OntologyDictionary, TermCheck};

/// Checks one raw term, trying in order: exact key, `META:`-prefixed (META
/// only), `GO:`-stripped (GO only). Upstream ontology files disagree on
/// whether ids carry their prefix, hence the per-namespace rules.
pub fn check_term(raw: &str, dictionary: &OntologyDictionary, ns: &Namespace) -> TermCheck {
    let candidate = if dictionary.get(raw).is_some() {
        Some(raw.to_string())
    } else {
        match ns.as_str() {
            "META" => Some(format!("META:{}", raw)),
            "GO" => raw.strip_prefix("GO:").map(str::to_string),
            _ => None,
        }
    };

    if let Some(term_id) = candidate {
        if let Some(name) = dictionary.get(&term_id) {
            return TermCheck {
                display_name: name.to_string(),
                term_id,
                is_valid: true,
            };
        }
    }

    TermCheck {
        term_id: raw.to_string(),
        display_name: String::new(),
        is_valid: false,
    }
}

/// Appends one check per raw term to `gene.term_checks`.
pub fn validate_gene_terms(
    mut gene: GeneRecord,
    dictionary: &OntologyDictionary,
    ns: &Namespace,
) -> GeneRecord {
    let checks: Vec<TermCheck> = gene
        .raw_terms
        .iter()
        .map(|raw| check_term(raw, dictionary, ns))
        .collect();
    gene.term_checks.extend(checks);
    gene
}

pub fn validate_genes(genes: GeneTable, dictionary: &OntologyDictionary, ns: &Namespace) -> GeneTable {
    debug!(
        "Validating {} genes against {} {} terms",
        genes.len(),
        dictionary.len(),
        ns
    );
    genes.map_records(|gene| validate_gene_terms(gene, dictionary, ns))
}
