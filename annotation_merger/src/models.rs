// src/models.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Namespace
// ─────────────────────────────────────────────────────────────────────────────

/// Ontology family (GO, META, EC, ...), always held upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: &str) -> Self {
        Namespace(name.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn prefix(&self) -> String {
        format!("{}:", self.0)
    }

    /// Case-insensitive check for a leading `NS:`.
    pub fn is_prefixed(&self, term: &str) -> bool {
        let prefix = self.prefix();
        term.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&prefix))
    }

    /// Returns the term with an upper-case `NS:` prefix, replacing a prefix
    /// written in any other case and adding one when missing.
    pub fn ensure_prefixed(&self, term: &str) -> String {
        let prefix = self.prefix();
        if self.is_prefixed(term) {
            format!("{}{}", prefix, &term[prefix.len()..])
        } else {
            format!("{}{}", prefix, term)
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Uploaded genes
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of checking one raw term against the ontology dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCheck {
    pub term_id: String,
    pub display_name: String,
    pub is_valid: bool,
}

/// One uploaded gene/locus identifier and everything learned about it during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneRecord {
    pub id: String,
    pub resolved_feature_id: Option<String>,
    pub raw_terms: BTreeSet<String>,
    pub term_checks: Vec<TermCheck>,
}

impl GeneRecord {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            resolved_feature_id: None,
            raw_terms: BTreeSet::new(),
            term_checks: Vec::new(),
        }
    }

    /// Returns false when the term was already attached.
    pub fn add_term(&mut self, term: &str) -> bool {
        self.raw_terms.insert(term.to_string())
    }

    pub fn is_identifier_valid(&self) -> bool {
        self.resolved_feature_id.is_some()
    }

    pub fn has_valid_annotations(&self) -> bool {
        self.term_checks.iter().any(|check| check.is_valid)
    }

    pub fn valid_checks(&self) -> impl Iterator<Item = &TermCheck> {
        self.term_checks.iter().filter(|check| check.is_valid)
    }
}

/// Gene records keyed by uploaded identifier, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct GeneTable {
    records: Vec<GeneRecord>,
    positions: HashMap<String, usize>,
}

impl GeneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the record for `id`, creating it on first sight.
    pub fn entry(&mut self, id: &str) -> &mut GeneRecord {
        let idx = match self.positions.get(id) {
            Some(&idx) => idx,
            None => {
                self.records.push(GeneRecord::new(id));
                let idx = self.records.len() - 1;
                self.positions.insert(id.to_string(), idx);
                idx
            }
        };
        &mut self.records[idx]
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&GeneRecord> {
        self.positions.get(id).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneRecord> {
        self.records.iter()
    }

    /// Replaces every record with `f(record)`. `f` must not change the record id.
    pub fn map_records<F>(self, f: F) -> Self
    where
        F: FnMut(GeneRecord) -> GeneRecord,
    {
        let records: Vec<GeneRecord> = self.records.into_iter().map(f).collect();
        debug_assert!(records
            .iter()
            .enumerate()
            .all(|(idx, r)| self.positions.get(&r.id) == Some(&idx)));
        Self {
            records,
            positions: self.positions,
        }
    }
}

impl<'a> IntoIterator for &'a GeneTable {
    type Item = &'a GeneRecord;
    type IntoIter = std::slice::Iter<'a, GeneRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Genome record
// ─────────────────────────────────────────────────────────────────────────────

/// `ns -> term_id -> [event index, ...]` attached to a single feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureOntologyTerms(pub BTreeMap<String, BTreeMap<String, Vec<usize>>>);

impl FeatureOntologyTerms {
    pub fn ensure_namespace(&mut self, ns: &Namespace) -> &mut BTreeMap<String, Vec<usize>> {
        self.0.entry(ns.as_str().to_string()).or_default()
    }

    /// Appends `event` to the term's list. A token already in the list is not added twice.
    pub fn append_event(&mut self, ns: &Namespace, term_id: &str, event: usize) -> bool {
        let events = self
            .ensure_namespace(ns)
            .entry(term_id.to_string())
            .or_default();
        if events.contains(&event) {
            return false;
        }
        events.push(event);
        true
    }

    pub fn events(&self, ns: &Namespace, term_id: &str) -> Option<&[usize]> {
        self.0
            .get(ns.as_str())
            .and_then(|terms| terms.get(term_id))
            .map(Vec::as_slice)
    }
}

/// `ns -> term_id -> display name` for every term attached anywhere in the genome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OntologiesPresent(pub BTreeMap<String, BTreeMap<String, String>>);

impl OntologiesPresent {
    /// First writer wins: an existing name is never overwritten.
    pub fn insert_first(&mut self, ns: &Namespace, term_id: &str, name: &str) -> bool {
        let terms = self.0.entry(ns.as_str().to_string()).or_default();
        if terms.contains_key(term_id) {
            return false;
        }
        terms.insert(term_id.to_string(), name.to_string());
        true
    }

    #[cfg(test)]
    pub fn name(&self, ns: &Namespace, term_id: &str) -> Option<&str> {
        self.0
            .get(ns.as_str())
            .and_then(|terms| terms.get(term_id))
            .map(String::as_str)
    }

    #[cfg(test)]
    pub fn terms(&self, ns: &Namespace) -> Option<&BTreeMap<String, String>> {
        self.0.get(ns.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alias {
    Typed(String, String),
    Bare(String),
}

impl Alias {
    pub fn value(&self) -> &str {
        match self {
            Alias::Typed(_, value) => value,
            Alias::Bare(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<Alias>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_terms: Option<FeatureOntologyTerms>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Provenance for one merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub method_version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_events: Option<Vec<OntologyEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontologies_present: Option<OntologiesPresent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Ontology dictionary
// ─────────────────────────────────────────────────────────────────────────────

/// Namespaced term id -> display name. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct OntologyDictionary {
    terms: HashMap<String, String>,
}

impl OntologyDictionary {
    pub fn get(&self, term_id: &str) -> Option<&str> {
        self.terms.get(term_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OntologyDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            terms: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adding_same_term_twice_keeps_one_copy() {
        let mut gene = GeneRecord::new("g1");
        assert!(gene.add_term("GO:0008150"));
        assert!(!gene.add_term("GO:0008150"));
        assert_eq!(gene.raw_terms.len(), 1);
    }

    #[test]
    fn gene_table_keeps_first_seen_order() {
        let mut table = GeneTable::new();
        table.entry("b").add_term("x");
        table.entry("a").add_term("y");
        table.entry("b").add_term("z");
        let ids: Vec<&str> = table.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(table.get("b").map(|g| g.raw_terms.len()), Some(2));
    }

    #[test]
    fn namespace_prefix_check_ignores_case() {
        let ns = Namespace::new("go");
        assert_eq!(ns.as_str(), "GO");
        assert!(ns.is_prefixed("go:0008150"));
        assert_eq!(ns.ensure_prefixed("go:0008150"), "GO:0008150");
        assert_eq!(ns.ensure_prefixed("Go:0008150"), "GO:0008150");
        assert_eq!(ns.ensure_prefixed("GO:0008150"), "GO:0008150");
        assert_eq!(ns.ensure_prefixed("0008150"), "GO:0008150");
        assert!(!Namespace::new("META").is_prefixed("METACYC-1"));
    }

    #[test]
    fn event_append_skips_token_already_present() {
        let ns = Namespace::new("GO");
        let mut terms = FeatureOntologyTerms::default();
        assert!(terms.append_event(&ns, "0008150", 0));
        assert!(terms.append_event(&ns, "0008150", 1));
        assert!(!terms.append_event(&ns, "0008150", 1));
        assert_eq!(terms.events(&ns, "0008150"), Some(&[0, 1][..]));
    }

    #[test]
    fn ontologies_present_keeps_first_name() {
        let ns = Namespace::new("GO");
        let mut present = OntologiesPresent::default();
        assert!(present.insert_first(&ns, "0008150", "biological_process"));
        assert!(!present.insert_first(&ns, "0008150", "renamed"));
        assert_eq!(present.name(&ns, "0008150"), Some("biological_process"));
    }

    #[test]
    fn genome_round_trip_preserves_unknown_fields() {
        let raw = json!({
            "id": "Genome.1",
            "scientific_name": "E. coli",
            "features": [
                {"id": "gene1", "aliases": [["old_locus_tag", "g1"], "bare"], "dna_sequence": "ATG",
                 "ontology_terms": {"GO": {"0008150": [0]}}}
            ],
            "ontology_events": [{"id": "GO", "method": "m", "method_version": "1",
                                 "timestamp": "t", "ontology_ref": "KBaseOntology/gene_ontology"}]
        });
        let genome: Genome = serde_json::from_value(raw).unwrap();
        assert_eq!(genome.features[0].aliases[0].value(), "g1");
        assert_eq!(genome.features[0].aliases[1].value(), "bare");
        assert!(genome.ontologies_present.is_none());

        let back = serde_json::to_value(&genome).unwrap();
        assert_eq!(back["scientific_name"], "E. coli");
        assert_eq!(back["features"][0]["dna_sequence"], "ATG");
        assert_eq!(back["features"][0]["aliases"][0], json!(["old_locus_tag", "g1"]));
        assert_eq!(back["ontology_events"][0]["ontology_ref"], "KBaseOntology/gene_ontology");
        assert!(back.get("ontologies_present").is_none());
    }
}
