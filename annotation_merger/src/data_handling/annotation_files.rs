// src/data_handling/annotation_files.rs

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::config::MergeConfig;
use crate::data_handling::AnnotationDataset;
use crate::helper_functions::{read_headerless_tsv, string_pairs};
use crate::models::Namespace;

pub const SINGLE_COLUMNS: [&str; 2] = ["gene", "term"];
pub const BULK_COLUMNS: [&str; 4] = ["description", "ontology", "gene", "term"];

/// `gene<TAB>term` upload for one ontology.
pub struct SingleAnnotationFile {
    pub path: PathBuf,
}

/// `description<TAB>ontology<TAB>gene<TAB>term` upload spanning several ontologies.
pub struct BulkAnnotationFile {
    pub path: PathBuf,
}

impl AnnotationDataset for SingleAnnotationFile {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading annotations from {}", self.path.display());
        read_headerless_tsv(&self.path, &SINGLE_COLUMNS)
    }
}

impl AnnotationDataset for BulkAnnotationFile {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading bulk annotations from {}", self.path.display());
        read_headerless_tsv(&self.path, &BULK_COLUMNS)
    }
}

/// `(gene, term)` rows with the namespace prefix added to terms that lack it.
pub fn annotation_pairs(df: &DataFrame, ns: &Namespace) -> PolarsResult<Vec<(String, String)>> {
    let pairs = string_pairs(df, "gene", "term")?
        .into_iter()
        .map(|(gene, term)| {
            let term = ns.ensure_prefixed(&term);
            (gene, term)
        })
        .collect();
    Ok(pairs)
}

pub fn get_annotations_file(config: &MergeConfig, file_name: &str, ns: &Namespace) -> Result<Vec<(String, String)>> {
    let dataset = SingleAnnotationFile {
        path: config.annotation_path(file_name),
    };
    let df = match dataset.load() {
        Ok(df) => df,
        Err(e) => {
            error!("Failed to read annotation file: {}", e);
            return Err(e).with_context(|| format!("reading {}", dataset.path.display()));
        }
    };
    Ok(annotation_pairs(&df, ns)?)
}

pub fn get_bulk_annotations_file(config: &MergeConfig, file_name: &str) -> Result<DataFrame> {
    let dataset = BulkAnnotationFile {
        path: config.annotation_path(file_name),
    };
    let df = dataset
        .load()
        .with_context(|| format!("reading {}", dataset.path.display()))?;
    validate_bulk(&df)?;
    Ok(df)
}

/// The description, ontology and gene columns must be fully populated.
pub fn validate_bulk(df: &DataFrame) -> Result<()> {
    let mut problems = Vec::new();
    for name in &BULK_COLUMNS[..3] {
        let empty = df
            .column(name)?
            .str()?
            .into_iter()
            .filter(|value| value.map_or(true, |v| v.trim().is_empty()))
            .count();
        if empty > 0 {
            problems.push(format!("{} empty value(s) in `{}`", empty, name));
        }
    }
    if !problems.is_empty() {
        bail!("bulk annotation file is incomplete: {}", problems.join("; "));
    }
    Ok(())
}

/// One distinct `(description, ontology)` group of a bulk upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionOntologyPair {
    pub description: String,
    pub ontology: String,
    pub count: u64,
}

/// Distinct `(description, ontology)` pairs with row counts, in first-appearance order.
pub fn description_ontology_pairs(df: &DataFrame) -> PolarsResult<Vec<DescriptionOntologyPair>> {
    let grouped = df
        .clone()
        .lazy()
        .group_by_stable([col("description"), col("ontology")])
        .agg([len().cast(DataType::UInt64).alias("count")])
        .collect()?;
    debug!("Bulk groups = {:?}", grouped);

    let descriptions = grouped.column("description")?.str()?;
    let ontologies = grouped.column("ontology")?.str()?;
    let counts = grouped.column("count")?.u64()?;

    let mut pairs = Vec::with_capacity(grouped.height());
    for ((description, ontology), count) in descriptions
        .into_iter()
        .zip(ontologies.into_iter())
        .zip(counts.into_iter())
    {
        if let (Some(description), Some(ontology)) = (description, ontology) {
            pairs.push(DescriptionOntologyPair {
                description: description.to_string(),
                ontology: ontology.to_string(),
                count: count.unwrap_or(0),
            });
        }
    }
    Ok(pairs)
}

/// Rows of one bulk group, as `(gene, term)` pairs prefixed for the group's namespace.
pub fn pair_annotations(df: &DataFrame, pair: &DescriptionOntologyPair) -> PolarsResult<Vec<(String, String)>> {
    let subset = df
        .clone()
        .lazy()
        .filter(
            col("description")
                .eq(lit(pair.description.as_str()))
                .and(col("ontology").eq(lit(pair.ontology.as_str()))),
        )
        .collect()?;
    annotation_pairs(&subset, &Namespace::new(&pair.ontology))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_with(file_name: &str, contents: &str) -> (tempfile::TempDir, MergeConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(file_name), contents).unwrap();
        let mut config = MergeConfig::new(dir.path().to_path_buf());
        config.staging_dir = dir.path().to_path_buf();
        (dir, config)
    }

    #[test]
    fn single_file_terms_get_prefix_when_missing() {
        let (_dir, config) = config_with("a.tsv", "g1\t0008150\textra\ng2\tgo:0003674\n");
        let pairs = get_annotations_file(&config, "a.tsv", &Namespace::new("GO")).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("g1".to_string(), "GO:0008150".to_string()),
                ("g2".to_string(), "GO:0003674".to_string()),
            ]
        );
    }

    #[test]
    fn missing_single_file_is_an_error() {
        let (_dir, config) = config_with("a.tsv", "");
        assert!(get_annotations_file(&config, "missing.tsv", &Namespace::new("GO")).is_err());
    }

    #[test]
    fn bulk_pairs_keep_first_appearance_order() {
        let (_dir, config) = config_with(
            "bulk.tsv",
            "run b\tGO\tg1\t0008150\n\
             run a\tEC\tg2\t1.1.1.1\n\
             run b\tGO\tg2\t0003674\n\
             run a\tMETA\tg3\tRXN-1\n",
        );
        let df = get_bulk_annotations_file(&config, "bulk.tsv").unwrap();
        let pairs = description_ontology_pairs(&df).unwrap();

        let keys: Vec<(&str, &str, u64)> = pairs
            .iter()
            .map(|p| (p.description.as_str(), p.ontology.as_str(), p.count))
            .collect();
        assert_eq!(keys, vec![("run b", "GO", 2), ("run a", "EC", 1), ("run a", "META", 1)]);

        let rows = pair_annotations(&df, &pairs[0]).unwrap();
        assert_eq!(
            rows,
            vec![
                ("g1".to_string(), "GO:0008150".to_string()),
                ("g2".to_string(), "GO:0003674".to_string()),
            ]
        );
        let meta = pair_annotations(&df, &pairs[2]).unwrap();
        assert_eq!(meta, vec![("g3".to_string(), "META:RXN-1".to_string())]);
    }

    #[test]
    fn bulk_rows_missing_a_gene_are_rejected() {
        let (_dir, config) = config_with("bulk.tsv", "run\tGO\tg1\t0008150\nrun\tGO\t\t0003674\n");
        let err = get_bulk_annotations_file(&config, "bulk.tsv").unwrap_err();
        assert!(format!("{:#}", err).contains("`gene`"));
    }
}
