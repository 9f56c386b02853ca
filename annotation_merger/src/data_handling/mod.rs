use polars::prelude::*;

pub mod annotation_files;
pub mod genome_store;
pub mod ontology_dictionary;

/// An uploaded annotation table, read into a string-typed frame.
pub trait AnnotationDataset {
    fn load(&self) -> PolarsResult<DataFrame>;
}
