// src/merge/ingest.rs

use tracing::debug;

use crate::models::GeneTable;

/// Attaches each `(gene, term)` pair to its gene record, creating records on first sight.
/// Columns past the first two never reach this point. The same table can be fed several batches.
pub fn annotations_to_genes<'a, I>(annotations: I, genes: &mut GeneTable) -> &mut GeneTable
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut rows = 0usize;
    let mut duplicates = 0usize;
    for (gene_id, term) in annotations {
        rows += 1;
        if !genes.entry(gene_id).add_term(term) {
            duplicates += 1;
        }
    }
    debug!(
        "Ingested {} annotation rows into {} genes ({} duplicate pairs)",
        rows,
        genes.len(),
        duplicates
    );
    genes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_group_by_gene_and_dedup_terms() {
        let mut genes = GeneTable::new();
        let rows = vec![
            ("g1", "GO:0008150"),
            ("g2", "GO:0003674"),
            ("g1", "GO:0008150"),
            ("g1", "GO:0005575"),
        ];
        annotations_to_genes(rows, &mut genes);

        assert_eq!(genes.len(), 2);
        let g1 = genes.get("g1").unwrap();
        assert_eq!(g1.raw_terms.len(), 2);
        assert!(g1.raw_terms.contains("GO:0005575"));
    }

    #[test]
    fn second_batch_extends_existing_records() {
        let mut genes = GeneTable::new();
        annotations_to_genes(vec![("g1", "A")], &mut genes);
        annotations_to_genes(vec![("g1", "B"), ("g3", "A")], &mut genes);

        let ids: Vec<&str> = genes.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g3"]);
        assert_eq!(genes.get("g1").unwrap().raw_terms.len(), 2);
    }
}
