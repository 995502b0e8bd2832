use crate::error::Result;
use crate::types::{FrequencyTable, GeneMatrix, PathwayGeneSet};
use log::{debug, info, warn};
use ndarray::{Array2, ArrayViewMut1, Axis};
use std::collections::BTreeSet;

/// Counts gene presence per pathway and isolate, then normalizes each row by its maximum.
///
/// For every pathway the presence values of its member genes are summed per
/// isolate. Genes missing from `genes` contribute nothing. Each row is then
/// divided by its own maximum, so the most saturated isolate of a pathway has
/// frequency 1. Pathways without any present gene keep an all-zero row.
///
/// # Example
/// ```
/// use pangenome_pathways::frequency::aggregate;
/// use pangenome_pathways::types::{GeneMatrix, PathwayGeneSet};
///
/// let genes = GeneMatrix::from_rows(
///     &["I1", "I2"],
///     &[("g1", vec![1.0, 0.0]), ("g2", vec![1.0, 1.0])],
/// ).unwrap();
/// let pathways: PathwayGeneSet = [("P", vec!["g1", "g2"])].into_iter().collect();
///
/// let table = aggregate(&genes, &pathways).unwrap();
/// assert_eq!(table.row("P").unwrap().to_vec(), vec![1.0, 0.5]);
/// ```
pub fn aggregate(genes: &GeneMatrix, pathways: &PathwayGeneSet) -> Result<FrequencyTable> {
    info!(
        "Allocating {} pathways to {} isolates",
        pathways.len(),
        genes.n_isolates()
    );

    let mut counts = Array2::<f64>::zeros((pathways.len(), genes.n_isolates()));
    for (mut row, (pathway, members)) in counts.axis_iter_mut(Axis(0)).zip(pathways.iter()) {
        let mut matched = 0usize;
        for presence in members.iter().filter_map(|gene| genes.presence(gene)) {
            row += &presence;
            matched += 1;
        }
        debug!("{}: {}/{} genes matched", pathway, matched, members.len());
        normalize_row(row.view_mut());
    }

    let unmatched = unmatched_genes(genes, pathways);
    if !unmatched.is_empty() {
        warn!(
            "{} pathway genes are absent from the gene table and were skipped",
            unmatched.len()
        );
    }

    FrequencyTable::new(
        pathways.pathways().cloned().collect(),
        genes.isolates().to_vec(),
        counts,
    )
}

/// Divides a row by its maximum; rows with a non-positive maximum are left untouched
pub fn normalize_row(mut row: ArrayViewMut1<'_, f64>) {
    let max = row.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        row.mapv_inplace(|v| v / max);
    }
}

/// Gene names referenced by pathways but missing from the gene matrix
pub fn unmatched_genes(genes: &GeneMatrix, pathways: &PathwayGeneSet) -> BTreeSet<String> {
    pathways
        .iter()
        .flat_map(|(_, members)| members.iter())
        .filter(|gene| !genes.contains(gene))
        .cloned()
        .collect()
}
