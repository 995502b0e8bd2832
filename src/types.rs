use crate::error::{PathwayError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Header of the pathway name column in exported tables
pub const PATHWAY_COLUMN: &str = "pathway";

/// Canonical gene presence/absence matrix (genes x isolates)
///
/// Rows are canonical gene names in first-appearance order, columns are the
/// isolate IDs from the input table header.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneMatrix {
    genes: Vec<String>,
    isolates: Vec<String>,
    presence: Array2<f64>,
    index: HashMap<String, usize>,
}

impl GeneMatrix {
    /// Builds a matrix from already canonical gene names.
    ///
    /// # Errors
    /// * `PathwayError::InvalidInput` if the shape of `presence` does not match the labels
    ///   or a gene name occurs twice
    pub fn new(genes: Vec<String>, isolates: Vec<String>, presence: Array2<f64>) -> Result<Self> {
        if presence.dim() != (genes.len(), isolates.len()) {
            return Err(PathwayError::InvalidInput(format!(
                "presence matrix is {:?} but there are {} genes and {} isolates",
                presence.dim(),
                genes.len(),
                isolates.len()
            )));
        }

        let mut index = HashMap::with_capacity(genes.len());
        for (row, gene) in genes.iter().enumerate() {
            if index.insert(gene.clone(), row).is_some() {
                return Err(PathwayError::InvalidInput(format!(
                    "duplicate gene '{}' in gene matrix",
                    gene
                )));
            }
        }

        Ok(Self {
            genes,
            isolates,
            presence,
            index,
        })
    }

    /// Convenience constructor from `(gene, values)` rows.
    pub fn from_rows<G, S>(isolates: &[S], rows: &[(G, Vec<f64>)]) -> Result<Self>
    where
        G: AsRef<str>,
        S: AsRef<str>,
    {
        let width = isolates.len();
        let mut presence = Array2::<f64>::zeros((rows.len(), width));
        for (i, (gene, values)) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(PathwayError::InvalidInput(format!(
                    "gene '{}' has {} values, expected {}",
                    gene.as_ref(),
                    values.len(),
                    width
                )));
            }
            presence.row_mut(i).assign(&ArrayView1::from(values.as_slice()));
        }

        Self::new(
            rows.iter().map(|(g, _)| g.as_ref().to_string()).collect(),
            isolates.iter().map(|s| s.as_ref().to_string()).collect(),
            presence,
        )
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn isolates(&self) -> &[String] {
        &self.isolates
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.presence
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_isolates(&self) -> usize {
        self.isolates.len()
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.index.contains_key(gene)
    }

    /// Presence values of `gene` across all isolates, or `None` if the gene is absent
    pub fn presence(&self, gene: &str) -> Option<ArrayView1<'_, f64>> {
        self.index.get(gene).map(|&row| self.presence.row(row))
    }
}

/// Pathway name to member gene names, merged across enrichment tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathwayGeneSet {
    pathways: BTreeMap<String, BTreeSet<String>>,
}

impl PathwayGeneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds genes to a pathway, creating the pathway if needed. Empty names are dropped.
    pub fn insert<I, S>(&mut self, pathway: impl Into<String>, genes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.pathways.entry(pathway.into()).or_default();
        entry.extend(genes.into_iter().map(Into::into).filter(|g| !g.is_empty()));
    }

    /// Unions `other` into `self`; the result does not depend on merge order.
    pub fn merge(&mut self, other: PathwayGeneSet) {
        for (pathway, genes) in other.pathways {
            self.pathways.entry(pathway).or_default().extend(genes);
        }
    }

    pub fn get(&self, pathway: &str) -> Option<&BTreeSet<String>> {
        self.pathways.get(pathway)
    }

    pub fn len(&self) -> usize {
        self.pathways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
    }

    pub fn pathways(&self) -> impl Iterator<Item = &String> {
        self.pathways.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.pathways.iter()
    }
}

impl<P, I, S> FromIterator<(P, I)> for PathwayGeneSet
where
    P: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut set = PathwayGeneSet::new();
        for (pathway, genes) in iter {
            set.insert(pathway, genes);
        }
        set
    }
}

/// Normalized pathway frequency per isolate (pathways x isolates)
///
/// Every row either has a maximum of exactly 1 or is all zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    pathways: Vec<String>,
    isolates: Vec<String>,
    values: Array2<f64>,
}

impl FrequencyTable {
    pub fn new(pathways: Vec<String>, isolates: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.dim() != (pathways.len(), isolates.len()) {
            return Err(PathwayError::InvalidInput(format!(
                "frequency matrix is {:?} but there are {} pathways and {} isolates",
                values.dim(),
                pathways.len(),
                isolates.len()
            )));
        }
        Ok(Self {
            pathways,
            isolates,
            values,
        })
    }

    pub fn pathways(&self) -> &[String] {
        &self.pathways
    }

    pub fn isolates(&self) -> &[String] {
        &self.isolates
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.pathways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
    }

    pub fn row(&self, pathway: &str) -> Option<ArrayView1<'_, f64>> {
        self.pathways
            .iter()
            .position(|p| p == pathway)
            .map(|i| self.values.row(i))
    }

    /// Sum of frequencies across isolates for every pathway
    pub fn row_sums(&self) -> Array1<f64> {
        self.values.sum_axis(Axis(1))
    }

    /// Keeps the named pathways, in table order
    pub fn subset(&self, pathways: &[String]) -> FrequencyTable {
        let keep: HashSet<&str> = pathways.iter().map(String::as_str).collect();
        let indices: Vec<usize> = self
            .pathways
            .iter()
            .enumerate()
            .filter(|(_, p)| keep.contains(p.as_str()))
            .map(|(i, _)| i)
            .collect();

        FrequencyTable {
            pathways: indices.iter().map(|&i| self.pathways[i].clone()).collect(),
            isolates: self.isolates.clone(),
            values: self.values.select(Axis(0), &indices),
        }
    }

    /// Column headers of the exported table: [`PATHWAY_COLUMN`], then the isolates.
    ///
    /// # Errors
    /// * `PathwayError::InvalidInput` if an isolate shares its name with the
    ///   pathway column
    pub fn header(&self) -> Result<Vec<&str>> {
        if self.isolates.iter().any(|isolate| isolate == PATHWAY_COLUMN) {
            return Err(PathwayError::InvalidInput(format!(
                "isolate '{}' clashes with the pathway name column",
                PATHWAY_COLUMN
            )));
        }
        let mut header = Vec::with_capacity(self.isolates.len() + 1);
        header.push(PATHWAY_COLUMN);
        header.extend(self.isolates.iter().map(String::as_str));
        Ok(header)
    }

    /// Converts the table into a DataFrame with a leading [`PATHWAY_COLUMN`]
    /// followed by one Float64 column per isolate.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let header = self.header()?;
        let mut columns = Vec::with_capacity(header.len());
        columns.push(Column::new(PATHWAY_COLUMN.into(), self.pathways.clone()));
        for (j, isolate) in self.isolates.iter().enumerate() {
            columns.push(Column::new(
                isolate.as_str().into(),
                self.values.column(j).to_vec(),
            ));
        }

        Ok(DataFrame::new(columns)?)
    }
}
