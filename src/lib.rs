//! Pathway frequency maps from pangenome gene presence/absence and pathway enrichment tables

pub mod classify;
pub mod cluster;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod frequency;
pub mod genes;
pub mod heatmap;
pub mod pipeline;
pub mod types;
