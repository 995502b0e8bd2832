use pangenome_pathways::enrichment::{self, EnrichmentSource};
use pangenome_pathways::error::PathwayError;
use std::fs;
use std::path::{Path, PathBuf};

fn genes_of(set: &pangenome_pathways::types::PathwayGeneSet, pathway: &str) -> Vec<String> {
    set.get(pathway).unwrap().iter().cloned().collect()
}

#[test]
fn test_split_matches() {
    let genes: Vec<&str> = enrichment::split_matches("dnaK // abcA").collect();
    assert_eq!(genes, vec!["dnaK", "abcA"]);

    // empty tokens are dropped
    let genes: Vec<&str> = enrichment::split_matches("recA // ").collect();
    assert_eq!(genes, vec!["recA"]);
    assert_eq!(enrichment::split_matches("").count(), 0);
}

#[test]
fn test_resolve_source() {
    assert_eq!(
        EnrichmentSource::resolve("tests/data/Enrichment_single.txt").unwrap(),
        EnrichmentSource::SingleFile(PathBuf::from("tests/data/Enrichment_single.txt"))
    );
    assert_eq!(
        EnrichmentSource::resolve("tests/data/smarttables").unwrap(),
        EnrichmentSource::Directory(PathBuf::from("tests/data/smarttables"))
    );

    let result = EnrichmentSource::resolve("tests/data/nowhere");
    assert!(matches!(result, Err(PathwayError::InvalidPath(_))));
}

#[test]
fn test_read_smart_table() {
    let set = enrichment::read_smart_table("tests/data/Enrichment_single.txt").unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(genes_of(&set, "glycolysis"), vec!["abcA", "dnaK"]);
    assert_eq!(genes_of(&set, "chemotaxis"), vec!["recA"]);
    assert_eq!(genes_of(&set, "orphan pathway"), vec!["zzzA"]);
}

#[test]
fn test_read_smart_table_without_matches() {
    let result = enrichment::read_smart_table("tests/data/no_matches.txt");
    assert!(matches!(result, Err(PathwayError::MissingColumn { .. })));
}

#[test]
fn test_find_enrichment_files() {
    let files = enrichment::find_enrichment_files("tests/data/smarttables").unwrap();
    let names: Vec<&str> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Enrichment_run1.txt", "EnrichedPathways.txt"]);

    assert!(enrichment::is_enrichment_file(Path::new("a/Enrich.txt")));
    assert!(!enrichment::is_enrichment_file(Path::new("a/notes.txt")));
    assert!(!enrichment::is_enrichment_file(Path::new("a/Enrichment.tsv")));
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();

    let result = enrichment::read_enrichment_dir(dir.path());
    assert!(matches!(result, Err(PathwayError::NoEnrichmentFiles(_))));
}

#[test]
fn test_read_enrichment_dir_unions_pathways() {
    let set = EnrichmentSource::resolve("tests/data/smarttables")
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(set.len(), 3);
    assert_eq!(genes_of(&set, "glycolysis"), vec!["abcA", "dnaK", "group"]);
    assert_eq!(genes_of(&set, "TCA cycle"), vec!["abcA", "recA"]);
    assert_eq!(genes_of(&set, "chemotaxis"), vec!["recA"]);
    // notes.txt is not an enrichment file
    assert!(set.get("ignored").is_none());
}

#[test]
fn test_merge_is_order_independent() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("Enrich_a.txt");
    let second = dir.path().join("Enrich_b.txt");
    fs::write(&first, "Pathway\tMatches\nP\tg1 // g2\nQ\tg3\n").unwrap();
    fs::write(&second, "Pathway\tMatches\nP\tg2 // g4\nR\tg5\n").unwrap();

    let a = enrichment::read_smart_table(&first).unwrap();
    let b = enrichment::read_smart_table(&second).unwrap();

    let mut ab = a.clone();
    ab.merge(b.clone());
    let mut ba = b;
    ba.merge(a);

    assert_eq!(ab, ba);
    assert_eq!(genes_of(&ab, "P"), vec!["g1", "g2", "g4"]);
    assert_eq!(ab.len(), 3);
}
