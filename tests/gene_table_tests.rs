use pangenome_pathways::error::PathwayError;
use pangenome_pathways::genes;
use polars::prelude::*;

#[test]
fn test_canonical_gene_name() {
    assert_eq!(genes::canonical_gene_name("abcA_1"), "abcA");
    assert_eq!(genes::canonical_gene_name("abcA_12"), "abcA");
    assert_eq!(genes::canonical_gene_name("recA2"), "recA");
    assert_eq!(genes::canonical_gene_name("group_1734"), "group");
    assert_eq!(genes::canonical_gene_name("dnaK"), "dnaK");

    // only the first suffix counts
    assert_eq!(genes::canonical_gene_name("tnp_3_2"), "tnp");
    assert_eq!(genes::canonical_gene_name("ab12cd_3"), "ab12cd");

    // nothing left before the suffix: keep the identifier
    assert_eq!(genes::canonical_gene_name("_42"), "_42");
}

#[test]
fn test_read_gene_table() {
    let df = genes::read_gene_table("tests/data/gene_presence_absence.Rtab").unwrap();
    assert_eq!(df.height(), 5);
    assert_eq!(df.width(), 4);

    // test file does not exist
    let result = genes::read_gene_table("tests/data/nonexistent.Rtab");
    assert!(matches!(result, Err(PathwayError::Io(_))));
}

#[test]
fn test_canonicalize_merges_with_max() {
    let df: DataFrame = df!(
        "Gene" => ["abcA_1", "abcA_2", "dnaK", "abcA_3"],
        "I1" => [1i64, 0, 1, 0],
        "I2" => [0i64, 1, 1, 0],
        "I3" => [0i64, 0, 0, 0],
    )
    .unwrap();

    let matrix = genes::canonicalize(&df).unwrap();
    assert_eq!(matrix.genes().to_vec(), vec!["abcA", "dnaK"]);
    assert_eq!(matrix.isolates().to_vec(), vec!["I1", "I2", "I3"]);
    assert_eq!(matrix.presence("abcA").unwrap().to_vec(), vec![1.0, 1.0, 0.0]);
    assert_eq!(matrix.presence("dnaK").unwrap().to_vec(), vec![1.0, 1.0, 0.0]);
    assert!(matrix.presence("abcA_1").is_none());
}

#[test]
fn test_canonicalize_keeps_counts() {
    // max-merge also applies to copy numbers above one
    let df: DataFrame = df!(
        "Gene" => ["tnp_1", "tnp_2"],
        "I1" => [2.0, 3.0],
        "I2" => [0.0, 1.0],
    )
    .unwrap();

    let matrix = genes::canonicalize(&df).unwrap();
    assert_eq!(matrix.n_genes(), 1);
    assert_eq!(matrix.presence("tnp").unwrap().to_vec(), vec![3.0, 1.0]);
}

#[test]
fn test_canonicalize_rejects_bad_tables() {
    let no_isolates: DataFrame = df!("Gene" => ["abcA"]).unwrap();
    assert!(matches!(
        genes::canonicalize(&no_isolates),
        Err(PathwayError::InvalidFileFormat(_))
    ));

    let text_values: DataFrame = df!(
        "Gene" => ["abcA"],
        "I1" => ["yes"],
    )
    .unwrap();
    assert!(matches!(
        genes::canonicalize(&text_values),
        Err(PathwayError::InvalidFileFormat(_))
    ));
}

#[test]
fn test_load_gene_matrix() {
    let matrix = genes::load_gene_matrix("tests/data/gene_presence_absence.Rtab").unwrap();
    assert_eq!(matrix.genes().to_vec(), vec!["abcA", "dnaK", "recA", "group"]);
    assert_eq!(matrix.n_isolates(), 3);
    assert_eq!(matrix.presence("abcA").unwrap().to_vec(), vec![1.0, 1.0, 0.0]);
    assert_eq!(matrix.presence("recA").unwrap().to_vec(), vec![0.0, 0.0, 1.0]);
    assert_eq!(matrix.presence("group").unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
}

#[test]
fn test_write_gene_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(genes::GENE_LIST_FILE);

    let matrix = genes::load_gene_matrix("tests/data/gene_presence_absence.Rtab").unwrap();
    genes::write_gene_list(&matrix, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "abcA\ndnaK\nrecA\ngroup\n");
}

#[test]
fn test_empty_isolate_column_counts_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.Rtab");
    std::fs::write(&path, "Gene\tI1\tI2\nabc_1\t1\t\nabc_2\t0\t\n").unwrap();

    let matrix = genes::load_gene_matrix(&path).unwrap();
    assert_eq!(matrix.genes().to_vec(), vec!["abc"]);
    assert_eq!(matrix.presence("abc").unwrap().to_vec(), vec![1.0, 0.0]);

    // text is still rejected once read from a file
    std::fs::write(&path, "Gene\tI1\nabc_1\tyes\n").unwrap();
    assert!(matches!(
        genes::load_gene_matrix(&path),
        Err(PathwayError::InvalidFileFormat(_))
    ));
}

#[test]
fn test_header_only_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.Rtab");
    std::fs::write(&path, "Gene\tI1\tI2\n").unwrap();

    let matrix = genes::load_gene_matrix(&path).unwrap();
    assert_eq!(matrix.n_genes(), 0);
    assert_eq!(matrix.isolates().to_vec(), vec!["I1", "I2"]);

    let list = dir.path().join(genes::GENE_LIST_FILE);
    genes::write_gene_list(&matrix, &list).unwrap();
    assert_eq!(std::fs::read_to_string(&list).unwrap(), "");
}
