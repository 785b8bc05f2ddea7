use genero_core::Scanner;
use genero_core::config::IndexConfig;
use genero_core::index::WorkspaceIndex;
use std::fs;
use tempfile::tempdir;

#[test]
fn build_indexes_matching_files_only() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("lib")).unwrap();
    fs::write(
        root.join("main.4gl"),
        "MAIN\n  CALL helper()\nEND MAIN\n",
    )
    .unwrap();
    fs::write(
        root.join("lib/util.4gl"),
        "FUNCTION helper()\nEND FUNCTION\n\nREPORT listing(r)\nEND REPORT\n",
    )
    .unwrap();
    fs::write(root.join("form.per"), "FUNCTION helper()\n").unwrap();

    let index = WorkspaceIndex::build(root, &IndexConfig::default());
    assert_eq!(index.file_count(), 2);
    assert_eq!(index.function_count(), 3);

    let found = index.find_function("helper");
    assert_eq!(found.len(), 1);
    assert!(found[0].path.ends_with("lib/util.4gl"));
    assert_eq!(found[0].start_line, 0);
    assert_eq!(found[0].end_line, Some(1));
}

#[test]
fn duplicate_definitions_are_ordered_by_path() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("b.4gl"), "FUNCTION dup()\nEND FUNCTION\n").unwrap();
    fs::write(root.join("a.4gl"), "\n\nFUNCTION dup()\nEND FUNCTION\n").unwrap();

    let index = WorkspaceIndex::build(root, &IndexConfig::default());
    let found = index.find_function("dup");
    assert_eq!(found.len(), 2);
    assert!(found[0].path.ends_with("a.4gl"));
    assert_eq!(found[0].start_line, 2);
    assert!(found[1].path.ends_with("b.4gl"));
}

#[test]
fn saved_document_refreshes_its_entry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.4gl");
    fs::write(&path, "FUNCTION before()\nEND FUNCTION\n").unwrap();

    let index = WorkspaceIndex::build(dir.path(), &IndexConfig::default());
    assert_eq!(index.find_function("before").len(), 1);

    index.update_file(&path, &Scanner::scan("FUNCTION after()\nEND FUNCTION\n"));
    assert!(index.find_function("before").is_empty());
    assert_eq!(index.find_function("after").len(), 1);
}

#[test]
fn custom_extensions_are_honoured() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x.4gl"), "FUNCTION a()\nEND FUNCTION\n").unwrap();
    fs::write(dir.path().join("y.src"), "FUNCTION b()\nEND FUNCTION\n").unwrap();

    let config = IndexConfig {
        extensions: vec!["src".to_string()],
        ..IndexConfig::default()
    };
    let index = WorkspaceIndex::build(dir.path(), &config);
    assert!(index.find_function("a").is_empty());
    assert_eq!(index.find_function("b").len(), 1);
}
