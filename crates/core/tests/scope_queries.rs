use genero_core::Scanner;
use genero_core::model::Scope;
use genero_core::query::{
    Position, function_at_line, references_of, rename, variable_at_position, visible_variable,
};

const SRC: &str = "\
DEFINE counter INTEGER

FUNCTION first()
  DEFINE idx INTEGER
  LET idx = 1
  LET counter = idx
END FUNCTION

FUNCTION second()
  DEFINE idx STRING
  LET idx = \"a\"
  DISPLAY idx, counter
END FUNCTION
";

#[test]
fn function_at_line_respects_intervals() {
    let model = Scanner::scan(SRC);
    assert!(function_at_line(&model, 0).is_none());
    assert_eq!(function_at_line(&model, 2).unwrap().name, "first");
    assert_eq!(function_at_line(&model, 6).unwrap().name, "first");
    assert!(function_at_line(&model, 7).is_none());
    assert_eq!(function_at_line(&model, 11).unwrap().name, "second");
}

#[test]
fn variable_at_position_finds_declaration_by_name() {
    let model = Scanner::scan(SRC);
    let found = variable_at_position(&model, SRC, Position::new(5, 8)).unwrap();
    assert_eq!(found.name, "counter");
    assert_eq!(found.scope, Scope::Module);
    assert!(variable_at_position(&model, SRC, Position::new(5, 0)).is_none());
}

#[test]
fn module_references_cover_whole_document() {
    let model = Scanner::scan(SRC);
    let counter = visible_variable(&model, "counter", 11).unwrap();
    let lines: Vec<usize> = references_of(&model, SRC, counter)
        .into_iter()
        .map(|r| r.start_line)
        .collect();
    assert_eq!(lines, vec![0, 5, 11]);
}

#[test]
fn function_references_stay_in_querying_function() {
    let model = Scanner::scan(SRC);

    let in_first = visible_variable(&model, "idx", 4).unwrap();
    assert_eq!(in_first.scope, Scope::Function("first".into()));
    let refs = references_of(&model, SRC, in_first);
    assert_eq!(refs.len(), 3);
    assert!(refs.iter().all(|r| (2..=6).contains(&r.start_line)));

    let in_second = visible_variable(&model, "idx", 10).unwrap();
    assert_eq!(in_second.type_name, "STRING");
    let refs = references_of(&model, SRC, in_second);
    assert_eq!(refs.len(), 3);
    assert!(refs.iter().all(|r| (8..=12).contains(&r.start_line)));
}

#[test]
fn rename_replaces_every_reference() {
    let model = Scanner::scan(SRC);
    let counter = visible_variable(&model, "counter", 0).unwrap();
    let refs = references_of(&model, SRC, counter);
    let edits = rename(Some(&model), &refs, "total").unwrap();
    assert_eq!(edits.len(), refs.len());
    assert!(edits.iter().all(|e| e.new_text == "total"));
    assert_eq!(edits[1].range.start_col, 6);
    assert_eq!(edits[1].range.end_col, 13);
}

#[test]
fn unterminated_function_scope_reaches_end_of_document() {
    let src = "FUNCTION f()\n DEFINE x INTEGER\n LET x = 1\n\nDISPLAY x";
    let model = Scanner::scan(src);
    assert!(model.functions[0].end_line.is_none());

    let x = visible_variable(&model, "x", 4).unwrap();
    assert_eq!(x.scope, Scope::Function("f".into()));

    let refs = references_of(&model, src, x);
    let lines: Vec<(usize, usize)> = refs.iter().map(|r| (r.start_line, r.start_col)).collect();
    assert_eq!(lines, vec![(1, 8), (2, 5), (4, 8)]);
}
