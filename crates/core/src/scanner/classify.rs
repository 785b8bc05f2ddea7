//! Line recognizers.
//!
//! Every recognizer works on the comment-stripped, trimmed view of a line and
//! is independent of the others, so the builder can run them one after the
//! other against the same line.

use crate::model::{FunctionKind, UNKNOWN_TYPE};
use once_cell::sync::Lazy;
use regex::Regex;

static MAIN_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^MAIN\b").unwrap());

static HEADER_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:PUBLIC|PRIVATE)\s+)?(FUNCTION|REPORT)\s+(\w+)").unwrap()
});

static HEADER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:PUBLIC|PRIVATE)\s+)?(?:FUNCTION|REPORT)\s+(\w+)\s*").unwrap()
});

static BLOCK_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^END\s+(FUNCTION|REPORT|MAIN)\b").unwrap());

static RETURN_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^RETURN\b\s*(.*)$").unwrap());

static DEFINE_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^DEFINE\s+(.+)$").unwrap());

static RECORD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^DEFINE\s+(\w+)\s+((?:(?:DYNAMIC\s+)?ARRAY\s*(?:\[[^\]]*\])?\s+OF\s+)?RECORD)\b(.*)$",
    )
    .unwrap()
});

static RECORD_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^LIKE\b").unwrap());

static RECORD_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^END\s+RECORD\b").unwrap());

static RECORD_END_INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bEND\s+RECORD\b").unwrap());

static RECORD_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)\s+(.+)$").unwrap());

static NESTED_RECORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^RECORD\b").unwrap());

static CALL_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^CALL\s+([\w.]+)").unwrap());

static BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:IF\b.*\bTHEN|WHILE\b.*|FOR\b.*|FOREACH\b.*|CASE\b.*)$").unwrap()
});

static BLOCK_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^END\s+(?:IF|WHILE|FOR|FOREACH|CASE)\b").unwrap());

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").unwrap());

/// Iterator over the bytes of a line that lie outside `"…"` and `'…'`
/// literals, with their offsets. Quote characters themselves are not
/// yielded and a backslash inside a literal escapes the next byte.
pub struct CodeBytes<'a> {
    bytes: &'a [u8],
    pos: usize,
    quote: Option<u8>,
}

pub fn code_bytes(text: &str) -> CodeBytes<'_> {
    CodeBytes {
        bytes: text.as_bytes(),
        pos: 0,
        quote: None,
    }
}

impl Iterator for CodeBytes<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.bytes.len() {
            let i = self.pos;
            let b = self.bytes[i];
            self.pos += 1;
            match self.quote {
                Some(_) if b == b'\\' => self.pos += 1,
                Some(q) if b == q => self.quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => self.quote = Some(b),
                None => return Some((i, b)),
            }
        }
        None
    }
}

/// Returns the semantic part of a raw line: everything before the first `#`
/// or `--` that is not inside a string literal. The result is a prefix of
/// `raw`, so byte offsets stay valid against the original line.
pub fn strip_comment(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    for (i, b) in code_bytes(raw) {
        if b == b'#' || (b == b'-' && bytes.get(i + 1) == Some(&b'-')) {
            return &raw[..i];
        }
    }
    raw
}

/// Splits `text` on commas that are outside parentheses, brackets and
/// string literals.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, b) in code_bytes(text) {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b',' if depth <= 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Open `(` minus closing `)` outside string literals.
pub fn paren_balance(text: &str) -> i32 {
    code_bytes(text).fold(0, |depth, (_, b)| match b {
        b'(' => depth + 1,
        b')' => depth - 1,
        _ => depth,
    })
}

/// The text inside the parenthesised group `text` starts with, up to the
/// matching `)` or the end of `text` when it is never closed.
fn parenthesised(text: &str) -> Option<&str> {
    if !text.starts_with('(') {
        return None;
    }
    let mut depth = 0i32;
    for (i, b) in code_bytes(text) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[1..i]);
                }
            }
            _ => {}
        }
    }
    Some(&text[1..])
}

pub fn is_main_open(code: &str) -> bool {
    MAIN_OPEN.is_match(code)
}

/// Detects the first line of a `FUNCTION` or `REPORT` header.
pub fn header_open(code: &str) -> Option<FunctionKind> {
    let caps = HEADER_OPEN.captures(code)?;
    if caps[1].eq_ignore_ascii_case("REPORT") {
        Some(FunctionKind::Report)
    } else {
        Some(FunctionKind::Function)
    }
}

/// Whether a header line still waits for the `)` closing its parameter list.
pub fn header_needs_continuation(code: &str) -> bool {
    paren_balance(code) > 0
}

/// Parsed `FUNCTION name(params)` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub parameters: Vec<(String, String)>,
}

pub fn parse_header(statement: &str) -> Option<Header> {
    let caps = HEADER_NAME.captures(statement)?;
    let name = caps[1].to_string();
    let rest = &statement[caps.get(0).map_or(0, |m| m.end())..];
    let parameters = parenthesised(rest)
        .map(parse_parameters)
        .unwrap_or_default();
    Some(Header { name, parameters })
}

/// Splits a raw parameter list into `(name, type)` pairs.
pub fn parse_parameters(list: &str) -> Vec<(String, String)> {
    split_top_level(list)
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut tokens = p.split_whitespace();
            let name = tokens.next().unwrap_or_default().to_string();
            let rest = tokens.collect::<Vec<_>>().join(" ");
            let type_name = if rest.is_empty() {
                UNKNOWN_TYPE.to_string()
            } else {
                rest
            };
            (name, type_name)
        })
        .collect()
}

/// Detects `END FUNCTION`, `END REPORT` and `END MAIN`.
pub fn block_end(code: &str) -> Option<FunctionKind> {
    let caps = BLOCK_END.captures(code)?;
    let kind = match caps[1].to_ascii_uppercase().as_str() {
        "REPORT" => FunctionKind::Report,
        "MAIN" => FunctionKind::Main,
        _ => FunctionKind::Function,
    };
    Some(kind)
}

/// Returns the expression list following `RETURN`, possibly empty.
pub fn return_list(code: &str) -> Option<&str> {
    RETURN_STMT
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Splits a `RETURN` list into the bare identifiers it contains.
pub fn return_identifiers(list: &str) -> Vec<&str> {
    split_top_level(list)
        .into_iter()
        .map(str::trim)
        .filter(|item| IDENTIFIER.is_match(item))
        .collect()
}

/// Returns the body of a `DEFINE` statement.
pub fn define_body(code: &str) -> Option<&str> {
    DEFINE_STMT
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Expands a declaration list such as `a, b INTEGER, c STRING` into
/// `(name, type)` pairs in source order. Names left without a type at the end
/// of the list are `unknown`.
pub fn parse_declarations(body: &str) -> Vec<(String, String)> {
    let mut declared = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for item in split_top_level(body).into_iter().map(str::trim) {
        if item.is_empty() {
            continue;
        }
        let (name, rest) = match item.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (item, ""),
        };
        if !IDENTIFIER.is_match(name) {
            continue;
        }
        if rest.is_empty() {
            pending.push(name.to_string());
            continue;
        }
        for waiting in pending.drain(..) {
            declared.push((waiting, rest.to_string()));
        }
        declared.push((name.to_string(), rest.to_string()));
    }

    for waiting in pending {
        declared.push((waiting, UNKNOWN_TYPE.to_string()));
    }
    declared
}

/// Record declaration found on a `DEFINE` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub name: String,
    /// Declared type of the record variable itself, e.g. `RECORD` or
    /// `DYNAMIC ARRAY OF RECORD LIKE customer.*`.
    pub type_name: String,
    /// Fields written on the `DEFINE` line itself.
    pub fields: Vec<(String, String)>,
    /// Whether the following lines hold fields up to `END RECORD`. False for
    /// `RECORD LIKE table.*` and for records closed on the same line.
    pub has_body: bool,
}

pub fn record_header(code: &str) -> Option<RecordHeader> {
    let caps = RECORD_DECL.captures(code)?;
    let name = caps[1].to_string();
    let keyword = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");
    let rest = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();

    if RECORD_LIKE.is_match(rest) {
        return Some(RecordHeader {
            name,
            type_name: format!("{} {}", keyword, rest),
            fields: Vec::new(),
            has_body: false,
        });
    }

    let (inline, has_body) = match RECORD_END_INLINE.find(rest) {
        Some(end) => (&rest[..end.start()], false),
        None => (rest, true),
    };
    let fields = split_top_level(inline)
        .into_iter()
        .filter_map(|item| record_field(item.trim()))
        .collect();
    Some(RecordHeader {
        name,
        type_name: keyword,
        fields,
        has_body,
    })
}

pub fn is_record_end(code: &str) -> bool {
    RECORD_END.is_match(code)
}

/// Parses `name type` inside a record body. The type stops at the first
/// top-level comma.
pub fn record_field(code: &str) -> Option<(String, String)> {
    let caps = RECORD_FIELD.captures(code)?;
    let type_name = split_top_level(&caps[2])
        .into_iter()
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if type_name.is_empty() {
        return None;
    }
    Some((caps[1].to_string(), type_name.to_string()))
}

/// Whether a record field opens a nested `RECORD … END RECORD` body.
pub fn opens_nested_record(field_type: &str) -> bool {
    NESTED_RECORD.is_match(field_type) && !field_type.to_ascii_uppercase().contains(" LIKE ")
}

pub fn call_target(code: &str) -> Option<&str> {
    CALL_STMT
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.'))
}

/// `IF … THEN`, `WHILE`, `FOR`, `FOREACH` and `CASE` openers.
pub fn opens_nesting(code: &str) -> bool {
    BLOCK_OPEN.is_match(code) && !BLOCK_CLOSE.is_match(code)
}

pub fn closes_nesting(code: &str) -> bool {
    BLOCK_CLOSE.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_comment_stops_at_hash_and_double_dash() {
        assert_eq!(strip_comment("LET x = 1 # note"), "LET x = 1 ");
        assert_eq!(strip_comment("LET x = 1 -- note"), "LET x = 1 ");
        assert_eq!(strip_comment("# whole line"), "");
    }

    #[test]
    fn strip_comment_ignores_markers_inside_strings() {
        assert_eq!(
            strip_comment(r#"DISPLAY "a # b" # real"#),
            r#"DISPLAY "a # b" "#
        );
        assert_eq!(strip_comment("LET s = '--'"), "LET s = '--'");
    }

    #[test]
    fn header_detection_is_case_insensitive() {
        assert_eq!(header_open("function f(a)"), Some(FunctionKind::Function));
        assert_eq!(header_open("PUBLIC FUNCTION f()"), Some(FunctionKind::Function));
        assert_eq!(header_open("REPORT rep(r)"), Some(FunctionKind::Report));
        assert_eq!(header_open("END FUNCTION"), None);
    }

    #[test]
    fn parse_header_reads_name_and_typed_parameters() {
        let header = parse_header("FUNCTION f(a b, c d)").unwrap();
        assert_eq!(header.name, "f");
        assert_eq!(
            header.parameters,
            vec![("a".into(), "b".into()), ("c".into(), "d".into())]
        );
    }

    #[test]
    fn parameters_without_type_are_unknown() {
        assert_eq!(
            parse_parameters("a, b"),
            vec![("a".into(), "unknown".into()), ("b".into(), "unknown".into())]
        );
        assert!(parse_parameters("  ").is_empty());
    }

    #[test]
    fn header_without_closing_paren_still_parses() {
        let header = parse_header("FUNCTION f(a b, c").unwrap();
        assert_eq!(header.parameters.len(), 2);
        assert!(header_needs_continuation("FUNCTION f(a b,"));
        assert!(!header_needs_continuation("FUNCTION f(a b)"));
    }

    #[test]
    fn parameter_types_may_contain_parentheses() {
        let header = parse_header("FUNCTION f(a DECIMAL(10,2), b INTEGER) RETURNS INTEGER").unwrap();
        assert_eq!(
            header.parameters,
            vec![
                ("a".into(), "DECIMAL(10,2)".into()),
                ("b".into(), "INTEGER".into()),
            ]
        );
        assert!(header_needs_continuation("FUNCTION f(a DECIMAL(10,2),"));
        assert!(!header_needs_continuation("FUNCTION f(a DECIMAL(10,2))"));
    }

    #[test]
    fn code_bytes_skip_literals_and_escapes() {
        let outside: String = code_bytes(r#"a"x\",y"b'c'd"#).map(|(_, b)| b as char).collect();
        assert_eq!(outside, "abd");
        assert_eq!(strip_comment(r##"DISPLAY "a\"#" # note"##), r##"DISPLAY "a\"#" "##);
        assert_eq!(split_top_level(r#""a\",b", c"#), vec![r#""a\",b""#, " c"]);
    }

    #[test]
    fn block_end_kinds() {
        assert_eq!(block_end("END FUNCTION"), Some(FunctionKind::Function));
        assert_eq!(block_end("end report"), Some(FunctionKind::Report));
        assert_eq!(block_end("END MAIN"), Some(FunctionKind::Main));
        assert_eq!(block_end("END IF"), None);
    }

    #[test]
    fn declarations_share_trailing_type() {
        assert_eq!(
            parse_declarations("a, b INTEGER, c STRING"),
            vec![
                ("a".into(), "INTEGER".into()),
                ("b".into(), "INTEGER".into()),
                ("c".into(), "STRING".into()),
            ]
        );
    }

    #[test]
    fn declarations_keep_parenthesised_types_whole() {
        assert_eq!(
            parse_declarations("amount DECIMAL(10,2)"),
            vec![("amount".into(), "DECIMAL(10,2)".into())]
        );
    }

    #[test]
    fn one_line_record_is_closed_on_its_header() {
        let header = record_header("DEFINE r RECORD id INTEGER, name STRING END RECORD").unwrap();
        assert_eq!(header.name, "r");
        assert_eq!(header.type_name, "RECORD");
        assert!(!header.has_body);
        assert_eq!(
            header.fields,
            vec![("id".into(), "INTEGER".into()), ("name".into(), "STRING".into())]
        );

        let open = record_header("DEFINE r RECORD id INTEGER,").unwrap();
        assert!(open.has_body);
        assert_eq!(open.fields, vec![("id".into(), "INTEGER".into())]);
    }

    #[test]
    fn record_headers() {
        let plain = record_header("DEFINE r RECORD").unwrap();
        assert_eq!(plain.name, "r");
        assert!(plain.has_body);

        let like = record_header("DEFINE r RECORD LIKE customer.*").unwrap();
        assert!(!like.has_body);
        assert_eq!(like.type_name, "RECORD LIKE customer.*");

        let array = record_header("DEFINE arr DYNAMIC ARRAY OF RECORD").unwrap();
        assert_eq!(array.name, "arr");
        assert_eq!(array.type_name, "DYNAMIC ARRAY OF RECORD");
        assert!(array.has_body);

        assert!(record_header("DEFINE x INTEGER").is_none());
    }

    #[test]
    fn record_field_type_stops_at_comma() {
        assert_eq!(
            record_field("id INTEGER,"),
            Some(("id".into(), "INTEGER".into()))
        );
        assert_eq!(
            record_field("total DECIMAL(10,2),"),
            Some(("total".into(), "DECIMAL(10,2)".into()))
        );
        assert_eq!(record_field("lonely"), None);
    }

    #[test]
    fn call_targets_may_be_dotted() {
        assert_eq!(call_target("CALL foo()"), Some("foo"));
        assert_eq!(call_target("call ui.Interface.refresh()"), Some("ui.Interface.refresh"));
        assert_eq!(call_target("LET x = foo()"), None);
    }

    #[test]
    fn nesting_markers() {
        assert!(opens_nesting("IF x > 1 THEN"));
        assert!(!opens_nesting("IF x > 1 THEN CALL f()"));
        assert!(opens_nesting("WHILE i < 10"));
        assert!(closes_nesting("END WHILE"));
        assert!(!opens_nesting("END IF"));
    }

    #[test]
    fn return_identifiers_skip_expressions() {
        assert_eq!(return_identifiers("a, b + 1, f(x, y), c"), vec!["a", "c"]);
    }
}
