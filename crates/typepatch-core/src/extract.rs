//! Python function extraction over a tree-sitter syntax tree.
//!
//! Walks the whole tree in pre-order, so records come out in source order with
//! nested definitions following their parent. `async def` nodes are skipped
//! (their nested plain `def`s are still collected).

use std::path::Path;

use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::ExtractError;
use crate::function::{
    ArgShape, CallSite, Callee, FunctionRecord, KeywordArg, LineSpan, ParamKind, Parameter,
};

/// Parses Python source and collects its function definitions.
///
/// Holds one parser; reuse it across files.
pub struct Extractor {
    parser: Parser,
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Extract every non-async function definition in `source`.
    ///
    /// The whole file fails with [`ExtractError::Syntax`] at the first
    /// offending node: error or missing nodes, Python 2 `print`/`exec`
    /// statements, and statements whose indentation does not line up with
    /// their block.
    pub fn extract(
        &mut self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<FunctionRecord>, ExtractError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::NoTree(path.to_path_buf()))?;
        let root = tree.root_node();

        if let Some(at) = first_fault(root) {
            let pos = at.start_position();
            return Err(ExtractError::Syntax {
                path: path.to_path_buf(),
                line: pos.row + 1,
                column: pos.column + 1,
            });
        }

        let mut records = Vec::new();
        preorder(root, |node| {
            if node.kind() == "function_definition" && !is_async(node) {
                records.push(build_record(path, node, source));
            }
        });

        debug!(path = %path.display(), count = records.len(), "extracted functions");
        Ok(records)
    }
}

/// Visit `root` and all its descendants in pre-order.
fn preorder<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// First node that makes the file invalid Python 3.
///
/// tree-sitter recovers from more than CPython does, so a clean tree is not
/// enough on its own.
fn first_fault(root: Node<'_>) -> Option<Node<'_>> {
    let mut found = None;
    preorder(root, |node| {
        if found.is_some() {
            return;
        }
        if node.is_error() || node.is_missing() {
            found = Some(node);
        } else if matches!(node.kind(), "print_statement" | "exec_statement") {
            found = Some(node);
        } else if matches!(node.kind(), "module" | "block") {
            found = misaligned_statement(node);
        }
    });
    found
}

/// A statement in `container` that starts a line at a different column than
/// its siblings. Module statements must start at column 0.
///
/// The scanner only emits a dedent when a line is shallower than the current
/// block, so `  y = 1` after a four-space body parses as a sibling of the
/// `def` instead of failing.
fn misaligned_statement(container: Node<'_>) -> Option<Node<'_>> {
    let mut expected = (container.kind() == "module").then_some(0);
    let mut prev_end_row: Option<usize> = None;
    let mut cursor = container.walk();
    for stmt in container.named_children(&mut cursor) {
        if matches!(stmt.kind(), "comment" | "line_continuation") {
            continue;
        }
        let start = stmt.start_position();
        // `a; b` shares a line with the previous statement.
        let starts_line = prev_end_row.is_none_or(|row| start.row > row);
        prev_end_row = Some(stmt.end_position().row);
        if !starts_line {
            continue;
        }
        match expected {
            None => expected = Some(start.column),
            Some(column) if column != start.column => return Some(stmt),
            Some(_) => {}
        }
    }
    None
}

fn is_async(node: Node<'_>) -> bool {
    node.child(0).is_some_and(|c| c.kind() == "async")
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn build_record(path: &Path, node: Node<'_>, source: &str) -> FunctionRecord {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    let params = node
        .child_by_field_name("parameters")
        .map(|p| collect_params(p, source))
        .unwrap_or_default();

    let mut calls = Vec::new();
    preorder(node, |n| {
        if n.kind() == "call" {
            calls.push(call_site(n, source));
        }
    });

    FunctionRecord {
        name,
        params,
        span: line_span(node),
        path: path.to_path_buf(),
        calls,
    }
}

/// Lines from the `def` keyword through the last token of the body.
///
/// The definition node itself also covers comments indented at body level
/// after the last statement, so the end comes from the last non-comment token.
fn line_span(node: Node<'_>) -> LineSpan {
    let start = node.start_position().row;
    let mut end = start;
    preorder(node, |n| {
        if n.child_count() == 0 && n.kind() != "comment" && n.end_byte() > n.start_byte() {
            end = end.max(n.end_position().row);
        }
    });
    LineSpan {
        start: start + 1,
        end: end + 1,
    }
}

fn collect_params(list: Node<'_>, source: &str) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = Vec::new();
    let mut keyword_only = false;
    let mut cursor = list.walk();

    let slot = |keyword_only: bool| {
        if keyword_only {
            ParamKind::KeywordOnly
        } else {
            ParamKind::PositionalOrKeyword
        }
    };

    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => params.push(Parameter {
                name: text(child, source).to_string(),
                annotated: false,
                kind: slot(keyword_only),
            }),
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = child.child_by_field_name("name") {
                    params.push(Parameter {
                        name: text(name, source).to_string(),
                        annotated: child.kind() == "typed_default_parameter",
                        kind: slot(keyword_only),
                    });
                }
            }
            "typed_parameter" => {
                let Some(inner) = child.named_child(0) else {
                    continue;
                };
                let kind = match inner.kind() {
                    "list_splat_pattern" => {
                        keyword_only = true;
                        ParamKind::VarPositional
                    }
                    "dictionary_splat_pattern" => ParamKind::VarKeyword,
                    _ => slot(keyword_only),
                };
                params.push(Parameter {
                    name: splat_name(inner, source),
                    annotated: true,
                    kind,
                });
            }
            "list_splat_pattern" => {
                keyword_only = true;
                params.push(Parameter {
                    name: splat_name(child, source),
                    annotated: false,
                    kind: ParamKind::VarPositional,
                });
            }
            "dictionary_splat_pattern" => params.push(Parameter {
                name: splat_name(child, source),
                annotated: false,
                kind: ParamKind::VarKeyword,
            }),
            "keyword_separator" => keyword_only = true,
            "positional_separator" => {
                for p in params
                    .iter_mut()
                    .filter(|p| p.kind == ParamKind::PositionalOrKeyword)
                {
                    p.kind = ParamKind::PositionalOnly;
                }
            }
            _ => {}
        }
    }
    params
}

/// Name bound by a parameter pattern, without `*`/`**`.
fn splat_name(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "list_splat_pattern" | "dictionary_splat_pattern" => node
            .named_child(0)
            .map(|n| text(n, source).to_string())
            .unwrap_or_else(|| text(node, source).trim_start_matches('*').to_string()),
        _ => text(node, source).to_string(),
    }
}

fn call_site(node: Node<'_>, source: &str) -> CallSite {
    let callee = match node.child_by_field_name("function") {
        Some(f) if f.kind() == "identifier" => Callee::Name(text(f, source).to_string()),
        Some(f) if f.kind() == "attribute" => {
            match (
                f.child_by_field_name("object"),
                f.child_by_field_name("attribute"),
            ) {
                (Some(object), Some(attr)) => Callee::Attribute {
                    object: text(object, source).to_string(),
                    attr: text(attr, source).to_string(),
                },
                _ => Callee::Other,
            }
        }
        _ => Callee::Other,
    };

    let mut positional = Vec::new();
    let mut keywords = Vec::new();

    if let Some(args) = node.child_by_field_name("arguments") {
        if args.kind() == "argument_list" {
            let mut cursor = args.walk();
            for arg in args.named_children(&mut cursor) {
                match arg.kind() {
                    "comment" | "dictionary_splat" => {}
                    "keyword_argument" => {
                        if let (Some(name), Some(value)) = (
                            arg.child_by_field_name("name"),
                            arg.child_by_field_name("value"),
                        ) {
                            keywords.push(KeywordArg {
                                name: text(name, source).to_string(),
                                value: arg_shape(value, source),
                            });
                        }
                    }
                    _ => positional.push(arg_shape(arg, source)),
                }
            }
        } else {
            // `f(x for x in xs)`: a lone generator argument.
            positional.push(ArgShape::Other);
        }
    }

    CallSite {
        callee,
        positional,
        keywords,
        line: node.start_position().row + 1,
    }
}

fn arg_shape(node: Node<'_>, source: &str) -> ArgShape {
    let mut node = node;
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => return ArgShape::Other,
        }
    }
    if node.kind() == "identifier" {
        ArgShape::Name(text(node, source).to_string())
    } else {
        ArgShape::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"def greet(name: str):
    print("Hello", name)

def safe_greet(name: str):
    if not isinstance(name, str):
        raise TypeError("name must be a string")
    print("Hello", name)

def add(a: int, b: int):
    return a + b"#;

    fn extract(src: &str) -> Vec<FunctionRecord> {
        Extractor::new()
            .unwrap()
            .extract(&PathBuf::from("sample.py"), src)
            .unwrap()
    }

    fn names(records: &[FunctionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn sample_functions_in_source_order() {
        let funcs = extract(SAMPLE);
        assert_eq!(names(&funcs), vec!["greet", "safe_greet", "add"]);
        assert_eq!(funcs[0].span, LineSpan { start: 1, end: 2 });
        assert_eq!(funcs[1].span, LineSpan { start: 4, end: 7 });
        assert_eq!(funcs[2].span, LineSpan { start: 9, end: 10 });
        assert!(funcs.iter().all(|f| f.path == PathBuf::from("sample.py")));
    }

    #[test]
    fn source_text_is_verbatim() {
        let funcs = extract(SAMPLE);
        assert_eq!(
            funcs[1].source_text(SAMPLE),
            "def safe_greet(name: str):\n    if not isinstance(name, str):\n        raise TypeError(\"name must be a string\")\n    print(\"Hello\", name)"
        );
        assert_eq!(funcs[2].source_text(SAMPLE), "def add(a: int, b: int):\n    return a + b");
    }

    #[test]
    fn span_ends_at_last_body_line() {
        let src = "x = 1\n\ndef f(a: int):\n    y = a\n\n    return y\n\n\nz = 2\n";
        let funcs = extract(src);
        assert_eq!(funcs[0].span, LineSpan { start: 3, end: 6 });
        assert_eq!(
            funcs[0].source_text(src),
            "def f(a: int):\n    y = a\n\n    return y"
        );
    }

    #[test]
    fn trailing_indented_comment_is_not_part_of_span() {
        let src = "def f(a: int):\n    return a\n    # trailing note\n\nx = 1\n";
        let funcs = extract(src);
        assert_eq!(funcs[0].span, LineSpan { start: 1, end: 2 });
        assert_eq!(funcs[0].source_text(src), "def f(a: int):\n    return a");
    }

    #[test]
    fn comment_after_final_compound_statement_is_dropped() {
        let src = "\
def f(a: int):
    if a:
        a += 1
        # bumped
    # done

def g(b: str):
    for c in b:
        print(c)  # inline
            # over-indented
";
        let funcs = extract(src);
        assert_eq!(funcs[0].span, LineSpan { start: 1, end: 3 });
        assert_eq!(funcs[1].span, LineSpan { start: 7, end: 9 });
        assert_eq!(
            funcs[1].source_text(src),
            "def g(b: str):\n    for c in b:\n        print(c)  # inline"
        );
    }

    #[test]
    fn multiline_expression_ends_at_closing_token() {
        let src = "def f(a: int):\n    return g(\n        a,\n        # note\n    )\n";
        assert_eq!(extract(src)[0].span, LineSpan { start: 1, end: 5 });
    }

    #[test]
    fn nested_definitions_follow_their_parent() {
        let src = "\
def outer(a: int):
    def inner(b: str):
        return b
    return inner

class Greeter:
    def hello(self, who: str):
        return who

def last():
    pass
";
        let funcs = extract(src);
        assert_eq!(names(&funcs), vec!["outer", "inner", "hello", "last"]);
        assert_eq!(funcs[0].span, LineSpan { start: 1, end: 4 });
        assert_eq!(funcs[1].span, LineSpan { start: 2, end: 3 });
    }

    #[test]
    fn async_def_skipped_but_nested_def_kept() {
        let src = "\
async def fetch(url: str):
    def parse(body: bytes):
        return body
    return parse
";
        let funcs = extract(src);
        assert_eq!(names(&funcs), vec!["parse"]);
    }

    #[test]
    fn decorated_span_starts_at_def() {
        let src = "@cache\n@trace(level=2)\ndef f(a: int):\n    return a\n";
        let funcs = extract(src);
        assert_eq!(funcs[0].span, LineSpan { start: 3, end: 4 });
    }

    #[test]
    fn parameter_kinds() {
        let src = "def f(a, /, b: int, *args: str, c: int = 1, d=2, **kw):\n    pass\n";
        let params = &extract(src)[0].params;
        let got: Vec<(&str, bool, ParamKind)> = params
            .iter()
            .map(|p| (p.name.as_str(), p.annotated, p.kind))
            .collect();
        assert_eq!(
            got,
            vec![
                ("a", false, ParamKind::PositionalOnly),
                ("b", true, ParamKind::PositionalOrKeyword),
                ("args", true, ParamKind::VarPositional),
                ("c", true, ParamKind::KeywordOnly),
                ("d", false, ParamKind::KeywordOnly),
                ("kw", false, ParamKind::VarKeyword),
            ]
        );
    }

    #[test]
    fn bare_star_makes_keyword_only() {
        let src = "def g(self, a: int = 0, *, b: str, **extra: object):\n    pass\n";
        let params = &extract(src)[0].params;
        let kinds: Vec<ParamKind> = params.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParamKind::PositionalOrKeyword,
                ParamKind::PositionalOrKeyword,
                ParamKind::KeywordOnly,
                ParamKind::VarKeyword,
            ]
        );
        assert_eq!(params[3].name, "extra");
        assert!(params[3].annotated);
    }

    #[test]
    fn call_shapes() {
        let src = "\
def f(x: int, xs: list):
    isinstance((x), int)
    check(value=x)
    typeguard.check_type(x, int)
    foo(*xs)
    any(v for v in xs)
    lookup[0](x)
";
        let calls = &extract(src)[0].calls;
        assert_eq!(calls.len(), 6);

        assert_eq!(calls[0].callee, Callee::Name("isinstance".into()));
        assert_eq!(
            calls[0].positional,
            vec![ArgShape::Name("x".into()), ArgShape::Name("int".into())]
        );
        assert_eq!(calls[0].line, 2);

        assert!(calls[1].positional.is_empty());
        assert_eq!(
            calls[1].keywords,
            vec![KeywordArg {
                name: "value".into(),
                value: ArgShape::Name("x".into()),
            }]
        );

        assert_eq!(
            calls[2].callee,
            Callee::Attribute {
                object: "typeguard".into(),
                attr: "check_type".into(),
            }
        );
        assert_eq!(calls[3].positional, vec![ArgShape::Other]);
        assert_eq!(calls[4].positional, vec![ArgShape::Other]);
        assert_eq!(calls[5].callee, Callee::Other);
    }

    #[test]
    fn nested_calls_are_collected() {
        let src = "\
def f(x: int):
    def g():
        return isinstance(x, int)
    return print(len(str(x)))
";
        let calls = &extract(src)[0].calls;
        let callees: Vec<&Callee> = calls.iter().map(|c| &c.callee).collect();
        assert_eq!(
            callees,
            vec![
                &Callee::Name("isinstance".into()),
                &Callee::Name("print".into()),
                &Callee::Name("len".into()),
                &Callee::Name("str".into()),
            ]
        );
    }

    #[test]
    fn syntax_error_reports_location() {
        let err = Extractor::new()
            .unwrap()
            .extract(&PathBuf::from("bad.py"), "def broken(:\n    pass\n")
            .unwrap_err();
        match err {
            ExtractError::Syntax { path, line, .. } => {
                assert_eq!(path, PathBuf::from("bad.py"));
                assert_eq!(line, 1);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn missing_token_is_a_syntax_error() {
        let err = Extractor::new()
            .unwrap()
            .extract(&PathBuf::from("bad.py"), "def ok():\n    return 1\n\nx = (1 + 2\n")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Syntax { .. }));
    }

    fn syntax_line(src: &str) -> usize {
        match Extractor::new()
            .unwrap()
            .extract(&PathBuf::from("bad.py"), src)
        {
            Err(ExtractError::Syntax { line, .. }) => line,
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn python2_statements_are_syntax_errors() {
        assert_eq!(syntax_line("def greet(name: str):\n    print \"Hello\", name\n"), 2);
        assert_eq!(syntax_line("def f(a: int):\n    exec \"x = 1\"\n"), 2);
    }

    #[test]
    fn python3_print_call_is_accepted() {
        let funcs = extract("def f(a: int):\n    print(\"a\", a)\n    print()\n");
        assert_eq!(names(&funcs), vec!["f"]);
    }

    #[test]
    fn misaligned_dedent_is_a_syntax_error() {
        assert_eq!(syntax_line("def f(a: int):\n    return a\n  y = 1\n"), 3);
        assert_eq!(
            syntax_line("def f(a: int):\n    if a:\n        a = 1\n      return a\n"),
            4
        );
        assert_eq!(syntax_line("  x = 1\n"), 1);
    }

    #[test]
    fn same_line_statements_and_inline_blocks_are_aligned() {
        let src = "\
import os; import sys
def f(a: int):
    x = a; y = x
    # aligned comment
    if a: return y
    return x
";
        assert_eq!(names(&extract(src)), vec!["f"]);
    }

    #[test]
    fn empty_file_has_no_functions() {
        assert!(extract("").is_empty());
        assert!(extract("# just a comment\nimport os\n").is_empty());
    }

    #[test]
    fn extractor_is_reusable() {
        let mut ex = Extractor::new().unwrap();
        let a = ex.extract(&PathBuf::from("a.py"), SAMPLE).unwrap();
        let b = ex
            .extract(&PathBuf::from("b.py"), "def only(x):\n    return x\n")
            .unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(names(&b), vec!["only"]);
        assert_eq!(b[0].path, PathBuf::from("b.py"));
    }
}
