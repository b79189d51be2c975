//! Code extractor.
//!
//! Pulls an allow-listed set of named function declarations out of a student's
//! script and synthesizes a minimal CommonJS module from them. Everything else
//! in the file (top-level statements, event wiring, stray globals) is
//! discarded, so no student code outside the graded functions can run as a
//! side effect of grading.
//!
//! The scanner is a single pass over the source that understands just enough
//! JavaScript to find top-level declarations reliably: strings, template
//! literals (with nested `${}` interpolations), comments, regex literals, and
//! balanced bracket groups. It does not build a full AST; it only needs
//! verbatim spans of `function name(params) { body }` declarations at nesting
//! depth zero. Function *expressions* (`var f = function() {}`), named or not,
//! are stepped over like any other expression and never retained.

use crate::error::ParseError;
use std::collections::HashMap;

/// Keywords after which a `/` starts a regex literal rather than division.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// The ordered, allow-listed function fragments extracted from one source file.
#[derive(Debug, Clone)]
pub struct ExtractedFunctionSet {
    functions: Vec<(String, String)>,
}

impl ExtractedFunctionSet {
    /// Names of the retained functions, in allow-list order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|(name, _)| name.as_str())
    }

    /// Verbatim source of one retained function, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, src)| src.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Renders the synthesized module: the retained fragments concatenated in
    /// order, followed by an export statement listing exactly those names.
    ///
    /// A requested-but-absent function is simply not exported; the hidden test
    /// suite then sees `undefined` and reports ordinary test failures.
    pub fn module_source(&self) -> String {
        let mut out = String::new();
        for (_, src) in &self.functions {
            out.push_str(src);
            out.push_str("\n\n");
        }
        let names: Vec<&str> = self.names().collect();
        out.push_str(&format!("module.exports = {{ {} }};\n", names.join(", ")));
        out
    }
}

/// Extracts the allow-listed top-level function declarations from `source`.
///
/// Fragments are returned in the order `allowed` declares them, not source
/// order. When the same name is declared twice, the later declaration wins,
/// matching how the script itself would behave. Fails with [`ParseError`] when
/// the source cannot be scanned (unterminated literal or comment, unbalanced
/// brackets, malformed function head).
pub fn extract(source: &str, allowed: &[&str]) -> Result<ExtractedFunctionSet, ParseError> {
    let mut scanner = Scanner::new(source);
    let mut found: HashMap<String, String> = HashMap::new();

    loop {
        scanner.skip_trivia()?;
        if scanner.at_end() {
            break;
        }

        let start = scanner.pos;
        let at_statement = scanner.prev == PrevToken::StatementStart;
        match scanner.advance_atom()? {
            // Only a `function` in statement position is a declaration; after
            // an operator (`=`, `(`, `,`, `return`) it is a function
            // expression, which is stepped over and never retained.
            Atom::Ident("function") if at_statement => {
                let (fn_name, end) = scanner.finish_function_declaration()?;
                found.insert(fn_name, source[start..end].to_string());
            }
            Atom::Ident("function") => scanner.finish_function_expression()?,
            _ => {}
        }
    }

    let functions = allowed
        .iter()
        .filter_map(|name| found.get(*name).map(|src| (name.to_string(), src.clone())))
        .collect();

    Ok(ExtractedFunctionSet { functions })
}

/// What the scanner just stepped over, as far as regex disambiguation cares.
enum Atom<'a> {
    Ident(&'a str),
    /// String, template, number, or regex literal.
    Literal,
    /// A bracketed group `(…)`, `[…]`, or `{…}`.
    Group(u8),
    Punct(u8),
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Last significant atom, used to decide whether `/` starts a regex.
    prev: PrevToken,
}

#[derive(Clone, Copy, PartialEq)]
enum PrevToken {
    /// Start of input or a statement boundary (`;`, a closed block). The only
    /// position where a `function` keyword begins a declaration.
    StatementStart,
    /// An operator or other token after which an expression begins; a
    /// `function` here is a function expression, and a `/` starts a regex.
    Operator,
    /// An identifier or literal; a `/` here is division.
    Value,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            prev: PrevToken::StatementStart,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Skips whitespace and comments. Errors on an unterminated block comment.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            match (self.peek(), self.peek_at(1)) {
                (Some(b'/'), Some(b'/')) => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some(b'*'), Some(b'/')) => {
                                self.pos += 2;
                                break;
                            }
                            (None, _) => {
                                return Err(ParseError::new(start, "unterminated block comment"));
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Steps over one atom: identifier, literal, bracketed group, or punctuation.
    fn advance_atom(&mut self) -> Result<Atom<'a>, ParseError> {
        let start = self.pos;
        let b = self
            .peek()
            .ok_or_else(|| ParseError::new(start, "unexpected end of input"))?;

        let atom = match b {
            b'"' | b'\'' => {
                self.consume_string(b)?;
                Atom::Literal
            }
            b'`' => {
                self.consume_template()?;
                Atom::Literal
            }
            b'(' => {
                self.consume_group(b'(', b')')?;
                Atom::Group(b'(')
            }
            b'[' => {
                self.consume_group(b'[', b']')?;
                Atom::Group(b'[')
            }
            b'{' => {
                self.consume_group(b'{', b'}')?;
                Atom::Group(b'{')
            }
            b')' | b']' | b'}' => {
                return Err(ParseError::new(
                    start,
                    format!("unbalanced closing '{}'", b as char),
                ));
            }
            b'/' if self.prev != PrevToken::Value => {
                self.consume_regex()?;
                Atom::Literal
            }
            _ if is_ident_start(b) => {
                let name = self.consume_ident();
                Atom::Ident(name)
            }
            _ if b.is_ascii_digit() => {
                self.consume_number();
                Atom::Literal
            }
            _ => {
                self.pos += 1;
                Atom::Punct(b)
            }
        };

        self.prev = match &atom {
            Atom::Ident(name) if REGEX_PRECEDING_KEYWORDS.contains(name) => PrevToken::Operator,
            Atom::Ident(_) | Atom::Literal => PrevToken::Value,
            // After `)` or `]` a slash is division; after a `{…}` block or a
            // `;` the scanner is back at a statement boundary.
            Atom::Group(b'(') | Atom::Group(b'[') => PrevToken::Value,
            Atom::Group(_) | Atom::Punct(b';') => PrevToken::StatementStart,
            Atom::Punct(_) => PrevToken::Operator,
        };

        Ok(atom)
    }

    /// Consumes a bracketed group from its opener to the matching closer.
    fn consume_group(&mut self, open: u8, close: u8) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();
        self.prev = PrevToken::Operator;
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => {
                    return Err(ParseError::new(
                        start,
                        format!("unclosed '{}' group", open as char),
                    ));
                }
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b) if b == b')' || b == b']' || b == b'}' => {
                    return Err(ParseError::new(
                        self.pos,
                        format!("mismatched closing '{}'", b as char),
                    ));
                }
                Some(_) => {
                    self.advance_atom()?;
                }
            }
        }
    }

    fn consume_string(&mut self, quote: u8) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None => return Err(ParseError::new(start, "unterminated string literal")),
                Some(b'\\') => {
                    self.bump();
                }
                Some(b) if b == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn consume_template(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                None => return Err(ParseError::new(start, "unterminated template literal")),
                Some(b'\\') => {
                    self.pos += 1;
                    self.bump();
                }
                Some(b'`') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => {
                    self.pos += 1;
                    // The interpolation body is ordinary expression code.
                    self.consume_group(b'{', b'}')?;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn consume_regex(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some(b'\n') => {
                    return Err(ParseError::new(start, "unterminated regular expression"));
                }
                Some(b'\\') => {
                    self.bump();
                }
                Some(b'[') => in_class = true,
                Some(b']') => in_class = false,
                Some(b'/') if !in_class => break,
                Some(_) => {}
            }
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        Ok(())
    }

    fn consume_ident(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_ident_continue(b)) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn consume_number(&mut self) {
        // Loose: covers decimals, exponents, and hex/binary prefixes without
        // validating them. Only the span boundary matters here.
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'.' || b == b'_')
        {
            self.pos += 1;
        }
    }

    /// Called just after the `function` keyword; consumes the rest of the
    /// declaration and returns its name and end offset.
    fn finish_function_declaration(&mut self) -> Result<(String, usize), ParseError> {
        self.skip_trivia()?;
        if self.peek() == Some(b'*') {
            self.pos += 1;
            self.skip_trivia()?;
        }

        if !matches!(self.peek(), Some(b) if is_ident_start(b)) {
            return Err(ParseError::new(self.pos, "expected function name"));
        }
        let name = self.consume_ident().to_string();

        self.skip_trivia()?;
        if self.peek() != Some(b'(') {
            return Err(ParseError::new(self.pos, "expected parameter list"));
        }
        self.consume_group(b'(', b')')?;

        self.skip_trivia()?;
        if self.peek() != Some(b'{') {
            return Err(ParseError::new(self.pos, "expected function body"));
        }
        self.consume_group(b'{', b'}')?;
        self.prev = PrevToken::StatementStart;

        Ok((name, self.pos))
    }

    /// Called just after a `function` keyword in expression position; steps
    /// over the whole (optionally named) function expression.
    fn finish_function_expression(&mut self) -> Result<(), ParseError> {
        self.skip_trivia()?;
        if self.peek() == Some(b'*') {
            self.pos += 1;
            self.skip_trivia()?;
        }
        if matches!(self.peek(), Some(b) if is_ident_start(b)) {
            self.consume_ident();
            self.skip_trivia()?;
        }

        if self.peek() != Some(b'(') {
            return Err(ParseError::new(self.pos, "expected parameter list"));
        }
        self.consume_group(b'(', b')')?;

        self.skip_trivia()?;
        if self.peek() != Some(b'{') {
            return Err(ParseError::new(self.pos, "expected function body"));
        }
        self.consume_group(b'{', b'}')?;
        // A function expression is a value; a following `/` is division.
        self.prev = PrevToken::Value;
        Ok(())
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["validateDate", "validateTime", "calculatePriority"];

    #[test]
    fn extracts_allow_listed_functions_verbatim() {
        let source = r#"
function validateDate(date) {
    return date.includes("/");
}

function helper() { return 42; }

function validateTime(time) {
    // a comment with a brace {
    return time.length === 5;
}
"#;
        let set = extract(source, ALLOWED).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get("validateDate").unwrap().starts_with("function validateDate"));
        assert!(set.get("validateDate").unwrap().ends_with('}'));
        assert!(set.get("helper").is_none());
    }

    #[test]
    fn fragments_follow_allow_list_order_not_source_order() {
        let source = "function validateTime(t) {}\nfunction validateDate(d) {}";
        let set = extract(source, ALLOWED).unwrap();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["validateDate", "validateTime"]);
    }

    #[test]
    fn top_level_statements_are_discarded() {
        let source = r#"
let counter = 0;
document.addEventListener("click", () => { counter += 1; });
function validateDate(d) { return true; }
window.alert("side effect");
"#;
        let set = extract(source, ALLOWED).unwrap();
        let module = set.module_source();
        assert!(module.contains("function validateDate"));
        assert!(!module.contains("addEventListener"));
        assert!(!module.contains("alert"));
    }

    #[test]
    fn nested_functions_are_not_extracted_separately() {
        let source = r#"
function validateDate(d) {
    function validateTime(t) { return false; }
    return validateTime(d);
}
"#;
        let set = extract(source, ALLOWED).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("validateTime").is_none());
    }

    #[test]
    fn anonymous_function_expressions_are_valid_and_discarded() {
        let source = r#"
var logger = function() { return 1; };
window.onload = function() { logger(); };
setTimeout(function() {}, 100);
function validateDate(d) { return true; }
"#;
        let set = extract(source, ALLOWED).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("validateDate").is_some());
    }

    #[test]
    fn named_function_expressions_are_not_retained() {
        // The name of a function expression is not a top-level binding, so it
        // must not satisfy the allow-list even when it matches.
        let source = "var x = function validateTime(t) { return false; };";
        let set = extract(source, ALLOWED).unwrap();
        assert!(set.is_empty());

        let mixed = "var x = function validateTime(t) {};\nfunction validateDate(d) {}";
        let set = extract(mixed, ALLOWED).unwrap();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["validateDate"]);
    }

    #[test]
    fn braces_inside_strings_templates_and_regex_do_not_confuse_the_scanner() {
        let source = r#"
const weird = "a } b { c";
const tpl = `outer ${ { inner: "}" }.inner } trailing`;
const re = /[}{]+/g;
function calculatePriority(u, i) { return u * i; }
"#;
        let set = extract(source, ALLOWED).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("calculatePriority").is_some());
    }

    #[test]
    fn division_is_not_mistaken_for_a_regex() {
        let source = "const half = total / 2;\nfunction validateDate(d) { return d / 1; }";
        let set = extract(source, ALLOWED).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn missing_names_are_omitted_not_errors() {
        let source = "function validateDate(d) { return true; }";
        let set = extract(source, ALLOWED).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.module_source().lines().last().unwrap(),
            "module.exports = { validateDate };"
        );
    }

    #[test]
    fn later_duplicate_declaration_wins() {
        let source = "function validateDate(d) { return 1; }\nfunction validateDate(d) { return 2; }";
        let set = extract(source, ALLOWED).unwrap();
        assert!(set.get("validateDate").unwrap().contains("return 2"));
    }

    #[test]
    fn unbalanced_braces_are_a_parse_error() {
        let err = extract("function validateDate(d) { return true;", ALLOWED).unwrap_err();
        assert!(err.message.contains("unclosed"));
    }

    #[test]
    fn stray_closer_is_a_parse_error() {
        assert!(extract("}", ALLOWED).is_err());
    }

    #[test]
    fn unterminated_string_is_a_parse_error() {
        let err = extract("const s = \"oops", ALLOWED).unwrap_err();
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn unterminated_block_comment_is_a_parse_error() {
        assert!(extract("/* never closed", ALLOWED).is_err());
    }

    #[test]
    fn empty_source_extracts_nothing() {
        let set = extract("", ALLOWED).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.module_source(), "module.exports = {  };\n");
    }

    #[test]
    fn module_source_exports_exactly_the_retained_names() {
        let source =
            "function validateDate(d) {}\nfunction validateTime(t) {}\nfunction calculatePriority(u, i) {}";
        let set = extract(source, ALLOWED).unwrap();
        assert_eq!(
            set.module_source().lines().last().unwrap(),
            "module.exports = { validateDate, validateTime, calculatePriority };"
        );
    }
}
