//! Recursive-descent parser over preprocessed text.
//!
//! Works line by line: `name = value`, dispatching on the declared type
//! of `name`. Text, compound and array values may run over several lines;
//! the cursor then resumes after them. Problems with one line are
//! reported and skipped. Only an unterminated string, brace or bracket
//! stops the current buffer, and whatever was already assigned stays.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::diag::Diagnostics;
use crate::error::{Error, ErrorKind, Result};
use crate::include::SourceMap;
use crate::scanner::{is_quote, LineIndex, Mode, Scanner, TokenPos};
use crate::scope::{ConfOption, Scope};
use crate::value::{ArrayValue, Type, Value, ARRAY_CHUNK};

/// Compound/array nesting limit.
pub const MAX_NESTING: usize = 64;

pub(crate) struct Parser<'a> {
    data: &'a str,
    scan: Scanner<'a>,
    lines: LineIndex,
    map: &'a SourceMap,
    diags: &'a mut Diagnostics,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a str, mode: Mode, map: &'a SourceMap, diags: &'a mut Diagnostics) -> Parser<'a> {
        Parser {
            data,
            scan: Scanner::new(data, mode),
            lines: LineIndex::new(data),
            map,
            diags,
            depth: 0,
        }
    }

    /// Parse the whole buffer into `scope`.
    pub fn parse(&mut self, scope: &mut Scope) {
        self.parse_scope(scope, 0, self.data.len());
    }

    fn parse_scope(&mut self, scope: &mut Scope, start: usize, end: usize) {
        if let Err(e) = self.parse_body(scope, start, end) {
            self.diags.push(e);
        }
    }

    // Build an error positioned at `offset`, in terms of the source file.
    fn error(&self, kind: ErrorKind, msg: impl Into<String>, offset: usize) -> Error {
        let pos = self.lines.pos(offset);
        let (file, line) = self.map.locate(pos.line);
        let pos = TokenPos {
            line,
            column: pos.column,
            offset,
        };
        Error::new(kind, msg, pos).in_file(file)
    }

    fn report(&mut self, kind: ErrorKind, msg: impl Into<String>, offset: usize) {
        let e = self.error(kind, msg, offset);
        self.diags.push(e);
    }

    fn source_line(&self, offset: usize) -> u32 {
        self.map.locate(self.lines.line_of(offset)).1
    }

    fn enter(&mut self, offset: usize) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(
                ErrorKind::Structural,
                format!("values nested deeper than {}", MAX_NESTING),
                offset,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_body(&mut self, scope: &mut Scope, start: usize, end: usize) -> Result<()> {
        let data = self.data;
        let mut off = start;

        while off < end {
            let line_end = self.scan.line_end(off, end);
            let first = self.scan.skip_blank(off, line_end);
            if first == line_end || self.scan.is_comment_at(first, line_end) {
                off = line_end + 1;
                continue;
            }

            let comment = self.scan.find_comment(first, line_end);
            let eq = match data[first..line_end].find('=').map(|n| first + n) {
                Some(eq) if comment.map_or(true, |c| eq < c) => eq,
                _ => {
                    self.report(ErrorKind::Value, "expected 'name = value'", first);
                    off = line_end + 1;
                    continue;
                }
            };
            let value_at = self.scan.skip_blank(eq + 1, line_end);

            let name = data[first..eq].trim();
            if name.is_empty() {
                self.report(ErrorKind::Value, "option name can not be empty", first);
                off = self.skip_value(value_at, line_end, end)?;
                continue;
            }

            off = match scope.find_mut(name) {
                Some(opt) => self.assign(opt, first, value_at, line_end, end)?,
                None => {
                    self.report(ErrorKind::Lookup, format!("unrecognized option '{}'", name), first);
                    self.skip_value(value_at, line_end, end)?
                }
            };
        }
        Ok(())
    }

    // Skip over the value of an option we are not going to assign.
    fn skip_value(&self, value_at: usize, line_end: usize, end: usize) -> Result<usize> {
        if value_at == line_end {
            return Ok(line_end + 1);
        }
        match self.data.as_bytes()[value_at] {
            b if is_quote(b) => {
                let close = self
                    .scan
                    .quote_close(value_at, end)
                    .ok_or_else(|| self.error(ErrorKind::Structural, "unterminated string", value_at))?;
                Ok(self.scan.line_end(close, end) + 1)
            }
            b'{' | b'[' => {
                let close = self.scan.match_close(value_at, end).ok_or_else(|| {
                    self.error(ErrorKind::Structural, "unterminated compound or array", value_at)
                })?;
                Ok(close + 1)
            }
            _ => Ok(line_end + 1),
        }
    }

    // Assign the value at `value_at` to `opt`. Returns where to continue.
    fn assign(
        &mut self,
        opt: &mut ConfOption,
        first: usize,
        value_at: usize,
        line_end: usize,
        end: usize,
    ) -> Result<usize> {
        let line = self.source_line(first);
        let opens = self.scan.byte(value_at).filter(|_| value_at < line_end);
        trace!("assign {} ({}) at line {}", opt.name(), opt.type_of(), line);

        match opt.type_of() {
            Type::Text => {
                if !opens.map_or(false, is_quote) {
                    let msg = format!(
                        "text value for option '{}' must start with ' or \" on the same line",
                        opt.name()
                    );
                    self.report(ErrorKind::Value, msg, value_at);
                    opt.reset();
                    return Ok(line_end + 1);
                }
                match self.text_literal(value_at, end) {
                    Ok((text, close)) => {
                        opt.set(Value::Text(text), line);
                        Ok(self.scan.line_end(close, end) + 1)
                    }
                    Err(e) => {
                        opt.reset();
                        Err(e)
                    }
                }
            }
            Type::Compound => {
                if opens != Some(b'{') {
                    let msg = format!("compound value for option '{}' must start with '{{'", opt.name());
                    self.report(ErrorKind::Value, msg, value_at);
                    opt.reset();
                    return Ok(line_end + 1);
                }
                let close = self.scan.match_close(value_at, end).ok_or_else(|| {
                    let msg = format!("compound value for option '{}' must end with '}}'", opt.name());
                    self.error(ErrorKind::Structural, msg, value_at)
                })?;
                self.enter(value_at)?;
                if let Value::Compound(ref mut child) = opt.value {
                    self.parse_scope(child, value_at + 1, close);
                }
                self.depth -= 1;
                opt.line = line;
                Ok(close + 1)
            }
            Type::Array(_) => {
                if opens != Some(b'[') {
                    let msg = format!("array value for option '{}' must start with '['", opt.name());
                    self.report(ErrorKind::Value, msg, value_at);
                    opt.reset();
                    return Ok(line_end + 1);
                }
                let close = self.scan.match_close(value_at, end).ok_or_else(|| {
                    let msg = format!("array value for option '{}' must end with ']'", opt.name());
                    self.error(ErrorKind::Structural, msg, value_at)
                })?;
                self.enter(value_at)?;
                if let Value::Array(ref mut array) = opt.value {
                    let items = self.parse_array(array, value_at + 1, close);
                    array.set_items(items);
                }
                self.depth -= 1;
                opt.line = line;
                Ok(close + 1)
            }
            ty => {
                let stop = self.scan.find_comment(value_at, line_end).unwrap_or(line_end);
                let text = self.data[value_at..stop].trim();
                match parse_scalar(&ty, text) {
                    Ok(value) => opt.set(value, line),
                    Err(msg) => {
                        self.report(ErrorKind::Value, format!("{} for option '{}'", msg, opt.name()), value_at);
                        opt.reset();
                    }
                }
                Ok(line_end + 1)
            }
        }
    }

    // `open` points at a quote. Returns the text and the closing quote offset.
    fn text_literal(&self, open: usize, end: usize) -> Result<(String, usize)> {
        let data = self.data.as_bytes();
        let close = self
            .scan
            .quote_close(open, end)
            .ok_or_else(|| self.error(ErrorKind::Structural, "unterminated string", open))?;
        let mut start = open + 1;
        if start < close && data[start] == b'\n' {
            start += 1;
        }
        let mut stop = close;
        if stop > start && data[stop - 1] == b'\n' {
            stop -= 1;
        }
        Ok((self.data[start..stop].to_string(), close))
    }

    // Parse the comma separated elements between '[' and ']'.
    fn parse_array(&mut self, array: &ArrayValue, start: usize, end: usize) -> Vec<Value> {
        let parts = self.scan.split_top_level(start, end);
        let last = parts.len() - 1;
        let mut items: Vec<Value> = Vec::new();

        for (idx, (s, e)) in parts.into_iter().enumerate() {
            let first = self.scan.skip_space(s, e);
            if first == e {
                // "[]" and a trailing comma are fine.
                if idx != last {
                    self.report(ErrorKind::Value, "empty array element", s);
                }
                continue;
            }
            if items.len() == items.capacity() {
                items.reserve_exact(ARRAY_CHUNK);
            }
            match self.parse_element(array.new_element(), first, e) {
                Ok(value) => items.push(value),
                Err(err) => self.diags.push(err),
            }
        }
        items.shrink_to_fit();
        items
    }

    fn parse_element(&mut self, element: Value, first: usize, end: usize) -> Result<Value> {
        let opens = self.data.as_bytes()[first];
        match element {
            Value::Compound(mut scope) => {
                let close = self.open_close(b'{', opens, first, end)?;
                self.enter(first)?;
                self.parse_scope(&mut scope, first + 1, close);
                self.depth -= 1;
                Ok(Value::Compound(scope))
            }
            Value::Array(mut array) => {
                let close = self.open_close(b'[', opens, first, end)?;
                self.enter(first)?;
                let items = self.parse_array(&array, first + 1, close);
                self.depth -= 1;
                array.set_items(items);
                Ok(Value::Array(array))
            }
            Value::Text(_) => {
                if !is_quote(opens) {
                    return Err(self.error(ErrorKind::Value, "text element must be quoted", first));
                }
                let (text, close) = self.text_literal(first, end)?;
                self.expect_end(close + 1, end)?;
                Ok(Value::Text(text))
            }
            scalar => {
                let stop = self.scan.find_comment(first, end).unwrap_or(end);
                let text = self.data[first..stop].trim();
                parse_scalar(&scalar.type_of(), text)
                    .map_err(|msg| self.error(ErrorKind::Value, format!("{} in array", msg), first))
            }
        }
    }

    // Check the element opens with `want`, find its close, and make sure
    // nothing but blanks and comments follow it.
    fn open_close(&self, want: u8, opens: u8, first: usize, end: usize) -> Result<usize> {
        if opens != want {
            let msg = format!("expected '{}' in array", want as char);
            return Err(self.error(ErrorKind::Value, msg, first));
        }
        let close = self.scan.match_close(first, end).ok_or_else(|| {
            self.error(ErrorKind::Structural, format!("unterminated '{}'", want as char), first)
        })?;
        self.expect_end(close + 1, end)?;
        Ok(close)
    }

    fn expect_end(&self, from: usize, end: usize) -> Result<()> {
        let rest = self.scan.skip_space(from, end);
        if rest != end {
            return Err(self.error(ErrorKind::Value, "unexpected text after array element", rest));
        }
        Ok(())
    }
}

/// Convert a trimmed scalar literal to a value of type `ty`.
///
/// Numbers take the longest numeric prefix, like `strtol`/`strtod`.
pub(crate) fn parse_scalar(ty: &Type, text: &str) -> std::result::Result<Value, String> {
    static RE_LONG: Lazy<Regex> = Lazy::new(|| {
        let re = r"^[+-]?[0-9]+";
        Regex::new(re).expect("could not compile RE_LONG regexp")
    });
    static RE_DOUBLE: Lazy<Regex> = Lazy::new(|| {
        let re = r"(?i)^[+-]?(?:infinity|inf|nan|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:e[+-]?[0-9]+)?)";
        Regex::new(re).expect("could not compile RE_DOUBLE regexp")
    });

    match ty {
        Type::Bool => {
            if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("yes") {
                Ok(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case("no") {
                Ok(Value::Bool(false))
            } else {
                Err("invalid boolean, must be true, false, yes or no".to_string())
            }
        }
        Type::Long => {
            let m = RE_LONG.find(text).ok_or_else(|| "invalid integer".to_string())?;
            m.as_str()
                .parse::<i64>()
                .map(Value::Long)
                .map_err(|_| "integer out of range".to_string())
        }
        Type::Double => {
            let m = RE_DOUBLE.find(text).ok_or_else(|| "invalid double".to_string())?;
            m.as_str()
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| "invalid double".to_string())
        }
        ty => Err(format!("{} is not a scalar type", ty)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{ArrayOutline, Elem, Outline};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn schema() -> Outline {
        Outline::new()
            .bool("flag", "", false)
            .long("count", "", 7)
            .double("ratio", "", 0.5)
            .text("greeting", "", "hi")
            .compound("outer", "", Outline::new()
                .long("inner", "", 5)
                .compound("deep", "", Outline::new().text("leaf", "", "green")))
            .array("list", "", ArrayOutline::new(Elem::Long))
            .array("names", "", ArrayOutline::new(Elem::Text))
            .array("matrix", "", ArrayOutline::new(Elem::Array(Box::new(Elem::Long))))
            .array("groups", "", ArrayOutline::new(Elem::Compound(Outline::new().long("inner", "", 5))))
    }

    fn parse_mode(text: &str, mode: Mode) -> (Scope, Diagnostics) {
        init();
        let mut scope = schema().instantiate().unwrap();
        let mut diags = Diagnostics::new();
        let map = SourceMap::single("test.conf");
        Parser::new(text, mode, &map, &mut diags).parse(&mut scope);
        (scope, diags)
    }

    fn parse(text: &str) -> (Scope, Diagnostics) {
        parse_mode(text, Mode::Hash)
    }

    fn get<'s>(scope: &'s Scope, path: &str) -> &'s Value {
        scope.lookup(path).unwrap().value()
    }

    fn longs(v: &Value) -> Vec<i64> {
        v.as_array().unwrap().items().iter().map(|v| v.as_long().unwrap()).collect()
    }

    #[test]
    fn scalars() {
        let (scope, diags) = parse(
            "# leading comment\n\n  flag = YES\ncount = -42 # trailing\nratio=1e-3\n",
        );
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(get(&scope, "flag"), &Value::Bool(true));
        assert_eq!(get(&scope, "count"), &Value::Long(-42));
        assert_eq!(get(&scope, "ratio"), &Value::Double(0.001));
        assert_eq!(scope.find("count").unwrap().line(), Some(4));
        assert_eq!(scope.find("greeting").unwrap().line(), None);
    }

    #[test]
    fn numeric_prefix() {
        assert_eq!(parse_scalar(&Type::Long, "12abc"), Ok(Value::Long(12)));
        assert_eq!(parse_scalar(&Type::Long, "+3"), Ok(Value::Long(3)));
        assert!(parse_scalar(&Type::Long, "99999999999999999999").is_err());
        assert_eq!(parse_scalar(&Type::Double, "2.5x"), Ok(Value::Double(2.5)));
        assert_eq!(parse_scalar(&Type::Double, "-inf"), Ok(Value::Double(f64::NEG_INFINITY)));
        assert_eq!(parse_scalar(&Type::Double, ".25"), Ok(Value::Double(0.25)));
        assert!(parse_scalar(&Type::Double, "abc").is_err());
        assert_eq!(parse_scalar(&Type::Bool, "No"), Ok(Value::Bool(false)));
        assert!(parse_scalar(&Type::Bool, "maybe").is_err());
    }

    #[test]
    fn type_mismatch_keeps_default() {
        let (scope, diags) = parse("count = 3\ncount = \"notanumber\"\nflag = perhaps\n");
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.kind() == ErrorKind::Value));
        assert_eq!(diags.iter().next().unwrap().line(), Some(2));
        assert_eq!(get(&scope, "count"), &Value::Long(7));
        assert_eq!(get(&scope, "flag"), &Value::Bool(false));
    }

    #[test]
    fn unknown_option() {
        let (scope, diags) = parse("ghost = 1\ncount = 2\nspook = {\n  a = 1\n}\nflag = true\n");
        assert_eq!(diags.len(), 2);
        let d = diags.iter().next().unwrap();
        assert_eq!(d.kind(), ErrorKind::Lookup);
        assert!(d.message().contains("ghost"));
        assert_eq!(d.line(), Some(1));
        assert_eq!(get(&scope, "count"), &Value::Long(2));
        assert_eq!(get(&scope, "flag"), &Value::Bool(true));
    }

    #[test]
    fn garbage_lines() {
        let (scope, diags) = parse("just words\n= 4\ncount = 1\n");
        assert_eq!(diags.len(), 2);
        assert_eq!(get(&scope, "count"), &Value::Long(1));
    }

    #[test]
    fn text_values() {
        let (scope, diags) = parse("greeting = \"hello\nworld\"\ncount = 1\n");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(get(&scope, "greeting").as_str(), Some("hello\nworld"));
        assert_eq!(get(&scope, "count"), &Value::Long(1));

        let (scope, _) = parse("greeting = '\nline one\nline two\n'\n");
        assert_eq!(get(&scope, "greeting").as_str(), Some("line one\nline two"));

        let (scope, _) = parse("greeting = 'say \"hi\" # not a comment' count = 3\ncount = 4\n");
        assert_eq!(get(&scope, "greeting").as_str(), Some("say \"hi\" # not a comment"));
        assert_eq!(get(&scope, "count"), &Value::Long(4));

        let (scope, _) = parse("greeting = \"\"\n");
        assert_eq!(get(&scope, "greeting").as_str(), Some(""));
    }

    #[test]
    fn text_needs_quote() {
        let (scope, diags) = parse("greeting = bare words\ncount = 1\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(get(&scope, "greeting").as_str(), Some("hi"));
        assert_eq!(get(&scope, "count"), &Value::Long(1));
    }

    #[test]
    fn unterminated_string_aborts() {
        let (scope, diags) = parse("count = 1\ngreeting = \"never closed\nflag = true\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().kind(), ErrorKind::Structural);
        assert_eq!(get(&scope, "count"), &Value::Long(1));
        assert_eq!(get(&scope, "greeting").as_str(), Some("hi"));
        assert_eq!(get(&scope, "flag"), &Value::Bool(false));
    }

    #[test]
    fn compounds() {
        let (scope, diags) = parse("outer = { inner = 9 }\n");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(get(&scope, "outer.inner"), &Value::Long(9));

        let text = "outer = {\n  # nested\n  deep = {\n    leaf = \"red }\"\n  }\n  inner = 1\n} # done\ncount = 8\n";
        let (scope, diags) = parse(text);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(get(&scope, "outer.deep.leaf").as_str(), Some("red }"));
        assert_eq!(get(&scope, "outer.inner"), &Value::Long(1));
        assert_eq!(get(&scope, "count"), &Value::Long(8));
        assert_eq!(scope.lookup("outer.inner").unwrap().line(), Some(6));
    }

    #[test]
    fn wrong_opener_resets_to_default() {
        let (scope, diags) = parse("list = [1, 2]\nlist = 5\nouter = { inner = 9 }\nouter = 3\ncount = 1\n");
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.kind() == ErrorKind::Value));
        assert!(get(&scope, "list").as_array().unwrap().is_empty());
        assert_eq!(get(&scope, "outer.inner"), &Value::Long(5));
        assert_eq!(scope.find("outer").unwrap().line(), None);
        assert_eq!(get(&scope, "count"), &Value::Long(1));
    }

    #[test]
    fn unterminated_compound() {
        let (scope, diags) = parse("count = 2\nouter = {\n inner = 1\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().kind(), ErrorKind::Structural);
        assert_eq!(get(&scope, "count"), &Value::Long(2));
        assert_eq!(get(&scope, "outer.inner"), &Value::Long(5));
    }

    #[test]
    fn arrays() {
        let (scope, diags) = parse("list = [1, 2, 3,]\nnames = [\"a,b\", 'c]']\n");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(longs(get(&scope, "list")), vec![1, 2, 3]);
        let names: Vec<_> = get(&scope, "names")
            .as_array()
            .unwrap()
            .items()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a,b", "c]"]);

        let (scope, diags) = parse("list = [\n  1, # one\n  2\n]\ncount = 3\n");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(longs(get(&scope, "list")), vec![1, 2]);
        assert_eq!(get(&scope, "count"), &Value::Long(3));

        let (scope, diags) = parse("list = []\n");
        assert!(diags.is_empty());
        assert!(get(&scope, "list").as_array().unwrap().is_empty());
    }

    #[test]
    fn bad_array_elements_dropped() {
        let (scope, diags) = parse("list = [1, x, , 4]\n");
        assert_eq!(diags.len(), 2);
        assert_eq!(longs(get(&scope, "list")), vec![1, 4]);
    }

    #[test]
    fn array_of_arrays() {
        let (scope, diags) = parse("matrix = [[1,2],[3,4,5]]\n");
        assert!(diags.is_empty(), "{:?}", diags);
        let rows: Vec<_> = get(&scope, "matrix").as_array().unwrap().items().iter().map(longs).collect();
        assert_eq!(rows, vec![vec![1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn array_of_compounds() {
        let (scope, diags) = parse("groups = [{ }, { inner = 9 }, {\n inner = 1\n}]\n");
        assert!(diags.is_empty(), "{:?}", diags);
        let groups = get(&scope, "groups").as_array().unwrap();
        let inner: Vec<_> = groups
            .items()
            .iter()
            .map(|g| g.as_compound().unwrap().find("inner").unwrap().value().as_long().unwrap())
            .collect();
        assert_eq!(inner, vec![5, 9, 1]);
        assert_eq!(groups.template().unwrap().find("inner").unwrap().value(), &Value::Long(5));
    }

    #[test]
    fn unterminated_array() {
        let (scope, diags) = parse("list = [1, 2\ncount = 3\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().kind(), ErrorKind::Structural);
        assert!(get(&scope, "list").as_array().unwrap().is_empty());
        assert_eq!(get(&scope, "count"), &Value::Long(7));
    }

    #[test]
    fn slash_mode() {
        let (scope, diags) = parse_mode("count = 5 // five\n// whole line\ngreeting = \"http://x\"\n", Mode::Slash);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(get(&scope, "count"), &Value::Long(5));
        assert_eq!(get(&scope, "greeting").as_str(), Some("http://x"));
    }

    #[test]
    fn nesting_limit() {
        init();
        let mut elem = Elem::Long;
        for _ in 0..MAX_NESTING + 2 {
            elem = Elem::Array(Box::new(elem));
        }
        let mut scope = Outline::new().array("deep", "", ArrayOutline::new(elem)).instantiate().unwrap();
        let depth = MAX_NESTING + 3;
        let text = format!("deep = {}1{}\n", "[".repeat(depth), "]".repeat(depth));
        let mut diags = Diagnostics::new();
        let map = SourceMap::single("test.conf");
        Parser::new(&text, Mode::Hash, &map, &mut diags).parse(&mut scope);
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().next().unwrap().message().contains("nested deeper"));
    }

    #[test]
    fn compound_nesting_limit() {
        init();
        let levels = MAX_NESTING + 1;
        let mut outline = Outline::new().long("x", "", 0);
        for _ in 0..levels {
            outline = Outline::new().compound("c", "", outline);
        }
        let mut scope = outline.instantiate().unwrap();
        let text = format!("{}x = 1{}\n", "c = { ".repeat(levels), " }".repeat(levels));
        let mut diags = Diagnostics::new();
        let map = SourceMap::single("test.conf");
        Parser::new(&text, Mode::Hash, &map, &mut diags).parse(&mut scope);
        assert_eq!(diags.len(), 1);
        let d = diags.iter().next().unwrap();
        assert_eq!(d.kind(), ErrorKind::Structural);
        assert!(d.message().contains("nested deeper"));

        let path = vec!["c"; levels].join(".") + ".x";
        assert_eq!(scope.lookup(&path).unwrap().value(), &Value::Long(0));
    }
}
