//! Default file generator.
//!
//! Writes every option with its *declared default*, preceded by its
//! comment, in a form the parser reads back to the same values.
use std::fmt::Write;

use crate::error::{Error, ErrorKind, Result};
use crate::include::is_directive;
use crate::scanner::Mode;
use crate::scope::Scope;
use crate::value::Value;

const GEN_MIN_CAPACITY: usize = 64 * 1024;
const GEN_BYTES_PER_OPTION: usize = 256;
const GEN_HEADROOM: usize = 1024;

pub(crate) struct Generator {
    out: String,
    mode: Mode,
    chunk: usize,
}

impl Generator {
    pub fn new(mode: Mode, option_count: usize) -> Generator {
        let chunk = GEN_MIN_CAPACITY.max(option_count * GEN_BYTES_PER_OPTION);
        Generator {
            out: String::with_capacity(chunk),
            mode,
            chunk,
        }
    }

    /// Generate the default file for `scope`.
    pub fn generate(scope: &Scope, mode: Mode) -> Result<String> {
        let mut gen = Generator::new(mode, scope.option_count());
        gen.scope(scope, 0)?;
        Ok(gen.out)
    }

    fn reserve(&mut self) {
        if self.out.capacity() - self.out.len() < GEN_HEADROOM {
            self.out.reserve(self.chunk);
        }
    }

    fn indent(&mut self, indent: usize) {
        for _ in 0..indent {
            self.out.push('\t');
        }
    }

    fn scope(&mut self, scope: &Scope, indent: usize) -> Result<()> {
        for (idx, opt) in scope.iter().enumerate() {
            if idx > 0 {
                self.out.push('\n');
            }
            self.reserve();
            self.comment(opt.comment(), indent);
            self.indent(indent);
            self.out.push_str(opt.name());
            self.out.push_str(" = ");
            self.value(opt.name(), opt.default(), indent)?;
            self.out.push('\n');
        }
        Ok(())
    }

    fn comment(&mut self, comment: &str, indent: usize) {
        if comment.is_empty() {
            return;
        }
        for line in comment.lines() {
            self.indent(indent);
            self.out.push_str(self.mode.marker());
            if !line.is_empty() {
                self.out.push(' ');
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
    }

    fn value(&mut self, name: &str, value: &Value, indent: usize) -> Result<()> {
        match value {
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Long(n) => {
                let _ = write!(self.out, "{}", n);
            }
            // Debug formatting is the shortest text that reads back bit-equal.
            Value::Double(n) => {
                let _ = write!(self.out, "{:?}", n);
            }
            Value::Text(s) => self.text(name, s)?,
            Value::Compound(scope) => {
                self.out.push_str("{\n");
                self.scope(scope, indent + 1)?;
                self.indent(indent);
                self.out.push('}');
            }
            Value::Array(array) => {
                self.out.push('[');
                for (idx, item) in array.items().iter().enumerate() {
                    if idx > 0 {
                        self.out.push_str(", ");
                    }
                    self.reserve();
                    self.value(name, item, indent)?;
                }
                self.out.push(']');
            }
        }
        Ok(())
    }

    // Multi-line text goes in block form: the newline after the opening
    // quote and the one before the closing quote are not part of the value.
    fn text(&mut self, name: &str, s: &str) -> Result<()> {
        let quote = if !s.contains('"') {
            '"'
        } else if !s.contains('\'') {
            '\''
        } else {
            return Err(Error::bare(
                ErrorKind::Value,
                format!("text default of option '{}' contains both quote characters", name),
            ));
        };
        if s.contains('\n') && s.lines().any(is_directive) {
            return Err(Error::bare(
                ErrorKind::Value,
                format!("text default of option '{}' has a line that reads as an include directive", name),
            ));
        }
        self.out.push(quote);
        if s.contains('\n') {
            self.out.push('\n');
            self.out.push_str(s);
            self.out.push('\n');
        } else {
            self.out.push_str(s);
        }
        self.out.push(quote);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{ArrayOutline, Elem, Outline};

    fn generate(outline: Outline, mode: Mode) -> Result<String> {
        Generator::generate(&outline.instantiate().unwrap(), mode)
    }

    #[test]
    fn layout() {
        let outline = Outline::new()
            .long("joe", "Hello world!\nyoe", 12)
            .text("mama", "", "single")
            .compound("group", "nested", Outline::new().bool("on", "", true).double("r", "ratio", 1.0));
        let text = generate(outline, Mode::Hash).unwrap();
        let expected = "# Hello world!\n# yoe\njoe = 12\n\nmama = \"single\"\n\n# nested\ngroup = {\n\ton = true\n\n\t# ratio\n\tr = 1.0\n}\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn slash_comments_and_arrays() {
        let outline = Outline::new()
            .array("list", "numbers", ArrayOutline::new(Elem::Long).items(vec![1i64, 2, 3]))
            .array(
                "rows",
                "",
                ArrayOutline::new(Elem::Array(Box::new(Elem::Text)))
                    .item(ArrayOutline::new(Elem::Text).item("a"))
                    .item(ArrayOutline::new(Elem::Text)),
            );
        let text = generate(outline, Mode::Slash).unwrap();
        assert_eq!(text, "// numbers\nlist = [1, 2, 3]\n\nrows = [[\"a\"], []]\n");
    }

    #[test]
    fn text_forms() {
        let outline = Outline::new()
            .text("a", "", "two\nlines")
            .text("b", "", "say \"hi\"");
        let text = generate(outline, Mode::Hash).unwrap();
        assert_eq!(text, "a = \"\ntwo\nlines\n\"\n\nb = 'say \"hi\"'\n");

        let err = generate(Outline::new().text("c", "", "both \" and '"), Mode::Hash).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Value);
    }

    #[test]
    fn text_with_include_line() {
        let err = generate(Outline::new().text("t", "", "a\n#include foo\nb"), Mode::Hash).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Value);
        assert!(err.msg.contains("'t'"), "{}", err.msg);

        let nested = Outline::new().compound("c", "", Outline::new().text("t", "", "x\n  #include 'a.conf'"));
        assert!(generate(nested, Mode::Slash).is_err());

        // On one line it follows `t = ` and is not a directive.
        let text = generate(Outline::new().text("t", "", "#include 'a.conf'"), Mode::Hash).unwrap();
        assert_eq!(text, "t = \"#include 'a.conf'\"\n");
    }

    #[test]
    fn compound_array_items() {
        let template = Outline::new().long("port", "", 80);
        let outline = Outline::new().array(
            "servers",
            "",
            ArrayOutline::new(Elem::Compound(template)).item(Outline::new()).item(Outline::new().long("port", "", 81)),
        );
        let text = generate(outline, Mode::Hash).unwrap();
        assert_eq!(text, "servers = [{\n\tport = 80\n}, {\n\tport = 81\n}]\n");
    }

    #[test]
    fn capacity_grows_with_options() {
        let gen = Generator::new(Mode::Hash, 1000);
        assert!(gen.out.capacity() >= 1000 * GEN_BYTES_PER_OPTION);
    }
}
