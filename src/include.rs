//! `#include "<glob>"` expansion.
//!
//! Runs once over the raw text before parsing. Included files are read
//! whole, expanded recursively (relative to their own directory) and
//! spliced in place of the directive line. A [`SourceMap`] remembers
//! where each run of output lines came from, so later diagnostics can
//! name the real file and line.
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diag::Diagnostics;
use crate::error::{Error, ErrorKind, Result};
use crate::scanner::TokenPos;

/// Include nesting limit. Also what stops a file that includes itself.
pub const MAX_INCLUDE_DEPTH: usize = 16;

const DIRECTIVE: &str = "#include";

#[derive(Debug, Clone)]
struct Segment {
    out_line: u32,
    file: String,
    src_line: u32,
}

/// Output line -> (file, source line).
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceMap {
    segments: Vec<Segment>,
}

impl SourceMap {
    pub fn single(file: &str) -> SourceMap {
        let mut map = SourceMap::default();
        map.push(1, file, 1);
        map
    }

    fn push(&mut self, out_line: u32, file: &str, src_line: u32) {
        self.segments.push(Segment {
            out_line,
            file: file.to_string(),
            src_line,
        });
    }

    // Append `other`, whose line 1 lands on our line `at`.
    fn splice(&mut self, other: SourceMap, at: u32) {
        self.segments.extend(other.segments.into_iter().map(|mut s| {
            s.out_line += at - 1;
            s
        }));
    }

    pub fn locate(&self, out_line: u32) -> (&str, u32) {
        let idx = match self.segments.binary_search_by_key(&out_line, |s| s.out_line) {
            Ok(idx) => idx,
            Err(0) => return ("config-text", out_line),
            Err(idx) => idx - 1,
        };
        let seg = &self.segments[idx];
        (seg.file.as_str(), seg.src_line + (out_line - seg.out_line))
    }
}

/// Preprocessed text. Borrows the input when there was nothing to expand.
#[derive(Debug)]
pub(crate) struct Preprocessed<'a> {
    pub text: Cow<'a, str>,
    pub map: SourceMap,
}

enum Directive<'a> {
    Include(&'a str),
    Malformed,
}

// A directive needs nothing but whitespace before the '#'.
fn directive(line: &str) -> Option<Directive<'_>> {
    static RE_INCLUDE: Lazy<Regex> = Lazy::new(|| {
        let re = r#"^#include[ \t]*(?:"([^"]*)"|'([^']*)')$"#;
        Regex::new(re).expect("could not compile RE_INCLUDE regexp")
    });
    let line = line.trim();
    let rest = line.strip_prefix(DIRECTIVE)?;
    match rest.bytes().next() {
        None | Some(b' ') | Some(b'\t') | Some(b'"') | Some(b'\'') => {}
        _ => return None,
    }
    let caps = match RE_INCLUDE.captures(line) {
        Some(caps) => caps,
        None => return Some(Directive::Malformed),
    };
    match caps.get(1).or_else(|| caps.get(2)) {
        Some(m) if !m.as_str().is_empty() => Some(Directive::Include(m.as_str())),
        _ => Some(Directive::Malformed),
    }
}

/// True if `line` would be taken as an include directive, well-formed or not.
pub(crate) fn is_directive(line: &str) -> bool {
    directive(line).is_some()
}

/// Expand all include directives in `text`, which was read from `file`.
pub(crate) fn preprocess<'a>(text: &'a str, file: &str, diags: &mut Diagnostics) -> Preprocessed<'a> {
    expand(text, file, 0, diags)
}

fn expand<'a>(text: &'a str, file: &str, depth: usize, diags: &mut Diagnostics) -> Preprocessed<'a> {
    if !text.lines().any(is_directive) {
        return Preprocessed {
            text: Cow::Borrowed(text),
            map: SourceMap::single(file),
        };
    }

    let mut out = String::with_capacity(text.len());
    let mut map = SourceMap::default();
    let mut out_line = 1;
    let mut in_segment = false;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let src_line = idx as u32 + 1;
        let pattern = match directive(line) {
            None => {
                if !in_segment {
                    map.push(out_line, file, src_line);
                    in_segment = true;
                }
                out.push_str(line);
                out_line += 1;
                continue;
            }
            Some(Directive::Malformed) => {
                let pos = TokenPos::at_line(src_line);
                diags.push(
                    Error::new(ErrorKind::Structural, "malformed include directive", pos).in_file(file),
                );
                break;
            }
            Some(Directive::Include(pattern)) => pattern,
        };
        in_segment = false;
        debug!("{}:{}: include {:?}", file, src_line, pattern);

        if depth >= MAX_INCLUDE_DEPTH {
            let msg = format!("{}: includes nested deeper than {}", pattern, MAX_INCLUDE_DEPTH);
            let pos = TokenPos::at_line(src_line);
            diags.push(Error::new(ErrorKind::Resource, msg, pos).in_file(file));
            continue;
        }

        let paths = match ExpandedPath::expand_relative(pattern, file) {
            Ok(paths) => paths,
            Err(e) => {
                let pos = TokenPos::at_line(src_line);
                diags.push(Error::new(ErrorKind::Resource, e.msg, pos).in_file(file));
                continue;
            }
        };

        for path in &paths {
            let name = path.to_string_lossy().to_string();
            let data = match read_file(path) {
                Ok(data) => data,
                Err(e) => {
                    let pos = TokenPos::at_line(src_line);
                    diags.push(Error::new(ErrorKind::Resource, e.msg, pos).in_file(file));
                    continue;
                }
            };
            let child = expand(&data, &name, depth + 1, diags);
            if child.text.is_empty() {
                continue;
            }
            map.splice(child.map, out_line);
            out.push_str(&child.text);
            if !child.text.ends_with('\n') {
                out.push('\n');
            }
            out_line += child.text.lines().count() as u32;
        }
    }

    Preprocessed {
        text: Cow::Owned(out),
        map,
    }
}

/// Read a whole file as UTF-8.
pub(crate) fn read_file(path: &Path) -> Result<String> {
    let name = path.to_string_lossy();
    let data = fs::read(path)
        .map_err(|e| Error::bare(ErrorKind::Resource, format!("{}: {}", name, e)))?;
    String::from_utf8(data)
        .map_err(|_| Error::bare(ErrorKind::Resource, format!("{}: utf-8 error", name)))
}

// The regular files a glob pattern matched, in glob order.
struct ExpandedPath {
    paths: Vec<PathBuf>,
}

impl ExpandedPath {
    fn expand(name: impl Into<String>) -> Result<ExpandedPath> {
        let name = name.into();

        let globresult = glob::glob(&name).map_err(|e| {
            Error::bare(ErrorKind::Resource, format!("{}: {}", name, e.msg))
        })?;
        let files = globresult.collect::<Result<Vec<_>, _>>().map_err(|e| {
            Error::bare(ErrorKind::Resource, format!("{}: {}", e.path().to_string_lossy(), e.error()))
        })?;

        let paths: Vec<_> = files.into_iter().filter(|p| p.is_file()).collect();
        if paths.is_empty() {
            return Err(Error::bare(ErrorKind::Resource, format!("{}: file not found", name)));
        }
        Ok(ExpandedPath { paths })
    }

    fn expand_relative(name: impl Into<String>, relative_to: impl AsRef<str>) -> Result<ExpandedPath> {
        let mut name = name.into();
        let relative_to = relative_to.as_ref();
        let path = Path::new(&name);
        if path.is_relative() {
            // Take the parent of the current file, and build a new path.
            if let Some(parent) = Path::new(relative_to).parent() {
                let mut pathbuf = parent.to_path_buf();
                pathbuf.push(&path);
                name = pathbuf.to_string_lossy().to_string();
            }
        }
        ExpandedPath::expand(name)
    }
}

impl<'a> IntoIterator for &'a ExpandedPath {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
