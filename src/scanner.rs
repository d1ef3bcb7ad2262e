//! Position-based scanning over an immutable text buffer.
//!
//! Every helper works on byte offsets within explicit `[start, end)`
//! bounds and hands back a new offset, or `None` when the thing it
//! looked for is not there. All delimiters are ASCII, so every offset
//! returned is also a valid `str` boundary.

/// Config file comment syntax variant.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum Mode {
    /// comments start with '#'.
    Hash,
    /// comments start with '//'.
    Slash,
}

impl Default for Mode {
    fn default() -> Mode {
        Mode::Hash
    }
}

impl Mode {
    /// The comment marker for this mode.
    pub fn marker(&self) -> &'static str {
        match *self {
            Mode::Hash => "#",
            Mode::Slash => "//",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPos {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl TokenPos {
    /// Start of line `line`.
    pub(crate) fn at_line(line: u32) -> TokenPos {
        TokenPos {
            line,
            column: 1,
            offset: 0,
        }
    }

    pub(crate) fn none() -> TokenPos {
        TokenPos {
            line: 0,
            column: 0,
            offset: 0,
        }
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(data: &str) -> LineIndex {
        let mut starts = vec![0];
        starts.extend(data.bytes().enumerate().filter(|&(_, b)| b == b'\n').map(|(i, _)| i + 1));
        LineIndex { starts }
    }

    pub fn line_of(&self, offset: usize) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }

    pub fn pos(&self, offset: usize) -> TokenPos {
        let line = self.line_of(offset);
        let start = self.starts[line as usize - 1];
        TokenPos {
            line,
            column: (offset - start) as u32 + 1,
            offset,
        }
    }
}

pub(crate) fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Scanner<'a> {
    data: &'a [u8],
    mode: Mode,
}

impl<'a> Scanner<'a> {
    pub fn new(data: &'a str, mode: Mode) -> Scanner<'a> {
        Scanner {
            data: data.as_bytes(),
            mode,
        }
    }

    pub fn byte(&self, at: usize) -> Option<u8> {
        self.data.get(at).copied()
    }

    // Offset of the next '\n' at or after `from`, or `end`.
    pub fn line_end(&self, from: usize, end: usize) -> usize {
        self.data[from..end]
            .iter()
            .position(|&b| b == b'\n')
            .map(|n| from + n)
            .unwrap_or(end)
    }

    pub fn is_comment_at(&self, at: usize, end: usize) -> bool {
        match self.mode {
            Mode::Hash => at < end && self.data[at] == b'#',
            Mode::Slash => at + 1 < end && self.data[at] == b'/' && self.data[at + 1] == b'/',
        }
    }

    // First comment marker in [from, end), quotes not considered.
    pub fn find_comment(&self, from: usize, end: usize) -> Option<usize> {
        (from..end).find(|&i| self.is_comment_at(i, end))
    }

    // Skip blanks, but not newlines.
    pub fn skip_blank(&self, mut from: usize, end: usize) -> usize {
        while from < end && (self.data[from] == b' ' || self.data[from] == b'\t' || self.data[from] == b'\r') {
            from += 1;
        }
        from
    }

    // Skip whitespace, newlines and comments.
    pub fn skip_space(&self, mut from: usize, end: usize) -> usize {
        while from < end {
            if self.data[from].is_ascii_whitespace() {
                from += 1;
            } else if self.is_comment_at(from, end) {
                from = self.line_end(from, end);
            } else {
                break;
            }
        }
        from
    }

    // `open` points at a quote; find the next occurrence of the same quote.
    pub fn quote_close(&self, open: usize, end: usize) -> Option<usize> {
        let q = self.data[open];
        self.data[open + 1..end]
            .iter()
            .position(|&b| b == q)
            .map(|n| open + 1 + n)
    }

    /// `open` points at '{' or '['. Returns the offset of the matching
    /// close. Quoted text and comments are skipped over.
    pub fn match_close(&self, open: usize, end: usize) -> Option<usize> {
        let close = match self.data[open] {
            b'{' => b'}',
            b'[' => b']',
            _ => return None,
        };
        let mut depth = 0usize;
        let mut i = open;
        while i < end {
            let b = self.data[i];
            if is_quote(b) {
                i = self.quote_close(i, end)?;
            } else if self.is_comment_at(i, end) {
                i = self.line_end(i, end);
                continue;
            } else if b == b'{' || b == b'[' {
                depth += 1;
            } else if b == b'}' || b == b']' {
                depth -= 1;
                if depth == 0 {
                    return if b == close { Some(i) } else { None };
                }
            }
            i += 1;
        }
        None
    }

    /// Split [start, end) at commas that are not nested inside
    /// braces, brackets, quotes or comments.
    pub fn split_top_level(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut first = start;
        let mut i = start;
        while i < end {
            let b = self.data[i];
            if is_quote(b) {
                match self.quote_close(i, end) {
                    Some(n) => i = n,
                    None => break,
                }
            } else if self.is_comment_at(i, end) {
                i = self.line_end(i, end);
                continue;
            } else if b == b'{' || b == b'[' {
                depth += 1;
            } else if b == b'}' || b == b']' {
                depth = depth.saturating_sub(1);
            } else if b == b',' && depth == 0 {
                parts.push((first, i));
                first = i + 1;
            }
            i += 1;
        }
        parts.push((first, end));
        parts
    }
}
