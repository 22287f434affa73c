//! Indentation-aware code fragments.
//!
//! A [`Code`] is a list of lines, each carrying its nesting depth relative
//! to the fragment. Fragments compose by nesting: appending a fragment
//! inside a block shifts every one of its lines one level deeper, so
//! marshaling steps can be produced independently of where they end up.

use std::fmt;

const INDENT: &str = "    ";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Line {
    depth: usize,
    /// Empty for a blank line.
    text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Code {
    lines: Vec<Line>,
}

impl Code {
    pub fn new() -> Self {
        Code::default()
    }

    /// A fragment of one line.
    pub fn single(text: impl Into<String>) -> Self {
        let mut code = Code::new();
        code.line(text);
        code
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Append a line at depth 0.
    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line {
            depth: 0,
            text: text.into(),
        });
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line(String::new())
    }

    /// Append another fragment at the same depth.
    pub fn append(&mut self, other: Code) -> &mut Self {
        self.lines.extend(other.lines);
        self
    }

    /// Append another fragment one level deeper.
    pub fn nest(&mut self, other: Code) -> &mut Self {
        self.lines.extend(other.lines.into_iter().map(|mut line| {
            line.depth += 1;
            line
        }));
        self
    }

    /// `head`, then `body` one level deeper, then `tail`.
    pub fn block(&mut self, head: impl Into<String>, body: Code, tail: &str) -> &mut Self {
        self.line(head);
        self.nest(body);
        self.line(tail)
    }

    /// `head {` ... `}`: a brace block with the brace on the head line.
    pub fn braced(&mut self, head: &str, body: Code) -> &mut Self {
        self.block(format!("{head} {{"), body, "}")
    }

    /// Render at the given base depth. Blank lines carry no indentation.
    pub fn render(&self, base_depth: usize) -> String {
        let mut out = String::with_capacity(self.lines.len() * 32);
        for line in &self.lines {
            if !line.text.is_empty() {
                for _ in 0..base_depth + line.depth {
                    out.push_str(INDENT);
                }
                out.push_str(&line.text);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Self {
        Code::single(text)
    }
}

impl From<String> for Code {
    fn from(text: String) -> Self {
        Code::single(text)
    }
}
