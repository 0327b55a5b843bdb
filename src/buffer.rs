//! Indentation-aware text accumulator.
use crate::comment::Comment;

const INDENT: &str = "  ";

#[derive(Debug, Clone, Default)]
pub struct RenderBuffer {
    lines: Vec<String>,
    indent: usize,
}

impl RenderBuffer {
    pub fn new() -> Self { Self::default() }

    /// Write `text` and open a block.
    pub fn start(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    /// Write `text` at the current indent. Embedded newlines keep their
    /// relative indentation; empty lines stay empty.
    pub fn line(&mut self, text: &str) {
        for part in text.split('\n') {
            if part.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!("{}{}", INDENT.repeat(self.indent), part));
            }
        }
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Re-emit a child buffer's lines at the current indent.
    pub fn append(&mut self, child: &RenderBuffer) {
        for line in &child.lines {
            self.line(line);
        }
    }

    /// Close a block and write `text`.
    pub fn end(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    pub fn comment(&mut self, comment: &Comment) {
        for line in comment.lines() {
            self.line(&line);
        }
    }

    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn into_string(self) -> String { self.lines.join("\n") }
}
