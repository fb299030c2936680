//! Indented source text builder.

const INDENT_WIDTH: usize = 4;

/// Line-oriented output buffer with block indentation.
#[derive(Default, Debug)]
pub struct SourceWriter {
    buffer: String,
    indent: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one indented line.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent * INDENT_WIDTH {
                self.buffer.push(' ');
            }
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
    }

    /// Emit verbatim text that already carries its own newlines.
    pub fn raw(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Separate two top-level items. Never doubles up or leads the file.
    pub fn blank(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with("\n\n") {
            self.buffer.push('\n');
        }
    }

    /// `{` on its own line, then indent.
    pub fn open(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    /// Dedent, then `}` followed by `suffix` (`";"` for `cbuffer`s and structs).
    pub fn close(&mut self, suffix: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(&format!("}}{suffix}"));
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The text, ending in exactly one newline.
    pub fn finish(mut self) -> String {
        while self.buffer.ends_with("\n\n") {
            self.buffer.pop();
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer
    }
}
