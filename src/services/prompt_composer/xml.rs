//! Minimal tag writer for prompt rendering.
//!
//! Output is indented two spaces per level, up to [`MAX_INDENT_DEPTH`]
//! levels, and every piece of caller text, attribute or body, is escaped.

use std::fmt::Write as _;

/// Nesting beyond this depth is written without further indentation, so
/// deep task chains stay linear in size.
pub(crate) const MAX_INDENT_DEPTH: usize = 32;

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Streaming writer over a `String` buffer.
#[derive(Debug, Default)]
pub(crate) struct TagWriter {
    buf: String,
    depth: usize,
}

impl TagWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self) {
        for _ in 0..self.depth.min(MAX_INDENT_DEPTH) {
            self.buf.push_str("  ");
        }
    }

    fn write_start(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attrs {
            // Writing into a String cannot fail.
            let _ = write!(self.buf, " {}=\"{}\"", name, escape(value));
        }
    }

    pub(crate) fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.write_start(tag, attrs);
        self.buf.push_str(">\n");
        self.depth += 1;
    }

    pub(crate) fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        let _ = writeln!(self.buf, "</{tag}>");
    }

    /// Self-closing element.
    pub(crate) fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.write_start(tag, attrs);
        self.buf.push_str("/>\n");
    }

    /// Element with a text body on one line.
    pub(crate) fn leaf(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        self.write_start(tag, attrs);
        let _ = writeln!(self.buf, ">{}</{}>", escape(text), tag);
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_writer_nesting() {
        let mut w = TagWriter::new();
        w.open("root", &[("mode", "worker")]);
        w.leaf("title", &[], "A < B");
        w.empty("ref", &[("id", "t&1")]);
        w.close("root");
        assert_eq!(
            w.finish(),
            "<root mode=\"worker\">\n  <title>A &lt; B</title>\n  <ref id=\"t&amp;1\"/>\n</root>\n"
        );
    }

    #[test]
    fn test_indentation_is_capped() {
        let mut w = TagWriter::new();
        for _ in 0..MAX_INDENT_DEPTH + 10 {
            w.open("n", &[]);
        }
        w.empty("leaf", &[]);
        let out = w.finish();
        let last = out.lines().last().unwrap();
        assert_eq!(last.len() - last.trim_start().len(), MAX_INDENT_DEPTH * 2);
    }
}
