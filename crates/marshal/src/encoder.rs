//! Linearizes a node tree into markup.
//!
//! Elements are written depth-first. A start tag is placed on its own
//! indented line when pretty-printing, text is written inline, and a closing
//! tag gets its own line only when the element's last child was an element.
//! Every node goes back to the pool right after it has been written.

use std::io::Write;
use std::mem;

use crate::error::Result;
use crate::node::{Element, Node, NodePool, Text, XMLNS};
use crate::options::MarshalOptions;

/// Writes `text` with the five reserved characters replaced by entities.
pub fn escape_into<W: Write + ?Sized>(text: &str, out: &mut W) -> std::io::Result<()> {
    let bytes = text.as_bytes();
    let mut start = 0;
    for (i, byte) in bytes.iter().enumerate() {
        let entity: &[u8] = match byte {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            b'\'' => b"&apos;",
            _ => continue,
        };
        out.write_all(&bytes[start..i])?;
        out.write_all(entity)?;
        start = i + 1;
    }
    out.write_all(&bytes[start..])
}

/// Convenience wrapper around [`escape_into`].
pub fn escape(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    // Writing into a Vec cannot fail.
    let _ = escape_into(text, &mut out);
    String::from_utf8(out).unwrap_or_default()
}

pub struct Encoder<'a, W: Write> {
    writer: W,
    options: &'a MarshalOptions,
    pool: &'a NodePool,
    depth: usize,
}

impl<'a, W: Write> Encoder<'a, W> {
    pub fn new(writer: W, options: &'a MarshalOptions, pool: &'a NodePool) -> Self {
        Self {
            writer,
            options,
            pool,
            depth: 0,
        }
    }

    /// Writes the tree rooted at `root`, consuming and releasing it.
    pub fn encode(&mut self, root: Box<Element>) -> Result<()> {
        self.visit_element(root)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn visit(&mut self, node: Node) -> Result<()> {
        match node {
            Node::Element(element) => self.visit_element(element),
            Node::Text(text) => self.visit_text(text),
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        self.writer.write_all(b"\n")?;
        for _ in 0..self.depth {
            self.writer.write_all(self.options.indent.as_bytes())?;
        }
        Ok(())
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> std::io::Result<()> {
        write!(self.writer, " {name}=\"")?;
        escape_into(value, &mut self.writer)?;
        self.writer.write_all(b"\"")
    }

    fn write_start(&mut self, element: &Element) -> std::io::Result<bool> {
        if self.options.is_pretty() && self.depth > 0 {
            self.write_indent()?;
        }
        write!(self.writer, "<{}", element.name)?;

        let namespace = element.attributes.iter().position(|attr| attr.name == XMLNS);
        if let Some(index) = namespace {
            self.write_attribute(XMLNS, &element.attributes[index].value)?;
        }
        for (index, attr) in element.attributes.iter().enumerate() {
            if Some(index) != namespace {
                self.write_attribute(&attr.name, &attr.value)?;
            }
        }

        let self_close = element.self_close
            || (self.options.is_self_closing(&element.name) && !element.has_meaningful_children());
        if self_close {
            let close: &[u8] = if self.options.spaced_self_close { b" />" } else { b"/>" };
            self.writer.write_all(close)?;
        } else {
            self.writer.write_all(b">")?;
        }
        Ok(self_close)
    }

    fn visit_element(&mut self, mut element: Box<Element>) -> Result<()> {
        let self_closed = match self.write_start(&element) {
            Ok(self_closed) => self_closed,
            Err(err) => {
                self.pool.release_element(element);
                return Err(err.into());
            }
        };
        if self_closed {
            self.pool.release_element(element);
            return Ok(());
        }

        let mut children = mem::take(&mut element.children);
        let last_was_element = matches!(children.last(), Some(Node::Element(_)));

        self.depth += 1;
        let mut visited = Ok(());
        let mut pending = children.drain(..);
        for child in pending.by_ref() {
            visited = self.visit(child);
            if visited.is_err() {
                break;
            }
        }
        for unvisited in pending {
            self.pool.release(unvisited);
        }
        self.depth -= 1;

        // Hand the emptied vector back so its capacity is pooled too.
        element.children = children;
        if let Err(err) = visited {
            self.pool.release_element(element);
            return Err(err);
        }

        let closed = self.write_end(&element, last_was_element);
        self.pool.release_element(element);
        Ok(closed?)
    }

    fn write_end(&mut self, element: &Element, last_was_element: bool) -> std::io::Result<()> {
        if self.options.is_pretty() && last_was_element {
            self.write_indent()?;
        }
        write!(self.writer, "</{}>", element.name)
    }

    fn visit_text(&mut self, text: Box<Text>) -> Result<()> {
        let written = escape_into(&text.content, &mut self.writer);
        self.pool.release_text(text);
        Ok(written?)
    }
}
