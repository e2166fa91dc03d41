//! Layout-aware serialization: walks a [`Document`] tree back into text,
//! choosing each node's style by priority (the node's own recorded style,
//! then the serializer's configured default, then plain/block) and
//! re-emitting head, line, and foot comments at the right indentation.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::SerializerError;
use crate::node::{CommentGroup, Document, Node, NodeData, NodeId};
use crate::tags::{TagResolver, STR_TAG};
use crate::token::{CollectionStyle, ScalarStyle};

#[derive(Clone, Debug)]
pub struct SerializerOptions {
    /// Spaces per indentation level for block collections (ignored when
    /// `use_tabs` is set).
    pub indent: usize,
    /// Indent with tabs (8 columns each) instead of `indent` spaces.
    pub use_tabs: bool,
    /// Force every sequence and mapping to flow style, regardless of its
    /// recorded style. Takes priority over `prefer_block`.
    pub prefer_flow: bool,
    /// Force every sequence and mapping to block style, regardless of its
    /// recorded style.
    pub prefer_block: bool,
    /// Soft line-width target used to wrap flow collections onto multiple
    /// lines when a single line would exceed it.
    pub line_width: usize,
    /// Emit an explicit `---` before the document even if it wasn't
    /// present in the source.
    pub explicit_document_start: bool,
    pub explicit_document_end: bool,
    /// Write each node's resolved tag explicitly (`!!str foo`) rather than
    /// leaving it implicit when it matches what core-schema inference
    /// would produce anyway.
    pub emit_tags: bool,
    pub preserve_comments: bool,
    pub preserve_blank_lines: bool,
    /// Column (0-based) to align inline comments to; `0` means a single
    /// space before the `#` instead of alignment.
    pub comment_column: usize,
    /// Minimum blank lines to insert above a head comment group, even if
    /// the source had fewer (or the comment was synthesized).
    pub blank_lines_before_comment: u32,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        SerializerOptions {
            indent: 2,
            use_tabs: false,
            prefer_flow: false,
            prefer_block: false,
            line_width: 80,
            explicit_document_start: false,
            explicit_document_end: false,
            emit_tags: false,
            preserve_comments: true,
            preserve_blank_lines: true,
            comment_column: 0,
            blank_lines_before_comment: 0,
        }
    }
}

/// Serialize `doc` to a YAML string under `options`.
pub fn serialize(doc: &Document, options: &SerializerOptions) -> Result<String, SerializerError> {
    let mut out = String::new();
    let tags = TagResolver::new();
    let mut emitter = Emitter {
        out: &mut out,
        options,
        tags: &tags,
        emitted_anchors: HashSet::new(),
    };
    emitter.write_document(doc)?;
    Ok(out)
}

struct Emitter<'a> {
    out: &'a mut String,
    options: &'a SerializerOptions,
    tags: &'a TagResolver,
    /// `NodeId`s of anchored nodes already written in full. A `NodeId`
    /// resolves to the same node at every alias site (the parser shares
    /// the arena slot rather than cloning it), so the second and later
    /// times one of these is reached during the walk, it is emitted as
    /// `*name` instead of being walked again.
    emitted_anchors: HashSet<NodeId>,
}

impl<'a> Emitter<'a> {
    fn write_document(&mut self, doc: &Document) -> Result<(), SerializerError> {
        if let Some((major, minor)) = doc.version_directive {
            writeln!(self.out, "%YAML {major}.{minor}")?;
        }
        for (handle, prefix) in &doc.tag_directives {
            writeln!(self.out, "%TAG {handle} {prefix}")?;
        }
        if doc.explicit_start || self.options.explicit_document_start || doc.version_directive.is_some() {
            writeln!(self.out, "---")?;
        }
        if self.options.preserve_comments {
            for comment in &doc.leading_comments.0 {
                self.write_blank_lines(comment.blank_lines_before)?;
                writeln!(self.out, "#{}", comment_text(&comment.text))?;
            }
        }
        if let Some(root) = doc.root {
            self.write_node(doc, root, 0, true)?;
        }
        if doc.explicit_end || self.options.explicit_document_end {
            writeln!(self.out, "...")?;
        }
        Ok(())
    }

    fn write_blank_lines(&mut self, count: u32) -> Result<(), SerializerError> {
        if self.options.preserve_blank_lines {
            for _ in 0..count {
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    /// Like [`Emitter::write_blank_lines`], but never writes fewer than
    /// `blank_lines_before_comment`, since a head comment must get its
    /// configured minimum spacing even when the source had less (or the
    /// comment has no source position at all).
    fn write_blank_lines_before_comment(&mut self, count: u32) -> Result<(), SerializerError> {
        self.write_blank_lines(count.max(self.options.blank_lines_before_comment))
    }

    fn write_head_comments(&mut self, node: &Node, indent: usize) -> Result<(), SerializerError> {
        self.write_head_comment_group(&node.head_comments, indent)
    }

    /// Shared by node head comments and mapping-pair head comments (the
    /// latter don't have a [`Node`] of their own to hang comments off of).
    fn write_head_comment_group(&mut self, comments: &CommentGroup, indent: usize) -> Result<(), SerializerError> {
        if !self.options.preserve_comments {
            return Ok(());
        }
        for comment in &comments.0 {
            self.write_blank_lines_before_comment(comment.blank_lines_before)?;
            self.write_indent(indent)?;
            writeln!(self.out, "#{}", comment_text(&comment.text))?;
        }
        Ok(())
    }

    fn write_foot_comments(&mut self, node: &Node, indent: usize) -> Result<(), SerializerError> {
        if !self.options.preserve_comments {
            return Ok(());
        }
        for comment in &node.foot_comments.0 {
            self.write_blank_lines(comment.blank_lines_before)?;
            self.write_indent(indent)?;
            writeln!(self.out, "#{}", comment_text(&comment.text))?;
        }
        Ok(())
    }

    fn write_indent(&mut self, indent: usize) -> Result<(), SerializerError> {
        if self.options.use_tabs {
            let tabs = indent / 8;
            let remainder = indent % 8;
            for _ in 0..tabs {
                write!(self.out, "\t")?;
            }
            write!(self.out, "{:remainder$}", "", remainder = remainder)?;
        } else {
            write!(self.out, "{:indent$}", "", indent = indent)?;
        }
        Ok(())
    }

    /// Whether a node's collection style should render as flow, after
    /// `prefer_flow`/`prefer_block` overrides are applied.
    fn effective_style(&self, style: CollectionStyle) -> CollectionStyle {
        if self.options.prefer_flow {
            CollectionStyle::Flow
        } else if self.options.prefer_block {
            CollectionStyle::Block
        } else {
            style
        }
    }

    /// Current column (0-based) the next character would be written at,
    /// used to decide whether a flow collection needs to wrap.
    fn current_column(&self) -> usize {
        self.out.rsplit('\n').next().map_or(0, |line| line.chars().count())
    }

    /// If `node` is an alias occurrence — it carries an anchor name and has
    /// already been written once under that anchor — returns the anchor
    /// name so the caller can emit `*name` instead of re-walking the node.
    /// The first time a given anchored `id` is seen, records it and returns
    /// `None`, meaning the caller should write the node normally (preceded
    /// by its `&name` declaration).
    fn alias_reference<'n>(&mut self, node: &'n Node, id: NodeId) -> Option<&'n str> {
        let name = node.anchor.as_deref()?;
        if self.emitted_anchors.insert(id) {
            None
        } else {
            Some(name)
        }
    }

    fn write_anchor_prefix(&mut self, node: &Node) -> Result<(), SerializerError> {
        if let Some(name) = &node.anchor {
            write!(self.out, "&{name} ")?;
        }
        Ok(())
    }

    fn write_tag_prefix(&mut self, node: &Node) -> Result<(), SerializerError> {
        if !self.options.emit_tags {
            return Ok(());
        }
        if let Some(tag) = &node.tag {
            if let Some(shorthand) = tag.strip_prefix("tag:yaml.org,2002:") {
                write!(self.out, "!!{shorthand} ")?;
            } else {
                write!(self.out, "!<{tag}> ")?;
            }
        }
        Ok(())
    }

    /// Write a node at `indent` (spaces). `at_line_start` is false when
    /// the caller has already written something on the current line (a
    /// `- ` or `key: ` prefix) and this call should continue on that line
    /// rather than starting a fresh one.
    fn write_node(
        &mut self,
        doc: &Document,
        id: NodeId,
        indent: usize,
        at_line_start: bool,
    ) -> Result<(), SerializerError> {
        let node = doc.get_node(id);
        if let Some(name) = self.alias_reference(node, id) {
            if at_line_start {
                self.write_indent(indent)?;
            }
            write!(self.out, "*{name}")?;
            writeln!(self.out)?;
            return Ok(());
        }
        if !at_line_start {
            self.write_anchor_prefix(node)?;
            self.write_tag_prefix(node)?;
        }
        match &node.data {
            NodeData::Scalar { value, style } => {
                if at_line_start {
                    self.write_indent(indent)?;
                    self.write_anchor_prefix(node)?;
                    self.write_tag_prefix(node)?;
                }
                let forced_str = node.tag.as_deref() == Some(STR_TAG);
                self.write_scalar(value, *style, forced_str)?;
                self.write_line_comment(node)?;
                writeln!(self.out)?;
            }
            NodeData::Sequence { items, style } => {
                let flow = matches!(self.effective_style(*style), CollectionStyle::Flow);
                if flow {
                    self.write_flow_sequence(doc, items, indent)?;
                    self.write_line_comment(node)?;
                    writeln!(self.out)?;
                } else {
                    if !at_line_start {
                        writeln!(self.out)?;
                    }
                    if items.is_empty() {
                        self.write_indent(indent)?;
                        writeln!(self.out, "[]")?;
                    } else {
                        for item in items {
                            let item_node = doc.get_node(*item);
                            self.write_blank_lines(item_node.blank_lines_before)?;
                            self.write_head_comments(item_node, indent)?;
                            self.write_indent(indent)?;
                            write!(self.out, "-")?;
                            self.write_inline_or_nested(doc, *item, indent + self.options.indent)?;
                        }
                    }
                    self.write_foot_comments(node, indent)?;
                }
            }
            NodeData::Mapping { pairs, style } => {
                let flow = matches!(self.effective_style(*style), CollectionStyle::Flow);
                if flow {
                    self.write_flow_mapping(doc, pairs, indent)?;
                    self.write_line_comment(node)?;
                    writeln!(self.out)?;
                } else {
                    if !at_line_start {
                        writeln!(self.out)?;
                    }
                    if pairs.is_empty() {
                        self.write_indent(indent)?;
                        writeln!(self.out, "{{}}")?;
                    } else {
                        for pair in pairs {
                            self.write_blank_lines(pair.blank_lines_before)?;
                            self.write_head_comment_group(&pair.head, indent)?;
                            self.write_indent(indent)?;
                            let key_node = doc.get_node(pair.key);
                            match &key_node.data {
                                NodeData::Scalar { value, style } => {
                                    if let Some(name) = self.alias_reference(key_node, pair.key) {
                                        write!(self.out, "*{name}")?;
                                    } else {
                                        self.write_anchor_prefix(key_node)?;
                                        self.write_tag_prefix(key_node)?;
                                        let forced_str = key_node.tag.as_deref() == Some(STR_TAG);
                                        self.write_scalar(value, *style, forced_str)?;
                                    }
                                }
                                _ => {
                                    self.write_tag_prefix(key_node)?;
                                    write!(self.out, "?")?;
                                    self.write_inline_or_nested(doc, pair.key, indent + self.options.indent)?;
                                    self.write_indent(indent)?;
                                }
                            }
                            write!(self.out, ":")?;
                            self.write_inline_or_nested(doc, pair.value, indent + self.options.indent)?;
                        }
                    }
                    self.write_foot_comments(node, indent)?;
                }
            }
        }
        Ok(())
    }

    /// After writing a `-` or `key:` prefix, write the value either inline
    /// on the same line (scalars and flow collections) or starting a new
    /// indented block (nested block collections).
    fn write_inline_or_nested(&mut self, doc: &Document, id: NodeId, indent: usize) -> Result<(), SerializerError> {
        let node = doc.get_node(id);
        let is_block_collection = match &node.data {
            NodeData::Sequence { style, .. } | NodeData::Mapping { style, .. } => {
                matches!(self.effective_style(*style), CollectionStyle::Block)
            }
            NodeData::Scalar { .. } => false,
        };
        let is_empty = matches!(&node.data, NodeData::Sequence { items, .. } if items.is_empty())
            || matches!(&node.data, NodeData::Mapping { pairs, .. } if pairs.is_empty());
        if is_block_collection && !is_empty {
            self.write_node(doc, id, indent, false)
        } else {
            write!(self.out, " ")?;
            self.write_node(doc, id, indent, false)
        }
    }

    fn write_line_comment(&mut self, node: &Node) -> Result<(), SerializerError> {
        if self.options.preserve_comments {
            if let Some(comment) = &node.line_comment {
                if self.options.comment_column > 0 {
                    let column = self.current_column();
                    let padding = self.options.comment_column.saturating_sub(column).max(1);
                    write!(self.out, "{:padding$}#{}", "", comment_text(&comment.text), padding = padding)?;
                } else {
                    write!(self.out, " #{}", comment_text(&comment.text))?;
                }
            }
        }
        Ok(())
    }

    /// Whether the current line has already reached the configured
    /// `line_width`, so the next flow element should wrap onto a fresh,
    /// indented line instead of continuing after a space. `line_width: 0`
    /// disables wrapping entirely.
    fn should_wrap_flow(&self) -> bool {
        self.options.line_width > 0 && self.current_column() >= self.options.line_width
    }

    fn write_flow_sequence(&mut self, doc: &Document, items: &[NodeId], indent: usize) -> Result<(), SerializerError> {
        write!(self.out, "[")?;
        let inner_indent = indent + self.options.indent;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(self.out, ",")?;
                if self.should_wrap_flow() {
                    writeln!(self.out)?;
                    self.write_indent(inner_indent)?;
                } else {
                    write!(self.out, " ")?;
                }
            }
            self.write_flow_value(doc, *item, inner_indent)?;
        }
        write!(self.out, "]")?;
        Ok(())
    }

    fn write_flow_mapping(&mut self, doc: &Document, pairs: &[crate::node::Pair], indent: usize) -> Result<(), SerializerError> {
        write!(self.out, "{{")?;
        let inner_indent = indent + self.options.indent;
        for (i, pair) in pairs.iter().enumerate() {
            if i > 0 {
                write!(self.out, ",")?;
                if self.should_wrap_flow() {
                    writeln!(self.out)?;
                    self.write_indent(inner_indent)?;
                } else {
                    write!(self.out, " ")?;
                }
            }
            self.write_flow_value(doc, pair.key, inner_indent)?;
            write!(self.out, ": ")?;
            self.write_flow_value(doc, pair.value, inner_indent)?;
        }
        write!(self.out, "}}")?;
        Ok(())
    }

    fn write_flow_value(&mut self, doc: &Document, id: NodeId, indent: usize) -> Result<(), SerializerError> {
        let node = doc.get_node(id);
        if let Some(name) = self.alias_reference(node, id) {
            write!(self.out, "*{name}")?;
            return Ok(());
        }
        self.write_anchor_prefix(node)?;
        self.write_tag_prefix(node)?;
        match &node.data {
            NodeData::Scalar { value, style } => {
                let forced_str = node.tag.as_deref() == Some(STR_TAG);
                self.write_scalar(value, *style, forced_str)
            }
            NodeData::Sequence { items, .. } => self.write_flow_sequence(doc, items, indent),
            NodeData::Mapping { pairs, .. } => self.write_flow_mapping(doc, pairs, indent),
        }
    }

    fn write_scalar(&mut self, value: &str, style: ScalarStyle, forced_str: bool) -> Result<(), SerializerError> {
        let resolved_style = if style == ScalarStyle::Plain && needs_quoting(value, forced_str, self.tags) {
            ScalarStyle::SingleQuoted
        } else {
            style
        };
        match resolved_style {
            ScalarStyle::Plain => write!(self.out, "{value}")?,
            ScalarStyle::SingleQuoted => {
                write!(self.out, "'{}'", value.replace('\'', "''"))?;
            }
            ScalarStyle::DoubleQuoted => {
                write!(self.out, "\"{}\"", escape_double_quoted(value))?;
            }
            ScalarStyle::Literal => {
                write!(self.out, "|")?;
                for line in value.trim_end_matches('\n').split('\n') {
                    write!(self.out, "\n  {line}")?;
                }
            }
            ScalarStyle::Folded => {
                write!(self.out, ">")?;
                for line in value.trim_end_matches('\n').split('\n') {
                    write!(self.out, "\n  {line}")?;
                }
            }
        }
        Ok(())
    }
}

fn comment_text(text: &str) -> String {
    if text.is_empty() || text.starts_with(' ') {
        text.to_string()
    } else {
        format!(" {text}")
    }
}

fn escape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether a plain-style scalar must be quoted: it is empty, carries an
/// explicit string tag that the text would not otherwise infer, or
/// contains characters that would be parsed as structure.
fn needs_quoting(value: &str, forced_str: bool, tags: &TagResolver) -> bool {
    if value.is_empty() {
        return true;
    }
    if value.trim() != value {
        return true;
    }
    if forced_str && tags.infer_scalar_tag(value) != STR_TAG {
        return true;
    }
    if value.contains(['\n', '#', '\'', '"']) {
        return true;
    }
    if value.contains(": ") || value.ends_with(':') {
        return true;
    }
    if value.contains(", ") || value.starts_with(['[', ']', '{', '}', '&', '*', '!', '|', '>', '%', '@', '`']) {
        return true;
    }
    if value.starts_with('-') && (value.len() == 1 || value.as_bytes()[1] == b' ') {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn round_trips_simple_mapping() {
        let doc = parse("a: 1\nb: 2\n").unwrap();
        let out = serialize(&doc, &SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: 1\nb: 2\n");
    }

    #[test]
    fn preserves_comments_on_reserialize() {
        let doc = parse("# header\na: 1 # inline\n").unwrap();
        let out = serialize(&doc, &SerializerOptions::default()).unwrap();
        assert_eq!(out, "# header\na: 1 # inline\n");
    }

    #[test]
    fn untagged_plain_scalars_round_trip_unchanged() {
        let doc = parse("a: yes\n").unwrap();
        let out = serialize(&doc, &SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: yes\n");
    }

    #[test]
    fn explicit_string_tag_forces_quoting_when_ambiguous() {
        let doc = parse("a: !!str yes\n").unwrap();
        let out = serialize(&doc, &SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: 'yes'\n");
    }

    #[test]
    fn empty_collections_use_canonical_form() {
        let doc = parse("a: []\nb: {}\n").unwrap();
        let out = serialize(&doc, &SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: []\nb: {}\n");
    }

    #[test]
    fn use_tabs_indents_block_sequences_with_tab_characters() {
        let doc = parse("a:\n  - 1\n").unwrap();
        let options = SerializerOptions { indent: 8, use_tabs: true, ..SerializerOptions::default() };
        let out = serialize(&doc, &options).unwrap();
        assert_eq!(out, "a:\n\t- 1\n");
    }

    #[test]
    fn prefer_flow_overrides_every_collections_own_style() {
        // prefer_flow applies uniformly, so the root mapping itself also
        // switches from block to flow, not just the nested sequence.
        let doc = parse("a:\n  - 1\n  - 2\n").unwrap();
        let options = SerializerOptions { prefer_flow: true, ..SerializerOptions::default() };
        let out = serialize(&doc, &options).unwrap();
        assert_eq!(out, "{a: [1, 2]}\n");
    }

    #[test]
    fn prefer_block_overrides_a_flow_mappings_own_style() {
        let doc = parse("a: {b: 1, c: 2}\n").unwrap();
        let options = SerializerOptions { prefer_block: true, ..SerializerOptions::default() };
        let out = serialize(&doc, &options).unwrap();
        assert_eq!(out, "a:\n  b: 1\n  c: 2\n");
    }

    #[test]
    fn line_width_wraps_a_long_flow_sequence() {
        let doc = parse("[1, 2, 3, 4, 5]\n").unwrap();
        let options = SerializerOptions { line_width: 7, ..SerializerOptions::default() };
        let out = serialize(&doc, &options).unwrap();
        assert_eq!(out, "[1, 2, 3,\n  4, 5]\n");
    }

    #[test]
    fn comment_column_aligns_inline_comments() {
        let doc = parse("a: 1 # c\n").unwrap();
        let options = SerializerOptions { comment_column: 10, ..SerializerOptions::default() };
        let out = serialize(&doc, &options).unwrap();
        assert_eq!(out, format!("a: 1{}# c\n", " ".repeat(6)));
    }

    #[test]
    fn anchor_and_alias_round_trip_without_duplicating_the_value() {
        let doc = parse("a: &x 1\nb: *x\n").unwrap();
        let out = serialize(&doc, &SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: &x 1\nb: *x\n");
    }

    #[test]
    fn aliased_flow_sequence_emits_a_reference_not_a_copy() {
        let doc = parse("a: &x [1, 2]\nb: *x\n").unwrap();
        let out = serialize(&doc, &SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: &x [1, 2]\nb: *x\n");
    }

    #[test]
    fn blank_lines_before_comment_forces_a_minimum_gap() {
        let doc = parse("a: 1\n# c\nb: 2\n").unwrap();
        let options = SerializerOptions { blank_lines_before_comment: 2, ..SerializerOptions::default() };
        let out = serialize(&doc, &options).unwrap();
        assert_eq!(out, "a: 1\n\n\n# c\nb: 2\n");
    }
}
