//! Recursive-descent construction of a [`Document`] tree directly from the
//! scanner's token stream — no intermediate event type, since this crate
//! has no public streaming API.

use crate::anchors::AnchorRegistry;
use crate::error::{Mark, ParserError};
use crate::node::{Comment, CommentGroup, Document, NodeId, Pair, Stream};
use crate::scanner::Scanner;
use crate::tags::TagResolver;
use crate::token::{CollectionStyle, ScalarStyle, Token, TokenData};

/// Default recursion ceiling for nested collections, shared between block
/// and flow contexts.
pub const DEFAULT_MAX_DEPTH: u32 = 1000;

pub struct Parser {
    scanner: Scanner,
    tags: TagResolver,
    lookahead: Vec<Token>,
    depth: u32,
    max_depth: u32,
    pending_head: Vec<Comment>,
    anchors: AnchorRegistry,
}

impl Parser {
    pub fn new(text: &str) -> Self {
        Parser {
            scanner: Scanner::new(text),
            tags: TagResolver::new(),
            lookahead: Vec::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            pending_head: Vec::new(),
            anchors: AnchorRegistry::new(),
        }
    }

    pub fn with_tag_resolver(mut self, tags: TagResolver) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn fill(&mut self, n: usize) -> Result<(), ParserError> {
        while self.lookahead.len() < n {
            let tok = self.scanner.advance()?;
            self.lookahead.push(tok);
        }
        Ok(())
    }

    fn peek(&mut self, i: usize) -> Result<&Token, ParserError> {
        self.fill(i + 1)?;
        Ok(&self.lookahead[i])
    }

    fn bump(&mut self) -> Result<Token, ParserError> {
        self.fill(1)?;
        Ok(self.lookahead.remove(0))
    }

    fn column_of(tok: &Token) -> i64 {
        tok.start_mark.column as i64 - 1
    }

    /// Consume any run of standalone (non-inline) comment tokens sitting at
    /// the front of the stream, buffering them as pending head comments for
    /// whichever node or pair is parsed next.
    fn drain_standalone_comments(&mut self) -> Result<(), ParserError> {
        loop {
            let is_comment = matches!(self.peek(0)?.data, TokenData::Comment { .. });
            if !is_comment {
                return Ok(());
            }
            let tok = self.bump()?;
            if let TokenData::Comment { text, .. } = tok.data {
                self.pending_head.push(Comment {
                    text,
                    blank_lines_before: tok.blank_lines_before,
                });
            }
        }
    }

    fn take_head(&mut self) -> CommentGroup {
        CommentGroup(std::mem::take(&mut self.pending_head))
    }

    /// If the very next token is an inline comment, consume it and attach
    /// it to `id` as a trailing line comment.
    fn maybe_attach_inline(&mut self, doc: &mut Document, id: NodeId) -> Result<(), ParserError> {
        if let TokenData::Comment { is_inline: true, .. } = self.peek(0)?.data {
            let tok = self.bump()?;
            if let TokenData::Comment { text, .. } = tok.data {
                doc.get_node_mut(id).line_comment = Some(Comment {
                    text,
                    blank_lines_before: tok.blank_lines_before,
                });
            }
        }
        Ok(())
    }

    fn resolve_tag_token(&self, tag: Option<(String, String)>) -> Option<String> {
        tag.map(|(handle, suffix)| self.tags.resolve_tag(&handle, &suffix))
    }

    /// Parse a node at a "value" position: applies the inline-trailing-
    /// comment rule after the node completes. This is the entry point used
    /// everywhere a single node is expected (sequence items, mapping
    /// values, flow entries, the document root).
    fn parse_value(&mut self, doc: &mut Document, allow_mapping_expand: bool) -> Result<NodeId, ParserError> {
        let id = self.parse_node(doc, allow_mapping_expand)?;
        self.maybe_attach_inline(doc, id)?;
        Ok(id)
    }

    fn parse_node(&mut self, doc: &mut Document, allow_mapping_expand: bool) -> Result<NodeId, ParserError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            let mark = self.peek(0)?.start_mark;
            self.depth -= 1;
            return Err(ParserError::RecursionLimitExceeded { mark });
        }
        let result = self.parse_node_inner(doc, allow_mapping_expand);
        self.depth -= 1;
        result
    }

    fn parse_node_inner(&mut self, doc: &mut Document, allow_mapping_expand: bool) -> Result<NodeId, ParserError> {
        self.drain_standalone_comments()?;
        let blank_lines_before = self.peek(0)?.blank_lines_before;

        let mut anchor: Option<String> = None;
        let mut tag: Option<(String, String)> = None;
        loop {
            match &self.peek(0)?.data {
                TokenData::Anchor(_) => {
                    let tok = self.bump()?;
                    if let TokenData::Anchor(name) = tok.data {
                        anchor = Some(name);
                    }
                }
                TokenData::Tag { .. } => {
                    let tok = self.bump()?;
                    if let TokenData::Tag { handle, suffix } = tok.data {
                        tag = Some((handle, suffix));
                    }
                }
                _ => break,
            }
        }

        let head = self.take_head();
        let in_flow = self.scanner.flow_level() > 0;
        let start_mark = self.peek(0)?.start_mark;

        match &self.peek(0)?.data {
            TokenData::Alias(_) => {
                let tok = self.bump()?;
                let TokenData::Alias(name) = tok.data else {
                    unreachable!()
                };
                self.anchors.resolve(&name, tok.start_mark)
            }
            TokenData::SequenceEntry if !in_flow => {
                let id = self.parse_block_sequence(doc)?;
                self.finish_node(doc, id, anchor, tag, head, blank_lines_before, start_mark)
            }
            TokenData::FlowSequenceStart => {
                let id = self.parse_flow_sequence(doc)?;
                self.finish_node(doc, id, anchor, tag, head, blank_lines_before, start_mark)
            }
            TokenData::FlowMappingStart => {
                let id = self.parse_flow_mapping(doc)?;
                self.finish_node(doc, id, anchor, tag, head, blank_lines_before, start_mark)
            }
            TokenData::MappingKey if !in_flow => {
                let id = self.parse_block_mapping_explicit(doc)?;
                self.finish_node(doc, id, anchor, tag, head, blank_lines_before, start_mark)
            }
            TokenData::Scalar { .. } => {
                let tok = self.bump()?;
                let TokenData::Scalar { value, style } = tok.data else {
                    unreachable!()
                };
                if allow_mapping_expand && !in_flow {
                    if let TokenData::MappingValue = self.peek(0)?.data {
                        let id = self.parse_block_mapping_implicit(doc, value, style, tok.start_mark, tok.end_mark)?;
                        return self.finish_node(doc, id, anchor, tag, head, blank_lines_before, start_mark);
                    }
                }
                let id = doc.add_scalar(value, style, tok.start_mark, tok.end_mark);
                self.finish_node(doc, id, anchor, tag, head, blank_lines_before, start_mark)
            }
            other => Err(ParserError::UnexpectedToken {
                problem: token_kind_name(other),
                mark: start_mark,
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_node(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        anchor: Option<String>,
        tag: Option<(String, String)>,
        head: CommentGroup,
        blank_lines_before: u32,
        _start_mark: Mark,
    ) -> Result<NodeId, ParserError> {
        let mark = doc.get_node(id).start_mark;
        if let Some(name) = &anchor {
            log::trace!("parser: registering anchor {name:?} at {mark:?}");
            self.anchors.register(name.clone(), id, mark)?;
        }
        let node = doc.get_node_mut(id);
        node.anchor = anchor;
        node.tag = self.resolve_tag_token(tag);
        node.head_comments = head;
        node.blank_lines_before = blank_lines_before;
        Ok(id)
    }

    fn parse_block_sequence(&mut self, doc: &mut Document) -> Result<NodeId, ParserError> {
        let first = self.peek(0)?.clone();
        let col = Self::column_of(&first);
        let seq = doc.add_sequence(CollectionStyle::Block, first.start_mark, first.end_mark);
        loop {
            self.drain_standalone_comments()?;
            let at_col = matches!(self.peek(0)?.data, TokenData::SequenceEntry)
                && Self::column_of(self.peek(0)?) == col;
            if !at_col {
                break;
            }
            let dash = self.bump()?;
            let item = self.parse_value(doc, true)?;
            doc.get_node_mut(item).blank_lines_before = dash.blank_lines_before;
            doc.append_sequence_item(seq, item);
        }
        let foot = self.take_head();
        doc.get_node_mut(seq).foot_comments = foot;
        let end_mark = self.peek(0)?.start_mark;
        doc.get_node_mut(seq).end_mark = end_mark;
        Ok(seq)
    }

    fn parse_block_mapping_explicit(&mut self, doc: &mut Document) -> Result<NodeId, ParserError> {
        let first = self.peek(0)?.clone();
        let col = Self::column_of(&first);
        let map = doc.add_mapping(CollectionStyle::Block, first.start_mark, first.end_mark);
        loop {
            self.drain_standalone_comments()?;
            if !self.at_mapping_continuation(col)? {
                break;
            }
            let pair_blank = self.peek(0)?.blank_lines_before;
            let head = self.take_head();
            let (key, value) = self.parse_one_pair(doc, col)?;
            doc.append_mapping_pair(
                map,
                Pair {
                    key,
                    value,
                    head,
                    blank_lines_before: pair_blank,
                },
            );
        }
        let foot = self.take_head();
        doc.get_node_mut(map).foot_comments = foot;
        let end_mark = self.peek(0)?.start_mark;
        doc.get_node_mut(map).end_mark = end_mark;
        Ok(map)
    }

    /// Parse a block mapping whose first key scalar has already been
    /// scanned (the common `key: value` form, detected by lookahead in
    /// [`Parser::parse_node_inner`]).
    fn parse_block_mapping_implicit(
        &mut self,
        doc: &mut Document,
        first_key_value: String,
        first_key_style: ScalarStyle,
        key_start: Mark,
        key_end: Mark,
    ) -> Result<NodeId, ParserError> {
        let col = key_start.column as i64 - 1;
        let map = doc.add_mapping(CollectionStyle::Block, key_start, key_end);
        let first_key = doc.add_scalar(first_key_value, first_key_style, key_start, key_end);
        // consume the ':' we peeked to detect this shape
        self.bump()?;
        let first_value = self.parse_value(doc, true)?;
        doc.append_mapping_pair(
            map,
            Pair {
                key: first_key,
                value: first_value,
                head: CommentGroup::default(),
                blank_lines_before: 0,
            },
        );
        loop {
            self.drain_standalone_comments()?;
            if !self.at_mapping_continuation(col)? {
                break;
            }
            let pair_blank = self.peek(0)?.blank_lines_before;
            let head = self.take_head();
            let (key, value) = self.parse_one_pair(doc, col)?;
            doc.append_mapping_pair(
                map,
                Pair {
                    key,
                    value,
                    head,
                    blank_lines_before: pair_blank,
                },
            );
        }
        let foot = self.take_head();
        doc.get_node_mut(map).foot_comments = foot;
        let end_mark = self.peek(0)?.start_mark;
        doc.get_node_mut(map).end_mark = end_mark;
        Ok(map)
    }

    /// Parse one `key: value` or `? key \n : value` pair at the current
    /// position, assuming [`Parser::at_mapping_continuation`] already
    /// confirmed one is present.
    fn parse_one_pair(&mut self, doc: &mut Document, col: i64) -> Result<(NodeId, NodeId), ParserError> {
        if matches!(self.peek(0)?.data, TokenData::MappingKey) {
            self.bump()?;
            let key = self.parse_value(doc, false)?;
            self.drain_standalone_comments()?;
            let has_value = matches!(self.peek(0)?.data, TokenData::MappingValue)
                && Self::column_of(self.peek(0)?) >= col;
            let value = if has_value {
                self.bump()?;
                self.parse_value(doc, true)?
            } else {
                let mark = self.peek(0)?.start_mark;
                doc.add_scalar(String::new(), ScalarStyle::Plain, mark, mark)
            };
            Ok((key, value))
        } else {
            let key = self.parse_value(doc, false)?;
            if !matches!(self.peek(0)?.data, TokenData::MappingValue) {
                return Err(ParserError::UnexpectedToken {
                    problem: "expected ':' after mapping key",
                    mark: self.peek(0)?.start_mark,
                });
            }
            self.bump()?;
            let value = self.parse_value(doc, true)?;
            Ok((key, value))
        }
    }

    /// Whether the upcoming token(s) begin another pair of the mapping
    /// whose keys sit at column `col`.
    fn at_mapping_continuation(&mut self, col: i64) -> Result<bool, ParserError> {
        let tok0 = self.peek(0)?.clone();
        if Self::column_of(&tok0) != col {
            return Ok(false);
        }
        match &tok0.data {
            TokenData::MappingKey => Ok(true),
            TokenData::Scalar { .. } => Ok(matches!(self.peek(1)?.data, TokenData::MappingValue)),
            _ => Ok(false),
        }
    }

    fn parse_flow_sequence(&mut self, doc: &mut Document) -> Result<NodeId, ParserError> {
        let open = self.bump()?;
        let seq = doc.add_sequence(CollectionStyle::Flow, open.start_mark, open.end_mark);
        loop {
            self.drain_standalone_comments()?;
            if matches!(self.peek(0)?.data, TokenData::FlowSequenceEnd) {
                break;
            }
            let item = self.parse_value(doc, false)?;
            doc.append_sequence_item(seq, item);
            self.drain_standalone_comments()?;
            match self.peek(0)?.data {
                TokenData::FlowEntry => {
                    self.bump()?;
                }
                TokenData::FlowSequenceEnd => break,
                _ => {
                    return Err(ParserError::UnexpectedToken {
                        problem: "expected ',' or ']' in flow sequence",
                        mark: self.peek(0)?.start_mark,
                    })
                }
            }
        }
        let end = self.bump()?;
        doc.get_node_mut(seq).end_mark = end.end_mark;
        Ok(seq)
    }

    fn parse_flow_mapping(&mut self, doc: &mut Document) -> Result<NodeId, ParserError> {
        let open = self.bump()?;
        let map = doc.add_mapping(CollectionStyle::Flow, open.start_mark, open.end_mark);
        loop {
            self.drain_standalone_comments()?;
            if matches!(self.peek(0)?.data, TokenData::FlowMappingEnd) {
                break;
            }
            let head = self.take_head();
            let blank_lines_before = self.peek(0)?.blank_lines_before;
            let key = self.parse_value(doc, false)?;
            self.drain_standalone_comments()?;
            let value = if matches!(self.peek(0)?.data, TokenData::MappingValue) {
                self.bump()?;
                self.parse_value(doc, false)?
            } else {
                let mark = self.peek(0)?.start_mark;
                doc.add_scalar(String::new(), ScalarStyle::Plain, mark, mark)
            };
            doc.append_mapping_pair(
                map,
                Pair {
                    key,
                    value,
                    head,
                    blank_lines_before,
                },
            );
            self.drain_standalone_comments()?;
            match self.peek(0)?.data {
                TokenData::FlowEntry => {
                    self.bump()?;
                }
                TokenData::FlowMappingEnd => break,
                _ => {
                    return Err(ParserError::UnexpectedToken {
                        problem: "expected ',' or '}' in flow mapping",
                        mark: self.peek(0)?.start_mark,
                    })
                }
            }
        }
        let end = self.bump()?;
        doc.get_node_mut(map).end_mark = end.end_mark;
        Ok(map)
    }

    /// Parse a stream of zero or more documents, handling directives and
    /// explicit `---`/`...` markers.
    pub fn parse_stream(&mut self) -> Result<Stream, ParserError> {
        // consume StreamStart
        let first = self.bump()?;
        debug_assert!(matches!(first.data, TokenData::StreamStart));

        let mut stream = Stream::new();
        loop {
            if matches!(self.peek(0)?.data, TokenData::StreamEnd) {
                break;
            }

            let mut version_directive = None;
            let mut tag_directives = Vec::new();
            loop {
                if let TokenData::Directive { .. } = self.peek(0)?.data {
                    let tok = self.bump()?;
                    if let TokenData::Directive { name, value } = tok.data {
                        if name == "YAML" {
                            if let Some((maj, min)) = value.split_once('.') {
                                if let (Ok(maj), Ok(min)) = (maj.parse(), min.parse()) {
                                    version_directive = Some((maj, min));
                                }
                            }
                        } else if name == "TAG" {
                            if let Some((handle, prefix)) = value.split_once(char::is_whitespace) {
                                tag_directives.push((handle.to_string(), prefix.trim().to_string()));
                            }
                        }
                    }
                } else {
                    break;
                }
            }

            let explicit_start = if matches!(self.peek(0)?.data, TokenData::DocumentStart) {
                self.bump()?;
                true
            } else {
                false
            };

            if matches!(self.peek(0)?.data, TokenData::StreamEnd) && !explicit_start {
                break;
            }

            let mut doc = Document::new();
            doc.version_directive = version_directive;
            doc.tag_directives = tag_directives;
            doc.explicit_start = explicit_start;
            self.anchors = AnchorRegistry::new();

            self.drain_standalone_comments()?;
            let empty = matches!(
                self.peek(0)?.data,
                TokenData::DocumentStart | TokenData::DocumentEnd | TokenData::StreamEnd
            );
            if empty {
                doc.leading_comments = self.take_head();
            } else {
                let root = self.parse_value(&mut doc, true)?;
                doc.root = Some(root);
                self.drain_standalone_comments()?;
                let foot = self.take_head();
                if let Some(root) = doc.root {
                    let existing = std::mem::take(&mut doc.get_node_mut(root).foot_comments);
                    let mut merged = existing.0;
                    merged.extend(foot.0);
                    doc.get_node_mut(root).foot_comments = CommentGroup(merged);
                }
            }

            doc.explicit_end = if matches!(self.peek(0)?.data, TokenData::DocumentEnd) {
                self.bump()?;
                true
            } else {
                false
            };

            resolve_merge_keys(&mut doc, &self.tags)?;
            stream.documents.push(doc);
        }
        Ok(stream)
    }

    /// Parse exactly one document from the stream (a convenience wrapper
    /// used by the single-document public facade).
    pub fn parse_single(&mut self) -> Result<Document, ParserError> {
        let mut stream = self.parse_stream()?;
        if stream.documents.is_empty() {
            stream.documents.push(Document::new());
        }
        Ok(stream.documents.remove(0))
    }
}

fn token_kind_name(data: &TokenData) -> &'static str {
    match data {
        TokenData::StreamStart => "start of stream",
        TokenData::StreamEnd => "end of stream",
        TokenData::DocumentStart => "'---'",
        TokenData::DocumentEnd => "'...'",
        TokenData::Directive { .. } => "a directive",
        TokenData::Anchor(_) => "an anchor",
        TokenData::Alias(_) => "an alias",
        TokenData::Tag { .. } => "a tag",
        TokenData::SequenceEntry => "'-'",
        TokenData::MappingKey => "'?'",
        TokenData::MappingValue => "':'",
        TokenData::FlowSequenceStart => "'['",
        TokenData::FlowSequenceEnd => "']'",
        TokenData::FlowMappingStart => "'{'",
        TokenData::FlowMappingEnd => "'}'",
        TokenData::FlowEntry => "','",
        TokenData::Comment { .. } => "a comment",
        TokenData::Scalar { .. } => "a scalar",
    }
}

const MERGE_KEY: &str = "<<";

/// Resolve `<<` merge keys throughout the document tree, splicing the
/// referenced mapping's (or mappings', for a sequence of merge sources)
/// pairs into the containing mapping in place of the merge key. Explicit
/// keys in the container always win over merged-in keys.
fn resolve_merge_keys(doc: &mut Document, _tags: &TagResolver) -> Result<(), ParserError> {
    if let Some(root) = doc.root {
        resolve_merge_keys_at(doc, root)?;
    }
    Ok(())
}

fn resolve_merge_keys_at(doc: &mut Document, id: NodeId) -> Result<(), ParserError> {
    use crate::node::NodeData;

    let children: Vec<NodeId> = match &doc.get_node(id).data {
        NodeData::Sequence { items, .. } => items.clone(),
        NodeData::Mapping { pairs, .. } => pairs.iter().flat_map(|p| [p.key, p.value]).collect(),
        NodeData::Scalar { .. } => Vec::new(),
    };
    for child in &children {
        resolve_merge_keys_at(doc, *child)?;
    }

    let NodeData::Mapping { pairs, .. } = &doc.get_node(id).data else {
        return Ok(());
    };
    let pairs = pairs.clone();
    let merge_index = pairs
        .iter()
        .position(|p| doc.get_node(p.key).as_scalar() == Some(MERGE_KEY));
    let Some(merge_index) = merge_index else {
        return Ok(());
    };
    log::trace!("parser: splicing merge key at {:?}", doc.get_node(id).start_mark);

    let explicit_keys: std::collections::HashSet<String> = pairs
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != merge_index)
        .filter_map(|(_, p)| doc.get_node(p.key).as_scalar().map(str::to_string))
        .collect();

    let merge_value = pairs[merge_index].value;
    let sources: Vec<NodeId> = match &doc.get_node(merge_value).data {
        NodeData::Mapping { .. } => vec![merge_value],
        NodeData::Sequence { items, .. } => items.clone(),
        _ => {
            return Err(ParserError::IllegalMergeTarget {
                problem: "merge value must be a mapping or a sequence of mappings",
                mark: doc.get_node(merge_value).start_mark,
            })
        }
    };

    let mut seen: std::collections::HashSet<String> = explicit_keys.clone();
    let mut merged_pairs = Vec::new();
    for source in sources {
        let NodeData::Mapping { pairs: source_pairs, .. } = &doc.get_node(source).data else {
            return Err(ParserError::IllegalMergeTarget {
                problem: "merge value must be a mapping or a sequence of mappings",
                mark: doc.get_node(source).start_mark,
            });
        };
        for pair in source_pairs.clone() {
            if let Some(key_str) = doc.get_node(pair.key).as_scalar() {
                if seen.contains(key_str) {
                    continue;
                }
                seen.insert(key_str.to_string());
            }
            merged_pairs.push(pair);
        }
    }

    // Merged pairs always precede this mapping's own explicit pairs,
    // regardless of where the `<<` key sat textually among them.
    let mut new_pairs = Vec::with_capacity(pairs.len() - 1 + merged_pairs.len());
    new_pairs.extend(merged_pairs);
    new_pairs.extend(
        pairs
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != merge_index)
            .map(|(_, pair)| pair),
    );

    if let NodeData::Mapping { pairs, .. } = &mut doc.get_node_mut(id).data {
        *pairs = new_pairs;
    }
    Ok(())
}

/// Parse a single document from `text`.
pub fn parse(text: &str) -> Result<Document, ParserError> {
    Parser::new(text).parse_single()
}

/// Parse a multi-document stream from `text`.
pub fn parse_stream(text: &str) -> Result<Stream, ParserError> {
    Parser::new(text).parse_stream()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_mapping() {
        let doc = parse("a: 1\nb: 2\n").unwrap();
        let root = doc.root.unwrap();
        let node = doc.get_node(root);
        assert!(node.is_mapping());
    }

    #[test]
    fn parses_block_sequence_of_scalars() {
        let doc = parse("- 1\n- 2\n- 3\n").unwrap();
        let root = doc.root.unwrap();
        assert!(doc.get_node(root).is_sequence());
    }

    #[test]
    fn preserves_standalone_and_inline_comments() {
        let doc = parse("# header\na: 1 # inline\n").unwrap();
        let root = doc.root.unwrap();
        let crate::node::NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!("expected mapping")
        };
        assert_eq!(pairs[0].head.0[0].text, "header");
        let value = doc.get_node(pairs[0].value);
        assert_eq!(value.line_comment.as_ref().unwrap().text, "inline");
    }

    #[test]
    fn resolves_alias_to_same_node() {
        let doc = parse("a: &x 1\nb: *x\n").unwrap();
        let root = doc.root.unwrap();
        let crate::node::NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!("expected mapping")
        };
        assert_eq!(pairs[0].value, pairs[1].value);
    }

    #[test]
    fn duplicate_anchor_is_an_error() {
        let err = parse("a: &x 1\nb: &x 2\n");
        assert!(matches!(err, Err(ParserError::DuplicateAnchor { .. })));
    }

    #[test]
    fn merge_key_splices_base_mapping() {
        let doc = parse("base: &b\n  a: 1\n  b: 2\nchild:\n  <<: *b\n  b: 3\n").unwrap();
        let root = doc.root.unwrap();
        let crate::node::NodeData::Mapping { pairs: root_pairs, .. } = &doc.get_node(root).data else {
            panic!("expected mapping")
        };
        let child = root_pairs[1].value;
        let crate::node::NodeData::Mapping { pairs, .. } = &doc.get_node(child).data else {
            panic!("expected mapping")
        };
        let keys: Vec<&str> = pairs
            .iter()
            .map(|p| doc.get_node(p.key).as_scalar().unwrap())
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
        let b_value = doc.get_node(pairs[1].value).as_scalar().unwrap();
        assert_eq!(b_value, "3");
    }

    #[test]
    fn merged_pairs_precede_explicit_pairs_regardless_of_merge_key_position() {
        let doc = parse("base: &b\n  a: 1\n  b: 2\nchild:\n  name: svc\n  <<: *b\n  retries: 5\n").unwrap();
        let root = doc.root.unwrap();
        let crate::node::NodeData::Mapping { pairs: root_pairs, .. } = &doc.get_node(root).data else {
            panic!("expected mapping")
        };
        let child = root_pairs[1].value;
        let crate::node::NodeData::Mapping { pairs, .. } = &doc.get_node(child).data else {
            panic!("expected mapping")
        };
        let keys: Vec<&str> = pairs
            .iter()
            .map(|p| doc.get_node(p.key).as_scalar().unwrap())
            .collect();
        assert_eq!(keys, vec!["a", "b", "name", "retries"]);
    }

    #[test]
    fn flow_collections_round_trip_structure() {
        let doc = parse("a: [1, 2, {x: 3}]\n").unwrap();
        let root = doc.root.unwrap();
        let crate::node::NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!("expected mapping")
        };
        assert!(doc.get_node(pairs[0].value).is_sequence());
    }
}
