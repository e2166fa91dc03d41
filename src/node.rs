//! The tree data model: an arena of [`Node`]s addressed by stable
//! [`NodeId`]s, plus the comment and blank-line bookkeeping attached to
//! each node and pair.
//!
//! Nodes are never owned by their parents directly; a [`Document`] owns a
//! flat `Vec<Node>` and sequences/mappings reference their children by
//! index. This makes "no forward references, no cycles" a structural
//! property of how the tree is built rather than something checked at
//! read time, and lets a transformation share untouched subtrees by
//! copying `NodeId`s instead of cloning their contents.

use crate::error::Mark;
use crate::token::{CollectionStyle, ScalarStyle};

/// A stable reference to a [`Node`] within a single [`Document`]'s arena.
/// Not meaningful across documents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single comment line attached to a node or pair.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Comment {
    /// Text with the leading `#` stripped; any space immediately following
    /// the `#` is kept as part of `text` (so re-emitting it as `#{text}`
    /// reproduces the original spacing).
    pub text: String,
    /// Number of blank source lines immediately before this comment.
    pub blank_lines_before: u32,
}

/// An ordered run of whole-line comments attached at one position relative
/// to a node (head, foot) or written on the same line as it (inline).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CommentGroup(pub Vec<Comment>);

impl CommentGroup {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, comment: Comment) {
        self.0.push(comment);
    }
}

/// One key/value pair in a [`NodeData::Mapping`], including the comments
/// attached around the key and around the value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub key: NodeId,
    pub value: NodeId,
    /// Comments attached directly above the key (standalone lines).
    pub head: CommentGroup,
    /// Blank source lines immediately before this pair, at the key's
    /// indentation level.
    pub blank_lines_before: u32,
}

/// The payload of a [`Node`]: what kind of YAML construct it is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Scalar { value: String, style: ScalarStyle },
    Sequence { items: Vec<NodeId>, style: CollectionStyle },
    Mapping { pairs: Vec<Pair>, style: CollectionStyle },
}

/// One node in the tree: its data plus the layout metadata needed to
/// reproduce its original appearance (or a chosen new appearance) on
/// serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub data: NodeData,
    /// Resolved tag, e.g. `tag:yaml.org,2002:str`. `None` means untagged
    /// (the core schema should infer one at emission time if needed).
    pub tag: Option<String>,
    /// The anchor name this node was defined under (`&name`), if any.
    pub anchor: Option<String>,
    /// Standalone comment lines directly above this node.
    pub head_comments: CommentGroup,
    /// A comment written on the same source line as this node ends on.
    pub line_comment: Option<Comment>,
    /// Standalone comment lines that trail this node before the next
    /// sibling (or the end of the enclosing collection).
    pub foot_comments: CommentGroup,
    /// Blank source lines immediately before this node (sequence items;
    /// mapping pairs use [`Pair::blank_lines_before`] instead).
    pub blank_lines_before: u32,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

impl Node {
    fn new(data: NodeData, start_mark: Mark, end_mark: Mark) -> Self {
        Node {
            data,
            tag: None,
            anchor: None,
            head_comments: CommentGroup::default(),
            line_comment: None,
            foot_comments: CommentGroup::default(),
            blank_lines_before: 0,
            start_mark,
            end_mark,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.data, NodeData::Scalar { .. })
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.data, NodeData::Sequence { .. })
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.data, NodeData::Mapping { .. })
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.data {
            NodeData::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A single YAML document: its root node plus the directives and
/// boundary-marker flags that governed how it started and ended.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Document {
    nodes: Vec<Node>,
    pub root: Option<NodeId>,
    pub version_directive: Option<(u32, u32)>,
    /// `(handle, prefix)` pairs from `%TAG` directives.
    pub tag_directives: Vec<(String, String)>,
    /// Whether this document began with an explicit `---` marker.
    pub explicit_start: bool,
    /// Whether this document ended with an explicit `...` marker.
    pub explicit_end: bool,
    /// Comments that appear before the document's content but are not
    /// attached to the root node (e.g. above a `---` marker).
    pub leading_comments: CommentGroup,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn get_node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn add_scalar(&mut self, value: String, style: ScalarStyle, start: Mark, end: Mark) -> NodeId {
        self.push(Node::new(NodeData::Scalar { value, style }, start, end))
    }

    pub fn add_sequence(&mut self, style: CollectionStyle, start: Mark, end: Mark) -> NodeId {
        self.push(Node::new(
            NodeData::Sequence {
                items: Vec::new(),
                style,
            },
            start,
            end,
        ))
    }

    pub fn add_mapping(&mut self, style: CollectionStyle, start: Mark, end: Mark) -> NodeId {
        self.push(Node::new(
            NodeData::Mapping {
                pairs: Vec::new(),
                style,
            },
            start,
            end,
        ))
    }

    pub fn append_sequence_item(&mut self, seq: NodeId, item: NodeId) {
        match &mut self.get_node_mut(seq).data {
            NodeData::Sequence { items, .. } => items.push(item),
            _ => panic!("append_sequence_item called on a non-sequence node"),
        }
    }

    pub fn append_mapping_pair(&mut self, map: NodeId, pair: Pair) {
        match &mut self.get_node_mut(map).data {
            NodeData::Mapping { pairs, .. } => pairs.push(pair),
            _ => panic!("append_mapping_pair called on a non-mapping node"),
        }
    }

    /// Copy a node (and, recursively, everything it owns) from `other`
    /// into `self`, returning the new id. Used by the merge transformation
    /// to graft unmodified subtrees from one document into another.
    pub fn graft(&mut self, other: &Document, id: NodeId) -> NodeId {
        let source = other.get_node(id);
        let new_id = match &source.data {
            NodeData::Scalar { value, style } => {
                self.add_scalar(value.clone(), *style, source.start_mark, source.end_mark)
            }
            NodeData::Sequence { items, style } => {
                let seq = self.add_sequence(*style, source.start_mark, source.end_mark);
                let copied: Vec<NodeId> = items.iter().map(|item| self.graft(other, *item)).collect();
                for item in copied {
                    self.append_sequence_item(seq, item);
                }
                seq
            }
            NodeData::Mapping { pairs, style } => {
                let map = self.add_mapping(*style, source.start_mark, source.end_mark);
                let copied: Vec<Pair> = pairs
                    .iter()
                    .map(|pair| Pair {
                        key: self.graft(other, pair.key),
                        value: self.graft(other, pair.value),
                        head: pair.head.clone(),
                        blank_lines_before: pair.blank_lines_before,
                    })
                    .collect();
                for pair in copied {
                    self.append_mapping_pair(map, pair);
                }
                map
            }
        };
        let new_node = self.get_node_mut(new_id);
        new_node.tag = source.tag.clone();
        new_node.anchor = source.anchor.clone();
        new_node.head_comments = source.head_comments.clone();
        new_node.line_comment = source.line_comment.clone();
        new_node.foot_comments = source.foot_comments.clone();
        new_node.blank_lines_before = source.blank_lines_before;
        new_id
    }
}

/// An ordered collection of [`Document`]s, as produced by parsing a
/// multi-document stream (`---` / `...` separated).
#[derive(Clone, Debug, Default)]
pub struct Stream {
    pub documents: Vec<Document>,
}

impl Stream {
    pub fn new() -> Self {
        Stream::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graft_copies_subtree_with_comments() {
        let mark = Mark::default();
        let mut src = Document::new();
        let scalar = src.add_scalar("1".to_string(), ScalarStyle::Plain, mark, mark);
        src.get_node_mut(scalar).line_comment = Some(Comment {
            text: "one".to_string(),
            blank_lines_before: 0,
        });
        let seq = src.add_sequence(CollectionStyle::Block, mark, mark);
        src.append_sequence_item(seq, scalar);
        src.root = Some(seq);

        let mut dst = Document::new();
        let copied = dst.graft(&src, seq);
        match &dst.get_node(copied).data {
            NodeData::Sequence { items, .. } => {
                let item = dst.get_node(items[0]);
                assert_eq!(item.as_scalar(), Some("1"));
                assert_eq!(item.line_comment.as_ref().unwrap().text, "one");
            }
            _ => panic!("expected sequence"),
        }
    }
}
