//! The merge transformation: combines a base [`Document`] with an override
//! [`Document`], producing a new document. Distinct from the `<<` merge
//! key resolved during parsing — this operates on two whole documents
//! rather than within a single mapping.

use crate::error::MergeError;
use crate::node::{CommentGroup, Document, NodeData, NodeId, Pair};

/// Whether a mapping value present in both documents is replaced outright
/// or merged recursively.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The override's value replaces the base's value wholesale.
    Replace,
    /// Mappings merge key-by-key (recursively); sequences and scalars fall
    /// back to [`MergeStrategy::Replace`] unless `sequence_mode` says
    /// otherwise.
    #[default]
    Deep,
}

/// How two sequences at the same position are combined under
/// [`MergeStrategy::Deep`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SequenceMergeMode {
    /// The override sequence replaces the base sequence.
    #[default]
    Replace,
    /// The override sequence's items are appended after the base's.
    Append,
    /// Items merge pairwise by index; if the override is longer, its extra
    /// items are appended.
    MergeByIndex,
}

#[derive(Clone, Debug)]
pub struct MergeOptions {
    pub strategy: MergeStrategy,
    pub sequence_mode: SequenceMergeMode,
    /// Keep head/line/foot comments from whichever side contributed each
    /// node (the override's comments win when both sides have one).
    pub preserve_comments: bool,
    pub preserve_blank_lines: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            strategy: MergeStrategy::Deep,
            sequence_mode: SequenceMergeMode::Replace,
            preserve_comments: true,
            preserve_blank_lines: true,
        }
    }
}

/// Merge `override_doc` onto `base`, producing a new document. The root of
/// the result always lives in the returned document's own arena, even
/// when one side's root is copied through unchanged.
pub fn merge_documents(
    base: &Document,
    override_doc: &Document,
    options: &MergeOptions,
) -> Result<Document, MergeError> {
    let mut out = Document::new();
    out.version_directive = override_doc.version_directive.clone().or(base.version_directive);
    out.tag_directives = if override_doc.tag_directives.is_empty() {
        base.tag_directives.clone()
    } else {
        override_doc.tag_directives.clone()
    };
    out.explicit_start = base.explicit_start;
    out.explicit_end = base.explicit_end;

    let root = match (base.root, override_doc.root) {
        (Some(b), Some(o)) => Some(merge_nodes(&mut out, base, b, override_doc, o, options)?),
        (Some(b), None) => Some(out.graft(base, b)),
        (None, Some(o)) => Some(out.graft(override_doc, o)),
        (None, None) => None,
    };
    out.root = root;
    Ok(out)
}

fn merge_nodes(
    out: &mut Document,
    base: &Document,
    base_id: NodeId,
    over: &Document,
    over_id: NodeId,
    options: &MergeOptions,
) -> Result<NodeId, MergeError> {
    if matches!(options.strategy, MergeStrategy::Replace) {
        return Ok(copy_with_comments(out, over, over_id, options));
    }

    let base_node = base.get_node(base_id);
    let over_node = over.get_node(over_id);

    let merged_id = match (&base_node.data, &over_node.data) {
        (NodeData::Mapping { pairs: base_pairs, style }, NodeData::Mapping { pairs: over_pairs, .. }) => {
            let map_id = out.add_mapping(*style, base_node.start_mark, over_node.end_mark);
            let mut result_pairs: Vec<Pair> = Vec::new();
            for base_pair in base_pairs {
                let base_key_text = base.get_node(base_pair.key).as_scalar();
                let overridden = base_key_text
                    .and_then(|k| over_pairs.iter().find(|p| over.get_node(p.key).as_scalar() == Some(k)));
                let (key, value, head) = if let Some(over_pair) = overridden {
                    let key = out.graft(base, base_pair.key);
                    let value = merge_nodes(out, base, base_pair.value, over, over_pair.value, options)?;
                    let head = if options.preserve_comments {
                        base_pair.head.clone()
                    } else {
                        CommentGroup::default()
                    };
                    (key, value, head)
                } else {
                    let key = out.graft(base, base_pair.key);
                    let value = out.graft(base, base_pair.value);
                    (key, value, base_pair.head.clone())
                };
                result_pairs.push(Pair {
                    key,
                    value,
                    head,
                    blank_lines_before: if options.preserve_blank_lines {
                        base_pair.blank_lines_before
                    } else {
                        0
                    },
                });
            }
            for over_pair in over_pairs {
                let over_key_text = over.get_node(over_pair.key).as_scalar();
                let already_merged = over_key_text
                    .map(|k| base_pairs.iter().any(|p| base.get_node(p.key).as_scalar() == Some(k)))
                    .unwrap_or(false);
                if already_merged {
                    continue;
                }
                let key = out.graft(over, over_pair.key);
                let value = out.graft(over, over_pair.value);
                result_pairs.push(Pair {
                    key,
                    value,
                    head: if options.preserve_comments {
                        over_pair.head.clone()
                    } else {
                        CommentGroup::default()
                    },
                    blank_lines_before: if options.preserve_blank_lines {
                        over_pair.blank_lines_before
                    } else {
                        0
                    },
                });
            }
            for pair in result_pairs {
                out.append_mapping_pair(map_id, pair);
            }
            map_id
        }
        (NodeData::Sequence { items: base_items, style }, NodeData::Sequence { items: over_items, .. }) => {
            let seq_id = out.add_sequence(*style, base_node.start_mark, over_node.end_mark);
            match options.sequence_mode {
                SequenceMergeMode::Replace => {
                    for item in over_items {
                        let new_item = out.graft(over, *item);
                        out.append_sequence_item(seq_id, new_item);
                    }
                }
                SequenceMergeMode::Append => {
                    for item in base_items {
                        let new_item = out.graft(base, *item);
                        out.append_sequence_item(seq_id, new_item);
                    }
                    for item in over_items {
                        let new_item = out.graft(over, *item);
                        out.append_sequence_item(seq_id, new_item);
                    }
                }
                SequenceMergeMode::MergeByIndex => {
                    let len = base_items.len().max(over_items.len());
                    for i in 0..len {
                        let new_item = match (base_items.get(i), over_items.get(i)) {
                            (Some(b), Some(o)) => merge_nodes(out, base, *b, over, *o, options)?,
                            (Some(b), None) => out.graft(base, *b),
                            (None, Some(o)) => out.graft(over, *o),
                            (None, None) => unreachable!(),
                        };
                        out.append_sequence_item(seq_id, new_item);
                    }
                }
            }
            seq_id
        }
        (NodeData::Scalar { .. }, _) | (_, NodeData::Scalar { .. }) => {
            return Ok(copy_with_comments(out, over, over_id, options))
        }
        _ => {
            return Err(MergeError::IncompatibleNodeKinds {
                base_kind: node_kind_name(&base_node.data),
                override_kind: node_kind_name(&over_node.data),
            })
        }
    };

    let merged = out.get_node_mut(merged_id);
    merged.tag = over_node.tag.clone().or_else(|| base_node.tag.clone());
    merged.anchor = over_node.anchor.clone().or_else(|| base_node.anchor.clone());
    if options.preserve_comments {
        merged.head_comments = if !over_node.head_comments.is_empty() {
            over_node.head_comments.clone()
        } else {
            base_node.head_comments.clone()
        };
        merged.line_comment = over_node.line_comment.clone().or_else(|| base_node.line_comment.clone());
        merged.foot_comments = if !over_node.foot_comments.is_empty() {
            over_node.foot_comments.clone()
        } else {
            base_node.foot_comments.clone()
        };
    }
    if options.preserve_blank_lines {
        merged.blank_lines_before = base_node.blank_lines_before;
    }
    Ok(merged_id)
}

fn copy_with_comments(out: &mut Document, src: &Document, id: NodeId, options: &MergeOptions) -> NodeId {
    let new_id = out.graft(src, id);
    if !options.preserve_comments {
        let node = out.get_node_mut(new_id);
        node.head_comments = CommentGroup::default();
        node.line_comment = None;
        node.foot_comments = CommentGroup::default();
    }
    if !options.preserve_blank_lines {
        out.get_node_mut(new_id).blank_lines_before = 0;
    }
    new_id
}

fn node_kind_name(data: &NodeData) -> &'static str {
    match data {
        NodeData::Scalar { .. } => "scalar",
        NodeData::Sequence { .. } => "sequence",
        NodeData::Mapping { .. } => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn deep_merge_preserves_base_order_and_appends_overrides() {
        let base = parse("a: 1\nb: 2\n").unwrap();
        let over = parse("b: 20\nc: 30\n").unwrap();
        let merged = merge_documents(&base, &over, &MergeOptions::default()).unwrap();
        let root = merged.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &merged.get_node(root).data else {
            panic!()
        };
        let keys: Vec<&str> = pairs.iter().map(|p| merged.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        let b_value = merged.get_node(pairs[1].value).as_scalar().unwrap();
        assert_eq!(b_value, "20");
    }

    #[test]
    fn replace_strategy_takes_override_wholesale() {
        let base = parse("a: 1\nb: 2\n").unwrap();
        let over = parse("c: 3\n").unwrap();
        let options = MergeOptions {
            strategy: MergeStrategy::Replace,
            ..MergeOptions::default()
        };
        let merged = merge_documents(&base, &over, &options).unwrap();
        let root = merged.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &merged.get_node(root).data else {
            panic!()
        };
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn sequence_append_mode_concatenates() {
        let base = parse("- 1\n- 2\n").unwrap();
        let over = parse("- 3\n").unwrap();
        let options = MergeOptions {
            sequence_mode: SequenceMergeMode::Append,
            ..MergeOptions::default()
        };
        let merged = merge_documents(&base, &over, &options).unwrap();
        let root = merged.root.unwrap();
        let NodeData::Sequence { items, .. } = &merged.get_node(root).data else {
            panic!()
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn incompatible_kinds_is_an_error() {
        let base = parse("a: 1\n").unwrap();
        let over = parse("- 1\n").unwrap();
        let err = merge_documents(&base, &over, &MergeOptions::default());
        assert!(matches!(err, Err(MergeError::IncompatibleNodeKinds { .. })));
    }
}
