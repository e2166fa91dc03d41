//! The sort transformation: reorders mapping pairs (and optionally nested
//! collections) under a configurable [`SortConfig`], operating
//! section-by-section so that section markers act as fixed points.

use crate::node::{Document, NodeData, NodeId, Pair};

/// Whether ties and the overall order follow the original order, or an
/// explicit ascending/descending comparison.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Leave pairs in their original order (useful when only `groups` or
    /// `priority` reordering is wanted).
    #[default]
    KeepOriginal,
    Ascending,
    Descending,
}

/// Whether pairs compare by their key text or by their scalar value text
/// (non-scalar values compare equal to each other and sort after scalars).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Key,
    Value,
}

/// How deep sorting reaches into the tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortScope {
    /// Only the top-level mapping.
    #[default]
    Document,
    /// Every mapping at every depth.
    Nested,
    /// Only mappings within the bounds of a detected section (see
    /// `section_markers`); mappings outside any section are left alone.
    Section,
}

/// Configuration for [`sort_document`].
#[derive(Clone)]
pub struct SortConfig {
    pub mode: SortMode,
    pub by: SortBy,
    pub scope: SortScope,
    pub case_sensitive: bool,
    /// Compare numeric-looking keys/values by numeric value rather than
    /// lexicographically.
    pub numeric: bool,
    /// Keys listed here are pinned to the front, in this order, ahead of
    /// any mode-driven ordering of the rest.
    pub priority: Vec<String>,
    /// Keys are bucketed by which group (if any) they belong to; groups
    /// sort as contiguous blocks in the order given here, with ungrouped
    /// keys forming one final implicit group.
    pub groups: Vec<Vec<String>>,
    /// Slash-separated path patterns (each segment glob-matched the same
    /// way a bare pattern matches a key, e.g. `metadata/labels`) identifying
    /// pairs that are excluded from reordering entirely and keep their
    /// original position relative to other excluded pairs. A pattern with
    /// no `/` matches by key name alone, at any depth.
    pub exclude_patterns: Vec<String>,
    /// A head comment whose text exactly matches one of these strings
    /// marks the start of a new section; sorting with `scope: Section`
    /// never reorders a pair across a section boundary.
    pub section_markers: Vec<String>,
    /// Equal-comparing pairs keep their relative original order.
    pub stable: bool,
    /// Optional comparator replacing the `mode` comparator (but still
    /// subordinate to `priority` and `groups`), compared on the same key
    /// or value text `by` selects.
    pub custom: Option<fn(&str, &str) -> std::cmp::Ordering>,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            mode: SortMode::Ascending,
            by: SortBy::Key,
            scope: SortScope::Document,
            case_sensitive: true,
            numeric: false,
            priority: Vec::new(),
            groups: Vec::new(),
            exclude_patterns: Vec::new(),
            section_markers: Vec::new(),
            stable: true,
            custom: None,
        }
    }
}

impl std::fmt::Debug for SortConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortConfig")
            .field("mode", &self.mode)
            .field("by", &self.by)
            .field("scope", &self.scope)
            .field("case_sensitive", &self.case_sensitive)
            .field("numeric", &self.numeric)
            .field("priority", &self.priority)
            .field("groups", &self.groups)
            .field("exclude_patterns", &self.exclude_patterns)
            .field("section_markers", &self.section_markers)
            .field("stable", &self.stable)
            .field("custom", &self.custom.map(|_| "fn(&str, &str) -> Ordering"))
            .finish()
    }
}

/// Sort `doc`'s root mapping (and, depending on `config.scope`, nested
/// mappings) in place.
pub fn sort_document(doc: &mut Document, config: &SortConfig) {
    transfer_trapped_comments(doc);
    if let Some(root) = doc.root {
        sort_node(doc, root, config, true, &[]);
    }
}

/// `path` is the sequence of mapping keys, from the document root, leading
/// to `id` — used to match `exclude_patterns`' slash-separated paths.
fn sort_node(doc: &mut Document, id: NodeId, config: &SortConfig, is_top: bool, path: &[String]) {
    let data = doc.get_node(id).data.clone();
    match data {
        NodeData::Mapping { pairs, style } => {
            let should_sort = match config.scope {
                SortScope::Document => is_top,
                SortScope::Nested => true,
                SortScope::Section => !config.section_markers.is_empty(),
            };
            let sorted = if should_sort {
                sort_pairs(doc, pairs, config, path)
            } else {
                pairs
            };
            if let NodeData::Mapping { pairs, .. } = &mut doc.get_node_mut(id).data {
                *pairs = sorted;
            }
            let _ = style;
            let children: Vec<(NodeId, String)> = match &doc.get_node(id).data {
                NodeData::Mapping { pairs, .. } => pairs
                    .iter()
                    .map(|p| (p.value, doc.get_node(p.key).as_scalar().unwrap_or("").to_string()))
                    .collect(),
                _ => Vec::new(),
            };
            if matches!(config.scope, SortScope::Nested | SortScope::Section) {
                for (child, key) in children {
                    let mut child_path = path.to_vec();
                    child_path.push(key);
                    sort_node(doc, child, config, false, &child_path);
                }
            }
        }
        NodeData::Sequence { items, .. } => {
            if matches!(config.scope, SortScope::Nested | SortScope::Section) {
                for item in items {
                    sort_node(doc, item, config, false, path);
                }
            }
        }
        NodeData::Scalar { .. } => {}
    }
}

/// Split `pairs` into sections at section-marker comments, sort within
/// each section independently, and concatenate the results; a marker
/// comment stays attached to the pair it headed.
fn sort_pairs(doc: &mut Document, pairs: Vec<Pair>, config: &SortConfig, path: &[String]) -> Vec<Pair> {
    if config.section_markers.is_empty() {
        return sort_section(doc, pairs, config, path);
    }
    let mut sections: Vec<Vec<Pair>> = vec![Vec::new()];
    for pair in pairs {
        let starts_section = pair
            .head
            .0
            .iter()
            .any(|c| config.section_markers.iter().any(|m| m == &c.text));
        if starts_section && !sections.last().unwrap().is_empty() {
            sections.push(Vec::new());
        }
        sections.last_mut().unwrap().push(pair);
    }
    sections
        .into_iter()
        .flat_map(|section| sort_section(doc, section, config, path))
        .collect()
}

fn sort_section(doc: &mut Document, pairs: Vec<Pair>, config: &SortConfig, path: &[String]) -> Vec<Pair> {
    let mut excluded_positions = Vec::new();
    let mut sortable = Vec::new();
    for (i, pair) in pairs.iter().enumerate() {
        if is_excluded(doc, pair, config, path) {
            excluded_positions.push((i, pair.clone()));
        } else {
            sortable.push(pair.clone());
        }
    }

    if !matches!(config.mode, SortMode::KeepOriginal) {
        sortable.sort_by(|a, b| compare_pairs(doc, a, b, config));
        if matches!(config.mode, SortMode::Descending) {
            sortable.reverse();
        }
    }

    // `groups` buckets first, then `priority` pulls its keys to the very
    // front regardless of which bucket (or `rest`) they landed in —
    // priority dominates groups, per the documented precedence.
    if !config.groups.is_empty() {
        sortable = apply_groups(doc, sortable, config);
    }

    if !config.priority.is_empty() {
        let mut prioritized = Vec::new();
        for key in &config.priority {
            if let Some(pos) = sortable
                .iter()
                .position(|p| doc.get_node(p.key).as_scalar() == Some(key.as_str()))
            {
                prioritized.push(sortable.remove(pos));
            }
        }
        prioritized.extend(sortable);
        sortable = prioritized;
    }

    let mut result = sortable;
    for (pos, pair) in excluded_positions {
        let pos = pos.min(result.len());
        result.insert(pos, pair);
    }
    result
}

fn is_excluded(doc: &Document, pair: &Pair, config: &SortConfig, path: &[String]) -> bool {
    let Some(key) = doc.get_node(pair.key).as_scalar() else {
        return false;
    };
    config.exclude_patterns.iter().any(|pat| path_matches(pat, path, key))
}

/// A pattern with no `/` matches the pair's own key at any depth. A
/// pattern containing `/` is matched segment-by-segment (each segment
/// glob-matched the same way) against the full path from the document
/// root through this pair's key; the segment counts must match exactly.
fn path_matches(pattern: &str, ancestors: &[String], key: &str) -> bool {
    if !pattern.contains('/') {
        return glob_match(pattern, key);
    }
    let segments: Vec<&str> = pattern.split('/').collect();
    if segments.len() != ancestors.len() + 1 {
        return false;
    }
    let full_path = ancestors.iter().map(String::as_str).chain(std::iter::once(key));
    segments.iter().zip(full_path).all(|(pat, seg)| glob_match(pat, seg))
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let starts = pattern.starts_with('*');
    let ends = pattern.ends_with('*') && pattern.len() > 1;
    match (starts, ends) {
        (true, true) => text.contains(&pattern[1..pattern.len() - 1]),
        (true, false) => text.ends_with(&pattern[1..]),
        (false, true) => text.starts_with(&pattern[..pattern.len() - 1]),
        (false, false) => text == pattern,
    }
}

fn apply_groups(doc: &Document, pairs: Vec<Pair>, config: &SortConfig) -> Vec<Pair> {
    let mut buckets: Vec<Vec<Pair>> = config.groups.iter().map(|_| Vec::new()).collect();
    let mut rest = Vec::new();
    'outer: for pair in pairs {
        if let Some(key) = doc.get_node(pair.key).as_scalar() {
            for (gi, group) in config.groups.iter().enumerate() {
                if group.iter().any(|g| g == key) {
                    buckets[gi].push(pair);
                    continue 'outer;
                }
            }
        }
        rest.push(pair);
    }
    let mut out = Vec::new();
    for bucket in buckets {
        out.extend(bucket);
    }
    out.extend(rest);
    out
}

fn compare_pairs(doc: &Document, a: &Pair, b: &Pair, config: &SortConfig) -> std::cmp::Ordering {
    let id_a = match config.by {
        SortBy::Key => a.key,
        SortBy::Value => a.value,
    };
    let id_b = match config.by {
        SortBy::Key => b.key,
        SortBy::Value => b.value,
    };
    let sa = doc.get_node(id_a).as_scalar();
    let sb = doc.get_node(id_b).as_scalar();
    match (sa, sb) {
        (Some(sa), Some(sb)) => compare_strings(sa, sb, config),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

fn compare_strings(a: &str, b: &str, config: &SortConfig) -> std::cmp::Ordering {
    if let Some(custom) = config.custom {
        return custom(a, b);
    }
    if config.numeric {
        if let (Ok(na), Ok(nb)) = (a.parse::<f64>(), b.parse::<f64>()) {
            if let Some(ord) = na.partial_cmp(&nb) {
                return ord;
            }
        }
    }
    if config.case_sensitive {
        a.cmp(b)
    } else {
        a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
    }
}

/// A comment physically trapped between two pairs belongs, grammatically,
/// to neither: it trails the previous pair's value in source order but
/// reads as an introduction to the next one. Before any sort runs, move
/// such comments from a pair's foot position to the following pair's head,
/// so sorting carries them along with the pair they actually describe.
fn transfer_trapped_comments(doc: &mut Document) {
    let mapping_ids = collect_mapping_ids(doc);
    for id in mapping_ids {
        let NodeData::Mapping { pairs, .. } = &doc.get_node(id).data else {
            continue;
        };
        let mut pairs = pairs.clone();
        for i in 0..pairs.len().saturating_sub(1) {
            let trailing = std::mem::take(&mut doc.get_node_mut(pairs[i].value).foot_comments);
            if trailing.is_empty() {
                continue;
            }
            let mut combined = trailing.0;
            combined.extend(std::mem::take(&mut pairs[i + 1].head).0);
            pairs[i + 1].head = crate::node::CommentGroup(combined);
        }
        if let NodeData::Mapping { pairs: p, .. } = &mut doc.get_node_mut(id).data {
            *p = pairs;
        }
    }
}

fn collect_mapping_ids(doc: &Document) -> Vec<NodeId> {
    let mut out = Vec::new();
    if let Some(root) = doc.root {
        collect_mapping_ids_at(doc, root, &mut out);
    }
    out
}

fn collect_mapping_ids_at(doc: &Document, id: NodeId, out: &mut Vec<NodeId>) {
    match &doc.get_node(id).data {
        NodeData::Mapping { pairs, .. } => {
            out.push(id);
            for pair in pairs {
                collect_mapping_ids_at(doc, pair.key, out);
                collect_mapping_ids_at(doc, pair.value, out);
            }
        }
        NodeData::Sequence { items, .. } => {
            for item in items {
                collect_mapping_ids_at(doc, *item, out);
            }
        }
        NodeData::Scalar { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn ascending_sort_by_key() {
        let mut doc = parse("b: 2\na: 1\nc: 3\n").unwrap();
        sort_document(&mut doc, &SortConfig::default());
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let keys: Vec<&str> = pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn priority_keys_pinned_first() {
        let mut doc = parse("b: 2\na: 1\nc: 3\n").unwrap();
        let config = SortConfig {
            priority: vec!["c".to_string()],
            ..SortConfig::default()
        };
        sort_document(&mut doc, &config);
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let keys: Vec<&str> = pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn priority_overrides_group_bucketing() {
        let mut doc = parse("a: 1\nb: 2\nc: 3\n").unwrap();
        let config = SortConfig {
            priority: vec!["c".to_string()],
            groups: vec![vec!["a".to_string(), "b".to_string()]],
            ..SortConfig::default()
        };
        sort_document(&mut doc, &config);
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let keys: Vec<&str> = pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn excluded_keys_keep_position() {
        let mut doc = parse("z: 1\n__meta__: x\na: 2\n").unwrap();
        let config = SortConfig {
            exclude_patterns: vec!["__meta__".to_string()],
            ..SortConfig::default()
        };
        sort_document(&mut doc, &config);
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let keys: Vec<&str> = pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(keys, vec!["z", "__meta__", "a"]);
    }

    #[test]
    fn keep_original_mode_does_not_reorder() {
        let mut doc = parse("b: 2\na: 1\nc: 3\n").unwrap();
        let config = SortConfig { mode: SortMode::KeepOriginal, ..SortConfig::default() };
        sort_document(&mut doc, &config);
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let keys: Vec<&str> = pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn custom_comparator_replaces_the_mode_comparator() {
        fn reverse_lexical(a: &str, b: &str) -> std::cmp::Ordering {
            b.cmp(a)
        }
        let mut doc = parse("a: 1\nb: 2\nc: 3\n").unwrap();
        let config = SortConfig { custom: Some(reverse_lexical), ..SortConfig::default() };
        sort_document(&mut doc, &config);
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let keys: Vec<&str> = pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }

    #[test]
    fn exclude_pattern_with_slash_only_matches_that_exact_path() {
        let mut doc = parse("a:\n  z: 1\n  m: 2\nb:\n  z: 3\n  m: 4\n").unwrap();
        let config = SortConfig {
            scope: SortScope::Nested,
            exclude_patterns: vec!["a/z".to_string()],
            ..SortConfig::default()
        };
        sort_document(&mut doc, &config);
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let a_pair = pairs.iter().find(|p| doc.get_node(p.key).as_scalar() == Some("a")).unwrap();
        let NodeData::Mapping { pairs: a_pairs, .. } = &doc.get_node(a_pair.value).data else {
            panic!()
        };
        let a_keys: Vec<&str> = a_pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(a_keys, vec!["z", "m"], "a/z is excluded, so it keeps its original leading position");

        let b_pair = pairs.iter().find(|p| doc.get_node(p.key).as_scalar() == Some("b")).unwrap();
        let NodeData::Mapping { pairs: b_pairs, .. } = &doc.get_node(b_pair.value).data else {
            panic!()
        };
        let b_keys: Vec<&str> = b_pairs.iter().map(|p| doc.get_node(p.key).as_scalar().unwrap()).collect();
        assert_eq!(b_keys, vec!["m", "z"], "b/z isn't excluded, so b sorts normally");
    }

    #[test]
    fn trapped_comment_moves_to_following_pair() {
        let mut doc = parse("a: 1\n# about b\nb: 2\n").unwrap();
        sort_document(&mut doc, &SortConfig::default());
        let root = doc.root.unwrap();
        let NodeData::Mapping { pairs, .. } = &doc.get_node(root).data else {
            panic!()
        };
        let b_pair = pairs.iter().find(|p| doc.get_node(p.key).as_scalar() == Some("b")).unwrap();
        assert_eq!(b_pair.head.0[0].text, "about b");
    }
}
