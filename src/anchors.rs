//! Anchor registration and alias resolution for a single document parse.

use std::collections::HashMap;

use crate::error::{Mark, ParserError};
use crate::node::NodeId;

/// Tracks `&name` definitions seen so far while parsing one document, and
/// resolves `*name` aliases against them.
#[derive(Default)]
pub struct AnchorRegistry {
    anchors: HashMap<String, (NodeId, Mark)>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        AnchorRegistry::default()
    }

    /// Record that `name` now refers to `id`, defined at `mark`. Fails if
    /// the same name was already registered earlier in this document —
    /// re-using an anchor name silently shadowing the first is not
    /// permitted (invariant: anchor names are unique within a document).
    pub fn register(&mut self, name: String, id: NodeId, mark: Mark) -> Result<(), ParserError> {
        if let Some((_, first)) = self.anchors.get(&name) {
            return Err(ParserError::DuplicateAnchor {
                first: *first,
                mark,
            });
        }
        self.anchors.insert(name, (id, mark));
        Ok(())
    }

    /// Look up the node an alias refers to.
    pub fn resolve(&self, name: &str, mark: Mark) -> Result<NodeId, ParserError> {
        self.anchors
            .get(name)
            .map(|(id, _)| *id)
            .ok_or(ParserError::UndefinedAlias { mark })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_anchor_rejected() {
        let mut reg = AnchorRegistry::new();
        let mark = Mark::default();
        reg.register("a".to_string(), NodeId(0), mark).unwrap();
        let err = reg.register("a".to_string(), NodeId(1), mark);
        assert!(matches!(err, Err(ParserError::DuplicateAnchor { .. })));
    }

    #[test]
    fn undefined_alias_rejected() {
        let reg = AnchorRegistry::new();
        let err = reg.resolve("missing", Mark::default());
        assert!(matches!(err, Err(ParserError::UndefinedAlias { .. })));
    }
}
