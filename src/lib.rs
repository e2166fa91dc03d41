//! A comment- and layout-preserving YAML 1.2 parser, sorter, merger, and
//! serializer.
//!
//! Unlike a typical YAML library, the tree this crate builds keeps the
//! comments, blank lines, and the scalar/collection styles a document was
//! written with, so a document can be loaded, selectively transformed
//! (sorted, merged with another document), and written back out without
//! clobbering formatting the original author cared about.
//!
//! ```
//! let doc = yamlform::parse("b: 2\na: 1\n").unwrap();
//! let mut doc = doc;
//! yamlform::sort::sort_document(&mut doc, &yamlform::sort::SortConfig::default());
//! let out = yamlform::serialize(&doc, &yamlform::emitter::SerializerOptions::default()).unwrap();
//! assert_eq!(out, "a: 1\nb: 2\n");
//! ```
//!
//! # Non-goals
//!
//! This crate has no public event-stream API: [`parser::Parser`] builds a
//! [`node::Document`] tree directly from the token stream. It also does not
//! attempt to re-inject layout into a document transformed by another tool
//! — layout is only preserved across transformations this crate itself
//! performs ([`sort`], [`merge`]).

#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::too_many_arguments,
    clippy::too_many_lines
)]

pub mod anchors;
pub mod emitter;
pub mod error;
pub mod merge;
pub mod node;
pub mod parser;
pub mod scanner;
pub mod sort;
pub mod tags;
pub mod token;

pub use crate::error::Error;
pub use crate::node::{Comment, CommentGroup, Document, Node, NodeData, NodeId, Pair, Stream};
pub use crate::token::{CollectionStyle, ScalarStyle};

/// Parse a single YAML document from `text`.
///
/// A stream containing more than one document is an error here; use
/// [`parse_stream`] for multi-document input.
pub fn parse(text: &str) -> Result<Document, Error> {
    Ok(parser::parse(text)?)
}

/// Parse a `---`/`...`-separated multi-document YAML stream from `text`.
pub fn parse_stream(text: &str) -> Result<Stream, Error> {
    Ok(parser::parse_stream(text)?)
}

/// Serialize `doc` to a YAML string.
pub fn serialize(doc: &Document, options: &emitter::SerializerOptions) -> Result<String, Error> {
    Ok(emitter::serialize(doc, options)?)
}

/// Sort a copy of `doc` under `config`. See [`sort::sort_document`] for the
/// in-place form.
pub fn sort(doc: &Document, config: &sort::SortConfig) -> Document {
    let mut doc = doc.clone();
    sort::sort_document(&mut doc, config);
    doc
}

/// Merge `over` onto `base` under `options`. See [`merge::merge_documents`].
pub fn merge(base: &Document, over: &Document, options: &merge::MergeOptions) -> Result<Document, Error> {
    Ok(merge::merge_documents(base, over, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_serialize_round_trips() {
        let src = "# a document\nname: crate\ntags:\n  - yaml\n  - parser\n";
        let doc = parse(src).unwrap();
        let out = serialize(&doc, &emitter::SerializerOptions::default()).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn sort_then_merge_then_serialize() {
        let mut base = parse("b: 2\na: 1\n").unwrap();
        sort::sort_document(&mut base, &sort::SortConfig::default());
        let over = parse("c: 3\n").unwrap();
        let merged = merge::merge_documents(&base, &over, &merge::MergeOptions::default()).unwrap();
        let out = serialize(&merged, &emitter::SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: 1\nb: 2\nc: 3\n");
    }

    #[test]
    fn facade_sort_and_merge_match_the_module_functions() {
        let base = parse("b: 2\na: 1\n").unwrap();
        let sorted = sort(&base, &sort::SortConfig::default());
        let over = parse("c: 3\n").unwrap();
        let merged = merge(&sorted, &over, &merge::MergeOptions::default()).unwrap();
        let out = serialize(&merged, &emitter::SerializerOptions::default()).unwrap();
        assert_eq!(out, "a: 1\nb: 2\nc: 3\n");
    }

    #[test]
    fn multi_document_stream() {
        let stream = parse_stream("---\na: 1\n---\nb: 2\n").unwrap();
        assert_eq!(stream.documents.len(), 2);
    }

    #[test]
    fn rejects_malformed_input_with_a_located_error() {
        let err = parse("\"unterminated");
        assert!(err.is_err());
    }
}
