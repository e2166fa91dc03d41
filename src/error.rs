use std::fmt;

/// A position in the source text: byte offset, 1-based line, 1-based column.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Mark {
    /// Byte offset from the start of the source.
    pub index: u64,
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Errors raised while tokenizing source text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ScannerError {
    #[error("{mark}: unterminated {quote}-quoted scalar")]
    UnterminatedString { quote: &'static str, mark: Mark },
    #[error("{mark}: invalid escape sequence in double-quoted scalar")]
    InvalidEscape { mark: Mark },
    #[error("{mark}: tab characters cannot be used as indentation")]
    TabInIndent { mark: Mark },
    #[error("{mark}: invalid character in plain scalar")]
    InvalidCharacter { mark: Mark },
    #[error("{mark}: {problem}")]
    Problem { problem: &'static str, mark: Mark },
}

impl ScannerError {
    /// The position the error occurred at.
    pub fn mark(&self) -> Mark {
        match self {
            ScannerError::UnterminatedString { mark, .. }
            | ScannerError::InvalidEscape { mark }
            | ScannerError::TabInIndent { mark }
            | ScannerError::InvalidCharacter { mark }
            | ScannerError::Problem { mark, .. } => *mark,
        }
    }
}

/// Errors raised while building a document tree from tokens.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParserError {
    #[error("{mark}: unexpected token: {problem}")]
    UnexpectedToken { problem: &'static str, mark: Mark },
    #[error("{mark}: mismatched indentation")]
    MismatchedIndentation { mark: Mark },
    #[error("{mark}: found duplicate anchor; first occurrence at {first}")]
    DuplicateAnchor { first: Mark, mark: Mark },
    #[error("{mark}: found undefined alias")]
    UndefinedAlias { mark: Mark },
    #[error("{mark}: illegal merge key target: {problem}")]
    IllegalMergeTarget { problem: &'static str, mark: Mark },
    #[error("{mark}: recursion limit exceeded")]
    RecursionLimitExceeded { mark: Mark },
    #[error(transparent)]
    Scanner(#[from] ScannerError),
}

/// Errors raised while resolving tags.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TagError {
    #[error("{mark}: unknown tag handle {handle:?}")]
    UnknownHandle { handle: String, mark: Mark },
    #[error("{mark}: malformed tag URI {uri:?}")]
    MalformedUri { uri: String, mark: Mark },
}

/// Errors raised while merging two document trees.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MergeError {
    #[error("cannot merge {base_kind} with {override_kind} at the same position")]
    IncompatibleNodeKinds {
        base_kind: &'static str,
        override_kind: &'static str,
    },
    #[error("merge strategy failed: {0}")]
    StrategyFailure(&'static str),
}

/// Errors raised while writing a document tree back to text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SerializerError {
    #[error("output sink failure: {0}")]
    Sink(#[from] fmt::Error),
}

/// The unified error type returned by this crate's public facade.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Scanner(#[from] ScannerError),
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Serializer(#[from] SerializerError),
}
