//! Converts source text into a stream of [`Token`]s.
//!
//! The scanner is a thin, stateful cursor: [`Scanner::peek`] and
//! [`Scanner::advance`] are its only entry points. It tracks byte offset,
//! line, and column (as a [`Mark`]), an indentation-column stack for block
//! context, and a flow-nesting depth. It does not build any tree — that is
//! the parser's job.

use crate::error::{Mark, ScannerError};
use crate::token::{Chomping, ScalarStyle, Token, TokenData};

/// Indicator characters that may never begin a plain scalar (outside the
/// contexts that explicitly allow them, e.g. a leading `-` in `-5`).
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    mark: Mark,
    /// Depth of open `[`/`{` flow contexts.
    flow_level: u32,
    /// Line (1-based) of the end of the last non-comment, non-whitespace
    /// token, used to classify a comment as inline vs standalone.
    last_token_line: u64,
    /// 0-based start column of that same last non-comment token. A `:`
    /// immediately following a scalar on the same line uses this as its
    /// indent-rolling column, since the scalar (the mapping key) is the
    /// construct that actually establishes the line's indent, not the
    /// colon sitting to its right.
    last_token_start_col: i64,
    /// True while positioned at the start of a line, before any
    /// non-whitespace character has been seen on it.
    at_line_start: bool,
    pending: Option<Token>,
    stream_start_emitted: bool,
    /// 0-based column of the innermost open block context (`-` entry or
    /// mapping key/value indicator), or `-1` at the document root. A
    /// plain scalar may continue onto a following line only while that
    /// line's first non-blank column is greater than this.
    indent: i64,
    /// Enclosing block contexts' indent columns, most recent last.
    indents: Vec<i64>,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        Scanner {
            chars: text.chars().collect(),
            pos: 0,
            mark: Mark {
                index: 0,
                line: 1,
                column: 1,
            },
            flow_level: 0,
            last_token_line: 0,
            last_token_start_col: -1,
            at_line_start: true,
            pending: None,
            stream_start_emitted: false,
            indent: -1,
            indents: Vec::new(),
        }
    }

    /// Open a new block context at `column` (0-based) if it is more
    /// indented than the current one. Mirrors the teacher's
    /// `yaml_parser_roll_indent`.
    fn roll_indent(&mut self, column: i64) {
        if self.flow_level == 0 && self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
        }
    }

    /// Close block contexts until the current indent is at or below
    /// `column` (0-based). Mirrors `yaml_parser_unroll_indent`.
    fn unroll_indent(&mut self, column: i64) {
        while self.indent > column {
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    pub fn flow_level(&self) -> u32 {
        self.flow_level
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token, ScannerError> {
        if self.pending.is_none() {
            self.pending = Some(self.scan_token()?);
        }
        Ok(self.pending.as_ref().unwrap())
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Result<Token, ScannerError> {
        if let Some(tok) = self.pending.take() {
            log::trace!("scanner: {:?} (pending) at {:?}", tok.data, tok.start_mark);
            return Ok(tok);
        }
        let tok = self.scan_token()?;
        log::trace!("scanner: {:?} at {:?}", tok.data, tok.start_mark);
        Ok(tok)
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn cur(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.cur()?;
        self.pos += 1;
        self.mark.index += c.len_utf8() as u64;
        if c == '\n' {
            self.mark.line += 1;
            self.mark.column = 1;
            self.at_line_start = true;
        } else {
            self.mark.column += 1;
        }
        Some(c)
    }

    /// Consume a `\r\n` or `\r` or `\n` line break as a single logical break.
    fn bump_break(&mut self) {
        if self.cur() == Some('\r') && self.at(1) == Some('\n') {
            self.bump();
            self.bump();
        } else {
            self.bump();
        }
    }

    fn is_break(c: char) -> bool {
        c == '\n' || c == '\r'
    }

    fn is_blank(c: char) -> bool {
        c == ' ' || c == '\t'
    }

    /// Skip whitespace and blank lines, counting fully empty lines. Stops at
    /// EOF, a comment-introducing `#`, or the next non-blank character.
    /// Returns the number of blank lines skipped.
    fn skip_to_token(&mut self) -> Result<u32, ScannerError> {
        let mut blank_lines = 0u32;
        loop {
            match self.cur() {
                Some(c) if Self::is_blank(c) => {
                    if c == '\t' && self.at_line_start && self.flow_level == 0 {
                        log::debug!("scanner: tab in indentation at {:?}", self.mark);
                        return Err(ScannerError::TabInIndent { mark: self.mark });
                    }
                    self.bump();
                }
                Some(c) if Self::is_break(c) => {
                    let had_content_before = !self.at_line_start;
                    self.bump_break();
                    if !had_content_before {
                        blank_lines += 1;
                    }
                }
                _ => return Ok(blank_lines),
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token, ScannerError> {
        if !self.stream_start_emitted {
            self.stream_start_emitted = true;
            return Ok(Token {
                data: TokenData::StreamStart,
                start_mark: self.mark,
                end_mark: self.mark,
                blank_lines_before: 0,
            });
        }

        let blank_lines_before = self.skip_to_token()?;

        if self.eof() {
            return Ok(Token {
                data: TokenData::StreamEnd,
                start_mark: self.mark,
                end_mark: self.mark,
                blank_lines_before,
            });
        }

        self.unroll_indent(self.mark.column as i64 - 1);
        let start = self.mark;
        let c = self.cur().unwrap();

        if c == '#' {
            return self.scan_comment(start, blank_lines_before);
        }

        // Document markers `---` / `...` only count when they begin a line
        // and are followed by whitespace or EOF.
        if self.at_line_start && c == '-' && self.at(1) == Some('-') && self.at(2) == Some('-') {
            let after = self.at(3);
            if after.is_none() || Self::is_blank(after.unwrap()) || Self::is_break(after.unwrap())
            {
                self.bump();
                self.bump();
                self.bump();
                return self.finish(TokenData::DocumentStart, start, blank_lines_before);
            }
        }
        if self.at_line_start && c == '.' && self.at(1) == Some('.') && self.at(2) == Some('.') {
            let after = self.at(3);
            if after.is_none() || Self::is_blank(after.unwrap()) || Self::is_break(after.unwrap())
            {
                self.bump();
                self.bump();
                self.bump();
                return self.finish(TokenData::DocumentEnd, start, blank_lines_before);
            }
        }

        match c {
            '-' if self.at(1).is_none() || Self::is_blank(self.at(1).unwrap()) || Self::is_break(self.at(1).unwrap()) => {
                self.roll_indent(start.column as i64 - 1);
                self.bump();
                self.finish(TokenData::SequenceEntry, start, blank_lines_before)
            }
            '?' if self.flow_level == 0
                && (self.at(1).is_none()
                    || Self::is_blank(self.at(1).unwrap())
                    || Self::is_break(self.at(1).unwrap())) =>
            {
                self.roll_indent(start.column as i64 - 1);
                self.bump();
                self.finish(TokenData::MappingKey, start, blank_lines_before)
            }
            ':' if self.flow_level > 0
                || self.at(1).is_none()
                || Self::is_blank(self.at(1).unwrap())
                || Self::is_break(self.at(1).unwrap()) =>
            {
                // A `:` immediately after a same-line scalar rolls to that
                // scalar's column (the mapping key), not its own — the key
                // is what actually sits at this mapping's indent level.
                let col = if self.last_token_line == start.line {
                    self.last_token_start_col
                } else {
                    start.column as i64 - 1
                };
                self.roll_indent(col);
                self.bump();
                self.finish(TokenData::MappingValue, start, blank_lines_before)
            }
            '[' => {
                self.bump();
                self.flow_level += 1;
                self.finish(TokenData::FlowSequenceStart, start, blank_lines_before)
            }
            ']' => {
                self.bump();
                self.flow_level = self.flow_level.saturating_sub(1);
                self.finish(TokenData::FlowSequenceEnd, start, blank_lines_before)
            }
            '{' => {
                self.bump();
                self.flow_level += 1;
                self.finish(TokenData::FlowMappingStart, start, blank_lines_before)
            }
            '}' => {
                self.bump();
                self.flow_level = self.flow_level.saturating_sub(1);
                self.finish(TokenData::FlowMappingEnd, start, blank_lines_before)
            }
            ',' if self.flow_level > 0 => {
                self.bump();
                self.finish(TokenData::FlowEntry, start, blank_lines_before)
            }
            '&' => {
                self.bump();
                let name = self.scan_name();
                self.finish(TokenData::Anchor(name), start, blank_lines_before)
            }
            '*' => {
                self.bump();
                let name = self.scan_name();
                self.finish(TokenData::Alias(name), start, blank_lines_before)
            }
            '!' => self.scan_tag(start, blank_lines_before),
            '%' if self.at_line_start => self.scan_directive(start, blank_lines_before),
            '\'' => self.scan_single_quoted(start, blank_lines_before),
            '"' => self.scan_double_quoted(start, blank_lines_before),
            '|' => self.scan_block_scalar(start, blank_lines_before, false),
            '>' => self.scan_block_scalar(start, blank_lines_before, true),
            _ => self.scan_plain_scalar(start, blank_lines_before),
        }
    }

    fn finish(
        &mut self,
        data: TokenData,
        start: Mark,
        blank_lines_before: u32,
    ) -> Result<Token, ScannerError> {
        if !matches!(data, TokenData::Comment { .. }) {
            self.last_token_line = self.mark.line;
            self.last_token_start_col = start.column as i64 - 1;
        }
        Ok(Token {
            data,
            start_mark: start,
            end_mark: self.mark,
            blank_lines_before,
        })
    }

    fn scan_comment(&mut self, start: Mark, blank_lines_before: u32) -> Result<Token, ScannerError> {
        let is_inline = !self.at_line_start || self.last_token_line == start.line;
        self.bump(); // '#'
        let mut text = String::new();
        while let Some(c) = self.cur() {
            if Self::is_break(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        let text = text.trim_end().to_string();
        self.finish(
            TokenData::Comment { text, is_inline },
            start,
            blank_lines_before,
        )
    }

    fn scan_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.cur() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    fn scan_tag(&mut self, start: Mark, blank_lines_before: u32) -> Result<Token, ScannerError> {
        self.bump(); // leading '!'
        if self.cur() == Some('<') {
            self.bump();
            let mut uri = String::new();
            while let Some(c) = self.cur() {
                if c == '>' {
                    self.bump();
                    break;
                }
                uri.push(c);
                self.bump();
            }
            return self.finish(
                TokenData::Tag {
                    handle: String::new(),
                    suffix: uri,
                },
                start,
                blank_lines_before,
            );
        }
        if self.cur() == Some('!') {
            self.bump();
            let name = self.scan_name();
            return self.finish(
                TokenData::Tag {
                    handle: "!!".to_string(),
                    suffix: name,
                },
                start,
                blank_lines_before,
            );
        }
        let name = self.scan_name();
        if name.is_empty() {
            return self.finish(
                TokenData::Tag {
                    handle: "!".to_string(),
                    suffix: String::new(),
                },
                start,
                blank_lines_before,
            );
        }
        self.finish(
            TokenData::Tag {
                handle: "!".to_string(),
                suffix: name,
            },
            start,
            blank_lines_before,
        )
    }

    fn scan_directive(&mut self, start: Mark, blank_lines_before: u32) -> Result<Token, ScannerError> {
        self.bump(); // '%'
        let mut name = String::new();
        while let Some(c) = self.cur() {
            if Self::is_blank(c) || Self::is_break(c) {
                break;
            }
            name.push(c);
            self.bump();
        }
        while let Some(c) = self.cur() {
            if Self::is_blank(c) {
                self.bump();
            } else {
                break;
            }
        }
        let mut value = String::new();
        while let Some(c) = self.cur() {
            if Self::is_break(c) {
                break;
            }
            value.push(c);
            self.bump();
        }
        self.finish(
            TokenData::Directive {
                name,
                value: value.trim_end().to_string(),
            },
            start,
            blank_lines_before,
        )
    }

    fn scan_single_quoted(
        &mut self,
        start: Mark,
        blank_lines_before: u32,
    ) -> Result<Token, ScannerError> {
        self.bump(); // opening '\''
        let mut value = String::new();
        loop {
            match self.cur() {
                None => {
                    return Err(ScannerError::UnterminatedString {
                        quote: "single",
                        mark: start,
                    })
                }
                Some('\'') => {
                    if self.at(1) == Some('\'') {
                        value.push('\'');
                        self.bump();
                        self.bump();
                    } else {
                        self.bump();
                        break;
                    }
                }
                Some(c) if Self::is_break(c) => {
                    self.fold_line_break(&mut value);
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        self.finish(
            TokenData::Scalar {
                value,
                style: ScalarStyle::SingleQuoted,
            },
            start,
            blank_lines_before,
        )
    }

    fn scan_double_quoted(
        &mut self,
        start: Mark,
        blank_lines_before: u32,
    ) -> Result<Token, ScannerError> {
        self.bump(); // opening '"'
        let mut value = String::new();
        loop {
            match self.cur() {
                None => {
                    return Err(ScannerError::UnterminatedString {
                        quote: "double",
                        mark: start,
                    })
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    let esc_mark = self.mark;
                    self.bump();
                    let Some(e) = self.cur() else {
                        return Err(ScannerError::UnterminatedString {
                            quote: "double",
                            mark: start,
                        });
                    };
                    match e {
                        'n' => {
                            value.push('\n');
                            self.bump();
                        }
                        't' => {
                            value.push('\t');
                            self.bump();
                        }
                        'r' => {
                            value.push('\r');
                            self.bump();
                        }
                        '\\' => {
                            value.push('\\');
                            self.bump();
                        }
                        '"' => {
                            value.push('"');
                            self.bump();
                        }
                        '0' => {
                            value.push('\0');
                            self.bump();
                        }
                        'x' => {
                            self.bump();
                            let c = self.scan_hex_escape(2, esc_mark)?;
                            value.push(c);
                        }
                        'u' => {
                            self.bump();
                            let c = self.scan_hex_escape(4, esc_mark)?;
                            value.push(c);
                        }
                        'U' => {
                            self.bump();
                            let c = self.scan_hex_escape(8, esc_mark)?;
                            value.push(c);
                        }
                        _ => return Err(ScannerError::InvalidEscape { mark: esc_mark }),
                    }
                }
                Some(c) if Self::is_break(c) => {
                    self.fold_line_break(&mut value);
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        self.finish(
            TokenData::Scalar {
                value,
                style: ScalarStyle::DoubleQuoted,
            },
            start,
            blank_lines_before,
        )
    }

    fn scan_hex_escape(&mut self, digits: usize, mark: Mark) -> Result<char, ScannerError> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            let Some(c) = self.cur() else {
                return Err(ScannerError::InvalidEscape { mark });
            };
            let Some(d) = c.to_digit(16) else {
                return Err(ScannerError::InvalidEscape { mark });
            };
            code = code * 16 + d;
            self.bump();
        }
        char::from_u32(code).ok_or(ScannerError::InvalidEscape { mark })
    }

    /// Fold a line break inside a quoted scalar per YAML 1.2: a single break
    /// becomes a space, consecutive breaks become `n - 1` newlines.
    fn fold_line_break(&mut self, value: &mut String) {
        let mut breaks = 0u32;
        while self.cur().map(Self::is_break).unwrap_or(false) {
            self.bump_break();
            breaks += 1;
        }
        // also consume leading indentation whitespace on the continuation line
        while self.cur().map(Self::is_blank).unwrap_or(false) {
            self.bump();
        }
        if breaks == 1 {
            value.push(' ');
        } else {
            for _ in 0..breaks - 1 {
                value.push('\n');
            }
        }
    }

    fn scan_block_scalar(
        &mut self,
        start: Mark,
        blank_lines_before: u32,
        folded: bool,
    ) -> Result<Token, ScannerError> {
        self.bump(); // '|' or '>'
        let mut chomping = Chomping::Clip;
        let mut explicit_indent: Option<i64> = None;
        loop {
            match self.cur() {
                Some('-') => {
                    chomping = Chomping::Strip;
                    self.bump();
                }
                Some('+') => {
                    chomping = Chomping::Keep;
                    self.bump();
                }
                Some(c) if c.is_ascii_digit() => {
                    explicit_indent = Some(c.to_digit(10).unwrap() as i64);
                    self.bump();
                }
                _ => break,
            }
        }
        // consume the rest of the header line (may hold a trailing comment,
        // which is not surfaced; block scalar headers don't carry comments)
        while let Some(c) = self.cur() {
            if Self::is_break(c) {
                break;
            }
            self.bump();
        }
        if self.cur().map(Self::is_break).unwrap_or(false) {
            self.bump_break();
        }

        let base_column = start.column as i64 - 1;
        let mut raw_lines: Vec<String> = Vec::new();
        let mut min_indent: Option<i64> = None;
        loop {
            if self.eof() {
                break;
            }
            let line_start = self.pos;
            let mut col = 0i64;
            while let Some(c) = self.cur() {
                if c == ' ' {
                    col += 1;
                    self.bump();
                } else {
                    break;
                }
            }
            let blank = self.cur().map(Self::is_break).unwrap_or(false) || self.eof();
            if blank {
                let mut line = String::new();
                while let Some(c) = self.cur() {
                    if Self::is_break(c) {
                        break;
                    }
                    line.push(c);
                    self.bump();
                }
                raw_lines.push(line);
                if self.cur().map(Self::is_break).unwrap_or(false) {
                    self.bump_break();
                } else {
                    break;
                }
                continue;
            }
            let effective_indent = explicit_indent.map(|d| base_column + d).unwrap_or(col);
            if col < effective_indent || (explicit_indent.is_none() && col <= base_column) {
                self.pos = line_start;
                self.mark.column = base_column as u64 + 1;
                break;
            }
            if explicit_indent.is_none() {
                min_indent = Some(min_indent.map_or(col, |m: i64| m.min(col)));
            }
            let mut line = String::new();
            let extra = col - effective_indent.max(0);
            for _ in 0..extra.max(0) {
                line.push(' ');
            }
            while let Some(c) = self.cur() {
                if Self::is_break(c) {
                    break;
                }
                line.push(c);
                self.bump();
            }
            raw_lines.push(line);
            if self.cur().map(Self::is_break).unwrap_or(false) {
                self.bump_break();
            } else {
                break;
            }
        }

        while matches!(raw_lines.last(), Some(l) if l.is_empty()) {
            if matches!(chomping, Chomping::Keep) {
                break;
            }
            raw_lines.pop();
        }

        let body = if folded {
            fold_lines(&raw_lines)
        } else {
            raw_lines.join("\n")
        };

        let value = match chomping {
            Chomping::Strip => body,
            Chomping::Clip if body.is_empty() => body,
            Chomping::Clip => format!("{body}\n"),
            Chomping::Keep => format!("{body}\n"),
        };

        let style = if folded {
            ScalarStyle::Folded
        } else {
            ScalarStyle::Literal
        };
        self.finish(
            TokenData::Scalar { value, style },
            start,
            blank_lines_before,
        )
    }

    fn scan_plain_scalar(
        &mut self,
        start: Mark,
        blank_lines_before: u32,
    ) -> Result<Token, ScannerError> {
        if let Some(c) = self.cur() {
            if INDICATORS.contains(&c) && !matches!(c, '-' | ':' | '?') {
                return Err(ScannerError::InvalidCharacter { mark: start });
            }
        }
        let mut value = String::new();
        loop {
            match self.cur() {
                None => break,
                Some(c) if Self::is_break(c) => match self.plain_scalar_fold() {
                    Some(breaks) => {
                        let kept = value.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
                        value.truncate(kept);
                        if breaks <= 1 {
                            value.push(' ');
                        } else {
                            for _ in 0..breaks {
                                value.push('\n');
                            }
                        }
                    }
                    None => break,
                },
                Some(':') if self.flow_level > 0 || self.at(1).is_none() || Self::is_blank(self.at(1).unwrap()) || Self::is_break(self.at(1).unwrap()) => {
                    break;
                }
                Some('#') if value.ends_with(' ') || value.ends_with('\t') || value.is_empty() => {
                    break;
                }
                Some(c) if self.flow_level > 0 && matches!(c, ',' | ']' | '}') => break,
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        let trimmed = value.trim_end().to_string();
        self.finish(
            TokenData::Scalar {
                value: trimmed,
                style: ScalarStyle::Plain,
            },
            start,
            blank_lines_before,
        )
    }

    /// Length in chars of a line break starting at absolute index `idx`
    /// into `self.chars` (0 if there isn't one there).
    fn break_len_at(&self, idx: usize) -> usize {
        match self.chars.get(idx) {
            Some('\r') if self.chars.get(idx + 1) == Some(&'\n') => 2,
            Some('\r') | Some('\n') => 1,
            _ => 0,
        }
    }

    /// Whether a `---` or `...` document marker starts at absolute index
    /// `idx`, followed by whitespace or EOF.
    fn document_marker_at(&self, idx: usize) -> bool {
        let marker = |a: char| {
            self.chars.get(idx) == Some(&a)
                && self.chars.get(idx + 1) == Some(&a)
                && self.chars.get(idx + 2) == Some(&a)
        };
        if !(marker('-') || marker('.')) {
            return false;
        }
        match self.chars.get(idx + 3) {
            None => true,
            Some(&c) => Self::is_blank(c) || Self::is_break(c),
        }
    }

    /// Called with the cursor on a line break while scanning a plain
    /// scalar. Looks ahead to the next non-blank line without mutating
    /// scanner state; if that line is still more indented than the
    /// enclosing block context, consumes up to it and returns the number
    /// of line breaks crossed (for folding). Returns `None`, leaving the
    /// position untouched, if the scalar ends at the break under the
    /// cursor.
    fn plain_scalar_fold(&mut self) -> Option<u32> {
        if self.flow_level > 0 {
            return None;
        }
        let mut idx = self.pos;
        let mut breaks = 0u32;
        let mut col;
        loop {
            let len = self.break_len_at(idx);
            if len == 0 {
                return None;
            }
            idx += len;
            breaks += 1;
            col = 0i64;
            while self.chars.get(idx) == Some(&' ') {
                idx += 1;
                col += 1;
            }
            if self.chars.get(idx).copied().map(Self::is_break).unwrap_or(false) {
                continue;
            }
            break;
        }
        if idx >= self.chars.len() {
            return None;
        }
        if col == 0 && self.document_marker_at(idx) {
            return None;
        }
        if col <= self.indent {
            return None;
        }
        while self.pos < idx {
            if self.break_len_at(self.pos) > 0 {
                self.bump_break();
            } else {
                self.bump();
            }
        }
        Some(breaks)
    }
}

/// Fold single line breaks between non-empty lines into spaces; consecutive
/// breaks (blank lines) become literal newlines. Per YAML 1.2 §8.1.3.
fn fold_lines(lines: &[String]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < lines.len() {
        if i > 0 {
            if lines[i - 1].is_empty() || lines[i].is_empty() {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
        out.push_str(&lines[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<TokenData> {
        let mut s = Scanner::new(src);
        let mut out = Vec::new();
        loop {
            let tok = s.advance().unwrap();
            let done = matches!(tok.data, TokenData::StreamEnd);
            out.push(tok.data);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn simple_mapping() {
        let toks = tokens("key: value\n");
        assert!(matches!(toks[0], TokenData::StreamStart));
        assert!(matches!(&toks[1], TokenData::Scalar { value, .. } if value == "key"));
        assert!(matches!(toks[2], TokenData::MappingValue));
        assert!(matches!(&toks[3], TokenData::Scalar { value, .. } if value == "value"));
    }

    #[test]
    fn plain_scalar_value_folds_onto_a_more_indented_continuation_line() {
        let toks = tokens("key: this is\n  a wrapped value\nnext: 1\n");
        let TokenData::Scalar { value, .. } = &toks[3] else {
            panic!("expected scalar, got {:?}", toks[3])
        };
        assert_eq!(value, "this is a wrapped value");
        let keys: Vec<&str> = toks
            .iter()
            .filter_map(|t| match t {
                TokenData::Scalar { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["key", "this is a wrapped value", "next", "1"]);
    }

    #[test]
    fn plain_scalar_value_stops_at_a_sibling_key_on_the_same_indent() {
        let toks = tokens("key: value\nnext: 1\n");
        let keys: Vec<&str> = toks
            .iter()
            .filter_map(|t| match t {
                TokenData::Scalar { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["key", "value", "next", "1"]);
    }

    #[test]
    fn comment_classification() {
        let toks = tokens("# standalone\nkey: value # inline\n");
        let comment = toks
            .iter()
            .find_map(|t| match t {
                TokenData::Comment { text, is_inline } => Some((text.clone(), *is_inline)),
                _ => None,
            })
            .unwrap();
        assert_eq!(comment.0, "standalone");
        assert!(!comment.1);
    }

    #[test]
    fn blank_lines_before_tracked() {
        let mut s = Scanner::new("a: 1\n\n\nb: 2\n");
        let mut last = None;
        loop {
            let tok = s.advance().unwrap();
            if let TokenData::Scalar { value, .. } = &tok.data {
                if value == "b" {
                    last = Some(tok.blank_lines_before);
                }
            }
            if matches!(tok.data, TokenData::StreamEnd) {
                break;
            }
        }
        assert_eq!(last, Some(2));
    }

    #[test]
    fn tab_in_indent_rejected() {
        let mut s = Scanner::new("key:\n\tvalue: 1\n");
        loop {
            match s.advance() {
                Err(ScannerError::TabInIndent { .. }) => return,
                Ok(tok) if matches!(tok.data, TokenData::StreamEnd) => {
                    panic!("expected tab-in-indent error")
                }
                _ => {}
            }
        }
    }

    #[test]
    fn literal_block_scalar_strips_common_indent() {
        let toks = tokens("body: |\n  hello\n  world\n");
        let scalar = toks
            .iter()
            .rev()
            .find_map(|t| match t {
                TokenData::Scalar { value, style } if *style == ScalarStyle::Literal => {
                    Some(value.clone())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(scalar, "hello\nworld\n");
    }
}
