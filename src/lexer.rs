use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticSink, Level, TracingSink};
use crate::source::SourceBuffer;
use crate::token::{Keyword, Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// `/*` without a matching `*/`.
    UnclosedComment,
    /// `"` without a matching unescaped `"`.
    UnclosedQuote { buffer: String },
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl LexErrorKind {
    /// Whether lexing of the buffer stops at this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnclosedComment | Self::UnclosedQuote { .. })
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnclosedComment => write!(f, "unclosed comment"),
            Self::UnclosedQuote { buffer } => write!(f, "unclosed quote in {buffer}"),
            Self::UnexpectedCharacter(ch) => write!(f, "unexpected character '{ch}'"),
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Lexer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    /// Start in expression mode.
    pub in_expression: bool,
    /// Skip a leading UTF-8 byte order mark.
    pub skip_bom: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            in_expression: false,
            skip_bom: true,
        }
    }
}

impl LexerOptions {
    #[must_use]
    pub const fn in_expression(mut self, value: bool) -> Self {
        self.in_expression = value;
        self
    }

    #[must_use]
    pub const fn skip_bom(mut self, value: bool) -> Self {
        self.skip_bom = value;
        self
    }
}

/// Tokenize a whole script, stopping at the first lexical error.
///
/// The returned tokens end with a single `Eof` token. Diagnostics are
/// collected and discarded; use [`Lexer`] directly to receive them.
///
/// # Errors
///
/// Returns `LexError` for an unclosed comment, an unclosed quote, or a
/// character that cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = Lexer::from_parts(
        "<input>",
        input,
        crate::diagnostics::NullSink,
        LexerOptions::default(),
    );
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Error => {
                return Err(lexer.lex_errors().first().cloned().unwrap_or_else(|| {
                    LexError {
                        kind: LexErrorKind::UnexpectedCharacter(
                            token.text.chars().next().unwrap_or('\0'),
                        ),
                        span: token.span,
                    }
                }));
            }
            TokenKind::Eof => {
                tokens.push(token);
                return Ok(tokens);
            }
            _ => tokens.push(token),
        }
    }
}

/// Pull-based lexer over one script buffer.
///
/// Tokens are produced one at a time by [`Lexer::next_token`]. Up to two
/// tokens can be inspected ahead of time with [`Lexer::peek`] and
/// [`Lexer::peek2`]. Expression mode is owned by the caller: the parser
/// switches it on around arithmetic expressions, where operator
/// characters end an identifier instead of continuing a bare word.
pub struct Lexer<'s, D = TracingSink> {
    name: &'s str,
    input: &'s str,
    pos: usize,
    line: usize,
    col: usize,
    in_expression: bool,
    halted: bool,
    current: Option<Token<'s>>,
    pending: [Option<Token<'s>>; 2],
    /// Diagnostics for text before this offset were already reported
    /// before the text was rewound and scanned again.
    rescan_floor: usize,
    sink: D,
    lex_errors: Vec<LexError>,
    error_count: usize,
}

impl<'s> Lexer<'s, TracingSink> {
    /// Create a lexer reporting diagnostics through `tracing`.
    #[must_use]
    pub fn new(source: &'s SourceBuffer) -> Self {
        Self::with_sink(source, TracingSink)
    }
}

impl<'s, D: DiagnosticSink> Lexer<'s, D> {
    #[must_use]
    pub fn with_sink(source: &'s SourceBuffer, sink: D) -> Self {
        Self::with_options(source, sink, LexerOptions::default())
    }

    #[must_use]
    pub fn with_options(source: &'s SourceBuffer, sink: D, options: LexerOptions) -> Self {
        Self::from_parts(source.name(), source.text(), sink, options)
    }

    /// Create a lexer over borrowed text without a [`SourceBuffer`].
    #[must_use]
    pub fn from_parts(name: &'s str, input: &'s str, sink: D, options: LexerOptions) -> Self {
        let pos = if options.skip_bom && input.starts_with('\u{FEFF}') {
            '\u{FEFF}'.len_utf8()
        } else {
            0
        };
        tracing::debug!(source = name, bytes = input.len(), "lexer created");
        Self {
            name,
            input,
            pos,
            line: 1,
            col: 1,
            in_expression: options.in_expression,
            halted: false,
            current: None,
            pending: [None, None],
            rescan_floor: 0,
            sink,
            lex_errors: Vec::new(),
            error_count: 0,
        }
    }

    /// Consume and return the next token.
    ///
    /// At end of input, and after a fatal error, this keeps returning
    /// `Eof` without moving.
    pub fn next_token(&mut self) -> Token<'s> {
        let token = match self.pending[0].take() {
            Some(token) => {
                self.pending[0] = self.pending[1].take();
                token
            }
            None => self.scan(),
        };
        self.current = Some(token);
        token
    }

    /// The token the next call to [`Lexer::next_token`] will return.
    pub fn peek(&mut self) -> Token<'s> {
        if let Some(token) = self.pending[0] {
            return token;
        }
        let token = self.scan();
        self.pending[0] = Some(token);
        token
    }

    /// The token after [`Lexer::peek`].
    pub fn peek2(&mut self) -> Token<'s> {
        self.peek();
        if let Some(token) = self.pending[1] {
            return token;
        }
        let token = self.scan();
        self.pending[1] = Some(token);
        token
    }

    /// The token most recently returned by [`Lexer::next_token`].
    #[must_use]
    pub const fn current(&self) -> Option<Token<'s>> {
        self.current
    }

    /// Whether the current token is of `kind`. Never advances.
    #[must_use]
    pub fn expect(&self, kind: TokenKind) -> bool {
        self.current.is_some_and(|t| t.kind == kind)
    }

    #[must_use]
    pub const fn in_expression(&self) -> bool {
        self.in_expression
    }

    /// Enter or leave expression mode.
    ///
    /// Peeked tokens scanned under the old mode are dropped and scanned
    /// again. Errors found again at the same place are not reported twice.
    pub fn set_in_expression(&mut self, value: bool) {
        if self.in_expression == value {
            return;
        }
        self.in_expression = value;
        self.rewind_pending();
    }

    /// Byte offset of the cursor. Peeked tokens are behind it.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Whether a fatal error stopped the lexer.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Name of the buffer being lexed.
    #[must_use]
    pub const fn source_name(&self) -> &'s str {
        self.name
    }

    /// Lexical errors found so far.
    #[must_use]
    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    /// Number of error diagnostics reported, by the lexer or through
    /// [`Lexer::error`].
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }

    #[must_use]
    pub const fn sink(&self) -> &D {
        &self.sink
    }

    #[must_use]
    pub fn into_sink(self) -> D {
        self.sink
    }

    /// Report an error at `span`. Lexing continues.
    pub fn error(&mut self, span: Span, message: impl Into<String>) {
        self.report(Level::Error, span, message.into());
    }

    /// Report a warning at `span`.
    pub fn warning(&mut self, span: Span, message: impl Into<String>) {
        self.report(Level::Warning, span, message.into());
    }

    fn report(&mut self, level: Level, span: Span, message: String) {
        if level == Level::Error {
            self.error_count += 1;
        }
        self.sink.report(Diagnostic {
            level,
            source: self.name.to_string(),
            span,
            message,
        });
    }

    fn lex_error(&mut self, kind: LexErrorKind, span: Span) {
        if span.offset < self.rescan_floor
            && self.lex_errors.iter().any(|e| e.span.offset == span.offset)
        {
            return;
        }
        self.report(Level::Error, span, kind.to_string());
        self.lex_errors.push(LexError { kind, span });
    }

    fn lex_warning(&mut self, span: Span, message: String) {
        if span.offset >= self.rescan_floor {
            self.report(Level::Warning, span, message);
        }
    }

    fn rewind_pending(&mut self) {
        let Some(first) = self.pending[0] else {
            return;
        };
        self.halted = false;
        self.rescan_floor = self.rescan_floor.max(self.pos);
        self.pos = first.span.offset;
        self.line = first.span.line;
        self.col = first.span.column;
        self.pending = [None, None];
    }

    // -- cursor --

    const fn here(&self) -> Span {
        Span {
            offset: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    fn rest(&self) -> &'s str {
        &self.input[self.pos..]
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn advance_to(&mut self, target: usize) {
        let input = self.input;
        for ch in input[self.pos..target].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos = target;
    }

    fn advance(&mut self, len: usize) {
        self.advance_to(self.pos + len);
    }

    // -- scanning --

    fn scan(&mut self) -> Token<'s> {
        if self.halted {
            return self.eof();
        }

        if let Some(start) = self.skip_insignificant() {
            let kind = self.fatal(start, LexErrorKind::UnclosedComment);
            return self.finish(start, kind);
        }

        let Some(ch) = self.rest().chars().next() else {
            return self.eof();
        };

        let start = self.here();
        let kind = match ch {
            '0'..='9' => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' || c == '.' => self.word(),
            '"' => self.quoted(),
            c => self.symbol(c),
        };
        self.finish(start, kind)
    }

    fn finish(&self, start: Span, kind: TokenKind) -> Token<'s> {
        let token = Token {
            kind,
            text: &self.input[start.offset..self.pos],
            span: start,
        };
        tracing::trace!(kind = ?token.kind, offset = start.offset, "token");
        token
    }

    fn eof(&self) -> Token<'s> {
        Token {
            kind: TokenKind::Eof,
            text: &self.input[self.pos..],
            span: self.here(),
        }
    }

    /// Report a fatal error and consume the rest of the input.
    fn fatal(&mut self, start: Span, kind: LexErrorKind) -> TokenKind {
        self.advance_to(self.input.len());
        self.halted = true;
        tracing::debug!(source = self.name, error = %kind, "lexing halted");
        self.lex_error(kind, start);
        TokenKind::Error
    }

    /// Skip comments and whitespace.
    ///
    /// Returns the start of an unclosed block comment, leaving the cursor
    /// on it.
    fn skip_insignificant(&mut self) -> Option<Span> {
        loop {
            let rest = self.rest();
            if let Some(body) = rest.strip_prefix("/*") {
                match body.find("*/") {
                    Some(end) => self.advance(2 + end + 2),
                    None => return Some(self.here()),
                }
            } else if rest.starts_with('#') {
                let end = rest.find('\n').unwrap_or(rest.len());
                self.advance(end);
            } else {
                let len = rest
                    .bytes()
                    .take_while(|&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
                    .count();
                if len == 0 {
                    return None;
                }
                self.advance(len);
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        let start = self.here();
        let len = self.rest().bytes().take_while(|&b| is_number_byte(b)).count();
        self.advance(len);
        let input = self.input;
        let text = &input[start.offset..self.pos];
        let (kind, well_formed) = classify_number(text);
        if !well_formed {
            self.lex_warning(start, format!("malformed numeric literal '{text}'"));
        }
        kind
    }

    fn word(&mut self) -> TokenKind {
        let rest = self.rest();
        let mut len = rest.bytes().take_while(|&b| is_bareword_byte(b)).count();
        if self.in_expression {
            // An operator at offset 0 never truncates; the word would be empty.
            if let Some(cut) = rest.as_bytes()[1..len]
                .iter()
                .position(|&b| is_expression_operator(b))
            {
                len = cut + 1;
            }
        }
        let text = &rest[..len];
        self.advance(len);

        if text == "." {
            return TokenKind::Dot;
        }
        Keyword::lookup(text).map_or(TokenKind::Identifier, TokenKind::Keyword)
    }

    fn quoted(&mut self) -> TokenKind {
        let start = self.here();
        let bytes = self.rest().as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.advance(i + 1);
                    return TokenKind::Quoted;
                }
                _ => i += 1,
            }
        }
        let buffer = self.name.to_string();
        self.fatal(start, LexErrorKind::UnclosedQuote { buffer })
    }

    fn symbol(&mut self, ch: char) -> TokenKind {
        let expr = self.in_expression;
        let (kind, len) = match (ch, self.peek_byte(1), self.peek_byte(2)) {
            ('(', ..) => (TokenKind::BracketBegin, 1),
            (')', ..) => (TokenKind::BracketEnd, 1),
            ('{', ..) => (TokenKind::CurlyBegin, 1),
            ('}', ..) => (TokenKind::CurlyEnd, 1),
            (';', ..) => (TokenKind::Semicolon, 1),
            (',', ..) => (TokenKind::Comma, 1),
            (':', ..) => (TokenKind::Colon, 1),
            ('?', ..) => (TokenKind::QuestionMark, 1),

            ('*', Some(b'='), _) if expr => (TokenKind::MulAssign, 2),
            ('*', ..) => (TokenKind::Asterisk, 1),

            ('<', Some(b'<'), Some(b'=')) => (TokenKind::LeftShiftAssign, 3),
            ('<', Some(b'='), _) => (TokenKind::LessEqual, 2),
            ('<', Some(b'<'), _) => (TokenKind::LeftShift, 2),
            ('<', ..) => (TokenKind::Less, 1),

            ('>', Some(b'>'), Some(b'=')) => (TokenKind::RightShiftAssign, 3),
            ('>', Some(b'='), _) => (TokenKind::GreaterEqual, 2),
            ('>', Some(b'>'), _) => (TokenKind::RightShift, 2),
            ('>', ..) => (TokenKind::Greater, 1),

            ('&', Some(b'='), _) => (TokenKind::AndAssign, 2),
            ('&', Some(b'&'), _) => (TokenKind::LogicalAnd, 2),
            ('&', ..) => (TokenKind::Ampersand, 1),

            ('^', Some(b'='), _) => (TokenKind::XorAssign, 2),
            ('^', ..) => (TokenKind::Caret, 1),

            ('|', Some(b'='), _) => (TokenKind::OrAssign, 2),
            ('|', Some(b'|'), _) => (TokenKind::LogicalOr, 2),
            ('|', ..) => (TokenKind::VerticalBar, 1),

            ('+', Some(b'='), _) => (TokenKind::PlusAssign, 2),
            ('+', ..) => (TokenKind::Plus, 1),

            ('-', Some(b'='), _) => (TokenKind::MinusAssign, 2),
            ('-', ..) => (TokenKind::Minus, 1),

            ('=', Some(b'='), _) if expr => (TokenKind::Equal, 2),
            ('=', Some(b'='), _) => return self.unexpected(ch),
            ('=', ..) => (TokenKind::Assign, 1),

            ('!', Some(b'='), _) if expr => (TokenKind::NotEqual, 2),
            ('!', ..) if expr => (TokenKind::Not, 1),
            ('/', Some(b'='), _) if expr => (TokenKind::DivAssign, 2),
            ('/', ..) if expr => (TokenKind::Slash, 1),
            ('%', ..) if expr => (TokenKind::Percent, 1),
            ('~', ..) if expr => (TokenKind::Tilde, 1),

            _ => return self.unexpected(ch),
        };
        self.advance(len);
        kind
    }

    fn unexpected(&mut self, ch: char) -> TokenKind {
        let start = self.here();
        self.advance(ch.len_utf8());
        self.lex_error(LexErrorKind::UnexpectedCharacter(ch), start);
        TokenKind::Error
    }
}

/// Yields tokens up to, not including, `Eof`.
impl<'s, D: DiagnosticSink> Iterator for Lexer<'s, D> {
    type Item = Token<'s>;

    fn next(&mut self) -> Option<Token<'s>> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

const fn is_number_byte(b: u8) -> bool {
    matches!(
        b,
        b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' | b'H' | b'h' | b'K' | b'k' | b'M' | b'm' | b'X' | b'x'
    )
}

const fn is_bareword_byte(b: u8) -> bool {
    matches!(
        b,
        b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'_'
            | b'.'
            | b'$'
            | b'/'
            | b'\\'
            | b'~'
            | b'='
            | b'+'
            | b'['
            | b']'
            | b'*'
            | b'?'
            | b'-'
            | b'!'
            | b'^'
            | b':'
    )
}

const fn is_expression_operator(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'~' | b'*' | b'/' | b'+' | b'-' | b'<' | b'>' | b'?' | b'^' | b':' | b'='
    )
}

/// Classify a numeric run and check that its digits suit its radix.
///
/// The suffix is the last character of the run, never the one after it.
fn classify_number(text: &str) -> (TokenKind, bool) {
    let bytes = text.as_bytes();
    if let [b'0', b'x' | b'X', payload @ ..] = bytes {
        let payload = match payload {
            [digits @ .., b'h' | b'H'] => digits,
            digits => digits,
        };
        let ok = !payload.is_empty() && payload.iter().all(u8::is_ascii_hexdigit);
        return (TokenKind::Hex, ok);
    }

    match bytes {
        [body @ .., b'H' | b'h'] => (
            TokenKind::HexSuffix,
            !body.is_empty() && body.iter().all(u8::is_ascii_hexdigit),
        ),
        [body @ .., b'K' | b'k'] => (
            TokenKind::DecimalK,
            !body.is_empty() && body.iter().all(u8::is_ascii_digit),
        ),
        [body @ .., b'M' | b'm'] => (
            TokenKind::DecimalM,
            !body.is_empty() && body.iter().all(u8::is_ascii_digit),
        ),
        digits => (
            TokenKind::Decimal,
            !digits.is_empty() && digits.iter().all(u8::is_ascii_digit),
        ),
    }
}
