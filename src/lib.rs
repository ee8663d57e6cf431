//! Lexer for linker control scripts.
//!
//! Splits script text (`SECTIONS { ... }`, `ENTRY(...)`, `PROVIDE(...)`,
//! memory regions, arithmetic on addresses) into typed tokens for a
//! recursive-descent parser. The lexer is pull-based: tokens are scanned
//! one at a time, with up to two tokens of lookahead.
//!
//! # Quick start
//!
//! ## Tokenize a whole script
//!
//! ```
//! use ldscript_lexer::{tokenize, Keyword, TokenKind};
//!
//! let tokens = tokenize("ENTRY(_start)").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::Keyword(Keyword::Entry),
//!         TokenKind::BracketBegin,
//!         TokenKind::Identifier,
//!         TokenKind::BracketEnd,
//!         TokenKind::Eof,
//!     ]
//! );
//! ```
//!
//! ## Drive the lexer from a parser
//!
//! ```
//! use ldscript_lexer::{CollectingSink, Lexer, SourceBuffer, TokenKind};
//!
//! let source = SourceBuffer::new("link.ld", "foo = bar+4;");
//! let mut lexer = Lexer::with_sink(&source, CollectingSink::new());
//!
//! assert_eq!(lexer.next_token().text, "foo");
//! assert_eq!(lexer.next_token().kind, TokenKind::Assign);
//!
//! // Right-hand side of an assignment is an expression.
//! lexer.set_in_expression(true);
//! assert_eq!(lexer.next_token().text, "bar");
//! assert_eq!(lexer.next_token().kind, TokenKind::Plus);
//! assert_eq!(lexer.next_token().kind, TokenKind::Decimal);
//! lexer.set_in_expression(false);
//! assert_eq!(lexer.next_token().kind, TokenKind::Semicolon);
//! assert!(lexer.sink().diagnostics.is_empty());
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod diagnostics;
pub mod lexer;
pub mod source;
pub mod token;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Level, NullSink, TracingSink};
pub use lexer::{LexError, LexErrorKind, Lexer, LexerOptions, tokenize};
pub use source::SourceBuffer;
pub use token::{Keyword, Span, Token, TokenKind};
