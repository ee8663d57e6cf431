#![allow(dead_code)]

use ldscript_lexer::{CollectingSink, Lexer, LexerOptions, Token, TokenKind};

/// Lexer over `input` collecting its diagnostics.
pub fn lexer(input: &str) -> Lexer<'_, CollectingSink> {
    Lexer::from_parts("test.ld", input, CollectingSink::new(), LexerOptions::default())
}

/// Lexer over `input` in expression mode.
pub fn expr_lexer(input: &str) -> Lexer<'_, CollectingSink> {
    Lexer::from_parts(
        "test.ld",
        input,
        CollectingSink::new(),
        LexerOptions::default().in_expression(true),
    )
}

/// Drain a lexer up to and including the first `Eof`.
pub fn drain<'s>(lexer: &mut Lexer<'s, CollectingSink>) -> Vec<Token<'s>> {
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        tokens.push(token);
        if token.kind == TokenKind::Eof {
            return tokens;
        }
    }
}

/// `(kind, text)` pairs for every token of `input`, `Eof` included.
pub fn lex(input: &str) -> Vec<(TokenKind, &str)> {
    drain(&mut lexer(input))
        .into_iter()
        .map(|t| (t.kind, t.text))
        .collect()
}

/// Like [`lex`], in expression mode.
pub fn lex_expr(input: &str) -> Vec<(TokenKind, &str)> {
    drain(&mut expr_lexer(input))
        .into_iter()
        .map(|t| (t.kind, t.text))
        .collect()
}

/// Kinds of every token of `input`, `Eof` included.
pub fn kinds(input: &str) -> Vec<TokenKind> {
    lex(input).into_iter().map(|(k, _)| k).collect()
}
