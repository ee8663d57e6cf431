//! Lexer edge cases and error tests.

mod common;

use common::{drain, expr_lexer, kinds, lex, lex_expr, lexer};
use ldscript_lexer::{Keyword, LexErrorKind, Level, TokenKind, tokenize};

// -----------------------------------------------------------
// Comments and whitespace.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn lex_only_whitespace() {
    let tokens = lex("  \t\r\n\n  ");
    assert_eq!(tokens, vec![(TokenKind::Eof, "")]);
}

#[test]
fn lex_block_comment_skipped() {
    assert_eq!(
        kinds("/* a */ ENTRY /* b\n c */ ;"),
        vec![
            TokenKind::Keyword(Keyword::Entry),
            TokenKind::Semicolon,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lex_line_comment_skipped() {
    assert_eq!(
        kinds("# first\nKEEP # trailing\n# last"),
        vec![TokenKind::Keyword(Keyword::Keep), TokenKind::Eof]
    );
}

#[test]
fn lex_adjacent_comments_and_whitespace() {
    assert_eq!(kinds("/**/#x\n/* */  \n#"), vec![TokenKind::Eof]);
}

#[test]
fn lex_comment_star_slash_inside_line_comment() {
    assert_eq!(
        kinds("# /* not a block\nAT"),
        vec![TokenKind::Keyword(Keyword::At), TokenKind::Eof]
    );
}

// -----------------------------------------------------------
// Structural tokens and operators.
// -----------------------------------------------------------

#[test]
fn lex_structural_tokens() {
    assert_eq!(
        kinds("(){};,:*?"),
        vec![
            TokenKind::BracketBegin,
            TokenKind::BracketEnd,
            TokenKind::CurlyBegin,
            TokenKind::CurlyEnd,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Asterisk,
            TokenKind::QuestionMark,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_left_shift_assign_is_one_token() {
    assert_eq!(
        lex("<<="),
        vec![(TokenKind::LeftShiftAssign, "<<="), (TokenKind::Eof, "")]
    );
    assert_eq!(
        lex("<<"),
        vec![(TokenKind::LeftShift, "<<"), (TokenKind::Eof, "")]
    );
    assert_eq!(lex("<"), vec![(TokenKind::Less, "<"), (TokenKind::Eof, "")]);
}

#[test]
fn lex_compound_assignments() {
    assert_eq!(
        kinds("+= -= &= ^= |= >>= ="),
        vec![
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::AndAssign,
            TokenKind::XorAssign,
            TokenKind::OrAssign,
            TokenKind::RightShiftAssign,
            TokenKind::Assign,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_plus_minus_standalone() {
    assert_eq!(
        kinds("+ -"),
        vec![TokenKind::Plus, TokenKind::Minus, TokenKind::Eof]
    );
}

#[test]
fn lex_slash_is_error_outside_expression() {
    let mut lx = lexer("/ x");
    let tokens = drain(&mut lx);
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(tokens[0].text, "/");
    assert_eq!(tokens[1].text, "x");
    assert_eq!(lx.error_count(), 1);
}

// -----------------------------------------------------------
// Numbers.
// -----------------------------------------------------------

#[test]
fn lex_mega_suffix() {
    assert_eq!(
        lex("2M"),
        vec![(TokenKind::DecimalM, "2M"), (TokenKind::Eof, "")]
    );
}

#[test]
fn lex_kilo_suffix() {
    assert_eq!(lex("64k")[0], (TokenKind::DecimalK, "64k"));
}

#[test]
fn lex_hex_prefix() {
    assert_eq!(
        lex("0x10000"),
        vec![(TokenKind::Hex, "0x10000"), (TokenKind::Eof, "")]
    );
    assert_eq!(lex("0XFFh")[0], (TokenKind::Hex, "0XFFh"));
}

#[test]
fn lex_hex_suffix() {
    assert_eq!(lex("1000h")[0], (TokenKind::HexSuffix, "1000h"));
    assert_eq!(lex("0FFH")[0], (TokenKind::HexSuffix, "0FFH"));
}

#[test]
fn lex_plain_decimal() {
    assert_eq!(
        lex("16"),
        vec![(TokenKind::Decimal, "16"), (TokenKind::Eof, "")]
    );
}

#[test]
fn lex_number_stops_at_operator() {
    assert_eq!(
        lex("4K+1"),
        vec![
            (TokenKind::DecimalK, "4K"),
            (TokenKind::Plus, "+"),
            (TokenKind::Decimal, "1"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn lex_malformed_number_is_warning_only() {
    let mut lx = lexer("0xZ");
    let tokens = drain(&mut lx);
    assert_eq!((tokens[0].kind, tokens[0].text), (TokenKind::Hex, "0x"));
    assert_eq!((tokens[1].kind, tokens[1].text), (TokenKind::Identifier, "Z"));
    let sink = lx.into_sink();
    assert!(!sink.has_errors());
    assert_eq!(sink.warnings().count(), 1);
}

// -----------------------------------------------------------
// Identifiers and keywords.
// -----------------------------------------------------------

#[test]
fn lex_bareword_file_name() {
    assert_eq!(lex("file-name.o")[0], (TokenKind::Identifier, "file-name.o"));
}

#[test]
fn lex_bareword_glob() {
    assert_eq!(lex(".text.*")[0], (TokenKind::Identifier, ".text.*"));
    assert_eq!(
        lex("lib[ab]?.a")[0],
        (TokenKind::Identifier, "lib[ab]?.a")
    );
}

#[test]
fn lex_bareword_path_chars() {
    assert_eq!(
        lex("dir/sub\\x$y~z")[0],
        (TokenKind::Identifier, "dir/sub\\x$y~z")
    );
}

#[test]
fn lex_dot_is_location_counter() {
    assert_eq!(lex(". = 0x1000;")[0], (TokenKind::Dot, "."));
    assert_eq!(lex(".text")[0], (TokenKind::Identifier, ".text"));
    assert_eq!(lex("..")[0], (TokenKind::Identifier, ".."));
}

#[test]
fn lex_keyword_case_sensitive() {
    assert_eq!(kinds("SECTIONS")[0], TokenKind::Keyword(Keyword::Sections));
    assert_eq!(kinds("sections")[0], TokenKind::Identifier);
    assert_eq!(kinds("global")[0], TokenKind::Keyword(Keyword::VersionGlobal));
}

#[test]
fn lex_keyword_prefix_is_identifier() {
    assert_eq!(kinds("ALIGNED")[0], TokenKind::Identifier);
    assert_eq!(kinds("SORT_BY_NAME_X")[0], TokenKind::Identifier);
}

#[test]
fn lex_bareword_keeps_operators_outside_expression() {
    assert_eq!(lex("foo+1")[0], (TokenKind::Identifier, "foo+1"));
}

#[test]
fn lex_expression_truncates_identifier() {
    assert_eq!(
        lex_expr("foo+1"),
        vec![
            (TokenKind::Identifier, "foo"),
            (TokenKind::Plus, "+"),
            (TokenKind::Decimal, "1"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn lex_expression_operator_at_start() {
    assert_eq!(
        lex_expr("+foo"),
        vec![
            (TokenKind::Plus, "+"),
            (TokenKind::Identifier, "foo"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn lex_expression_truncates_at_every_operator() {
    for op in ["!", "~", "*", "/", "+", "-", "?", "^", ":", "="] {
        let input = format!("a{op}b");
        let tokens = lex_expr(&input);
        assert_eq!(tokens[0], (TokenKind::Identifier, "a"), "operator {op}");
    }
}

#[test]
fn lex_expression_keeps_word_chars() {
    assert_eq!(
        lex_expr("__start_data$1")[0],
        (TokenKind::Identifier, "__start_data$1")
    );
}

#[test]
fn lex_expression_keyword_after_truncation() {
    assert_eq!(
        lex_expr("ALIGN-4"),
        vec![
            (TokenKind::Keyword(Keyword::Align), "ALIGN"),
            (TokenKind::Minus, "-"),
            (TokenKind::Decimal, "4"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn lex_expression_equality() {
    assert_eq!(
        lex_expr("a==b"),
        vec![
            (TokenKind::Identifier, "a"),
            (TokenKind::Equal, "=="),
            (TokenKind::Identifier, "b"),
            (TokenKind::Eof, ""),
        ]
    );
    assert_eq!(lex_expr("a!=b")[1], (TokenKind::NotEqual, "!="));
}

// -----------------------------------------------------------
// Quoted literals.
// -----------------------------------------------------------

#[test]
fn lex_quote_retained() {
    assert_eq!(
        lex("\"a.o\""),
        vec![(TokenKind::Quoted, "\"a.o\""), (TokenKind::Eof, "")]
    );
}

#[test]
fn lex_quote_with_spaces_and_escape() {
    let tokens = lex(r#"INPUT("my file.o" "x\"y")"#);
    assert_eq!(tokens[2], (TokenKind::Quoted, "\"my file.o\""));
    assert_eq!(tokens[3], (TokenKind::Quoted, r#""x\"y""#));
    assert_eq!(tokens[4].0, TokenKind::BracketEnd);
}

#[test]
fn lex_quote_is_not_a_glob() {
    let mut lx = lexer("\"*.o\"");
    let token = lx.next_token();
    assert_eq!(token.unquoted(), Some("*.o"));
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn lex_error_unclosed_comment() {
    let mut lx = lexer("/* never closed");
    let tokens = drain(&mut lx);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(tokens[0].text, "/* never closed");
    assert_eq!(tokens[1].kind, TokenKind::Eof);
    assert!(lx.is_halted());
    assert_eq!(lx.error_count(), 1);
    assert_eq!(lx.lex_errors()[0].kind, LexErrorKind::UnclosedComment);
    assert_eq!(lx.next_token().kind, TokenKind::Eof);
}

#[test]
fn lex_error_unclosed_quote_names_buffer() {
    let mut lx = lexer("INPUT(\"a.o");
    let tokens = drain(&mut lx);
    assert_eq!(tokens[2].kind, TokenKind::Error);
    assert_eq!(tokens[2].text, "\"a.o");
    let sink = lx.into_sink();
    let error = sink.errors().next().expect("an error");
    assert_eq!(error.level, Level::Error);
    assert!(error.message.contains("test.ld"));
    assert_eq!(error.to_string(), "test.ld:1:7: error: unclosed quote in test.ld");
}

#[test]
fn lex_error_trailing_backslash_in_quote() {
    let err = tokenize("\"abc\\\"").unwrap_err();
    assert!(matches!(err.kind, LexErrorKind::UnclosedQuote { .. }));
}

#[test]
fn lex_error_display_includes_location() {
    let err = tokenize("SECTIONS {\n  @\n}").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('@'));
    assert_eq!(err.to_string(), "unexpected character '@' at line 2, column 3");
}

#[test]
fn lex_fatal_flags() {
    assert!(LexErrorKind::UnclosedComment.is_fatal());
    assert!(!LexErrorKind::UnexpectedCharacter('@').is_fatal());
}

#[test]
fn lex_keeps_collecting_recoverable_errors() {
    let mut lx = lexer("@ % ENTRY");
    let tokens = drain(&mut lx);
    assert_eq!(tokens.len(), 4);
    assert_eq!(lx.error_count(), 2);
    assert_eq!(tokens[2].kind, TokenKind::Keyword(Keyword::Entry));
}

// -----------------------------------------------------------
// Stream protocol.
// -----------------------------------------------------------

#[test]
fn lex_eof_is_idempotent() {
    let mut lx = lexer("x ");
    assert_eq!(lx.next_token().text, "x");
    let eof = lx.next_token();
    assert_eq!(eof.kind, TokenKind::Eof);
    let pos = lx.position();
    for _ in 0..5 {
        assert_eq!(lx.next_token(), eof);
        assert_eq!(lx.peek(), eof);
        assert_eq!(lx.position(), pos);
    }
}

#[test]
fn lex_expect_tracks_current() {
    let mut lx = lexer("PROVIDE(x)");
    assert!(!lx.expect(TokenKind::Keyword(Keyword::Provide)));
    lx.next_token();
    assert!(lx.expect(TokenKind::Keyword(Keyword::Provide)));
    lx.peek2();
    assert!(lx.expect(TokenKind::Keyword(Keyword::Provide)));
    assert!(!lx.expect(TokenKind::BracketBegin));
}

#[test]
fn lex_mode_switch_after_peek() {
    let mut lx = lexer("x = a-1;");
    assert_eq!(lx.next_token().text, "x");
    assert_eq!(lx.next_token().kind, TokenKind::Assign);
    assert_eq!(lx.peek().text, "a-1");
    lx.set_in_expression(true);
    assert_eq!(lx.peek().text, "a");
    assert_eq!(lx.peek2().kind, TokenKind::Minus);
    assert_eq!(lx.next_token().text, "a");
}

#[test]
fn lex_expr_lexer_starts_in_expression() {
    let lx = expr_lexer("a");
    assert!(lx.in_expression());
}
