#[cfg(test)]
mod scanner_tests {
    use rox::error::{Diagnostics, LoxError};
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn types(source: &str, layout: Layout) -> Vec<&'static str> {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::with_layout(source, layout).scan_tokens(&mut diagnostics);

        assert!(
            !diagnostics.had_error(),
            "unexpected errors: {:?}",
            diagnostics.errors()
        );

        tokens.iter().map(|t| t.token_type.name()).collect()
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "! != = == < <= > >= / :",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::COLON, ":"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_simple_assignment() {
        let tokens: Vec<Token> = Scanner::new("x = 1").filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].token_type, TokenType::IDENTIFIER);
        assert_eq!(tokens[0].lexeme, "x");
        assert_eq!(tokens[1].token_type, TokenType::EQUAL);
        assert_eq!(tokens[2].literal(), Some(Literal::Number(1.0)));
        assert_eq!(tokens[3].token_type, TokenType::EOF);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo < Bar fun _x orchid",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LESS, "<"),
                (TokenType::IDENTIFIER, "Bar"),
                (TokenType::FUN, "fun"),
                (TokenType::IDENTIFIER, "_x"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_unicode_identifier() {
        assert_token_sequence(
            "変数 = café",
            &[
                (TokenType::IDENTIFIER, "変数"),
                (TokenType::EQUAL, "="),
                (TokenType::IDENTIFIER, "café"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_numbers() {
        let tokens: Vec<Token> = Scanner::new("12 3.25 7.").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].literal(), Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal(), Some(Literal::Number(3.25)));
        assert_eq!(tokens[2].literal(), Some(Literal::Number(7.0)));
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_escaped_unicode_string() {
        let source = r#""hoge こんにちは\" piyo\n""#;
        let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0].literal(),
            Some(Literal::Str("hoge こんにちは\" piyo\n".to_string()))
        );
    }

    #[test]
    fn test_all_escapes() {
        let source = r#""\\ \" \n \r \b \t \f \v""#;
        let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

        assert_eq!(
            tokens[0].literal(),
            Some(Literal::Str(
                "\\ \" \n \r \u{8} \t \u{c} \u{b}".to_string()
            ))
        );
    }

    #[test]
    fn test_invalid_escape() {
        let mut diagnostics = Diagnostics::new();
        Scanner::new(r#""a\qb""#).scan_tokens(&mut diagnostics);

        assert!(diagnostics.had_error());
        assert_eq!(diagnostics.errors()[0].message(), "Invalid escape sequence.");
    }

    #[test]
    fn test_unterminated_string() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("\"abc").scan_tokens(&mut diagnostics);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
        assert_eq!(
            diagnostics.errors(),
            &[LoxError::lex(1, "Unterminated string.")]
        );
    }

    #[test]
    fn test_multiline_string_counts_lines() {
        let tokens: Vec<Token> = Scanner::new("\"a\nb\"\nx").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].literal(), Some(Literal::Str("a\nb".to_string())));
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let tokens: Vec<Token> = Scanner::new("// leading\n\n  x // trailing\n\ny")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].lexeme, "x");
        assert_eq!(tokens[0].line, 3);
        assert_eq!(tokens[1].lexeme, "y");
        assert_eq!(tokens[1].line, 5);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        // COMMA, DOT, error, LEFT_PAREN, error, EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $".to_string(),
                "[line 1] Error: Unexpected character: #".to_string(),
            ]
        );

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_token_display() {
        let tokens: Vec<Token> = Scanner::new("var n = 42; \"s\"").filter_map(Result::ok).collect();
        let lines: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            lines,
            vec![
                "VAR var null",
                "IDENTIFIER n null",
                "EQUAL = null",
                "NUMBER 42 42.0",
                "SEMICOLON ; null",
                "STRING \"s\" s",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_indentation_blocks() {
        let source = "if (x):\n    print 1\n\n    // note\nprint 2\n";

        assert_eq!(
            types(source, Layout::Indentation),
            vec![
                "IF",
                "LEFT_PAREN",
                "IDENTIFIER",
                "RIGHT_PAREN",
                "LEFT_BRACE",
                "PRINT",
                "NUMBER",
                "SEMICOLON",
                "RIGHT_BRACE",
                "PRINT",
                "NUMBER",
                "SEMICOLON",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_indentation_closes_blocks_at_eof() {
        let source = "class A:\n  init(x):\n    this.x = x";

        assert_eq!(
            types(source, Layout::Indentation),
            vec![
                "CLASS",
                "IDENTIFIER",
                "LEFT_BRACE",
                "IDENTIFIER",
                "LEFT_PAREN",
                "IDENTIFIER",
                "RIGHT_PAREN",
                "LEFT_BRACE",
                "THIS",
                "DOT",
                "IDENTIFIER",
                "EQUAL",
                "IDENTIFIER",
                "SEMICOLON",
                "RIGHT_BRACE",
                "RIGHT_BRACE",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_indentation_ignores_newlines_in_parens() {
        let source = "f(1,\n  2)\n";

        assert_eq!(
            types(source, Layout::Indentation),
            vec![
                "IDENTIFIER",
                "LEFT_PAREN",
                "NUMBER",
                "COMMA",
                "NUMBER",
                "RIGHT_PAREN",
                "SEMICOLON",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_unindent_mismatch() {
        let mut diagnostics = Diagnostics::new();
        Scanner::with_layout("if (x):\n    a\n  b\n", Layout::Indentation)
            .scan_tokens(&mut diagnostics);

        assert!(diagnostics.had_error());
        assert_eq!(
            diagnostics.errors()[0].message(),
            "Unindent does not match any outer indentation level."
        );
    }
}
