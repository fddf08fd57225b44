#[cfg(test)]
mod scanner_tests {
    use rox::error::{LoxError, ScanErrorKind};
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let (tokens, errors) = scan(source);

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn scan_kind(error: &LoxError) -> ScanErrorKind {
        match error {
            LoxError::Lex { kind, .. } => kind.clone(),
            other => panic!("expected a scan error, got {:?}", other),
        }
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
    fn test_maximal_munch_operators() {
        assert_token_sequence(
            "!= ! == = <= < >= > /",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::EQUAL, "="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::GREATER, ">"),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        let (tokens, errors) = scan(",.$(#");
        let kinds: Vec<_> = tokens.iter().map(|t| t.token_type.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenType::COMMA,
                TokenType::DOT,
                TokenType::LEFT_PAREN,
                TokenType::EOF
            ]
        );

        let error_kinds: Vec<_> = errors.iter().map(scan_kind).collect();
        assert_eq!(
            error_kinds,
            vec![
                ScanErrorKind::UnrecognizedToken('$'),
                ScanErrorKind::UnrecognizedToken('#'),
            ]
        );
    }

    #[test]
    fn test_multibyte_character_is_one_error() {
        let (tokens, errors) = scan("a é b");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            scan_kind(&errors[0]),
            ScanErrorKind::UnrecognizedToken('é')
        );
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["a", "b", ""]);
    }

    #[test]
    fn test_strings_span_lines() {
        let (tokens, errors) = scan("\"one\ntwo\" x");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].token_type, TokenType::STRING(String::new()));
        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected string, got {:?}", other),
        }
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string_still_ends_with_one_eof() {
        let (tokens, errors) = scan("print \"oops\n");

        assert_eq!(errors.len(), 1);
        assert_eq!(scan_kind(&errors[0]), ScanErrorKind::UnterminatedString);
        assert_eq!(errors[0].line(), Some(2));

        let eofs = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::EOF)
            .count();
        assert_eq!(eofs, 1);
        assert_eq!(tokens.last().map(|t| t.token_type.clone()), Some(TokenType::EOF));
    }

    #[test]
    fn test_numbers() {
        let (tokens, errors) = scan("123 45.67 8.");

        assert!(errors.is_empty());

        let numbers: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![123.0, 45.67, 8.0]);

        // Trailing dot is not part of the number.
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_token_sequence(
            "and class orchid _under fun4 while",
            &[
                (TokenType::AND, "and"),
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::IDENTIFIER, "_under"),
                (TokenType::IDENTIFIER, "fun4"),
                (TokenType::WHILE, "while"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let (tokens, errors) = scan("// nothing here\nvar x; // trailing\n\nx");

        assert!(errors.is_empty());
        let lines: Vec<_> = tokens.iter().map(|t| (t.lexeme.as_str(), t.line)).collect();
        assert_eq!(
            lines,
            vec![("var", 2), ("x", 2), (";", 2), ("x", 4), ("", 4)]
        );
    }

    #[test]
    fn test_relexing_lexemes_reproduces_kinds() {
        let source = r#"
            class Counter < Base {
              init(start) { this.n = start; }
              bump() { this.n = this.n + 1; return this.n >= 10 and !false; }
            }
            var c = Counter(1.5); // comment
            print "done" == nil or c.bump() != super;
        "#;

        let (tokens, errors) = scan(source);
        assert!(errors.is_empty());

        let printed: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        let (relexed, errors) = scan(&printed.join(" "));
        assert!(errors.is_empty());

        let kinds = |ts: &[Token]| ts.iter().map(|t| t.token_type.name()).collect::<Vec<_>>();
        assert_eq!(kinds(&tokens), kinds(&relexed));
    }

    #[test]
    fn test_token_display() {
        let (tokens, _) = scan("3 2.5 \"hi\" and");

        let shown: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            shown,
            vec![
                "NUMBER 3 3.0",
                "NUMBER 2.5 2.5",
                "STRING \"hi\" hi",
                "AND and null",
                "EOF  null",
            ]
        );
    }
}
