//! Property-based tests for the lexer and parser.
//!
//! 1. **Layout does not matter**: whitespace and comments between tokens never
//!    change the parsed tree
//! 2. **Lexer never panics** on arbitrary input
//! 3. **Parser never panics** on arbitrary input
//! 4. **EOF forever**: once exhausted, the lexer keeps yielding `Eof`
//! 5. **Token spans stay inside the input**

use proptest::prelude::*;

use crate::ast::print_tree;
use crate::lexer::{tokenize, Lexer, TokenKind};
use crate::parser::parse;

// ============================================================================
// Generators
// ============================================================================

/// Valid programs, pre-split into tokens.
const PROGRAMS: &[&[&str]] = &[
    &["let", "x", "=", "1_000", "+", "2", "*", "3", ";", "x"],
    &["if", "(", "a", ">", "1", ")", "{", "b", "=", "2", "}", "else", "b", "=", "3", ";"],
    &[
        "for", "(", "i", "=", "0", ";", "i", "<", "10", ";", "i", "++", ")", "{", "s", "=", "s", "+", "i", "}",
    ],
    &[
        "func", "f", "(", "a", ",", "b", ")", "{", "return", "a", "-", "b", ";", "}", "f", "(", "1", ",", "2", ")",
    ],
    &["s", "=", "\"a b\"", ";", "s", "[", "0", "]", "=", "\"x\""],
    &["while", "(", "n", "!=", "0", ")", "n", "--", ";"],
    &["x", "=", "(", "1", "<<", "2", ")", "^", "7", "&&", "y", "==", "null"],
];

const SEPARATORS: &[&str] = &[" ", "\n", "\t  ", "/* note */", "// note\n", " /* multi\nline */ "];

/// (plain, decorated): the same tokens joined by single spaces, and joined by
/// arbitrary whitespace and comments.
fn program_with_layout() -> impl Strategy<Value = (String, String)> {
    prop::sample::select(PROGRAMS).prop_flat_map(|tokens| {
        prop::collection::vec(prop::sample::select(SEPARATORS), tokens.len()).prop_map(move |seps| {
            let plain = tokens.join(" ");
            let mut decorated = String::new();
            for (token, sep) in tokens.iter().zip(seps) {
                decorated.push_str(token);
                decorated.push_str(sep);
            }
            (plain, decorated)
        })
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn layout_does_not_change_tree((plain, decorated) in program_with_layout()) {
        let plain_tree = print_tree(&parse(&plain).expect("plain program parses"));
        let decorated_tree = print_tree(&parse(&decorated).expect("decorated program parses"));
        prop_assert_eq!(plain_tree, decorated_tree);
    }

    #[test]
    fn lexer_never_panics(input in "\\PC{0,64}") {
        let _ = tokenize(&input);
    }

    #[test]
    fn parser_never_panics(input in "[a-z0-9(){};=+*<>!&|\" \\[\\]]{0,48}") {
        let _ = parse(&input);
    }

    #[test]
    fn eof_forever(input in "[a-z0-9 +;()]{0,32}") {
        let mut lexer = Lexer::new(&input);
        let mut reached_eof = false;
        for _ in 0..=input.len() + 1 {
            match lexer.next_token() {
                Ok(token) if token.kind == TokenKind::Eof => {
                    reached_eof = true;
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        if reached_eof {
            for _ in 0..3 {
                let token = lexer.next_token().expect("eof is stable");
                prop_assert_eq!(token.kind, TokenKind::Eof);
                prop_assert_eq!(token.span.start.offset, input.len());
            }
        }
    }

    #[test]
    fn token_spans_within_input(input in "\\PC{0,64}") {
        if let Ok(tokens) = tokenize(&input) {
            let mut last_end = 0;
            for token in tokens {
                prop_assert!(token.span.start.offset >= last_end);
                prop_assert!(token.span.end.offset <= input.len());
                last_end = token.span.end.offset;
            }
        }
    }
}
