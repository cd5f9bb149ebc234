//! Black-box end-to-end scenarios against the public API only.

use relex::{Lexer, Token, EOF_TOKEN_ID};

fn collect<'a>(lexer: &mut Lexer<'a>, input: &'a [u8]) -> Vec<Token> {
    lexer.set_stream(input);
    lexer.build();
    let mut out = Vec::new();
    loop {
        let t = lexer.next_token();
        let eof = t.id == EOF_TOKEN_ID;
        out.push(t);
        if eof {
            break;
        }
    }
    out
}

#[test]
fn scenario_names_and_numbers() {
    let mut lexer = Lexer::new();
    lexer.add_rule(b"[0-9]+", 1).unwrap(); // INT
    lexer.add_rule(b"[a-zA-Z_]+", 2).unwrap(); // NAME

    let toks = collect(&mut lexer, b"abc 123");
    assert_eq!(toks[0], Token { index: 0, length: 3, id: 2, line: 1, column: 1 });
    assert_eq!(toks[1], Token { index: 4, length: 3, id: 1, line: 1, column: 5 });
    assert_eq!(toks[2].id, EOF_TOKEN_ID);
    assert_eq!(toks[2].index, 7);
}

#[test]
fn scenario_block_comment_then_skip() {
    let mut lexer = Lexer::new();
    lexer.add_rule(br"/\*(\*[^/]|[^*])*\*/", 1).unwrap(); // COMMENT

    let toks = collect(&mut lexer, b"/* hi */x");
    assert_eq!(toks[0], Token { index: 0, length: 8, id: 1, line: 1, column: 1 });
    assert_eq!(toks[1].id, EOF_TOKEN_ID);
    assert_eq!(toks[1].index, 9);
}

#[test]
fn scenario_keyword_priority_vs_longest_match() {
    let mut lexer = Lexer::new();
    lexer.add_rule(b"(for|while|if)", 1).unwrap(); // KW
    lexer.add_rule(b"[a-zA-Z_]+", 2).unwrap(); // NAME

    let toks = collect(&mut lexer, b"for x");
    assert_eq!(toks[0], Token { index: 0, length: 3, id: 1, line: 1, column: 1 });
    assert_eq!(toks[1], Token { index: 4, length: 1, id: 2, line: 1, column: 5 });
    assert_eq!(toks[2].id, EOF_TOKEN_ID);
}

#[test]
fn scenario_float_vs_int() {
    let mut lexer = Lexer::new();
    lexer.add_rule(br"[0-9]*\.[0-9]+", 1).unwrap(); // FLOAT
    lexer.add_rule(b"[0-9]+", 2).unwrap(); // INT

    let toks = collect(&mut lexer, b"12 3.14");
    assert_eq!(toks[0], Token { index: 0, length: 2, id: 2, line: 1, column: 1 });
    assert_eq!(toks[1], Token { index: 3, length: 4, id: 1, line: 1, column: 4 });
    assert_eq!(toks[2].id, EOF_TOKEN_ID);
}

#[test]
fn malformed_rule_does_not_affect_valid_rules() {
    let mut lexer = Lexer::new();
    lexer.add_rule(b"[a-z]+", 1).unwrap();
    assert!(lexer.add_rule(b"(unterminated", 2).is_err());
    let toks = collect(&mut lexer, b"hello");
    assert_eq!(toks[0].id, 1);
    assert_eq!(toks[0].length, 5);
}

#[test]
fn determinism_across_rewind() {
    let mut lexer = Lexer::new();
    lexer.add_rule(b"[a-z]+", 1).unwrap();
    lexer.add_rule(b"[0-9]+", 2).unwrap();

    let first = collect(&mut lexer, b"ab 12 cd");
    lexer.rewind();
    let mut second = Vec::new();
    loop {
        let t = lexer.next_token();
        let eof = t.id == EOF_TOKEN_ID;
        second.push(t);
        if eof {
            break;
        }
    }
    assert_eq!(first, second);
}
