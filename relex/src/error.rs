//! Errors produced while compiling a rule's regex into the shared NFA.

use thiserror::Error;

/// Failure modes of regex compilation. `Lexer::add_rule` is the only
/// public entry point that can return one of these; `next_token` never
/// fails (a byte that matches nothing is skipped, not reported).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegexError {
    #[error("unmatched '(' in pattern")]
    UnmatchedOpenParen,

    #[error("unmatched ')' in pattern")]
    UnmatchedCloseParen,

    #[error("unterminated character class")]
    UnterminatedClass,

    #[error("invalid quantifier at offset {offset}")]
    InvalidQuantifier { offset: usize },

    #[error("pattern ends with a trailing escape")]
    TrailingEscape,

    #[error("rule would require more than {max} NFA states")]
    TooManyStates { max: usize },
}
