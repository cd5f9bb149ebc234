// Copyright 2015 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `relex` compiles a set of regex-tagged tokenization rules into a
//! single NFA and drives it over an input byte slice to produce a
//! longest-match, priority-ordered token stream.
//!
//! ```
//! use relex::Lexer;
//!
//! let mut lexer = Lexer::new();
//! lexer.add_rule(b"[0-9]+", 1).unwrap();
//! lexer.add_rule(b"[a-zA-Z_]+", 2).unwrap();
//! lexer.set_stream(b"abc 123");
//! lexer.build();
//!
//! let first = lexer.next_token();
//! assert_eq!(first.id, 2);
//! assert_eq!(first.length, 3);
//! ```

pub mod error;
pub mod lexer;
pub mod nfa;
pub mod quantifier;

#[cfg(feature = "dfa")]
pub mod dfa;

pub use error::RegexError;
pub use lexer::{Lexer, Token, EOF_TOKEN_ID};
pub use nfa::{Nfa, StateId};
pub use quantifier::{quantify, Quantifier};
