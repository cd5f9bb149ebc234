// Copyright 2015 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The lexer driver: rule registration and longest-match NFA simulation.

use crate::error::RegexError;
use crate::nfa::{Nfa, StateId};

/// Sentinel token id returned once the input is exhausted.
pub const EOF_TOKEN_ID: i32 = -52;

/// A recognized token: `index` is the byte offset of its first character
/// from the start of the bound input slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub index: u64,
    pub length: u32,
    pub id: i32,
    pub line: u32,
    pub column: u32,
}

/// Cursor over the bound input slice, tracking line/column position.
struct LexingIterator<'a> {
    input: &'a [u8],
    pos: usize,
    last_line_begin: isize,
    line: u32,
    token_begin: usize,
    token_line: u32,
    token_column: u32,
}

impl<'a> LexingIterator<'a> {
    fn new(input: &'a [u8]) -> Self {
        LexingIterator {
            input,
            pos: 0,
            last_line_begin: -1,
            line: 1,
            token_begin: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    fn rewind(&mut self) {
        self.pos = 0;
        self.last_line_begin = -1;
        self.line = 1;
        self.token_begin = 0;
        self.token_line = 1;
        self.token_column = 1;
    }

    fn column_at(&self, pos: usize) -> u32 {
        (pos as isize - self.last_line_begin) as u32
    }

    fn note_token_start(&mut self) {
        self.token_begin = self.pos;
        self.token_line = self.line;
        self.token_column = self.column_at(self.pos);
    }

    fn advance_one(&mut self) {
        if self.input[self.pos] == b'\n' {
            self.line += 1;
            self.last_line_begin = self.pos as isize;
        }
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

enum LexingState {
    Initialization,
    Build,
    Query,
}

/// Compiles a set of regex rules into a shared NFA and drives it over a
/// bound input slice, producing tokens with longest-match and
/// earliest-rule-wins-on-tie semantics.
pub struct Lexer<'a> {
    nfa: Nfa,
    status: LexingState,
    iter: LexingIterator<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new() -> Self {
        Lexer {
            nfa: Nfa::new(),
            status: LexingState::Initialization,
            iter: LexingIterator::new(&[]),
        }
    }

    /// Register one rule. Regex syntax is a POSIX-EXTENDED subset (see
    /// crate docs). Order matters: on an equal-length match between two
    /// rules, the rule added first wins.
    pub fn add_rule(&mut self, regex: &[u8], token_id: i32) -> Result<(), RegexError> {
        self.status = LexingState::Build;
        match self.nfa.add_rule(regex, token_id) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!(
                    "dropping rule {:?} (token {}): {}",
                    String::from_utf8_lossy(regex),
                    token_id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Freeze the automaton. Required before `next_token` is meaningful.
    pub fn build(&mut self) {
        self.status = LexingState::Query;
    }

    /// Bind a new input slice and reset the cursor to its start.
    pub fn set_stream(&mut self, input: &'a [u8]) {
        self.iter = LexingIterator::new(input);
    }

    /// Reset the cursor to the start of the currently bound input.
    pub fn rewind(&mut self) {
        self.iter.rewind();
    }

    /// Produce the next token, or the end-of-input sentinel once the
    /// bound input is exhausted. Bytes matching no rule are silently
    /// skipped one at a time (logged at `trace` level).
    pub fn next_token(&mut self) -> Token {
        debug_assert!(
            matches!(self.status, LexingState::Query),
            "next_token called before build()"
        );

        loop {
            if self.iter.at_end() {
                return Token {
                    index: self.iter.pos as u64,
                    length: 0,
                    id: EOF_TOKEN_ID,
                    line: self.iter.line,
                    column: self.iter.column_at(self.iter.pos),
                };
            }

            self.iter.note_token_start();
            let mut active = self.nfa.epsilon_closure(&[StateId::BEGIN]);
            let mut best_end: Option<(usize, i32)> = None;

            if let Some(id) = accepting_id(&self.nfa, &active) {
                best_end = Some((self.iter.pos, id));
            }

            loop {
                if self.iter.at_end() {
                    break;
                }
                let byte = self.iter.input[self.iter.pos];
                let stepped = self.nfa.step(&active, byte);
                if stepped.is_empty() {
                    break;
                }
                active = self.nfa.epsilon_closure(&stepped);
                self.iter.advance_one();
                if let Some(id) = accepting_id(&self.nfa, &active) {
                    best_end = Some((self.iter.pos, id));
                }
            }

            match best_end {
                Some((end_pos, id)) => {
                    let token = Token {
                        index: self.iter.token_begin as u64,
                        length: (end_pos - self.iter.token_begin) as u32,
                        id,
                        line: self.iter.token_line,
                        column: self.iter.token_column,
                    };
                    self.iter.pos = end_pos;
                    return token;
                }
                None => {
                    log::trace!(
                        "skipping unmatched byte {:?} at offset {}",
                        self.iter.input[self.iter.token_begin] as char,
                        self.iter.token_begin
                    );
                    self.iter.pos = self.iter.token_begin;
                    self.iter.advance_one();
                    continue;
                }
            }
        }
    }
}

impl<'a> Default for Lexer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// The token id of the last-visited accepting state in `states`, if any.
/// Iteration order is determined by the NFA builder's state-allocation
/// order, which together with `add_rule`'s refusal to overwrite an
/// already-accepting state yields "earliest rule wins on a length tie".
fn accepting_id(nfa: &Nfa, states: &[StateId]) -> Option<i32> {
    let mut found = None;
    for &s in states {
        let id = nfa.accept_of(s);
        if id != 0 {
            found = Some(id);
        }
    }
    found
}
