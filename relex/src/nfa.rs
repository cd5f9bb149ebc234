// Copyright 2015 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The NFA arena and the regex-to-NFA builder.
//!
//! States are handles (`StateId`) into flat, growable storage rather than
//! a pointer graph. The alphabet is fixed at 128 symbols (7-bit ASCII).

use bit_set::BitSet;
use itertools::Itertools;

use crate::error::RegexError;
use crate::quantifier::{quantify, Quantifier};

/// Number of symbols in the input alphabet.
pub const ALPHABET_SIZE: usize = 128;

/// A handle to a state in an [`Nfa`]. `GARBAGE` is the implicit trap
/// state; `BEGIN` is the unique start state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    pub const GARBAGE: StateId = StateId(0);
    pub const BEGIN: StateId = StateId(1);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A 128-bit membership set over the alphabet, used while scanning a
/// bracket expression or a literal atom before transitions are written.
#[derive(Clone)]
struct Bitmap([bool; ALPHABET_SIZE]);

impl Bitmap {
    fn none() -> Self {
        Bitmap([false; ALPHABET_SIZE])
    }

    fn all() -> Self {
        Bitmap([true; ALPHABET_SIZE])
    }

    fn single(b: u8) -> Self {
        let mut m = Self::none();
        m.set(b);
        m
    }

    fn set(&mut self, b: u8) {
        self.0[b as usize & 0x7f] = true;
    }

    fn clear(&mut self, b: u8) {
        self.0[b as usize & 0x7f] = false;
    }

    fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(|(i, _)| i as u8)
    }
}

/// The shared, growable automaton. Rules are added one at a time via
/// [`Nfa::add_rule`]; each call extends the same automaton from the
/// shared start state [`StateId::BEGIN`].
pub struct Nfa {
    transitions: Vec<[StateId; ALPHABET_SIZE]>,
    epsilon: Vec<Vec<StateId>>,
    accept: Vec<i32>,
}

impl Nfa {
    pub fn new() -> Self {
        let mut nfa = Nfa {
            transitions: Vec::new(),
            epsilon: Vec::new(),
            accept: Vec::new(),
        };
        // GARBAGE and BEGIN, in that order.
        nfa.new_state();
        nfa.new_state();
        nfa
    }

    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    fn new_state(&mut self) -> StateId {
        let id = StateId(self.transitions.len() as u32);
        self.transitions.push([StateId::GARBAGE; ALPHABET_SIZE]);
        self.epsilon.push(Vec::new());
        self.accept.push(0);
        id
    }

    fn transition(&self, from: StateId, byte: u8) -> StateId {
        self.transitions[from.index()][byte as usize & 0x7f]
    }

    fn set_transition(&mut self, from: StateId, byte: u8, to: StateId) {
        self.transitions[from.index()][byte as usize & 0x7f] = to;
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        // Single-hop only: `to` must not already have outgoing epsilon
        // edges of its own, or epsilon_closure's one-hop assumption breaks.
        debug_assert!(
            self.epsilon[to.index()].is_empty(),
            "epsilon target {:?} already has outgoing epsilon edges",
            to
        );
        self.epsilon[from.index()].push(to);
    }

    pub fn accept_of(&self, state: StateId) -> i32 {
        self.accept[state.index()]
    }

    fn set_accept(&mut self, state: StateId, token_id: i32) {
        self.accept[state.index()] = token_id;
    }

    /// Register one rule: extend the automaton from `BEGIN` so that
    /// matching `regex` reaches a state accepting `token_id`. States
    /// already accepting an earlier rule keep that rule's id — the first
    /// rule added wins ties.
    pub fn add_rule(&mut self, regex: &[u8], token_id: i32) -> Result<(), RegexError> {
        let snapshot = self.num_states();
        let result =
            self.add_expr_group(regex, &[StateId::BEGIN], StateId::BEGIN, Quantifier::once());
        match result {
            Ok(finals) => {
                for state in finals {
                    if self.accept_of(state) == 0 {
                        self.set_accept(state, token_id);
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.rollback(snapshot);
                Err(e)
            }
        }
    }

    fn rollback(&mut self, snapshot: usize) {
        self.transitions.truncate(snapshot);
        self.epsilon.truncate(snapshot);
        self.accept.truncate(snapshot);
    }

    /// Extend the automaton so that `re`, repeated `quant.min..quant.max`
    /// times, carries any state in `start_states` to one of the returned
    /// states. `write_state` is the single state from which the next
    /// labelled transition will be written; on a write collision (the
    /// needed byte already transitions elsewhere from `write_state`) a
    /// fresh epsilon-linked state is substituted transparently.
    fn add_expr_group(
        &mut self,
        re: &[u8],
        start_states: &[StateId],
        mut write_state: StateId,
        quant: Quantifier,
    ) -> Result<Vec<StateId>, RegexError> {
        let mut group_final_state_set: Vec<StateId> = Vec::new();
        let mut next_state_set: Vec<StateId> = start_states.to_vec();

        let total_iterations = match quant.max {
            Some(m) => m,
            None => quant.min + 1,
        };

        let mut cycle_state: Option<StateId> = None;

        for occurrence in 0..total_iterations {
            let closes_cycle = quant.max.is_none() && occurrence == quant.min;
            if closes_cycle {
                cycle_state = Some(write_state);
                group_final_state_set.extend_from_slice(&next_state_set);
            } else if quant.max.is_some() && occurrence >= quant.min {
                // The state reached at the start of this iteration (i.e.
                // after exactly `occurrence` repetitions) is itself a
                // valid final state whenever we've already met `min`.
                group_final_state_set.extend_from_slice(&next_state_set);
            }

            let occurrence_start = next_state_set.clone();
            let entry_write_state = write_state;
            let mut current_state_set = occurrence_start.clone();
            let mut pos = 0usize;

            while pos < re.len() {
                match re[pos] {
                    b'|' => {
                        group_final_state_set.extend_from_slice(&current_state_set);
                        current_state_set = occurrence_start.clone();
                        write_state = entry_write_state;
                        pos += 1;
                    }
                    b')' => return Err(RegexError::UnmatchedCloseParen),
                    b'(' => {
                        let inner_start = pos + 1;
                        let close = find_matching_paren(re, pos)?;
                        let (qlen, q) = quantify(&re[close + 1..]);
                        let finals = self.add_expr_group(
                            &re[inner_start..close],
                            &current_state_set,
                            write_state,
                            q,
                        )?;
                        write_state = finals[0];
                        current_state_set = finals;
                        pos = close + 1 + qlen;
                    }
                    b'\\' => {
                        let lit = *re.get(pos + 1).ok_or(RegexError::TrailingEscape)?;
                        let (qlen, q) = quantify(&re[pos + 2..]);
                        if qlen == 0 {
                            write_state = self.emit_atom(write_state, &Bitmap::single(lit));
                            current_state_set = vec![write_state];
                            pos += 2;
                        } else {
                            let finals = self.add_expr_group(
                                &re[pos..pos + 2],
                                &current_state_set,
                                write_state,
                                q,
                            )?;
                            write_state = finals[0];
                            current_state_set = finals;
                            pos += 2 + qlen;
                        }
                    }
                    b'[' => {
                        let (bitmap, class_len) = parse_class(&re[pos..])?;
                        let (qlen, q) = quantify(&re[pos + class_len..]);
                        if qlen == 0 {
                            write_state = self.emit_atom(write_state, &bitmap);
                            current_state_set = vec![write_state];
                            pos += class_len;
                        } else {
                            let finals = self.add_expr_group(
                                &re[pos..pos + class_len],
                                &current_state_set,
                                write_state,
                                q,
                            )?;
                            write_state = finals[0];
                            current_state_set = finals;
                            pos += class_len + qlen;
                        }
                    }
                    b'.' => {
                        let (qlen, q) = quantify(&re[pos + 1..]);
                        if qlen == 0 {
                            write_state = self.emit_atom(write_state, &Bitmap::all());
                            current_state_set = vec![write_state];
                            pos += 1;
                        } else {
                            let finals = self.add_expr_group(
                                &re[pos..pos + 1],
                                &current_state_set,
                                write_state,
                                q,
                            )?;
                            write_state = finals[0];
                            current_state_set = finals;
                            pos += 1 + qlen;
                        }
                    }
                    c => {
                        let (qlen, q) = quantify(&re[pos + 1..]);
                        if qlen == 0 {
                            write_state = self.emit_atom(write_state, &Bitmap::single(c));
                            current_state_set = vec![write_state];
                            pos += 1;
                        } else {
                            let finals = self.add_expr_group(
                                &re[pos..pos + 1],
                                &current_state_set,
                                write_state,
                                q,
                            )?;
                            write_state = finals[0];
                            current_state_set = finals;
                            pos += 1 + qlen;
                        }
                    }
                }
            }

            next_state_set = current_state_set;

            if closes_cycle {
                let cs = cycle_state.expect("cycle_state set when closes_cycle holds");
                self.add_epsilon(write_state, cs);
                next_state_set.push(cs);
                break;
            }
        }

        group_final_state_set.extend_from_slice(&next_state_set);
        Ok(group_final_state_set)
    }

    /// Write a single labelled atom from `write_state`, returning the new
    /// target state. Introduces an epsilon bypass first if any byte in
    /// `bitmap` already transitions elsewhere from `write_state` — this is
    /// what lets independent alternatives share one entry state safely.
    fn emit_atom(&mut self, write_state: StateId, bitmap: &Bitmap) -> StateId {
        let collides = bitmap
            .bytes()
            .any(|b| self.transition(write_state, b) != StateId::GARBAGE);

        let source = if collides {
            let bypass = self.new_state();
            self.add_epsilon(write_state, bypass);
            bypass
        } else {
            write_state
        };

        let target = self.new_state();
        for b in bitmap.bytes() {
            self.set_transition(source, b, target);
        }
        target
    }

    /// Single-hop epsilon closure: every state in `states`, plus every
    /// state directly epsilon-reachable from one of them. Order-preserving
    /// and deduplicated.
    pub fn epsilon_closure(&self, states: &[StateId]) -> Vec<StateId> {
        let mut seen = BitSet::with_capacity(self.num_states());
        let mut out = Vec::with_capacity(states.len());
        for &s in states {
            if seen.insert(s.index()) {
                out.push(s);
            }
            for &e in &self.epsilon[s.index()] {
                if seen.insert(e.index()) {
                    out.push(e);
                }
            }
        }
        out
    }

    /// The successor set reached by consuming `byte` from every state in
    /// `states`, deduplicated but not epsilon-closed.
    pub fn step(&self, states: &[StateId], byte: u8) -> Vec<StateId> {
        states
            .iter()
            .map(|&s| self.transition(s, byte))
            .filter(|&t| t != StateId::GARBAGE)
            .unique()
            .collect()
    }
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

fn find_matching_paren(re: &[u8], open_pos: usize) -> Result<usize, RegexError> {
    let mut depth = 0i32;
    let mut pos = open_pos;
    while pos < re.len() {
        match re[pos] {
            b'\\' => pos += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    Err(RegexError::UnmatchedOpenParen)
}

/// Parse a bracket expression `[...]` or `[^...]` starting at `s[0] ==
/// '['`. Returns the bitmap and the number of bytes consumed, including
/// both brackets.
fn parse_class(s: &[u8]) -> Result<(Bitmap, usize), RegexError> {
    debug_assert_eq!(s.first(), Some(&b'['));
    let mut pos = 1;
    let negate = if s.get(pos) == Some(&b'^') {
        pos += 1;
        true
    } else {
        false
    };

    let mut members: Vec<u8> = Vec::new();
    while pos < s.len() && s[pos] != b']' {
        let mut first = s[pos];
        pos += 1;
        if first == b'\\' {
            first = *s.get(pos).ok_or(RegexError::UnterminatedClass)?;
            pos += 1;
        }

        if s.get(pos) == Some(&b'-') && s.get(pos + 1).is_some_and(|&c| c != b']') {
            pos += 1;
            let mut last = *s.get(pos).ok_or(RegexError::UnterminatedClass)?;
            pos += 1;
            if last == b'\\' {
                last = *s.get(pos).ok_or(RegexError::UnterminatedClass)?;
                pos += 1;
            }
            let (lo, hi) = if first <= last { (first, last) } else { (last, first) };
            members.extend(lo..=hi);
        } else {
            members.push(first);
        }
    }

    if pos >= s.len() {
        return Err(RegexError::UnterminatedClass);
    }
    pos += 1; // past ']'

    let bitmap = if negate {
        let mut m = Bitmap::all();
        for b in members {
            m.clear(b);
        }
        m
    } else {
        let mut m = Bitmap::none();
        for b in members {
            m.set(b);
        }
        m
    };

    Ok((bitmap, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(nfa: &Nfa, input: &[u8]) -> Option<i32> {
        let mut states = nfa.epsilon_closure(&[StateId::BEGIN]);
        let mut best = None;
        for &s in &states {
            if nfa.accept_of(s) != 0 {
                best = Some(nfa.accept_of(s));
            }
        }
        for &b in input {
            let stepped = nfa.step(&states, b);
            if stepped.is_empty() {
                return best;
            }
            states = nfa.epsilon_closure(&stepped);
            for &s in &states {
                if nfa.accept_of(s) != 0 {
                    best = Some(nfa.accept_of(s));
                }
            }
        }
        best
    }

    #[test]
    fn literal_match() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"abc", 1).unwrap();
        assert_eq!(run(&nfa, b"abc"), Some(1));
        assert_eq!(run(&nfa, b"ab"), None);
    }

    #[test]
    fn star_quantifier() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"a*", 1).unwrap();
        assert_eq!(run(&nfa, b""), Some(1));
        assert_eq!(run(&nfa, b"aaaa"), Some(1));
    }

    #[test]
    fn plus_quantifier_requires_one() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"a+", 1).unwrap();
        assert_eq!(run(&nfa, b""), None);
        assert_eq!(run(&nfa, b"aaa"), Some(1));
    }

    #[test]
    fn bounded_quantifier() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"a{2,4}", 1).unwrap();
        assert_eq!(run(&nfa, b"a"), None);
        assert_eq!(run(&nfa, b"aa"), Some(1));
        assert_eq!(run(&nfa, b"aaaa"), Some(1));
    }

    #[test]
    fn alternation() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"abc|def", 1).unwrap();
        assert_eq!(run(&nfa, b"abc"), Some(1));
        assert_eq!(run(&nfa, b"def"), Some(1));
        assert_eq!(run(&nfa, b"abf"), None);
    }

    #[test]
    fn negated_class() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"[^0-9]", 1).unwrap();
        assert_eq!(run(&nfa, b"a"), Some(1));
        assert_eq!(run(&nfa, b"5"), None);
    }

    #[test]
    fn reversed_range_normalizes() {
        let mut forward = Nfa::new();
        forward.add_rule(b"[a-z]", 1).unwrap();
        let mut reversed = Nfa::new();
        reversed.add_rule(b"[z-a]", 1).unwrap();
        for b in b'a'..=b'z' {
            assert_eq!(run(&forward, &[b]), run(&reversed, &[b]));
        }
    }

    #[test]
    fn earlier_rule_wins_on_tie() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"[0-9]+", 10).unwrap();
        nfa.add_rule(b"[0-9]+", 20).unwrap();
        assert_eq!(run(&nfa, b"42"), Some(10));
    }

    #[test]
    fn unmatched_open_paren_is_rejected() {
        let mut nfa = Nfa::new();
        assert_eq!(nfa.add_rule(b"(abc", 1), Err(RegexError::UnmatchedOpenParen));
    }

    #[test]
    fn unmatched_close_paren_is_rejected() {
        let mut nfa = Nfa::new();
        assert_eq!(nfa.add_rule(b"abc)", 1), Err(RegexError::UnmatchedCloseParen));
    }

    #[test]
    fn unterminated_class_is_rejected() {
        let mut nfa = Nfa::new();
        assert_eq!(nfa.add_rule(b"[abc", 1), Err(RegexError::UnterminatedClass));
    }

    #[test]
    fn failed_rule_does_not_corrupt_earlier_rules() {
        let mut nfa = Nfa::new();
        nfa.add_rule(b"abc", 1).unwrap();
        let snapshot = nfa.num_states();
        assert!(nfa.add_rule(b"(bad", 2).is_err());
        assert_eq!(nfa.num_states(), snapshot);
        assert_eq!(run(&nfa, b"abc"), Some(1));
    }

    #[derive(Clone, Debug)]
    struct SmallRegex(Vec<u8>);

    impl quickcheck::Arbitrary for SmallRegex {
        fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
            const ALPHABET: &[u8] = b"abc[]^-.|()*+?{},0129";
            let len = usize::arbitrary(g) % 16;
            let bytes = (0..len)
                .map(|_| {
                    let idx = usize::arbitrary(g) % ALPHABET.len();
                    ALPHABET[idx]
                })
                .collect();
            SmallRegex(bytes)
        }
    }

    #[test]
    fn building_any_small_regex_never_panics_and_keeps_invariants() {
        fn prop(re: SmallRegex) -> bool {
            let mut nfa = Nfa::new();
            let before = nfa.num_states();
            match nfa.add_rule(&re.0, 1) {
                Ok(()) => nfa.accept_of(StateId::GARBAGE) == 0 && nfa.num_states() >= before,
                Err(_) => nfa.num_states() == before,
            }
        }
        quickcheck::quickcheck(prop as fn(SmallRegex) -> bool);
    }
}
