// Copyright 2015 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Optional subset-construction DFA, built once from a frozen [`Nfa`].
//!
//! This trades build-time and worst-case state blow-up for a transition
//! lookup per input byte instead of an active-state-set walk. The token
//! stream it produces is identical to [`crate::lexer::Lexer`]'s; only the
//! per-byte cost model differs.

use std::collections::HashMap;

use crate::nfa::{Nfa, StateId, ALPHABET_SIZE};

/// A deterministic transition table derived from an [`Nfa`] by subset
/// construction. Each DFA state corresponds to a distinct reachable set
/// of NFA states.
pub struct Dfa {
    transitions: Vec<[u32; ALPHABET_SIZE]>,
    accept: Vec<i32>,
}

/// Index of the trap DFA state: no input leads anywhere useful from here.
const TRAP: u32 = 0;

impl Dfa {
    /// Run subset construction over `nfa`, starting from its epsilon
    /// closure of [`StateId::BEGIN`].
    pub fn build(nfa: &Nfa) -> Self {
        let mut transitions = vec![[TRAP; ALPHABET_SIZE]];
        let mut accept = vec![0i32];

        let mut set_to_dfa_state: HashMap<Vec<StateId>, u32> = HashMap::new();
        let mut worklist = Vec::new();

        let start_set = nfa.epsilon_closure(&[StateId::BEGIN]);
        let mut start_key = start_set.clone();
        start_key.sort();
        let start_id = transitions.len() as u32;
        transitions.push([TRAP; ALPHABET_SIZE]);
        accept.push(accepting_id(nfa, &start_set));
        set_to_dfa_state.insert(start_key, start_id);
        worklist.push((start_id, start_set));

        while let Some((dfa_state, nfa_states)) = worklist.pop() {
            for byte in 0..ALPHABET_SIZE as u8 {
                let stepped = nfa.step(&nfa_states, byte);
                if stepped.is_empty() {
                    continue;
                }
                let closure = nfa.epsilon_closure(&stepped);
                let mut key = closure.clone();
                key.sort();

                let target = *set_to_dfa_state.entry(key).or_insert_with(|| {
                    let id = transitions.len() as u32;
                    transitions.push([TRAP; ALPHABET_SIZE]);
                    accept.push(accepting_id(nfa, &closure));
                    worklist.push((id, closure));
                    id
                });

                transitions[dfa_state as usize][byte as usize] = target;
            }
        }

        Dfa { transitions, accept }
    }

    /// `None` for the trap state (no match possible from here), else the
    /// accepting token id (`0` if this state is reachable but not
    /// accepting).
    pub fn step(&self, state: u32, byte: u8) -> Option<u32> {
        let next = self.transitions[state as usize][byte as usize & 0x7f];
        if next == TRAP {
            None
        } else {
            Some(next)
        }
    }

    pub fn start(&self) -> u32 {
        1
    }

    pub fn accept_of(&self, state: u32) -> i32 {
        self.accept[state as usize]
    }
}

fn accepting_id(nfa: &Nfa, states: &[StateId]) -> i32 {
    let mut found = 0;
    for &s in states {
        let id = nfa.accept_of(s);
        if id != 0 {
            found = id;
        }
    }
    found
}
