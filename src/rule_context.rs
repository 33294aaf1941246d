//! `RuleContext` -- per-rule mutable state: a map from `EventKey` to a
//! LIFO stack of pending-start indices (§4.2). The pairing algorithm
//! is grounded on `evobench-tools/src/evaluator/data/log_data_tree.rs`'s
//! `LogDataTree::from_logdata`, the teacher corpus's own stack-based
//! start/stop pairing loop (there keyed by `ThreadId` alone, pushing
//! on `TStart`/`TS` and popping on `TE`/`TEnd`); generalized here to
//! the user-configurable `EventKey` and to the fuller `Action` set
//! (`Ignore`, `PopDiscard`, recursive vs. replace starts) the rule
//! engine needs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::action::{Action, Outcome, StopBehavior};
use crate::event::Event;
use crate::event_key::EventKey;
use crate::rule::Rule;
use crate::sink::OutputSink;

/// Whether the driver should offer the current event to the next rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Stop,
    Continue,
}

pub struct RuleContext<R: Rule> {
    rule: R,
    /// Invariant (§8): every key present here has a non-empty stack;
    /// stacks are removed as soon as they go empty.
    pending: HashMap<EventKey, Vec<usize>>,
}

impl<R: Rule> RuleContext<R> {
    pub fn new(rule: R) -> Self {
        Self {
            rule,
            pending: HashMap::new(),
        }
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Number of keys with at least one pending start. Exposed for
    /// tests of the "empty stacks are pruned" invariant (§8).
    #[cfg(test)]
    pub fn pending_key_count(&self) -> usize {
        self.pending.len()
    }

    /// Total number of pending starts across all keys, left over once
    /// a run has finished. Used by the driver to log how much was
    /// silently discarded (§7.3, §10.3) -- never an error.
    pub fn pending_start_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Classifies `events[index]`, applies the resulting action to the
    /// per-key stack, appends a span to `sink` on a successful pair,
    /// and reports whether later rules should still see this event
    /// (§4.2).
    pub fn process_event(
        &mut self,
        events: &[Event],
        index: usize,
        sink: &mut OutputSink,
    ) -> Continuation {
        let event = &events[index];
        let classification = self.rule.examine(event);

        let outcome = match classification.action {
            Action::None => Outcome::None,
            Action::Ignore => Outcome::Ignore,
            Action::Push => {
                let key = classification.key.expect("Push must carry a key");
                self.pending.entry(key).or_default().push(index);
                Outcome::StackAction
            }
            Action::Replace => {
                let key = classification.key.expect("Replace must carry a key");
                let stack = self.pending.entry(key).or_default();
                stack.pop(); // discard any existing top, per §4.2
                stack.push(index);
                Outcome::StackAction
            }
            Action::PopDiscard => {
                let key = classification.key.expect("PopDiscard must carry a key");
                self.pop_discard(&key);
                Outcome::StackAction
            }
            Action::PopProcess => {
                let key = classification.key.expect("PopProcess must carry a key");
                if let Some(start_index) = self.pop_for_process(&key) {
                    let span = self.rule.process(&events[start_index], event);
                    sink.append(span);
                    Outcome::Paired
                } else {
                    Outcome::UnpairedPop
                }
            }
        };

        if outcome.continues(self.stop_behavior()) {
            Continuation::Continue
        } else {
            Continuation::Stop
        }
    }

    fn stop_behavior(&self) -> StopBehavior {
        self.rule.stop_behavior()
    }

    fn pop_discard(&mut self, key: &EventKey) {
        if let Entry::Occupied(mut entry) = self.pending.entry(key.clone()) {
            let stack = entry.get_mut();
            stack.pop();
            if stack.is_empty() {
                entry.remove();
            }
        }
    }

    /// Pops the top pending start for `key` and returns its input
    /// index, removing the key's stack entirely once it empties.
    /// Returns `None` if there is nothing pending for `key` -- "no
    /// pair emitted", per §4.2.
    fn pop_for_process(&mut self, key: &EventKey) -> Option<usize> {
        match self.pending.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let stack = entry.get_mut();
                let start_index = stack.pop();
                if stack.is_empty() {
                    entry.remove();
                }
                start_index
            }
            Entry::Vacant(_) => None,
        }
    }
}
