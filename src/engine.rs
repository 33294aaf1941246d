//! The top-level driver (§4.3): one sequential pass over the finalized
//! input sequence, offering each event to every `RuleContext` in
//! order and respecting each rule's stop behavior.

use crate::event::Event;
use crate::rule::Rule;
use crate::rule_context::{Continuation, RuleContext};
use crate::sink::OutputSink;
use crate::error::EngineError;

pub struct Engine<R: Rule> {
    contexts: Vec<RuleContext<R>>,
}

impl<R: Rule> Engine<R> {
    /// `rules` is in driver-significant order (§4.3): the only way to
    /// express "try this specialization before the fallback."
    pub fn new(rules: Vec<R>) -> Self {
        Self {
            contexts: rules.into_iter().map(RuleContext::new).collect(),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.contexts.len()
    }

    /// Runs one full pass over `events`, returning a finalized
    /// `OutputSink`. §5: single-threaded, single pass, increasing
    /// index order; cannot be resumed or cancelled.
    pub fn run(&mut self, events: &[Event]) -> Result<OutputSink, EngineError> {
        let mut sink = OutputSink::new();
        for index in 0..events.len() {
            self.process_index(events, index, &mut sink)?;
        }
        sink.finalize();
        for (rule_index, context) in self.contexts.iter().enumerate() {
            let leftover = context.pending_start_count();
            if leftover > 0 {
                crate::debug!(
                    "rule {rule_index}: discarding {leftover} unmatched pending start(s) at end of run"
                );
            }
        }
        Ok(sink)
    }

    /// Offers `events[index]` to each `RuleContext` in order, stopping
    /// early for this index as soon as one context reports `Stop`
    /// (§4.3 step 2).
    fn process_index(
        &mut self,
        events: &[Event],
        index: usize,
        sink: &mut OutputSink,
    ) -> Result<(), EngineError> {
        if index >= events.len() {
            return Err(EngineError::IndexOutOfRange {
                index,
                len: events.len(),
            });
        }
        for context in &mut self.contexts {
            if context.process_event(events, index, sink) == Continuation::Stop {
                break;
            }
        }
        Ok(())
    }
}
