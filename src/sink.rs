//! `OutputSink` -- the append-only span sequence of §4.4, grounded on
//! `evobench-tools/src/evaluator/data/log_data_tree.rs`'s
//! `add_span`/`spans: Vec<Span>` append-then-index pattern, but with
//! an explicit finalize step: the teacher builds its span vector once
//! and queries it immediately afterwards, so it never needed to make
//! the "read-only after finalize" invariant checkable. This crate's
//! sink separates "being built" from "finalized" so that invariant is
//! enforced rather than implied.

use crate::event::Event;

#[derive(Debug, Default)]
pub struct OutputSink {
    spans: Vec<Event>,
    finalized: bool,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a span in emission order. Panics if called after
    /// `finalize` -- a caller bug, since the engine driver is the only
    /// thing that appends and it never does so after finalizing.
    pub fn append(&mut self, span: Event) {
        assert!(!self.finalized, "cannot append to a finalized OutputSink");
        self.spans.push(span);
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.spans.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.spans.iter()
    }

    pub fn into_vec(self) -> Vec<Event> {
        self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::NanoTime;

    fn span(sec: u32) -> Event {
        Event::instantaneous(
            "A",
            "ty",
            "cat",
            "P",
            "T",
            NanoTime::new(sec, 0).unwrap(),
            0,
            vec![],
            vec![],
        )
    }

    #[test]
    fn t_append_and_finalize() {
        let mut sink = OutputSink::new();
        sink.append(span(1));
        sink.append(span(2));
        assert_eq!(sink.len(), 2);
        sink.finalize();
        assert!(sink.is_finalized());
        assert_eq!(sink.get(0).unwrap().start_timestamp, NanoTime::new(1, 0).unwrap());
    }

    #[test]
    #[should_panic]
    fn t_append_after_finalize_panics() {
        let mut sink = OutputSink::new();
        sink.finalize();
        sink.append(span(1));
    }

    #[test]
    fn t_empty_sink() {
        let sink = OutputSink::new();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
    }
}
