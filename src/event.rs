//! The immutable input/output record of the correlation engine (§3).
//!
//! `Event` is used both for the engine's input (decoded upstream, out
//! of scope here) and for its output: a span is just another `Event`,
//! built by `Rule::process` from a matched start/stop pair.

use kstring::KString;

use crate::time::NanoTime;

/// One trace event. Argument lookup by name is first-occurrence
/// (`argValue` in the spec): `arg_keys`/`arg_values` are kept as
/// parallel ordered vectors rather than a map so that duplicate keys
/// and the iteration order the host decoded them in are preserved
/// faithfully, matching the contract in §3/§6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: KString,
    pub r#type: KString,
    pub category: KString,
    pub process: KString,
    pub thread: KString,
    pub start_timestamp: NanoTime,
    pub end_timestamp: NanoTime,
    pub arg_set_id: i64,
    pub arg_keys: Vec<KString>,
    pub arg_values: Vec<KString>,
}

impl Event {
    /// Instantaneous event: `end_timestamp == start_timestamp`.
    pub fn instantaneous(
        name: impl Into<KString>,
        r#type: impl Into<KString>,
        category: impl Into<KString>,
        process: impl Into<KString>,
        thread: impl Into<KString>,
        timestamp: NanoTime,
        arg_set_id: i64,
        arg_keys: Vec<KString>,
        arg_values: Vec<KString>,
    ) -> Self {
        assert_eq!(
            arg_keys.len(),
            arg_values.len(),
            "argKeys and argValues must have equal length"
        );
        Self {
            name: name.into(),
            r#type: r#type.into(),
            category: category.into(),
            process: process.into(),
            thread: thread.into(),
            start_timestamp: timestamp,
            end_timestamp: timestamp,
            arg_set_id,
            arg_keys,
            arg_values,
        }
    }

    pub fn duration(&self) -> NanoTime {
        self.end_timestamp - self.start_timestamp
    }

    /// First-occurrence lookup by argument name; empty string if absent,
    /// per §6 ("Event accessors consumed").
    pub fn arg_value(&self, key: &str) -> &str {
        self.arg_keys
            .iter()
            .position(|k| k.as_str() == key)
            .map(|i| self.arg_values[i].as_str())
            .unwrap_or("")
    }

    pub fn has_arg_key(&self, key: &str) -> bool {
        self.arg_keys.iter().any(|k| k.as_str() == key)
    }
}

/// The opcode argument key used by the default rule (§4.1).
pub const OPCODE_ARG_KEY: &str = "debug.OPCODE";

#[cfg(test)]
mod tests {
    use super::*;

    fn t(sec: u32) -> NanoTime {
        NanoTime::new(sec, 0).unwrap()
    }

    #[test]
    fn t_arg_value_first_occurrence() {
        let e = Event::instantaneous(
            "A",
            "t",
            "c",
            "P",
            "T",
            t(1),
            0,
            vec!["k".into(), "k".into()],
            vec!["first".into(), "second".into()],
        );
        assert_eq!(e.arg_value("k"), "first");
        assert_eq!(e.arg_value("missing"), "");
        assert!(e.has_arg_key("k"));
        assert!(!e.has_arg_key("missing"));
    }

    #[test]
    fn t_duration() {
        let mut e = Event::instantaneous("A", "t", "c", "P", "T", t(1), 0, vec![], vec![]);
        e.end_timestamp = t(3);
        assert_eq!(e.duration(), NanoTime::new(2, 0).unwrap());
    }

    #[test]
    #[should_panic]
    fn t_mismatched_arg_lengths_panics() {
        Event::instantaneous(
            "A",
            "t",
            "c",
            "P",
            "T",
            t(1),
            0,
            vec!["k".into()],
            vec![],
        );
    }
}
