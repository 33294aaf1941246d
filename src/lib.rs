//! A configurable, stack-based, multi-rule event-correlation engine:
//! matches "start"/"stop" trace events into "span" events for a
//! performance-trace analysis host.
//!
//! The engine itself ([`engine::Engine`]) is a single-threaded,
//! single-pass driver over a finalized input sequence; all mutable
//! matching state lives in one [`rule_context::RuleContext`] per
//! configured [`rule::Rule`].

#[macro_use]
pub mod utillib;
#[macro_use]
pub mod ctx;

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod event_key;
pub mod json5_from_str;
pub mod rule;
pub mod rule_context;
pub mod sink;
pub mod time;

pub use action::{Action, Outcome, StopBehavior};
pub use config::RuleConfig;
pub use engine::Engine;
pub use error::{EngineError, RuleConfigError};
pub use event::Event;
pub use event_key::EventKey;
pub use rule::{ConfigurableRule, Rule};
pub use sink::OutputSink;
pub use time::NanoTime;
