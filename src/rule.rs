//! `Rule` -- the strategy that classifies events and builds spans
//! (§4.1), plus the default "configurable" rule implementation.

use kstring::KString;
use regex::Regex;

use crate::action::{Action, StopBehavior};
use crate::event::{Event, OPCODE_ARG_KEY};
use crate::event_key::{EventKey, EventKeyBuilder};
use crate::error::RuleConfigError;

/// A rule's classification of one event, returned by `Rule::examine`.
/// The key is present exactly when the action needs one (everything
/// but `None`).
pub struct Classification {
    pub action: Action,
    pub key: Option<EventKey>,
}

impl Classification {
    pub fn none() -> Self {
        Self {
            action: Action::None,
            key: None,
        }
    }

    pub fn with_key(action: Action, key: EventKey) -> Self {
        Self {
            action,
            key: Some(key),
        }
    }
}

/// The strategy pattern of §4.1/§9: a trait with two methods plus the
/// `Action` tagged sum, rather than a class hierarchy.
pub trait Rule {
    fn examine(&self, event: &Event) -> Classification;

    /// Builds a span event from a matched (start, stop) pair. Contract
    /// (§4.1): inherits start's process/thread/type/category/argSetId/
    /// argKeys/argValues; name is `strip_start_stop(start.name)`;
    /// `start_timestamp`/`end_timestamp`/duration as specified in §3.
    fn process(&self, start: &Event, stop: &Event) -> Event;

    fn stop_behavior(&self) -> StopBehavior;
}

/// Which optional fields of the event go into the key, per §4.1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyFields {
    pub event_name: bool,
    pub opcode: bool,
    pub process: bool,
    pub thread: bool,
}

/// One `(startArgKey, stopArgKey)` additional-field pairing (§4.1).
#[derive(Debug, Clone)]
pub struct ArgKeyPair {
    pub start_arg_key: KString,
    pub stop_arg_key: KString,
}

/// The default, data-driven rule of §4.1. Constructed via
/// `ConfigurableRule::new`, which validates the predicates the way
/// rule construction is specified to (§7.1): at least one of
/// (start regex, start opcode), likewise for stop.
pub struct ConfigurableRule {
    start_name_regex: Option<Regex>,
    stop_name_regex: Option<Regex>,
    start_opcode: Option<KString>,
    stop_opcode: Option<KString>,
    key_fields: KeyFields,
    allow_recursion: bool,
    stop_behavior: StopBehavior,
    additional: Vec<ArgKeyPair>,
}

impl ConfigurableRule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start_name_regex: Option<&str>,
        stop_name_regex: Option<&str>,
        start_opcode: Option<impl Into<KString>>,
        stop_opcode: Option<impl Into<KString>>,
        key_fields: KeyFields,
        allow_recursion: bool,
        stop_behavior: StopBehavior,
        additional: Vec<ArgKeyPair>,
    ) -> Result<Self, RuleConfigError> {
        let start_opcode = start_opcode.map(Into::into);
        let stop_opcode = stop_opcode.map(Into::into);

        if start_name_regex.is_none() && start_opcode.is_none() {
            return Err(RuleConfigError::MissingStartPredicate);
        }
        if stop_name_regex.is_none() && stop_opcode.is_none() {
            return Err(RuleConfigError::MissingStopPredicate);
        }

        let start_name_regex = start_name_regex
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| RuleConfigError::InvalidStartRegex {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;
        let stop_name_regex = stop_name_regex
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| RuleConfigError::InvalidStopRegex {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            start_name_regex,
            stop_name_regex,
            start_opcode,
            stop_opcode,
            key_fields,
            allow_recursion,
            stop_behavior,
            additional,
        })
    }

    fn matches_start(&self, event: &Event) -> bool {
        if let Some(re) = &self.start_name_regex {
            if !re.is_match(&event.name) {
                return false;
            }
        }
        if let Some(opcode) = &self.start_opcode {
            if event.arg_value(OPCODE_ARG_KEY) != opcode.as_str() {
                return false;
            }
        }
        self.additional
            .iter()
            .all(|pair| event.has_arg_key(&pair.start_arg_key))
    }

    fn matches_stop(&self, event: &Event) -> bool {
        if let Some(re) = &self.stop_name_regex {
            if !re.is_match(&event.name) {
                return false;
            }
        }
        if let Some(opcode) = &self.stop_opcode {
            if event.arg_value(OPCODE_ARG_KEY) != opcode.as_str() {
                return false;
            }
        }
        self.additional
            .iter()
            .all(|pair| event.has_arg_key(&pair.stop_arg_key))
    }

    fn build_key(&self, event: &Event, additional_from_stop_side: bool) -> EventKey {
        let mut builder = EventKeyBuilder::default();
        if self.key_fields.event_name {
            builder = builder.event_name(event.name.clone());
        }
        if self.key_fields.opcode {
            builder = builder.opcode(event.arg_value(OPCODE_ARG_KEY));
        }
        if self.key_fields.process {
            builder = builder.process(event.process.clone());
        }
        if self.key_fields.thread {
            builder = builder.thread(event.thread.clone());
        }
        for pair in &self.additional {
            let arg_key = if additional_from_stop_side {
                &pair.stop_arg_key
            } else {
                &pair.start_arg_key
            };
            builder = builder.push_additional(event.arg_value(arg_key));
        }
        builder.build()
    }

    /// Removes a trailing `_Start` or `_Stop` suffix, exactly. Earlier
    /// versions of this matcher over-stripped by one extra character;
    /// that bug is fixed here rather than reproduced.
    pub fn strip_start_stop(name: &str) -> &str {
        name.strip_suffix("_Start")
            .or_else(|| name.strip_suffix("_Stop"))
            .unwrap_or(name)
    }
}

/// So a driver can hold a heterogeneous list of rules (e.g. several
/// `ConfigurableRule`s with different parameters, or future rule
/// kinds) as `Vec<RuleContext<Box<dyn Rule>>>`.
impl Rule for Box<dyn Rule> {
    fn examine(&self, event: &Event) -> Classification {
        (**self).examine(event)
    }

    fn process(&self, start: &Event, stop: &Event) -> Event {
        (**self).process(start, stop)
    }

    fn stop_behavior(&self) -> StopBehavior {
        (**self).stop_behavior()
    }
}

impl Rule for ConfigurableRule {
    fn examine(&self, event: &Event) -> Classification {
        // Start predicates are tested before stop predicates (§4.1
        // tie-break; open question 4): a single event can match at
        // most one side of a single rule.
        if self.matches_start(event) {
            let key = self.build_key(event, false);
            let action = if self.allow_recursion {
                Action::Push
            } else {
                Action::Replace
            };
            Classification::with_key(action, key)
        } else if self.matches_stop(event) {
            let key = self.build_key(event, true);
            Classification::with_key(Action::PopProcess, key)
        } else {
            Classification::none()
        }
    }

    fn process(&self, start: &Event, stop: &Event) -> Event {
        Event {
            name: Self::strip_start_stop(&start.name).into(),
            r#type: start.r#type.clone(),
            category: start.category.clone(),
            process: start.process.clone(),
            thread: start.thread.clone(),
            start_timestamp: start.start_timestamp,
            end_timestamp: stop.start_timestamp,
            arg_set_id: start.arg_set_id,
            arg_keys: start.arg_keys.clone(),
            arg_values: start.arg_values.clone(),
        }
    }

    fn stop_behavior(&self) -> StopBehavior {
        self.stop_behavior
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::NanoTime;

    fn t(sec: u32) -> NanoTime {
        NanoTime::new(sec, 0).unwrap()
    }

    fn ev(name: &str, process: &str, thread: &str, sec: u32) -> Event {
        Event::instantaneous(name, "ty", "cat", process, thread, t(sec), 0, vec![], vec![])
    }

    #[test]
    fn t_construction_requires_start_predicate() {
        let err = ConfigurableRule::new(
            None,
            Some("A_Stop"),
            None::<&str>,
            None::<&str>,
            KeyFields::default(),
            false,
            StopBehavior::OnAction,
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, RuleConfigError::MissingStartPredicate));
    }

    #[test]
    fn t_construction_requires_stop_predicate() {
        let err = ConfigurableRule::new(
            Some("A_Start"),
            None,
            None::<&str>,
            None::<&str>,
            KeyFields::default(),
            false,
            StopBehavior::OnAction,
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, RuleConfigError::MissingStopPredicate));
    }

    #[test]
    fn t_invalid_regex_is_rejected() {
        let err = ConfigurableRule::new(
            Some("("),
            Some("A_Stop"),
            None::<&str>,
            None::<&str>,
            KeyFields::default(),
            false,
            StopBehavior::OnAction,
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, RuleConfigError::InvalidStartRegex { .. }));
    }

    #[test]
    fn t_classify_start_then_stop() {
        let rule = ConfigurableRule::new(
            Some("A_Start"),
            Some("A_Stop"),
            None::<&str>,
            None::<&str>,
            KeyFields {
                process: true,
                thread: true,
                ..Default::default()
            },
            false,
            StopBehavior::OnAction,
            vec![],
        )
        .unwrap();

        let start = ev("A_Start", "P", "T", 1);
        let c = rule.examine(&start);
        assert_eq!(c.action, Action::Replace);
        assert!(c.key.is_some());

        let stop = ev("A_Stop", "P", "T", 2);
        let c = rule.examine(&stop);
        assert_eq!(c.action, Action::PopProcess);

        let irrelevant = ev("B", "P", "T", 3);
        let c = rule.examine(&irrelevant);
        assert_eq!(c.action, Action::None);
        assert!(c.key.is_none());
    }

    #[test]
    fn t_recursion_flag_selects_push_vs_replace() {
        let recursive = ConfigurableRule::new(
            Some("A_Start"),
            Some("A_Stop"),
            None::<&str>,
            None::<&str>,
            KeyFields::default(),
            true,
            StopBehavior::OnAction,
            vec![],
        )
        .unwrap();
        let start = ev("A_Start", "P", "T", 1);
        assert_eq!(recursive.examine(&start).action, Action::Push);
    }

    #[test]
    fn t_process_builds_span() {
        let rule = ConfigurableRule::new(
            Some("A_Start"),
            Some("A_Stop"),
            None::<&str>,
            None::<&str>,
            KeyFields::default(),
            false,
            StopBehavior::OnAction,
            vec![],
        )
        .unwrap();
        let start = ev("A_Start", "P", "T", 1);
        let stop = ev("A_Stop", "P", "T", 3);
        let span = rule.process(&start, &stop);
        assert_eq!(span.name.as_str(), "A");
        assert_eq!(span.start_timestamp, t(1));
        assert_eq!(span.end_timestamp, t(3));
        assert_eq!(span.duration(), NanoTime::new(2, 0).unwrap());
        assert_eq!(span.process.as_str(), "P");
        assert_eq!(span.thread.as_str(), "T");
    }

    #[test]
    fn t_strip_start_stop_exact() {
        assert_eq!(ConfigurableRule::strip_start_stop("Foo_Start"), "Foo");
        assert_eq!(ConfigurableRule::strip_start_stop("Foo_Stop"), "Foo");
        assert_eq!(ConfigurableRule::strip_start_stop("Foo"), "Foo");
    }

    #[test]
    fn t_opcode_only_rule() {
        let rule = ConfigurableRule::new(
            None,
            None,
            Some("1"),
            Some("2"),
            KeyFields {
                event_name: true,
                process: true,
                thread: true,
                ..Default::default()
            },
            false,
            StopBehavior::OnAction,
            vec![],
        )
        .unwrap();

        let start = Event::instantaneous(
            "Foo",
            "ty",
            "cat",
            "P",
            "T",
            t(5),
            0,
            vec!["debug.OPCODE".into()],
            vec!["1".into()],
        );
        let c = rule.examine(&start);
        assert_eq!(c.action, Action::Replace);

        let stop = Event::instantaneous(
            "Foo",
            "ty",
            "cat",
            "P",
            "T",
            t(9),
            0,
            vec!["debug.OPCODE".into()],
            vec!["2".into()],
        );
        let c = rule.examine(&stop);
        assert_eq!(c.action, Action::PopProcess);
    }

    #[test]
    fn t_additional_arg_key_pairs_required_and_keyed() {
        let rule = ConfigurableRule::new(
            Some("F_Start"),
            Some("F_Stop"),
            None::<&str>,
            None::<&str>,
            KeyFields {
                process: true,
                ..Default::default()
            },
            true,
            StopBehavior::OnAction,
            vec![ArgKeyPair {
                start_arg_key: "frameId".into(),
                stop_arg_key: "frameId".into(),
            }],
        )
        .unwrap();

        let missing_frame_id =
            Event::instantaneous("F_Start", "ty", "cat", "P", "T", t(1), 0, vec![], vec![]);
        assert_eq!(rule.examine(&missing_frame_id).action, Action::None);

        let with_frame_id = Event::instantaneous(
            "F_Start",
            "ty",
            "cat",
            "P",
            "T",
            t(1),
            0,
            vec!["frameId".into()],
            vec!["2".into()],
        );
        let c = rule.examine(&with_frame_id);
        assert_eq!(c.action, Action::Push);
        let key = c.key.unwrap();
        assert_eq!(key.additional, vec![Some("2".into())]);
    }
}
