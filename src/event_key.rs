//! `EventKey` -- the composite value identifying a correlation bucket
//! (§3). Carries no reference to the source event; it exists only to
//! group pending starts in a `RuleContext`'s per-key stack map.

use kstring::KString;

/// Five nullable fields, compared structurally: two keys are equal
/// iff all corresponding fields are equal (`None == None`). `derive`d
/// `PartialEq`/`Eq`/`Hash` give exactly that, field by field, which is
/// all the spec requires -- no custom impl needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EventKey {
    pub event_name: Option<KString>,
    pub opcode: Option<KString>,
    pub process: Option<KString>,
    pub thread: Option<KString>,
    pub additional: Vec<Option<KString>>,
}

impl EventKey {
    pub fn builder() -> EventKeyBuilder {
        EventKeyBuilder::default()
    }
}

/// Small builder so `ConfigurableRule::examine` can assemble a key
/// field-by-field per the selected key-field bitset (§4.1) without a
/// long positional constructor call.
#[derive(Default)]
pub struct EventKeyBuilder {
    key: EventKey,
}

impl EventKeyBuilder {
    pub fn event_name(mut self, v: impl Into<KString>) -> Self {
        self.key.event_name = Some(v.into());
        self
    }

    pub fn opcode(mut self, v: impl Into<KString>) -> Self {
        self.key.opcode = Some(v.into());
        self
    }

    pub fn process(mut self, v: impl Into<KString>) -> Self {
        self.key.process = Some(v.into());
        self
    }

    pub fn thread(mut self, v: impl Into<KString>) -> Self {
        self.key.thread = Some(v.into());
        self
    }

    pub fn push_additional(mut self, v: impl Into<KString>) -> Self {
        self.key.additional.push(Some(v.into()));
        self
    }

    pub fn build(self) -> EventKey {
        self.key
    }
}
