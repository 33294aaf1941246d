//! A timestamp type for "integer nanoseconds since trace origin":
//! split into whole seconds plus a sub-second remainder so that
//! addition/subtraction can be checked instead of silently wrapping,
//! and so the non-negative-duration invariant of spans
//! (`end - start >= 0`) is enforced by the type rather than by
//! convention.

use std::fmt::Display;
use std::ops::{Add, Sub};

use num_traits::CheckedSub;
use serde::{Deserialize, Serialize};

const NSEC_PER_SEC: u32 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NanoTime {
    sec: u32,
    nsec: u32,
}

impl NanoTime {
    /// Panics if `nsec` is not within range. XX how better with serde?
    pub fn check(self) {
        assert!(self.is_valid())
    }

    pub fn is_valid(self) -> bool {
        self.nsec < NSEC_PER_SEC
    }

    pub fn new(sec: u32, nsec: u32) -> Option<Self> {
        let slf = Self { sec, nsec };
        if slf.is_valid() {
            Some(slf)
        } else {
            None
        }
    }

    pub fn sec(self) -> u32 {
        self.sec
    }

    pub fn nsec(self) -> u32 {
        self.nsec
    }

    pub fn from_nanos(nanos: u64) -> Option<Self> {
        let sec = nanos / u64::from(NSEC_PER_SEC);
        let nsec = nanos % u64::from(NSEC_PER_SEC);
        Some(Self {
            sec: sec.try_into().ok()?,
            nsec: nsec.try_into().expect("always in range"),
        })
    }

    pub fn to_nanos(self) -> u64 {
        u64::from(self.sec) * u64::from(NSEC_PER_SEC) + u64::from(self.nsec)
    }
}

/// Assumes nanoseconds. Panics for values outside the representable range!
impl From<u64> for NanoTime {
    fn from(value: u64) -> Self {
        Self::from_nanos(value).expect("outside representable range")
    }
}

impl From<NanoTime> for u64 {
    fn from(value: NanoTime) -> Self {
        value.to_nanos()
    }
}

impl Add for NanoTime {
    type Output = NanoTime;

    fn add(self, rhs: Self) -> Self::Output {
        let nsec = self.nsec + rhs.nsec;
        if nsec >= NSEC_PER_SEC {
            Self {
                sec: self.sec + rhs.sec + 1,
                nsec: nsec - NSEC_PER_SEC,
            }
        } else {
            Self {
                sec: self.sec + rhs.sec,
                nsec,
            }
        }
    }
}

impl Sub for NanoTime {
    type Output = NanoTime;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(&rhs)
            .expect("duration must be non-negative (non-decreasing input timestamps)")
    }
}

impl CheckedSub for NanoTime {
    fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        let sec = self.sec.checked_sub(rhs.sec)?;
        match self.nsec.checked_sub(rhs.nsec) {
            Some(nsec) => Some(Self { sec, nsec }),
            None => {
                let sec = sec.checked_sub(1)?;
                Some(Self {
                    sec,
                    nsec: (self.nsec + NSEC_PER_SEC) - rhs.nsec,
                })
            }
        }
    }
}

impl Display for NanoTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self { sec, nsec } = *self;
        write!(f, "{sec}.{nsec:09}s")
    }
}
