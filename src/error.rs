//! Error types for the engine's public contract (§7/§10.1). Domain
//! errors a caller might want to match on get a closed `thiserror`
//! enum, the same granularity the teacher uses for its own domain
//! errors (`StatsError` in `evaluator/stats/mod.rs`, the `Error` enum
//! in `key_val_fs/key_val.rs`). Glue code (config-file loading) uses
//! `anyhow::Result` instead -- see `src/config.rs`.

/// Configuration error: raised at rule construction time (§7.1).
#[derive(thiserror::Error, Debug)]
pub enum RuleConfigError {
    #[error("rule needs at least one of a start-name regex or a start opcode")]
    MissingStartPredicate,
    #[error("rule needs at least one of a stop-name regex or a stop opcode")]
    MissingStopPredicate,
    #[error("invalid start-name regex {pattern:?}: {source}")]
    InvalidStartRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid stop-name regex {pattern:?}: {source}")]
    InvalidStopRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Invariant violation raised by the engine driver at run time (§7.2).
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("event index {index} is out of range for an input of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
