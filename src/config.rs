//! Loading a rule list from a JSON5 configuration file (§10.2). A rule
//! list is ordinary `serde`-deserializable data, so this follows the
//! teacher's generic config-loading pattern in `load_config_file.rs`
//! (`try_load_json_file`, `Result<Option<T>>` for "file not found"),
//! generalized to the single thing this crate ever loads: a
//! `Vec<RuleConfig>`.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::json5_from_str::json5_from_str;
use crate::rule::{ArgKeyPair, ConfigurableRule, KeyFields};
use crate::action::StopBehavior;
use crate::error::RuleConfigError;

/// The `serde`-deserializable shape of one `[MODULE] Rule` (§4.1).
/// Mirrors `ConfigurableRule`'s constructor parameters field-for-field
/// so that loading is just "deserialize, then build."
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// At least one of `start_name_regex`/`start_opcode` must be given
    /// (§4.1, §7.1).
    #[serde(default)]
    pub start_name_regex: Option<String>,
    #[serde(default)]
    pub stop_name_regex: Option<String>,
    #[serde(default)]
    pub start_opcode: Option<String>,
    #[serde(default)]
    pub stop_opcode: Option<String>,

    #[serde(default)]
    pub key_event_name: bool,
    #[serde(default)]
    pub key_opcode: bool,
    #[serde(default)]
    pub key_process: bool,
    #[serde(default)]
    pub key_thread: bool,

    #[serde(default)]
    pub allow_recursion: bool,

    pub stop_behavior: StopBehaviorConfig,

    #[serde(default)]
    pub additional_key_fields: Vec<ArgKeyPairConfig>,
}

/// `serde`-friendly mirror of `StopBehavior` -- kept separate so the
/// wire format can spell out the four names without relying on the
/// enum's internal variant order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBehaviorConfig {
    OnMatch,
    OnAction,
    OnProcess,
    Never,
}

impl From<StopBehaviorConfig> for StopBehavior {
    fn from(value: StopBehaviorConfig) -> Self {
        match value {
            StopBehaviorConfig::OnMatch => StopBehavior::OnMatch,
            StopBehaviorConfig::OnAction => StopBehavior::OnAction,
            StopBehaviorConfig::OnProcess => StopBehavior::OnProcess,
            StopBehaviorConfig::Never => StopBehavior::Never,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgKeyPairConfig {
    pub start_arg_key: String,
    pub stop_arg_key: String,
}

impl RuleConfig {
    /// Builds the live `ConfigurableRule`, compiling its regexes and
    /// checking predicate presence (§7.1 construction-time errors).
    pub fn build(&self) -> Result<ConfigurableRule, RuleConfigError> {
        let key_fields = KeyFields {
            event_name: self.key_event_name,
            opcode: self.key_opcode,
            process: self.key_process,
            thread: self.key_thread,
        };
        let additional = self
            .additional_key_fields
            .iter()
            .map(|pair| ArgKeyPair {
                start_arg_key: pair.start_arg_key.as_str().into(),
                stop_arg_key: pair.stop_arg_key.as_str().into(),
            })
            .collect();
        ConfigurableRule::new(
            self.start_name_regex.as_deref(),
            self.stop_name_regex.as_deref(),
            self.start_opcode.as_deref(),
            self.stop_opcode.as_deref(),
            key_fields,
            self.allow_recursion,
            self.stop_behavior.into(),
            additional,
        )
    }
}

/// Returns `None` if the file does not exist, mirroring the teacher's
/// `try_load_json_file`.
pub fn try_load_json5_str<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(s) => {
            let value = json5_from_str(&s).map_err(ctx!("decoding JSON5 from config file {path:?}"))?;
            Ok(Some(value))
        }
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(None),
            _ => bail!("loading config file from {path:?}: {e}"),
        },
    }
}

/// Loads a rule list from a JSON5 file and builds every rule,
/// returning the first construction error with its index for context.
pub fn load_rules_from_file(path: &Path) -> Result<Vec<ConfigurableRule>> {
    let configs: Vec<RuleConfig> = try_load_json5_str(path)?
        .ok_or_else(|| anyhow!("rule config file {path:?} does not exist"))?;
    configs
        .iter()
        .enumerate()
        .map(|(index, config)| {
            config
                .build()
                .with_context(|| format!("building rule #{index} from {path:?}"))
        })
        .collect()
}
