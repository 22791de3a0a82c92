//! Layered configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML file
//! (`bkview.toml`, or the path in `BKVIEW_CONFIG`), `BKVIEW_*` environment
//! variables, then whatever command-line arguments were given.

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::core::{LabelOptions, RunningLabel, SizeBase, WaitingLabel};

pub const DEFAULT_CONFIG_FILE: &str = "bkview.toml";
pub const CONFIG_PATH_ENV: &str = "BKVIEW_CONFIG";
pub const ENV_PREFIX: &str = "BKVIEW_";
pub const DEFAULT_RPC_PORT: u16 = 9102;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the JSON-RPC decode service listens on
    pub rpc_bind: SocketAddr,
    pub verbose: bool,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Label for jobs in state `C`
    pub waiting_label: WaitingLabel,
    /// Label for the running sub-phases
    pub running_label: RunningLabel,
    /// Offset of the director's clock from UTC, for `lastwritten`
    pub utc_offset_minutes: i32,
    /// Units for file sizes in the browse tree
    pub file_size_base: SizeBase,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_RPC_PORT)),
            verbose: false,
            json_logs: false,
            waiting_label: WaitingLabel::default(),
            running_label: RunningLabel::default(),
            utc_offset_minutes: 0,
            file_size_base: SizeBase::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration, applying `overrides` (usually parsed CLI
    /// arguments with unset fields skipped) last.
    pub fn new<T: Serialize>(overrides: Option<&T>) -> Result<Self> {
        Self::figment(overrides)
            .extract()
            .context("Failed to load configuration")
    }

    pub fn figment<T: Serialize>(overrides: Option<&T>) -> Figment {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX));

        match overrides {
            Some(overrides) => figment.merge(Serialized::defaults(overrides)),
            None => figment,
        }
    }

    pub fn label_options(&self) -> LabelOptions {
        LabelOptions {
            waiting_label: self.waiting_label,
            running_label: self.running_label,
        }
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            anyhow!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )
        })
    }

    /// Render as TOML, for the `config` subcommand.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
