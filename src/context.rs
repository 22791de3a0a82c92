use std::sync::Arc;

use anyhow::Result;
use chrono::{FixedOffset, Utc};

use crate::config::AppConfig;
use crate::core::RenderOptions;

/// Shared, immutable state handed to the RPC handlers and CLI commands.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    utc_offset: FixedOffset,
}

impl AppContext {
    /// Validates the parts of the config that can only be checked at runtime.
    pub fn new(config: AppConfig) -> Result<Self> {
        let utc_offset = config.utc_offset()?;
        Ok(Self {
            config: Arc::new(config),
            utc_offset,
        })
    }

    /// Render options for a request arriving now.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            labels: self.config.label_options(),
            utc_offset: self.utc_offset,
            file_size_base: self.config.file_size_base,
            now: Utc::now(),
        }
    }
}
