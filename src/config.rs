//! Load and validate runtime configuration.

use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::utils::{default_attachments_dir, default_journal_path};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JournalCfg {
    pub path: PathBuf,
    pub flush_interval_sec: u64,
}

impl Default for JournalCfg {
    fn default() -> Self {
        Self {
            path: default_journal_path(),
            flush_interval_sec: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AttachmentsCfg {
    pub dir: PathBuf,
}

impl Default for AttachmentsCfg {
    fn default() -> Self {
        Self {
            dir: default_attachments_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IngestCfg {
    pub dry_run: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ValidationCfg {
    pub max_legs: Option<usize>,
    pub require_positive_premium: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub journal: JournalCfg,
    pub attachments: AttachmentsCfg,
    pub ingest: IngestCfg,
    pub validation: ValidationCfg,
}

impl AppConfig {
    /// A missing file means built-in defaults; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Self = serde_yaml::from_str(&s)
            .with_context(|| format!("parse config {}", path.display()))?;
        if cfg.journal.flush_interval_sec == 0 {
            anyhow::bail!("journal.flush_interval_sec must be at least 1");
        }
        Ok(cfg)
    }
}
