//! Persisted trade journal: every recorded trade with its detected strategy.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::Path, path::PathBuf};
use tracing::{info, warn};

use crate::classifier::{classify, normalize};
use crate::error::JournalError;
use crate::types::{StoredLeg, StrategyLabel, TradeRecord, TradeSubmission};
use crate::validate::TradeValidator;

/// Group key for trades that carry no legs.
pub const NO_EXPIRATION: &str = "N/A";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Journal {
    /// Last id handed out; ids are never reused.
    #[serde(default)]
    pub last_id: u64,
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
}

impl Journal {
    /// A missing file is an empty journal. An unreadable or malformed one is
    /// an error so a later `save` cannot overwrite the recorded trades.
    pub fn load(path: &Path) -> Result<Self, JournalError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)?;
        let me = serde_json::from_str::<Self>(&s).map_err(|e| {
            warn!("journal {} unreadable: {}", path.display(), e);
            JournalError::Json(e)
        })?;
        Ok(me)
    }

    pub fn save(&self, path: &Path) -> Result<(), JournalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }

    /// Validate, classify and record a trade. Nothing is kept on failure.
    pub fn add(
        &mut self,
        sub: TradeSubmission,
        validator: &TradeValidator,
        attachments_dir: &Path,
    ) -> Result<&TradeRecord, JournalError> {
        validator.pre_check(&sub)?;

        let strategy = classify(&sub.legs)?;
        if strategy.is_data_quality_outcome() {
            return Err(JournalError::Rejected(strategy));
        }
        let legs: Vec<StoredLeg> = normalize(&sub.legs)?
            .ok_or(JournalError::Rejected(StrategyLabel::InvalidExpirationDate))?
            .into_iter()
            .map(StoredLeg::from)
            .collect();

        let id = self.last_id + 1;
        let attachments = copy_attachments(id, &sub.attachments, attachments_dir)?;

        self.last_id = id;
        self.trades.push(TradeRecord {
            id,
            underlying: sub.underlying.trim().to_uppercase(),
            entry_time: sub.entry_time.unwrap_or_else(Utc::now),
            justification: sub.justification,
            strategy,
            legs,
            attachments,
        });
        info!("Recorded trade {} as {}", id, strategy);
        Ok(&self.trades[self.trades.len() - 1])
    }

    pub fn get(&self, id: u64) -> Option<&TradeRecord> {
        self.trades.iter().find(|t| t.id == id)
    }

    /// Newest entry first.
    pub fn list(&self) -> Vec<&TradeRecord> {
        let mut out: Vec<&TradeRecord> = self.trades.iter().collect();
        out.sort_by(|a, b| b.entry_time.cmp(&a.entry_time).then(b.id.cmp(&a.id)));
        out
    }

    /// Trades keyed by their earliest leg expiration (`YYYY-MM-DD`), each
    /// group newest entry first.
    pub fn grouped_by_expiration(&self) -> BTreeMap<String, Vec<&TradeRecord>> {
        let mut groups: BTreeMap<String, Vec<&TradeRecord>> = BTreeMap::new();
        for t in self.list() {
            let key = t
                .earliest_expiration()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| NO_EXPIRATION.to_string());
            groups.entry(key).or_default().push(t);
        }
        groups
    }

    /// Remove a trade. Attachment files are deleted best-effort.
    pub fn delete(&mut self, id: u64) -> Result<TradeRecord, JournalError> {
        let idx = self
            .trades
            .iter()
            .position(|t| t.id == id)
            .ok_or(JournalError::NotFound(id))?;
        let removed = self.trades.remove(idx);
        for path in &removed.attachments {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    warn!("Error deleting attachment {}: {}", path.display(), e);
                }
            }
        }
        info!("Deleted trade {}", id);
        Ok(removed)
    }
}

/// Copy attachments into `dir` as `<id>_<file name>`. A repeated file name
/// gets a counter, `<id>_<n>_<file name>`. On failure the copies made so far
/// are removed.
fn copy_attachments(id: u64, sources: &[PathBuf], dir: &Path) -> Result<Vec<PathBuf>, JournalError> {
    if sources.is_empty() {
        return Ok(Vec::new());
    }
    fs::create_dir_all(dir)?;
    let mut copied: Vec<PathBuf> = Vec::with_capacity(sources.len());
    for src in sources {
        let result = match src.file_name() {
            Some(name) => {
                let name = name.to_string_lossy();
                let mut dest = dir.join(format!("{}_{}", id, name));
                let mut n = 2;
                while copied.contains(&dest) {
                    dest = dir.join(format!("{}_{}_{}", id, n, name));
                    n += 1;
                }
                fs::copy(src, &dest).map(|_| dest).map_err(JournalError::from)
            }
            None => Err(JournalError::Validation(format!(
                "attachment {} has no file name",
                src.display()
            ))),
        };
        match result {
            Ok(dest) => copied.push(dest),
            Err(e) => {
                for p in &copied {
                    let _ = fs::remove_file(p);
                }
                return Err(e);
            }
        }
    }
    Ok(copied)
}
