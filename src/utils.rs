//! Small helpers.

use chrono::NaiveDate;
use directories::ProjectDirs;
use std::path::PathBuf;

pub fn sanitize_symbol(sym: &str) -> String {
    sym.trim().to_uppercase()
}

/// Parse an ISO `YYYY-MM-DD` expiration. Surrounding whitespace is ignored.
pub fn parse_expiration(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Map the short `C`/`P` suffix of quick-entry notation to the full name.
pub fn option_type_word(s: &str) -> Option<&'static str> {
    match s.trim().to_ascii_uppercase().as_str() {
        "C" | "CALL" => Some("CALL"),
        "P" | "PUT" => Some("PUT"),
        _ => None,
    }
}

fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", "options-journal")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn default_journal_path() -> PathBuf {
    data_dir().join("journal.json")
}

pub fn default_attachments_dir() -> PathBuf {
    data_dir().join("attachments")
}
