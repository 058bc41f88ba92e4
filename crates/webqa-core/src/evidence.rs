//! Evidence bundles: one directory per run holding transcript, report and
//! optional screenshots.
//!
//! Directory names carry a wall-clock timestamp plus a random suffix, so two
//! runs inside the same second still get distinct bundles. Writes truncate:
//! re-writing the same file name inside one bundle is last-write-wins.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use rand::Rng;
use tracing::{debug, info};

use crate::error::QaError;

pub struct EvidenceBundle {
    dir: PathBuf,
    timestamp: String,
}

impl EvidenceBundle {
    /// Create `<root>/teste_<label>_<YYYYMMDD_HHMMSS>_<rand>` (and the root
    /// itself if absent).
    pub fn create(root: &Path, label: &str) -> Result<Self, QaError> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let suffix: u16 = rand::thread_rng().gen();
        let dir = root.join(format!("teste_{}_{}_{:04x}", label, timestamp, suffix));
        fs::create_dir_all(&dir)?;
        info!("Evidence bundle: {}", dir.display());
        Ok(Self { dir, timestamp })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Timestamp shared by all file names in this bundle.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Write a UTF-8 text file `<name>.txt` and return its path.
    pub fn write_text(&self, name: &str, content: &str) -> Result<PathBuf, QaError> {
        let path = self.dir.join(format!("{}.txt", name));
        fs::write(&path, content)?;
        debug!("Evidence saved: {}", path.display());
        Ok(path)
    }

    /// Decode a base64 screenshot payload and write `<name>.png`.
    pub fn write_screenshot(&self, name: &str, payload: &str) -> Result<PathBuf, QaError> {
        let bytes = decode_screenshot(payload)?;
        let path = self.dir.join(format!("{}.png", name));
        fs::write(&path, bytes)?;
        debug!("Screenshot saved: {}", path.display());
        Ok(path)
    }
}

/// Decode a base64 image payload, stripping an optional
/// `data:image/...;base64,` prefix first.
pub fn decode_screenshot(payload: &str) -> Result<Vec<u8>, QaError> {
    let raw = match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => payload,
    };
    STANDARD
        .decode(raw.trim())
        .map_err(|e| QaError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
