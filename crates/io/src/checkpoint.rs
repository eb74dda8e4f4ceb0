// Resume state for long matching runs, stored next to the report

use std::path::{Path, PathBuf};

use blake3::Hasher;
use rosterlink_linkage::MatchConfig;
use serde::{Deserialize, Serialize};

use crate::error::IoError;

pub const CHECKPOINT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub registry_fingerprint: String,
    pub external_fingerprint: String,
    pub config_fingerprint: String,
    /// Index of the first external record not yet written.
    pub next_index: usize,
    /// Report length in bytes once the rows before `next_index` were synced.
    #[serde(default)]
    pub report_bytes: u64,
}

impl Checkpoint {
    pub fn new(registry_fingerprint: &str, external_fingerprint: &str, config_fingerprint: &str) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            registry_fingerprint: registry_fingerprint.to_string(),
            external_fingerprint: external_fingerprint.to_string(),
            config_fingerprint: config_fingerprint.to_string(),
            next_index: 0,
            report_bytes: 0,
        }
    }

    /// Names the first input that differs from `current`, if any.
    pub fn mismatch(&self, current: &Checkpoint) -> Option<&'static str> {
        if self.version != current.version {
            Some("checkpoint format")
        } else if self.registry_fingerprint != current.registry_fingerprint {
            Some("registry file")
        } else if self.external_fingerprint != current.external_fingerprint {
            Some("external file")
        } else if self.config_fingerprint != current.config_fingerprint {
            Some("match configuration")
        } else {
            None
        }
    }

    pub fn load(path: &Path) -> Result<Option<Self>, IoError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(IoError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| IoError::Checkpoint(format!("{}: {e}", path.display())))
    }

    /// Write via a temp file and rename so a crash never leaves a torn checkpoint.
    pub fn save(&self, path: &Path) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| IoError::Checkpoint(e.to_string()))?;
        let temp = path.with_extension("json.tmp");
        let write_err = |e: std::io::Error| IoError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        std::fs::write(&temp, json).map_err(write_err)?;
        std::fs::rename(&temp, path).map_err(write_err)
    }
}

/// `report.csv` -> `report.csv.checkpoint.json`
pub fn checkpoint_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".checkpoint.json");
    PathBuf::from(name)
}

pub fn remove(path: &Path) -> Result<(), IoError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IoError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// BLAKE3 hex digest of raw input bytes.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize().to_hex().to_string()
}

pub fn config_fingerprint(config: &MatchConfig) -> Result<String, IoError> {
    let json = serde_json::to_vec(config).map_err(|e| IoError::Checkpoint(e.to_string()))?;
    Ok(fingerprint(&json))
}
