use serde::{Deserialize, Serialize};

use vellum_types::DigestPrefix;

use crate::error::{PersistError, PersistResult};

/// Payload compression applied before encryption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Compression {
    Off,
    Zstd { level: i32 },
}

/// Configuration for saving and opening documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Hex characters of the digest carried in file names.
    pub prefix_len: usize,
    pub compression: Compression,
    /// Refuse to save without a session password.
    pub require_encryption: bool,
    /// Commit message used when a save does not supply one.
    pub default_commit_message: String,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            prefix_len: DigestPrefix::DEFAULT_LEN,
            compression: Compression::Zstd { level: 3 },
            require_encryption: false,
            default_commit_message: "save".into(),
        }
    }
}

impl PersistConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> PersistResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| PersistError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> PersistResult<String> {
        toml::to_string(self).map_err(|e| PersistError::Config(e.to_string()))
    }

    pub fn validate(&self) -> PersistResult<()> {
        if !(DigestPrefix::MIN_LEN..=DigestPrefix::MAX_LEN).contains(&self.prefix_len) {
            return Err(PersistError::Config(format!(
                "prefix_len {} outside {}..={}",
                self.prefix_len,
                DigestPrefix::MIN_LEN,
                DigestPrefix::MAX_LEN
            )));
        }
        if let Compression::Zstd { level } = self.compression {
            if !(1..=22).contains(&level) {
                return Err(PersistError::Config(format!(
                    "zstd level {level} outside 1..=22"
                )));
            }
        }
        if self.default_commit_message.trim().is_empty() {
            return Err(PersistError::Config(
                "default_commit_message must not be blank".into(),
            ));
        }
        Ok(())
    }
}
