//! Best-score record
//!
//! Persisted to LocalStorage as a single JSON blob. The engine never reads it;
//! hosts feed it `Game::score()` after each move and when leaving the game.
//! Other pages may share the blob, so keys this record does not own are kept
//! as they were, and one unreadable field falls back to its default without
//! discarding the rest.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Stored scores for the 2048 game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameRecord {
    /// Highest score ever reached on this device
    #[serde(deserialize_with = "or_default")]
    pub best_score: u64,
    /// Score of the most recent session
    #[serde(deserialize_with = "or_default")]
    pub last_score: u64,
    /// Unix timestamp (ms) of the most recent session, 0 if never played
    #[serde(deserialize_with = "or_default")]
    pub last_played: f64,
    /// Keys written by someone else, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read a field, substituting its default when the stored value has the wrong type
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

impl GameRecord {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "2048_game_data";

    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored blob, treating malformed content as no record
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Ignoring malformed game record: {}", e);
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> String {
        // Numbers and JSON values with string keys always serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Raise the best score if `score` beats it
    /// Returns true if this is a new best
    pub fn update_best(&mut self, score: u64) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }

    /// Fold this record over whatever is currently stored
    ///
    /// Keys owned by someone else come from `stored` unless this record also
    /// carries them; the best score never goes down.
    pub fn merged_over(&self, stored: Self) -> Self {
        let mut extra = stored.extra;
        extra.extend(self.extra.clone());
        Self {
            best_score: self.best_score.max(stored.best_score),
            last_score: self.last_score,
            last_played: self.last_played,
            extra,
        }
    }

    /// Record the end of a session
    /// Returns true if the session set a new best
    pub fn record_session(&mut self, score: u64, timestamp: f64) -> bool {
        self.last_score = score;
        self.last_played = timestamp;
        self.update_best(score)
    }

    /// Load the record from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let record = Self::from_json(&json);
                log::info!("Loaded best score {}", record.best_score);
                return record;
            }
        }

        log::info!("No game record found, starting fresh");
        Self::new()
    }

    /// Save the record to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let stored = match storage.get_item(Self::STORAGE_KEY) {
                Ok(Some(json)) => Self::from_json(&json),
                _ => Self::new(),
            };
            let merged = self.merged_over(stored);
            if storage.set_item(Self::STORAGE_KEY, &merged.to_json()).is_err() {
                log::error!("Error saving best score");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
