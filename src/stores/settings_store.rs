//! Persisted user settings: skin tone preference and emoji history.
//!
//! Backed by `localStorage` through `gloo-storage`. Reads fall back to
//! defaults when a key is absent or fails to deserialize, so a broken or
//! empty store can never keep the picker from rendering.

use gloo_storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

use crate::stores::emoji_store::{self, Emoji};

const SKINTONE_KEY: &str = "emojikey_color";
const HISTORY_KEY: &str = "emojikey_history";

/// Maximum number of remembered emoji insertions.
pub const HISTORY_LIMIT: usize = 15;

/// Serialized form of a history entry. Resolved back to the static table
/// by codepoint sequence on read; entries that no longer resolve are
/// dropped silently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredEmoji {
    pub name: String,
    pub hex: String,
}

impl From<&Emoji> for StoredEmoji {
    fn from(e: &Emoji) -> Self {
        StoredEmoji {
            name: e.name.to_string(),
            hex: e.hex.to_string(),
        }
    }
}

/// Ensure the history key exists and holds a deserializable list,
/// resetting it to empty otherwise. Called once on load.
pub fn init_history() {
    if LocalStorage::get::<Vec<StoredEmoji>>(HISTORY_KEY).is_err() {
        log::info!("Initializing empty emoji history");
        LocalStorage::set(HISTORY_KEY, Vec::<StoredEmoji>::new()).ok();
    }
}

/// The selected skin tone identifier, defaulting to "yellow" (no
/// modifier).
pub fn skintone() -> String {
    LocalStorage::get::<String>(SKINTONE_KEY).unwrap_or_else(|_| "yellow".to_string())
}

pub fn set_skintone(color: &str) {
    if let Err(e) = LocalStorage::set(SKINTONE_KEY, color) {
        log::warn!("Failed to persist skin tone: {:?}", e);
    }
}

/// History entries resolved against the static emoji table,
/// most-recent-first.
pub fn history() -> Vec<&'static Emoji> {
    LocalStorage::get::<Vec<StoredEmoji>>(HISTORY_KEY)
        .unwrap_or_default()
        .iter()
        .filter_map(|stored| emoji_store::find_by_hex(&stored.hex))
        .collect()
}

/// Record an insertion. A repeat moves the entry to the front instead of
/// duplicating it; the list never grows past [`HISTORY_LIMIT`].
pub fn push_history(emoji: &Emoji) {
    let current = LocalStorage::get::<Vec<StoredEmoji>>(HISTORY_KEY).unwrap_or_default();
    let updated = push_front_dedup(current, StoredEmoji::from(emoji));

    if let Err(e) = LocalStorage::set(HISTORY_KEY, updated) {
        log::warn!("Failed to persist emoji history: {:?}", e);
    }
}

pub fn clear_history() {
    LocalStorage::set(HISTORY_KEY, Vec::<StoredEmoji>::new()).ok();
}

fn push_front_dedup(history: Vec<StoredEmoji>, entry: StoredEmoji) -> Vec<StoredEmoji> {
    let mut updated = vec![entry.clone()];
    updated.extend(
        history
            .into_iter()
            .filter(|e| e.hex != entry.hex)
            .take(HISTORY_LIMIT - 1),
    );
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(hex: &str) -> StoredEmoji {
        StoredEmoji {
            name: format!("name-{hex}"),
            hex: hex.to_string(),
        }
    }

    #[test]
    fn push_front_dedup_prepends_new_entry() {
        let history = vec![stored("a"), stored("b")];
        let updated = push_front_dedup(history, stored("c"));
        let order: Vec<&str> = updated.iter().map(|e| e.hex.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn push_front_dedup_moves_repeat_to_front_without_duplicating() {
        let history = vec![stored("a"), stored("b"), stored("c")];
        let updated = push_front_dedup(history, stored("b"));
        let order: Vec<&str> = updated.iter().map(|e| e.hex.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn push_front_dedup_caps_length() {
        let history: Vec<StoredEmoji> =
            (0..HISTORY_LIMIT + 5).map(|i| stored(&format!("{i}"))).collect();
        let updated = push_front_dedup(history, stored("new"));
        assert_eq!(updated.len(), HISTORY_LIMIT);
        assert_eq!(updated[0].hex, "new");
    }
}
