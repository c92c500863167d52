use serde::{Deserialize, Serialize};

/// Largest number of chunks a manifest may publish at once.
///
/// The backend keeps roughly two weeks of hourly chunks; anything wider than
/// this is a corrupt manifest and fails to decode.
pub const MAX_PUBLISHED_CHUNKS: u64 = 10_000;

/// Manifest of the key chunks currently published by the backend.
///
/// Chunks are numbered consecutively from `oldest` to `newest`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireKeysIndex")]
pub struct KeysIndex {
    pub oldest: u64,
    pub newest: u64,
}

#[derive(Deserialize)]
struct WireKeysIndex {
    oldest: u64,
    newest: u64,
}

/// A manifest publishing more than [`MAX_PUBLISHED_CHUNKS`] chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("keys index {oldest}..={newest} publishes more than {MAX_PUBLISHED_CHUNKS} chunks")]
pub struct ManifestTooLarge {
    pub oldest: u64,
    pub newest: u64,
}

impl TryFrom<WireKeysIndex> for KeysIndex {
    type Error = ManifestTooLarge;

    fn try_from(wire: WireKeysIndex) -> Result<Self, Self::Error> {
        let index = Self {
            oldest: wire.oldest,
            newest: wire.newest,
        };
        if index.published() > MAX_PUBLISHED_CHUNKS {
            return Err(ManifestTooLarge {
                oldest: index.oldest,
                newest: index.newest,
            });
        }
        Ok(index)
    }
}

impl KeysIndex {
    /// Number of chunks in the manifest; zero when `newest < oldest`.
    pub fn published(&self) -> u64 {
        self.newest
            .checked_sub(self.oldest)
            .map_or(0, |span| span.saturating_add(1))
    }

    /// Chunk numbers newer than `last_downloaded`, oldest first.
    ///
    /// With no previous download every published chunk is returned. A
    /// manifest with `newest < oldest` publishes nothing. At most
    /// [`MAX_PUBLISHED_CHUNKS`] numbers are returned; the rest are picked up
    /// by the next call.
    pub fn chunks_after(&self, last_downloaded: Option<u64>) -> Vec<u64> {
        let start = match last_downloaded {
            Some(last) => last.saturating_add(1).max(self.oldest),
            None => self.oldest,
        };
        if start > self.newest {
            return Vec::new();
        }
        let end = self
            .newest
            .min(start.saturating_add(MAX_PUBLISHED_CHUNKS - 1));
        (start..=end).collect()
    }
}
