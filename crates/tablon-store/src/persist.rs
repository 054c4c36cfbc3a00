//! Full-file JSON persistence for the [`Board`].
//!
//! The whole board is rewritten on every mutation. That is intentional
//! simplicity: the expected data volume is a handful of channels with short
//! message lists, and a single document keeps reload trivial. Writes go to
//! `<file>.tmp` first and are renamed into place, so a crash mid-write
//! leaves the previous document intact.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::models::Board;

/// Load the board from `path`, seeding the file on first start.
///
/// A missing file yields the seed state (one default channel), written out
/// immediately so the next start finds it. A file that exists but does not
/// parse is fatal: the caller must abort rather than reset state.
pub(crate) fn load_or_seed(path: &Path) -> Result<Board> {
    if !path.exists() {
        let board = Board::seed();
        save(path, &board)?;
        return Ok(board);
    }

    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize the full board to `path`, replacing any previous content.
pub(crate) fn save(path: &Path, board: &Board) -> Result<()> {
    let json = serde_json::to_vec_pretty(board)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    tracing::debug!(path = %path.display(), "board saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelMap, Message, DEFAULT_CHANNEL};
    use chrono::Utc;

    fn board_with_content() -> Board {
        let mut channels = ChannelMap::default();
        channels.push(
            "General".to_string(),
            vec![
                Message {
                    sender: "alice".to_string(),
                    body: "first".to_string(),
                    timestamp: Utc::now(),
                    attachment: None,
                },
                Message {
                    sender: "bob".to_string(),
                    body: String::new(),
                    timestamp: Utc::now(),
                    attachment: Some("20260807120000000000_notes.txt".to_string()),
                },
            ],
        );
        channels.push("Random".to_string(), Vec::new());
        Board { channels }
    }

    #[test]
    fn missing_file_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");

        let board = load_or_seed(&path).unwrap();
        assert!(path.exists(), "seed state should be written out");
        assert!(board.channels.contains(DEFAULT_CHANNEL));
    }

    #[test]
    fn corrupt_file_is_a_typed_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "{not json").unwrap();

        match load_or_seed(&path) {
            Err(StoreError::Corrupt { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn save_load_round_trip_preserves_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let board = board_with_content();

        save(&path, &board).unwrap();
        let reloaded = load_or_seed(&path).unwrap();

        assert_eq!(reloaded, board);
        let names: Vec<&str> = reloaded.channels.names().collect();
        assert_eq!(names, ["General", "Random"]);
    }

    #[test]
    fn save_is_a_full_overwrite_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");

        save(&path, &board_with_content()).unwrap();
        save(&path, &Board::seed()).unwrap();

        let reloaded = load_or_seed(&path).unwrap();
        assert_eq!(reloaded, Board::seed());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
