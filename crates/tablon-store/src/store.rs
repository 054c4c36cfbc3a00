//! The durable [`Store`] handle.
//!
//! A `Store` owns the authoritative in-memory [`Board`] plus the path of
//! its JSON data file, and guarantees that every successful mutating
//! operation is persisted before it returns. There is exactly one `Store`
//! per serving process; callers that mutate from several tasks must wrap
//! it in a lock so that "mutate + persist" stays one critical section.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Result, StoreError};
use crate::models::Board;
use crate::persist;

/// Default file name of the durable document.
pub const DEFAULT_DATA_FILE: &str = "board.json";

/// Platform-appropriate data directory for the board:
/// - Linux:   `~/.local/share/tablon`
/// - macOS:   `~/Library/Application Support/com.tablon.tablon`
/// - Windows: `{FOLDERID_RoamingAppData}\tablon\tablon\data`
pub fn default_data_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "tablon", "tablon").ok_or(StoreError::NoDataDir)?;
    Ok(project_dirs.data_dir().to_path_buf())
}

/// In-memory board state bound to a durable data file.
pub struct Store {
    board: Board,
    data_file: PathBuf,
}

impl Store {
    /// Open (or seed) the board stored at an explicit path.
    ///
    /// Parent directories are created as needed. A corrupt data file is a
    /// fatal [`StoreError::Corrupt`]; the store never resets it.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let board = persist::load_or_seed(path)?;

        tracing::info!(
            path = %path.display(),
            channels = board.channels.len(),
            "opened board"
        );

        Ok(Self {
            board,
            data_file: path.to_path_buf(),
        })
    }

    /// The board state. Mutation goes through the typed operations in
    /// `channels` / `messages`, never through this reference.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Filesystem path of the data file.
    pub fn path(&self) -> &Path {
        &self.data_file
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Flush the full board to the data file.
    pub(crate) fn save(&self) -> Result<()> {
        persist::save(&self.data_file, &self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_CHANNEL;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn reopen_restores_the_exact_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");

        {
            let mut store = Store::open_at(&path).unwrap();
            let name = store.create_channel().unwrap();
            store
                .post_message(&name, "alice", "still here after restart", None)
                .unwrap();
        }

        let store = Store::open_at(&path).unwrap();
        assert_eq!(store.list_channels(), [DEFAULT_CHANNEL, "Channel #2"]);
        let messages = store.messages_in("Channel #2");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "still here after restart");
    }

    #[test]
    fn failed_save_rolls_the_mutation_back() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let path = data_dir.join("board.json");

        let mut store = Store::open_at(&path).unwrap();
        fs::remove_dir_all(&data_dir).unwrap();

        let err = store
            .post_message(DEFAULT_CHANNEL, "alice", "will not stick", None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.messages_in(DEFAULT_CHANNEL).is_empty());

        assert!(store.create_channel().is_err());
        assert_eq!(store.list_channels(), [DEFAULT_CHANNEL]);
    }

    #[test]
    fn concurrent_posts_lose_no_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let store = Arc::new(Mutex::new(Store::open_at(&path).unwrap()));

        let mut handles = Vec::new();
        for poster in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..5 {
                    store
                        .lock()
                        .unwrap()
                        .post_message(
                            DEFAULT_CHANNEL,
                            &format!("poster-{poster}"),
                            &format!("message {i}"),
                            None,
                        )
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let store = store.lock().unwrap();
        assert_eq!(store.messages_in(DEFAULT_CHANNEL).len(), 40);
    }
}
