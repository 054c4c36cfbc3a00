//! Channel lifecycle operations on the [`Store`].

use tracing::info;

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// All channel names, in creation order.
    pub fn list_channels(&self) -> Vec<String> {
        self.board().channels.names().map(str::to_string).collect()
    }

    /// Whether a channel with this exact name exists.
    pub fn contains_channel(&self, name: &str) -> bool {
        self.board().channels.contains(name)
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Create a new empty channel with an auto-generated name.
    ///
    /// The base name is `"Channel #{count + 1}"`. If that is already taken
    /// (possible after renames), `"{base}-2"`, `"{base}-3"`, … are probed
    /// until a free name is found. The new channel is appended at the end
    /// of the listing order and the board is persisted before the name is
    /// returned.
    pub fn create_channel(&mut self) -> Result<String> {
        let base = format!("Channel #{}", self.board().channels.len() + 1);
        let mut name = base.clone();
        let mut i = 1;
        while self.board().channels.contains(&name) {
            i += 1;
            name = format!("{base}-{i}");
        }

        self.board_mut().channels.push(name.clone(), Vec::new());
        if let Err(e) = self.save() {
            self.board_mut().channels.pop();
            return Err(e);
        }

        info!(channel = %name, "created channel");
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Rename
    // ------------------------------------------------------------------

    /// Rename a channel, carrying its messages over verbatim.
    ///
    /// The old name ceases to exist atomically with the new name's
    /// appearance: from any caller's view there is never a moment with
    /// both, or neither. A renamed channel moves to the end of the listing
    /// order; renaming a channel to its current name is a no-op success.
    pub fn rename_channel(&mut self, old: &str, new: &str) -> Result<()> {
        if old.is_empty() || new.is_empty() {
            return Err(StoreError::EmptyChannelName);
        }
        let Some(index) = self.board().channels.position(old) else {
            return Err(StoreError::ChannelNotFound(old.to_string()));
        };
        if new == old {
            return Ok(());
        }
        if self.board().channels.contains(new) {
            return Err(StoreError::NameTaken(new.to_string()));
        }

        let (_, messages) = self.board_mut().channels.remove_at(index);
        self.board_mut().channels.push(new.to_string(), messages);

        if let Err(e) = self.save() {
            if let Some((_, messages)) = self.board_mut().channels.pop() {
                self.board_mut()
                    .channels
                    .insert_at(index, old.to_string(), messages);
            }
            return Err(e);
        }

        info!(from = %old, to = %new, "renamed channel");
        Ok(())
    }
}
