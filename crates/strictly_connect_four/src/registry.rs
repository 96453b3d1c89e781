//! Player registry: which identities are connected, and through which handle.

use crate::error::GameError;
use crate::types::Player;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, info, instrument, warn};

/// Two-way mapping between connected players and their connection handles.
///
/// `H` is whatever the transport uses to address a connection. Both
/// directions are updated together, so a handle maps to at most one player
/// and a player to at most one handle.
#[derive(Debug, Clone)]
pub struct PlayerRegistry<H> {
    by_player: HashMap<Player, H>,
    by_handle: HashMap<H, Player>,
}

impl<H> PlayerRegistry<H>
where
    H: Clone + Eq + Hash + Debug,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            by_player: HashMap::new(),
            by_handle: HashMap::new(),
        }
    }

    /// Records `player` as connected through `handle`.
    #[instrument(skip(self))]
    pub fn connect(&mut self, player: Player, handle: H) -> Result<(), GameError> {
        if self.by_player.contains_key(&player) {
            warn!(%player, "Player already connected");
            return Err(GameError::AlreadyConnected(player));
        }
        if let Some(existing) = self.by_handle.get(&handle) {
            warn!(%player, existing = %existing, "Handle already registered");
            return Err(GameError::HandleInUse(*existing));
        }

        self.by_player.insert(player, handle.clone());
        self.by_handle.insert(handle, player);
        info!(%player, connected = self.len(), "Player connected");
        Ok(())
    }

    /// Removes `player` and its handle.
    #[instrument(skip(self))]
    pub fn disconnect_by_player(&mut self, player: Player) -> Result<Player, GameError> {
        let handle = self.by_player.remove(&player).ok_or_else(|| {
            debug!(%player, "Disconnect for unknown player");
            GameError::NotFound
        })?;
        self.by_handle.remove(&handle);
        info!(%player, connected = self.len(), "Player disconnected");
        Ok(player)
    }

    /// Removes the player registered under `handle`.
    #[instrument(skip(self))]
    pub fn disconnect_by_handle(&mut self, handle: &H) -> Result<Player, GameError> {
        let player = self.by_handle.remove(handle).ok_or_else(|| {
            debug!("Disconnect for unknown handle");
            GameError::NotFound
        })?;
        self.by_player.remove(&player);
        info!(%player, connected = self.len(), "Player disconnected");
        Ok(player)
    }

    /// Lists connected players in ascending order.
    pub fn find_all(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.by_player.keys().copied().collect();
        players.sort();
        players
    }

    /// Looks up the player connected through `handle`.
    pub fn find_by_handle(&self, handle: &H) -> Result<Player, GameError> {
        self.by_handle.get(handle).copied().ok_or(GameError::NotFound)
    }

    /// Number of connected players.
    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    /// Returns true when nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }

    /// Returns true when both players are connected.
    pub fn is_full(&self) -> bool {
        self.len() == 2
    }
}

impl<H> Default for PlayerRegistry<H>
where
    H: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_records_both_directions() {
        let mut registry = PlayerRegistry::new();
        registry.connect(Player::One, "a").unwrap();

        assert_eq!(registry.find_by_handle(&"a"), Ok(Player::One));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_all(), vec![Player::One]);
    }

    #[test]
    fn test_connect_twice_rejected() {
        let mut registry = PlayerRegistry::new();
        registry.connect(Player::One, "a").unwrap();

        assert_eq!(
            registry.connect(Player::One, "b"),
            Err(GameError::AlreadyConnected(Player::One))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_by_handle(&"b"), Err(GameError::NotFound));
    }

    #[test]
    fn test_handle_cannot_hold_two_players() {
        let mut registry = PlayerRegistry::new();
        registry.connect(Player::One, "a").unwrap();

        assert_eq!(
            registry.connect(Player::Two, "a"),
            Err(GameError::HandleInUse(Player::One))
        );
        assert_eq!(registry.find_all(), vec![Player::One]);
    }

    #[test]
    fn test_disconnect_by_handle_clears_both_directions() {
        let mut registry = PlayerRegistry::new();
        registry.connect(Player::One, "a").unwrap();
        registry.connect(Player::Two, "b").unwrap();

        assert_eq!(registry.disconnect_by_handle(&"b"), Ok(Player::Two));
        assert_eq!(registry.find_by_handle(&"b"), Err(GameError::NotFound));
        assert_eq!(registry.find_all(), vec![Player::One]);

        // The freed identity can reconnect under a new handle.
        registry.connect(Player::Two, "c").unwrap();
        assert!(registry.is_full());
    }

    #[test]
    fn test_disconnect_unknown_player_leaves_size() {
        let mut registry = PlayerRegistry::new();
        registry.connect(Player::One, "a").unwrap();

        assert_eq!(
            registry.disconnect_by_player(Player::Two),
            Err(GameError::NotFound)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find_all_is_sorted() {
        let mut registry = PlayerRegistry::new();
        registry.connect(Player::Two, "b").unwrap();
        registry.connect(Player::One, "a").unwrap();
        assert_eq!(registry.find_all(), vec![Player::One, Player::Two]);
    }
}
