//! Follow-on transitions triggered by registry changes and drops.
//!
//! The coordinator owns no state. It reads the registry and the session,
//! applies whatever transition their combination calls for, and returns
//! the events to broadcast to everyone.

use crate::protocol::GameEvent;
use std::fmt::Debug;
use std::hash::Hash;
use strictly_connect_four::{GameSession, PlayerRegistry};
use tracing::{info, instrument, warn};

/// Reaction logic bridging [`PlayerRegistry`] and [`GameSession`].
pub struct Coordinator;

impl Coordinator {
    /// Reacts to a connect or disconnect.
    ///
    /// With both players present the game becomes eligible (once). With
    /// fewer, eligibility is withdrawn and a started game is ended. The two
    /// branches never fire for the same change.
    #[instrument(skip_all, fields(connected = registry.len()))]
    pub fn after_registry_change<H>(
        registry: &PlayerRegistry<H>,
        session: &mut GameSession,
    ) -> Vec<GameEvent>
    where
        H: Clone + Eq + Hash + Debug,
    {
        let mut events = Vec::new();

        if registry.is_full() {
            if !session.is_enabled() {
                session.enable();
                info!("Both players present, game eligible");
                events.push(GameEvent::EligibilityEnabled { enabled: true });
            }
            return events;
        }

        if session.is_enabled() {
            session.disable();
            events.push(GameEvent::EligibilityDisabled { enabled: false });
        }
        if session.is_started() {
            match session.end() {
                Ok(ended) => {
                    info!("Player left mid-game, game ended");
                    events.push(GameEvent::GameEnded(ended));
                }
                Err(e) => warn!(error = %e, "Failed to end game after disconnect"),
            }
        }
        events
    }

    /// Reacts to a successful drop: a win or a full grid ends the game.
    #[instrument(skip_all)]
    pub fn after_drop(session: &mut GameSession) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if session.is_winning() {
            if let Some(winner) = session.last_winner() {
                info!(%winner, "Game won");
                events.push(GameEvent::GameWin { identity: winner });
            }
        } else if session.is_draw() {
            info!("Grid full, game drawn");
            events.push(GameEvent::GameDraw {});
        } else {
            return events;
        }

        match session.end() {
            Ok(ended) => events.push(GameEvent::GameEnded(ended)),
            Err(e) => warn!(error = %e, "Failed to end finished game"),
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_connect_four::Player;

    fn count_enabled(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::EligibilityEnabled { .. }))
            .count()
    }

    #[test]
    fn test_single_player_never_eligible() {
        let mut registry = PlayerRegistry::new();
        let mut session = GameSession::new();

        registry.connect(Player::One, 1u32).unwrap();
        let events = Coordinator::after_registry_change(&registry, &mut session);

        assert!(events.is_empty());
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_second_player_enables_once() {
        let mut registry = PlayerRegistry::new();
        let mut session = GameSession::new();

        registry.connect(Player::One, 1u32).unwrap();
        let mut events = Coordinator::after_registry_change(&registry, &mut session);
        registry.connect(Player::Two, 2u32).unwrap();
        events.extend(Coordinator::after_registry_change(&registry, &mut session));
        // A spurious second notification must not re-announce.
        events.extend(Coordinator::after_registry_change(&registry, &mut session));

        assert_eq!(count_enabled(&events), 1);
        assert!(session.is_enabled());
    }

    #[test]
    fn test_disconnect_during_game_ends_it_once() {
        let mut registry = PlayerRegistry::new();
        let mut session = GameSession::new();
        registry.connect(Player::One, 1u32).unwrap();
        registry.connect(Player::Two, 2u32).unwrap();
        Coordinator::after_registry_change(&registry, &mut session);
        session.start().unwrap();

        registry.disconnect_by_player(Player::Two).unwrap();
        let events = Coordinator::after_registry_change(&registry, &mut session);

        assert_eq!(
            events,
            vec![
                GameEvent::EligibilityDisabled { enabled: false },
                GameEvent::GameEnded(strictly_connect_four::Ended { ended: true }),
            ]
        );
        assert!(!session.is_started());
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_ordinary_drop_emits_nothing() {
        let mut session = GameSession::new();
        session.start().unwrap();
        session.play(Player::One, 0).unwrap();

        assert!(Coordinator::after_drop(&mut session).is_empty());
        assert!(session.is_started());
    }

    #[test]
    fn test_winning_drop_announces_then_ends() {
        let mut session = GameSession::new();
        session.start().unwrap();
        for column in [0, 1, 0, 1, 0, 1, 0] {
            let player = session.turn();
            session.play(player, column).unwrap();
        }

        let events = Coordinator::after_drop(&mut session);
        assert_eq!(events[0], GameEvent::GameWin { identity: Player::One });
        assert!(matches!(events[1], GameEvent::GameEnded(_)));
        assert!(!session.is_started());
    }
}
