//! Write-once winner arbitration shared by all player sessions.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Identifier of a connected player, assigned in acceptance order from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("Player {}", _0 + 1)]
pub struct PlayerId(usize);

impl PlayerId {
    /// Creates an id from a zero-based index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the zero-based index.
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns the one-based number shown to people.
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

/// Result of submitting a win claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This claim set the winner.
    Accepted,
    /// A winner was already recorded; the claim changed nothing.
    AlreadyDecided(PlayerId),
}

/// The single arbitration point for "who won".
///
/// Cloning shares the same state. The winner is written at most once,
/// through one atomic compare-and-set on the underlying watch channel.
#[derive(Debug, Clone)]
pub struct Arbiter {
    winner: Arc<watch::Sender<Option<PlayerId>>>,
}

impl Arbiter {
    /// Creates an undecided arbiter.
    #[instrument]
    pub fn new() -> Self {
        let (winner, _) = watch::channel(None);
        Self {
            winner: Arc::new(winner),
        }
    }

    /// Records `player` as the winner unless someone already won.
    #[instrument(skip(self))]
    pub fn claim(&self, player: PlayerId) -> ClaimOutcome {
        let mut previous = None;
        self.winner.send_if_modified(|current| match current {
            Some(existing) => {
                previous = Some(*existing);
                false
            }
            None => {
                *current = Some(player);
                true
            }
        });

        match previous {
            Some(existing) => {
                debug!(%player, winner = %existing, "Claim arrived after decision");
                ClaimOutcome::AlreadyDecided(existing)
            }
            None => {
                info!(%player, "Winner recorded");
                ClaimOutcome::Accepted
            }
        }
    }

    /// Returns the winner, if decided.
    pub fn winner(&self) -> Option<PlayerId> {
        *self.winner.borrow()
    }

    /// Waits until a winner is recorded and returns it.
    pub async fn decided(&self) -> PlayerId {
        let mut rx = self.winner.subscribe();
        let winner = rx.wait_for(Option::is_some).await.ok().and_then(|w| *w);
        match winner {
            Some(winner) => winner,
            // The sender lives in `self`, so the channel never closes here.
            None => std::future::pending().await,
        }
    }
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_claim_wins() {
        let arbiter = Arbiter::new();
        assert_eq!(arbiter.winner(), None);
        assert_eq!(arbiter.claim(PlayerId::new(2)), ClaimOutcome::Accepted);
        assert_eq!(
            arbiter.claim(PlayerId::new(0)),
            ClaimOutcome::AlreadyDecided(PlayerId::new(2))
        );
        assert_eq!(arbiter.winner(), Some(PlayerId::new(2)));
    }

    #[test]
    fn test_repeat_claim_by_winner_is_not_accepted_twice() {
        let arbiter = Arbiter::new();
        let id = PlayerId::new(1);
        assert_eq!(arbiter.claim(id), ClaimOutcome::Accepted);
        assert_eq!(arbiter.claim(id), ClaimOutcome::AlreadyDecided(id));
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(PlayerId::new(0).to_string(), "Player 1");
    }

    #[tokio::test]
    async fn test_decided_wakes_on_claim() {
        let arbiter = Arbiter::new();
        let waiter = {
            let arbiter = arbiter.clone();
            tokio::spawn(async move { arbiter.decided().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        arbiter.claim(PlayerId::new(3));
        let winner = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter finished")
            .expect("task joined");
        assert_eq!(winner, PlayerId::new(3));
    }

    #[tokio::test]
    async fn test_decided_returns_immediately_when_already_set() {
        let arbiter = Arbiter::new();
        arbiter.claim(PlayerId::new(0));
        assert_eq!(arbiter.decided().await, PlayerId::new(0));
    }
}
