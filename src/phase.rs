//! Pure presale phase machine: derivation, reduction, action gating.
//!
//! Everything here is synchronous and side-effect free. The synchronizer
//! feeds poll results and user-flow markers in as [`Event`]s; consumers only
//! ever see a complete [`Snapshot`] produced by the single [`reduce`]
//! function, so there are no partially-updated flag combinations to race on.

use serde::Serialize;

/// Wallet connection state. Set once per session by a successful handshake;
/// never reverts to Disconnected automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    Disconnected,
    Connected,
}

/// Presale lifecycle phase, ordered so later phases compare greater.
/// `Unknown` is the pre-first-poll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Unknown,
    NotStarted,
    Active,
    Ended,
}

impl Phase {
    /// Fold a newly observed phase into the last-known one.
    ///
    /// Phases are monotonic within a session. An observation that would move
    /// backwards is treated as a stale read and discarded: the last-known
    /// phase wins over a single anomalous poll.
    pub fn advance(self, observed: Phase) -> Phase {
        self.max(observed)
    }
}

/// Derive the phase from one poll's reads.
///
/// `end_timestamp` is `None` when that read yielded no information; a
/// started presale with an unknown end counts as Active. Ended requires the
/// end to be strictly in the past.
pub fn derive_phase(started: bool, end_timestamp: Option<u64>, now: u64) -> Phase {
    if !started {
        return Phase::NotStarted;
    }
    match end_timestamp {
        Some(end) if end < now => Phase::Ended,
        _ => Phase::Active,
    }
}

/// User-initiated actions, gated by the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ConnectWallet,
    StartPresale,
    PresaleMint,
    PublicMint,
}

/// One immutable view of the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub connection: Connection,
    pub phase: Phase,
    /// Connected account equals the contract owner. Only meaningful before
    /// the presale starts; recomputed on every pre-start poll.
    pub is_owner: bool,
    /// Latest observed token counter.
    pub minted: u64,
    /// A submitted transaction is awaiting confirmation; every action is
    /// presented as a single disabled "Loading" state while set.
    pub pending_tx: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            connection: Connection::Disconnected,
            phase: Phase::Unknown,
            is_owner: false,
            minted: 0,
            pending_tx: false,
        }
    }
}

/// State-changing observations and user-flow markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    WalletConnected,
    PhaseObserved {
        started: bool,
        end_timestamp: Option<u64>,
        now: u64,
    },
    OwnerObserved {
        is_owner: bool,
    },
    MintedObserved {
        count: u64,
    },
    TxSubmitted,
    TxSettled,
}

/// Apply one event to a snapshot. The sole way state changes.
pub fn reduce(snapshot: &Snapshot, event: &Event) -> Snapshot {
    let mut next = *snapshot;
    match *event {
        Event::WalletConnected => next.connection = Connection::Connected,
        Event::PhaseObserved {
            started,
            end_timestamp,
            now,
        } => {
            next.phase = snapshot
                .phase
                .advance(derive_phase(started, end_timestamp, now));
        }
        Event::OwnerObserved { is_owner } => next.is_owner = is_owner,
        Event::MintedObserved { count } => next.minted = count,
        Event::TxSubmitted => next.pending_tx = true,
        Event::TxSettled => next.pending_tx = false,
    }
    next
}

impl Snapshot {
    /// Whether `action` may be submitted in this state.
    ///
    /// The gate is a UI precondition only; the contract enforces the real
    /// rule on-chain. No write is ever permitted while disconnected or while
    /// another transaction is pending.
    pub fn permits(&self, action: Action) -> bool {
        if self.pending_tx {
            return false;
        }
        match action {
            Action::ConnectWallet => self.connection == Connection::Disconnected,
            Action::StartPresale => {
                self.connection == Connection::Connected
                    && self.is_owner
                    && self.phase == Phase::NotStarted
            }
            Action::PresaleMint => {
                self.connection == Connection::Connected && self.phase == Phase::Active
            }
            Action::PublicMint => {
                self.connection == Connection::Connected && self.phase == Phase::Ended
            }
        }
    }

    /// The single action the UI should offer, if any.
    ///
    /// `None` while a transaction is pending (disabled "Loading" state) or
    /// when nothing is currently legal, e.g. the presale has not started and
    /// the viewer is not the owner.
    pub fn available_action(&self) -> Option<Action> {
        [
            Action::ConnectWallet,
            Action::StartPresale,
            Action::PresaleMint,
            Action::PublicMint,
        ]
        .into_iter()
        .find(|action| self.permits(*action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn connected(phase: Phase) -> Snapshot {
        Snapshot {
            connection: Connection::Connected,
            phase,
            ..Snapshot::default()
        }
    }

    // --- Derivation ---

    #[test]
    fn test_not_started_regardless_of_timestamp() {
        // A stale end timestamp must never produce Ended while not started.
        assert_eq!(derive_phase(false, None, NOW), Phase::NotStarted);
        assert_eq!(derive_phase(false, Some(NOW - 100), NOW), Phase::NotStarted);
        assert_eq!(derive_phase(false, Some(NOW + 100), NOW), Phase::NotStarted);
    }

    #[test]
    fn test_active_while_end_in_future() {
        assert_eq!(derive_phase(true, Some(NOW + 3600), NOW), Phase::Active);
    }

    #[test]
    fn test_ended_iff_end_strictly_past() {
        assert_eq!(derive_phase(true, Some(NOW - 10), NOW), Phase::Ended);
        // Boundary: end == now is not yet ended.
        assert_eq!(derive_phase(true, Some(NOW), NOW), Phase::Active);
    }

    #[test]
    fn test_unknown_end_counts_as_active() {
        assert_eq!(derive_phase(true, None, NOW), Phase::Active);
    }

    // --- Monotonicity ---

    #[test]
    fn test_phase_never_regresses() {
        assert_eq!(Phase::Ended.advance(Phase::Active), Phase::Ended);
        assert_eq!(Phase::Ended.advance(Phase::NotStarted), Phase::Ended);
        assert_eq!(Phase::Active.advance(Phase::NotStarted), Phase::Active);
        assert_eq!(Phase::Active.advance(Phase::Unknown), Phase::Active);
    }

    #[test]
    fn test_phase_advances_forward() {
        assert_eq!(Phase::Unknown.advance(Phase::NotStarted), Phase::NotStarted);
        assert_eq!(Phase::NotStarted.advance(Phase::Active), Phase::Active);
        assert_eq!(Phase::Active.advance(Phase::Ended), Phase::Ended);
    }

    #[test]
    fn test_stale_poll_after_ended_is_discarded() {
        let snap = connected(Phase::Ended);
        // A single anomalous poll claims the presale never started.
        let next = reduce(
            &snap,
            &Event::PhaseObserved {
                started: false,
                end_timestamp: None,
                now: NOW,
            },
        );
        assert_eq!(next.phase, Phase::Ended);
    }

    // --- Reducer ---

    #[test]
    fn test_reduce_connects_once() {
        let snap = reduce(&Snapshot::default(), &Event::WalletConnected);
        assert_eq!(snap.connection, Connection::Connected);
    }

    #[test]
    fn test_reduce_full_session_progression() {
        let mut snap = Snapshot::default();
        snap = reduce(&snap, &Event::WalletConnected);
        snap = reduce(
            &snap,
            &Event::PhaseObserved {
                started: false,
                end_timestamp: None,
                now: NOW,
            },
        );
        assert_eq!(snap.phase, Phase::NotStarted);
        snap = reduce(
            &snap,
            &Event::PhaseObserved {
                started: true,
                end_timestamp: Some(NOW + 300),
                now: NOW,
            },
        );
        assert_eq!(snap.phase, Phase::Active);
        snap = reduce(
            &snap,
            &Event::PhaseObserved {
                started: true,
                end_timestamp: Some(NOW + 300),
                now: NOW + 301,
            },
        );
        assert_eq!(snap.phase, Phase::Ended);
    }

    #[test]
    fn test_reduce_tracks_minted_and_pending() {
        let mut snap = connected(Phase::Active);
        snap = reduce(&snap, &Event::MintedObserved { count: 7 });
        assert_eq!(snap.minted, 7);
        snap = reduce(&snap, &Event::TxSubmitted);
        assert!(snap.pending_tx);
        snap = reduce(&snap, &Event::TxSettled);
        assert!(!snap.pending_tx);
        // Minted survives the transaction lifecycle.
        assert_eq!(snap.minted, 7);
    }

    #[test]
    fn test_reduce_owner_flag_is_overwritten_each_check() {
        let mut snap = connected(Phase::NotStarted);
        snap = reduce(&snap, &Event::OwnerObserved { is_owner: true });
        assert!(snap.is_owner);
        // Account switched in the wallet; the next check reports false.
        snap = reduce(&snap, &Event::OwnerObserved { is_owner: false });
        assert!(!snap.is_owner);
    }

    // --- Gating scenarios ---

    #[test]
    fn test_disconnected_permits_only_connect() {
        let snap = Snapshot::default();
        assert_eq!(snap.available_action(), Some(Action::ConnectWallet));
        assert!(!snap.permits(Action::StartPresale));
        assert!(!snap.permits(Action::PresaleMint));
        assert!(!snap.permits(Action::PublicMint));
    }

    #[test]
    fn test_disconnected_never_permits_writes_in_any_phase() {
        for phase in [Phase::Unknown, Phase::NotStarted, Phase::Active, Phase::Ended] {
            let snap = Snapshot {
                phase,
                is_owner: true,
                ..Snapshot::default()
            };
            assert!(!snap.permits(Action::StartPresale));
            assert!(!snap.permits(Action::PresaleMint));
            assert!(!snap.permits(Action::PublicMint));
        }
    }

    #[test]
    fn test_owner_before_start_permits_only_start_presale() {
        let snap = Snapshot {
            is_owner: true,
            ..connected(Phase::NotStarted)
        };
        assert_eq!(snap.available_action(), Some(Action::StartPresale));
        assert!(!snap.permits(Action::PresaleMint));
        assert!(!snap.permits(Action::PublicMint));
        assert!(!snap.permits(Action::ConnectWallet));
    }

    #[test]
    fn test_non_owner_before_start_has_no_action() {
        let snap = connected(Phase::NotStarted);
        assert_eq!(snap.available_action(), None);
    }

    #[test]
    fn test_active_permits_only_presale_mint() {
        let snap = connected(Phase::Active);
        assert_eq!(snap.available_action(), Some(Action::PresaleMint));
        assert!(!snap.permits(Action::StartPresale));
        assert!(!snap.permits(Action::PublicMint));
    }

    #[test]
    fn test_ended_permits_only_public_mint() {
        let snap = connected(Phase::Ended);
        assert_eq!(snap.available_action(), Some(Action::PublicMint));
        assert!(!snap.permits(Action::PresaleMint));
        assert!(!snap.permits(Action::StartPresale));
    }

    #[test]
    fn test_owner_flag_does_not_leak_into_later_phases() {
        let snap = Snapshot {
            is_owner: true,
            ..connected(Phase::Active)
        };
        assert!(!snap.permits(Action::StartPresale));
        assert_eq!(snap.available_action(), Some(Action::PresaleMint));
    }

    #[test]
    fn test_pending_tx_disables_everything() {
        for phase in [Phase::NotStarted, Phase::Active, Phase::Ended] {
            let snap = Snapshot {
                pending_tx: true,
                is_owner: true,
                ..connected(phase)
            };
            assert_eq!(snap.available_action(), None);
        }
    }

    #[test]
    fn test_unknown_phase_permits_no_writes() {
        let snap = connected(Phase::Unknown);
        assert_eq!(snap.available_action(), None);
    }
}
