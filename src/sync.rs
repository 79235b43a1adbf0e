//! Phase synchronizer: poll tasks, serialized reducer, action dispatch.
//!
//! All state lives in one reducer task that consumes [`Event`]s and
//! publishes immutable [`Snapshot`]s on a watch channel. Two periodic tasks
//! feed it: the presale-phase poll, which stops itself once the end
//! condition has been observed, and the minted-count poll, which runs until
//! the session's cancellation token fires. Teardown via the token releases
//! every task on all exit paths.

use crate::contract::{MintContract, TxHash};
use crate::phase::{reduce, Action, Connection, Event, Snapshot};
use crate::wallet::WalletConnector;
use crate::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const EVENT_BUFFER: usize = 32;

/// Handle to a running synchronizer. Cheap to clone; held by the HTTP state.
#[derive(Clone)]
pub struct SyncHandle {
    contract: Arc<dyn MintContract>,
    connector: Arc<dyn WalletConnector>,
    events: mpsc::Sender<Event>,
    snapshot: watch::Receiver<Snapshot>,
    /// Serializes writes: at most one transaction in flight per session.
    write_slot: Arc<AtomicBool>,
}

/// Start the synchronizer tasks and return a handle to them.
pub fn spawn(
    contract: Arc<dyn MintContract>,
    connector: Arc<dyn WalletConnector>,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> SyncHandle {
    let (events_tx, mut events_rx) = mpsc::channel::<Event>(EVENT_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());

    // Reducer task: sole owner of the state. Every change is one event.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut state = Snapshot::default();
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events_rx.recv() => {
                        let Some(event) = event else { break };
                        state = reduce(&state, &event);
                        if snapshot_tx.send(state).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    // Session-start handshake. A wrong-network failure is the user-facing
    // alert; the session stays disconnected until the user retries.
    {
        let connector = Arc::clone(&connector);
        let events = events_tx.clone();
        tokio::spawn(async move {
            match connector.connect().await {
                Ok(()) => {
                    let _ = events.send(Event::WalletConnected).await;
                }
                Err(e) => warn!(error = %e, "Initial wallet connection failed"),
            }
        });
    }

    // Presale-phase poll: stops itself once the end condition is observed
    // (the end timestamp is immutable on-chain, nothing left to learn).
    {
        let contract = Arc::clone(&contract);
        let events = events_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let started = contract.presale_started().await;
                if !started {
                    // Ownership only matters before the presale starts;
                    // recomputed every poll so account switches are seen.
                    if let Some(is_owner) = contract.caller_is_owner().await {
                        let _ = events.send(Event::OwnerObserved { is_owner }).await;
                    }
                }
                let end_timestamp = if started {
                    contract.presale_end_timestamp().await
                } else {
                    None
                };
                let now = unix_now();
                let _ = events
                    .send(Event::PhaseObserved {
                        started,
                        end_timestamp,
                        now,
                    })
                    .await;
                if started && end_timestamp.is_some_and(|end| end < now) {
                    info!("Presale ended; phase poll stopping");
                    break;
                }
            }
        });
    }

    // Minted-count poll: runs for the session lifetime.
    {
        let contract = Arc::clone(&contract);
        let events = events_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Minted-count poll cancelled");
                        break;
                    }
                    _ = ticker.tick() => {}
                }
                if let Some(count) = contract.token_ids().await {
                    let _ = events.send(Event::MintedObserved { count }).await;
                }
            }
        });
    }

    SyncHandle {
        contract,
        connector,
        events: events_tx,
        snapshot: snapshot_rx,
        write_slot: Arc::new(AtomicBool::new(false)),
    }
}

impl SyncHandle {
    /// The current state snapshot.
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshot.borrow()
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// User-initiated wallet handshake, e.g. a retry after a wrong-network
    /// alert. Rejected once connected: the session never re-prompts.
    pub async fn connect(&self) -> Result<(), Error> {
        if !self.snapshot().permits(Action::ConnectWallet) {
            return Err(Error::Rejected(rejection_reason(
                &self.snapshot(),
                Action::ConnectWallet,
            )));
        }
        self.connector.connect().await?;
        self.emit(Event::WalletConnected).await;
        Ok(())
    }

    /// Submit a phase-gated write.
    ///
    /// The gate refuses anything outside its phase and anything while a
    /// transaction is already in flight; refused actions never reach the
    /// writer. On success the dependent state is refreshed immediately
    /// instead of waiting out the next poll period.
    pub async fn submit(&self, action: Action) -> Result<TxHash, Error> {
        if action == Action::ConnectWallet {
            return Err(Error::Rejected(
                "connecting the wallet is not a transaction".into(),
            ));
        }
        let snap = self.snapshot();
        if !snap.permits(action) {
            return Err(Error::Rejected(rejection_reason(&snap, action)));
        }
        if self
            .write_slot
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Rejected("a transaction is already pending".into()));
        }

        self.emit(Event::TxSubmitted).await;
        let result = match action {
            Action::StartPresale => self.contract.start_presale().await,
            Action::PresaleMint => self.contract.presale_mint().await,
            Action::PublicMint => self.contract.public_mint().await,
            Action::ConnectWallet => unreachable!("rejected above"),
        };
        // The pending flag clears on success and failure alike so the UI
        // becomes interactive again.
        self.emit(Event::TxSettled).await;
        self.write_slot.store(false, Ordering::Release);

        match result {
            Ok(hash) => {
                info!(action = ?action, tx = %hash, "Action confirmed");
                self.refresh_after(action).await;
                Ok(hash)
            }
            Err(e) => {
                error!(action = ?action, error = %e, "Action failed; user must re-initiate");
                Err(e)
            }
        }
    }

    /// Dependent-state refresh after a confirmed write.
    async fn refresh_after(&self, action: Action) {
        match action {
            Action::StartPresale => {
                let started = self.contract.presale_started().await;
                let end_timestamp = if started {
                    self.contract.presale_end_timestamp().await
                } else {
                    None
                };
                self.emit(Event::PhaseObserved {
                    started,
                    end_timestamp,
                    now: unix_now(),
                })
                .await;
            }
            Action::PresaleMint | Action::PublicMint => {
                if let Some(count) = self.contract.token_ids().await {
                    self.emit(Event::MintedObserved { count }).await;
                }
            }
            Action::ConnectWallet => {}
        }
    }

    async fn emit(&self, event: Event) {
        if self.events.send(event).await.is_err() {
            warn!("Synchronizer reducer is gone; event dropped");
        }
    }
}

fn rejection_reason(snap: &Snapshot, action: Action) -> String {
    if snap.pending_tx {
        return "a transaction is already pending".into();
    }
    if snap.connection == Connection::Disconnected && action != Action::ConnectWallet {
        return "wallet is not connected".into();
    }
    match action {
        Action::ConnectWallet => "wallet is already connected".into(),
        Action::StartPresale if !snap.is_owner => "only the owner can start the presale".into(),
        Action::StartPresale => "presale cannot be started in this phase".into(),
        Action::PresaleMint => "presale is not active".into(),
        Action::PublicMint => "public mint is not open".into(),
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
