//! Async driver for [`SubmissionManager`].
//!
//! The service owns the manager and is its only caller, so every event is
//! handled to completion before the next one starts. Network calls and
//! timers run as spawned tasks that post their outcome back onto the
//! service's event channel.

use crate::domain::{
    Effect, EntryId, FeeSchedule, ManagerEvent, Signal, SubmissionManager, SubmitRequest,
    Summary, ValidatedTransaction,
};
use crate::ports::Transport;
use shared_types::LedgerIndex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Capacity of the command channel.
pub const COMMAND_BUFFER: usize = 256;

/// The service task has stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Submission service is not running")]
    Closed,
}

enum Command {
    Submit {
        request: SubmitRequest,
        reply: oneshot::Sender<EntryId>,
    },
    Abort(EntryId),
    Summary {
        entry: EntryId,
        reply: oneshot::Sender<Option<Summary>>,
    },
    Event(ManagerEvent),
}

/// Cloneable front end of a running [`SubmissionService`].
#[derive(Clone)]
pub struct SubmissionHandle {
    commands: mpsc::Sender<Command>,
}

impl SubmissionHandle {
    async fn send(&self, command: Command) -> Result<(), ServiceError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ServiceError::Closed)
    }

    pub async fn submit(&self, request: SubmitRequest) -> Result<EntryId, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { request, reply }).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    pub async fn abort(&self, entry: EntryId) -> Result<(), ServiceError> {
        self.send(Command::Abort(entry)).await
    }

    /// Summary of a pending entry; `None` once it is finalized.
    pub async fn summary(&self, entry: EntryId) -> Result<Option<Summary>, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Summary { entry, reply }).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    pub async fn ledger_closed(&self, ledger_index: LedgerIndex) -> Result<(), ServiceError> {
        self.send(Command::Event(ManagerEvent::LedgerClosed { ledger_index }))
            .await
    }

    pub async fn load_changed(&self, schedule: FeeSchedule) -> Result<(), ServiceError> {
        self.send(Command::Event(ManagerEvent::LoadChanged(schedule)))
            .await
    }

    pub async fn transaction_validated(&self, tx: ValidatedTransaction) -> Result<(), ServiceError> {
        self.send(Command::Event(ManagerEvent::TransactionValidated(tx)))
            .await
    }

    pub async fn disconnected(&self) -> Result<(), ServiceError> {
        self.send(Command::Event(ManagerEvent::Disconnected)).await
    }

    pub async fn connected(&self) -> Result<(), ServiceError> {
        self.send(Command::Event(ManagerEvent::Connected)).await
    }
}

/// Runs one account's manager against a transport.
pub struct SubmissionService<T: Transport + 'static> {
    manager: SubmissionManager,
    transport: Arc<T>,
    commands: mpsc::Receiver<Command>,
    events_tx: mpsc::UnboundedSender<ManagerEvent>,
    events_rx: mpsc::UnboundedReceiver<ManagerEvent>,
    signals: mpsc::UnboundedSender<Signal>,
}

impl<T: Transport + 'static> SubmissionService<T> {
    pub fn new(
        manager: SubmissionManager,
        transport: Arc<T>,
    ) -> (Self, SubmissionHandle, mpsc::UnboundedReceiver<Signal>) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (signals, signals_rx) = mpsc::unbounded_channel();
        let service = Self {
            manager,
            transport,
            commands,
            events_tx,
            events_rx,
            signals,
        };
        let handle = SubmissionHandle {
            commands: commands_tx,
        };
        (service, handle, signals_rx)
    }

    /// Build the service and run it on the current runtime.
    pub fn spawn(
        manager: SubmissionManager,
        transport: Arc<T>,
    ) -> (SubmissionHandle, mpsc::UnboundedReceiver<Signal>, JoinHandle<()>) {
        let (service, handle, signals) = Self::new(manager, transport);
        let task = tokio::spawn(service.run());
        (handle, signals, task)
    }

    /// Process commands and internal events until every handle is dropped.
    pub async fn run(mut self) {
        let effects = self.manager.start();
        self.perform(effects);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => {
                    let effects = self.manager.handle(event);
                    self.perform(effects);
                }
            }
        }
        debug!("[lp-03] submission service stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Submit { request, reply } => {
                let (entry, effects) = self.manager.submit(request);
                let _ = reply.send(entry);
                self.perform(effects);
            }
            Command::Abort(entry) => {
                let effects = self.manager.abort(entry);
                self.perform(effects);
            }
            Command::Summary { entry, reply } => {
                let _ = reply.send(self.manager.summary(entry));
            }
            Command::Event(event) => {
                let effects = self.manager.handle(event);
                self.perform(effects);
            }
        }
    }

    fn perform(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchSequence { purpose, delay } => {
                    let transport = Arc::clone(&self.transport);
                    let events = self.events_tx.clone();
                    let account = *self.manager.account();
                    tokio::spawn(async move {
                        if let Some(delay) = delay {
                            tokio::time::sleep(delay).await;
                        }
                        let result = transport.next_sequence(&account).await;
                        let _ = events.send(ManagerEvent::SequenceLoaded { purpose, result });
                    });
                }
                Effect::Dispatch {
                    entry,
                    attempt,
                    payload,
                    ..
                } => {
                    let transport = Arc::clone(&self.transport);
                    let events = self.events_tx.clone();
                    tokio::spawn(async move {
                        let reply = transport.submit(payload).await;
                        let _ = events.send(ManagerEvent::SubmitReplied {
                            entry,
                            attempt,
                            reply,
                        });
                    });
                }
                Effect::ArmTimeout {
                    entry,
                    attempt,
                    after,
                } => {
                    let events = self.events_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = events.send(ManagerEvent::TimeoutElapsed { entry, attempt });
                    });
                }
                Effect::FetchHistory { min_ledger } => {
                    let transport = Arc::clone(&self.transport);
                    let events = self.events_tx.clone();
                    let account = *self.manager.account();
                    tokio::spawn(async move {
                        let result = transport.account_tx(&account, min_ledger).await;
                        let _ = events.send(ManagerEvent::HistoryLoaded(result));
                    });
                }
                Effect::Signal(signal) => {
                    if self.signals.send(signal).is_err() {
                        warn!("[lp-03] signal receiver dropped");
                    }
                }
            }
        }
    }
}
