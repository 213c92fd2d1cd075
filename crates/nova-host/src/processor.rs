//! The host event loop.
//!
//! A single task owns the [`RecordingSession`]. It drains raw channel
//! messages, fires the debounce timer and serves commands from any number of
//! [`HostHandle`]s. Every handler runs to completion before the next signal
//! is looked at, so the session needs no locking.

use chrono::Local;
use nova_protocols::{RecordingError, SavedTestPayload};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::save::SaveOptions;
use crate::session::{IngestOutcome, RecordingSession};
use crate::snapshot::RecordingSnapshot;

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<T>;

enum HostCommand {
    Start {
        url: String,
        reply: Reply<Result<(), RecordingError>>,
    },
    Stop {
        reply: Reply<()>,
    },
    Clear {
        reply: Reply<()>,
    },
    Navigation {
        url: String,
        timestamp: u64,
        reply: Reply<Option<String>>,
    },
    AddTab {
        name: Option<String>,
        reply: Reply<String>,
    },
    RenameTab {
        id: String,
        name: String,
        reply: Reply<Result<(), RecordingError>>,
    },
    SwitchTab {
        id: String,
        reply: Reply<Result<(), RecordingError>>,
    },
    DeleteTab {
        id: String,
        reply: Reply<Result<(), RecordingError>>,
    },
    DeleteEvent {
        id: String,
        reply: Reply<Result<(), RecordingError>>,
    },
    Snapshot {
        reply: Reply<RecordingSnapshot>,
    },
    Save {
        options: SaveOptions,
        reply: Reply<Result<SavedTestPayload, RecordingError>>,
    },
    IsRecording {
        reply: Reply<bool>,
    },
}

pub struct HostProcessor {
    session: RecordingSession,
    commands: mpsc::Receiver<HostCommand>,
    messages: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
}

impl HostProcessor {
    /// Create a processor over `messages` and a handle to command it.
    pub fn new(
        session: RecordingSession,
        messages: mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
    ) -> (Self, HostHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let processor = Self {
            session,
            commands,
            messages,
            cancel,
        };
        (processor, HostHandle { tx })
    }

    /// Run the processor on the current runtime.
    pub fn spawn(
        session: RecordingSession,
        messages: mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
    ) -> (HostHandle, JoinHandle<RecordingSession>) {
        let (processor, handle) = Self::new(session, messages, cancel);
        (handle, tokio::spawn(processor.run()))
    }

    /// Process signals until cancelled or until both the channel and every
    /// handle are gone. Returns the session for inspection.
    pub async fn run(mut self) -> RecordingSession {
        let mut messages_open = true;
        let mut commands_open = true;
        info!("Host processor started");

        while messages_open || commands_open {
            let deadline = self.session.debounce_deadline();
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("Host processor cancelled");
                    break;
                }

                _ = wait_until(deadline) => {
                    self.session.flush_due(Instant::now());
                }

                message = self.messages.recv(), if messages_open => match message {
                    Some(raw) => {
                        if let IngestOutcome::Processed { accepted, suppressed, .. } =
                            self.session.ingest(&raw, Instant::now())
                        {
                            debug!(accepted, suppressed, "Ingested channel message");
                        }
                    }
                    None => {
                        debug!("Recorder channel closed");
                        messages_open = false;
                    }
                },

                command = self.commands.recv(), if commands_open => match command {
                    Some(command) => self.handle(command),
                    None => commands_open = false,
                },
            }
        }

        info!("Host processor stopped");
        self.session
    }

    fn handle(&mut self, command: HostCommand) {
        let session = &mut self.session;
        match command {
            HostCommand::Start { url, reply } => {
                let _ = reply.send(session.start(&url));
            }
            HostCommand::Stop { reply } => {
                session.stop();
                let _ = reply.send(());
            }
            HostCommand::Clear { reply } => {
                session.clear();
                let _ = reply.send(());
            }
            HostCommand::Navigation {
                url,
                timestamp,
                reply,
            } => {
                let _ = reply.send(session.record_navigation(&url, timestamp));
            }
            HostCommand::AddTab { name, reply } => {
                let _ = reply.send(session.add_tab(name.as_deref()));
            }
            HostCommand::RenameTab { id, name, reply } => {
                let _ = reply.send(session.rename_tab(&id, &name));
            }
            HostCommand::SwitchTab { id, reply } => {
                let _ = reply.send(session.switch_tab(&id));
            }
            HostCommand::DeleteTab { id, reply } => {
                let _ = reply.send(session.delete_tab(&id));
            }
            HostCommand::DeleteEvent { id, reply } => {
                let _ = reply.send(session.delete_event(&id));
            }
            HostCommand::Snapshot { reply } => {
                let _ = reply.send(session.snapshot());
            }
            HostCommand::Save { options, reply } => {
                let _ = reply.send(session.save(&options, Local::now()));
            }
            HostCommand::IsRecording { reply } => {
                let _ = reply.send(session.is_recording());
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Cloneable command handle for a running [`HostProcessor`].
///
/// Every call fails with [`RecordingError::HostStopped`] once the processor
/// has exited.
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: mpsc::Sender<HostCommand>,
}

impl HostHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> HostCommand,
    ) -> Result<T, RecordingError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| RecordingError::HostStopped)?;
        rx.await.map_err(|_| RecordingError::HostStopped)
    }

    pub async fn start(&self, url: &str) -> Result<(), RecordingError> {
        let url = url.to_string();
        self.request(|reply| HostCommand::Start { url, reply }).await?
    }

    pub async fn stop(&self) -> Result<(), RecordingError> {
        self.request(|reply| HostCommand::Stop { reply }).await
    }

    pub async fn clear(&self) -> Result<(), RecordingError> {
        self.request(|reply| HostCommand::Clear { reply }).await
    }

    /// Record a completed page load. `None` when not recording.
    pub async fn navigation(&self, url: &str, timestamp: u64) -> Result<Option<String>, RecordingError> {
        let url = url.to_string();
        self.request(|reply| HostCommand::Navigation {
            url,
            timestamp,
            reply,
        })
        .await
    }

    pub async fn add_tab(&self, name: Option<&str>) -> Result<String, RecordingError> {
        let name = name.map(str::to_string);
        self.request(|reply| HostCommand::AddTab { name, reply }).await
    }

    pub async fn rename_tab(&self, id: &str, name: &str) -> Result<(), RecordingError> {
        let (id, name) = (id.to_string(), name.to_string());
        self.request(|reply| HostCommand::RenameTab { id, name, reply })
            .await?
    }

    pub async fn switch_tab(&self, id: &str) -> Result<(), RecordingError> {
        let id = id.to_string();
        self.request(|reply| HostCommand::SwitchTab { id, reply }).await?
    }

    pub async fn delete_tab(&self, id: &str) -> Result<(), RecordingError> {
        let id = id.to_string();
        self.request(|reply| HostCommand::DeleteTab { id, reply }).await?
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), RecordingError> {
        let id = id.to_string();
        self.request(|reply| HostCommand::DeleteEvent { id, reply }).await?
    }

    pub async fn snapshot(&self) -> Result<RecordingSnapshot, RecordingError> {
        self.request(|reply| HostCommand::Snapshot { reply }).await
    }

    pub async fn save(&self, options: SaveOptions) -> Result<SavedTestPayload, RecordingError> {
        self.request(|reply| HostCommand::Save { options, reply }).await?
    }

    pub async fn is_recording(&self) -> Result<bool, RecordingError> {
        self.request(|reply| HostCommand::IsRecording { reply }).await
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
