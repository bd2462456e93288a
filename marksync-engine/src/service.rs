//! Sync service — the orchestrating event loop.
//!
//! Owns the channel ends and ties the components together: tree events feed
//! the recommendation workflow and the forward engine, commands trigger
//! reverse passes and resolve pending recommendations. The hosting process
//! may be torn down at any time; [`SyncService::initialize`] is idempotent
//! and rehydrates from durable settings alone, so a respawn just builds a
//! fresh service and runs it.

use crate::error::{EngineError, EngineResult};
use crate::forward::ForwardSyncEngine;
use crate::local_tree::LocalTreeAdapter;
use crate::messages::{MessageAck, UiChannel, UiCommand};
use crate::recommend::{FolderScorer, RecommendationWorkflow};
use crate::reverse::ReverseSyncManager;
use crate::settings::{SettingsStore, SyncSettings};
use marksync_client::RemoteStoreClient;
use marksync_types::{SyncReport, TreeEvent};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, oneshot};
use tracing::{debug, info, warn};

/// Commands sent to the sync service.
#[derive(Debug)]
pub enum ServiceCommand {
    /// Run a full reverse-sync pass and report the outcome.
    TriggerReverseSync { reply: oneshot::Sender<SyncReport> },
    /// Resolve a pending recommendation (accept or dismiss).
    Ui {
        command: UiCommand,
        reply: oneshot::Sender<MessageAck>,
    },
    /// Re-run initialization (settings changed).
    Reload,
    Shutdown,
}

/// Handle for sending commands to a running sync service.
#[derive(Clone)]
pub struct ServiceHandle {
    command_tx: mpsc::Sender<ServiceCommand>,
}

impl ServiceHandle {
    /// Triggers a reverse-sync pass and waits for its report.
    pub async fn sync_from_markhub(&self) -> EngineResult<SyncReport> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(ServiceCommand::TriggerReverseSync { reply })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Routes an inbound UI command and waits for its acknowledgement.
    pub async fn handle_ui_command(&self, command: UiCommand) -> EngineResult<MessageAck> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(ServiceCommand::Ui { command, reply })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    pub async fn accept_recommendation(&self, bookmark_id: &str) -> EngineResult<MessageAck> {
        self.handle_ui_command(UiCommand::AcceptFolderRecommendation {
            bookmark_id: bookmark_id.to_string(),
        })
        .await
    }

    pub async fn dismiss_recommendation(&self, bookmark_id: &str) -> EngineResult<MessageAck> {
        self.handle_ui_command(UiCommand::DismissFolderRecommendation {
            bookmark_id: bookmark_id.to_string(),
        })
        .await
    }

    pub async fn reload(&self) -> EngineResult<()> {
        self.command_tx
            .send(ServiceCommand::Reload)
            .await
            .map_err(|_| EngineError::ChannelClosed)
    }

    pub async fn shutdown(&self) -> EngineResult<()> {
        self.command_tx
            .send(ServiceCommand::Shutdown)
            .await
            .map_err(|_| EngineError::ChannelClosed)
    }
}

/// The sync service event loop.
pub struct SyncService {
    settings_store: Arc<dyn SettingsStore>,
    settings: Arc<RwLock<SyncSettings>>,
    remote: RemoteStoreClient,
    forward: Arc<ForwardSyncEngine>,
    workflow: Arc<RecommendationWorkflow>,
    reverse: ReverseSyncManager,
    events_rx: mpsc::Receiver<TreeEvent>,
    command_rx: mpsc::Receiver<ServiceCommand>,
}

/// Creates a sync service and its command handle. `events_rx` is the
/// receiving end of the host's tree-event subscription.
pub fn create_sync_service(
    settings_store: Arc<dyn SettingsStore>,
    remote: RemoteStoreClient,
    tree: Arc<dyn LocalTreeAdapter>,
    scorer: Arc<dyn FolderScorer>,
    ui: Arc<dyn UiChannel>,
    events_rx: mpsc::Receiver<TreeEvent>,
) -> (ServiceHandle, SyncService) {
    let (command_tx, command_rx) = mpsc::channel(64);

    let settings = Arc::new(RwLock::new(SyncSettings::default()));
    let forward = Arc::new(ForwardSyncEngine::new(
        remote.clone(),
        tree.clone(),
        ui.clone(),
    ));
    let workflow = Arc::new(RecommendationWorkflow::new(
        scorer,
        tree.clone(),
        forward.clone(),
        ui,
        settings.clone(),
    ));
    let reverse = ReverseSyncManager::new(remote.clone(), tree);

    let service = SyncService {
        settings_store,
        settings,
        remote,
        forward,
        workflow,
        reverse,
        events_rx,
        command_rx,
    };

    (ServiceHandle { command_tx }, service)
}

impl SyncService {
    /// Rehydrates the service from durable settings. Idempotent: clears
    /// every in-memory table (the synced set, the remote-id map, pending
    /// recommendations), so calling it on a respawn implicitly dismisses
    /// anything that was in flight.
    pub async fn initialize(&self) -> EngineResult<()> {
        let loaded = self.settings_store.load().await?;
        match &loaded.auth_token {
            Some(token) => self.remote.set_token(token.clone()).await,
            None => self.remote.clear_token().await,
        }
        *self.settings.write().await = loaded;
        self.forward.reset().await;
        self.workflow.clear_pending().await;
        Ok(())
    }

    /// Runs the service event loop until shutdown.
    pub async fn run(mut self) {
        if let Err(e) = self.initialize().await {
            warn!("sync service initialization failed: {e}");
        }
        info!("sync service started");

        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => {
                    self.handle_tree_event(event).await;
                }
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(ServiceCommand::TriggerReverseSync { reply }) => {
                            let report = if self.settings.read().await.sync_enabled {
                                self.reverse.sync_from_markhub().await
                            } else {
                                SyncReport::aborted("sync is disabled")
                            };
                            let _ = reply.send(report);
                        }
                        Some(ServiceCommand::Ui { command, reply }) => {
                            let ack = self.handle_ui_command(command).await;
                            let _ = reply.send(ack);
                        }
                        Some(ServiceCommand::Reload) => {
                            if let Err(e) = self.initialize().await {
                                warn!("reload failed: {e}");
                            }
                        }
                        Some(ServiceCommand::Shutdown) => {
                            info!("sync service shutting down");
                            break;
                        }
                        None => {
                            info!("command channel closed, stopping sync service");
                            break;
                        }
                    }
                }
            }
        }

        info!("sync service stopped");
    }

    async fn handle_tree_event(&self, event: TreeEvent) {
        let settings = self.settings.read().await.clone();
        if !settings.sync_enabled {
            debug!("sync disabled, dropping tree event");
            return;
        }

        let outcome = match event {
            TreeEvent::Created(node) if node.is_bookmark() && settings.ai_enabled => self
                .workflow
                .process_created(&node)
                .await
                .map(|state| debug!("recommendation workflow settled in {state:?}")),
            TreeEvent::Created(node) => self.forward.on_created(&node).await,
            TreeEvent::Changed(node) => self.forward.on_changed(&node).await,
            TreeEvent::Moved(node) => self.forward.on_moved(&node).await,
            TreeEvent::Removed { id } => self.forward.on_removed(&id).await,
        };

        if let Err(e) = outcome {
            // Failure handling (unmark + toast) already happened downstream.
            warn!("tree event handling failed: {e}");
        }
    }

    async fn handle_ui_command(&self, command: UiCommand) -> MessageAck {
        let result = match command {
            UiCommand::AcceptFolderRecommendation { bookmark_id } => {
                self.workflow.accept(&bookmark_id).await
            }
            UiCommand::DismissFolderRecommendation { bookmark_id } => {
                self.workflow.dismiss(&bookmark_id).await
            }
        };
        match result {
            Ok(()) => MessageAck::ok(),
            Err(e) => MessageAck::err(e),
        }
    }
}
