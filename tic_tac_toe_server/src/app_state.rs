use crate::game::{Coordinator, DisconnectReport, Envelope, SessionId};

use std::{collections::HashMap, sync::Arc};
use tic_tac_toe_core::{ClientEvent, ServerEvent};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Shared server state. Lock order is always `coordinator` then `outboxes`.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RwLock<Coordinator>>,
    pub outboxes: Arc<RwLock<HashMap<SessionId, Outbox>>>,
}

impl AppState {
    pub fn new(disconnect_report: DisconnectReport) -> Self {
        AppState {
            coordinator: Arc::new(RwLock::new(Coordinator::new(disconnect_report))),
            outboxes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, session: SessionId, outbox: Outbox) {
        self.coordinator.write().await.connect(session);
        self.outboxes.write().await.insert(session, outbox);
    }

    /// Runs one event to completion and queues its results before releasing the lock.
    pub async fn dispatch(&self, session: SessionId, event: ClientEvent) {
        let mut coordinator = self.coordinator.write().await;
        let envelopes = coordinator.handle(session, event);
        self.deliver(envelopes).await;
    }

    pub async fn reject_malformed_move(&self, session: SessionId) {
        let coordinator = self.coordinator.read().await;
        let envelopes = coordinator.reject_malformed_move(session);
        self.deliver(envelopes).await;
    }

    pub async fn disconnect(&self, session: SessionId) {
        {
            let mut coordinator = self.coordinator.write().await;
            let envelopes = coordinator.disconnect(session);
            self.deliver(envelopes).await;
        }
        self.outboxes.write().await.remove(&session);
        info!("Session {} unregistered", session);
    }

    pub async fn reap(&self) -> Vec<String> {
        self.coordinator.write().await.reap()
    }

    pub async fn counts(&self) -> (usize, usize) {
        let coordinator = self.coordinator.read().await;
        (coordinator.room_count(), coordinator.session_count())
    }

    async fn deliver(&self, envelopes: Vec<Envelope>) {
        if envelopes.is_empty() {
            return;
        }
        let outboxes = self.outboxes.read().await;
        for Envelope { to, event } in envelopes {
            match outboxes.get(&to) {
                Some(outbox) => {
                    if outbox.send(event).is_err() {
                        debug!("Outbox for session {} is closed, dropping event", to);
                    }
                }
                None => debug!("No outbox for session {}, dropping event", to),
            }
        }
    }
}
