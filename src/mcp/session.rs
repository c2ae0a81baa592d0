// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SSE session bookkeeping.
//!
//! Each open `/sse` stream owns the receiving half of a channel; the
//! store keeps the sending half so `/messages/` posts can reach it.

use super::protocol::JsonRpcResponse;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Responses buffered per session before senders wait.
const SESSION_BUFFER: usize = 32;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, mpsc::Sender<JsonRpcResponse>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session, returning its id and the stream of responses.
    pub async fn open(&self) -> (Uuid, mpsc::Receiver<JsonRpcResponse>) {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, tx);
        debug!(session_id = %id, "Session opened");
        (id, rx)
    }

    pub async fn sender(&self, id: &Uuid) -> Option<mpsc::Sender<JsonRpcResponse>> {
        self.sessions
            .read()
            .await
            .get(id)
            .filter(|tx| !tx.is_closed())
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions whose stream has gone away.
    pub async fn cleanup(&self) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, tx| !tx.is_closed());
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Pruned closed sessions");
        }
    }
}
