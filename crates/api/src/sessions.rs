//! In-memory visitor-session registry.
//!
//! Maps an opaque session identifier (the value of the visitor's
//! `samo_session` cookie) to that visitor's [`ActiveNetClient`]. All
//! state is process memory: sessions do not survive a restart and are
//! not shared across processes.
//!
//! There is no eviction: memory grows with distinct visitors for the
//! process lifetime, which is acceptable because no persistence is
//! promised. TODO: add an idle-timeout sweep once session volume makes
//! it worth the bookkeeping (track last-touch per entry, prune in a
//! background task).

use std::collections::HashMap;
use std::sync::Arc;

use rand::RngCore;
use tokio::sync::RwLock;

use samo_activenet::client::ActiveNetClient;
use samo_activenet::config::UpstreamConfig;
use samo_activenet::error::UpstreamError;

/// Concurrency-safe registry of visitor sessions.
pub struct SessionStore {
    upstream: Arc<UpstreamConfig>,
    sessions: RwLock<HashMap<String, Arc<ActiveNetClient>>>,
}

impl SessionStore {
    pub fn new(upstream: Arc<UpstreamConfig>) -> Self {
        Self {
            upstream,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Bootstrap a new anonymous client and register it under a freshly
    /// generated session id.
    ///
    /// The bootstrap happens before the map lock is taken, so a slow
    /// upstream never blocks other visitors' lookups.
    pub async fn create(&self) -> Result<(String, Arc<ActiveNetClient>), UpstreamError> {
        let client = Arc::new(ActiveNetClient::new(Arc::clone(&self.upstream)).await?);
        let session_id = generate_session_id();

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::clone(&client));

        tracing::info!(session = %&session_id[..8], "created anonymous session");
        Ok((session_id, client))
    }

    /// Look up the client for a session id. Returns the *same* instance
    /// every time, so in-flight mutations (login, CSRF refresh) are
    /// visible to subsequent calls on the session.
    pub async fn get(&self, session_id: &str) -> Option<Arc<ActiveNetClient>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Remove a session, clearing its client state. Idempotent: removing
    /// an unknown id is a no-op.
    pub async fn remove(&self, session_id: &str) {
        let client = self.sessions.write().await.remove(session_id);
        if let Some(client) = client {
            if let Err(err) = client.logout().await {
                tracing::warn!(error = %err, "failed to clear client state on session removal");
            }
            tracing::info!(session = %&session_id[..8.min(session_id.len())], "destroyed session");
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Generate a session identifier: 32 random bytes (256 bits of entropy)
/// from the OS-seeded thread RNG, hex-encoded. Used only as a lookup key
/// and cookie value; carries no meaning.
fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
