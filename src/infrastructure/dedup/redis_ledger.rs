//! Redis-backed visit ledger.

use super::service::{LedgerError, LedgerResult, VisitLedger};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Visit ledger storing one key per `(token, fingerprint)` with a TTL.
///
/// Uses `SET key 1 NX EX window`, so the check and the write are one atomic
/// command and concurrent first visits from the same client count once.
pub struct RedisVisitLedger {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisVisitLedger {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> LedgerResult<Self> {
        info!("Connecting to Redis visit ledger");

        let client = Client::open(redis_url).map_err(|e| {
            LedgerError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            LedgerError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| LedgerError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "visit:".to_string(),
        })
    }

    fn build_key(&self, token: &str, fingerprint: &str) -> String {
        format!("{}{}:{}", self.key_prefix, token, fingerprint)
    }
}

#[async_trait]
impl VisitLedger for RedisVisitLedger {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn record_visit(
        &self,
        token: &str,
        fingerprint: &str,
        window_secs: u64,
    ) -> LedgerResult<bool> {
        let key = self.build_key(token, fingerprint);
        let mut conn = self.client.clone();

        let options = redis::SetOptions::default()
            .conditional_set(redis::ExistenceCheck::NX)
            .with_expiration(redis::SetExpiry::EX(window_secs));

        let set: Option<String> = conn
            .set_options(&key, 1, options)
            .await
            .map_err(|e| LedgerError::OperationError(e.to_string()))?;

        let fresh = set.is_some();
        debug!(token, fresh, "Ledger visit recorded");
        Ok(fresh)
    }

    async fn forget(&self, token: &str, fingerprint: &str) -> LedgerResult<()> {
        let key = self.build_key(token, fingerprint);
        let mut conn = self.client.clone();

        conn.del::<_, ()>(&key)
            .await
            .map_err(|e| LedgerError::OperationError(e.to_string()))?;

        debug!(token, "Ledger visit released");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
