/// Redis snapshot store with graceful degradation.
///
/// All read/write operations return `Option<T>` / `bool` — on any Redis error
/// the operation logs a warning and degrades. Callers keep working from their
/// in-memory state; the catalog is fully functional without Redis, it just
/// forgets everything on restart.
use redis::AsyncCommands;
use tracing::warn;

use crate::error::CommonError;

pub struct RedisStore {
    client: Option<redis::Client>,
}

impl RedisStore {
    /// Attempt to create a client. If the URL is `None` or invalid, returns a
    /// `RedisStore` that always degrades gracefully (no-ops).
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(
                    |e| warn!(error = %e, url = u, "failed to create redis client, persistence disabled"),
                )
                .ok()
        });
        Self { client }
    }

    /// Test the connection with a PING. Used once at startup so the log says
    /// whether this process persists anything.
    pub async fn ping(&self) -> Result<(), CommonError> {
        let Some(client) = &self.client else {
            return Err(CommonError::RedisUnavailable);
        };
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Get a value. Returns `None` if Redis is unavailable or the key is absent.
    pub async fn get(&self, key: &str) -> Option<String> {
        let client = self.client.as_ref()?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()?;
        let value: Option<String> = conn
            .get(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()?;
        value
    }

    /// Set a value with no expiry. Returns `true` if the write happened.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        let Some(client) = &self.client else {
            return false;
        };
        let Ok(mut conn) = client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
        else {
            return false;
        };
        conn.set::<_, _, ()>(key, value)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SET failed"))
            .is_ok()
    }
}
