//! Redis service for revoked-token bookkeeping

use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::error::{AppError, AppResult};

/// All clones share one managed connection that reconnects after a dropped link
#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
}

fn revoked_key(jti: &str) -> String {
    format!("revoked_token:{}", jti)
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut manager = client
            .get_connection_manager()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut manager)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { manager })
    }

    fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Record a token id as revoked until the token would have expired anyway
    pub async fn revoke_token(&self, jti: &str, ttl_seconds: u64) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        let mut conn = self.connection();
        conn.set_ex::<_, _, ()>(revoked_key(jti), "1", ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to revoke token in Redis: {}", e)))?;
        Ok(())
    }

    /// Check if a token id was revoked by logout
    pub async fn is_token_revoked(&self, jti: &str) -> AppResult<bool> {
        let mut conn = self.connection();
        let exists: bool = conn
            .exists(revoked_key(jti))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check token in Redis: {}", e)))?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoked_keys_are_namespaced() {
        assert_eq!(revoked_key("abc"), "revoked_token:abc");
    }

    #[tokio::test]
    #[ignore] // Needs a Redis server on localhost
    async fn clones_share_one_connection_for_revocations() {
        let service = RedisService::new("redis://127.0.0.1:6379").await.unwrap();
        let jti = format!("test-{}", uuid::Uuid::new_v4());

        let writer = service.clone();
        writer.revoke_token(&jti, 30).await.unwrap();
        for _ in 0..5 {
            assert!(service.is_token_revoked(&jti).await.unwrap());
        }
        assert!(!service.is_token_revoked("never-issued").await.unwrap());
    }
}
