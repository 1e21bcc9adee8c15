use redis::RedisResult;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

/// Key of the counter for `subject` in the fixed window containing `now_secs`.
pub(crate) fn window_key(subject: &str, window_seconds: u64, now_secs: u64) -> String {
    let window = now_secs / window_seconds.max(1);
    format!("ratelimit:{}:{}", subject, window)
}

impl RedisClient {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Counts one request for `subject` and reports whether it is still within
    /// `limit` requests for the current window.
    pub async fn check_rate_limit(
        &self,
        subject: &str,
        limit: i64,
        window_seconds: u64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let key = window_key(subject, window_seconds, now);

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, window_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}
