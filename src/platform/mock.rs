use super::{PlatformController, PlatformError};
use crate::gateway::GatewayError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCall {
    pub index: String,
    pub field: String,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Platform double replaying queued distinct-value results
#[derive(Debug, Default)]
pub struct MockPlatform {
    responses: Mutex<VecDeque<Result<Vec<Value>, GatewayError>>>,
    calls: Mutex<Vec<PlatformCall>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_distinct_values(&self, response: Result<Vec<Value>, GatewayError>) -> &Self {
        lock(&self.responses).push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PlatformController for MockPlatform {
    async fn get_distinct_values(
        &self,
        index: &str,
        field: &str,
    ) -> Result<Vec<Value>, PlatformError> {
        lock(&self.calls).push(PlatformCall {
            index: index.to_string(),
            field: field.to_string(),
        });

        let response = lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(GatewayError::transport(
                "MockPlatform: no queued distinct values response",
            ))
        });
        Ok(response?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_lookup_and_replays_values() {
        let platform = MockPlatform::new();
        platform.on_distinct_values(Ok(vec![json!("a"), json!("b")]));

        let values = platform.get_distinct_values("orders", "ip").await.unwrap();
        assert_eq!(values, vec![json!("a"), json!("b")]);
        assert_eq!(
            platform.calls(),
            vec![PlatformCall {
                index: "orders".to_string(),
                field: "ip".to_string()
            }]
        );

        assert!(platform.get_distinct_values("orders", "ip").await.is_err());
    }
}
