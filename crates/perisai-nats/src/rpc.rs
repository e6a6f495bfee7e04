use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::{HeaderMap, HeaderValue, Message, Subscriber};
use async_trait::async_trait;
use futures::StreamExt;
use perisai_domain::broker::{BrokerRpc, RpcRequest};
use perisai_domain::error::BrokerError;
use serde_json::Value;
use tracing::{debug, info, warn};

const CORRELATION_HEADER: &str = "correlation-id";

/// Correlated request/reply over NATS. One long-lived multiplexed client
/// per process; every call gets its own exclusive reply inbox and a fresh
/// correlation token, so concurrent calls never share queues or tokens.
pub struct NatsRpcClient {
    client: async_nats::Client,
}

impl NatsRpcClient {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        info!(url = %url, timeout_ms = timeout.as_millis(), "Connecting to NATS");

        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Successfully connected to NATS");
        Ok(Self { client })
    }

    pub fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Wait for the reply carrying `correlation_id`, discarding anything
    /// else that lands on the inbox.
    async fn next_correlated(subscriber: &mut Subscriber, correlation_id: &str) -> Option<Message> {
        while let Some(message) = subscriber.next().await {
            if correlation_matches(message.headers.as_ref(), correlation_id) {
                return Some(message);
            }
            debug!("ignoring uncorrelated message on reply inbox");
        }
        None
    }
}

fn correlation_matches(headers: Option<&HeaderMap>, correlation_id: &str) -> bool {
    headers
        .and_then(|headers| headers.get(CORRELATION_HEADER))
        .map(HeaderValue::as_str)
        == Some(correlation_id)
}

#[async_trait]
impl BrokerRpc for NatsRpcClient {
    async fn call(
        &self,
        queue: &str,
        request: RpcRequest,
        timeout: Duration,
    ) -> Result<Value, BrokerError> {
        let correlation_id = xid::new().to_string();
        let inbox = self.client.new_inbox();

        // Subscribe before publishing so a fast reply cannot be lost.
        let mut subscriber = self
            .client
            .subscribe(inbox.clone())
            .await
            .map_err(|e| BrokerError::Transport(e.to_string()))?;

        let payload =
            serde_json::to_vec(&request).map_err(|e| BrokerError::Transport(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, correlation_id.as_str());

        let publish = async {
            self.client
                .publish_with_reply_and_headers(
                    queue.to_string(),
                    inbox.clone(),
                    headers,
                    payload.into(),
                )
                .await
                .map_err(|e| BrokerError::Transport(e.to_string()))?;
            self.client
                .flush()
                .await
                .map_err(|e| BrokerError::Transport(e.to_string()))
        };

        let result = match publish.await {
            Err(e) => Err(e),
            Ok(()) => {
                debug!(queue, correlation_id = %correlation_id, "published rpc request");
                match tokio::time::timeout(
                    timeout,
                    Self::next_correlated(&mut subscriber, &correlation_id),
                )
                .await
                {
                    Err(_) => Err(BrokerError::Timeout(timeout)),
                    Ok(None) => {
                        Err(BrokerError::Transport("reply inbox closed".to_string()))
                    }
                    Ok(Some(message)) => serde_json::from_slice(&message.payload)
                        .map_err(|e| BrokerError::Decode(e.to_string())),
                }
            }
        };

        // Release the inbox on every exit path. Release failures are
        // logged, never escalated.
        if let Err(e) = subscriber.unsubscribe().await {
            warn!(queue, error = %e, "failed to release reply inbox");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, id);
        headers
    }

    #[test]
    fn test_correlation_match() {
        let headers = headers_with("abc123");
        assert!(correlation_matches(Some(&headers), "abc123"));
    }

    #[test]
    fn test_correlation_mismatch_ignored() {
        let headers = headers_with("abc123");
        assert!(!correlation_matches(Some(&headers), "other"));
    }

    #[test]
    fn test_missing_headers_never_match() {
        assert!(!correlation_matches(None, "abc123"));

        let empty = HeaderMap::new();
        assert!(!correlation_matches(Some(&empty), "abc123"));
    }
}
