//! HTTP adapter for the relay.

use futures_util::StreamExt;
use reqwest::Client;
use streamchat_shared::RelayRequest;
use url::Url;

use crate::ports::outbound::{ChunkStream, RelayError, RelayPort};

/// Streams chat replies from the relay over HTTP
#[derive(Clone)]
pub struct RelayHttpClient {
    client: Client,
    chat_url: Url,
}

impl RelayHttpClient {
    pub fn new(chat_url: Url) -> Self {
        Self {
            client: Client::new(),
            chat_url,
        }
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

#[async_trait::async_trait]
impl RelayPort for RelayHttpClient {
    async fn open_stream(&self, request: &RelayRequest) -> Result<ChunkStream, RelayError> {
        let response = self
            .client
            .post(self.chat_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| RelayError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status(status.as_u16()));
        }

        let chunks = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| RelayError::StreamInterrupted(e.to_string()))
        });
        Ok(Box::pin(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use tokio::net::TcpListener;

    async fn spawn_relay(router: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/api/chat")).unwrap()
    }

    async fn drain(stream: ChunkStream) -> Vec<u8> {
        stream
            .map(|chunk| chunk.unwrap())
            .collect::<Vec<_>>()
            .await
            .concat()
    }

    #[tokio::test]
    async fn posts_request_and_streams_body() {
        let router = Router::new().route(
            "/api/chat",
            post(|Json(req): Json<RelayRequest>| async move {
                format!("echo:{}|{}", req.message, req.context.unwrap_or_default())
            }),
        );
        let client = RelayHttpClient::new(spawn_relay(router).await);

        let stream = client
            .open_stream(&RelayRequest::new("hi", "user: hi"))
            .await
            .unwrap();
        assert_eq!(drain(stream).await, b"echo:hi|user: hi");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error") }),
        );
        let client = RelayHttpClient::new(spawn_relay(router).await);

        let err = client
            .open_stream(&RelayRequest::new("hi", ""))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RelayError::Status(500)));
    }

    #[tokio::test]
    async fn unreachable_relay_is_request_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            RelayHttpClient::new(Url::parse(&format!("http://{addr}/api/chat")).unwrap());
        let err = client
            .open_stream(&RelayRequest::new("hi", ""))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RelayError::RequestFailed(_)));
    }
}
