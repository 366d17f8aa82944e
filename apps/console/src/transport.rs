//! Adapter bridging the API [`Client`] to the scheduler's
//! [`ContainerTransport`] trait.

use std::future::Future;

use gallerydesk_api::{Client, Error};
use gallerydesk_transfer::ChunkDescriptor;
use gallerydesk_upload::{ContainerTransport, TransportError, TransportFuture};
use tokio_util::sync::CancellationToken;

/// Implements [`ContainerTransport`] by delegating to the HTTP client.
pub struct ApiTransport {
    client: Client,
}

impl ApiTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ContainerTransport for ApiTransport {
    fn item_count<'a>(
        &'a self,
        container_id: &'a str,
        cancel: CancellationToken,
    ) -> TransportFuture<'a, u64> {
        Box::pin(cancellable(cancel, self.client.container_item_count(container_id)))
    }

    fn send_chunk<'a>(
        &'a self,
        chunk: &'a ChunkDescriptor,
        cancel: CancellationToken,
    ) -> TransportFuture<'a, ()> {
        Box::pin(cancellable(cancel, self.client.upload_chunk(chunk)))
    }
}

/// Drops the request when `cancel` fires.
async fn cancellable<T>(
    cancel: CancellationToken,
    request: impl Future<Output = Result<T, Error>>,
) -> Result<T, TransportError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportError::Cancelled),
        result = request => result.map_err(to_transport_error),
    }
}

/// Anything without an HTTP status counts as "no response" and is retried.
fn to_transport_error(e: Error) -> TransportError {
    match e {
        Error::Api { status, body } => TransportError::Status { status, body },
        Error::Http(e) => match e.status() {
            Some(status) => TransportError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            },
            None => TransportError::NoResponse(e.to_string()),
        },
        Error::Json(e) => TransportError::NoResponse(format!("malformed response: {e}")),
        Error::InvalidBaseUrl(url) => TransportError::NoResponse(format!("invalid base URL: {url}")),
    }
}
