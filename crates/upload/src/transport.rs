//! Transport trait between the scheduler and the content backend.
//!
//! The console app implements this on top of the HTTP client. Keeping the
//! scheduler behind a trait makes it testable with in-memory mocks.

use std::future::Future;
use std::pin::Pin;

use gallerydesk_transfer::ChunkDescriptor;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

/// Boxed future returned by [`ContainerTransport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// Requests the upload pipeline issues against a container.
///
/// Every call receives the token of its attempt. Implementations should abort
/// the underlying request when it fires and return
/// [`TransportError::Cancelled`].
pub trait ContainerTransport: Send + Sync {
    /// Current number of items in the container.
    fn item_count<'a>(
        &'a self,
        container_id: &'a str,
        cancel: CancellationToken,
    ) -> TransportFuture<'a, u64>;

    /// Uploads one chunk. `Ok` means the backend accepted it (2xx).
    fn send_chunk<'a>(
        &'a self,
        chunk: &'a ChunkDescriptor,
        cancel: CancellationToken,
    ) -> TransportFuture<'a, ()>;
}
