//! # Service-binding facility.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::BindError;

/// Live connection handed out by a [`ServiceBinder`].
///
/// The binder cancels `lost` when the connection drops on its side.
pub struct Binding<S: ?Sized> {
    service: Arc<S>,
    lost: CancellationToken,
}

impl<S: ?Sized> Binding<S> {
    pub fn new(service: Arc<S>, lost: CancellationToken) -> Self {
        Self { service, lost }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub(crate) fn into_parts(self) -> (Arc<S>, CancellationToken) {
        (self.service, self.lost)
    }
}

/// Platform facility that establishes and releases a connection to one
/// collaborator.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use kegcore::{BindError, Binding, ServiceBinder};
///
/// struct Thermostat;
///
/// struct LocalBinder;
///
/// #[async_trait]
/// impl ServiceBinder<Thermostat> for LocalBinder {
///     async fn connect(&self) -> Result<Binding<Thermostat>, BindError> {
///         Ok(Binding::new(Arc::new(Thermostat), CancellationToken::new()))
///     }
///
///     fn release(&self) {}
/// }
/// ```
#[async_trait]
pub trait ServiceBinder<S: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    /// Requests a connection; resolves when the connection is established.
    async fn connect(&self) -> Result<Binding<S>, BindError>;

    /// Releases the connection (or the pending request).
    ///
    /// May be called again for a connection that already failed or was lost.
    fn release(&self);

    /// Starts the collaborator's backing process before binding.
    ///
    /// Only called for supervised connections that manage the process.
    fn start_service(&self) {}

    /// Stops the collaborator's backing process after unbinding.
    ///
    /// Only called for supervised connections that manage the process.
    fn stop_service(&self) {}
}
