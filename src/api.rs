//! # Remote-API collaborator contract.
//!
//! The concrete HTTP client lives outside this crate. The core relies on two
//! kinds of calls:
//! - **awaited** (`authenticate_user`, `get_all_taps`): the queue worker waits
//!   for the answer, which holds the lane for the duration of the call;
//! - **fire-and-forget** (`record_temperature_async`, `record_drink_async`): the
//!   implementation must hand the request off and return immediately. These are
//!   at-most-once; the core never retries them.

use async_trait::async_trait;
use url::Url;

use crate::error::ApiError;
use crate::model::{Flow, RecordTemperatureRequest, TapDetailSet, UserDetail};

/// Handle to the remote-API provider, valid while its connection is `Bound`.
#[async_trait]
pub trait ApiProvider: Send + Sync + 'static {
    /// Sets the base address used by subsequent calls.
    fn set_api_url(&self, url: &Url);

    /// Sets the credential used by subsequent calls.
    fn set_api_key(&self, key: &str);

    /// Resolves a token presented at a tap to a user.
    async fn authenticate_user(
        &self,
        auth_device: &str,
        token_value: &str,
    ) -> Result<UserDetail, ApiError>;

    /// Fetches the authoritative tap list.
    async fn get_all_taps(&self) -> Result<TapDetailSet, ApiError>;

    /// Hands off a temperature sample. Must not block.
    fn record_temperature_async(&self, request: RecordTemperatureRequest);

    /// Hands off a completed pour. Must not block.
    ///
    /// This is the only durability point for a pour.
    fn record_drink_async(&self, flow: Flow);
}
