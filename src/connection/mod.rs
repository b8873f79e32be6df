//! # Connection supervision for the two bound collaborators.
//!
//! Each collaborator (API provider, hardware provider) is reached through a
//! connection that the platform hands out asynchronously.
//!
//! ## State machine
//! ```text
//!            bind()                 Connected{epoch}
//! Unbound ───────────► Binding ─────────────────────► Bound
//!    ▲                    │                             │
//!    │   unbind() / Failed{epoch}                       │ unbind() / Lost{epoch}
//!    └────────────────────┴─────────────────────────────┘
//! ```
//!
//! - [`Connection`] the state cell shared with queued tasks (`require()` gives
//!   the live handle or `TaskError::Unbound`)
//! - [`ServiceBinder`], [`Binding`] the platform's service-binding facility
//! - [`Supervised`] bind/unbind driver; connection callbacks come back as
//!   [`Lifecycle`] messages and are applied by the core controller, so every
//!   transition happens on one task
//!
//! ## Rules
//! - `bind()` is a no-op while `Binding` or `Bound`; `unbind()` is a no-op while `Unbound`.
//! - Every bind attempt gets a fresh epoch; callbacks carrying an older epoch are ignored.
//! - There is no automatic reconnect after `Lost`.

mod binder;
mod state;
mod supervised;

pub use binder::{Binding, ServiceBinder};
pub use state::{Connection, ConnectionState};
pub use supervised::{Lifecycle, Supervised, Transition};
