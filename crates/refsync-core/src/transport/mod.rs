//! Per-checkout transport sessions.
//!
//! A [`TransportSession`] binds a target URL to the credentials, proxy policy
//! and cancellation flag used for one checkout. Sessions are registered in a
//! [`SessionRegistry`] under the caller's transport id for exactly the
//! duration of the operation; the [`SessionGuard`] returned by registration
//! removes the entry when dropped, on every exit path.
//!
//! git2 accepts callbacks as closures, so the session is handed to the
//! transport directly through [`TransportSession::fetch_options`] and
//! [`TransportSession::remote_callbacks`] instead of being looked up by id
//! from inside the transport.

mod auth;
mod cancel;
mod registry;
mod session;

pub use auth::{AuthOptions, derive_transport_id};
pub use cancel::Cancellation;
pub use registry::{SessionGuard, SessionRegistry};
pub use session::{ProxyPolicy, TransportSession};
