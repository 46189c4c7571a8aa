//! Refsync Core Library
//!
//! Resolves a branch, tag, exact commit or semantic version constraint
//! against a remote git repository and materializes it in a local working
//! tree, reporting the commit that was checked out.

pub mod checkout;
pub mod config;
pub mod error;
pub mod git;
pub mod options;
pub mod transport;
pub mod version;

/// Re-exports of commonly used types
pub mod prelude {
    // Checkout
    pub use crate::checkout::{Checkout, parse_commit_id};
    pub use crate::options::{CheckoutIntent, CheckoutOptions, DEFAULT_BRANCH};

    // Configuration
    pub use crate::config::{AuthConfig, RefsyncConfig, SourceConfig};

    // Errors
    pub use crate::error::CheckoutError;

    // Git
    pub use crate::git::{ResolvedCommit, Signature, TagCatalog, TagEntry};

    // Transport
    pub use crate::transport::{AuthOptions, Cancellation, SessionRegistry, derive_transport_id};

    // Version
    pub use crate::version::{SemverConstraint, select_latest};
}
