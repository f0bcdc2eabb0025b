//! Domain models, signals, and error definitions.
//!
//! Foundation crate -- no async or I/O dependencies.

pub mod error;
pub mod types;

pub use error::{ErrorBody, HeimdallError, HeimdallResult};
pub use types::{
    AccessToken, AccessTokenPage, AppRef, Notification, NotificationKind, Query, Signal,
};
