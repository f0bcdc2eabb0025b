//! Access token dispatcher, store and navigator collaborators, and reporting.

pub mod dispatcher;
pub mod navigator;
pub mod reporter;
pub mod store;

pub use dispatcher::{AccessTokenDispatcher, TOKENS_PATH};
pub use navigator::{Navigator, RecordingNavigator};
pub use store::{ChannelStore, JsonStreamStore, RecordingStore, Store};
