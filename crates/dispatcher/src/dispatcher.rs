//! Access token action dispatcher.
//!
//! Each operation turns one caller intent into a fixed sequence of store
//! signals, token service calls, and navigation. Operations that talk to the
//! service are `async`; callers that must not wait spawn them:
//!
//! ```ignore
//! let d = dispatcher.clone();
//! tokio::spawn(async move { d.save_token(&token).await });
//! ```
//!
//! Overlapping calls are not sequenced: their signals interleave in whatever
//! order the service answers.

use crate::navigator::Navigator;
use crate::store::Store;
use heimdall_core::error::{HeimdallError, HeimdallResult};
use heimdall_core::{AccessToken, Notification, Query, Signal};
use heimdall_provider::TokenService;
use std::sync::Arc;

/// Location shown after a token is created.
pub const TOKENS_PATH: &str = "/tokens";

pub const SAVED_MESSAGE: &str = "Access Token saved";
pub const UPDATED_MESSAGE: &str = "Access Token updated";
pub const REMOVED_MESSAGE: &str = "Access Token removed";
pub const ERROR_MESSAGE: &str = "Error";

/// Dispatches access token actions against explicit collaborators.
#[derive(Clone)]
pub struct AccessTokenDispatcher {
    service: Arc<dyn TokenService>,
    store: Arc<dyn Store>,
    navigator: Arc<dyn Navigator>,
}

impl AccessTokenDispatcher {
    pub fn new(
        service: Arc<dyn TokenService>,
        store: Arc<dyn Store>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            service,
            store,
            navigator,
        }
    }

    fn emit(&self, signal: Signal) {
        tracing::trace!(signal = signal.name(), "dispatch");
        self.store.dispatch(signal);
    }

    pub fn start_loading(&self) {
        self.emit(Signal::LoadingStarted);
    }

    pub fn finish_loading(&self) {
        self.emit(Signal::LoadingFinished);
    }

    /// Fetch one page and publish it.
    ///
    /// Failures emit nothing and are returned to the caller.
    pub async fn list_tokens(&self, query: Query) -> HeimdallResult<()> {
        let page = self.service.list(&query).await?;
        self.emit(Signal::TokensLoaded {
            access_tokens: page,
        });
        self.finish_loading();
        Ok(())
    }

    pub fn clear_tokens(&self) {
        self.emit(Signal::TokensCleared);
    }

    /// Fetch one token and publish it.
    ///
    /// Failures are logged and dropped: no notification, no loading change.
    pub async fn get_token(&self, id: u64) {
        match self.service.get(id).await {
            Ok(token) => self.emit(Signal::TokenLoaded {
                access_token: token,
            }),
            Err(e) => tracing::warn!(id, error = %e, "failed to fetch access token"),
        }
    }

    pub fn clear_token(&self) {
        self.emit(Signal::TokenCleared);
    }

    pub fn notify(&self, notification: Notification) {
        self.emit(Signal::NotificationPosted { notification });
    }

    /// Create a token, then announce it and go back to the token list.
    pub async fn save_token(&self, token: &AccessToken) {
        match self.service.create(token).await {
            Ok(created) => {
                tracing::info!(id = ?created.id, "access token saved");
                self.notify(Notification::success(SAVED_MESSAGE));
                self.navigator.navigate(TOKENS_PATH);
                self.finish_loading();
            }
            Err(e) => self.handle_write_failure("save", &e),
        }
    }

    /// Update a token, refresh the detail view, then announce it.
    pub async fn update_token(&self, token: &AccessToken) {
        match self.service.update(token).await {
            Ok(_) => {
                match token.id {
                    Some(id) => self.get_token(id).await,
                    None => tracing::warn!("updated access token has no id; skipping refresh"),
                }
                self.notify(Notification::success(UPDATED_MESSAGE));
                self.finish_loading();
            }
            Err(e) => self.handle_write_failure("update", &e),
        }
    }

    /// Delete a token, refresh the list page at `offset`, then announce it.
    ///
    /// A failed delete emits nothing and is returned to the caller. A failed
    /// refresh is logged; the removal is still announced.
    pub async fn remove_token(&self, id: u64, offset: u64) -> HeimdallResult<()> {
        self.service.delete(id).await?;
        tracing::info!(id, "access token removed");

        if let Err(e) = self.list_tokens(Query::at_offset(offset)).await {
            tracing::warn!(id, offset, error = %e, "failed to refresh access tokens after removal");
        }
        self.notify(Notification::success(REMOVED_MESSAGE));
        Ok(())
    }

    /// Validation rejections reach the user; everything else is only logged.
    /// Loading always ends.
    fn handle_write_failure(&self, action: &'static str, err: &HeimdallError) {
        tracing::warn!(action, status = ?err.status(), error = %err, "access token request failed");
        if err.is_validation() {
            self.notify(Notification::error(
                ERROR_MESSAGE,
                err.body_message().map(str::to_string),
            ));
        }
        self.finish_loading();
    }
}
