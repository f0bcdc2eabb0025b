//! Token service abstraction and its HTTP implementation.

pub mod http;

use async_trait::async_trait;
use heimdall_core::error::HeimdallResult;
use heimdall_core::{AccessToken, AccessTokenPage, Query};

pub use http::HttpTokenService;

/// CRUD access to the access token resource.
#[async_trait]
pub trait TokenService: Send + Sync {
    async fn list(&self, query: &Query) -> HeimdallResult<AccessTokenPage>;
    async fn get(&self, id: u64) -> HeimdallResult<AccessToken>;
    async fn create(&self, token: &AccessToken) -> HeimdallResult<AccessToken>;
    async fn update(&self, token: &AccessToken) -> HeimdallResult<AccessToken>;
    async fn delete(&self, id: u64) -> HeimdallResult<()>;
}
