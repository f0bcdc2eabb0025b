//! Domain types for the access token dispatcher.

use crate::error::{HeimdallError, HeimdallResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Access tokens
// ---------------------------------------------------------------------------

/// Reference to the application a token belongs to. The API embeds the
/// whole application here; fields other than `id` are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppRef {
    pub id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppRef {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            extra: Map::new(),
        }
    }
}

/// An access token as exposed by the Heimdall API.
///
/// Only the fields this layer reads are typed. Anything else the backend
/// sends is kept in `extra` and written back untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessToken {
    /// Identifier, or `InvalidInput` for tokens that were never persisted.
    pub fn require_id(&self) -> HeimdallResult<u64> {
        self.id
            .ok_or_else(|| HeimdallError::InvalidInput("access token has no id".into()))
    }
}

/// List payload. The API answers paged queries with a page object; older
/// deployments return a bare array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPage {
    pub content: Vec<AccessToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for AccessTokenPage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Paged {
            #[serde(default)]
            content: Vec<AccessToken>,
            #[serde(default)]
            total_elements: Option<u64>,
            #[serde(flatten)]
            extra: Map<String, Value>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Bare(Vec<AccessToken>),
            Paged(Paged),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Bare(content) => Self {
                total_elements: Some(content.len() as u64),
                content,
                extra: Map::new(),
            },
            Wire::Paged(p) => Self {
                content: p.content,
                total_elements: p.total_elements,
                extra: p.extra,
            },
        })
    }
}

impl AccessTokenPage {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

pub const DEFAULT_OFFSET: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 10;

/// Pagination window sent as `offset`/`limit` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub offset: u64,
    pub limit: u64,
}

impl Query {
    /// Rejects `limit == 0`.
    pub fn new(offset: u64, limit: u64) -> HeimdallResult<Self> {
        if limit == 0 {
            return Err(HeimdallError::InvalidInput("limit must be positive".into()));
        }
        Ok(Self { offset, limit })
    }

    /// Default page size starting at `offset`.
    pub fn at_offset(offset: u64) -> Self {
        Self {
            offset,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// User-facing outcome message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            description: None,
        }
    }

    pub fn error(message: impl Into<String>, description: Option<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            description,
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Event consumed by a store. Serialized with the frontend's action type
/// constants so NDJSON output can be replayed into the web store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Signal {
    #[serde(rename = "ACCESS_TOKEN_LOADING")]
    LoadingStarted,
    #[serde(rename = "ACCESS_TOKEN_LOADING_FINISH")]
    LoadingFinished,
    #[serde(rename = "GET_ACCESS_TOKENS")]
    TokensLoaded {
        #[serde(rename = "accessTokens")]
        access_tokens: AccessTokenPage,
    },
    #[serde(rename = "CLEAR_ACCESS_TOKENS")]
    TokensCleared,
    #[serde(rename = "GET_ACCESS_TOKEN")]
    TokenLoaded {
        #[serde(rename = "accessToken")]
        access_token: AccessToken,
    },
    #[serde(rename = "CLEAR_ACCESS_TOKEN")]
    TokenCleared,
    #[serde(rename = "ACCESS_TOKEN_NOTIFICATION")]
    NotificationPosted { notification: Notification },
}

impl Signal {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadingStarted => "loading-start",
            Self::LoadingFinished => "loading-finish",
            Self::TokensLoaded { .. } => "tokens-loaded",
            Self::TokensCleared => "tokens-cleared",
            Self::TokenLoaded { .. } => "token-loaded",
            Self::TokenCleared => "token-cleared",
            Self::NotificationPosted { .. } => "notification-posted",
        }
    }
}
