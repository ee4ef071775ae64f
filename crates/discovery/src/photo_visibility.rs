//! Photo visibility policy.
//!
//! Decides whether a viewer may receive the original image of a photo or only
//! its blurred variant. The caller pre-computes the relationship flags from
//! the match and grant tables; nothing here performs lookups.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Per-photo visibility mode.
///
/// Stored values that are not one of the known modes read as
/// [`VisibilityMode::Unrecognized`] and deny access to non-owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum VisibilityMode {
    Public,
    MatchOnly,
    Whitelist,
    BlurredUntilMatch,
    Unrecognized,
}

impl VisibilityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityMode::Public => "public",
            VisibilityMode::MatchOnly => "match_only",
            VisibilityMode::Whitelist => "whitelist",
            VisibilityMode::BlurredUntilMatch => "blurred_until_match",
            VisibilityMode::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for VisibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for VisibilityMode {
    fn from(value: &str) -> Self {
        match value {
            "public" => VisibilityMode::Public,
            "match_only" => VisibilityMode::MatchOnly,
            "whitelist" => VisibilityMode::Whitelist,
            "blurred_until_match" => VisibilityMode::BlurredUntilMatch,
            _ => VisibilityMode::Unrecognized,
        }
    }
}

impl From<String> for VisibilityMode {
    fn from(value: String) -> Self {
        VisibilityMode::from(value.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown visibility mode: {0}")]
pub struct UnknownVisibilityMode(pub String);

/// Strict parsing for write paths: only the four known modes are accepted.
impl FromStr for VisibilityMode {
    type Err = UnknownVisibilityMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match VisibilityMode::from(s) {
            VisibilityMode::Unrecognized => Err(UnknownVisibilityMode(s.to_string())),
            mode => Ok(mode),
        }
    }
}

/// Asset variant served to a viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PhotoVariant {
    #[default]
    Original,
    Blur,
}

/// Viewer relationship to a photo, resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoAccessContext {
    pub mode: VisibilityMode,
    pub is_owner: bool,
    pub has_match: bool,
    /// Viewer holds an unexpired grant for this photo.
    pub has_whitelist: bool,
}

/// Whether the viewer may receive the original image.
///
/// Owners always can. Unrecognized modes deny everyone else.
pub fn can_access_original(ctx: &PhotoAccessContext) -> bool {
    if ctx.is_owner {
        return true;
    }

    match ctx.mode {
        VisibilityMode::Public => true,
        VisibilityMode::MatchOnly | VisibilityMode::BlurredUntilMatch => ctx.has_match,
        VisibilityMode::Whitelist => ctx.has_whitelist,
        VisibilityMode::Unrecognized => false,
    }
}

/// Pick the variant to deliver. A denied original degrades to the blur
/// variant instead of failing.
pub fn select_variant(requested: PhotoVariant, can_access_original: bool) -> PhotoVariant {
    match requested {
        PhotoVariant::Blur => PhotoVariant::Blur,
        PhotoVariant::Original if can_access_original => PhotoVariant::Original,
        PhotoVariant::Original => PhotoVariant::Blur,
    }
}
