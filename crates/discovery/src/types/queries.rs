//! Query parameter types for API endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::handlers::pagination::default_limit;

/// Discovery feed query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DiscoveryQuery {
    /// One of `chechnya`, `russia`, `europe`, `other`. Falls back to the
    /// viewer's stored preference.
    pub region: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
