use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::Method;
use object_store::{aws::AmazonS3Builder, path::Path, signer::Signer};
use time::OffsetDateTime;
use url::Url;

use crate::errors::AppError;

/// Issues short-lived download links for photo variants.
#[derive(Clone, Debug)]
pub struct ObjectStoreService {
    signer: Arc<dyn Signer>,
}

impl ObjectStoreService {
    /// S3-compatible bucket; credentials and endpoint come from the usual
    /// `AWS_*` environment variables.
    pub fn new_s3(bucket: &str) -> anyhow::Result<Self> {
        let s3 = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()?;
        Ok(Self {
            signer: Arc::new(s3),
        })
    }

    /// Development links rooted at `public_base_url`.
    pub fn new_local(public_base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            signer: Arc::new(LocalLinkSigner::new(public_base_url)?),
        })
    }

    pub async fn signed_get_url(
        &self,
        object_path: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        let path = Path::from(object_path);
        let url = self
            .signer
            .signed_url(Method::GET, &path, expires_in)
            .await?;
        Ok(url.to_string())
    }
}

/// Expiring links for local development. Not tamper-resistant.
#[derive(Debug)]
pub struct LocalLinkSigner {
    base: Url,
}

impl LocalLinkSigner {
    pub fn new(public_base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = public_base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base: Url::parse(&base)?,
        })
    }
}

#[async_trait]
impl Signer for LocalLinkSigner {
    async fn signed_url(
        &self,
        _method: Method,
        path: &Path,
        expires_in: Duration,
    ) -> object_store::Result<Url> {
        let mut url = self
            .base
            .join(path.as_ref())
            .map_err(|e| object_store::Error::Generic {
                store: "LocalLinkSigner",
                source: Box::new(e),
            })?;

        let expires = OffsetDateTime::now_utc().unix_timestamp() + expires_in.as_secs() as i64;
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string());
        Ok(url)
    }
}
