//! Remote image-asset host client.
//!
//! Uploads happen out-of-band in the admin UI; this backend stores the
//! returned asset reference and is responsible for destroying assets when
//! entities drop them. Destruction is fire-and-forget: failures are logged
//! and never surface to the owning save or delete.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Transform preset applied by the asset host on upload.
#[derive(Debug, Clone, Serialize)]
pub struct ImageUploadProfile {
    /// Host-side grouping tags.
    pub tags: Vec<&'static str>,

    pub width: u32,

    pub height: u32,

    /// Host crop mode.
    pub crop: &'static str,

    /// Derived variants rendered eagerly on upload.
    pub variants: Vec<&'static str>,
}

impl ImageUploadProfile {
    /// The shared 1000x1000 limit-crop profile with front and thumb variants.
    pub fn standard(tag: &'static str) -> Self {
        Self {
            tags: vec![tag],
            width: 1000,
            height: 1000,
            crop: "limit",
            variants: vec!["front", "thumb"],
        }
    }
}

/// Client for the remote asset host.
///
/// Cheap to clone: the inner HTTP client is reference-counted.
#[derive(Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl ImageHost {
    /// Create a new client. With no endpoint configured, destruction
    /// degrades to a logged no-op.
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint,
            api_key,
        }
    }

    /// Whether a stored reference names a hosted asset.
    ///
    /// References containing `/` are plain paths served elsewhere and must
    /// never be sent to the host for destruction.
    pub fn is_hosted_reference(reference: &str) -> bool {
        !reference.contains('/')
    }

    /// Ask the host to destroy an asset.
    pub async fn destroy(&self, reference: &str) -> Result<()> {
        let Some(endpoint) = &self.endpoint else {
            debug!(reference, "image host not configured, skipping destruction");
            return Ok(());
        };

        let mut request = self
            .client
            .post(format!("{endpoint}/destroy"))
            .json(&serde_json::json!({ "public_id": reference }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("failed to reach image host")?;
        response
            .error_for_status()
            .context("image host rejected destruction")?;

        Ok(())
    }

    /// Destroy an asset in the background.
    ///
    /// Path-style references are skipped outright. The spawned task logs the
    /// outcome; callers never observe a failure.
    pub fn destroy_detached(&self, reference: String) {
        if !Self::is_hosted_reference(&reference) {
            debug!(reference, "stored image is a path, skipping asset destruction");
            return;
        }

        let host = self.clone();
        tokio::spawn(async move {
            match host.destroy(&reference).await {
                Ok(()) => info!(reference, "image asset destroyed"),
                Err(e) => warn!(reference, error = %e, "image asset destruction failed"),
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn path_references_are_not_hosted() {
        assert!(!ImageHost::is_hosted_reference("2019/05/portrait.jpg"));
        assert!(!ImageHost::is_hosted_reference("/legacy.png"));
        assert!(ImageHost::is_hosted_reference("conf-asset-ab12cd"));
    }

    #[tokio::test]
    async fn unconfigured_host_destroys_as_noop() {
        let host = ImageHost::new(None, None);
        assert!(host.destroy("conf-asset-ab12cd").await.is_ok());
    }

    #[test]
    fn standard_profile_is_shared_shape() {
        let profile = ImageUploadProfile::standard("agendas");
        assert_eq!(profile.width, 1000);
        assert_eq!(profile.crop, "limit");
        assert_eq!(profile.variants, vec!["front", "thumb"]);
    }
}
