use std::time::Duration;

use super::{DecodedImage, MediaError, MediaResult};

/// HTTP client whose requests give up after `timeout`. A stalled fetch then
/// surfaces as [`MediaError::Fetch`].
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            log::warn!("Failed to build HTTP client with timeouts: {err}");
            reqwest::Client::default()
        })
}

/// Plain GET of a demo image URL. Non-2xx responses count as failures.
pub async fn fetch_remote_image(client: &reqwest::Client, url: &str) -> MediaResult<DecodedImage> {
    let fetch_error = |source: reqwest::Error| MediaError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_error)?;
    let bytes = response.bytes().await.map_err(fetch_error)?;

    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|_| MediaError::Unavailable {
            handle: url.to_string(),
        })?
        .map_err(|source| MediaError::RemoteDecode {
            url: url.to_string(),
            source,
        })?;

    log::debug!("Loaded remote image from {url}");
    Ok(image.into())
}
