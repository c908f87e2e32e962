//! Image sources: where cards come from

use crate::error::{CatswpError, Result};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Placeholder in a URL template that is replaced by a fresh random number per request
pub const CACHE_BUSTER: &str = "{rand}";

/// Default endpoint, answering every request with a random cat
pub const DEFAULT_SOURCE_URL: &str = "https://cataas.com/cat?width=400&height=500&rand={rand}";

/// Raw bytes for one slot of a batch
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// The URL that produced these bytes
    pub source_reference: String,
    pub bytes: Vec<u8>,
}

/// Supplies one image per batch slot
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, slot: usize) -> Result<FetchedImage>;
}

/// Fetches images with a plain HTTP GET against a templated URL
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
    template: String,
}

impl HttpImageSource {
    pub fn new(template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            template: template.into(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Expands the cache-busting placeholder. Templates without one get a `rand` query parameter.
pub fn expand_template(template: &str, nonce: f64) -> String {
    if template.contains(CACHE_BUSTER) {
        template.replace(CACHE_BUSTER, &nonce.to_string())
    } else if template.contains('?') {
        format!("{}&rand={}", template, nonce)
    } else {
        format!("{}?rand={}", template, nonce)
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, slot: usize) -> Result<FetchedImage> {
        let url = expand_template(&self.template, rand::random::<f64>());
        debug!(slot, %url, "Fetching image");

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatswpError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response.bytes().await?.to_vec();
        debug!(slot, size = bytes.len(), "Image received");

        Ok(FetchedImage {
            source_reference: url,
            bytes,
        })
    }
}


/// In-memory source for tests: every slot yields a tiny PNG unless marked as failing
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn png_bytes(shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 6, Rgb([shade, 128, 255 - shade]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)
            .expect("encoding a tiny png cannot fail");
        out.into_inner()
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakeSource {
        pub failing: HashSet<usize>,
        pub garbage: HashSet<usize>,
        pub delay: Option<Duration>,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn failing(slots: &[usize]) -> Self {
            Self {
                failing: slots.iter().copied().collect(),
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageSource for FakeSource {
        async fn fetch(&self, slot: usize) -> Result<FetchedImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let url = format!("https://cats.test/cat/{}", slot);
            if self.failing.contains(&slot) {
                return Err(CatswpError::Status { status: 500, url });
            }
            let bytes = if self.garbage.contains(&slot) {
                b"definitely not an image".to_vec()
            } else {
                png_bytes((slot as u8).wrapping_mul(20))
            };
            Ok(FetchedImage {
                source_reference: url,
                bytes,
            })
        }
    }
}
