//! Item cache: fetches a batch concurrently and owns every card's image data
//!
//! Failed slots are logged and left out of the batch, so a session may hold fewer cards
//! than requested. Item ids stay equal to their slot, which means ids can have gaps.

use crate::domain::{DisplayHandle, Item};
use crate::error::{CatswpError, Result};
use crate::source::ImageSource;
use futures::future::join_all;
use image::{DynamicImage, ImageFormat};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Extension used when the image format cannot be sniffed
const FALLBACK_EXTENSION: &str = "jpg";

/// A fetched image that decoded successfully
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub source_reference: String,
    pub bytes: Vec<u8>,
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

/// A slot that produced no card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFailure {
    pub slot: usize,
    pub reason: String,
}

/// What happened to each slot of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub requested: usize,
    pub loaded: usize,
    pub failures: Vec<SlotFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of one batch load, tagged with the session epoch that asked for it
#[derive(Debug)]
pub struct LoadedBatch {
    pub epoch: u64,
    /// Successful slots in slot order
    pub images: Vec<(usize, DecodedImage)>,
    pub report: LoadReport,
}

/// Fetches `count` images concurrently and waits for all of them
pub async fn fetch_batch(source: &dyn ImageSource, count: usize, epoch: u64) -> LoadedBatch {
    let fetches = (0..count).map(|slot| async move {
        let result = fetch_and_decode(source, slot).await;
        (slot, result)
    });
    let results = join_all(fetches).await;

    let mut images = Vec::with_capacity(count);
    let mut failures = Vec::new();
    for (slot, result) in results {
        match result {
            Ok(decoded) => images.push((slot, decoded)),
            Err(e) => {
                warn!(slot, error = %e, "Dropping slot from batch");
                failures.push(SlotFailure {
                    slot,
                    reason: e.to_string(),
                });
            }
        }
    }

    let report = LoadReport {
        requested: count,
        loaded: images.len(),
        failures,
    };
    info!(
        epoch,
        requested = report.requested,
        loaded = report.loaded,
        "Batch fetched"
    );

    LoadedBatch {
        epoch,
        images,
        report,
    }
}

async fn fetch_and_decode(source: &dyn ImageSource, slot: usize) -> Result<DecodedImage> {
    let fetched = source.fetch(slot).await?;
    let bytes = fetched.bytes;

    // Decoding is CPU bound
    let (bytes, image, format) = tokio::task::spawn_blocking(move || decode(bytes))
        .await
        .map_err(|e| CatswpError::Task(e.to_string()))??;

    Ok(DecodedImage {
        source_reference: fetched.source_reference,
        bytes,
        image,
        format,
    })
}

fn decode(bytes: Vec<u8>) -> Result<(Vec<u8>, DynamicImage, Option<ImageFormat>)> {
    let format = image::guess_format(&bytes).ok();
    let image = image::load_from_memory(&bytes)?;
    Ok((bytes, image, format))
}

#[derive(Debug)]
struct CachedImage {
    bytes: Vec<u8>,
    image: DynamicImage,
    format: Option<ImageFormat>,
}

/// Owner of every live display handle
#[derive(Debug, Default)]
pub struct ItemCache {
    entries: HashMap<DisplayHandle, CachedImage>,
    next_handle: u64,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loaded batch and returns its items in slot order
    pub fn admit(&mut self, batch: LoadedBatch) -> Vec<Item> {
        batch
            .images
            .into_iter()
            .map(|(slot, decoded)| {
                let handle = DisplayHandle::new(self.next_handle);
                self.next_handle += 1;
                self.entries.insert(
                    handle,
                    CachedImage {
                        bytes: decoded.bytes,
                        image: decoded.image,
                        format: decoded.format,
                    },
                );
                Item::new(slot, decoded.source_reference, handle)
            })
            .collect()
    }

    /// Frees the item's image data. Only the first call for a handle does anything.
    pub fn release(&mut self, item: &Item) -> bool {
        self.release_handle(item.display)
    }

    pub fn release_handle(&mut self, handle: DisplayHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Frees every live handle and returns how many there were
    pub fn release_all(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        if released > 0 {
            debug!(released, "Released display handles");
        }
        released
    }

    pub fn image(&self, handle: DisplayHandle) -> Option<&DynamicImage> {
        self.entries.get(&handle).map(|entry| &entry.image)
    }

    pub fn bytes(&self, handle: DisplayHandle) -> Option<&[u8]> {
        self.entries.get(&handle).map(|entry| entry.bytes.as_slice())
    }

    pub fn format(&self, handle: DisplayHandle) -> Option<ImageFormat> {
        self.entries.get(&handle).and_then(|entry| entry.format)
    }

    /// File extension matching the sniffed format
    pub fn extension(&self, handle: DisplayHandle) -> &'static str {
        self.format(handle)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or(FALLBACK_EXTENSION)
    }

    pub fn is_live(&self, handle: DisplayHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn live_handles(&self) -> usize {
        self.entries.len()
    }
}

impl Drop for ItemCache {
    fn drop(&mut self) {
        self.release_all();
    }
}
