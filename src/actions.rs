//! Save and share actions for liked cats

use crate::cache::ItemCache;
use crate::domain::Item;
use crate::error::{CatswpError, Result};
use arboard::Clipboard;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SHARE_TITLE: &str = "Cat";

/// Writes the item's image bytes to `dir/kitty_<id>.<ext>`
pub fn save_item(cache: &ItemCache, item: &Item, dir: &Path) -> Result<PathBuf> {
    let bytes = cache.bytes(item.display).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("Image for cat {} is no longer loaded", item.id),
        )
    })?;

    fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "kitty_{}.{}",
        item.id,
        cache.extension(item.display)
    ));
    fs::write(&path, bytes)?;

    info!(id = %item.id, path = %path.display(), "Saved cat");
    Ok(path)
}

/// A platform share facility
pub trait NativeShare {
    fn share(&self, title: &str, link: &str) -> Result<()>;
}

/// Somewhere text can be copied to
pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Hands the link to the system's default handler (usually the browser)
#[derive(Debug, Default)]
pub struct OpenLinkShare;

impl NativeShare for OpenLinkShare {
    fn share(&self, _title: &str, link: &str) -> Result<()> {
        open::that(link).map_err(|e| CatswpError::Share(e.to_string()))
    }
}

/// System clipboard, connected on first use
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            let clipboard = Clipboard::new().map_err(|e| CatswpError::Clipboard(e.to_string()))?;
            self.clipboard = Some(clipboard);
        }

        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| CatswpError::Clipboard(e.to_string())),
            None => Err(CatswpError::Clipboard("not connected".to_string())),
        }
    }
}

/// What a share attempt ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The native share facility took the link
    Shared,
    /// The link was copied to the clipboard
    Copied,
    /// Neither worked; the link is reported so the user can copy it by hand
    Unavailable { link: String, reason: String },
}

impl ShareOutcome {
    /// Message for the notice line
    pub fn notice(&self) -> String {
        match self {
            ShareOutcome::Shared => "Shared!".to_string(),
            ShareOutcome::Copied => "Link copied!".to_string(),
            ShareOutcome::Unavailable { link, reason } => {
                format!("Could not share ({}): {}", reason, link)
            }
        }
    }
}

/// Shares links natively when possible, falling back to the clipboard
pub struct Sharer {
    native: Option<Box<dyn NativeShare>>,
    clipboard: Box<dyn ClipboardSink>,
}

impl Sharer {
    pub fn new(native: Option<Box<dyn NativeShare>>, clipboard: Box<dyn ClipboardSink>) -> Self {
        Self { native, clipboard }
    }

    /// Platform sharer: opening links is opt-in, the clipboard is always the fallback
    pub fn system(open_links: bool) -> Self {
        let native: Option<Box<dyn NativeShare>> = if open_links {
            Some(Box::new(OpenLinkShare))
        } else {
            None
        };
        Self::new(native, Box::new(SystemClipboard::default()))
    }

    pub fn has_native(&self) -> bool {
        self.native.is_some()
    }

    pub fn share(&mut self, item: &Item) -> ShareOutcome {
        let link = item.source_reference.as_str();

        if let Some(native) = &self.native {
            match native.share(SHARE_TITLE, link) {
                Ok(()) => {
                    info!(id = %item.id, "Shared cat");
                    return ShareOutcome::Shared;
                }
                Err(e) => warn!(id = %item.id, error = %e, "Native share failed, trying clipboard"),
            }
        }

        match self.clipboard.copy(link) {
            Ok(()) => {
                info!(id = %item.id, "Copied cat link");
                ShareOutcome::Copied
            }
            Err(e) => {
                warn!(id = %item.id, error = %e, "Clipboard unavailable");
                ShareOutcome::Unavailable {
                    link: link.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
