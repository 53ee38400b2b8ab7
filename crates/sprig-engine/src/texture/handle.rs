use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread;

use super::Texture;

/// Observable load state of an [`ImageHandle`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageStatus {
    /// Still decoding (or never completed).
    Loading,
    /// Decoded; natural size is known.
    Ready { width: u32, height: u32 },
    /// Decoding failed. Terminal.
    Failed,
}

#[derive(Debug)]
enum Outcome {
    Ready(Texture),
    Failed(String),
}

/// Shared reference to an image that becomes available at most once.
///
/// Cloning is cheap and every clone observes the same transition. The
/// transition itself is performed by the single [`ImageLoader`] paired with
/// the handle, or happens at construction for already-decoded textures.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    slot: Arc<OnceLock<Outcome>>,
}

/// Write side of a pending [`ImageHandle`].
///
/// Completing consumes the loader, so the handle transitions exactly once.
/// Dropping it without completing leaves the handle `Loading` forever.
#[derive(Debug)]
pub struct ImageLoader {
    slot: Arc<OnceLock<Outcome>>,
}

impl ImageHandle {
    /// A handle that is ready from the start.
    pub fn ready(texture: Texture) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(Outcome::Ready(texture));
        Self { slot: Arc::new(slot) }
    }

    /// A `Loading` handle and the loader that will complete it.
    pub fn pending() -> (Self, ImageLoader) {
        let slot = Arc::new(OnceLock::new());
        (
            Self { slot: Arc::clone(&slot) },
            ImageLoader { slot },
        )
    }

    /// Starts decoding `path` on a background thread and returns immediately.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let (handle, loader) = Self::pending();
        let path: PathBuf = path.as_ref().to_path_buf();

        let spawned = thread::Builder::new()
            .name("sprig-image-decode".to_string())
            .spawn(move || match Texture::open(&path) {
                Ok(texture) => {
                    log::debug!(
                        "decoded {} ({}x{})",
                        path.display(),
                        texture.width(),
                        texture.height()
                    );
                    loader.complete(texture);
                }
                Err(e) => {
                    log::warn!("failed to load image {}: {e}", path.display());
                    loader.fail(e.to_string());
                }
            });

        if let Err(e) = spawned {
            log::warn!("failed to spawn image decode thread: {e}");
            return Self::failed(e.to_string());
        }

        handle
    }

    fn failed(reason: String) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(Outcome::Failed(reason));
        Self { slot: Arc::new(slot) }
    }

    pub fn status(&self) -> ImageStatus {
        match self.slot.get() {
            None => ImageStatus::Loading,
            Some(Outcome::Ready(t)) => ImageStatus::Ready {
                width: t.width(),
                height: t.height(),
            },
            Some(Outcome::Failed(_)) => ImageStatus::Failed,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self.slot.get(), Some(Outcome::Ready(_)))
    }

    /// The decoded texture once ready.
    #[inline]
    pub fn texture(&self) -> Option<&Texture> {
        match self.slot.get() {
            Some(Outcome::Ready(t)) => Some(t),
            _ => None,
        }
    }

    /// Failure reason once failed.
    pub fn error(&self) -> Option<&str> {
        match self.slot.get() {
            Some(Outcome::Failed(reason)) => Some(reason),
            _ => None,
        }
    }
}

impl From<Texture> for ImageHandle {
    fn from(texture: Texture) -> Self {
        Self::ready(texture)
    }
}

impl ImageLoader {
    pub fn complete(self, texture: Texture) {
        let _ = self.slot.set(Outcome::Ready(texture));
    }

    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.slot.set(Outcome::Failed(reason.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_transitions_once_to_ready() {
        let (handle, loader) = ImageHandle::pending();
        let observer = handle.clone();
        assert_eq!(handle.status(), ImageStatus::Loading);
        assert!(handle.texture().is_none());

        loader.complete(Texture::solid(8, 4, [0; 4]));

        assert_eq!(observer.status(), ImageStatus::Ready { width: 8, height: 4 });
        assert!(observer.is_ready());
    }

    #[test]
    fn failure_is_terminal() {
        let (handle, loader) = ImageHandle::pending();
        loader.fail("truncated file");
        assert_eq!(handle.status(), ImageStatus::Failed);
        assert_eq!(handle.error(), Some("truncated file"));
        assert!(!handle.is_ready());
    }

    #[test]
    fn dropped_loader_leaves_loading() {
        let (handle, loader) = ImageHandle::pending();
        drop(loader);
        assert_eq!(handle.status(), ImageStatus::Loading);
    }

    #[test]
    fn open_missing_file_eventually_fails() {
        let handle = ImageHandle::open("/definitely/not/here.png");
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while handle.status() == ImageStatus::Loading && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(handle.status(), ImageStatus::Failed);
    }
}
