//! Rasterized panel images handed to the renderer

use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one synthesized image
///
/// The GPU texture cache is keyed by this id: an id it has not seen is
/// uploaded once, and an id no frame references is evicted. Changing the
/// image means issuing a new `PanelTexture`, never mutating one in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    /// Issue a new id; ids are never reused
    pub fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A finished panel image ready for GPU upload
///
/// Every synthesis call produces a new `PanelTexture` with a fresh id; the
/// renderer uploads any id it has not seen and never diffs contents.
#[derive(Debug, Clone)]
pub struct PanelTexture {
    id: TextureId,
    image: RgbaImage,
}

impl PanelTexture {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            id: TextureId::next(),
            image,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_texture_gets_a_fresh_id() {
        let a = PanelTexture::new(RgbaImage::new(4, 4));
        let b = PanelTexture::new(RgbaImage::new(4, 4));
        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
        assert_eq!((b.width(), b.height()), (4, 4));
    }
}
