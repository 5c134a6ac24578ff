use std::{
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc
    }
};

use image::{imageops::FilterType, RgbaImage};

use crate::{
    error::{EngineError, Result},
    game::{
        math::Vector2F,
        object::Core
    },
    rendering::Canvas
};

use super::Draw;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(0);

/// Largest scaled width or height a sprite may have, in pixels.
///
/// Matches wgpu's default `max_texture_dimension_2d`.
pub const MAX_SPRITE_EXTENT: u32 = 8192;

/// Decoded, already scaled RGBA pixels.
///
/// Every image gets a process-unique `id`, which the renderer uses to cache
/// the uploaded GPU texture. Two images compare equal only if they share an id.
#[derive(Debug)]
pub struct SpriteImage {
    id: u64,
    pixels: RgbaImage,
}

impl SpriteImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            pixels,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl PartialEq for SpriteImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Image blitted centered on the owner's position.
///
/// The source image is decoded and scaled once, when the sprite is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    image: Arc<SpriteImage>,
    scale_factor: f32,
}

impl Sprite {
    /// Loads `<art_dir>/<name>` and scales it by `scale`.
    pub fn load<P: AsRef<Path>>(art_dir: P, name: &str, scale: f32) -> Result<Self> {
        let path = art_dir.as_ref().join(name);
        log::debug!("Loading sprite '{}'", path.display());

        let decoded = image::open(&path)
            .map_err(|source| EngineError::ResourceLoad { path: path.clone(), source })?;

        Self::from_image(decoded.to_rgba8(), scale)
    }

    pub fn from_image(source: RgbaImage, scale: f32) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(EngineError::invalid_argument(format!("sprite scale must be positive, got {scale}")));
        }

        if source.width() == 0 || source.height() == 0 {
            return Err(EngineError::invalid_argument("sprite image is empty"));
        }

        let scaled_width = scaled_extent(source.width(), scale)?;
        let scaled_height = scaled_extent(source.height(), scale)?;

        let pixels = if (scaled_width, scaled_height) == source.dimensions() {
            source
        } else {
            image::imageops::resize(&source, scaled_width, scaled_height, FilterType::Nearest)
        };

        Ok(Self {
            image: Arc::new(SpriteImage::new(pixels)),
            scale_factor: scale,
        })
    }

    pub fn image(&self) -> &Arc<SpriteImage> {
        &self.image
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn scaled_width(&self) -> u32 {
        self.image.width()
    }

    pub fn scaled_height(&self) -> u32 {
        self.image.height()
    }

    pub fn top_left_at(&self, center: Vector2F) -> Vector2F {
        let half_extent = Vector2F::new(
            (self.scaled_width() as f32 / 2.0).round_ties_even(),
            (self.scaled_height() as f32 / 2.0).round_ties_even()
        );
        center - half_extent
    }
}

fn scaled_extent(extent: u32, scale: f32) -> Result<u32> {
    let scaled = (extent as f64 * scale as f64).round_ties_even();
    if scaled > MAX_SPRITE_EXTENT as f64 {
        return Err(EngineError::invalid_argument(format!(
            "scaled sprite extent {scaled} exceeds {MAX_SPRITE_EXTENT} px (extent={extent}, scale={scale})"
        )));
    }
    // In 0..=MAX_SPRITE_EXTENT here, the cast cannot saturate.
    Ok((scaled as u32).max(1))
}

impl Draw for Sprite {
    fn run(&self, owner: &Core, canvas: &mut dyn Canvas) -> Result<()> {
        canvas.blit(&self.image, self.top_left_at(owner.transform.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::{DrawCommand, DrawList};

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn image_is_scaled_once_at_construction() {
        let sprite = Sprite::from_image(checkerboard(10, 4), 2.5).unwrap();
        assert_eq!(sprite.scaled_width(), 25);
        assert_eq!(sprite.scaled_height(), 10);
        assert_eq!(sprite.scale_factor(), 2.5);
    }

    #[test]
    fn tiny_scale_keeps_at_least_one_pixel() {
        let sprite = Sprite::from_image(checkerboard(3, 3), 0.01).unwrap();
        assert_eq!(sprite.scaled_width(), 1);
        assert_eq!(sprite.scaled_height(), 1);
    }

    #[test]
    fn invalid_scale_is_rejected() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = Sprite::from_image(checkerboard(2, 2), scale);
            assert!(matches!(result, Err(EngineError::InvalidArgument(_))), "scale={scale}");
        }
    }

    #[test]
    fn oversized_scale_is_rejected_before_resizing() {
        let result = Sprite::from_image(RgbaImage::new(2, 2), 1e30);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));

        let result = Sprite::from_image(RgbaImage::new(100, 1), 100.0);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn extent_bound_is_inclusive() {
        assert_eq!(scaled_extent(1, MAX_SPRITE_EXTENT as f32).unwrap(), MAX_SPRITE_EXTENT);
        assert_eq!(scaled_extent(4096, 2.0).unwrap(), MAX_SPRITE_EXTENT);
        assert!(scaled_extent(4097, 2.0).is_err());
    }

    #[test]
    fn empty_image_is_rejected() {
        let result = Sprite::from_image(RgbaImage::new(0, 3), 1.0);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn run_blits_centered_on_owner() {
        let mut owner = Core::new("hero");
        owner.transform.move_to((50.0, 40.0));
        let sprite = Sprite::from_image(checkerboard(5, 8), 1.0).unwrap();

        let mut canvas = DrawList::new();
        sprite.run(&owner, &mut canvas).unwrap();

        // half extents round to even: 2.5 -> 2, 4.0 -> 4
        assert_eq!(canvas.commands(), &[DrawCommand::Blit {
            image: sprite.image().clone(),
            position: Vector2F::new(48.0, 36.0)
        }]);
    }

    #[test]
    fn missing_file_is_a_resource_load_error() {
        let art_dir = tempfile::tempdir().unwrap();
        let result = Sprite::load(art_dir.path(), "missing.png", 1.0);
        match result {
            Err(EngineError::ResourceLoad { path, .. }) => {
                assert_eq!(path, art_dir.path().join("missing.png"));
            },
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn load_decodes_image_from_art_dir() {
        let art_dir = tempfile::tempdir().unwrap();
        checkerboard(6, 2).save(art_dir.path().join("board.png")).unwrap();

        let sprite = Sprite::load(art_dir.path(), "board.png", 0.5).unwrap();
        assert_eq!(sprite.scaled_width(), 3);
        assert_eq!(sprite.scaled_height(), 1);
    }

    #[test]
    fn every_image_gets_its_own_id() {
        let a = SpriteImage::new(checkerboard(1, 1));
        let b = SpriteImage::new(checkerboard(1, 1));
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }
}
