use std::sync::Arc;

use crate::{
    error::{EngineError, Result},
    game::{
        color::Rgb,
        components::SpriteImage,
        math::{Rect2F, Vector2F}
    }
};

pub mod renderer;

/// Shared drawing surface written by components during `Core::update`.
///
/// Coordinates are in pixels, origin at the top-left corner, `y` grows downward.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect2F, color: Rgb) -> Result<()>;

    fn blit(&mut self, image: &Arc<SpriteImage>, top_left: Vector2F) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect2F,
        color: Rgb,
    },
    Blit {
        image: Arc<SpriteImage>,
        position: Vector2F,
    },
}

/// One frame worth of draw calls, in submission order.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Canvas for DrawList {
    fn fill_rect(&mut self, rect: Rect2F, color: Rgb) -> Result<()> {
        if !rect.is_finite() {
            return Err(EngineError::invalid_argument(format!("cannot draw non-finite rect {rect}")));
        }
        self.commands.push(DrawCommand::FillRect { rect, color });
        Ok(())
    }

    fn blit(&mut self, image: &Arc<SpriteImage>, top_left: Vector2F) -> Result<()> {
        if !top_left.is_finite() {
            return Err(EngineError::invalid_argument(format!("cannot blit image at {top_left}")));
        }
        self.commands.push(DrawCommand::Blit { image: image.clone(), position: top_left });
        Ok(())
    }
}

#[test]
fn test_draw_list_keeps_submission_order() {
    let image = Arc::new(SpriteImage::new(image::RgbaImage::new(2, 2)));
    let mut list = DrawList::new();
    list.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), Rgb::RED).unwrap();
    list.blit(&image, Vector2F::new(3.0, 4.0)).unwrap();

    assert_eq!(list.len(), 2);
    assert!(matches!(list.commands()[0], DrawCommand::FillRect { color: Rgb::RED, .. }));
    assert!(matches!(&list.commands()[1], DrawCommand::Blit { position, .. } if *position == Vector2F::new(3.0, 4.0)));

    list.clear();
    assert!(list.is_empty());
}

#[test]
fn test_draw_list_rejects_non_finite_geometry() {
    let image = Arc::new(SpriteImage::new(image::RgbaImage::new(1, 1)));
    let mut list = DrawList::new();

    let rect_result = list.fill_rect(Rect2F::new(f32::NAN, 0.0, 1.0, 1.0), Rgb::RED);
    assert!(matches!(rect_result, Err(EngineError::InvalidArgument(_))));

    let blit_result = list.blit(&image, Vector2F::new(0.0, f32::INFINITY));
    assert!(matches!(blit_result, Err(EngineError::InvalidArgument(_))));

    assert!(list.is_empty());
}
