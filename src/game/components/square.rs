use crate::{
    error::{EngineError, Result},
    game::{
        color::Rgb,
        math::{Rect2F, Vector2F},
        object::Core
    },
    rendering::Canvas
};

use super::Draw;

/// Filled axis-aligned rectangle centered on the owner's position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Square {
    width: f32,
    height: f32,
    pub color: Rgb,
}

fn validate_extent(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::invalid_argument(format!("square {name} must be finite and non-negative, got {value}")))
    }
}

impl Square {
    pub fn new(width: f32, height: f32, color: Rgb) -> Result<Self> {
        Ok(Self {
            width: validate_extent("width", width)?,
            height: validate_extent("height", height)?,
            color,
        })
    }

    /// White square, the default colour.
    pub fn with_size(width: f32, height: f32) -> Result<Self> {
        Self::new(width, height, Rgb::WHITE)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn size(&self) -> Vector2F {
        Vector2F::new(self.width, self.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let width = validate_extent("width", width)?;
        let height = validate_extent("height", height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn bounds_at(&self, center: Vector2F) -> Rect2F {
        Rect2F::from_center(center, self.size())
    }
}

impl Draw for Square {
    fn run(&self, owner: &Core, canvas: &mut dyn Canvas) -> Result<()> {
        canvas.fill_rect(self.bounds_at(owner.transform.position), self.color)
    }
}
