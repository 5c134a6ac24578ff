use super::math::Vector2F;
use crate::error::Result;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector2F,
    pub rotation: Vector2F,
    pub scale: Vector2F,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snaps `position` to `destination`. This is not a relative move.
    pub fn move_to<V: Into<Vector2F>>(&mut self, destination: V) {
        self.position = destination.into();
    }

    pub fn try_move_to(&mut self, destination: &[f32]) -> Result<()> {
        self.position = Vector2F::try_from(destination)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn new_transform_is_zeroed() {
        let transform = Transform::new();
        assert_eq!(transform.position, Vector2F::zero());
        assert_eq!(transform.rotation, Vector2F::zero());
        assert_eq!(transform.scale, Vector2F::zero());
    }

    #[test]
    fn move_to_snaps_regardless_of_previous_position() {
        let mut transform = Transform::new();
        transform.position = Vector2F::new(100.0, -40.0);
        transform.move_to((3.0, 4.0));
        assert_eq!(transform.position, Vector2F::new(3.0, 4.0));

        transform.move_to([3.0, 4.0]);
        assert_eq!(transform.position, Vector2F::new(3.0, 4.0));
    }

    #[test]
    fn try_move_to_rejects_malformed_direction() {
        let mut transform = Transform::new();
        transform.move_to((1.0, 1.0));

        let result = transform.try_move_to(&[5.0]);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
        assert_eq!(transform.position, Vector2F::new(1.0, 1.0));

        transform.try_move_to(&[5.0, 6.0]).unwrap();
        assert_eq!(transform.position, Vector2F::new(5.0, 6.0));
    }
}
