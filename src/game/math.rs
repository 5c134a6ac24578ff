use serde::{
    Deserialize,
    Serialize
};

use crate::error::EngineError;

pub type Vector2F = Vector2X<f32>;
pub type Vector2I = Vector2X<i32>;

/// 2D pair in screen space, `y` grows downward.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vector2X<T> {
    pub x: T,
    pub y: T,
}

pub type Rect2F = Rect2X<f32>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rect2X<T> {
    pub pos: Vector2X<T>,
    pub size: Vector2X<T>,
}

impl<T: std::fmt::Display> std::fmt::Display for Vector2X<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vector({}, {})", self.x, self.y)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Rect2X<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[({},{}), ({},{})]", self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

impl<T> Vector2X<T>
where
    T: Default
{
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: T::default(), y: T::default() }
    }

    pub fn reset(&mut self) {
        *self = Self::zero();
    }
}

impl<T: Copy> Vector2X<T> {
    pub fn to_pair(&self) -> (T, T) {
        (self.x, self.y)
    }
}

impl<T> Vector2X<T>
where
    T: std::ops::AddAssign + std::ops::SubAssign + From<u8>
{
    pub fn translate(&mut self, dx: T, dy: T) {
        self.x += dx;
        self.y += dy;
    }

    pub fn translate_up(&mut self) {
        self.y -= T::from(1);
    }

    pub fn translate_down(&mut self) {
        self.y += T::from(1);
    }

    pub fn translate_left(&mut self) {
        self.x -= T::from(1);
    }

    pub fn translate_right(&mut self) {
        self.x += T::from(1);
    }
}

impl Vector2X<f32> {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<T> From<(T, T)> for Vector2X<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

impl<T> From<[T; 2]> for Vector2X<T> {
    fn from([x, y]: [T; 2]) -> Self {
        Self { x, y }
    }
}

impl<T> TryFrom<&[T]> for Vector2X<T>
where
    T: Copy
{
    type Error = EngineError;

    fn try_from(value: &[T]) -> Result<Self, Self::Error> {
        match value {
            [x, y] => Ok(Self { x: *x, y: *y }),
            _ => Err(EngineError::invalid_argument(format!(
                "expected 2 coordinates, got {}", value.len()
            ))),
        }
    }
}

impl<T> std::ops::Add for Vector2X<T>
where
    T: std::ops::Add<Output = T>
{
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y
        }

    }
}

impl<T> std::ops::AddAssign for Vector2X<T>
where
    T: std::ops::AddAssign
{
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl<T> std::ops::Mul<T> for Vector2X<T>
where
    T: std::ops::Mul<Output = T> + Copy
{
    type Output = Self;
    fn mul(self, rhs: T) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs
        }
    }
}

impl<T> std::ops::Sub for Vector2X<T>
where
    T: std::ops::Sub<Output = T>
{
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: T::sub(self.x, rhs.x),
            y: T::sub(self.y, rhs.y)
        }
    }
}

impl From<Vector2X<i32>> for Vector2X<f32> {
    fn from(value: Vector2X<i32>) -> Self {
        Self { x: value.x as f32, y: value.y as f32 }
    }
}

impl<T> Rect2X<T> {
    pub fn new(x: T, y: T, w: T, h: T) -> Self {
        Self { pos: Vector2X { x, y }, size: Vector2X { x: w, y: h } }
    }
}

impl Rect2X<f32> {
    /// Rect of `size` whose center lands on `center`.
    pub fn from_center(center: Vector2F, size: Vector2F) -> Self {
        Self {
            pos: center - size * 0.5,
            size,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.size.is_finite()
    }
}

#[test]
fn test_vector_creation() {
    let v1 = Vector2X::<f32>::new(1.0, 2.0);
    assert_eq!(v1.x, 1.0);
    assert_eq!(v1.y, 2.0);
}

#[test]
fn test_vector_add_assign() {
    let v1 = Vector2X::<i32>::new(1, 2);
    let mut v2 = Vector2X::<i32>::new(10, 20);
    v2 += v1;
    assert_eq!(v2.x, 11);
    assert_eq!(v2.y, 22);
}

#[test]
fn test_vector_directional_translation() {
    let mut v = Vector2F::new(3.0, 3.0);
    v.translate_up();
    assert_eq!(v.to_pair(), (3.0, 2.0));
    v.translate_down();
    v.translate_down();
    assert_eq!(v.to_pair(), (3.0, 4.0));
    v.translate_left();
    assert_eq!(v.to_pair(), (2.0, 4.0));
    v.translate_right();
    v.translate_right();
    assert_eq!(v.to_pair(), (4.0, 4.0));
}

#[test]
fn test_vector_reading_does_not_mutate() {
    let v = Vector2I::new(7, -2);
    let _ = v.to_pair();
    let _ = v.to_pair();
    assert_eq!(v, Vector2I::new(7, -2));
}

#[test]
fn test_vector_reset_and_zero() {
    let mut v = Vector2F::new(-12.5, 99.0);
    v.reset();
    assert_eq!(v.to_pair(), (0.0, 0.0));
    assert_eq!(Vector2I::zero().to_pair(), (0, 0));
}

#[test]
fn test_vector_translate_by_offset() {
    let mut v = Vector2I::new(1, 1);
    v.translate(4, -6);
    assert_eq!(v, Vector2I::new(5, -5));
}

#[test]
fn test_vector_from_slice() {
    let v = Vector2F::try_from([1.5f32, -2.0].as_slice()).unwrap();
    assert_eq!(v, Vector2F::new(1.5, -2.0));

    let too_short = Vector2F::try_from([1.0f32].as_slice());
    assert!(matches!(too_short, Err(EngineError::InvalidArgument(_))));

    let too_long = Vector2F::try_from([1.0f32, 2.0, 3.0].as_slice());
    assert!(matches!(too_long, Err(EngineError::InvalidArgument(_))));
}

#[test]
fn test_vector_display() {
    assert_eq!(Vector2I::new(1, 2).to_string(), "Vector(1, 2)");
}

#[test]
fn test_rect_from_center() {
    let rect = Rect2F::from_center(Vector2F::new(10.0, 10.0), Vector2F::new(4.0, 6.0));
    assert_eq!(rect.pos, Vector2F::new(8.0, 7.0));
    assert_eq!(rect.size, Vector2F::new(4.0, 6.0));
}

#[test]
fn test_rect_finiteness() {
    assert!(Rect2F::new(0.0, 0.0, 1.0, 1.0).is_finite());
    assert!(!Rect2F::new(f32::NAN, 0.0, 1.0, 1.0).is_finite());
    assert!(!Rect2F::new(0.0, 0.0, f32::INFINITY, 1.0).is_finite());
}
