//! 8-bit RGB colour.
//!
//! Channels are clamped into `0..=255` at construction, so `Rgb::new(-5, 10, -1)`
//! is `(0, 10, 0)`.

use serde::{
    Deserialize,
    Serialize
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::from_u8(0, 0, 0);
    pub const WHITE: Rgb = Rgb::from_u8(255, 255, 255);
    pub const RED: Rgb = Rgb::from_u8(255, 0, 0);
    pub const GREEN: Rgb = Rgb::from_u8(0, 255, 0);
    pub const BLUE: Rgb = Rgb::from_u8(0, 0, 255);

    pub fn new(red: i32, green: i32, blue: i32) -> Self {
        fn clamp_channel(channel: i32) -> u8 {
            channel.clamp(0, u8::MAX as i32) as u8
        }

        Self {
            red: clamp_channel(red),
            green: clamp_channel(green),
            blue: clamp_channel(blue),
        }
    }

    pub const fn from_u8(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn value(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Linear-light RGBA, as expected by an sRGB render target.
    pub fn to_linear_rgba(&self) -> [f32; 4] {
        fn srgb_to_linear(channel: u8) -> f32 {
            let c = channel as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        [
            srgb_to_linear(self.red),
            srgb_to_linear(self.green),
            srgb_to_linear(self.blue),
            1.0
        ]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RGB({}, {}, {})", self.red, self.green, self.blue)
    }
}
