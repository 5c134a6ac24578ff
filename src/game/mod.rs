pub mod color;
pub mod components;
pub mod math;
pub mod object;
pub mod script;
pub mod transform;
pub mod world;
