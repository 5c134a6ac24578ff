pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod rendering;

pub use error::{EngineError, Result};

pub const DEFAULT_ART_DIR: &str = "../art";
pub const DEFAULT_OBJECT_NAME: &str = "NewGameObject";
pub const DEFAULT_WINDOW_TITLE: &str = "tiny engine";
pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;
