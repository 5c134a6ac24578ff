use std::path::PathBuf;

use crate::game::{components::ComponentKind, world::EntityId};

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Component '{0}' not attached")]
    NotFound(ComponentKind),

    #[error("Entity id={0} does not exist")]
    EntityNotFound(EntityId),

    #[error("Could not load image '{}', reason='{source}'", .path.display())]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{} component(s) of '{object}' failed to run", .failures.len())]
    Frame {
        object: String,
        failures: Vec<(ComponentKind, EngineError)>,
    },

    #[error("{} failure(s) during world tick", .failures.len())]
    Tick {
        failures: Vec<EngineError>,
    },

    #[error("Could not parse config '{}', reason='{source}'", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IoError, reason='{0}'")]
    Io(#[from] std::io::Error),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Renderer error: {0}")]
    Renderer(String),
}

impl EngineError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
