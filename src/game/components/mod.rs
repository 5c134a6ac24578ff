//! Drawable components attachable to a [`Core`].
//!
//! Each component kind can be attached at most once per object. The registry
//! is keyed by [`ComponentKind`], a closed set, so there is no way to collide
//! on a misspelled tag.

pub mod sprite;
pub mod square;

pub use sprite::{Sprite, SpriteImage};
pub use square::Square;

use crate::{
    error::{EngineError, Result},
    rendering::Canvas
};

use super::object::Core;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Square,
    Sprite,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 2] = [ComponentKind::Square, ComponentKind::Sprite];

    pub fn tag(&self) -> &'static str {
        match self {
            ComponentKind::Square => "square",
            ComponentKind::Sprite => "sprite",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::invalid_argument(format!("unknown component tag '{s}'")))
    }
}

/// Per-frame draw capability shared by every component.
pub trait Draw {
    /// Draws relative to `owner.transform` onto `canvas`.
    fn run(&self, owner: &Core, canvas: &mut dyn Canvas) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Square(Square),
    Sprite(Sprite),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Square(_) => ComponentKind::Square,
            Component::Sprite(_) => ComponentKind::Sprite,
        }
    }
}

impl Draw for Component {
    fn run(&self, owner: &Core, canvas: &mut dyn Canvas) -> Result<()> {
        match self {
            Component::Square(square) => square.run(owner, canvas),
            Component::Sprite(sprite) => sprite.run(owner, canvas),
        }
    }
}

/// Typed access into a [`Component`], used by `Core::get` and `Core::get_mut`.
pub trait ComponentType: Into<Component> {
    const KIND: ComponentKind;

    fn from_component(component: &Component) -> Option<&Self>;
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! impl_component_type {
    ($variant:ident) => {
        impl From<$variant> for Component {
            fn from(value: $variant) -> Self {
                Component::$variant(value)
            }
        }

        impl ComponentType for $variant {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_component_type!(Square);
impl_component_type!(Sprite);
