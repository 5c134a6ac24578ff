use crate::{
    error::{EngineError, Result},
    rendering::Canvas,
    DEFAULT_OBJECT_NAME
};

use super::{
    components::{Component, ComponentKind, ComponentType, Draw},
    transform::Transform
};

/// Game object: a name, a transform and at most one component of each kind.
///
/// Components keep their attachment order, which is also the order in which
/// they are drawn by [`Core::update`].
#[derive(Debug, Clone)]
pub struct Core {
    name: String,
    pub transform: Transform,
    components: Vec<Component>,
}

impl Default for Core {
    fn default() -> Self {
        Self::new(DEFAULT_OBJECT_NAME)
    }
}

impl std::fmt::Display for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Core {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().to_string(),
            transform: Transform::new(),
            components: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: AsRef<str>>(&mut self, name: S) {
        self.name = name.as_ref().to_string();
    }

    /// Attaches `component`, replacing any component of the same kind in place.
    /// Returns the replaced component, if any.
    pub fn add_component<C: Into<Component>>(&mut self, component: C) -> Option<Component> {
        let component = component.into();
        let kind = component.kind();

        match self.position_of(kind) {
            Some(index) => {
                log::debug!("'{}' replaced component '{kind}'", self.name);
                Some(std::mem::replace(&mut self.components[index], component))
            },
            None => {
                log::debug!("'{}' attached component '{kind}'", self.name);
                self.components.push(component);
                None
            },
        }
    }

    pub fn get_component(&self, kind: ComponentKind) -> Result<&Component> {
        self.components.iter()
            .find(|c| c.kind() == kind)
            .ok_or(EngineError::NotFound(kind))
    }

    pub fn get_component_mut(&mut self, kind: ComponentKind) -> Result<&mut Component> {
        self.components.iter_mut()
            .find(|c| c.kind() == kind)
            .ok_or(EngineError::NotFound(kind))
    }

    pub fn get<T: ComponentType>(&self) -> Result<&T> {
        self.get_component(T::KIND)
            .map(T::from_component)?
            .ok_or(EngineError::NotFound(T::KIND))
    }

    pub fn get_mut<T: ComponentType>(&mut self) -> Result<&mut T> {
        self.get_component_mut(T::KIND)
            .map(T::from_component_mut)?
            .ok_or(EngineError::NotFound(T::KIND))
    }

    pub fn remove_component(&mut self, kind: ComponentKind) -> Result<Component> {
        let index = self.position_of(kind).ok_or(EngineError::NotFound(kind))?;
        log::debug!("'{}' removed component '{kind}'", self.name);
        Ok(self.components.remove(index))
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.position_of(kind).is_some()
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn components_count(&self) -> usize {
        self.components.len()
    }

    /// Base lifecycle hook, runs once before the first update.
    pub fn start(&mut self) {
        log::trace!("'{}' started", self.name);
    }

    /// Runs every attached component once, in attachment order.
    ///
    /// A failing component does not stop the pass; all failures are returned
    /// together once every component had its turn.
    pub fn update(&self, canvas: &mut dyn Canvas) -> Result<()> {
        let failures: Vec<_> = self.components.iter()
            .filter_map(|component| {
                component.run(self, canvas)
                    .err()
                    .map(|e| (component.kind(), e))
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Frame {
                object: self.name.clone(),
                failures
            })
        }
    }

    fn position_of(&self, kind: ComponentKind) -> Option<usize> {
        self.components.iter().position(|c| c.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        game::{
            color::Rgb,
            components::{Sprite, Square},
            math::{Rect2F, Vector2F}
        },
        rendering::{DrawCommand, DrawList}
    };

    fn sprite() -> Sprite {
        Sprite::from_image(image::RgbaImage::new(4, 4), 1.0).unwrap()
    }

    #[test]
    fn default_name() {
        let core = Core::default();
        assert_eq!(core.name(), "NewGameObject");
        assert_eq!(core.to_string(), "NewGameObject");
        assert_eq!(core.components_count(), 0);
    }

    #[test]
    fn get_returns_just_added_component() {
        let mut core = Core::new("player");
        let square = Square::new(3.0, 3.0, Rgb::BLUE).unwrap();
        assert!(core.add_component(square).is_none());

        assert_eq!(core.get_component(ComponentKind::Square).unwrap(), &Component::Square(square));
        assert_eq!(core.get::<Square>().unwrap(), &square);
    }

    #[test]
    fn same_kind_replaces_in_place() {
        let mut core = Core::new("player");
        let first = Square::new(1.0, 1.0, Rgb::RED).unwrap();
        let second = Square::new(2.0, 2.0, Rgb::GREEN).unwrap();
        core.add_component(first);
        core.add_component(sprite());

        let replaced = core.add_component(second);
        assert_eq!(replaced, Some(Component::Square(first)));
        assert_eq!(core.components_count(), 2);
        assert_eq!(core.get::<Square>().unwrap(), &second);

        let kinds: Vec<_> = core.components().map(Component::kind).collect();
        assert_eq!(kinds, vec![ComponentKind::Square, ComponentKind::Sprite]);
    }

    #[test]
    fn missing_component_is_not_found_without_side_effects() {
        let mut core = Core::new("player");
        core.add_component(Square::with_size(1.0, 1.0).unwrap());

        let result = core.get_component(ComponentKind::Sprite);
        assert!(matches!(result, Err(EngineError::NotFound(ComponentKind::Sprite))));
        assert!(matches!(core.get::<Sprite>(), Err(EngineError::NotFound(ComponentKind::Sprite))));
        assert_eq!(core.components_count(), 1);
        assert!(!core.has_component(ComponentKind::Sprite));
    }

    #[test]
    fn get_mut_allows_editing_in_place() {
        let mut core = Core::new("player");
        core.add_component(Square::with_size(1.0, 1.0).unwrap());
        core.get_mut::<Square>().unwrap().color = Rgb::RED;
        assert_eq!(core.get::<Square>().unwrap().color, Rgb::RED);
    }

    #[test]
    fn remove_component() {
        let mut core = Core::new("player");
        core.add_component(sprite());

        let removed = core.remove_component(ComponentKind::Sprite).unwrap();
        assert_eq!(removed.kind(), ComponentKind::Sprite);
        assert_eq!(core.components_count(), 0);
        assert!(matches!(core.remove_component(ComponentKind::Sprite), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn update_runs_each_component_once_in_attachment_order() {
        let mut core = Core::new("player");
        core.transform.move_to((10.0, 10.0));
        let sprite = sprite();
        core.add_component(sprite.clone());
        core.add_component(Square::new(4.0, 6.0, Rgb::WHITE).unwrap());

        let mut canvas = DrawList::new();
        core.update(&mut canvas).unwrap();

        assert_eq!(canvas.commands(), &[
            DrawCommand::Blit {
                image: Arc::clone(sprite.image()),
                position: Vector2F::new(8.0, 8.0)
            },
            DrawCommand::FillRect {
                rect: Rect2F::new(8.0, 7.0, 4.0, 6.0),
                color: Rgb::WHITE
            },
        ]);
    }

    #[test]
    fn update_reports_all_failures_after_full_pass() {
        let mut core = Core::new("broken");
        core.add_component(Square::with_size(2.0, 2.0).unwrap());
        core.add_component(sprite());
        core.transform.position = Vector2F::new(f32::NAN, 0.0);

        let mut canvas = DrawList::new();
        match core.update(&mut canvas) {
            Err(EngineError::Frame { object, failures }) => {
                assert_eq!(object, "broken");
                let kinds: Vec<_> = failures.iter().map(|(kind, _)| *kind).collect();
                assert_eq!(kinds, vec![ComponentKind::Square, ComponentKind::Sprite]);
            },
            other => panic!("unexpected result {other:?}"),
        }
        assert!(canvas.is_empty());
    }

    #[test]
    fn empty_object_draws_nothing() {
        let core = Core::default();
        let mut canvas = DrawList::new();
        core.update(&mut canvas).unwrap();
        assert!(canvas.is_empty());
    }
}
