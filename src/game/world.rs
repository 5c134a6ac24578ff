use crate::{
    error::{EngineError, Result},
    input::Input,
    rendering::Canvas
};

use super::{
    object::Core,
    script::Script
};

pub type EntityId = u32;

pub struct Entity {
    pub id: EntityId,
    pub core: Core,
    script: Option<Box<dyn Script>>,
    started: bool,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("core", &self.core)
            .field("has_script", &self.script.is_some())
            .field("started", &self.started)
            .finish()
    }
}

impl Entity {
    pub fn has_script(&self) -> bool {
        self.script.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn start(&mut self) -> Result<()> {
        self.started = true;
        self.core.start();
        match self.script.as_mut() {
            Some(script) => script.start(&mut self.core),
            None => Ok(()),
        }
    }

    fn update(&mut self, input: &Input, canvas: &mut dyn Canvas) -> Vec<EngineError> {
        let mut failures = vec![];

        if let Err(e) = self.core.update(canvas) {
            failures.push(e);
        }

        if let Some(script) = self.script.as_mut() {
            if let Err(e) = script.update(&mut self.core, input) {
                failures.push(e);
            }
        }

        failures
    }
}

/// Flat collection of game objects, updated in spawn order.
#[derive(Debug, Default)]
pub struct World {
    new_entity_id: EntityId,
    entities: Vec<Entity>,
}

impl World {
    pub fn new() -> Self {
        log::info!("World created");
        Self::default()
    }

    pub fn spawn(&mut self, core: Core) -> EntityId {
        self.insert_entity(core, None)
    }

    pub fn spawn_with_script<S: Script + 'static>(&mut self, core: Core, script: S) -> EntityId {
        self.insert_entity(core, Some(Box::new(script)))
    }

    fn insert_entity(&mut self, core: Core, script: Option<Box<dyn Script>>) -> EntityId {
        let new_id = self.new_entity_id;
        self.new_entity_id += 1;

        log::debug!("Spawned entity id={new_id} '{core}'");
        self.entities.push(Entity {
            id: new_id,
            core,
            script,
            started: false,
        });
        new_id
    }

    pub fn remove(&mut self, entity_id: EntityId) -> Result<Core> {
        let position = self.entities.iter()
            .position(|e| e.id == entity_id)
            .ok_or(EngineError::EntityNotFound(entity_id))?;
        let entity = self.entities.remove(position);
        log::debug!("Removed entity id={entity_id} '{}'", entity.core);
        Ok(entity.core)
    }

    pub fn get(&self, entity_id: EntityId) -> Result<&Core> {
        self.entities.iter()
            .find(|e| e.id == entity_id)
            .map(|e| &e.core)
            .ok_or(EngineError::EntityNotFound(entity_id))
    }

    pub fn get_mut(&mut self, entity_id: EntityId) -> Result<&mut Core> {
        self.entities.iter_mut()
            .find(|e| e.id == entity_id)
            .map(|e| &mut e.core)
            .ok_or(EngineError::EntityNotFound(entity_id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities.iter()
            .find(|e| e.core.name() == name)
            .map(|e| e.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Runs start hooks of every entity that was not started yet.
    pub fn start(&mut self) -> Result<()> {
        let failures: Vec<_> = self.entities.iter_mut()
            .filter(|e| !e.started)
            .filter_map(|e| e.start().err())
            .collect();

        Self::into_result(failures)
    }

    /// One frame: pending start hooks, then base update and script update of
    /// every entity. Keeps going past failing entities.
    pub fn tick(&mut self, input: &Input, canvas: &mut dyn Canvas) -> Result<()> {
        log::trace!("World tick, {} entities", self.entities.len());

        let mut failures = match self.start() {
            Err(EngineError::Tick { failures }) => failures,
            Err(e) => vec![e],
            Ok(()) => vec![],
        };

        for entity in self.entities.iter_mut() {
            failures.extend(entity.update(input, canvas));
        }

        Self::into_result(failures)
    }

    fn into_result(failures: Vec<EngineError>) -> Result<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Tick { failures })
        }
    }
}
