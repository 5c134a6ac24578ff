//! User behaviour attached to a [`Core`].
//!
//! The world always runs the base `Core` hook first and the script hook
//! second: `Core::start` then `Script::start`, `Core::update` then
//! `Script::update`. A script therefore never has to remember to call into
//! the base behaviour.

use crate::{error::Result, input::Input};

use super::object::Core;

pub trait Script {
    fn start(&mut self, _core: &mut Core) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _core: &mut Core, _input: &Input) -> Result<()> {
        Ok(())
    }
}
