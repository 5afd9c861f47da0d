use std::time::Duration;

use super::command::Command;
use crate::world::Observation;

/// Boundary an agent uses to read world snapshots and issue raw commands.
///
/// The runner implements this over the simulator's control socket; tests and offline replay use
/// [`super::ScriptedEnvironment`].
pub trait Environment {
    /// Latest snapshot, or `None` when no fresh one has arrived yet.
    fn observe(&mut self) -> anyhow::Result<Option<Observation>>;

    fn send(&mut self, command: &Command) -> anyhow::Result<()>;

    fn is_mission_active(&mut self) -> anyhow::Result<bool>;

    /// Fixed pause so the simulator can register an action before the next snapshot is read.
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Called once per control-loop iteration.
    fn tick(&mut self) {}
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn observe(&mut self) -> anyhow::Result<Option<Observation>> {
        (**self).observe()
    }

    fn send(&mut self, command: &Command) -> anyhow::Result<()> {
        (**self).send(command)
    }

    fn is_mission_active(&mut self) -> anyhow::Result<bool> {
        (**self).is_mission_active()
    }

    fn wait(&mut self, duration: Duration) {
        (**self).wait(duration)
    }

    fn tick(&mut self) {
        (**self).tick()
    }
}
