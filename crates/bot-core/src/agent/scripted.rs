use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Context;

use super::command::Command;
use super::environment::Environment;
use crate::world::Observation;

#[derive(Debug, Default)]
struct Script {
    current: Option<Observation>,
    pending: VecDeque<Observation>,
    sent: Vec<Command>,
    waited: Duration,
    hold_open: bool,
}

/// In-memory environment fed with observation frames.
///
/// Each `tick` or `wait` advances to the next frame (the current one is kept once frames run
/// out). Clones share the same script, so a test can keep a handle while an agent owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEnvironment {
    script: Arc<Mutex<Script>>,
}

impl ScriptedEnvironment {
    /// Starts on `initial`, with no further frames queued.
    pub fn new(initial: Observation) -> Self {
        let env = Self::default();
        env.lock().current = Some(initial);
        env
    }

    /// Starts with no snapshot; the first `tick` loads the first frame.
    pub fn replay(frames: impl IntoIterator<Item = Observation>) -> Self {
        let env = Self::default();
        env.lock().pending.extend(frames);
        env
    }

    /// Reads one JSON observation per non-empty line.
    pub fn from_json_lines(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut frames = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read replay line {}", n + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let obs: Observation = serde_json::from_str(&line)
                .with_context(|| format!("decode replay line {}", n + 1))?;
            frames.push(obs);
        }
        Ok(Self::replay(frames))
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        // A poisoned script only means a test thread panicked; the data is still usable.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_frame(&self, obs: Observation) {
        self.lock().pending.push_back(obs);
    }

    /// Replaces the current snapshot without advancing.
    pub fn set_current(&self, obs: Observation) {
        self.lock().current = Some(obs);
    }

    /// Keeps the mission active after frames run out.
    pub fn hold_open(&self, open: bool) {
        self.lock().hold_open = open;
    }

    pub fn sent(&self) -> Vec<Command> {
        self.lock().sent.clone()
    }

    pub fn clear_sent(&self) {
        self.lock().sent.clear();
    }

    pub fn waited(&self) -> Duration {
        self.lock().waited
    }

    fn advance(&self) {
        let mut script = self.lock();
        if let Some(next) = script.pending.pop_front() {
            script.current = Some(next);
        }
    }
}

impl Environment for ScriptedEnvironment {
    fn observe(&mut self) -> anyhow::Result<Option<Observation>> {
        Ok(self.lock().current.clone())
    }

    fn send(&mut self, command: &Command) -> anyhow::Result<()> {
        self.lock().sent.push(command.clone());
        Ok(())
    }

    fn is_mission_active(&mut self) -> anyhow::Result<bool> {
        let script = self.lock();
        Ok(script.hold_open || !script.pending.is_empty())
    }

    fn wait(&mut self, duration: Duration) {
        self.lock().waited += duration;
        self.advance();
    }

    fn tick(&mut self) {
        self.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    #[test]
    fn frames_advance_on_tick_and_wait() {
        let mut env = ScriptedEnvironment::replay([
            Observation::at(Vec3::new(0.0, 0.0, 0.0), 0.0, 0.0),
            Observation::at(Vec3::new(1.0, 0.0, 0.0), 0.0, 0.0),
        ]);
        assert!(env.observe().unwrap().is_none());
        assert!(env.is_mission_active().unwrap());

        env.tick();
        assert_eq!(env.observe().unwrap().unwrap().x, 0.0);
        env.wait(Duration::from_millis(500));
        assert_eq!(env.observe().unwrap().unwrap().x, 1.0);
        assert!(!env.is_mission_active().unwrap());
        assert_eq!(env.waited(), Duration::from_millis(500));

        env.tick();
        assert_eq!(env.observe().unwrap().unwrap().x, 1.0);
    }

    #[test]
    fn clones_share_sent_commands() {
        let handle = ScriptedEnvironment::new(Observation::default());
        let mut env = handle.clone();
        env.send(&Command::Move(1.0)).unwrap();
        assert_eq!(handle.sent(), vec![Command::Move(1.0)]);
    }

    #[test]
    fn json_lines_skip_blanks() {
        let raw = "{\"XPos\": 1.0}\n\n{\"XPos\": 2.0}\n";
        let mut env = ScriptedEnvironment::from_json_lines(raw.as_bytes()).unwrap();
        env.tick();
        env.tick();
        assert_eq!(env.observe().unwrap().unwrap().x, 2.0);
    }

    #[test]
    fn json_lines_report_bad_line() {
        let err = ScriptedEnvironment::from_json_lines("{\"XPos\": 1.0}\nnope\n".as_bytes())
            .unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
