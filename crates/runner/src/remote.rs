use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use anyhow::Context;
use serde_json::json;

use tracebot_core::agent::{Command, Environment};
use tracebot_core::world::Observation;

/// One agent's simulator control socket: one JSON request per line, one JSON response per line.
pub struct RemoteEnvironment {
    addr: String,
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl RemoteEnvironment {
    pub fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream =
            TcpStream::connect(addr).with_context(|| format!("connect control port {addr}"))?;
        stream.set_nodelay(true).ok();
        let writer = stream.try_clone().context("clone control stream")?;
        Ok(Self {
            addr: addr.to_string(),
            reader: BufReader::new(stream),
            writer,
        })
    }

    fn request_json(&mut self, req: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let line = format!("{req}\n");
        self.writer
            .write_all(line.as_bytes())
            .with_context(|| format!("control write {}", self.addr))?;
        self.writer.flush().ok();

        let mut resp_line = String::new();
        let n = self
            .reader
            .read_line(&mut resp_line)
            .with_context(|| format!("control read {}", self.addr))?;
        if n == 0 {
            anyhow::bail!("control connection {} closed", self.addr);
        }
        let v: serde_json::Value =
            serde_json::from_str(resp_line.trim()).context("invalid control json response")?;
        if v.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            anyhow::bail!("control request failed: {v}");
        }
        Ok(v)
    }

    pub fn command_json(command: &Command) -> serde_json::Value {
        json!({ "op": "command", "command": command.to_string() })
    }
}

impl Environment for RemoteEnvironment {
    fn observe(&mut self) -> anyhow::Result<Option<Observation>> {
        let v = self.request_json(json!({ "op": "observation" }))?;
        match v.get("observation") {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(obs) => serde_json::from_value(obs.clone())
                .context("decode observation")
                .map(Some),
        }
    }

    fn send(&mut self, command: &Command) -> anyhow::Result<()> {
        self.request_json(Self::command_json(command))?;
        Ok(())
    }

    fn is_mission_active(&mut self) -> anyhow::Result<bool> {
        let v = self.request_json(json!({ "op": "mission" }))?;
        v.get("running")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| anyhow::anyhow!("missing running flag in mission response"))
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    #[test]
    fn command_wire_carries_simulator_text() {
        let v = RemoteEnvironment::command_json(&Command::Hotbar {
            slot: 2,
            pressed: true,
        });
        assert_eq!(v.get("op").and_then(|v| v.as_str()), Some("command"));
        assert_eq!(v.get("command").and_then(|v| v.as_str()), Some("hotbar.3 1"));
    }

    #[test]
    fn observe_round_trips_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;
            for reply in [
                r#"{"ok":true,"observation":{"XPos":1.5,"Yaw":-90.0}}"#,
                r#"{"ok":true,"observation":null}"#,
                r#"{"ok":false,"error":"no mission"}"#,
            ] {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                writeln!(writer, "{reply}").unwrap();
            }
        });

        let mut env = RemoteEnvironment::connect(&addr).unwrap();
        let obs = env.observe().unwrap().unwrap();
        assert_eq!(obs.x, 1.5);
        assert_eq!(obs.orientation().yaw, 270.0);
        assert!(env.observe().unwrap().is_none());
        assert!(env.is_mission_active().is_err());
        server.join().unwrap();
    }
}
