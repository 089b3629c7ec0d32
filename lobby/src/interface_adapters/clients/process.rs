// Concrete `ProcessSpawner`/`RoomProcessHandle` over `tokio::process`.
// Captures stdout so the monitor task can parse the room's final
// `game_over` JSON line after exit.

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use crate::domain::{ProcessSpawner, RoomProcessHandle};

pub struct TokioProcessSpawner {
    /// Path to the `room` binary to launch for each match.
    pub room_binary: String,
}

#[async_trait]
impl ProcessSpawner for TokioProcessSpawner {
    async fn spawn(
        &self,
        working_dir: &str,
        host: &str,
        port: u16,
        room_id: &str,
        seed: Option<u64>,
    ) -> Result<Box<dyn RoomProcessHandle>, String> {
        let mut command = Command::new(&self.room_binary);
        command
            .current_dir(working_dir)
            .arg(host)
            .arg(port.to_string())
            .arg(room_id)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        if let Some(seed) = seed {
            command.arg(seed.to_string());
        }

        let child = command.spawn().map_err(|e| e.to_string())?;
        Ok(Box::new(ChildHandle { child: Some(child) }))
    }
}

struct ChildHandle {
    child: Option<Child>,
}

#[async_trait]
impl RoomProcessHandle for ChildHandle {
    async fn wait(&mut self) -> (String, bool) {
        let Some(mut child) = self.child.take() else {
            return (String::new(), false);
        };

        let mut stdout = String::new();
        if let Some(mut out) = child.stdout.take() {
            let _ = out.read_to_string(&mut stdout).await;
        }

        let success = match child.wait().await {
            Ok(status) => status.success(),
            Err(_) => false,
        };
        (stdout, success)
    }

    async fn kill(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill().await;
        }
    }
}
