// Named remote-control buttons sent over IRCC.

use tracing::debug;

use crate::client::BraviaClient;
use crate::error::Error;

impl BraviaClient {
    /// Press a remote button by name (`"Play"`, `"Home"`, `"VolumeUp"`, ...).
    ///
    /// Returns `false` without contacting the IRCC endpoint when the name is
    /// not in the device's command table.
    pub async fn send_command(&mut self, command: &str) -> Result<bool, Error> {
        let Some(code) = self.get_command_code(command).await? else {
            debug!(command, "unknown IRCC command");
            return Ok(false);
        };
        self.send_ircc_req(&code).await
    }

    pub async fn play(&mut self) -> Result<bool, Error> {
        self.send_command("Play").await
    }

    pub async fn pause(&mut self) -> Result<bool, Error> {
        self.send_command("Pause").await
    }

    pub async fn stop(&mut self) -> Result<bool, Error> {
        self.send_command("Stop").await
    }

    pub async fn next_track(&mut self) -> Result<bool, Error> {
        self.send_command("Next").await
    }

    pub async fn previous_track(&mut self) -> Result<bool, Error> {
        self.send_command("Prev").await
    }

    pub async fn channel_up(&mut self) -> Result<bool, Error> {
        self.send_command("ChannelUp").await
    }

    pub async fn channel_down(&mut self) -> Result<bool, Error> {
        self.send_command("ChannelDown").await
    }
}
