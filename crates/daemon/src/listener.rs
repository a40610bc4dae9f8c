// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingress listener: newline-delimited JSON messages on a Unix socket.
//!
//! One connection may carry any number of frames. Malformed frames are
//! logged and dropped so a single bad producer cannot wedge ingress; valid
//! messages flow into the engine loop's channel.

use rover_core::Message;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Listener task for accepting ingress connections.
pub struct Listener {
    socket: UnixListener,
    tx: mpsc::Sender<Message>,
}

impl Listener {
    pub fn new(socket: UnixListener, tx: mpsc::Sender<Message>) -> Self {
        Self { socket, tx }
    }

    /// Run the accept loop, spawning a task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let tx = self.tx.clone();
                    tokio::spawn(handle_connection(stream, tx));
                }
                Err(e) => {
                    error!(error = %e, "accept error");
                }
            }
        }
    }
}

/// Read frames from one client until it disconnects.
async fn handle_connection(stream: UnixStream, tx: mpsc::Sender<Message>) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match decode(&line) {
                    Ok(message) => {
                        debug!(
                            router_id = %message.router_id,
                            crud = %message.crud,
                            "ingress message"
                        );
                        if tx.send(message).await.is_err() {
                            // Engine loop is gone; drop the connection.
                            return;
                        }
                    }
                    Err(e) => warn!(error = %e, "dropping malformed ingress message"),
                }
            }
            Ok(None) => {
                debug!("client disconnected");
                return;
            }
            Err(e) => {
                warn!(error = %e, "ingress read error");
                return;
            }
        }
    }
}

/// Parse one ingress frame.
fn decode(line: &str) -> Result<Message, serde_json::Error> {
    serde_json::from_str(line)
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
