use anyhow::Result;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{DocumentChange, EditorHost, FocusedDocument, HostEvent};

/// Wire format for host messages, one JSON document per line on stdin:
///
/// ```json
/// {"type":"activity"}
/// {"type":"focus","document":{"projectRoot":"/p","languageId":"rust","relativePath":"src/main.rs"}}
/// {"type":"change","projectRoot":"/p","fileBacked":true,"changes":[{"text":"\n","startLine":3,"endLine":3}]}
/// ```
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum HostMessage {
    Activity,
    Focus { document: Option<FocusedDocument> },
    Change(DocumentChange),
}

/// Host adapter for an editor plugin that pipes its events over stdin. A
/// background task reads and parses lines; the sampler drains the buffered
/// messages once per tick.
pub struct StdioHost {
    receiver: mpsc::UnboundedReceiver<HostMessage>,
    focused: Option<FocusedDocument>,
}

impl StdioHost {
    /// Spawns the stdin reader. Cancels `shutdown` when the editor closes the
    /// pipe, which ends the tracker.
    pub fn spawn(shutdown: CancellationToken) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(read_messages(sender, shutdown));
        Self::new(receiver)
    }

    fn new(receiver: mpsc::UnboundedReceiver<HostMessage>) -> Self {
        Self {
            receiver,
            focused: None,
        }
    }
}

async fn read_messages(sender: mpsc::UnboundedSender<HostMessage>, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<HostMessage>(line) {
                    Ok(message) => {
                        if sender.send(message).is_err() {
                            return;
                        }
                    }
                    // ignore illegal lines, the host side may be mid-update
                    Err(e) => warn!("Ignoring malformed host message {line:?}: {e}"),
                }
            }
            Ok(None) => {
                debug!("Host closed the event pipe");
                shutdown.cancel();
                return;
            }
            Err(e) => {
                warn!("Failed reading host events: {e:?}");
                shutdown.cancel();
                return;
            }
        }
    }
}

impl EditorHost for StdioHost {
    fn drain_events(&mut self) -> Result<Vec<HostEvent>> {
        let mut events = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                HostMessage::Activity => events.push(HostEvent::Activity),
                HostMessage::Focus { document } => {
                    self.focused = document;
                    events.push(HostEvent::Activity);
                }
                HostMessage::Change(change) => events.push(HostEvent::DocumentChanged(change)),
            }
        }
        Ok(events)
    }

    fn focused_document(&mut self) -> Result<Option<FocusedDocument>> {
        Ok(self.focused.clone())
    }
}
