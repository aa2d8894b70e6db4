use std::collections::HashMap;

use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq)]
pub enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

/// Live connections keyed by player id. Each entry is the sending half of
/// the connection's bounded writer queue.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: HashMap<String, mpsc::Sender<OutboundMessage>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, player_id: &str, tx: mpsc::Sender<OutboundMessage>) {
        self.clients.insert(player_id.to_string(), tx);
    }

    pub fn unregister(&mut self, player_id: &str) -> bool {
        self.clients.remove(player_id).is_some()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.clients.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Queues `payload` for every connection without waiting. A full or
    /// closed queue drops the frame for that connection only; the ids that
    /// missed it are returned.
    pub fn broadcast(&self, payload: &str) -> Vec<String> {
        let mut missed = Vec::new();
        for (player_id, tx) in &self.clients {
            if tx
                .try_send(OutboundMessage::Text(payload.to_string()))
                .is_err()
            {
                missed.push(player_id.clone());
            }
        }
        missed
    }

    /// Asks every writer to send a close frame and drops all entries.
    pub fn close_all(&mut self, code: u16, reason: &str) {
        for (_, tx) in self.clients.drain() {
            let _ = tx.try_send(OutboundMessage::Close {
                code,
                reason: reason.to_string(),
            });
        }
    }
}
