use serde_json::Value;
use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 256;

/// Page-level lifecycle and server-pushed events. Components observe these
/// instead of talking to each other directly: the progress indicator reacts
/// to loading transitions, the reloader waits for its attach signal, and
/// applications consume server events.
#[derive(Debug, Clone)]
pub enum PageEvent {
    LoadingStart,
    LoadingStop,
    ReloadAttached,
    ServerEvent { name: String, payload: Value },
    ServerLog { level: String, message: String },
}

/// Broadcast channel for [`PageEvent`]s. Cheap to clone; subscribers only see
/// events published after they subscribe.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PageEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all current subscribers. Returns how many
    /// subscribers received it; zero subscribers is not an error.
    pub fn publish(&self, event: PageEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
