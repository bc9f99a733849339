use anyhow::Result;
use tokio::task::JoinHandle;

use crate::debug;
use crate::dom::Element;
use crate::events::EventBus;
use crate::progress::ProgressBar;
use crate::reload;
use crate::session::{self, ConnectionState, LiveSession, SessionConfig, SessionHandle};

/// A bootstrapped client: the live session plus the page-level wiring around
/// it. One per process.
pub struct Client {
    session: LiveSession,
    progress: ProgressBar,
    bus: EventBus,
    progress_task: JoinHandle<()>,
    diagnostics: Option<JoinHandle<()>>,
}

/// Wire the whole client once: attach the progress indicator to the page
/// events, open the session, expose it through the debug accessor, and (in
/// development) arm the live-reload diagnostic channel.
pub async fn start(endpoint: &str, mut config: SessionConfig) -> Result<Client> {
    let bus = config.bus.get_or_insert_with(EventBus::new).clone();

    let progress = ProgressBar::new();
    let progress_task = progress.clone().attach(&bus);

    let dev = config.dev;
    let session = session::connect(endpoint, config).await?;
    debug::register(session.handle());

    let diagnostics = dev.then(|| {
        let handle = session.handle();
        tokio::spawn(async move {
            match reload::attach(handle).await {
                Ok(reloader) => {
                    // Hold the reloader for the rest of the session.
                    let _reloader = reloader;
                    std::future::pending::<()>().await;
                }
                Err(err) => tracing::debug!(error = %err, "live reload never attached"),
            }
        })
    });

    Ok(Client {
        session,
        progress,
        bus,
        progress_task,
        diagnostics,
    })
}

impl Client {
    pub fn handle(&self) -> SessionHandle {
        self.session.handle()
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    pub fn session(&self) -> &LiveSession {
        &self.session
    }

    pub fn progress(&self) -> &ProgressBar {
        &self.progress
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn mount(&self, host: &Element) -> Result<()> {
        self.session.mount(host)
    }

    pub fn unmount(&self, element_id: &str) -> bool {
        self.session.unmount(element_id)
    }

    pub fn close(self) {
        debug::clear();
        self.progress_task.abort();
        if let Some(task) = self.diagnostics {
            task.abort();
        }
        self.session.close();
    }
}
