use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::events::{EventBus, PageEvent};

/// Minimum time a loading transition must last before the bar appears, so
/// fast transitions never flicker it.
pub const DEFAULT_SHOW_DELAY: Duration = Duration::from_millis(300);

/// Bar styling, mirroring the rendered indicator's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStyle {
    pub bar_color: String,
    pub shadow_color: String,
}

impl Default for ProgressStyle {
    fn default() -> Self {
        Self {
            bar_color: "#29d".to_string(),
            shadow_color: "rgba(0, 0, 0, .3)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Hidden,
    Pending { generation: u64 },
    Visible,
}

/// Loading-progress indicator driven by page lifecycle events: show after a
/// minimum display delay, hide immediately. A hide that lands inside the
/// delay cancels the pending show.
#[derive(Clone)]
pub struct ProgressBar {
    inner: Arc<ProgressInner>,
}

struct ProgressInner {
    style: ProgressStyle,
    show_delay: Duration,
    state: Mutex<State>,
    generation: AtomicU64,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self::with_style(ProgressStyle::default())
    }

    pub fn with_style(style: ProgressStyle) -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                style,
                show_delay: DEFAULT_SHOW_DELAY,
                state: Mutex::new(State::Hidden),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn show_delay(mut self, delay: Duration) -> Self {
        let inner = Arc::get_mut(&mut self.inner).expect("configure before sharing");
        inner.show_delay = delay;
        self
    }

    pub fn style(&self) -> &ProgressStyle {
        &self.inner.style
    }

    pub fn is_visible(&self) -> bool {
        matches!(*self.inner.state.lock(), State::Visible)
    }

    /// Schedule the bar to appear after the show delay, unless a hide arrives
    /// first. Requires a running runtime.
    pub fn show(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.inner.state.lock();
            if *state == State::Visible {
                return;
            }
            *state = State::Pending { generation };
        }

        let bar = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(bar.inner.show_delay).await;
            let mut state = bar.inner.state.lock();
            if *state == (State::Pending { generation }) {
                *state = State::Visible;
                tracing::debug!("progress bar visible");
            }
        });
    }

    /// Hide immediately, cancelling any pending show.
    pub fn hide(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        *self.inner.state.lock() = State::Hidden;
    }

    /// Observe loading transitions on the page-event bus.
    pub fn attach(self, bus: &EventBus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(PageEvent::LoadingStart) => self.show(),
                    Ok(PageEvent::LoadingStop) => self.hide(),
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
        })
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}
