//! Development-only live-reload diagnostics: server-log streaming and
//! keyboard-gated editor jumps. None of this is wired up in production
//! builds; it carries no correctness invariants beyond that.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::dom::Element;
use crate::events::PageEvent;
use crate::session::SessionHandle;

/// Element annotation naming the invocation site of the component that
/// rendered it.
pub const CALLER_ATTR: &str = "data-caller";

/// Element annotation naming the component's definition site.
pub const DEF_ATTR: &str = "data-def";

/// Environment variable holding the editor-launch template, with `__FILE__`
/// and `__LINE__` placeholders.
pub const EDITOR_ENV: &str = "LIVE_EDITOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKey {
    Caller,
    Definition,
}

impl JumpKey {
    pub fn from_char(key: char) -> Option<JumpKey> {
        match key {
            'c' => Some(JumpKey::Caller),
            'd' => Some(JumpKey::Definition),
            _ => None,
        }
    }
}

/// The key-held / not-held state of the jump interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Idle,
    Held(JumpKey),
}

/// A `file:line` source position parsed from an element annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl FromStr for SourceLocation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (file, line) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("source location missing line: {s}"))?;
        if file.is_empty() {
            bail!("source location missing file: {s}");
        }
        Ok(SourceLocation {
            file: file.to_string(),
            line: line.parse()?,
        })
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpTarget {
    Caller(SourceLocation),
    Definition(SourceLocation),
}

impl JumpTarget {
    pub fn location(&self) -> &SourceLocation {
        match self {
            JumpTarget::Caller(loc) | JumpTarget::Definition(loc) => loc,
        }
    }
}

/// Click interceptor gated on a held key: hold `c` and click to jump to the
/// clicked element's invocation site, hold `d` for its definition site.
/// Clicks with no jump key held pass through untouched.
#[derive(Debug, Default)]
pub struct JumpInterceptor {
    state: KeyState,
}

impl JumpInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    /// Any key press updates the held state; non-jump keys clear it, matching
    /// a last-key-wins keyboard model.
    pub fn key_down(&mut self, key: char) {
        self.state = match JumpKey::from_char(key) {
            Some(jump) => KeyState::Held(jump),
            None => KeyState::Idle,
        };
    }

    pub fn key_up(&mut self) {
        self.state = KeyState::Idle;
    }

    pub fn click(&self, element: &Element) -> Option<JumpTarget> {
        match self.state {
            KeyState::Idle => None,
            KeyState::Held(JumpKey::Caller) => element
                .attr(CALLER_ATTR)
                .and_then(|raw| raw.parse().ok())
                .map(JumpTarget::Caller),
            KeyState::Held(JumpKey::Definition) => element
                .attr(DEF_ATTR)
                .and_then(|raw| raw.parse().ok())
                .map(JumpTarget::Definition),
        }
    }
}

/// Formats editor-launch commands from a template carrying `__FILE__` and
/// `__LINE__` placeholders.
#[derive(Debug, Clone)]
pub struct EditorLauncher {
    template: String,
}

impl EditorLauncher {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(EDITOR_ENV).ok().map(Self::new)
    }

    pub fn command_for(&self, location: &SourceLocation) -> String {
        self.template
            .replace("__FILE__", &location.file)
            .replace("__LINE__", &location.line.to_string())
    }
}

/// The attached diagnostic channel. Streams server logs into the local
/// tracing output and resolves editor jumps.
pub struct LiveReloader {
    session: SessionHandle,
    launcher: Option<EditorLauncher>,
    interceptor: Mutex<JumpInterceptor>,
    logs: Mutex<Option<JoinHandle<()>>>,
}

impl LiveReloader {
    pub fn new(session: SessionHandle, launcher: Option<EditorLauncher>) -> Self {
        Self {
            session,
            launcher,
            interceptor: Mutex::new(JumpInterceptor::new()),
            logs: Mutex::new(None),
        }
    }

    /// Stream server logs to the client's tracing output. Idempotent.
    pub fn enable_server_logs(&self) {
        let mut logs = self.logs.lock();
        if logs.is_some() {
            return;
        }
        let mut rx = self.session.bus().subscribe();
        *logs = Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(PageEvent::ServerLog { level, message }) => match level.as_str() {
                        "error" => tracing::error!(target: "server", "{message}"),
                        "warn" => tracing::warn!(target: "server", "{message}"),
                        "debug" => tracing::debug!(target: "server", "{message}"),
                        _ => tracing::info!(target: "server", "{message}"),
                    },
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
        }));
    }

    pub fn disable_server_logs(&self) {
        if let Some(task) = self.logs.lock().take() {
            task.abort();
        }
    }

    pub fn logs_enabled(&self) -> bool {
        self.logs.lock().is_some()
    }

    pub fn key_down(&self, key: char) {
        self.interceptor.lock().key_down(key);
    }

    pub fn key_up(&self) {
        self.interceptor.lock().key_up();
    }

    /// Resolve a click against the held jump key. When a target resolves and
    /// an editor launcher is configured, the launch command is logged.
    pub fn click(&self, element: &Element) -> Option<JumpTarget> {
        let target = self.interceptor.lock().click(element)?;
        if let Some(launcher) = &self.launcher {
            let command = launcher.command_for(target.location());
            tracing::info!(%command, "opening editor");
        }
        Some(target)
    }
}

impl Drop for LiveReloader {
    fn drop(&mut self) {
        self.disable_server_logs();
    }
}

/// Wait for the one-time attach signal, then bring up the diagnostic
/// channel with server-log streaming enabled.
pub async fn attach(session: SessionHandle) -> Result<LiveReloader> {
    let mut rx = session.bus().subscribe();
    loop {
        match rx.recv().await {
            Ok(PageEvent::ReloadAttached) => break,
            Ok(_) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(_) => bail!("event bus closed before live reload attached"),
        }
    }

    let reloader = LiveReloader::new(session, EditorLauncher::from_env());
    reloader.enable_server_logs();
    tracing::info!("live reload attached");
    Ok(reloader)
}
