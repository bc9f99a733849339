//! # Live - Live-Update Session Client
//!
//! Client library for socket-based live-update applications: one persistent
//! session per process, element hooks bound on top of it, and a rich-text
//! editor that relays user edits to the server as full-document snapshots.
//!
//! ## Features
//!
//! - **Session bootstrap**: one call wires the transport, the
//!   loading-progress indicator, the debug accessor, and (in development)
//!   the live-reload diagnostic channel
//! - **Editor sync hook**: user-driven edits, and only user-driven edits,
//!   are forwarded exactly once, in order, as authoritative full-content
//!   snapshots
//! - **Typed deltas**: insert/retain/delete operations with attribute
//!   compose semantics, in the widget's native wire shape
//! - **Best-effort relay**: no queues, no retries; a dropped forward is
//!   repaired by the next edit's full snapshot
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use live::{Element, SessionConfig};
//! use live::dom::HOOK_ATTR;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = live::start(
//!         "ws://127.0.0.1:4000/live",
//!         SessionConfig::new().csrf_token("token-from-page"),
//!     )
//!     .await?;
//!
//!     let host = Element::new("div")
//!         .with_id("notebook")
//!         .with_attr(HOOK_ATTR, "QuillEditor")
//!         .with_child(Element::new("div").with_id("editor"));
//!     client.mount(&host)?;
//!
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod debug;
pub mod delta;
pub mod dom;
pub mod editor;
pub mod events;
pub mod hooks;
pub mod progress;
pub mod reload;
pub mod session;

// Re-export main types for library consumers
pub use bootstrap::{start, Client};
pub use delta::{Delta, DeltaOp, Document, Source};
pub use dom::Element;
pub use editor::{ChangeEvent, Editor, EditorConfig, Theme};
pub use events::{EventBus, PageEvent};
pub use hooks::{EditorSyncHook, Hook, HookRegistry};
pub use progress::ProgressBar;
pub use session::{connect, ConnectionState, LiveSession, SessionConfig, SessionHandle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
