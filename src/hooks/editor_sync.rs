use anyhow::Result;
use serde_json::json;

use crate::delta::Source;
use crate::dom::Element;
use crate::editor::{Editor, EditorConfig, SubscriptionId};
use crate::session::SessionHandle;

use super::Hook;

/// Registration name, matching the server templates' hook declaration.
pub const HOOK_NAME: &str = "QuillEditor";

/// Id of the render target the host element must contain.
pub const EDITOR_TARGET_ID: &str = "editor";

/// Outbound event carrying the full document after a user edit.
pub const EDITOR_UPDATED_EVENT: &str = "quill_updated";

/// Binds a rich-text widget to a host element and relays every user-driven
/// edit to the server as a full-content snapshot. Programmatic edits are
/// observed but never relayed, which is what breaks the local → remote →
/// local echo loop. Forwards carry the complete document rather than the
/// incremental delta, so the server's copy is authoritative even if an
/// earlier forward was dropped.
#[derive(Default)]
pub struct EditorSyncHook {
    binding: Option<Binding>,
}

struct Binding {
    editor: Editor,
    subscription: SubscriptionId,
}

impl EditorSyncHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mounted widget, when the host element contained a render target.
    pub fn editor(&self) -> Option<&Editor> {
        self.binding.as_ref().map(|binding| &binding.editor)
    }
}

impl Hook for EditorSyncHook {
    fn mounted(&mut self, host: &Element, session: SessionHandle) -> Result<()> {
        let Some(target) = host.select_by_id(EDITOR_TARGET_ID) else {
            // Conditional rendering may omit the editor; nothing to do.
            tracing::debug!(host = ?host.id(), "host has no editor surface");
            return Ok(());
        };

        let editor = Editor::mount(target, EditorConfig::standard())?;
        let subscription = editor.on_text_change(move |editor, event| {
            if event.source != Source::User {
                return;
            }
            let contents = editor.contents();
            session.push_event(EDITOR_UPDATED_EVENT, json!({ "delta": contents }));
        });

        self.binding = Some(Binding {
            editor,
            subscription,
        });
        Ok(())
    }

    fn destroyed(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.editor.off(binding.subscription);
        }
    }
}
