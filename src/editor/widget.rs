use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::delta::{Attributes, Delta, Document, Source};
use crate::dom::Element;

use super::config::EditorConfig;

/// One content mutation as reported to change listeners: the incremental
/// change, the full contents before it, and who caused it.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub delta: Delta,
    pub previous: Delta,
    pub source: Source,
}

pub type SubscriptionId = Uuid;

type Listener = Box<dyn FnMut(&Editor, &ChangeEvent) + Send>;

/// The rich-text widget. Holds the document and delivers change events to
/// subscribers inline, in emission order, on the mutating caller's thread.
///
/// Listeners must not mutate the editor from inside the callback.
#[derive(Clone)]
pub struct Editor {
    inner: Arc<EditorInner>,
}

struct EditorInner {
    config: EditorConfig,
    document: Mutex<Document>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl Editor {
    /// Construct the widget on a render target, seeded with the target's
    /// existing text. Fails only on a malformed configuration.
    pub fn mount(target: &Element, config: EditorConfig) -> Result<Editor> {
        config.validate()?;
        let document = target
            .text()
            .map(Document::from_text)
            .unwrap_or_default();
        Ok(Editor {
            inner: Arc::new(EditorInner {
                config,
                document: Mutex::new(document),
                listeners: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.inner.config
    }

    /// Full current contents as a delta of inserts.
    pub fn contents(&self) -> Delta {
        self.inner.document.lock().contents()
    }

    pub fn text(&self) -> String {
        self.inner.document.lock().text()
    }

    pub fn len(&self) -> usize {
        self.inner.document.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.document.lock().is_empty()
    }

    /// Subscribe to content mutations. Listeners fire for `User` and `Api`
    /// sources, never for `Silent`.
    pub fn on_text_change(
        &self,
        listener: impl FnMut(&Editor, &ChangeEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = Uuid::new_v4();
        self.inner
            .listeners
            .lock()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a change subscription. Returns false when the id is unknown.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sub, _)| *sub != id);
        listeners.len() != before
    }

    /// Compose a change onto the document and notify listeners.
    pub fn apply(&self, change: &Delta, source: Source) {
        let previous = {
            let mut document = self.inner.document.lock();
            let previous = document.contents();
            document.compose(change);
            previous
        };

        if source == Source::Silent {
            return;
        }

        let event = ChangeEvent {
            delta: change.clone(),
            previous,
            source,
        };
        let mut listeners = self.inner.listeners.lock();
        for (_, listener) in listeners.iter_mut() {
            listener(self, &event);
        }
    }

    pub fn insert_text(&self, index: usize, text: &str, source: Source) {
        self.apply(&Delta::new().retain(index).insert(text), source);
    }

    pub fn delete_text(&self, index: usize, len: usize, source: Source) {
        self.apply(&Delta::new().retain(index).delete(len), source);
    }

    pub fn format_text(&self, index: usize, len: usize, attributes: Attributes, source: Source) {
        self.apply(&Delta::new().retain(index).retain_with(len, attributes), source);
    }

    /// Replace the whole document.
    pub fn set_contents(&self, contents: Delta, source: Source) {
        let previous_len = self.len();
        let change = contents.delete(previous_len);
        self.apply(&change, source);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use crate::editor::config::{Theme, ToolbarGroup};

    use super::*;

    fn editor() -> Editor {
        let target = Element::new("div").with_id("editor");
        Editor::mount(&target, EditorConfig::standard()).unwrap()
    }

    fn recorded(editor: &Editor) -> (Arc<Mutex<Vec<ChangeEvent>>>, SubscriptionId) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let id = editor.on_text_change(move |_, event| sink.lock().push(event.clone()));
        (events, id)
    }

    #[test]
    fn seeds_document_from_target_text() {
        let target = Element::new("div").with_id("editor").with_text("seed");
        let editor = Editor::mount(&target, EditorConfig::standard()).unwrap();
        assert_eq!(editor.text(), "seed");
    }

    #[test]
    fn invalid_config_fails_construction() {
        let target = Element::new("div").with_id("editor");
        let config = EditorConfig {
            theme: Theme::Snow,
            toolbar: vec![ToolbarGroup(vec![])],
        };
        assert!(Editor::mount(&target, config).is_err());
    }

    #[test]
    fn user_edit_notifies_with_previous_contents() {
        let editor = editor();
        let (events, _) = recorded(&editor);

        editor.insert_text(0, "a", Source::User);
        editor.insert_text(1, "b", Source::User);

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].previous, Delta::new());
        assert_eq!(events[0].source, Source::User);
        assert_eq!(events[1].previous, Delta::new().insert("a"));
        assert_eq!(editor.text(), "ab");
    }

    #[test]
    fn api_edits_notify_with_api_source() {
        let editor = editor();
        let (events, _) = recorded(&editor);

        editor.set_contents(Delta::new().insert("seed"), Source::Api);

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, Source::Api);
        assert_eq!(editor.text(), "seed");
    }

    #[test]
    fn silent_edits_mutate_without_events() {
        let editor = editor();
        let (events, _) = recorded(&editor);

        editor.insert_text(0, "quiet", Source::Silent);

        assert!(events.lock().is_empty());
        assert_eq!(editor.text(), "quiet");
    }

    #[test]
    fn unsubscribed_listener_sees_nothing() {
        let editor = editor();
        let (events, id) = recorded(&editor);

        editor.insert_text(0, "a", Source::User);
        assert!(editor.off(id));
        editor.insert_text(1, "b", Source::User);

        assert_eq!(events.lock().len(), 1);
        assert!(!editor.off(id));
    }

    #[test]
    fn set_contents_replaces_document() {
        let editor = editor();
        editor.set_contents(Delta::new().insert("first"), Source::Api);
        editor.set_contents(Delta::new().insert("second"), Source::Api);
        assert_eq!(editor.text(), "second");
    }

    #[test]
    fn format_text_attaches_attributes() {
        let editor = editor();
        editor.insert_text(0, "bold", Source::User);
        editor.format_text(
            0,
            4,
            [("bold".to_string(), json!(true))].into_iter().collect(),
            Source::User,
        );
        let contents = editor.contents();
        assert_eq!(
            contents,
            Delta::new().insert_with(
                "bold",
                [("bold".to_string(), json!(true))].into_iter().collect()
            )
        );
    }
}
