use std::collections::BTreeMap;

/// Attribute that names the hook bound to an element.
pub const HOOK_ATTR: &str = "data-hook";

/// A server-managed element as seen by this layer: enough structure to honor
/// the hook contract (stable id, attributes, an identifiable child to render
/// into) without carrying a full markup tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Name of the hook declared on this element, if any.
    pub fn hook_name(&self) -> Option<&str> {
        self.attr(HOOK_ATTR)
    }

    /// Depth-first search of descendants for an element with the given id.
    /// The element itself is not considered, matching selector semantics.
    pub fn select_by_id(&self, id: &str) -> Option<&Element> {
        for child in &self.children {
            if child.id.as_deref() == Some(id) {
                return Some(child);
            }
            if let Some(found) = child.select_by_id(id) {
                return Some(found);
            }
        }
        None
    }
}
