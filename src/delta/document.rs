use super::ops::{Delta, DeltaOp};

/// The full contents of one editing surface, maintained by composing change
/// deltas in arrival order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    contents: Delta,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let contents = if text.is_empty() {
            Delta::new()
        } else {
            Delta::new().insert(text)
        };
        Self { contents }
    }

    /// Apply one change. A change that retains or deletes past the end of the
    /// document leaves no residue in the contents.
    pub fn compose(&mut self, change: &Delta) {
        let composed = self.contents.compose(change);
        self.contents = Delta {
            ops: composed
                .ops
                .into_iter()
                .filter(|op| matches!(op, DeltaOp::Insert { .. }))
                .collect(),
        };
    }

    /// Full current contents as a delta of inserts.
    pub fn contents(&self) -> Delta {
        self.contents.clone()
    }

    pub fn text(&self) -> String {
        self.contents.text()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn seeds_from_text() {
        let doc = Document::from_text("seed");
        assert_eq!(doc.contents(), Delta::new().insert("seed"));
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn composes_changes_in_order() {
        let mut doc = Document::new();
        doc.compose(&Delta::new().insert("a"));
        assert_eq!(doc.text(), "a");
        doc.compose(&Delta::new().retain(1).insert("b"));
        assert_eq!(doc.text(), "ab");
        assert_eq!(doc.contents(), Delta::new().insert("ab"));
    }

    #[test]
    fn over_long_delete_leaves_clean_document() {
        let mut doc = Document::from_text("ab");
        doc.compose(&Delta::new().delete(10));
        assert!(doc.is_empty());
        assert!(doc.contents().is_document());
    }
}
