use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Formatting attributes attached to an insert or retain. A `null` value in a
/// change removes the attribute when composed onto a document.
pub type Attributes = BTreeMap<String, Value>;

/// Marker on a change event distinguishing who caused the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// A user-driven edit. The only source that is relayed to the server.
    User,
    /// A programmatic edit. Observed locally, never relayed.
    Api,
    /// Applied without emitting a change event at all.
    Silent,
}

/// One operation in a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaOp {
    Insert {
        insert: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<Attributes>,
    },
    Retain {
        retain: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<Attributes>,
    },
    Delete {
        delete: usize,
    },
}

impl DeltaOp {
    pub fn len(&self) -> usize {
        match self {
            DeltaOp::Insert { insert, .. } => insert.chars().count(),
            DeltaOp::Retain { retain, .. } => *retain,
            DeltaOp::Delete { delete } => *delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered sequence of insert/retain/delete operations describing a
/// rich-text document or a change to one.
///
/// Wire shape matches the widget's native representation:
/// `{"ops":[{"insert":"hi","attributes":{"bold":true}},{"retain":3},{"delete":1}]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub ops: Vec<DeltaOp>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(self, text: impl Into<String>) -> Self {
        self.push(DeltaOp::Insert {
            insert: text.into(),
            attributes: None,
        })
    }

    pub fn insert_with(self, text: impl Into<String>, attributes: Attributes) -> Self {
        self.push(DeltaOp::Insert {
            insert: text.into(),
            attributes: normalize(Some(attributes)),
        })
    }

    pub fn retain(self, len: usize) -> Self {
        self.push(DeltaOp::Retain {
            retain: len,
            attributes: None,
        })
    }

    pub fn retain_with(self, len: usize, attributes: Attributes) -> Self {
        self.push(DeltaOp::Retain {
            retain: len,
            attributes: normalize(Some(attributes)),
        })
    }

    pub fn delete(self, len: usize) -> Self {
        self.push(DeltaOp::Delete { delete: len })
    }

    /// Append an op, merging it into the previous one when both are the same
    /// kind with matching attributes.
    pub fn push(mut self, op: DeltaOp) -> Self {
        if op.is_empty() {
            return self;
        }
        let merged = match (self.ops.last_mut(), &op) {
            (
                Some(DeltaOp::Insert { insert: prev, attributes: prev_attrs }),
                DeltaOp::Insert { insert, attributes },
            ) if *prev_attrs == *attributes => {
                prev.push_str(insert);
                true
            }
            (
                Some(DeltaOp::Retain { retain: prev, attributes: prev_attrs }),
                DeltaOp::Retain { retain, attributes },
            ) if *prev_attrs == *attributes => {
                *prev += retain;
                true
            }
            (Some(DeltaOp::Delete { delete: prev }), DeltaOp::Delete { delete }) => {
                *prev += delete;
                true
            }
            _ => false,
        };
        if !merged {
            self.ops.push(op);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True when the delta contains only inserts, i.e. it describes a full
    /// document rather than a change.
    pub fn is_document(&self) -> bool {
        self.ops
            .iter()
            .all(|op| matches!(op, DeltaOp::Insert { .. }))
    }

    /// Total length covered by all ops.
    pub fn len(&self) -> usize {
        self.ops.iter().map(DeltaOp::len).sum()
    }

    /// Concatenated text of all inserts.
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DeltaOp::Insert { insert, .. } => Some(insert.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Compose `change` onto this delta, producing the combined delta. When
    /// `self` is a document, the result is the document after the change.
    pub fn compose(&self, change: &Delta) -> Delta {
        let mut a = OpCursor::new(self);
        let mut b = OpCursor::new(change);
        let mut out = Delta::new();

        while a.has_next() || b.has_next() {
            if matches!(b.peek(), Some(DeltaOp::Insert { .. })) {
                out = out.push(b.next(usize::MAX));
                continue;
            }
            if matches!(a.peek(), Some(DeltaOp::Delete { .. })) {
                out = out.push(a.next(usize::MAX));
                continue;
            }

            let len = a.peek_len().min(b.peek_len());
            let a_op = a.next(len);
            let b_op = b.next(len);

            match b_op {
                DeltaOp::Retain { attributes: b_attrs, .. } => {
                    let merged = match a_op {
                        DeltaOp::Insert { insert, attributes } => DeltaOp::Insert {
                            insert,
                            attributes: compose_attributes(attributes, b_attrs, false),
                        },
                        DeltaOp::Retain { retain, attributes } => DeltaOp::Retain {
                            retain,
                            attributes: compose_attributes(attributes, b_attrs, true),
                        },
                        DeltaOp::Delete { .. } => a_op,
                    };
                    out = out.push(merged);
                }
                DeltaOp::Delete { delete } => {
                    // Deleting a retained region survives; deleting a pending
                    // insert cancels both.
                    if matches!(a_op, DeltaOp::Retain { .. }) {
                        out = out.push(DeltaOp::Delete { delete });
                    }
                }
                DeltaOp::Insert { .. } => unreachable!("inserts are drained above"),
            }
        }

        out.chop()
    }

    /// Drop trailing attribute-free retains.
    fn chop(mut self) -> Self {
        while matches!(
            self.ops.last(),
            Some(DeltaOp::Retain { attributes: None, .. })
        ) {
            self.ops.pop();
        }
        self
    }
}

fn normalize(attributes: Option<Attributes>) -> Option<Attributes> {
    attributes.filter(|attrs| !attrs.is_empty())
}

fn compose_attributes(
    a: Option<Attributes>,
    b: Option<Attributes>,
    keep_null: bool,
) -> Option<Attributes> {
    let mut merged = a.unwrap_or_default();
    if let Some(b) = b {
        for (key, value) in b {
            merged.insert(key, value);
        }
    }
    if !keep_null {
        merged.retain(|_, value| !value.is_null());
    }
    normalize(Some(merged))
}

/// Walks a delta's ops with partial consumption. Past the end it yields
/// implicit attribute-free retains, so a change may retain or delete beyond
/// the ops it composes against.
struct OpCursor<'a> {
    ops: &'a [DeltaOp],
    index: usize,
    offset: usize,
}

impl<'a> OpCursor<'a> {
    fn new(delta: &'a Delta) -> Self {
        Self {
            ops: &delta.ops,
            index: 0,
            offset: 0,
        }
    }

    fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    fn peek(&self) -> Option<&DeltaOp> {
        self.ops.get(self.index)
    }

    fn peek_len(&self) -> usize {
        match self.peek() {
            Some(op) => op.len() - self.offset,
            None => usize::MAX,
        }
    }

    fn next(&mut self, max: usize) -> DeltaOp {
        let Some(op) = self.ops.get(self.index) else {
            return DeltaOp::Retain {
                retain: max,
                attributes: None,
            };
        };

        let remaining = op.len() - self.offset;
        let take = max.min(remaining);
        let out = match op {
            DeltaOp::Insert { insert, attributes } => DeltaOp::Insert {
                insert: insert.chars().skip(self.offset).take(take).collect(),
                attributes: attributes.clone(),
            },
            DeltaOp::Retain { attributes, .. } => DeltaOp::Retain {
                retain: take,
                attributes: attributes.clone(),
            },
            DeltaOp::Delete { .. } => DeltaOp::Delete { delete: take },
        };

        self.offset += take;
        if self.offset == op.len() {
            self.index += 1;
            self.offset = 0;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn push_merges_adjacent_ops() {
        let delta = Delta::new().insert("he").insert("llo").delete(2).delete(1);
        assert_eq!(
            delta.ops,
            vec![
                DeltaOp::Insert {
                    insert: "hello".into(),
                    attributes: None
                },
                DeltaOp::Delete { delete: 3 },
            ]
        );
    }

    #[test]
    fn push_keeps_ops_with_different_attributes_apart() {
        let delta = Delta::new()
            .insert("plain")
            .insert_with("bold", attrs(&[("bold", json!(true))]));
        assert_eq!(delta.ops.len(), 2);
    }

    #[test]
    fn zero_length_ops_are_dropped() {
        let delta = Delta::new().retain(0).insert("").delete(0);
        assert!(delta.is_empty());
    }

    #[test]
    fn compose_insert_into_document() {
        let doc = Delta::new().insert("ad");
        let change = Delta::new().retain(1).insert("bc");
        assert_eq!(doc.compose(&change), Delta::new().insert("abcd"));
    }

    #[test]
    fn compose_delete_cancels_insert() {
        let doc = Delta::new().insert("abc");
        let change = Delta::new().retain(1).delete(1);
        assert_eq!(doc.compose(&change), Delta::new().insert("ac"));
    }

    #[test]
    fn compose_merges_attributes() {
        let doc = Delta::new().insert_with("ab", attrs(&[("bold", json!(true))]));
        let change = Delta::new().retain_with(2, attrs(&[("italic", json!(true))]));
        assert_eq!(
            doc.compose(&change),
            Delta::new().insert_with(
                "ab",
                attrs(&[("bold", json!(true)), ("italic", json!(true))])
            )
        );
    }

    #[test]
    fn compose_null_attribute_removes_formatting() {
        let doc = Delta::new().insert_with("ab", attrs(&[("bold", json!(true))]));
        let change = Delta::new().retain_with(2, attrs(&[("bold", Value::Null)]));
        assert_eq!(doc.compose(&change), Delta::new().insert("ab"));
    }

    #[test]
    fn compose_chops_trailing_retain() {
        let doc = Delta::new().insert("ab");
        let change = Delta::new().retain(10);
        assert_eq!(doc.compose(&change), doc);
    }

    #[test]
    fn compose_handles_multibyte_text() {
        let doc = Delta::new().insert("日本語");
        let change = Delta::new().retain(1).delete(1).insert("和");
        assert_eq!(doc.compose(&change), Delta::new().insert("日和語"));
        assert_eq!(doc.compose(&change).text(), "日和語");
    }

    #[test]
    fn wire_shape_matches_native_representation() {
        let delta = Delta::new()
            .insert_with("hi", attrs(&[("bold", json!(true))]))
            .retain(3)
            .delete(1);
        let encoded = serde_json::to_value(&delta).unwrap();
        assert_eq!(
            encoded,
            json!({"ops": [
                {"insert": "hi", "attributes": {"bold": true}},
                {"retain": 3},
                {"delete": 1}
            ]})
        );
        let decoded: Delta = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, delta);
    }

    #[test]
    fn source_tags_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Source::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Source::Api).unwrap(), "\"api\"");
        assert_eq!(serde_json::to_string(&Source::Silent).unwrap(), "\"silent\"");
    }
}
