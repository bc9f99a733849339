pub mod document;
pub mod ops;

pub use document::Document;
pub use ops::{Attributes, Delta, DeltaOp, Source};

// Rich-text delta model: a document is a delta of inserts, a change is a
// delta of insert/retain/delete ops, and composing a change onto a document
// yields the next document. Lengths are measured in Unicode scalar values.
