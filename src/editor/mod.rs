pub mod config;
pub mod widget;

pub use config::{EditorConfig, HeaderLevel, Theme, ToolbarControl, ToolbarGroup};
pub use widget::{ChangeEvent, Editor, SubscriptionId};
