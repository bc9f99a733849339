use std::mem::discriminant;

use anyhow::{bail, Result};

/// Visual theme for the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Snow,
    Bubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

/// One control in the widget's toolbar. The supported formatting capabilities
/// are a closed set; the toolbar is assembled from these rather than from
/// free-form configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarControl {
    /// Header-level picker. Always offers a "normal text" reset alongside the
    /// listed levels.
    Headers(Vec<HeaderLevel>),
    Bold,
    Italic,
    Underline,
    Strike,
    OrderedList,
    BulletList,
    Link,
    Blockquote,
    CodeBlock,
    TextColor,
    Background,
    ClearFormatting,
}

/// Controls rendered together, separated from neighboring groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarGroup(pub Vec<ToolbarControl>);

/// Widget construction policy: theme plus toolbar layout.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub theme: Theme,
    pub toolbar: Vec<ToolbarGroup>,
}

impl EditorConfig {
    /// The fixed capability set every synced editor mounts with: headers 1-3,
    /// inline emphasis, lists, link/quote/code, color controls, and a
    /// clear-formatting control, under the Snow theme. Not user-configurable
    /// at this layer.
    pub fn standard() -> Self {
        use ToolbarControl::*;
        Self {
            theme: Theme::Snow,
            toolbar: vec![
                ToolbarGroup(vec![Headers(vec![
                    HeaderLevel::H1,
                    HeaderLevel::H2,
                    HeaderLevel::H3,
                ])]),
                ToolbarGroup(vec![Bold, Italic, Underline, Strike]),
                ToolbarGroup(vec![OrderedList, BulletList]),
                ToolbarGroup(vec![Link, Blockquote, CodeBlock]),
                ToolbarGroup(vec![TextColor, Background]),
                ToolbarGroup(vec![ClearFormatting]),
            ],
        }
    }

    /// Reject malformed toolbars at construction time. A failure here is a
    /// programming error, not a runtime condition.
    pub fn validate(&self) -> Result<()> {
        let mut seen = Vec::new();
        for group in &self.toolbar {
            if group.0.is_empty() {
                bail!("toolbar group must contain at least one control");
            }
            for control in &group.0 {
                let kind = discriminant(control);
                if seen.contains(&kind) {
                    bail!("duplicate toolbar control: {control:?}");
                }
                seen.push(kind);

                if let ToolbarControl::Headers(levels) = control {
                    if levels.is_empty() {
                        bail!("header picker must offer at least one level");
                    }
                    let mut level_seen = Vec::new();
                    for level in levels {
                        if level_seen.contains(level) {
                            bail!("duplicate header level: {level:?}");
                        }
                        level_seen.push(*level);
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policy_is_valid() {
        assert!(EditorConfig::standard().validate().is_ok());
    }

    #[test]
    fn standard_policy_uses_snow_theme() {
        assert_eq!(EditorConfig::standard().theme, Theme::Snow);
    }

    #[test]
    fn empty_group_is_rejected() {
        let config = EditorConfig {
            theme: Theme::Snow,
            toolbar: vec![ToolbarGroup(vec![])],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_control_is_rejected() {
        let config = EditorConfig {
            theme: Theme::Snow,
            toolbar: vec![
                ToolbarGroup(vec![ToolbarControl::Bold]),
                ToolbarGroup(vec![ToolbarControl::Bold]),
            ],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_header_level_is_rejected() {
        let config = EditorConfig {
            theme: Theme::Snow,
            toolbar: vec![ToolbarGroup(vec![ToolbarControl::Headers(vec![
                HeaderLevel::H1,
                HeaderLevel::H1,
            ])])],
        };
        assert!(config.validate().is_err());
    }
}
