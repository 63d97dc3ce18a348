//! Visual state and the render pass.
//!
//! The filter decides *what* matches; this module decides how that is drawn:
//! element display, disclosure open state, and the three inline content
//! properties (max-height, opacity, overflow) used by the expand/collapse
//! transition.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use indextree::NodeId;

use crate::filter::MatchSet;
use crate::index::NavTree;
use crate::page::{ElementId, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Shown,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxHeight {
    /// No clamp
    None,
    /// Clamped to a height in rows
    Px(u32),
}

impl fmt::Display for MaxHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxHeight::None => write!(f, "none"),
            MaxHeight::Px(px) => write!(f, "{}px", px),
        }
    }
}

impl Serialize for MaxHeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Visible,
    Hidden,
}

/// Inline style of a disclosure's content list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContentStyle {
    pub max_height: MaxHeight,
    pub opacity: f32,
    pub overflow: Overflow,
}

impl ContentStyle {
    pub fn expanded() -> Self {
        Self {
            max_height: MaxHeight::None,
            opacity: 1.0,
            overflow: Overflow::Visible,
        }
    }

    pub fn collapsed() -> Self {
        Self {
            max_height: MaxHeight::Px(0),
            opacity: 0.0,
            overflow: Overflow::Hidden,
        }
    }

    /// How many of `total` content rows fit under the height clamp.
    pub fn visible_rows(&self, total: usize) -> usize {
        match self.max_height {
            MaxHeight::None => total,
            MaxHeight::Px(px) => total.min(px as usize),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElementStyle {
    pub display: Display,
    pub open: bool,
    /// Present only for elements that own a content list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentStyle>,
}

impl ElementStyle {
    fn from_markup(open: bool, has_content: bool) -> Self {
        let content = has_content.then(|| {
            if open {
                ContentStyle::expanded()
            } else {
                ContentStyle::collapsed()
            }
        });
        Self {
            display: Display::Shown,
            open,
            content,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.display == Display::Shown
    }
}

/// Style of every page element, addressed by handle.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct VisualState {
    styles: BTreeMap<ElementId, ElementStyle>,
}

impl VisualState {
    /// Mirror the document as loaded: everything shown, disclosures per markup.
    pub fn from_page(page: &Page) -> Self {
        let styles = page
            .elements()
            .map(|(id, info)| {
                (
                    id,
                    ElementStyle::from_markup(info.open, info.content_len.is_some()),
                )
            })
            .collect();
        Self { styles }
    }

    pub fn style(&self, id: ElementId) -> Option<&ElementStyle> {
        self.styles.get(&id)
    }

    pub fn is_shown(&self, id: ElementId) -> bool {
        self.styles.get(&id).is_some_and(ElementStyle::is_shown)
    }

    pub fn is_open(&self, id: ElementId) -> bool {
        self.styles.get(&id).is_some_and(|s| s.open)
    }

    fn entry(&mut self, id: ElementId) -> &mut ElementStyle {
        self.styles
            .entry(id)
            .or_insert_with(|| ElementStyle::from_markup(false, false))
    }

    pub fn set_display(&mut self, id: ElementId, display: Display) {
        self.entry(id).display = display;
    }

    /// Force a disclosure open with its content fully visible.
    pub fn expand(&mut self, id: ElementId) {
        let style = self.entry(id);
        style.open = true;
        if let Some(content) = style.content.as_mut() {
            *content = ContentStyle::expanded();
        }
    }

    /// Force a disclosure closed with its content clamped away.
    pub fn collapse(&mut self, id: ElementId) {
        let style = self.entry(id);
        style.open = false;
        if let Some(content) = style.content.as_mut() {
            *content = ContentStyle::collapsed();
        }
    }

    /// Overwrite open state and content style (animation frames).
    pub fn set_disclosure(&mut self, id: ElementId, open: bool, content: ContentStyle) {
        let style = self.entry(id);
        style.open = open;
        if style.content.is_some() {
            style.content = Some(content);
        }
    }
}

/// Idle policy: show everything, open kept nodes, close the other disclosures.
pub fn reset_visibility(tree: &NavTree, current: NodeId, state: &mut VisualState) {
    let node = tree.node(current);
    state.set_display(node.element, Display::Shown);

    if node.keep_expanded {
        state.expand(node.element);
    } else if node.expandable {
        state.collapse(node.element);
    }

    for child in tree.children(current) {
        reset_visibility(tree, child, state);
    }
}

/// Search policy: matched nodes are shown (and opened), the rest hidden (and closed).
pub fn apply_matches(tree: &NavTree, matches: &MatchSet, state: &mut VisualState) {
    for id in tree.descendants() {
        let node = tree.node(id);
        if matches.contains(id) {
            state.set_display(node.element, Display::Shown);
            if node.expandable {
                state.expand(node.element);
            }
        } else {
            state.set_display(node.element, Display::Hidden);
            if node.expandable {
                state.collapse(node.element);
            }
        }
    }
}
