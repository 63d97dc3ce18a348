//! Navigation tree indexing.
//!
//! Walks the page outline (category → section → entry) and builds an
//! arena-backed tree beneath a synthetic root. Every node is bound to exactly
//! one page element. Malformed markup drops the affected item silently.

use indextree::{Arena, NodeId};
use serde::Serialize;

use crate::config::IndexConfig;
use crate::page::{ElementId, ElementKind, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Category,
    Section,
    Entry,
}

/// One entry in the navigation hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavNode {
    /// Lowercase search name; entries use `section.entry`
    pub name: String,
    /// Display label as written in the markup
    pub label: String,
    pub element: ElementId,
    pub expandable: bool,
    /// Forced open regardless of match state
    pub keep_expanded: bool,
    pub kind: NodeKind,
}

impl NavNode {
    fn root(element: ElementId) -> Self {
        Self {
            name: String::new(),
            label: String::new(),
            element,
            expandable: true,
            keep_expanded: true,
            kind: NodeKind::Root,
        }
    }
}

/// Trim and lowercase a markup label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Arena-backed navigation tree. Structure is fixed after [`build`].
#[derive(Debug)]
pub struct NavTree {
    arena: Arena<NavNode>,
    root: NodeId,
}

impl NavTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node data for an id produced by this tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another tree.
    pub fn node(&self, id: NodeId) -> &NavNode {
        self.arena[id].get()
    }

    pub fn get(&self, id: NodeId) -> Option<&NavNode> {
        self.arena.get(id).map(|n| n.get())
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent())
    }

    /// All nodes in pre-order, root first.
    pub fn descendants(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root.descendants(&self.arena)
    }

    /// `id` and all nodes below it, in pre-order.
    pub fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// Number of ancestors between `id` and the synthetic root (root is 0).
    pub fn depth(&self, id: NodeId) -> usize {
        id.ancestors(&self.arena).count().saturating_sub(1)
    }

    /// Total node count, including the synthetic root.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children(&self.arena).next().is_none()
    }

    /// First node (pre-order) with exactly this name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.descendants()
            .find(|&id| self.node(id).kind != NodeKind::Root && self.node(id).name == name)
    }

    /// First node bound to the given element.
    pub fn find_element(&self, element: ElementId) -> Option<NodeId> {
        self.descendants().find(|&id| self.node(id).element == element)
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.descendants()
            .filter(|&id| self.node(id).kind == kind)
            .count()
    }

    /// Render the tree with box-drawing characters, skipping the synthetic root.
    pub fn render_tree(&self) -> String {
        self.render_filtered(|_| true)
    }

    /// Render only nodes accepted by `keep`. A rejected node hides its subtree.
    pub fn render_filtered(&self, keep: impl Fn(NodeId) -> bool) -> String {
        let mut out = String::new();
        let children: Vec<_> = self.children(self.root).filter(|&c| keep(c)).collect();
        for (i, &child) in children.iter().enumerate() {
            self.render_box(child, "", i == children.len() - 1, &keep, &mut out);
        }
        out
    }

    fn render_box(
        &self,
        id: NodeId,
        prefix: &str,
        is_last: bool,
        keep: &impl Fn(NodeId) -> bool,
        out: &mut String,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&self.node(id).name);
        out.push('\n');

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let children: Vec<_> = self.children(id).filter(|&c| keep(c)).collect();
        for (i, &child) in children.iter().enumerate() {
            self.render_box(child, &child_prefix, i == children.len() - 1, keep, out);
        }
    }
}

/// Build the navigation tree from a page.
///
/// Binds each indexed element exclusively, so an element that would back two
/// nodes is only used by the first and the second item is skipped.
pub fn build(page: &mut Page, config: &IndexConfig) -> NavTree {
    let mut arena = Arena::new();
    let root = arena.new_node(NavNode::root(page.placeholder()));
    let outline = page.outline();

    let mut sections = 0;
    let mut entries = 0;

    for category in outline.categories {
        let Some(heading) = category.heading else {
            tracing::debug!("skipping category without heading");
            continue;
        };
        let category_name = normalize_label(&heading);
        if config.is_skipped(&category_name) {
            tracing::debug!(category = %category_name, "skipping excluded category");
            continue;
        }
        let Some(element) = page.bind(category.node, ElementKind::Category) else {
            continue;
        };

        let category_id = arena.new_node(NavNode {
            name: category_name,
            label: heading,
            element,
            expandable: true,
            keep_expanded: true,
            kind: NodeKind::Category,
        });
        root.append(category_id, &mut arena);

        for section in category.sections {
            let (Some(disclosure), Some(label)) = (section.disclosure, section.label) else {
                tracing::debug!(category = %arena[category_id].get().name, "skipping malformed section");
                continue;
            };
            let Some(element) = page.bind(disclosure, ElementKind::Disclosure) else {
                continue;
            };

            let section_name = normalize_label(&label);
            let section_id = arena.new_node(NavNode {
                name: section_name.clone(),
                label,
                element,
                expandable: true,
                keep_expanded: false,
                kind: NodeKind::Section,
            });
            category_id.append(section_id, &mut arena);
            sections += 1;

            for entry in section.entries {
                let Some(element) = page.bind(entry.item, ElementKind::ListItem) else {
                    tracing::debug!(entry = %entry.label, "list item already indexed");
                    continue;
                };
                let entry_id = arena.new_node(NavNode {
                    name: format!("{}.{}", section_name, normalize_label(&entry.label)),
                    label: entry.label,
                    element,
                    expandable: false,
                    keep_expanded: false,
                    kind: NodeKind::Entry,
                });
                section_id.append(entry_id, &mut arena);
                entries += 1;
            }
        }
    }

    let tree = NavTree { arena, root };
    tracing::info!(
        categories = tree.children(root).count(),
        sections,
        entries,
        "indexed navigation tree"
    );
    tree
}
