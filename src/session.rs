//! A loaded page with its index, filter, and disclosure animations.

use indextree::NodeId;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use crate::animation::{self, Animations, ClickResult, ClickTarget};
use crate::config::Config;
use crate::filter::{FilterEngine, FilterOutcome};
use crate::index::{self, NavNode, NavTree, NodeKind};
use crate::page::{Page, PageError};
use crate::render::{ElementStyle, VisualState};

/// One drawable line of the navigation view.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    #[serde(skip)]
    pub id: NodeId,
    pub depth: usize,
    pub name: String,
    pub label: String,
    pub kind: NodeKind,
    pub expandable: bool,
    pub open: bool,
    pub href: Option<String>,
    pub style: Option<ElementStyle>,
}

pub struct Session {
    page: Page,
    engine: FilterEngine,
    animations: Animations,
    query: String,
}

impl Session {
    pub fn load(path: &Path, config: &Config) -> Result<Self, PageError> {
        let page = Page::load(path, &config.selectors)?;
        Ok(Self::from_page(page, config))
    }

    pub fn parse(html: &str, config: &Config) -> Result<Self, PageError> {
        let page = Page::parse(html, &config.selectors)?;
        Ok(Self::from_page(page, config))
    }

    /// Index the page, then wire animations on every disclosure.
    pub fn from_page(mut page: Page, config: &Config) -> Self {
        let tree = index::build(&mut page, &config.index);
        let animations = animation::wire_disclosures(&mut page, &config.animation);
        let engine = FilterEngine::new(tree, &page, &config.search);

        Self {
            page,
            engine,
            animations,
            query: String::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn tree(&self) -> &NavTree {
        self.engine.tree()
    }

    pub fn state(&self) -> &VisualState {
        self.engine.state()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, raw: &str) -> FilterOutcome {
        self.query = raw.to_string();
        let outcome = self.engine.on_query_changed(raw);
        self.animations.sync(self.engine.state_mut());
        outcome
    }

    /// Click a node's summary (or its embedded link). Entries navigate to their link.
    pub fn click(&mut self, id: NodeId, target: ClickTarget, now: Instant) -> ClickResult {
        let node = self.engine.tree().node(id);
        let element = node.element;
        if !node.expandable {
            let href = self.page.element(element).and_then(|e| e.href.clone());
            return ClickResult::Navigate(href);
        }

        let result = self.animations.click(element, target, now);
        self.animations.flush(element, self.engine.state_mut());
        result
    }

    pub fn tick(&mut self, now: Instant) {
        self.animations.tick(now, self.engine.state_mut());
    }

    pub fn is_animating(&self) -> bool {
        self.animations.is_animating()
    }

    /// The section disclosure already open in the markup, if indexed.
    pub fn initially_open(&self) -> Option<NodeId> {
        let element = self.page.initially_open()?;
        self.tree().find_element(element)
    }

    /// Drawable rows: shown nodes whose ancestors are open, honoring content
    /// clamps of disclosures that are mid-transition.
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let tree = self.tree();
        self.collect_rows(tree.root(), 0, &mut rows);
        rows
    }

    fn collect_rows(&self, id: NodeId, depth: usize, rows: &mut Vec<Row>) {
        let tree = self.tree();
        let state = self.state();

        let shown: Vec<NodeId> = tree
            .children(id)
            .filter(|&c| state.is_shown(tree.node(c).element))
            .collect();
        let limit = state
            .style(tree.node(id).element)
            .and_then(|s| s.content)
            .map(|c| c.visible_rows(shown.len()))
            .unwrap_or(shown.len());

        for child in shown.into_iter().take(limit) {
            let node = tree.node(child);
            let open = !node.expandable || state.is_open(node.element);
            rows.push(self.row(child, node, depth, open));
            if open {
                self.collect_rows(child, depth + 1, rows);
            }
        }
    }

    fn row(&self, id: NodeId, node: &NavNode, depth: usize, open: bool) -> Row {
        Row {
            id,
            depth,
            name: node.name.clone(),
            label: node.label.clone(),
            kind: node.kind,
            expandable: node.expandable,
            open,
            href: self.page.element(node.element).and_then(|e| e.href.clone()),
            style: self.state().style(node.element).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><main><nav><section>
<details class="category" open><summary><h2>Guides</h2></summary><ul>
  <li><details><summary><a href="setup.html">Setup</a></summary><ul>
    <li><a href="setup.html#install">Install</a></li>
    <li><a href="setup.html#configure">Configure</a></li>
  </ul></details></li>
  <li><details open><summary><a href="deploy.html">Deploy</a></summary><ul>
    <li><a href="deploy.html#docker">Docker</a></li>
  </ul></details></li>
</ul></details>
</section></nav></main></body></html>"#;

    fn session() -> Session {
        Session::parse(PAGE, &Config::default()).unwrap()
    }

    fn row_names(session: &Session) -> Vec<String> {
        session.rows().into_iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_rows_follow_markup_open_state() {
        let session = session();
        assert_eq!(
            row_names(&session),
            vec!["guides", "setup", "deploy", "deploy.docker"]
        );
    }

    #[test]
    fn test_initially_open_section() {
        let session = session();
        let id = session.initially_open().unwrap();
        assert_eq!(session.tree().node(id).name, "deploy");
    }

    #[test]
    fn test_query_rows() {
        let mut session = session();
        session.set_query("conf");
        assert_eq!(
            row_names(&session),
            vec!["guides", "setup", "setup.configure"]
        );

        session.set_query("");
        assert_eq!(row_names(&session), vec!["guides", "setup", "deploy"]);
    }

    #[test]
    fn test_click_entry_navigates() {
        let mut session = session();
        let id = session.tree().find("deploy.docker").unwrap();
        let result = session.click(id, ClickTarget::Summary, Instant::now());
        assert_eq!(
            result,
            ClickResult::Navigate(Some("deploy.html#docker".to_string()))
        );
    }

    #[test]
    fn test_click_section_animates_open() {
        let config = Config {
            animation: crate::config::AnimationConfig {
                enabled: false,
                ..Default::default()
            },
            ..Config::default()
        };
        let mut session = Session::parse(PAGE, &config).unwrap();
        let id = session.tree().find("setup").unwrap();

        let result = session.click(id, ClickTarget::Summary, Instant::now());
        assert_eq!(result, ClickResult::Toggled { opening: true });
        assert_eq!(
            row_names(&session),
            vec![
                "guides",
                "setup",
                "setup.install",
                "setup.configure",
                "deploy",
                "deploy.docker"
            ]
        );
    }
}
