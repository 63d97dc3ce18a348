//! Incremental text filtering over the navigation tree.
//!
//! Matching is a pure function from `(tree, query)` to a [`MatchSet`]; the
//! render pass in [`crate::render`] turns that set into visual state.
//!
//! A node matches when its name contains the query or when any descendant
//! matches. Matches propagate upward only: a matching section does not reveal
//! entries whose own names miss the query.

use indextree::NodeId;
use serde::Serialize;
use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::index::{NavNode, NavTree};
use crate::page::Page;
use crate::render::{self, VisualState};

/// Lowercase the raw input and treat `:` as the `.` path delimiter.
///
/// # Examples
///
/// ```
/// # use docnav::filter::normalize_query;
/// assert_eq!(normalize_query("Setup:Install"), "setup.install");
/// ```
pub fn normalize_query(raw: &str) -> String {
    raw.to_lowercase().replace(':', ".")
}

/// Which pass a normalized query triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Too short to search: reset to the default visibility
    Idle,
    Search,
}

impl Policy {
    pub fn for_query(normalized: &str, min_query_len: usize) -> Self {
        if normalized.chars().count() < min_query_len {
            Policy::Idle
        } else {
            Policy::Search
        }
    }
}

/// Nodes whose subtree matched a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    matched: HashSet<NodeId>,
}

impl MatchSet {
    pub fn contains(&self, id: NodeId) -> bool {
        self.matched.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.matched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Compute which nodes match `query` (already normalized).
pub fn match_tree(tree: &NavTree, query: &str) -> MatchSet {
    let mut set = MatchSet::default();
    match_node(tree, tree.root(), query, &mut set);
    set
}

/// Post-order: children are evaluated before the node's own decision.
fn match_node(tree: &NavTree, id: NodeId, query: &str, set: &mut MatchSet) -> bool {
    let mut matched = tree.node(id).name.contains(query);

    for child in tree.children(id) {
        let child_matched = match_node(tree, child, query, set);
        matched = matched || child_matched;
    }

    if matched {
        set.matched.insert(id);
    }
    matched
}

/// Result of one query update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    pub query: String,
    pub policy: Policy,
    /// Matched nodes, excluding the synthetic root
    pub matched: usize,
}

/// Owns the navigation tree and the visual state it drives.
#[derive(Debug)]
pub struct FilterEngine {
    tree: NavTree,
    state: VisualState,
    min_query_len: usize,
}

impl FilterEngine {
    /// Visual state starts as the document was loaded; no policy is applied
    /// until the first query arrives.
    pub fn new(tree: NavTree, page: &Page, config: &SearchConfig) -> Self {
        Self {
            tree,
            state: VisualState::from_page(page),
            min_query_len: config.min_query_len,
        }
    }

    pub fn tree(&self) -> &NavTree {
        &self.tree
    }

    pub fn state(&self) -> &VisualState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut VisualState {
        &mut self.state
    }

    /// Handle a change of the search input.
    pub fn on_query_changed(&mut self, raw: &str) -> FilterOutcome {
        let query = normalize_query(raw);
        let policy = Policy::for_query(&query, self.min_query_len);

        let matched = match policy {
            Policy::Idle => {
                render::reset_visibility(&self.tree, self.tree.root(), &mut self.state);
                0
            }
            Policy::Search => {
                let matches = match_tree(&self.tree, &query);
                render::apply_matches(&self.tree, &matches, &mut self.state);
                matches.len() - usize::from(matches.contains(self.tree.root()))
            }
        };

        tracing::trace!(query = %query, ?policy, matched, "query applied");
        FilterOutcome {
            query,
            policy,
            matched,
        }
    }

    /// Nodes whose element is currently shown, in pre-order, without the root.
    pub fn visible_nodes(&self) -> impl Iterator<Item = (NodeId, &NavNode)> + '_ {
        self.tree
            .descendants()
            .skip(1)
            .map(|id| (id, self.tree.node(id)))
            .filter(|(_, node)| self.state.is_shown(node.element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexConfig, SelectorConfig};
    use crate::index;

    const PAGE: &str = r#"<html><body><main><nav><section>
<details class="category" open><summary><h2>Guides</h2></summary><ul>
  <li><details open><summary><a href="setup.html">Setup</a></summary><ul>
    <li><a href="setup.html#install">Install</a></li>
    <li><a href="setup.html#configure">Configure</a></li>
  </ul></details></li>
  <li><details><summary><a href="deploy.html">Deploy</a></summary><ul>
    <li><a href="deploy.html#docker">Docker</a></li>
  </ul></details></li>
</ul></details>
</section></nav></main></body></html>"#;

    fn engine() -> FilterEngine {
        let mut page = Page::parse(PAGE, &SelectorConfig::default()).unwrap();
        let tree = index::build(&mut page, &IndexConfig::default());
        FilterEngine::new(tree, &page, &SearchConfig::default())
    }

    fn visible(engine: &FilterEngine) -> Vec<String> {
        engine
            .visible_nodes()
            .map(|(_, node)| node.name.clone())
            .collect()
    }

    fn is_open(engine: &FilterEngine, name: &str) -> bool {
        let id = engine.tree().find(name).unwrap();
        engine.state().is_open(engine.tree().node(id).element)
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("SETUP"), "setup");
        assert_eq!(normalize_query("a:b:c"), "a.b.c");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn test_policy_threshold() {
        assert_eq!(Policy::for_query("", 2), Policy::Idle);
        assert_eq!(Policy::for_query("a", 2), Policy::Idle);
        assert_eq!(Policy::for_query("ab", 2), Policy::Search);
        // Measured in characters, not bytes
        assert_eq!(Policy::for_query("é", 2), Policy::Idle);
    }

    #[test]
    fn test_initial_state_mirrors_markup() {
        let engine = engine();
        assert_eq!(visible(&engine).len(), 6);
        assert!(is_open(&engine, "setup"));
        assert!(!is_open(&engine, "deploy"));
    }

    #[test]
    fn test_leaf_match_shows_ancestors() {
        let mut engine = engine();
        let outcome = engine.on_query_changed("install");

        assert_eq!(outcome.policy, Policy::Search);
        assert_eq!(outcome.matched, 3);
        assert_eq!(visible(&engine), vec!["guides", "setup", "setup.install"]);
        assert!(is_open(&engine, "guides"));
        assert!(is_open(&engine, "setup"));
        assert!(!is_open(&engine, "deploy"));
    }

    #[test]
    fn test_section_match_does_not_propagate_down() {
        let mut engine = engine();
        engine.on_query_changed("guides");

        // The category matches by name, its sections and entries do not
        assert_eq!(visible(&engine), vec!["guides"]);
        assert!(is_open(&engine, "guides"));
        assert!(!is_open(&engine, "setup"));

        engine.on_query_changed("setup");
        // Entries stay visible only because their dotted names carry the section prefix
        assert_eq!(
            visible(&engine),
            vec!["guides", "setup", "setup.install", "setup.configure"]
        );
    }

    #[test]
    fn test_colon_and_period_are_equivalent() {
        let mut engine = engine();
        let tree = engine.tree();
        assert_eq!(
            match_tree(tree, &normalize_query("setup:install")),
            match_tree(tree, &normalize_query("setup.install"))
        );

        engine.on_query_changed("Setup:Install");
        assert_eq!(visible(&engine), vec!["guides", "setup", "setup.install"]);
    }

    #[test]
    fn test_no_match_hides_everything() {
        let mut engine = engine();
        let outcome = engine.on_query_changed("zzz");

        assert_eq!(outcome.matched, 0);
        assert!(visible(&engine).is_empty());
        assert!(!is_open(&engine, "guides"));
    }

    #[test]
    fn test_short_query_resets_to_idle() {
        let mut engine = engine();
        engine.on_query_changed("docker");
        let outcome = engine.on_query_changed("d");

        assert_eq!(outcome.policy, Policy::Idle);
        assert_eq!(visible(&engine).len(), 6);
        assert!(is_open(&engine, "guides"));
        // Non-kept disclosures collapse, including one that was open in the markup
        assert!(!is_open(&engine, "setup"));
        assert!(!is_open(&engine, "deploy"));
    }

    #[test]
    fn test_repeated_query_is_idempotent() {
        let mut engine = engine();
        engine.on_query_changed("conf");
        let first = serde_json::to_value(engine.state()).unwrap();
        engine.on_query_changed("conf");
        let second = serde_json::to_value(engine.state()).unwrap();

        assert_eq!(first, second);
    }
}
