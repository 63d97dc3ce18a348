//! # docnav
//!
//! Incremental filtering and expand/collapse navigation for static
//! documentation sidebars.
//!
//! A documentation page carries a nested navigation (category → section →
//! entry) made of `<details>` disclosures and link lists. This library
//! indexes that markup into a tree, filters it by substring as the user
//! types, and computes which elements are shown, hidden, opened, or closed.
//!
//! ## Features
//!
//! - Index the navigation into an arena-backed tree
//! - Dotted search names for entries (`section.entry`, `:` works too)
//! - Pure matching, separate render pass producing inline visual state
//! - Animated disclosure toggles sampled by wall-clock time
//! - Interactive TUI with live reload
//!
//! ## Example
//!
//! ```rust
//! use docnav::{Config, Session};
//!
//! let html = r#"<html><body><main><nav><section>
//!   <details class="category" open><summary><h2>Guides</h2></summary><ul>
//!     <li><details><summary><a href="setup.html">Setup</a></summary><ul>
//!       <li><a href="setup.html#install">Install</a></li>
//!       <li><a href="setup.html#configure">Configure</a></li>
//!     </ul></details></li>
//!   </ul></details>
//! </section></nav></main></body></html>"#;
//!
//! let mut session = Session::parse(html, &Config::default()).unwrap();
//! session.set_query("install");
//!
//! let visible: Vec<_> = session.rows().into_iter().map(|row| row.name).collect();
//! assert_eq!(visible, ["guides", "setup", "setup.install"]);
//! ```

/// Disclosure expand/collapse transitions.
pub mod animation;

/// Configuration module for persisting user preferences.
///
/// Provides the skip-list, search threshold, markup selectors, and animation settings.
pub mod config;

/// Query normalization, tree matching, and the filter engine.
pub mod filter;

/// Navigation tree indexing.
pub mod index;

/// HTML page parsing and the element registry.
pub mod page;

/// Visual state and the render pass.
pub mod render;

pub mod session;

/// TUI module for the interactive search view.
pub mod tui;

// Re-export commonly used types for convenience
pub use config::Config;
pub use filter::{FilterEngine, FilterOutcome, MatchSet, Policy, match_tree, normalize_query};
pub use index::{NavNode, NavTree, NodeKind};
pub use page::{ElementId, Page, PageError};
pub use session::{Row, Session};
