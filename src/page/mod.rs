//! Host document model.
//!
//! Parses a static documentation page and exposes the navigation markup the
//! indexer walks. Document elements are bound to opaque [`ElementId`] handles
//! through a registry owned by the [`Page`]; visual state is always addressed
//! through those handles, never through the parsed DOM itself.
//!
//! Default shape below the navigation container (every level is located by a
//! configurable selector, see [`SelectorConfig`]):
//!
//! ```html
//! <details class="category" open>
//!   <summary><h2>Guides</h2></summary>
//!   <ul>
//!     <li>
//!       <details>
//!         <summary><a href="setup.html">Setup</a></summary>
//!         <ul>
//!           <li><a href="setup.html#install">install</a></li>
//!         </ul>
//!       </details>
//!     </li>
//!   </ul>
//! </details>
//! ```
//!
//! Anything that deviates is skipped by the outline, never reported as an error.
//!
//! [`SelectorConfig`]: crate::config::SelectorConfig

mod outline;

pub use outline::{CategoryOutline, EntryOutline, Outline, SectionOutline};

use ego_tree::NodeId as DomNodeId;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SelectorConfig;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("navigation container `{0}` not found")]
    MissingContents(String),
}

/// Opaque handle to one element of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Detached element with no place in the document
    Placeholder,
    /// Top-level `<details class="category">`
    Category,
    /// Any other `<details>` element
    Disclosure,
    /// `<li>` wrapping an entry link
    ListItem,
}

/// What the page knows about a bound element.
#[derive(Debug, Clone)]
pub struct ElementInfo {
    pub kind: ElementKind,
    /// Trimmed text label (original case)
    pub label: String,
    /// Target of the element's primary link, if any
    pub href: Option<String>,
    /// Whether the markup carries the `open` attribute
    pub open: bool,
    /// Number of items in the disclosure content list; `None` when there is no list
    pub content_len: Option<usize>,
}

impl ElementInfo {
    fn placeholder() -> Self {
        Self {
            kind: ElementKind::Placeholder,
            label: String::new(),
            href: None,
            open: false,
            content_len: None,
        }
    }
}

/// A disclosure widget found anywhere in the document.
#[derive(Debug, Clone)]
pub struct DisclosureInfo {
    pub element: ElementId,
    pub has_summary: bool,
    pub has_content: bool,
    /// Whether the summary embeds a link (clicks on it navigate instead of toggling)
    pub summary_link: Option<String>,
    pub open: bool,
    pub content_len: usize,
}

struct PageSelectors {
    category: Selector,
    category_heading: Selector,
    sections: Selector,
    section_disclosure: Selector,
    section_summary_link: Selector,
    entries: Selector,
    open_disclosure: Selector,
    details: Selector,
    summary: Selector,
    list: Selector,
    link: Selector,
}

impl PageSelectors {
    fn compile(config: &SelectorConfig) -> Result<Self, PageError> {
        Ok(Self {
            category: compile(&config.category)?,
            category_heading: compile(&config.category_heading)?,
            sections: compile(&config.sections)?,
            section_disclosure: compile(&config.section_disclosure)?,
            section_summary_link: compile(&config.section_summary_link)?,
            entries: compile(&config.entries)?,
            open_disclosure: compile(&config.open_disclosure)?,
            details: compile("details")?,
            summary: compile("summary")?,
            list: compile("ul")?,
            link: compile("a")?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|e| PageError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// A parsed documentation page plus its element registry.
pub struct Page {
    html: Html,
    contents: DomNodeId,
    selectors: PageSelectors,
    elements: Vec<ElementInfo>,
    handles: HashMap<DomNodeId, ElementId>,
    claimed: HashSet<ElementId>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("elements", &self.elements.len())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Read and parse a page from disk.
    pub fn load(path: &Path, selectors: &SelectorConfig) -> Result<Self, PageError> {
        let html = std::fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&html, selectors)
    }

    /// Parse an HTML document and locate its navigation container.
    pub fn parse(html: &str, config: &SelectorConfig) -> Result<Self, PageError> {
        let contents_selector = compile(&config.contents)?;
        let selectors = PageSelectors::compile(config)?;
        let html = Html::parse_document(html);

        let contents = html
            .select(&contents_selector)
            .next()
            .map(|el| el.id())
            .ok_or_else(|| PageError::MissingContents(config.contents.clone()))?;

        Ok(Self {
            html,
            contents,
            selectors,
            elements: vec![ElementInfo::placeholder()],
            handles: HashMap::new(),
            claimed: HashSet::new(),
        })
    }

    /// Handle of the detached placeholder element (bound to the synthetic tree root).
    pub fn placeholder(&self) -> ElementId {
        ElementId(0)
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementInfo> {
        self.elements.get(id.0)
    }

    /// All registered elements with their handles, in registration order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &ElementInfo)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, info)| (ElementId(i), info))
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Read the navigation structure without binding anything.
    pub fn outline(&self) -> Outline {
        let Some(contents) = self.dom_element(self.contents) else {
            return Outline::default();
        };
        Outline::read(contents, &self.selectors)
    }

    /// Bind a document element exclusively to a new handle.
    ///
    /// Returns `None` when the node is not an element or was already bound
    /// exclusively; an element can back at most one tree node.
    pub fn bind(&mut self, node: DomNodeId, kind: ElementKind) -> Option<ElementId> {
        let id = self.register(node, kind)?;
        if !self.claimed.insert(id) {
            return None;
        }
        Some(id)
    }

    /// Look up or register a handle without claiming the element.
    pub fn handle(&mut self, node: DomNodeId, kind: ElementKind) -> Option<ElementId> {
        self.register(node, kind)
    }

    fn register(&mut self, node: DomNodeId, kind: ElementKind) -> Option<ElementId> {
        if let Some(&id) = self.handles.get(&node) {
            return Some(id);
        }

        let el = self.dom_element(node)?;
        let info = self.describe(el, kind);
        let id = ElementId(self.elements.len());
        self.elements.push(info);
        self.handles.insert(node, id);
        Some(id)
    }

    /// Every `<details>` element in the document, registering handles as needed.
    pub fn disclosures(&mut self) -> Vec<DisclosureInfo> {
        let nodes: Vec<DomNodeId> = self
            .html
            .select(&self.selectors.details)
            .map(|el| el.id())
            .collect();

        nodes
            .into_iter()
            .filter_map(|node| {
                let kind = match self.dom_element(node) {
                    Some(el) if self.selectors.category.matches(&el) => ElementKind::Category,
                    Some(_) => ElementKind::Disclosure,
                    None => return None,
                };
                let element = self.handle(node, kind)?;
                let el = self.dom_element(node)?;

                let summary = el.select(&self.selectors.summary).next();
                let summary_link = summary
                    .and_then(|s| s.select(&self.selectors.link).next())
                    .map(|a| a.value().attr("href").unwrap_or_default().to_string());
                let content = el.select(&self.selectors.list).next();

                Some(DisclosureInfo {
                    element,
                    has_summary: summary.is_some(),
                    has_content: content.is_some(),
                    summary_link,
                    open: el.value().attr("open").is_some(),
                    content_len: content.map(count_items).unwrap_or(0),
                })
            })
            .collect()
    }

    /// The first already-open section disclosure, if it was bound to a handle.
    pub fn initially_open(&self) -> Option<ElementId> {
        let el = self.html.select(&self.selectors.open_disclosure).next()?;
        self.handles.get(&el.id()).copied()
    }

    fn dom_element(&self, node: DomNodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(node).and_then(ElementRef::wrap)
    }

    fn describe(&self, el: ElementRef<'_>, kind: ElementKind) -> ElementInfo {
        let label_source = match kind {
            ElementKind::Category | ElementKind::Disclosure => {
                el.select(&self.selectors.summary).next().unwrap_or(el)
            }
            _ => el,
        };
        let href = match kind {
            ElementKind::ListItem => el.select(&self.selectors.link).next(),
            _ => label_source.select(&self.selectors.link).next(),
        }
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

        let content_len = match kind {
            ElementKind::Category | ElementKind::Disclosure => {
                el.select(&self.selectors.list).next().map(count_items)
            }
            _ => None,
        };

        ElementInfo {
            kind,
            label: text_of(label_source),
            href,
            open: el.value().attr("open").is_some(),
            content_len,
        }
    }
}

/// Concatenated, trimmed text content of an element.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Direct child elements with the given tag name.
fn child_elements<'a>(
    el: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

/// First element below `scope` matching `selector`, in document order.
fn select_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).find(|el| el.id() != scope.id())
}

/// Elements below `scope` matching `selector`, minus those nested inside
/// another match (entries inside a section never count as sections).
fn select_outermost<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    scope
        .select(selector)
        .filter(|el| el.id() != scope.id())
        .filter(|el| {
            !el.ancestors()
                .take_while(|ancestor| ancestor.id() != scope.id())
                .filter_map(ElementRef::wrap)
                .any(|ancestor| selector.matches(&ancestor))
        })
        .collect()
}

fn count_items(list: ElementRef<'_>) -> usize {
    child_elements(list, "li").count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body><main><nav><section>
  <details class="category" open>
    <summary><h2> Guides </h2></summary>
    <ul>
      <li>
        <details open>
          <summary><a href="setup.html">Setup</a></summary>
          <ul>
            <li><a href="setup.html#install">Install</a></li>
            <li><a href="setup.html#configure">Configure</a></li>
          </ul>
        </details>
      </li>
    </ul>
  </details>
</section></nav></main>
<footer><details><summary>About</summary><p>No list here</p></details></footer>
</body></html>"#;

    fn parse(html: &str) -> Page {
        Page::parse(html, &SelectorConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_contents() {
        let err = Page::parse("<html><body></body></html>", &SelectorConfig::default())
            .unwrap_err();
        assert!(matches!(err, PageError::MissingContents(_)));
    }

    #[test]
    fn test_invalid_selector() {
        let config = SelectorConfig {
            category: "[[".to_string(),
            ..SelectorConfig::default()
        };
        let err = Page::parse(PAGE, &config).unwrap_err();
        match err {
            PageError::Selector { selector, .. } => assert_eq!(selector, "[["),
            other => panic!("Expected selector error, got {:?}", other),
        }
    }

    #[test]
    fn test_outline_reads_nesting() {
        let page = parse(PAGE);
        let outline = page.outline();

        assert_eq!(outline.categories.len(), 1);
        let category = &outline.categories[0];
        assert_eq!(category.heading.as_deref(), Some("Guides"));
        assert_eq!(category.sections.len(), 1);

        let section = &category.sections[0];
        assert_eq!(section.label.as_deref(), Some("Setup"));
        let labels: Vec<_> = section.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Install", "Configure"]);
    }

    #[test]
    fn test_outline_follows_configured_selectors() {
        let html = r##"<html><body><main><nav><section>
<div class="group"><h3>Reference</h3>
  <div class="item"><details><summary><a href="config.html">Config</a></summary>
    <p><a href="config.html#load">load</a></p>
    <p><a href="config.html#save">save</a></p>
  </details></div>
</div>
</section></nav></main></body></html>"##;
        let config = SelectorConfig {
            category: ".group".to_string(),
            category_heading: "h3".to_string(),
            sections: ".item".to_string(),
            entries: "p > a".to_string(),
            ..SelectorConfig::default()
        };
        let page = Page::parse(html, &config).unwrap();
        let outline = page.outline();

        assert_eq!(outline.categories.len(), 1);
        let category = &outline.categories[0];
        assert_eq!(category.heading.as_deref(), Some("Reference"));
        assert_eq!(category.sections.len(), 1);

        let section = &category.sections[0];
        assert_eq!(section.label.as_deref(), Some("Config"));
        let labels: Vec<_> = section.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["load", "save"]);
        assert_ne!(section.entries[0].item, section.entries[1].item);

        // Default selectors find nothing in this markup
        let page = Page::parse(html, &SelectorConfig::default()).unwrap();
        assert!(page.outline().categories.is_empty());
    }

    #[test]
    fn test_bind_is_exclusive() {
        let mut page = parse(PAGE);
        let outline = page.outline();
        let node = outline.categories[0].node;

        let first = page.bind(node, ElementKind::Category);
        assert!(first.is_some());
        assert_eq!(page.bind(node, ElementKind::Category), None);
        // Non-exclusive lookup still resolves to the same handle
        assert_eq!(page.handle(node, ElementKind::Category), first);
    }

    #[test]
    fn test_describe_disclosure() {
        let mut page = parse(PAGE);
        let outline = page.outline();
        let details = outline.categories[0].sections[0].disclosure.unwrap();

        let id = page.bind(details, ElementKind::Disclosure).unwrap();
        let info = page.element(id).unwrap();
        assert_eq!(info.label, "Setup");
        assert_eq!(info.href.as_deref(), Some("setup.html"));
        assert!(info.open);
        assert_eq!(info.content_len, Some(2));
    }

    #[test]
    fn test_disclosures_cover_whole_document() {
        let mut page = parse(PAGE);
        let disclosures = page.disclosures();

        assert_eq!(disclosures.len(), 3);
        let footer = &disclosures[2];
        assert!(footer.has_summary);
        assert!(!footer.has_content);
        assert!(footer.summary_link.is_none());

        let section = &disclosures[1];
        assert_eq!(section.summary_link.as_deref(), Some("setup.html"));
        assert_eq!(section.content_len, 2);
    }

    #[test]
    fn test_initially_open_requires_binding() {
        let mut page = parse(PAGE);
        assert_eq!(page.initially_open(), None);

        let details = page.outline().categories[0].sections[0].disclosure.unwrap();
        let id = page.bind(details, ElementKind::Disclosure).unwrap();
        assert_eq!(page.initially_open(), Some(id));
    }
}
