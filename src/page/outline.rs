//! Structural read of the navigation markup.
//!
//! The outline is plain data (DOM node ids and label text), so the indexer
//! can walk it while mutating the page's element registry.

use ego_tree::NodeId as DomNodeId;
use scraper::ElementRef;

use super::{PageSelectors, select_first, select_outermost, text_of};

#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub categories: Vec<CategoryOutline>,
}

#[derive(Debug, Clone)]
pub struct CategoryOutline {
    pub node: DomNodeId,
    /// Heading text; `None` when the heading is missing
    pub heading: Option<String>,
    pub sections: Vec<SectionOutline>,
}

#[derive(Debug, Clone)]
pub struct SectionOutline {
    /// The section's disclosure; `None` when the list item has none
    pub disclosure: Option<DomNodeId>,
    /// Text of the link embedded in the disclosure summary
    pub label: Option<String>,
    pub entries: Vec<EntryOutline>,
}

#[derive(Debug, Clone)]
pub struct EntryOutline {
    /// The element containing the entry link (normally its `<li>`)
    pub item: DomNodeId,
    pub label: String,
    pub href: Option<String>,
}

impl Outline {
    pub(super) fn read(contents: ElementRef<'_>, selectors: &PageSelectors) -> Self {
        let categories = contents
            .select(&selectors.category)
            .map(|category| read_category(category, selectors))
            .collect();
        Self { categories }
    }

    pub fn section_count(&self) -> usize {
        self.categories.iter().map(|c| c.sections.len()).sum()
    }
}

fn read_category(category: ElementRef<'_>, selectors: &PageSelectors) -> CategoryOutline {
    let heading = select_first(category, &selectors.category_heading).map(text_of);

    let sections = select_outermost(category, &selectors.sections)
        .into_iter()
        .map(|item| read_section(item, selectors))
        .collect();

    CategoryOutline {
        node: category.id(),
        heading,
        sections,
    }
}

fn read_section(item: ElementRef<'_>, selectors: &PageSelectors) -> SectionOutline {
    let Some(details) = select_first(item, &selectors.section_disclosure) else {
        return SectionOutline {
            disclosure: None,
            label: None,
            entries: Vec::new(),
        };
    };

    let label = select_first(details, &selectors.section_summary_link).map(text_of);

    let entries = select_outermost(details, &selectors.entries)
        .into_iter()
        .map(|link| EntryOutline {
            item: link
                .parent()
                .and_then(ElementRef::wrap)
                .unwrap_or(link)
                .id(),
            label: text_of(link),
            href: link.value().attr("href").map(str::to_string),
        })
        .collect();

    SectionOutline {
        disclosure: Some(details.id()),
        label,
        entries,
    }
}
