use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::animation::{ClickResult, ClickTarget};
use crate::config::Config;
use crate::index::NodeKind;
use crate::page::PageError;
use crate::session::{Row, Session};

pub struct App {
    pub session: Session,
    pub config: Config,
    pub filename: String,
    pub file_path: PathBuf,
    pub rows: Vec<Row>,
    pub list_state: ListState,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Maximum search query length to prevent performance issues
    const MAX_SEARCH_LEN: usize = 256;

    pub fn new(session: Session, config: Config, file_path: PathBuf) -> Self {
        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("page")
            .to_string();

        let mut app = Self {
            session,
            config,
            filename,
            file_path,
            rows: Vec::new(),
            list_state: ListState::default(),
            status_message: None,
            should_quit: false,
        };
        app.refresh_rows();

        // Scroll an already-open section into view once, on startup
        let initial = app
            .session
            .initially_open()
            .and_then(|id| app.rows.iter().position(|row| row.id == id));
        app.list_state
            .select(initial.or((!app.rows.is_empty()).then_some(0)));

        app
    }

    pub fn query(&self) -> &str {
        self.session.query()
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    /// Rebuild the drawable rows, keeping the selection on the same node when possible.
    pub fn refresh_rows(&mut self) {
        let selected = self.selected_row().map(|row| row.id);
        self.rows = self.session.rows();

        let index = selected
            .and_then(|id| self.rows.iter().position(|row| row.id == id))
            .or_else(|| {
                let current = self.list_state.selected().unwrap_or(0);
                (!self.rows.is_empty()).then(|| current.min(self.rows.len() - 1))
            });
        self.list_state.select(index);
    }

    pub fn search_input(&mut self, c: char) {
        let mut query = self.query().to_string();
        // Limit search query length
        if query.len() >= Self::MAX_SEARCH_LEN {
            return;
        }
        query.push(c);
        self.apply_query(&query);
    }

    pub fn search_backspace(&mut self) {
        let mut query = self.query().to_string();
        query.pop();
        self.apply_query(&query);
    }

    pub fn clear_search(&mut self) {
        self.apply_query("");
    }

    fn apply_query(&mut self, query: &str) {
        let outcome = self.session.set_query(query);
        self.status_message = match outcome.policy {
            crate::filter::Policy::Idle => None,
            crate::filter::Policy::Search => Some(format!("{} matches", outcome.matched)),
        };
        self.refresh_rows();
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = self.list_state.selected().unwrap_or(0).saturating_sub(1);
        self.list_state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    /// Click the selected row: toggles disclosures, navigates entries.
    pub fn activate_selected(&mut self, now: Instant) {
        self.click_selected(ClickTarget::Summary, now);
    }

    /// Click the link embedded in the selected row's summary.
    pub fn follow_selected_link(&mut self, now: Instant) {
        self.click_selected(ClickTarget::SummaryLink, now);
    }

    fn click_selected(&mut self, target: ClickTarget, now: Instant) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.kind == NodeKind::Category && target == ClickTarget::SummaryLink {
            return;
        }

        let id = row.id;
        match self.session.click(id, target, now) {
            ClickResult::Navigate(Some(href)) => self.navigate(&href),
            ClickResult::Navigate(None) => {
                self.status_message = Some("No link on this item".to_string());
            }
            ClickResult::Toggled { .. } => self.refresh_rows(),
            ClickResult::Ignored => {}
        }
    }

    fn navigate(&mut self, href: &str) {
        let target = resolve_link(&self.file_path, href);
        self.status_message = Some(match open::that(&target) {
            Ok(()) => format!("✓ Opened {}", href),
            Err(e) => format!("✗ Failed to open {}: {}", href, e),
        });
    }

    pub fn tick(&mut self, now: Instant) {
        if self.session.is_animating() {
            self.session.tick(now);
            self.refresh_rows();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.session.is_animating()
    }

    /// Re-read the page from disk and re-apply the current query.
    pub fn reload(&mut self) -> Result<(), PageError> {
        let query = self.query().to_string();
        let mut session = Session::load(&self.file_path, &self.config)?;
        if !query.is_empty() {
            session.set_query(&query);
        }
        self.session = session;

        // Node ids belong to the old tree; keep the selection by name instead
        let selected_name = self.selected_row().map(|row| row.name.clone());
        self.rows = self.session.rows();
        let index = selected_name
            .and_then(|name| self.rows.iter().position(|row| row.name == name))
            .or((!self.rows.is_empty()).then_some(0));
        self.list_state.select(index);

        tracing::info!(path = %self.file_path.display(), "reloaded page");
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('n') if ctrl => self.next(),
            KeyCode::Char('p') if ctrl => self.previous(),
            KeyCode::Char('u') if ctrl => self.clear_search(),
            KeyCode::Char(c) if !ctrl => self.search_input(c),
            KeyCode::Backspace => self.search_backspace(),
            KeyCode::Esc => {
                if self.query().is_empty() {
                    self.should_quit = true;
                } else {
                    self.clear_search();
                }
            }
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            KeyCode::Home => self.first(),
            KeyCode::End => self.last(),
            KeyCode::Enter => self.activate_selected(now),
            KeyCode::Tab => self.follow_selected_link(now),
            _ => {}
        }
    }
}

/// Resolve a link relative to the page it appears in.
fn resolve_link(page: &Path, href: &str) -> String {
    if href.contains("://") || href.starts_with("mailto:") {
        return href.to_string();
    }

    let path = href.split('#').next().unwrap_or_default();
    let base = page.parent().unwrap_or(Path::new("."));
    if path.is_empty() {
        page.display().to_string()
    } else {
        base.join(path).display().to_string()
    }
}
