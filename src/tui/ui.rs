use crate::index::NodeKind;
use crate::session::Row;
use crate::tui::app::App;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(area);

    render_title_bar(frame, app, chunks[0]);
    render_search(frame, app, chunks[1]);
    render_tree(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let tree = app.session.tree();
    let title_text = format!(
        "docnav - {} - {} sections, {} entries",
        app.filename,
        tree.count_kind(NodeKind::Section),
        tree.count_kind(NodeKind::Entry),
    );

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(Color::Rgb(100, 200, 255))
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let query = app.query();
    let line = Line::from(vec![
        Span::styled("/ ", Style::default().fg(Color::DarkGray)),
        Span::raw(query),
        Span::styled("█", Style::default().fg(Color::Gray)),
    ]);

    let search = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search (section:entry) ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(search, area);
}

fn render_tree(frame: &mut Frame, app: &mut App, area: Rect) {
    let spaced = !app.config.is_compact_tree();

    let mut items: Vec<ListItem> = Vec::with_capacity(app.rows.len());
    for (i, row) in app.rows.iter().enumerate() {
        if spaced && i > 0 && row.kind == NodeKind::Category {
            items.push(ListItem::new(Line::from("")));
        }
        items.push(ListItem::new(row_line(row)));
    }

    let title = if app.rows.is_empty() {
        " No matches ".to_string()
    } else {
        format!(" {} ", app.rows.len())
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(40, 60, 90))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▌");

    // Blank spacer rows shift indices in spaced mode; select the shifted row
    let mut state = app.list_state.clone();
    if spaced {
        if let Some(selected) = state.selected() {
            let spacers = app.rows[..=selected.min(app.rows.len().saturating_sub(1))]
                .iter()
                .skip(1)
                .filter(|row| row.kind == NodeKind::Category)
                .count();
            state.select(Some(selected + spacers));
        }
    }
    frame.render_stateful_widget(list, area, &mut state);
    *app.list_state.offset_mut() = state.offset();
}

fn row_line(row: &Row) -> Line<'static> {
    let indent = "  ".repeat(row.depth);
    let marker = if row.expandable {
        if row.open { "▼ " } else { "▶ " }
    } else {
        "  "
    };

    let mut style = match row.kind {
        NodeKind::Category => Style::default()
            .fg(Color::Rgb(255, 200, 100))
            .add_modifier(Modifier::BOLD),
        NodeKind::Section => Style::default().fg(Color::Rgb(130, 200, 255)),
        NodeKind::Entry | NodeKind::Root => Style::default().fg(Color::White),
    };

    // Disclosures mid-transition are drawn dimmed
    let fading = row
        .style
        .and_then(|s| s.content)
        .is_some_and(|c| c.opacity < 1.0 && row.open);
    if fading {
        style = style.add_modifier(Modifier::DIM);
    }

    Line::from(vec![
        Span::raw(indent),
        Span::styled(marker, Style::default().fg(Color::DarkGray)),
        Span::styled(row.label.clone(), style),
    ])
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints = "↑↓ move · Enter toggle/open · Tab follow link · Esc clear/quit";
    let text = match &app.status_message {
        Some(message) => format!(" {}  │  {}", message, hints),
        None => format!(" {}", hints),
    };

    let status = Paragraph::new(text).style(
        Style::default()
            .bg(Color::Rgb(30, 30, 40))
            .fg(Color::Rgb(180, 180, 180)),
    );
    frame.render_widget(status, area);
}
