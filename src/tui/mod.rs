mod app;
mod ui;
mod watcher;

pub use app::App;

use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Frame interval while a disclosure transition is running
const ANIMATION_FRAME: Duration = Duration::from_millis(16);

/// Run the TUI application.
///
/// Handles the main event loop for the interactive search view: every edit
/// of the search line re-filters the tree, and the page is re-indexed when
/// the file changes on disk.
///
/// # Arguments
///
/// * `terminal` - A mutable reference to a ratatui terminal
/// * `app` - The App instance to run
///
/// # Returns
///
/// Returns `Ok(())` on successful exit, or an error if something goes wrong.
pub fn run(terminal: &mut DefaultTerminal, app: App) -> Result<()> {
    let mut app = app;

    // Create file watcher for live reload
    let mut file_watcher = match watcher::FileWatcher::new(&app.file_path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "live reload disabled");
            None
        }
    };

    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        // Poll faster while animating so transitions stay smooth
        let timeout = if app.is_animating() {
            ANIMATION_FRAME
        } else {
            Duration::from_millis(100)
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now());
                }
            }
        } else if let Some(ref mut watcher) = file_watcher {
            if watcher.check_for_changes() {
                match app.reload() {
                    Ok(()) => app.status_message = Some("✓ Reloaded".to_string()),
                    Err(e) => {
                        tracing::error!(error = %e, "reload failed");
                        app.status_message = Some(format!("✗ Reload failed: {}", e));
                    }
                }
                watcher.rewatch();
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
