//! AccessLoop TUI - terminal client for the AccessLoop lead-capture forms
//!
//! Fills in the waitlist and reservation forms and submits them to the
//! landing-page form relay or the reservation API.

mod app;
mod config;
mod error;
mod state;
mod transport;
mod ui;

use anyhow::Result;
use app::App;
use config::LeadConfig;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accessloop_tui=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = LeadConfig::load()?;

    if std::env::args().skip(1).any(|arg| arg == "--write-config") {
        config.save()?;
        match LeadConfig::config_path() {
            Some(path) => println!("Wrote {}", path.display()),
            None => println!("No configuration directory available"),
        }
        return Ok(());
    }

    // Build the app before touching the terminal so setup errors print normally
    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

/// Draw, handle keys and collect submission replies; requests run on their
/// own tasks so keys keep flowing while one is out
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key)?;
                }
            }
        }

        app.poll_submissions()?;

        // Edits made by the key handler clear any stale status message
        app.poll_store_changes();

        if app.should_quit() {
            return Ok(());
        }
    }
}
