// strikemap - Terminal attack map for red team / blue team DDoS range exercises
// Animates simulated packets from selected attackers to a target while
// the orchestration API runs the real attack.

mod app;
mod model;
mod net;
mod theme;
mod ui;
mod viz;

use anyhow::{Context, Result};
use app::config::{AttackSettings, Cli, RefreshConfig, RenderSettings};
use app::{event::handle_key_event, AppState};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use net::ApiClient;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    // Validate the API URL before touching the terminal
    let client = ApiClient::new(&cli.api_url)?;
    tracing::info!(api = client.base_url(), renderer = cli.renderer.label(), "Starting strikemap");

    let mut app = AppState::new(
        RenderSettings {
            renderer: cli.renderer,
            packets_per_second: cli.packets_per_second,
            ..RenderSettings::default()
        },
        AttackSettings {
            attack_type: cli.attack_type,
            target_port: cli.target_port,
            duration: cli.duration,
            workers: cli.workers,
            sockets: cli.sockets,
            ..AttackSettings::default()
        },
        RefreshConfig::new(cli.frame_ms),
    );
    app.attach(client);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app);

    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "strikemap exited with an error");
        println!("Error: {:?}", err);
    }
    Ok(())
}

/// Logs go to a file; stdout belongs to the UI
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        app.on_tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if !app.running {
            return Ok(());
        }

        if event::poll(app.refresh_config.frame_interval())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key_event(app, key.code);
                }
            }
        }
    }
}
