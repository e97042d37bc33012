mod app;
mod braille;
mod config;
mod data;
mod gauge;
mod map;
mod risk;
mod ui;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use gauge::{GaugeUpdate, RiverStageClient};
use map::DistrictMap;
use ratatui::DefaultTerminal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = config::Config::load().context("loading configuration")?;
    init_tracing(&config.log.file)?;

    let districts = data::load_districts(Path::new(&config.map.boundaries))?;
    tracing::info!(districts = districts.len(), "loaded district boundaries");

    let client = RiverStageClient::new(
        config.api.base_url.clone(),
        config.api.key.clone(),
        config.api.page_size,
    )?;
    let rivers: Vec<String> = risk::ALL_RIVERS.iter().map(|s| s.to_string()).collect();
    let (refresh, updates) = gauge::spawn_worker(
        client,
        rivers,
        Duration::from_secs(config.api.refresh_secs.max(10)),
    );

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, DistrictMap::new(districts), refresh, updates);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// The terminal owns stdout, so logs go to a file.
fn init_tracing(path: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "flood_map=info".into()),
        )
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            app.hover_at(mouse.column, mouse.row);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            app.select_at(mouse.column, mouse.row);
        }
        // Wheel scrolls the detail panel
        MouseEventKind::ScrollUp => app.scroll_detail(-2),
        MouseEventKind::ScrollDown => app.scroll_detail(2),
        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    map: DistrictMap,
    refresh: mpsc::Sender<()>,
    updates: mpsc::Receiver<GaugeUpdate>,
) -> Result<()> {
    let mut app = App::new(map);

    loop {
        // Apply any finished fetch cycles before drawing
        while let Ok(update) = updates.try_recv() {
            app.apply_update(update);
        }

        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') => app.quit(),
                            // Esc closes the panel first, quits second
                            KeyCode::Esc => {
                                if app.selected.is_some() {
                                    app.clear_selection();
                                } else {
                                    app.quit();
                                }
                            }
                            KeyCode::Char('r') | KeyCode::Char('R') => {
                                app.mark_loading();
                                let _ = refresh.send(());
                            }
                            KeyCode::Char('l') | KeyCode::Char('L') => {
                                app.map.toggle_labels();
                            }
                            KeyCode::Tab => app.cycle_selection(true),
                            KeyCode::BackTab => app.cycle_selection(false),
                            KeyCode::Up | KeyCode::Char('k') => app.scroll_detail(-1),
                            KeyCode::Down | KeyCode::Char('j') => app.scroll_detail(1),
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                // Projection refits on the next draw
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
