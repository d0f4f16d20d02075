mod api;
mod app;
mod config;
mod export;
mod logging;
mod render;
mod session;
mod ui;

use crate::api::ApiClient;
use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::AppState;
use crate::export::{ClipboardExporter, SystemClipboard};
use crate::logging::SessionLogger;
use crate::render::typeset::{MathTypesetter, NullTypesetter, Typesetter};
use crate::render::EquationRenderer;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Load config
    let cfg = config::load_config()?;

    if cfg.logging.enabled {
        logging::init_tracing(&cfg.logging)?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, cfg).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let client = ApiClient::new(&cfg.server.base_url)?;
    let mut session_logger = SessionLogger::new(&cfg.logging);

    // The symbol table is built off the main thread; until it is ready the
    // renderer keeps polling and shows raw markup.
    let engine: Box<dyn Typesetter> = if cfg.render.typeset {
        let typesetter = MathTypesetter::new();
        let warm = typesetter.clone();
        tokio::task::spawn_blocking(move || warm.warm_up());
        Box::new(typesetter)
    } else {
        Box::new(NullTypesetter)
    };
    let renderer = EquationRenderer::new(engine);
    let exporter = ClipboardExporter::new(Box::new(SystemClipboard));

    let tick_rate = cfg.ui.tick_rate_ms.max(10);
    let mut state = AppState::new(cfg, renderer, exporter);

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    if term_tx.send(AppEvent::Terminal(event)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
            }
        }
    });

    // Spawn tick task
    let tick_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(tick_rate));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    // Auth probe: fire once at startup, result lands as an event.
    {
        let client = client.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let event = match client.user().await {
                Ok(user) => AppEvent::Auth {
                    authenticated: user.is_authenticated,
                    username: user.username,
                },
                Err(_) => AppEvent::Auth {
                    authenticated: false,
                    username: None,
                },
            };
            let _ = tx.send(event);
        });
    }

    // Initial render
    terminal.draw(|f| ui::render(f, &state))?;

    // Main event loop
    loop {
        let event = event_rx.recv().await;
        let Some(event) = event else { break };

        let actions = handler::handle_event(&mut state, event);

        // Drain activity lines for the session log
        for line in state.pending_log.drain(..) {
            session_logger.log(&line);
        }

        // Process actions
        for action in actions {
            match action {
                Action::Generate { generation } => {
                    let client = client.clone();
                    let tx = event_tx.clone();
                    tokio::spawn(async move {
                        let result = client.generate().await;
                        let _ = tx.send(AppEvent::TaskReady {
                            generation,
                            custom: false,
                            result,
                        });
                    });
                }
                Action::CreateCustom {
                    generation,
                    request,
                } => {
                    let client = client.clone();
                    let tx = event_tx.clone();
                    tokio::spawn(async move {
                        let result = client.create_custom(&request).await;
                        let _ = tx.send(AppEvent::TaskReady {
                            generation,
                            custom: true,
                            result,
                        });
                    });
                }
                Action::FetchSolution { task_id } => {
                    let client = client.clone();
                    let tx = event_tx.clone();
                    tokio::spawn(async move {
                        let result = client.solution(task_id).await;
                        let _ = tx.send(AppEvent::SolutionReady { task_id, result });
                    });
                }
                Action::Verify { task_id, solution } => {
                    let client = client.clone();
                    let tx = event_tx.clone();
                    tokio::spawn(async move {
                        let result = client.verify(task_id, solution).await;
                        let _ = tx.send(AppEvent::VerifyReady { task_id, result });
                    });
                }
                Action::Quit => {
                    state.should_quit = true;
                }
            }
        }

        if state.should_quit {
            break;
        }

        // Conditional render (only if dirty)
        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }
    }

    Ok(())
}
