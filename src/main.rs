use catswp::actions::Sharer;
use catswp::app::App;
use catswp::cli::{AppConfig, Args};
use catswp::config::UserConfig;
use catswp::logging::init_tracing;
use catswp::source::HttpImageSource;
use catswp::tui::{handle_key_event, handle_mouse_event, render, PictureCache};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::Arc;
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::{error, info};

/// Frame interval; short enough for the fly-out animation to look smooth
const FRAME: Duration = Duration::from_millis(30);

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Load user configuration
    let user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        UserConfig::default()
    });

    let config = match AppConfig::resolve(&args, &user_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.write_config {
        match config.to_user_config().save() {
            Ok(path) => println!("Wrote {}", path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    init_tracing();
    info!(count = config.batch_size, source = %config.source_url, "Starting catswp");

    run_app_with_config(config)
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(config: AppConfig) -> io::Result<()> {
    let source = HttpImageSource::new(config.source_url.clone(), config.request_timeout)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let sharer = Sharer::system(config.open_links);
    let mut app = App::new(config, Arc::new(source), sharer)
        .map_err(|e| io::Error::other(e.to_string()))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %e, "Terminal loop failed");
    }
    let liked = app.session().liked().len();
    if liked > 0 {
        println!("You liked {} cats this session.", liked);
    }

    result
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let mut pictures = PictureCache::new();

    while !app.should_quit() {
        let now = Instant::now();
        app.tick(now);
        pictures.prune(app.cache());

        let mut card_area = None;
        terminal.draw(|frame| {
            card_area = render(frame, app, &mut pictures, now);
        })?;
        app.set_card_area(card_area);

        if event::poll(FRAME)? {
            match event::read()? {
                // Ignore key releases on terminals that report them
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(handle_key_event(key), Instant::now());
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(handle_mouse_event(mouse), Instant::now());
                }
                _ => {}
            }
        }
    }

    Ok(())
}
