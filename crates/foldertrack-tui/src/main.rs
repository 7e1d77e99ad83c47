use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use foldertrack_core::service::HttpFolderService;
use foldertrack_core::speech::CommandRecognizer;
use foldertrack_core::{DirectorySink, FileSink, FolderService, SpeechRecognizer, TranscriptionBridge};

mod action;
mod app;
mod backend;
mod config_file;
mod input;
mod logging;
mod theme;
mod tui_event;
mod view;

use app::App;
use config_file::{Overrides, Settings};

/// foldertrack: browse, assign and return patient folders from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the folder service (env: FOLDERTRACK_URL)
    #[arg(long)]
    url: Option<String>,

    /// Color theme: default or contrast
    #[arg(long)]
    theme: Option<String>,

    /// Directory downloaded reports are saved into
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Speech-to-text command used for dictation
    #[arg(long)]
    speech_command: Option<String>,

    /// Write the resolved settings to the config file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = logging::init();

    // Resolve config from CLI flags > env vars > config file > defaults
    let file_config = config_file::load_config();
    let settings = Settings::resolve(
        &file_config,
        Overrides {
            base_url: args.url,
            env_base_url: std::env::var("FOLDERTRACK_URL").ok(),
            theme: args.theme,
            export_dir: args.export_dir,
            speech_command: args.speech_command,
        },
    );
    tracing::info!(?settings, "resolved settings");

    if args.write_config {
        let path = config_file::save_config(&settings.to_config_file()).map_err(anyhow::Error::msg)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if !theme::Theme::NAMES.contains(&settings.theme_name.as_str()) {
        tracing::warn!(theme = %settings.theme_name, "unknown theme, using default");
    }
    let theme = theme::Theme::named(&settings.theme_name);

    let service: Arc<dyn FolderService> =
        Arc::new(HttpFolderService::new(&settings.base_url, settings.timeout));
    let sink: Arc<dyn FileSink> = Arc::new(DirectorySink::new(&settings.export_dir));

    let recognizer = settings.speech_command.as_ref().map(|cmd| {
        Arc::new(CommandRecognizer::new(cmd.clone(), settings.speech_args.clone()))
            as Arc<dyn SpeechRecognizer>
    });
    let (speech_tx, mut speech_rx) = mpsc::unbounded_channel();
    let bridge = TranscriptionBridge::new(recognizer, speech_tx, settings.listen_timeout);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let mut app = App::new(theme, bridge);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<tui_event::BackendCommand>();
    let cancel = CancellationToken::new();

    app.backend_cmd_tx = Some(cmd_tx);
    tokio::spawn(backend::run(service, sink, cmd_rx, event_tx, cancel.clone()));

    // Startup reads
    app.request_load();

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            Some(backend_event) = event_rx.recv() => {
                app.handle_backend_event(backend_event);
                // Drain any additional queued backend events
                while let Ok(evt) = event_rx.try_recv() {
                    app.handle_backend_event(evt);
                }
            }
            Some(speech_event) = speech_rx.recv() => {
                app.handle_transcription(speech_event);
            }
            _ = cancel.cancelled() => {
                app.should_quit = true;
            }
            // Terminal input events
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    let action = input::map_event(&evt, &app.input_mode);
                    app.update(action);
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            cancel.cancel();
            break;
        }
    }

    app.bridge.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    tracing::info!("foldertrack exiting");
    Ok(())
}
