use std::io::ErrorKind;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::WrapErr;

mod app;
mod config;
mod error;
mod history;
mod logging;
mod pager;
mod search;
mod shell;
mod store;
mod ui;
mod view;
mod widgets;

use app::App;
use config::Settings;
use shell::ShellKind;
use store::FavoritesFile;
use view::View;

/// Browse, filter and re-run commands from your shell history
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Shell whose history to browse (defaults to the one in $SHELL)
    #[arg(long, value_enum, env = "HSTUI_SHELL")]
    shell: Option<ShellKind>,

    /// History file to read instead of the shell's default
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Favorites file to use instead of the per-shell default
    #[arg(long)]
    favorites_file: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the log
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Start with the search interpreted as a regular expression
    #[arg(long)]
    regex: bool,

    /// Start with case-sensitive matching
    #[arg(long)]
    case_sensitive: bool,

    /// View to open in
    #[arg(long, value_enum)]
    view: Option<View>,

    /// Generate usage spec for this tool
    #[arg(long)]
    usage: bool,
}

impl Args {
    /// The command-line layer of settings. Boolean flags only ever switch on.
    fn settings(&self) -> Settings {
        Settings {
            shell: self.shell,
            history_file: self.history_file.clone(),
            favorites_file: self.favorites_file.clone(),
            regex: self.regex.then_some(true),
            case_sensitive: self.case_sensitive.then_some(true),
            view: self.view,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Handle --usage flag to output usage spec
    if args.usage {
        let mut cmd = Args::command();
        let bin_name = std::env::args()
            .next()
            .unwrap_or_else(|| "hstui".to_string());
        let mut buf = Vec::new();
        clap_usage::generate(&mut cmd, bin_name, &mut buf);
        print!("{}", String::from_utf8_lossy(&buf));
        return Ok(());
    }

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(logging::default_log_path);
    let _log_guard = logging::init(&log_path);

    let file_settings = match args.config.clone().or_else(config::default_config_path) {
        Some(path) => Settings::load(&path)
            .wrap_err_with(|| format!("Failed to load config '{}'", path.display()))?,
        None => Settings::default(),
    };
    let config = args
        .settings()
        .or(file_settings)
        .resolve()
        .wrap_err("Failed to resolve configuration")?;
    tracing::info!(?config, "starting");

    let store = store::open_history(config.shell, config.history_file.clone());
    let favorites = FavoritesFile::new(config.favorites_file.clone());
    let (_, rows) = crossterm::terminal::size().wrap_err("Failed to read terminal size")?;
    let mut app = App::new(store, favorites, ui::page_capacity(rows))
        .wrap_err_with(|| {
            format!(
                "Failed to load {} history from '{}'",
                config.shell,
                config.history_file.display()
            )
        })?
        .with_modes(config.view, config.regex_mode, config.case_sensitive);

    let mut terminal = ratatui::init();
    let result = run_event_loop(&mut terminal, &mut app);
    ratatui::restore();

    if let Some(text) = result? {
        if let Err(e) = shell::inject(&text) {
            tracing::warn!(error = %e, "cannot inject into terminal, printing instead");
            println!("{}", text.trim_end_matches('\n'));
        }
    }
    Ok(())
}

/// Draw and handle events until the user picks a command or quits.
///
/// Returns the text to put on the shell's input line, if any.
fn run_event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> color_eyre::Result<Option<String>> {
    use crossterm::event::{self, Event, KeyEventKind};

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        let event = match event::read() {
            Ok(event) => event,
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read terminal event");
                continue;
            }
        };

        match event {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app.handle_key(key) {
                    app::Action::None => {}
                    app::Action::Quit => return Ok(None),
                    app::Action::Insert(command) => return Ok(Some(command)),
                    app::Action::Run(command) => return Ok(Some(format!("{command}\n"))),
                }
            }
            Event::Resize(_, rows) => app.resize(ui::page_capacity(rows)),
            _ => {}
        }
    }
}
