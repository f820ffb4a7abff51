use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::fmt;
use tokio::io::{AsyncBufReadExt, BufReader};
use todos_cli::cli::{Cli, Command, collect_overrides, normalize_parse_error, split_command_line};
use todos_cli::render::{render_json, render_plain};
use todos_core::config::{self, Config, Palette, palette_for_theme};
use todos_core::controller::{Controller, Submission};
use todos_core::error::AppError;
use todos_core::http::HttpClient;
use todos_core::state::ADD_ERROR;
use todos_core::task_api::TaskApi;
use todos_core::view::screen;
use tracing_subscriber::EnvFilter;

type App = Controller<TaskApi>;

/// Why a one-shot command did not succeed.
enum Failure {
    App(AppError),
    Notice(&'static str),
}

impl From<AppError> for Failure {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App(err) => write!(f, "{err}"),
            Self::Notice(message) => f.write_str(message),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        tracing::warn!(error = %err, "falling back to default configuration");
    }

    let from_env = config::apply_env(loaded.config)?;
    let overrides = collect_overrides(&cli.config_override)?;
    config::validate(config::merge_overrides(&from_env, &overrides))
}

fn build_app(config: &Config) -> App {
    tracing::debug!(base_url = %config.base_url, user_id = config.user_id, "starting client");
    let api = TaskApi::new(HttpClient::new(config.base_url.as_str()), config.user_id);
    Controller::new(api, config.error_timeout())
}

fn print_screen(app: &App, json: bool, palette: &Palette) {
    let screen = screen(app.state());
    if json {
        println!("{}", render_json(&screen));
    } else {
        println!("{}", render_plain(&screen, palette));
    }
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn raised_notice(app: &App) -> Result<(), Failure> {
    match app.state().error_message() {
        Some(message) => Err(Failure::Notice(message)),
        None => Ok(()),
    }
}

async fn run_command(
    app: &mut App,
    command: Command,
    json: bool,
    palette: &Palette,
) -> Result<(), Failure> {
    if command.is_session_only() {
        return Err(AppError::invalid_input(format!(
            "'{}' only works in an interactive session",
            command.name()
        ))
        .into());
    }

    app.load().await;
    raised_notice(app)?;

    match command {
        Command::List { filter } => {
            if let Some(filter) = filter {
                app.select_filter(filter);
            }
            print_screen(app, json, palette);
        }
        Command::Add { title } => {
            let task = match app.add_task(title.join(" ")).await {
                Submission::Created(task) => task,
                Submission::Skipped => {
                    return Err(AppError::invalid_input("title is required").into());
                }
                Submission::Failed => return Err(Failure::Notice(ADD_ERROR)),
            };

            if json {
                println!("{}", serde_json::json!(task));
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::Delete { id } => {
            let title = app
                .state()
                .tasks
                .iter()
                .find(|task| task.id == id)
                .map(|task| task.title.clone());
            app.delete_task(id).await;
            raised_notice(app)?;

            if json {
                println!("{}", serde_json::json!({ "id": id, "deleted": true }));
            } else {
                match title {
                    Some(title) => println!("Deleted task: {title} ({id})"),
                    None => println!("Deleted task: {id}"),
                }
            }
        }
        other => {
            return Err(
                AppError::invalid_input(format!("unsupported command '{}'", other.name())).into(),
            );
        }
    }

    Ok(())
}

enum Flow {
    Continue,
    Render,
    Exit,
}

async fn handle_line(app: &mut App, line: &str, json: &mut bool) -> Flow {
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Flow::Exit;
    }

    if line == "help" || line == "?" {
        print_help();
        return Flow::Continue;
    }

    let args = match split_command_line(line) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            return Flow::Continue;
        }
    };

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push("todos".to_string());
    argv.extend(args);

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            return Flow::Continue;
        }
    };
    *json |= cli.json;

    let Some(command) = cli.command else {
        return Flow::Continue;
    };

    match command {
        Command::List { filter } => {
            if let Some(filter) = filter {
                app.select_filter(filter);
            }
        }
        Command::Show => {}
        Command::Add { title } => {
            app.add_task(title.join(" ")).await;
        }
        Command::Delete { id } => app.delete_task(id).await,
        Command::Toggle { id } => app.toggle_task(id),
        Command::ToggleAll => app.toggle_all(),
        Command::ClearCompleted => app.clear_completed(),
        Command::Filter { filter } => app.select_filter(filter),
        Command::Dismiss => app.dismiss_error(),
    }

    Flow::Render
}

async fn run_interactive(app: &mut App, mut json: bool, palette: &Palette) -> Result<(), AppError> {
    app.load().await;
    print_screen(app, json, palette);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|err| AppError::io(err.to_string()))?;
                let Some(line) = line else {
                    break;
                };

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match handle_line(app, line, &mut json).await {
                    Flow::Exit => break,
                    Flow::Continue => {}
                    Flow::Render => print_screen(app, json, palette),
                }
            }
            Some(cleared) = app.next_expiry() => {
                if cleared {
                    tracing::debug!("error notification expired");
                    print_screen(app, json, palette);
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    init_tracing();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };
    let palette = palette_for_theme(config.theme.as_deref());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ERROR: {}", AppError::io(err.to_string()));
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let mut app = build_app(&config);
        match cli.command {
            Some(command) => run_command(&mut app, command, cli.json, &palette).await,
            None => run_interactive(&mut app, cli.json, &palette)
                .await
                .map_err(Failure::from),
        }
    });

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
