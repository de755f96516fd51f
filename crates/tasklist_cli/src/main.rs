use clap::{CommandFactory, Parser};
use std::io::{self, IsTerminal, StdinLock};
use tasklist_cli::cli::{Cli, Command, collect_overrides};
use tasklist_cli::terminal::{OutputFormat, TerminalSurface};
use tasklist_core::clock::SystemClock;
use tasklist_core::config::{Config, load_config_with_fallback, merge_overrides};
use tasklist_core::error::AppError;
use tasklist_core::model::{Filter, Task};
use tasklist_core::storage::FileStore;
use tasklist_core::{App, DeleteOutcome, TaskList};
use tracing::warn;
use tracing_subscriber::EnvFilter;

type TerminalApp = App<TerminalSurface<StdinLock<'static>>>;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "ignoring configuration file, using defaults");
    }
    let overrides = collect_overrides(raw_overrides)?;
    merge_overrides(&loaded.config, &overrides)
}

fn open_app(config: &Config, format: OutputFormat, interactive: bool) -> Result<TerminalApp, AppError> {
    let store = FileStore::from_env()?;
    let list = TaskList::open(Box::new(store), config.slot_key(), Box::new(SystemClock));
    let surface = TerminalSurface::new(io::stdin().lock(), config.palette())
        .with_format(format)
        .echo_renders(interactive);

    let mut app = App::new(list, surface);
    app.start();
    Ok(app)
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Plain
    }
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(task)?);
    Ok(())
}

fn show_filtered(app: &mut TerminalApp, filter: Option<Filter>, format: OutputFormat) -> Result<(), AppError> {
    app.surface_mut().set_format(format);
    let rendered = match filter {
        Some(filter) => app.select_filter(filter) && app.surface().shows_renders(),
        None => false,
    };
    if rendered {
        return Ok(());
    }

    let view = app.list().view();
    app.surface().show_as(&view, format)
}

fn run_command(app: &mut TerminalApp, command: Command, json: bool) -> Result<(), AppError> {
    app.surface_mut().set_format(output_format(json));

    match command {
        Command::Add { text } => {
            let text = text.unwrap_or_default();
            let Some(task) = app.submit(&text) else {
                return Err(match app.surface_mut().take_rejection() {
                    Some(rejection) => rejection.into(),
                    None => AppError::invalid_input("task was not added"),
                });
            };

            if json {
                print_task_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.text, task.id);
            }
        }
        Command::Toggle { id } => {
            if let Some(task) = app.toggle(id) {
                if json {
                    print_task_json(&task)?;
                } else if task.completed {
                    println!("Completed task: {} ({})", task.text, task.id);
                } else {
                    println!("Reopened task: {} ({})", task.text, task.id);
                }
            }
        }
        Command::Delete { id, yes } => {
            app.surface_mut().set_assume_yes(yes);
            let outcome = app.delete(id);
            app.surface_mut().set_assume_yes(false);

            match outcome {
                DeleteOutcome::Deleted(task) => {
                    if json {
                        print_task_json(&task)?;
                    } else {
                        println!("Deleted task: {} ({})", task.text, task.id);
                    }
                }
                DeleteOutcome::Cancelled => {
                    if json {
                        println!("{}", serde_json::json!({ "id": id, "deleted": false }));
                    } else {
                        println!("Kept task ({id})");
                    }
                }
                DeleteOutcome::NotFound => {}
            }
        }
        Command::List { filter, html } => {
            let format = if html {
                OutputFormat::Html
            } else {
                output_format(json)
            };
            show_filtered(app, filter, format)?;
        }
        Command::Filter { filter } => {
            show_filtered(app, Some(filter), output_format(json))?;
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive() -> Result<(), AppError> {
    let config = load_config(&[])?;
    let mut app = open_app(&config, OutputFormat::Plain, true)?;
    let mut input = String::new();

    loop {
        input.clear();
        let bytes = app.surface_mut().read_line(&mut input)?;
        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if !cli.config_override.is_empty() {
            eprintln!("WARNING: --config-override only applies when starting tasklist");
        }

        if let Err(err) = run_command(&mut app, cli.command, cli.json) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run_once(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli.config_override)?;
    let mut app = open_app(&config, output_format(cli.json), false)?;
    run_command(&mut app, cli.command, cli.json)
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if !err.use_stderr() {
                let _ = err.print();
                return;
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_once(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
