mod app;
mod cli;
mod config;
mod error;
mod logging;
mod models;
mod parser;
mod render;
mod slug;
mod system;
mod template;
mod ui;

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use flexi_logger::LoggerHandle;
use log::info;
use ratatui::DefaultTerminal;

use crate::app::App;
use crate::cli::{Cli, Commands, EditArgs, RenderArgs};
use crate::config::Config;
use crate::logging::init_logging;
use crate::parser::parse_tokens;
use crate::render::render_request;
use crate::slug::slug;
use crate::system::read_input;
use crate::ui::render_app;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = cli.validate() {
        err.exit();
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tokenforge: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env().with_overrides(cli.log_level.as_deref(), cli.log_dir.clone());
    let _logger = start_logging(&config);

    match cli.command.unwrap_or_else(|| Commands::Edit(EditArgs::default())) {
        Commands::Edit(args) => run_edit(args, &config),
        Commands::Render(args) => run_render(args),
        Commands::Slug { names } => {
            for name in names {
                println!("{}", slug(&name));
            }
            Ok(())
        }
    }
}

fn start_logging(config: &Config) -> Option<LoggerHandle> {
    let dir = config.log_dir.as_ref()?;
    match init_logging(&config.log_level, dir) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("tokenforge: logging disabled: {err}");
            None
        }
    }
}

fn run_render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let template = args.template.as_deref().map(read_input).transpose()?;
    let tokens_json = match (args.tokens.as_deref(), args.tokens_json) {
        (Some(path), _) => read_input(path)?,
        (None, Some(json)) => json,
        (None, None) => "[]".to_string(),
    };

    let response = render_request(template.as_deref(), &tokens_json);
    info!(
        "event=render_command status=ok tokens={} raw={}",
        response.normalized_tokens.len(),
        args.raw
    );
    if args.raw {
        print!("{}", response.output);
    } else {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

fn run_edit(args: EditArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let template = match args.template.as_deref() {
        Some(path) => read_input(path)?,
        None => String::new(),
    };
    let tokens = match args.tokens.as_deref() {
        Some(path) => parse_tokens(&read_input(path)?),
        None => Vec::new(),
    };
    let app = App::new(&template, tokens, config.editor.clone());
    info!(
        "event=edit_start tokens={} template_len={}",
        app.tokens.len(),
        template.len()
    );

    let terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;

    let result = run_app(terminal, app);

    execute!(io::stdout(), DisableMouseCapture)?;
    ratatui::restore();

    let app = result?;
    info!("event=edit_end tokens={}", app.tokens.len());
    if args.print {
        println!("{}", app.rendered());
    }
    Ok(())
}

fn run_app(mut terminal: DefaultTerminal, mut app: App) -> Result<App, Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(100);
    loop {
        if app.needs_redraw {
            terminal.clear()?;
            app.needs_redraw = false;
        }
        terminal.draw(|frame| render_app(frame, &mut app))?;

        if app.should_quit {
            break;
        }

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        app.on_key(key);
                    }
                }
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }
    }
    Ok(app)
}
