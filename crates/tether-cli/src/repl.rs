//! Interactive front end for the session controller.
//!
//! Rustyline blocks, so lines are read on a dedicated thread and forwarded
//! over a channel. The main task multiplexes user input, controller events
//! and view updates; every controller call happens on this one task.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::thread;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use tether_application::SessionController;
use tether_application::texts;
use tether_core::session::ViewUpdate;

use crate::commands::{self, COMMAND_NAMES, Command, clipboard};
use crate::render::Renderer;

/// Rustyline helper completing and highlighting slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

/// Reads lines until EOF. Runs on its own thread.
fn read_lines(tx: mpsc::UnboundedSender<Input>) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    loop {
        let input = match rl.readline(">> ") {
            Ok(line) => {
                let sensitive = Command::parse(&line).is_some_and(|c| c.is_sensitive());
                if !line.trim().is_empty() && !sensitive {
                    let _ = rl.add_history_entry(line.as_str());
                }
                Input::Line(line)
            }
            Err(ReadlineError::Interrupted) => Input::Interrupted,
            Err(ReadlineError::Eof) => Input::Closed,
            Err(err) => {
                let _ = tx.send(Input::Closed);
                return Err(err.into());
            }
        };

        let closed = matches!(input, Input::Closed);
        if tx.send(input).is_err() || closed {
            return Ok(());
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run(
    mut controller: SessionController,
    mut views: mpsc::UnboundedReceiver<ViewUpdate>,
) -> Result<()> {
    let mut renderer = Renderer::new();

    println!("{}", "=== Tether ===".bright_magenta().bold());
    println!("{}", "Type /help for commands, /quit to exit.".bright_black());
    println!();

    controller.restore().await;

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    // Not joined: the thread may be parked in readline when we exit.
    thread::spawn(move || {
        if let Err(e) = read_lines(input_tx) {
            tracing::error!("[Repl] Line editor failed: {}", e);
        }
    });

    loop {
        tokio::select! {
            Some(update) = views.recv() => renderer.render(update),
            input = input_rx.recv() => match input {
                Some(Input::Line(line)) => {
                    // Show what the controller already reported before acting on new input.
                    while let Ok(update) = views.try_recv() {
                        renderer.render(update);
                    }
                    if dispatch(&mut controller, &line).await == Flow::Quit {
                        break;
                    }
                }
                Some(Input::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                }
                Some(Input::Closed) | None => break,
            },
            Some(event) = controller.next_event() => controller.handle_event(event).await,
        }
    }

    controller.disconnect();
    while let Ok(update) = views.try_recv() {
        renderer.render(update);
    }
    println!("{}", "Hej då!".bright_green());
    Ok(())
}

async fn dispatch(controller: &mut SessionController, line: &str) -> Flow {
    let Some(command) = Command::parse(line) else {
        return Flow::Continue;
    };

    match command {
        Command::Login { username, password } => {
            // The outcome is reported through view updates.
            if let Err(e) = controller.login(&username, &password).await {
                tracing::debug!("[Repl] Login failed: {}", e);
            }
        }
        Command::Connect => {
            let _ = controller.connect();
        }
        Command::Disconnect => controller.disconnect(),
        Command::Logout => controller.logout().await,
        Command::ApiKey(key) => controller.set_api_key(&key),
        Command::Copy(position) => {
            match clipboard::copyable_text(controller.transcript(), position) {
                Some(text) => match clipboard::copy(text) {
                    Ok(()) => println!("{}", texts::COPIED.bright_yellow()),
                    Err(e) => {
                        tracing::warn!("[Clipboard] Copy failed: {}", e);
                        println!("{}", format!("! {}", texts::COPY_FAILED).bright_red());
                    }
                },
                None => println!("{}", format!("Nothing to copy at #{}", position).bright_black()),
            }
        }
        Command::Status => {
            println!("{}", format!("State: {}", controller.state()).bright_black());
        }
        Command::Help => println!("{}", commands::HELP.bright_black()),
        Command::Quit => return Flow::Quit,
        Command::Send(text) => {
            if !controller.state().is_connected() {
                println!("{}", "Not connected. Use /connect first.".bright_black());
            } else if let Err(e) = controller.send_message(&text) {
                tracing::warn!("[Repl] Send failed: {}", e);
                println!("{}", format!("! {}", e).bright_red());
            }
        }
        Command::Usage(usage) => println!("{}", format!("Usage: {}", usage).yellow()),
        Command::Unknown(name) => {
            println!("{}", format!("Unknown command {}. Try /help", name).bright_black());
        }
    }
    Flow::Continue
}
