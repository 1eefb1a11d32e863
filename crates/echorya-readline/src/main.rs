mod command;
mod render;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use echorya_core::config::{AppConfig, DEFAULT_LOG_FILTER, SecretConfig};
use echorya_core::generation::LanguageModel;
use echorya_core::secret::SecretService;
use echorya_core::session::{HomeNavigation, Message, SessionStore};
use echorya_core::speech::{self, MicToggle, SpeechInput, UnavailableSpeechInput};
use echorya_core::user::{StoredUserService, UserService};
use echorya_infrastructure::config_loader::load_config;
use echorya_infrastructure::{EchoryaPaths, SecretServiceImpl, TomlKeyValueStore};
use echorya_interaction::{ChatController, GeminiApiAgent, TurnOutcome};

use command::{COMMANDS, Command, resolve_session};
use render::{Rendered, render_header, render_message, render_session_list};

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS
                .iter()
                .map(|(name, _, _)| name.to_string())
                .collect(),
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

/// Everything a REPL command can act on.
struct App {
    controller: ChatController,
    store: Arc<RwLock<SessionStore>>,
    user_service: Arc<dyn UserService>,
    speech: Box<dyn SpeechInput>,
    /// Text carried into the next prompt, e.g. a voice transcript
    pending_input: String,
}

/// Entry point of the Echorya REPL.
///
/// Arguments after the program name are joined into a prompt that is
/// pre-filled at the first `>>`, e.g. `echorya make a lo-fi beat`.
///
/// Startup never fails on a missing credential or a broken config file: both
/// are logged and the REPL runs with what is available.
#[tokio::main]
async fn main() -> Result<()> {
    // ===== Configuration and logging =====
    let paths = EchoryaPaths::from_system()?;
    let config_result = load_config(&paths.config_file());
    let config = config_result.as_ref().cloned().unwrap_or_default();
    init_tracing(&config.log_filter);
    if let Err(e) = &config_result {
        warn!(error = %e, "failed to load config.toml, using defaults");
    }

    if let Err(e) = paths.ensure_secret_file() {
        warn!(error = %e, "could not create secret file template");
    }

    // ===== Backend Initialization =====
    let model = build_model(&paths, &config).await;
    let store = Arc::new(RwLock::new(SessionStore::new()));
    store
        .write()
        .await
        .subscribe(|event| debug!(?event, "store event"));

    let controller = ChatController::new(Arc::clone(&store), model)
        .with_min_processing(Duration::from_millis(config.min_processing_ms));
    let user_service: Arc<dyn UserService> = Arc::new(StoredUserService::new(Arc::new(
        TomlKeyValueStore::with_path(paths.state_file()),
    )));

    let mut app = App {
        controller,
        store,
        user_service,
        speech: Box::new(UnavailableSpeechInput),
        pending_input: initial_prompt(std::env::args().skip(1)),
    };

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Echorya ===".bright_magenta().bold());
    match app.controller.model_name() {
        Some(name) => println!("{}", format!("Model: {name}").bright_black()),
        None => println!(
            "{}",
            "No API key configured. Set GEMINI_API_KEY or edit secret.json.".yellow()
        ),
    }
    println!(
        "{}",
        "Type a message to chat, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let initial = std::mem::take(&mut app.pending_input);
        let readline = rl.readline_with_initial(">> ", (initial.as_str(), ""));

        match readline {
            Ok(line) => {
                let Some(command) = Command::parse(&line) else {
                    continue;
                };

                let _ = rl.add_history_entry(line.trim());

                if command == Command::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if let Err(e) = app.handle(command).await {
                    eprintln!("{}", format!("Error: {e}").red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}

/// Joins command-line words into the first prompt's initial text.
fn initial_prompt(args: impl IntoIterator<Item = String>) -> String {
    let words: Vec<String> = args
        .into_iter()
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
        .collect();
    words.join(" ")
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(config_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Builds the Gemini client, or `None` when no key is available.
async fn build_model(paths: &EchoryaPaths, config: &AppConfig) -> Option<Arc<dyn LanguageModel>> {
    let secrets = SecretServiceImpl::new(paths)
        .load_secrets()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to load secrets");
            SecretConfig::default()
        });

    match GeminiApiAgent::from_config(&secrets, config) {
        Ok(agent) => Some(Arc::new(agent) as Arc<dyn LanguageModel>),
        Err(e) => {
            error!(error = %e, "language model initialization failed");
            None
        }
    }
}

impl App {
    async fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Chat(text) => self.chat(&text).await?,
            Command::New => {
                let id = self.store.write().await.create_session();
                self.show_session(&id).await;
            }
            Command::Sessions => {
                let store = self.store.read().await;
                for line in render_session_list(&store) {
                    println!("{}", line);
                }
            }
            Command::Select(target) => {
                let id = self.resolve(&target).await?;
                self.store.write().await.select_session(&id);
                self.show_session(&id).await;
            }
            Command::Rename { target, title } => {
                let id = self.resolve(&target).await?;
                self.store
                    .write()
                    .await
                    .rename_session(&id, title.as_str())?;
                println!("{}", format!("Renamed to \"{title}\"").green());
            }
            Command::Delete(target) => {
                let id = self.resolve(&target).await?;
                let current = {
                    let mut store = self.store.write().await;
                    store.delete_session(&id);
                    store.current_id().to_string()
                };
                println!("{}", "Session deleted".green());
                self.show_session(&current).await;
            }
            Command::Home => {
                let navigation = self.store.write().await.go_home();
                if let HomeNavigation::StayedOnCurrent(_) = navigation {
                    println!("{}", "Already on an empty session".bright_black());
                }
                self.show_session(navigation.session_id()).await;
            }
            Command::Mic => self.toggle_mic(),
            Command::Login { email, password } => {
                let profile = self.user_service.login(&email, &password).await?;
                println!(
                    "{}",
                    format!("Signed in as {} ({})", profile.display_name, profile.handle).green()
                );
            }
            Command::Logout => {
                self.user_service.logout().await?;
                println!("{}", "Signed out".green());
            }
            Command::Whoami => {
                let profile = self.user_service.profile().await?;
                println!(
                    "{} {} {}",
                    format!("[{}]", profile.initials).bright_magenta().bold(),
                    profile.display_name,
                    profile.handle.bright_black()
                );
                println!("{}", profile.email.bright_black());
            }
            Command::Help => print_help(),
            Command::Usage(usage) => println!("{}", usage.yellow()),
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command: {name}").bright_black())
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn chat(&mut self, text: &str) -> Result<()> {
        print_message(&Message::user(text));
        println!("{}", "Echo is processing...".bright_black().italic());

        match self.controller.send(text).await? {
            TurnOutcome::Replied { message, .. } => print_message(&message),
            TurnOutcome::Failed(err) => println!("{}", err.user_message().red()),
            TurnOutcome::Discarded { .. } | TurnOutcome::Ignored => {}
        }
        Ok(())
    }

    fn toggle_mic(&mut self) {
        match speech::toggle(self.speech.as_mut(), &mut self.pending_input) {
            Ok(MicToggle::Started) => {
                println!("{}", "Listening... type /mic again to stop".bright_black())
            }
            Ok(MicToggle::Stopped { .. }) => println!("{}", "Listening stopped".bright_black()),
            Err(e) => println!("{}", e.to_string().yellow()),
        }
    }

    async fn resolve(&self, target: &str) -> Result<String> {
        let store = self.store.read().await;
        resolve_session(&store, target)
            .ok_or_else(|| anyhow::anyhow!("No session matches '{target}'"))
    }

    async fn show_session(&self, id: &str) {
        let store = self.store.read().await;
        let Some(session) = store.session(id) else {
            return;
        };
        println!("{}", render_header(session).bright_magenta().bold());
        for message in &session.messages {
            print_message(message);
        }
    }
}

fn print_message(message: &Message) {
    match render_message(message) {
        Rendered::User(lines) => {
            for line in lines {
                println!("{}", format!("> {line}").green());
            }
        }
        Rendered::Model(lines) => {
            for line in lines {
                println!("{}", line.bright_blue());
            }
        }
        Rendered::Asset(lines) => {
            let mut lines = lines.into_iter();
            if let Some(header) = lines.next() {
                println!("{}", header.bright_yellow().bold());
            }
            for line in lines {
                println!("{}", line.yellow());
            }
        }
    }
    println!();
}

fn print_help() {
    for (name, args, help) in COMMANDS {
        let synopsis = if args.is_empty() {
            name.to_string()
        } else {
            format!("{name} {args}")
        };
        println!("  {:<32} {}", synopsis.bright_cyan(), help);
    }
    println!("  {:<32} {}", "quit | exit".bright_cyan(), "leave Echorya");
}
