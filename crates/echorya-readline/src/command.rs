//! Slash-command parsing for the REPL.

use echorya_core::session::SessionStore;

/// Slash commands with their argument synopsis and help text.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("/new", "", "start a new session"),
    ("/sessions", "", "list sessions, newest first"),
    ("/select", "<n|id>", "switch to a session"),
    ("/rename", "<n|id> <title>", "rename a session"),
    ("/delete", "<n|id>", "delete a session"),
    ("/home", "", "go to an empty session"),
    ("/mic", "", "toggle voice input"),
    ("/login", "<email> <password>", "sign in"),
    ("/logout", "", "sign out"),
    ("/whoami", "", "show the signed-in user"),
    ("/help", "", "show this help"),
];

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Sessions,
    Select(String),
    Rename { target: String, title: String },
    Delete(String),
    Home,
    Mic,
    Login { email: String, password: String },
    Logout,
    Whoami,
    Help,
    Quit,
    /// Anything that is not a command is sent to the model.
    Chat(String),
    /// A known command with missing arguments; carries its usage line.
    Usage(String),
    Unknown(String),
}

impl Command {
    /// Parses a trimmed input line. Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line == "quit" || line == "exit" {
            return Some(Command::Quit);
        }
        if !line.starts_with('/') {
            return Some(Command::Chat(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "/new" => Command::New,
            "/sessions" => Command::Sessions,
            "/home" => Command::Home,
            "/mic" => Command::Mic,
            "/logout" => Command::Logout,
            "/whoami" => Command::Whoami,
            "/help" => Command::Help,
            "/select" | "/delete" if rest.is_empty() => usage(name),
            "/select" => Command::Select(rest.to_string()),
            "/delete" => Command::Delete(rest.to_string()),
            "/rename" => match rest.split_once(char::is_whitespace) {
                Some((target, title)) if !title.trim().is_empty() => Command::Rename {
                    target: target.to_string(),
                    title: title.trim().to_string(),
                },
                _ => usage(name),
            },
            "/login" => match rest.split_once(char::is_whitespace) {
                Some((email, password)) if !password.trim().is_empty() => Command::Login {
                    email: email.to_string(),
                    password: password.trim().to_string(),
                },
                _ => usage(name),
            },
            _ => Command::Unknown(name.to_string()),
        };
        Some(command)
    }
}

fn usage(name: &str) -> Command {
    let synopsis = COMMANDS
        .iter()
        .find(|(command, _, _)| *command == name)
        .map(|(_, args, _)| *args)
        .unwrap_or_default();
    Command::Usage(format!("Usage: {name} {synopsis}"))
}

/// Resolves a session reference typed by the user.
///
/// Accepts a 1-based position in the `/sessions` listing, a full id, or an
/// unambiguous id prefix. A number outside the listing is tried as an id
/// prefix.
pub fn resolve_session(store: &SessionStore, target: &str) -> Option<String> {
    let listing: Vec<&str> = store.recent().map(|s| s.id.as_str()).collect();
    resolve_in(&listing, target).map(str::to_string)
}

/// Resolves `target` against ids listed newest first.
fn resolve_in<'a>(listing: &[&'a str], target: &str) -> Option<&'a str> {
    let by_position = target
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| listing.get(index).copied());
    if let Some(id) = by_position {
        return Some(id);
    }
    if let Some(id) = listing.iter().copied().find(|id| *id == target) {
        return Some(id);
    }

    let mut matches = listing.iter().copied().filter(|id| id.starts_with(target));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Some(id),
        _ => None,
    }
}
