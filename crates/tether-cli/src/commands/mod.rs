//! Slash commands understood by the REPL.

pub mod clipboard;

/// Command names offered for completion and hints.
pub const COMMAND_NAMES: &[&str] = &[
    "/login",
    "/connect",
    "/disconnect",
    "/logout",
    "/apikey",
    "/copy",
    "/status",
    "/help",
    "/quit",
];

pub const HELP: &str = "\
/login <user> <password>  log in and connect
/connect                  connect with the current token
/disconnect               close the connection
/logout                   log out and clear stored credentials
/apikey <key>             use an API key as access token
/copy <n>                 copy message #n to the clipboard
/status                   show the session state
/quit                     exit
Anything else is sent as a chat message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Connect,
    Disconnect,
    Logout,
    ApiKey(String),
    /// 1-based transcript position, as printed next to each message.
    Copy(usize),
    Status,
    Help,
    Quit,
    Send(String),
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    /// Parses one input line. Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line == "quit" || line == "exit" {
            return Some(Self::Quit);
        }
        if !line.starts_with('/') {
            return Some(Self::Send(line.to_string()));
        }

        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let command = match (name, args.as_slice()) {
            ("/login", [username, password]) => Self::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("/login", _) => Self::Usage("/login <user> <password>"),
            ("/connect", []) => Self::Connect,
            ("/disconnect", []) => Self::Disconnect,
            ("/logout", []) => Self::Logout,
            ("/apikey", [key]) => Self::ApiKey(key.to_string()),
            ("/apikey", _) => Self::Usage("/apikey <key>"),
            ("/copy", [n]) => match n.parse::<usize>() {
                Ok(index) if index > 0 => Self::Copy(index),
                _ => Self::Usage("/copy <n>"),
            },
            ("/copy", _) => Self::Usage("/copy <n>"),
            ("/status", []) => Self::Status,
            ("/help", _) => Self::Help,
            ("/quit" | "/exit", []) => Self::Quit,
            _ => Self::Unknown(name.to_string()),
        };
        Some(command)
    }

    /// Lines carrying secrets stay out of the history.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::Login { .. } | Self::ApiKey(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            Command::parse("  hej alla  "),
            Some(Command::Send("hej alla".into()))
        );
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_login_arguments() {
        assert_eq!(
            Command::parse("/login alice pw"),
            Some(Command::Login {
                username: "alice".into(),
                password: "pw".into()
            })
        );
        assert_eq!(
            Command::parse("/login alice"),
            Some(Command::Usage("/login <user> <password>"))
        );
    }

    #[test]
    fn test_copy_index_must_be_positive() {
        assert_eq!(Command::parse("/copy 3"), Some(Command::Copy(3)));
        assert_eq!(Command::parse("/copy 0"), Some(Command::Usage("/copy <n>")));
        assert_eq!(Command::parse("/copy x"), Some(Command::Usage("/copy <n>")));
    }

    #[test]
    fn test_quit_aliases() {
        for line in ["quit", "exit", "/quit", "/exit"] {
            assert_eq!(Command::parse(line), Some(Command::Quit));
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse("/join lobby"),
            Some(Command::Unknown("/join".into()))
        );
    }

    #[test]
    fn test_secrets_are_sensitive() {
        assert!(Command::parse("/login a b").unwrap().is_sensitive());
        assert!(Command::parse("/apikey K1").unwrap().is_sensitive());
        assert!(!Command::parse("/connect").unwrap().is_sensitive());
    }
}
