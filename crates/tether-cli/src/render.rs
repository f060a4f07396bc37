//! Terminal rendering of controller view updates.

use colored::Colorize;
use tether_core::session::{Message, MessageOrigin, Section, StatusKind, ViewUpdate};

/// Turns [`ViewUpdate`]s into colored terminal lines.
///
/// Tracks the transcript position so `/copy N` matches the numbers shown.
#[derive(Debug, Default)]
pub struct Renderer {
    position: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, update: ViewUpdate) {
        if let Some(line) = self.format(update) {
            println!("{}", line);
        }
    }

    pub fn format(&mut self, update: ViewUpdate) -> Option<String> {
        match update {
            ViewUpdate::Section(Section::Login) => Some(
                "Log in with /login <user> <password> or set a key with /apikey <key>"
                    .bright_black()
                    .to_string(),
            ),
            ViewUpdate::Section(Section::Auth) => Some(
                "Authenticated. /connect, /disconnect or /logout"
                    .bright_black()
                    .to_string(),
            ),
            ViewUpdate::Status { kind, text } => {
                let line = format!("● {}", text);
                Some(match kind {
                    StatusKind::Connecting => line.yellow(),
                    StatusKind::Connected => line.bright_green(),
                    StatusKind::Disconnected => line.red(),
                }
                .to_string())
            }
            // The prompt stays open; sending is gated on the session state.
            ViewUpdate::InputEnabled(_) => None,
            ViewUpdate::Alert(text) => Some(format!("! {}", text).bright_red().bold().to_string()),
            ViewUpdate::Notice(text) => Some(text.bright_yellow().to_string()),
            ViewUpdate::LoginPending(true) => Some("Loggar in...".bright_black().to_string()),
            ViewUpdate::LoginPending(false) => None,
            ViewUpdate::MessageAppended(message) => {
                self.position += 1;
                Some(format_message(self.position, &message))
            }
            ViewUpdate::TranscriptCleared => {
                self.position = 0;
                Some("────────".bright_black().to_string())
            }
            // Tokens are never echoed to the terminal.
            ViewUpdate::ApiKey(_) => None,
        }
    }
}

fn format_message(position: usize, message: &Message) -> String {
    let prefix = format!("#{:<3} [{}]", position, message.time_label()).bright_black();
    let text = match message.origin {
        MessageOrigin::System => message.text.bright_black().italic(),
        MessageOrigin::Remote => message.text.bright_blue(),
        MessageOrigin::Own => message.text.green(),
    };
    format!("{} {}", prefix, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_messages_are_numbered_from_one() {
        plain();
        let mut renderer = Renderer::new();

        let first = renderer
            .format(ViewUpdate::MessageAppended(Message::system("Välkommen alice!")))
            .unwrap();
        let second = renderer
            .format(ViewUpdate::MessageAppended(Message::remote("hej")))
            .unwrap();

        assert!(first.starts_with("#1 "));
        assert!(first.ends_with("Välkommen alice!"));
        assert!(second.starts_with("#2 "));
    }

    #[test]
    fn test_clearing_restarts_numbering() {
        plain();
        let mut renderer = Renderer::new();
        renderer.format(ViewUpdate::MessageAppended(Message::remote("hej")));

        renderer.format(ViewUpdate::TranscriptCleared);
        let line = renderer
            .format(ViewUpdate::MessageAppended(Message::remote("igen")))
            .unwrap();

        assert!(line.starts_with("#1 "));
    }

    #[test]
    fn test_input_state_is_not_printed() {
        let mut renderer = Renderer::new();
        assert_eq!(renderer.format(ViewUpdate::InputEnabled(true)), None);
        assert_eq!(renderer.format(ViewUpdate::InputEnabled(false)), None);
    }

    #[test]
    fn test_tokens_are_not_printed() {
        let mut renderer = Renderer::new();
        assert_eq!(renderer.format(ViewUpdate::ApiKey(Some("A1".into()))), None);
    }
}
