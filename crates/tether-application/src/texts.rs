//! User-facing strings shown by the session controller.

pub const MISSING_LOGIN_FIELDS: &str = "Ange både användarnamn och lösenord";
pub const LOGIN_NETWORK_ERROR: &str = "Inloggningsfel. Kontrollera din internetanslutning.";
pub const MISSING_TOKEN: &str = "Ingen API-nyckel tillgänglig. Logga in först.";
pub const INVALID_API_KEY: &str = "Ogiltig API-nyckel. Session utgången.";

pub const SESSION_EXPIRED_LOGIN_AGAIN: &str = "Session utgången. Vänligen logga in igen.";
pub const SESSION_EXPIRED_DISCONNECTED: &str = "Session utgången. Anslutning avbruten.";
pub const CONNECTED_TO_SERVER: &str = "Ansluten till servern!";
pub const LOGGED_OUT: &str = "Du har loggat ut.";
pub const COPIED: &str = "Kopierat!";
pub const COPY_FAILED: &str = "Kunde inte kopiera till urklipp";

pub const STATUS_CONNECTING: &str = "Ansluter...";
pub const STATUS_CONNECTED: &str = "Ansluten";
pub const STATUS_DISCONNECTED: &str = "Frånkopplad";
pub const STATUS_CONNECT_ERROR: &str = "Anslutningsfel";
pub const STATUS_LOGGED_OUT: &str = "Utloggad";

pub const CLIENT_DISCONNECT_REASON: &str = "io client disconnect";

pub fn welcome(username: &str) -> String {
    format!("Välkommen {}!", username)
}

pub fn login_failed(message: &str) -> String {
    format!("Inloggning misslyckades: {}", message)
}

pub fn disconnected(reason: &str) -> String {
    format!("Frånkopplad: {}", reason)
}

pub fn connect_error(message: &str) -> String {
    format!("Anslutningsfel: {}", message)
}
