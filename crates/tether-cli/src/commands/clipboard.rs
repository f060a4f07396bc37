//! Per-message copy action.

use tether_core::session::Transcript;

/// Text of the `position`-th (1-based) transcript entry, if it can be copied.
pub fn copyable_text(transcript: &Transcript, position: usize) -> Option<&str> {
    let message = transcript.get(position.checked_sub(1)?)?;
    message.is_copyable().then_some(message.text.as_str())
}

/// Puts `text` on the system clipboard.
pub fn copy(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)?;
    tracing::debug!("[Clipboard] Copied {} bytes", text.len());
    Ok(())
}
