//! Telegram MarkdownV2 rendering for outbound notifications.

use crate::instances::StateNotification;

const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escape text for use outside of entities.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if RESERVED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape text for use inside a `code` entity, where only `` ` `` and `\`
/// are special.
pub fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '`' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// "Instance `web` is running"
pub fn state_notification(notification: &StateNotification) -> String {
    format!(
        "Instance `{}` is {}",
        escape_code(&notification.name),
        escape(notification.state.as_str())
    )
}

/// "Disk usage is at 91.3%"
pub fn disk_notification(percent: f64) -> String {
    escape(&format!("Disk usage is at {percent:.1}%"))
}
