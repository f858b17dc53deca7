//! Utilities for sanitizing error messages.
//!
//! Removes control characters from error messages before they are put into a
//! `CheckResult` and rendered on the dashboard, and caps their length.

/// Sanitizes an error message by removing control characters.
///
/// Control characters (0x00-0x1F, except newline/tab/carriage return) can cause
/// issues when rendered in HTML or logs. This function removes them while
/// preserving readability.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitizes and truncates an error message to at most `max_chars` characters.
///
/// Truncation counts characters, not bytes, so multi-byte text is never split.
pub fn truncate_detail(message: &str, max_chars: usize) -> String {
    sanitize_error_message(message)
        .chars()
        .take(max_chars)
        .collect()
}
