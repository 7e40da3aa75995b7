//! Shared validation helpers for configuration and WiFi strings.

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
pub(crate) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// A usable SSID: 1-32 printable ASCII bytes.
pub(crate) fn is_valid_ssid(s: &str) -> bool {
    !s.is_empty() && s.len() <= 32 && is_printable_ascii(s)
}
