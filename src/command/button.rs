//! Remote button characteristic.

/// Button press reported by the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

/// Maps a button characteristic write to an event.
///
/// Only a single `'R'` or `'L'` byte is meaningful.
pub fn parse_button(data: &[u8]) -> Option<ButtonEvent> {
    match data {
        [b'R'] => Some(ButtonEvent::ShortPress),
        [b'L'] => Some(ButtonEvent::LongPress),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert_eq!(parse_button(b"R"), Some(ButtonEvent::ShortPress));
        assert_eq!(parse_button(b"L"), Some(ButtonEvent::LongPress));
    }

    #[test]
    fn test_other_payloads_ignored() {
        assert_eq!(parse_button(b"r"), None);
        assert_eq!(parse_button(b"RL"), None);
        assert_eq!(parse_button(b""), None);
    }
}
