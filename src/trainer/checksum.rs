//! # Trainer Checksum
//!
//! Running XOR over every unescaped payload byte (frame type and packed
//! channels). Stuffing is applied after the byte is folded in.

/// Accumulating XOR checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XorChecksum(u8);

impl XorChecksum {
    pub fn new() -> Self {
        Self(0)
    }

    /// Folds one byte into the checksum.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.0 ^= byte;
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// XOR of every byte in `data`.
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &byte| acc ^ byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(xor_checksum(&[]), 0x00);
        assert_eq!(XorChecksum::new().value(), 0x00);
    }

    #[test]
    fn test_running_matches_slice() {
        let data = [0x80, 0xE0, 0x33, 0x7E, 0x7D, 0x01];
        let mut running = XorChecksum::new();
        for &byte in &data {
            running.update(byte);
        }
        assert_eq!(running.value(), xor_checksum(&data));
    }

    #[test]
    fn test_pairs_cancel() {
        assert_eq!(xor_checksum(&[0x5A, 0x5A]), 0x00);
        assert_eq!(xor_checksum(&[0x80, 0x12, 0x12]), 0x80);
    }
}
