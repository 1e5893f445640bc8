//! Seeded scenario generation.
//!
//! Operations are small and composable so generated scenarios explore
//! interleavings of sends, clock movement and settling. The same seed always
//! yields the same scenario.

use arbitrary::{Arbitrary, Unstructured};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Bytes of entropy drawn per generated operation.
const BYTES_PER_OPERATION: usize = 8;

/// Participant index, wrapped into the number of joined participants.
pub type ParticipantId = u8;

/// Operations that can be applied to a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// A participant sends a message.
    Send {
        /// Sending participant.
        participant: ParticipantId,
        /// Message content.
        text: SmallText,
    },

    /// Move the shared clock forward.
    ///
    /// Sends without an advance in between share a timestamp.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },

    /// Let every session drain its pending deliveries and writes.
    Settle,
}

/// Compact message content.
///
/// Expanded deterministically. Size class 0 is blank and must be rejected
/// by the sender; class 3 exceeds the notification body limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallText {
    /// Content seed.
    pub seed: u8,
    /// Length hint (0-3 maps to blank/short/medium/long).
    pub size_class: u8,
}

impl SmallText {
    /// Expand to message text.
    pub fn to_text(self) -> String {
        let len = match self.size_class % 4 {
            0 => return "   ".to_owned(),
            1 => 4,
            2 => 40,
            _ => 160,
        };
        (0..len).map(|i| char::from(b'a' + self.seed.wrapping_add(i as u8) % 26)).collect()
    }

    /// Whether sending this text must be rejected.
    pub fn is_blank(self) -> bool {
        self.size_class % 4 == 0
    }
}

/// Generate `len` operations from `seed`.
pub fn generate(seed: u64, len: usize) -> Vec<Operation> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut entropy = vec![0u8; len * BYTES_PER_OPERATION];
    rng.fill_bytes(&mut entropy);

    let mut unstructured = Unstructured::new(&entropy);
    let mut operations = Vec::with_capacity(len);
    while operations.len() < len {
        match Operation::arbitrary(&mut unstructured) {
            Ok(operation) => operations.push(operation),
            Err(_) => break,
        }
    }
    operations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_scenario() {
        assert_eq!(generate(7, 50), generate(7, 50));
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(generate(1, 50), generate(2, 50));
    }

    #[test]
    fn text_expansion() {
        assert!(SmallText { seed: 3, size_class: 0 }.to_text().trim().is_empty());
        assert_eq!(SmallText { seed: 0, size_class: 1 }.to_text(), "abcd");
        assert_eq!(SmallText { seed: 9, size_class: 3 }.to_text().chars().count(), 160);
    }
}
