//! Support message selection.
//!
//! Selection is split in two: [`select_message`] is a pure index lookup and
//! [`MessagePicker`] owns the (seedable) random source that produces indices.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::journey::SupportType;

/// Candidate support messages for each support type.
pub fn support_messages(support_type: SupportType) -> &'static [&'static str] {
    match support_type {
        SupportType::Reassurance => &[
            "You're doing great! Take it one step at a time.",
            "Remember, progress is progress, no matter how small.",
            "You have what it takes to succeed.",
        ],
        SupportType::Encouragement => &[
            "Let's build on your strengths!",
            "You're making meaningful progress.",
            "Keep going - you're on the right track!",
        ],
        SupportType::Guidance => &[
            "Here's a helpful tip to consider...",
            "Let's explore this together.",
            "Think about it this way...",
        ],
    }
}

/// Pick the message at `index`, wrapping around the list. Returns `None` only
/// for an empty list.
pub fn select_message<'a>(messages: &[&'a str], index: usize) -> Option<&'a str> {
    if messages.is_empty() {
        return None;
    }
    Some(messages[index % messages.len()])
}

/// Random index source for message selection.
pub struct MessagePicker {
    rng: Mutex<StdRng>,
}

impl MessagePicker {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Build from an optional seed, using entropy when absent.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Draw an index in `0..len`. `len` must be non-zero.
    pub fn next_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }

    /// Pick a support message for `support_type`.
    pub fn pick(&self, support_type: SupportType) -> String {
        let messages = support_messages(support_type);
        let index = self.next_index(messages.len());
        select_message(messages, index)
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_message_wraps_index() {
        let list = ["a", "b", "c"];
        assert_eq!(select_message(&list, 0), Some("a"));
        assert_eq!(select_message(&list, 2), Some("c"));
        assert_eq!(select_message(&list, 4), Some("b"));
        assert_eq!(select_message(&[], 1), None);
    }

    #[test]
    fn seeded_pickers_agree() {
        let a = MessagePicker::seeded(42);
        let b = MessagePicker::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.pick(SupportType::Guidance), b.pick(SupportType::Guidance));
        }
    }

    #[test]
    fn picked_message_belongs_to_type() {
        let picker = MessagePicker::from_entropy();
        for support_type in [
            SupportType::Reassurance,
            SupportType::Encouragement,
            SupportType::Guidance,
        ] {
            let message = picker.pick(support_type);
            assert!(support_messages(support_type).contains(&message.as_str()));
        }
    }
}
