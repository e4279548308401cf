//! # Apply Sequence
//!
//! Tracks which code block of a conversation is "next" to receive the global
//! apply shortcut. The transcript view owns one [`ApplySequence`] and passes
//! it down to the toolbars instead of sharing a global counter.

/// Pointer to the next code block that the apply shortcut targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplySequence {
    next: usize,
    len: usize,
}

impl ApplySequence {
    pub fn new(len: usize) -> Self {
        Self { next: 0, len }
    }

    /// Index of the block the shortcut currently targets, if any remain.
    pub fn next(&self) -> Option<usize> {
        (self.next < self.len).then_some(self.next)
    }

    pub fn is_next(&self, index: usize) -> bool {
        self.next() == Some(index)
    }

    /// Move to the following block. Saturates once every block was applied.
    pub fn advance(&mut self) {
        if self.next < self.len {
            self.next += 1;
        }
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_walks_blocks_in_order() {
        let mut seq = ApplySequence::new(3);
        assert!(seq.is_next(0));
        seq.advance();
        assert!(seq.is_next(1));
        assert!(!seq.is_next(0));
        seq.advance();
        seq.advance();
        assert_eq!(seq.next(), None);
        seq.advance();
        assert_eq!(seq.next(), None);
    }

    #[test]
    fn test_empty_sequence_has_no_target() {
        let seq = ApplySequence::new(0);
        assert!(seq.is_empty());
        assert!(!seq.is_next(0));
    }

    #[test]
    fn test_reset() {
        let mut seq = ApplySequence::new(2);
        seq.advance();
        seq.reset();
        assert_eq!(seq.next(), Some(0));
    }
}
