use std::collections::VecDeque;

use image::RgbaImage;

/// Maximum number of stroke snapshots kept for undo.
pub const BRUSH_HISTORY_LIMIT: usize = 50;

/// Bounded stack of deep brush-layer copies, newest at the back.
#[derive(Debug, Clone)]
pub struct BrushHistory {
    snapshots: VecDeque<RgbaImage>,
    limit: usize,
}

impl Default for BrushHistory {
    fn default() -> Self {
        Self::with_limit(BRUSH_HISTORY_LIMIT)
    }
}

impl BrushHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(limit.min(BRUSH_HISTORY_LIMIT)),
            limit: limit.max(1),
        }
    }

    /// Pushes a snapshot, evicting the oldest one once the limit is exceeded.
    pub fn push(&mut self, snapshot: RgbaImage) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<RgbaImage> {
        self.snapshots.pop_back()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: u8) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, image::Rgba([tag, 0, 0, 255]))
    }

    #[test]
    fn history_is_bounded_and_evicts_oldest_first() {
        let mut history = BrushHistory::default();
        for tag in 0..=50_u8 {
            history.push(tagged(tag));
        }
        assert_eq!(history.len(), BRUSH_HISTORY_LIMIT);

        assert_eq!(history.pop(), Some(tagged(50)));
        let mut oldest = None;
        while let Some(snapshot) = history.pop() {
            oldest = Some(snapshot);
        }
        assert_eq!(oldest, Some(tagged(1)), "snapshot 0 should have been evicted");
    }

    #[test]
    fn pop_on_empty_history_is_none() {
        let mut history = BrushHistory::with_limit(3);
        assert!(history.pop().is_none());
        history.push(tagged(1));
        history.clear();
        assert!(history.is_empty());
    }
}
