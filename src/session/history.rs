use crate::models::GeneratedImage;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

/// Number of entries shown as thumbnails below the featured image.
pub const THUMBNAIL_COUNT: usize = 5;

/// Most-recent-first list of generated images with a fixed capacity.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Arc<GeneratedImage>>,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Puts `image` at the front, evicting the oldest entry when full.
    pub fn prepend(&mut self, image: GeneratedImage) -> Arc<GeneratedImage> {
        let image = Arc::new(image);
        self.entries.push_front(image.clone());
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                log::debug!("History full, evicting image {}", evicted.id);
            }
        }
        image
    }

    /// Moves the entry with `id` to the front. Returns false if absent.
    pub fn promote(&mut self, id: Uuid) -> bool {
        let Some(position) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        if let Some(entry) = self.entries.remove(position) {
            self.entries.push_front(entry);
        }
        true
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<GeneratedImage>> {
        self.entries.iter().find(|entry| entry.id == id).cloned()
    }

    pub fn featured(&self) -> Option<Arc<GeneratedImage>> {
        self.entries.front().cloned()
    }

    pub fn thumbnails(&self) -> impl Iterator<Item = &Arc<GeneratedImage>> {
        self.entries.iter().skip(1).take(THUMBNAIL_COUNT)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GeneratedImage>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectRatio;

    fn image(n: i64) -> GeneratedImage {
        GeneratedImage::new(
            format!("data:image/jpeg;base64,{}", n),
            format!("prompt {}", n),
            AspectRatio::Square,
            n,
        )
    }

    fn timestamps(history: &History) -> Vec<i64> {
        history.iter().map(|entry| entry.timestamp).collect()
    }

    #[test]
    fn test_prepend_is_most_recent_first() {
        let mut history = History::with_capacity(10);
        for n in 1..=3 {
            history.prepend(image(n));
        }
        assert_eq!(timestamps(&history), vec![3, 2, 1]);
        assert_eq!(history.featured().unwrap().timestamp, 3);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::with_capacity(3);
        for n in 1..=5 {
            history.prepend(image(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(timestamps(&history), vec![5, 4, 3]);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut history = History::with_capacity(0);
        history.prepend(image(1));
        history.prepend(image(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(timestamps(&history), vec![2]);
    }

    #[test]
    fn test_promote_moves_entry_to_front() {
        let mut history = History::with_capacity(10);
        let ids: Vec<Uuid> = (1..=5).map(|n| history.prepend(image(n)).id).collect();
        // history is now [5, 4, 3, 2, 1]

        assert!(history.promote(ids[1]));
        assert_eq!(timestamps(&history), vec![2, 5, 4, 3, 1]);
        assert_eq!(history.len(), 5);

        assert!(history.promote(ids[1]));
        assert_eq!(timestamps(&history), vec![2, 5, 4, 3, 1]);
    }

    #[test]
    fn test_promote_unknown_id() {
        let mut history = History::with_capacity(10);
        history.prepend(image(1));
        assert!(!history.promote(Uuid::new_v4()));
        assert_eq!(timestamps(&history), vec![1]);
    }

    #[test]
    fn test_thumbnails_window() {
        let mut history = History::with_capacity(20);
        assert_eq!(history.thumbnails().count(), 0);

        for n in 1..=8 {
            history.prepend(image(n));
        }
        let thumbs: Vec<i64> = history.thumbnails().map(|entry| entry.timestamp).collect();
        assert_eq!(thumbs, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_get_by_id() {
        let mut history = History::with_capacity(10);
        let stored = history.prepend(image(42));
        assert_eq!(history.get(stored.id).unwrap().timestamp, 42);
        assert!(history.get(Uuid::new_v4()).is_none());
    }
}
