//! Bounded cache of decoded thumbnails.

use std::collections::{HashMap, VecDeque};

use image::DynamicImage;

/// Decoded thumbnails keyed by item id, evicted oldest-first.
///
/// Protocols for cards far from the viewport are dropped to save memory;
/// the decoded image stays here so scrolling back does not refetch.
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    entries: HashMap<String, DynamicImage>,
    order: VecDeque<String>,
    max_size: usize,
}

impl ThumbnailCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_size,
        }
    }

    pub fn get(&self, id: &str) -> Option<&DynamicImage> {
        self.entries.get(id)
    }

    /// Insert a thumbnail. Replacing an existing id keeps its position.
    pub fn insert(&mut self, id: String, image: DynamicImage) {
        if let Some(slot) = self.entries.get_mut(&id) {
            *slot = image;
            return;
        }

        self.order.push_back(id.clone());
        self.entries.insert(id, image);

        while self.entries.len() > self.max_size {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
