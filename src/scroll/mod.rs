//! Near-bottom detection for infinite scrolling.
//!
//! [`ScrollSentinel`] turns a stream of [`ScrollGeometry`] samples into
//! edge-triggered [`SentinelEvent::Advance`] events. It fires once when the
//! viewport comes within `threshold` rows of the end of the content, and
//! stays quiet for as long as that geometry holds. It fires again only when
//! the viewport leaves the zone and comes back, or when the content height
//! changes while still inside it (a page arrived but did not fill the screen).

/// Default distance from the bottom, in rows, that counts as "near".
pub const DEFAULT_THRESHOLD: usize = 20;

/// Content and viewport extents, in terminal rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollGeometry {
    pub content_height: usize,
    pub scroll_top: usize,
    pub viewport_height: usize,
}

impl ScrollGeometry {
    /// Rows of content below the viewport. Zero when the content is shorter
    /// than the viewport.
    pub const fn distance_from_bottom(&self) -> usize {
        self.content_height
            .saturating_sub(self.scroll_top + self.viewport_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelEvent {
    /// The viewport reached the bottom zone; load the next page.
    Advance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollSentinel {
    threshold: usize,
    attached: bool,
    // Content height at the last emission; `None` while outside the zone.
    fired_at: Option<usize>,
}

impl Default for ScrollSentinel {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ScrollSentinel {
    /// Create a detached sentinel.
    pub const fn new(threshold: usize) -> Self {
        Self {
            threshold,
            attached: false,
            fired_at: None,
        }
    }

    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Start observing. Emission state is cleared.
    pub fn attach(&mut self) {
        self.attached = true;
        self.fired_at = None;
        tracing::debug!(threshold = self.threshold, "scroll sentinel attached");
    }

    /// Stop observing; subsequent samples are ignored.
    pub fn detach(&mut self) {
        if self.attached {
            tracing::debug!("scroll sentinel detached");
        }
        self.attached = false;
        self.fired_at = None;
    }

    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Forget the last emission so the current geometry may fire again.
    /// Called after every merged page and on a scroll push at the bottom.
    pub fn rearm(&mut self) {
        self.fired_at = None;
    }

    /// Feed one geometry sample.
    pub fn observe(&mut self, geometry: ScrollGeometry) -> Option<SentinelEvent> {
        if !self.attached {
            return None;
        }
        if geometry.distance_from_bottom() > self.threshold {
            self.fired_at = None;
            return None;
        }
        if self.fired_at == Some(geometry.content_height) {
            return None;
        }
        self.fired_at = Some(geometry.content_height);
        tracing::trace!(
            content = geometry.content_height,
            top = geometry.scroll_top,
            viewport = geometry.viewport_height,
            "near bottom"
        );
        Some(SentinelEvent::Advance)
    }
}
