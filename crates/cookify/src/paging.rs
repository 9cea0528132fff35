/// Page window over the full recipe list.
///
/// The window is a prefix length into an externally ordered list: the UI sees
/// `items[..len]` and asks for more as it scrolls. Pure and synchronous — no
/// I/O, no allocation; `visible` is a slice over the already-materialized
/// list, never a rebuilt copy.

/// Items fetched per advance.
pub const PAGE_SIZE: usize = 10;

/// How close to the window boundary the consumer may get before the next
/// page is fetched.
const NEAR_END_THRESHOLD: usize = 3;

#[derive(Debug, Clone)]
pub struct PageWindow {
    page_size: usize,
    len: usize,
    total: usize,
}

impl PageWindow {
    /// A window over a list of `total` items, starting at the first page.
    pub fn new(page_size: usize, total: usize) -> Self {
        let mut window = Self {
            page_size,
            len: 0,
            total,
        };
        window.reset();
        window
    }

    /// Restart at the first page. Also used when the underlying list changes.
    pub fn reset(&mut self) {
        self.len = self.page_size.min(self.total);
    }

    /// Grow the window by one page. Returns `false` (and leaves the window
    /// untouched) when everything is already visible.
    pub fn advance(&mut self) -> bool {
        if self.len >= self.total {
            return false;
        }
        self.len = (self.len + self.page_size).min(self.total);
        true
    }

    /// Called by the consumer with the index of the last item it rendered;
    /// advances when that index is within `NEAR_END_THRESHOLD` of the window
    /// boundary. Returns whether an advance happened.
    pub fn notify_near_end(&mut self, last_visible_index: usize) -> bool {
        // last_visible_index >= len - 3, written without usize underflow
        if last_visible_index + NEAR_END_THRESHOLD >= self.len {
            return self.advance();
        }
        false
    }

    pub fn has_more(&self) -> bool {
        self.len < self.total
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// The visible prefix of `items`. Borrowed, not copied.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.len.min(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clamps_to_total() {
        let w = PageWindow::new(10, 4);
        assert_eq!(w.len(), 4);
        assert!(!w.has_more());

        let w = PageWindow::new(10, 0);
        assert_eq!(w.len(), 0);
        assert!(!w.has_more());
    }

    #[test]
    fn advance_terminates_at_total() {
        // totalCount = 25, pageSize = 10
        let mut w = PageWindow::new(10, 25);
        assert_eq!(w.len(), 10);
        assert!(w.has_more());

        assert!(w.advance());
        assert_eq!(w.len(), 20);
        assert!(w.has_more());

        assert!(w.advance());
        assert_eq!(w.len(), 25);
        assert!(!w.has_more());

        assert!(!w.advance());
        assert_eq!(w.len(), 25);
    }

    #[test]
    fn advance_is_monotone() {
        let mut w = PageWindow::new(7, 100);
        let mut prev = w.len();
        for _ in 0..40 {
            w.advance();
            assert!(w.len() >= prev);
            assert!(w.len() <= 100);
            prev = w.len();
        }
        assert_eq!(w.len(), 100);
    }

    #[test]
    fn near_end_boundary() {
        // window length 10: index 6 is short of the threshold, 7 is on it
        let mut w = PageWindow::new(10, 25);
        assert!(!w.notify_near_end(6));
        assert_eq!(w.len(), 10);

        assert!(w.notify_near_end(7));
        assert_eq!(w.len(), 20);
    }

    #[test]
    fn near_end_at_exhausted_window_is_a_noop() {
        let mut w = PageWindow::new(10, 10);
        assert!(!w.notify_near_end(9));
        assert_eq!(w.len(), 10);
    }

    #[test]
    fn visible_is_a_prefix_slice() {
        let items: Vec<u32> = (0..25).collect();
        let mut w = PageWindow::new(10, items.len());
        assert_eq!(w.visible(&items), &items[..10]);
        w.advance();
        assert_eq!(w.visible(&items), &items[..20]);
    }
}
