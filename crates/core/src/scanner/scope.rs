/// Nesting state carried from one line to the next during a scan.
///
/// `depth` is advisory only; it may go negative on malformed input and never
/// gates symbol extraction. `current` indexes into the model's function list.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    depth: i32,
    current: Option<usize>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `MAIN`, `FUNCTION` or `REPORT` block opened.
    pub fn enter_function(&mut self, index: usize) {
        self.current = Some(index);
        self.depth = 1;
    }

    /// The active block's end line was seen. Returns the index of the block
    /// that was closed, if any.
    pub fn leave_function(&mut self) -> Option<usize> {
        self.depth = 0;
        self.current.take()
    }

    pub fn open_nesting(&mut self) {
        self.depth += 1;
    }

    pub fn close_nesting(&mut self) {
        self.depth -= 1;
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_resets_depth_and_leaving_clears_function() {
        let mut tracker = ScopeTracker::new();
        tracker.open_nesting();
        tracker.enter_function(3);
        assert_eq!(tracker.depth(), 1);
        assert_eq!(tracker.current(), Some(3));
        tracker.open_nesting();
        assert_eq!(tracker.depth(), 2);
        assert_eq!(tracker.leave_function(), Some(3));
        assert_eq!(tracker.current(), None);
        assert_eq!(tracker.leave_function(), None);
    }

    #[test]
    fn depth_may_go_negative() {
        let mut tracker = ScopeTracker::new();
        tracker.close_nesting();
        tracker.close_nesting();
        assert_eq!(tracker.depth(), -2);
    }
}
