use nalgebra::Point2;

/// Fixed-capacity ring buffer of recent ground positions.
///
/// Slots start at the origin and are overwritten in order; the write cursor
/// wraps modulo the capacity. The number of insertions is tracked so callers
/// can tell a full window from one still holding initial slots.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionHistory {
    slots: Vec<Point2<f64>>,
    cursor: usize,
    inserted: u64,
}

impl PositionHistory {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Point2::origin(); capacity.max(1)],
            cursor: 0,
            inserted: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding real samples.
    pub fn len(&self) -> usize {
        usize::try_from(self.inserted).map_or(self.capacity(), |n| n.min(self.capacity()))
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Total insertions since construction or the last [`clear`](Self::clear).
    pub fn total_inserted(&self) -> u64 {
        self.inserted
    }

    pub fn push(&mut self, p: Point2<f64>) {
        self.slots[self.cursor] = p;
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.inserted += 1;
    }

    /// Stored samples in slot order (not chronological once wrapped).
    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.slots[..self.len()]
    }

    /// Stored samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Point2<f64>> + '_ {
        let split = if self.is_full() { self.cursor } else { 0 };
        let (recent, oldest) = self.as_slice().split_at(split);
        oldest.iter().chain(recent)
    }

    pub fn latest(&self) -> Option<Point2<f64>> {
        if self.is_empty() {
            return None;
        }
        let idx = (self.cursor + self.capacity() - 1) % self.capacity();
        Some(self.slots[idx])
    }

    pub fn clear(&mut self) {
        self.slots.fill(Point2::origin());
        self.cursor = 0;
        self.inserted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64) -> Point2<f64> {
        Point2::new(x, -x)
    }

    #[test]
    fn fills_then_overwrites_oldest() {
        let mut h = PositionHistory::new(3);
        assert!(h.is_empty());
        h.push(p(1.0));
        h.push(p(2.0));
        assert_eq!(h.len(), 2);
        assert!(!h.is_full());
        assert_eq!(h.as_slice(), &[p(1.0), p(2.0)]);

        h.push(p(3.0));
        h.push(p(4.0));
        assert!(h.is_full());
        assert_eq!(h.len(), 3);
        assert_eq!(h.total_inserted(), 4);
        assert_eq!(h.as_slice(), &[p(4.0), p(2.0), p(3.0)]);
        let chrono: Vec<_> = h.iter().copied().collect();
        assert_eq!(chrono, vec![p(2.0), p(3.0), p(4.0)]);
        assert_eq!(h.latest(), Some(p(4.0)));
    }

    #[test]
    fn full_after_origin_samples() {
        // real samples at the origin still count toward a full window
        let mut h = PositionHistory::new(2);
        h.push(Point2::origin());
        assert!(!h.is_full());
        h.push(Point2::origin());
        assert!(h.is_full());
    }

    #[test]
    fn clear_resets_everything() {
        let mut h = PositionHistory::new(2);
        h.push(p(5.0));
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.latest(), None);
        assert_eq!(h, PositionHistory::new(2));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut h = PositionHistory::new(0);
        assert_eq!(h.capacity(), 1);
        h.push(p(1.0));
        h.push(p(2.0));
        assert_eq!(h.as_slice(), &[p(2.0)]);
    }
}
