use std::{
    collections::{VecDeque, vec_deque},
    ops::RangeBounds,
};

/// Upper bound on the up-front allocation; larger buffers grow on demand.
const MAX_PREALLOCATED: usize = 4_096;

/// Capacity-bounded FIFO. Pushing into a full buffer evicts the oldest
/// element and hands it back to the caller.
#[derive(Clone, Debug)]
pub(crate) struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    #[must_use]
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");

        Self {
            items: VecDeque::with_capacity(capacity.min(MAX_PREALLOCATED)),
            capacity,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    #[inline]
    pub(crate) fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.items.pop_front()
        } else {
            None
        };

        self.items.push_back(value);

        evicted
    }

    /// Swaps the newest element, returning the previous one.
    /// `None` (and no insert) when the buffer is empty.
    #[inline]
    pub(crate) fn replace_last(&mut self, value: T) -> Option<T> {
        self.items
            .back_mut()
            .map(|slot| std::mem::replace(slot, value))
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<&T> {
        self.items.back()
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[inline]
    pub(crate) fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    pub(crate) fn range<R>(&self, range: R) -> vec_deque::Iter<'_, T>
    where
        R: RangeBounds<usize>,
    {
        self.items.range(range)
    }

    pub(crate) fn make_contiguous(&mut self) -> &[T] {
        self.items.make_contiguous()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the contents with `values`, keeping only the newest
    /// `capacity` of them. Returns how many were dropped from the front.
    pub(crate) fn refill<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let dropped = values.len().saturating_sub(self.capacity);

        self.items.clear();
        self.items.extend(values.skip(dropped));

        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::RingBuffer;

    fn contents(rb: &RingBuffer<u32>) -> Vec<u32> {
        rb.iter().copied().collect()
    }

    #[test]
    fn filling_returns_none() {
        let mut rb = RingBuffer::new(3);
        assert_eq!(rb.push(1), None);
        assert_eq!(rb.push(2), None);
        assert_eq!(rb.push(3), None);
        assert!(rb.is_full());
    }

    #[test]
    fn full_evicts_oldest() {
        let mut rb = RingBuffer::new(3);
        rb.push(1);
        rb.push(2);
        rb.push(3);
        assert_eq!(rb.push(4), Some(1));
        assert_eq!(rb.push(5), Some(2));
        assert_eq!(rb.push(6), Some(3));
        assert_eq!(contents(&rb), [4, 5, 6]);
    }

    #[test]
    fn replace_last_swaps_latest() {
        let mut rb = RingBuffer::new(3);
        rb.push(1);
        rb.push(2);
        assert_eq!(rb.replace_last(9), Some(2));
        rb.push(3);
        assert_eq!(rb.push(4), Some(1));
        assert_eq!(rb.push(5), Some(9)); // replaced value
    }

    #[test]
    fn replace_last_on_empty_is_noop() {
        let mut rb = RingBuffer::new(2);
        assert_eq!(rb.replace_last(7), None);
        assert!(rb.is_empty());
    }

    #[test]
    fn capacity_one() {
        let mut rb = RingBuffer::new(1);
        assert_eq!(rb.push(1), None);
        assert!(rb.is_full());
        assert_eq!(rb.push(2), Some(1));
        assert_eq!(rb.replace_last(9), Some(2));
        assert_eq!(rb.push(3), Some(9));
    }

    #[test]
    fn indexing_follows_eviction() {
        let mut rb = RingBuffer::new(2);
        rb.push(1);
        rb.push(2);
        rb.push(3);
        assert_eq!(rb.get(0), Some(&2));
        assert_eq!(rb.get(1), Some(&3));
        assert_eq!(rb.get(2), None);
        assert_eq!(rb.last(), Some(&3));
    }

    #[test]
    fn range_yields_in_order() {
        let mut rb = RingBuffer::new(4);
        for v in 1..=6 {
            rb.push(v);
        }
        let window: Vec<_> = rb.range(1..=2).copied().collect();
        assert_eq!(window, [4, 5]);
    }

    mod refill {
        use super::*;

        #[test]
        fn keeps_newest_when_over_capacity() {
            let mut rb = RingBuffer::new(3);
            rb.push(100);
            assert_eq!(rb.refill(vec![1, 2, 3, 4, 5]), 2);
            assert_eq!(contents(&rb), [3, 4, 5]);
        }

        #[test]
        fn under_capacity_drops_nothing() {
            let mut rb = RingBuffer::new(3);
            assert_eq!(rb.refill(vec![1, 2]), 0);
            assert_eq!(contents(&rb), [1, 2]);
        }

        #[test]
        fn push_after_refill_evicts_oldest() {
            let mut rb = RingBuffer::new(2);
            rb.refill(vec![1, 2]);
            assert_eq!(rb.push(3), Some(1));
        }
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut rb = RingBuffer::<u32>::new(usize::MAX);
        assert_eq!(rb.push(1), None);
        assert_eq!(rb.push(2), None);
        assert!(!rb.is_full());
        assert_eq!(contents(&rb), [1, 2]);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_panics() {
        let _ = RingBuffer::<u32>::new(0);
    }
}
