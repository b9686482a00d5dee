//! FIFO event queue
//!
//! One queue per window or app object. The queue has no lock of its own:
//! it lives inside the owning object's state lock, which is what serializes
//! producers on the main thread and the refresh thread.

use std::collections::VecDeque;

/// Ordered event queue supporting both one-at-a-time polling and batch drains
#[derive(Debug)]
pub struct EventQueue<E> {
    events: VecDeque<E>,
}

impl<E> EventQueue<E> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Append an event at the tail
    pub fn enqueue(&mut self, event: E) {
        self.events.push_back(event);
    }

    /// Pop the oldest event, or `None` when empty
    pub fn dequeue(&mut self) -> Option<E> {
        self.events.pop_front()
    }

    /// Take every queued event in order, leaving fresh empty storage behind
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events).into()
    }

    /// Look at the oldest event without removing it
    pub fn peek(&self) -> Option<&E> {
        self.events.front()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every queued event
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_empty_dequeue_returns_none() {
        let mut queue: EventQueue<u8> = EventQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_no_dedup() {
        let mut queue = EventQueue::new();
        queue.enqueue("resize");
        queue.enqueue("resize");
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_drain_returns_batch_and_empties() {
        let mut queue = EventQueue::new();
        for i in 0..5 {
            queue.enqueue(i);
        }

        let batch = queue.drain();
        assert_eq!(batch, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());

        queue.enqueue(9);
        assert_eq!(queue.peek(), Some(&9));
        assert_eq!(queue.drain(), vec![9]);
    }

    #[test]
    fn test_mixed_dequeue_and_drain() {
        let mut queue = EventQueue::new();
        queue.enqueue('a');
        queue.enqueue('b');
        queue.enqueue('c');

        assert_eq!(queue.dequeue(), Some('a'));
        assert_eq!(queue.drain(), vec!['b', 'c']);
    }
}
