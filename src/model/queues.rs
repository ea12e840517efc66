// src/model/queues.rs

use std::collections::VecDeque;

/// An order accepted by a supplier and not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    /// Index of the ordering item in the warehouse.
    pub item: usize,
    pub quantity: f64,
    pub placed_day: u32,
    pub arrival_day: u32,
}

/// FIFO pipeline of in-flight orders for one supplier.
///
/// Orders leave the pipeline in placement order. Orders sharing an arrival
/// day resolve in insertion order.
#[derive(Debug, Clone, Default)]
pub struct OrderPipeline {
    buffer: VecDeque<PendingOrder>,
}

impl OrderPipeline {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
        }
    }

    /// Items enter the pipeline. Call this when an order is accepted.
    pub fn push_departure(&mut self, order: PendingOrder) {
        self.buffer.push_back(order);
    }

    /// Removes and returns every order due on or before `day`.
    ///
    /// Scans the whole queue so a later-placed order with a shorter lead time
    /// is not held back behind an earlier one.
    pub fn pop_arrivals(&mut self, day: u32) -> Vec<PendingOrder> {
        let mut due = Vec::new();
        let mut waiting = VecDeque::with_capacity(self.buffer.len());
        while let Some(order) = self.buffer.pop_front() {
            if order.arrival_day <= day {
                due.push(order);
            } else {
                waiting.push_back(order);
            }
        }
        self.buffer = waiting;
        due
    }

    /// Total quantity still in transit for one item.
    pub fn in_transit_for(&self, item: usize) -> f64 {
        self.buffer
            .iter()
            .filter(|order| order.item == item)
            .map(|order| order.quantity)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(item: usize, quantity: f64, placed_day: u32, arrival_day: u32) -> PendingOrder {
        PendingOrder {
            item,
            quantity,
            placed_day,
            arrival_day,
        }
    }

    #[test]
    fn arrivals_keep_insertion_order() {
        let mut pipeline = OrderPipeline::new();
        pipeline.push_departure(order(1, 10.0, 0, 3));
        pipeline.push_departure(order(0, 20.0, 1, 3));
        pipeline.push_departure(order(1, 30.0, 2, 5));

        assert!(pipeline.pop_arrivals(2).is_empty());
        let due = pipeline.pop_arrivals(3);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].quantity, 10.0);
        assert_eq!(due[1].quantity, 20.0);
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn in_transit_is_per_item() {
        let mut pipeline = OrderPipeline::new();
        pipeline.push_departure(order(0, 10.0, 0, 3));
        pipeline.push_departure(order(1, 5.0, 0, 3));
        pipeline.push_departure(order(0, 7.0, 1, 4));

        assert_eq!(pipeline.in_transit_for(0), 17.0);
        assert_eq!(pipeline.in_transit_for(1), 5.0);
        assert_eq!(pipeline.in_transit_for(2), 0.0);
    }
}
