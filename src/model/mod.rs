pub mod item;
pub mod queues;
pub mod supplier;
