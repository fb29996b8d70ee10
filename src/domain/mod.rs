//! Domain model: order records and order-change events.

pub mod events;
pub mod order;
