//! Queue source layer.
//!
//! Abstraction over the shared FIFO the worker drains votes from, with two
//! implementations:
//!
//! - [`RedisQueue`]: pops the right end of a Redis list that external
//!   producers push on the left, giving FIFO delivery
//! - [`MemoryQueue`]: process-local deque for tests and embedded use
//!
//! Both guarantee that a popped item is removed for exactly one consumer, so
//! multiple workers can drain the same queue without duplication.

mod memory;
mod redis;
mod traits;

pub use memory::MemoryQueue;
pub use redis::RedisQueue;
pub use traits::{QueueError, VoteSource};
