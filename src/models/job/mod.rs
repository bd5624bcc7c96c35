//! Job payloads, and the shapes they're read back from queues in.

mod payload;
mod peek;

pub use self::payload::Payload;
pub use self::peek::Peek;
