//! Worker identities, lifecycle states and published status.

mod id;
mod status;

pub use self::id::WorkerId;
pub use self::status::{State, Status, Summary};
