pub mod utils;
pub mod events;
pub mod column;
pub mod row;
pub mod schema;
pub mod position;
pub mod stats;
pub mod state;
pub mod processor;

pub const NULL_TERMINATOR: u8 = 0;
