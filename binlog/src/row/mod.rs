pub mod record_set;
pub mod unpack;
