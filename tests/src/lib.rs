pub mod event_builder;
pub mod fake_master;
pub mod fixture;

mod test_rows;
mod test_position;
mod test_stream;
