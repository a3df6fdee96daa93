pub mod event_processor;
pub mod master_info;
