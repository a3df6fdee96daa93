pub mod ext_state;
pub mod position_store;
