pub mod gtid_set;
pub mod position;
