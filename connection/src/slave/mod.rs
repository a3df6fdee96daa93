pub mod shutdown;
pub mod slave;
