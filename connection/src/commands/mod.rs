pub mod command;

pub mod authenticate_command;
pub mod dump_binlog_command;
pub mod dump_binlog_gtid_command;
pub mod query_command;
pub mod quit_command;
pub mod register_slave_command;
pub mod ssl_request_command;
