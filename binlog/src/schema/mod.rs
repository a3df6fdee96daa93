pub mod catalog;
pub mod ddl;
pub mod relay_log_info;
pub mod table;
