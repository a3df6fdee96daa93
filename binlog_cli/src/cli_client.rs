use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use binlog::row::record_set::{EventKind, RecordSet};
use binlog::schema::table::TableCallback;
use binlog::state::ext_state::{DefaultExtState, ExtState};
use binlog::state::position_store::{FilePositionStore, MemoryPositionStore, PositionStore};
use binlog::stats::CountingEventStat;
use common::config::BinlogConfig;
use common::err::CResult;
use connection::slave::slave::Slave;

use crate::cli_options::Format;
use crate::pretty_util::{to_duration_pretty, to_string_pretty};

/// Wires the configured tables to stdout and owns the shared state of one run.
pub struct CliClient {
    format: Format,
    binlog_config: BinlogConfig,
    ext_state: Arc<dyn ExtState>,
    stats: Arc<CountingEventStat>,
}

impl CliClient {
    pub fn new(format: Format, binlog_config: BinlogConfig) -> Self {
        let store: Box<dyn PositionStore> = match &binlog_config.position_file {
            Some(path) => Box::new(FilePositionStore::new(path)),
            None => Box::new(MemoryPositionStore::new()),
        };

        CliClient {
            format,
            binlog_config,
            ext_state: Arc::new(DefaultExtState::new(store)),
            stats: Arc::new(CountingEventStat::new()),
        }
    }

    /// A slave with one printing callback per configured table.
    pub fn build_slave(&self) -> CResult<Slave> {
        let mut slave = Slave::from_config(&self.binlog_config, self.ext_state.clone(), self.stats.clone())?;

        for table in &self.binlog_config.tables {
            let filter = EventKind::from_names(&table.events)?;
            slave.set_callback(&table.database, &table.table, self.printer(), filter);
        }
        Ok(slave)
    }

    fn printer(&self) -> TableCallback {
        let format = self.format;
        Arc::new(move |rs: &RecordSet| {
            println!("{}", to_string_pretty(&format, rs));
            Ok(())
        })
    }

    /// Runs `init` and the stream on the calling thread.
    pub fn run(&self, mut slave: Slave) -> CResult<()> {
        let start = Instant::now();
        slave.init()?;
        let rs = slave.get_remote_binlog();
        self.print_summary(&start);
        rs
    }

    fn print_summary(&self, start: &Instant) {
        let state = self.ext_state.get_state();
        info!(
            "read {} events ({} rows, {} errors) in {}, last position {}",
            CountingEventStat::get(&self.stats.events),
            CountingEventStat::get(&self.stats.rows_done),
            CountingEventStat::get(&self.stats.errors),
            to_duration_pretty(&start.elapsed()),
            state.position
        );
        for (table, count) in &state.table_counts {
            info!("{}: {} rows", table, count);
        }
    }
}
