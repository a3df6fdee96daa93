#[cfg(test)]
mod test_stream {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use binlog::column::column_value::ColumnValue;
    use binlog::events::event_type::LogEventType;
    use binlog::position::position::Position;
    use binlog::row::record_set::{EventKind, RecordSet};
    use binlog::state::ext_state::{DefaultExtState, ExtState};
    use binlog::state::position_store::MemoryPositionStore;
    use binlog::stats::CountingEventStat;
    use common::log::init_test_log;
    use connection::conn::connection_options::ConnectionOptions;
    use connection::slave::shutdown::ShutdownHandle;
    use connection::slave::slave::{Slave, SlaveOptions};

    use crate::event_builder::{int_row, EventBuilder, MYSQL_TYPE_LONG};
    use crate::fake_master::{dump_file, dump_position, FakeMaster, Session};
    use crate::fixture::{collector, orders_catalog, ORDERS_ID};

    struct Harness {
        slave: Slave,
        ext_state: Arc<DefaultExtState>,
        stats: Arc<CountingEventStat>,
        rows: Arc<Mutex<Vec<RecordSet>>>,
    }

    fn harness(port: u16, slave_options: SlaveOptions) -> Harness {
        let store = MemoryPositionStore::with_position(Position::new("mysql-bin.000001", 4));
        let ext_state = Arc::new(DefaultExtState::new(Box::new(store)));
        let stats = Arc::new(CountingEventStat::new());
        let rows = Arc::new(Mutex::new(Vec::new()));

        let mut slave = Slave::with_catalog(
            ConnectionOptions::new("127.0.0.1", port, "repl", ""),
            slave_options,
            Box::new(orders_catalog()),
            ext_state.clone(),
            stats.clone(),
        );
        slave.processor_mut().master_info_mut().set_master_version(50744);
        slave.set_callback("shop", "orders", collector(&rows), EventKind::ALL);
        slave.processor_mut().create_database_structure().unwrap();

        // a hung test fails instead of blocking the run
        let handle = slave.shutdown_handle();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(20));
            handle.cancel();
        });

        Harness {
            slave,
            ext_state,
            stats,
            rows,
        }
    }

    fn options() -> SlaveOptions {
        SlaveOptions {
            connect_retry: Duration::from_millis(10),
            report_host: Some(String::from("replica-1")),
            ..SlaveOptions::default()
        }
    }

    /// Rotate and format description, then one transaction inserting `id`.
    fn transaction(b: &mut EventBuilder, from: u64, id: i32) -> Vec<Vec<u8>> {
        vec![
            b.rotate("mysql-bin.000001", from),
            b.format_description(),
            b.query("shop", "BEGIN"),
            b.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]),
            b.rows(LogEventType::WRITE_ROWS_EVENT, ORDERS_ID, 1, &[int_row(id)]),
            b.xid(id as u64),
        ]
    }

    fn cancel_on_commit(handle: ShutdownHandle, nth: u32) -> Arc<dyn Fn(u32) + Send + Sync> {
        let commits = AtomicU32::new(0);
        Arc::new(move |_| {
            if commits.fetch_add(1, Ordering::SeqCst) + 1 == nth {
                handle.cancel();
            }
        })
    }

    fn ids(rows: &Arc<Mutex<Vec<RecordSet>>>) -> Vec<ColumnValue> {
        rows.lock()
            .unwrap()
            .iter()
            .filter_map(|rs| rs.value("id").cloned())
            .collect()
    }

    #[test]
    fn rows_flow_until_cancelled() {
        init_test_log();
        let master = FakeMaster::bind().unwrap();
        let port = master.port().unwrap();
        let mut b = EventBuilder::new();
        let events = transaction(&mut b, 4, 12321);
        let committed = b.pos as u64;
        let server = master.serve(vec![Session {
            events,
            close_after: false,
        }]);

        let mut h = harness(port, options());
        let handle = h.slave.shutdown_handle();
        h.slave.set_xid_callback(cancel_on_commit(handle, 1));
        h.slave.get_remote_binlog().unwrap();

        assert_eq!(ids(&h.rows), vec![ColumnValue::SignedInt(12321)]);
        assert_eq!(
            h.ext_state.load_master_position().unwrap(),
            Some(Position::new("mysql-bin.000001", committed))
        );
        assert_eq!(h.ext_state.get_connect_count(), 1);

        let dumps = server.join().unwrap();
        assert_eq!(dumps.len(), 1);
        assert_eq!(dump_position(&dumps[0]), 4);
        assert_eq!(dump_file(&dumps[0]), "mysql-bin.000001");
    }

    #[test]
    fn stop_position_ends_the_stream() {
        init_test_log();
        let master = FakeMaster::bind().unwrap();
        let port = master.port().unwrap();
        let mut b = EventBuilder::new();
        let mut events = transaction(&mut b, 4, 1);
        let stop = b.pos as u64;
        events.push(b.query("shop", "BEGIN"));
        events.push(b.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]));
        events.push(b.rows(LogEventType::WRITE_ROWS_EVENT, ORDERS_ID, 1, &[int_row(2)]));
        events.push(b.xid(2));
        let server = master.serve(vec![Session {
            events,
            close_after: false,
        }]);

        let mut h = harness(
            port,
            SlaveOptions {
                stop_position: Some(Position::new("mysql-bin.000001", stop)),
                ..options()
            },
        );
        h.slave.get_remote_binlog().unwrap();

        assert!(!h.slave.shutdown_handle().is_interrupted());
        assert_eq!(ids(&h.rows), vec![ColumnValue::SignedInt(1)]);
        assert_eq!(
            h.ext_state.load_master_position().unwrap(),
            Some(Position::new("mysql-bin.000001", stop))
        );
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn lost_connection_resumes_from_the_commit() {
        init_test_log();
        let master = FakeMaster::bind().unwrap();
        let port = master.port().unwrap();
        let mut b = EventBuilder::new();
        let first = transaction(&mut b, 4, 1);
        let committed = b.pos as u64;
        // half a transaction the replica must not keep
        let mut tail = first.clone();
        tail.push(b.query("shop", "BEGIN"));
        tail.push(b.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]));
        let second = transaction(&mut b, committed, 2);
        let server = master.serve(vec![
            Session {
                events: tail,
                close_after: true,
            },
            Session {
                events: second,
                close_after: false,
            },
        ]);

        let mut h = harness(port, options());
        let handle = h.slave.shutdown_handle();
        h.slave.set_xid_callback(cancel_on_commit(handle, 2));
        h.slave.get_remote_binlog().unwrap();

        assert_eq!(ids(&h.rows), vec![ColumnValue::SignedInt(1), ColumnValue::SignedInt(2)]);
        assert_eq!(h.ext_state.get_connect_count(), 2);
        assert_eq!(CountingEventStat::get(&h.stats.errors), 1);

        let dumps = server.join().unwrap();
        assert_eq!(dumps.len(), 2);
        assert_eq!(dump_position(&dumps[0]), 4);
        assert_eq!(dump_position(&dumps[1]), committed as u32);
    }

    #[test]
    fn cancel_unblocks_an_idle_stream() {
        init_test_log();
        let master = FakeMaster::bind().unwrap();
        let port = master.port().unwrap();
        let mut b = EventBuilder::new();
        let events = vec![b.rotate("mysql-bin.000001", 4), b.format_description()];
        let server = master.serve(vec![Session {
            events,
            close_after: false,
        }]);

        let mut h = harness(port, options());
        let handle = h.slave.shutdown_handle();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            handle.cancel();
        });
        h.slave.get_remote_binlog().unwrap();
        canceller.join().unwrap();

        assert!(ids(&h.rows).is_empty());
        assert_eq!(
            h.ext_state.load_master_position().unwrap(),
            Some(Position::new("mysql-bin.000001", 4))
        );
        assert_eq!(server.join().unwrap().len(), 1);
    }
}
