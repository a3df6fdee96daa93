#[cfg(test)]
mod test_position {
    use binlog::events::event_type::LogEventType;
    use binlog::position::position::Position;
    use binlog::processor::event_processor::EventOutcome;
    use binlog::row::record_set::EventKind;
    use binlog::state::ext_state::ExtState;
    use binlog::stats::CountingEventStat;
    use common::err::decode_error::ReError;

    use crate::event_builder::{int_row, MYSQL_TYPE_LONG};
    use crate::fixture::{Fixture, ORDERS_ID, SID};

    #[test]
    fn begin_opens_and_xid_commits() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let begin = f.builder.query("shop", "BEGIN");
        f.feed(&begin).unwrap();
        assert_eq!(f.commits(), 0);
        let in_transaction = f.builder.pos;
        assert_eq!(f.ext_state.get_intransaction_pos(), in_transaction as u64);
        assert_eq!(f.committed(), Some(Position::new("mysql-bin.000001", 4)));

        let xid = f.builder.xid(9);
        f.feed(&xid).unwrap();
        let end = f.builder.pos as u64;
        assert_eq!(f.commits(), 1);
        assert_eq!(f.committed(), Some(Position::new("mysql-bin.000001", end)));
        assert_eq!(f.processor.position().log_pos, end);
    }

    #[test]
    fn statement_without_begin_commits() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let ddl = f.builder.query("shop", "CREATE DATABASE audit");
        assert_eq!(f.feed(&ddl).unwrap(), EventOutcome::Committed);
        assert_eq!(f.commits(), 1);
        assert_eq!(CountingEventStat::get(&f.stats.queries), 1);
    }

    #[test]
    fn gtid_joins_the_set_at_commit() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let gtid = f.builder.gtid(SID, 5);
        f.feed(&gtid).unwrap();
        let begin = f.builder.query("shop", "BEGIN");
        f.feed(&begin).unwrap();
        assert!(!f.processor.position().gtid_executed.contains(SID, 5));

        let xid = f.builder.xid(1);
        f.feed(&xid).unwrap();
        let committed = f.committed().unwrap();
        assert!(committed.gtid_executed.contains(SID, 5));
        assert_eq!(committed.log_pos, f.builder.pos as u64);
        assert_eq!(committed.gtid_executed.to_string(), format!("{}:5", SID));
    }

    #[test]
    fn uncommitted_gtid_is_flushed_by_the_next_one() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let g1 = f.builder.gtid(SID, 1);
        f.feed(&g1).unwrap();
        let g2 = f.builder.gtid(SID, 2);
        f.feed(&g2).unwrap();
        assert!(f.processor.position().gtid_executed.contains(SID, 1));
        assert!(!f.processor.position().gtid_executed.contains(SID, 2));

        let xid = f.builder.xid(1);
        f.feed(&xid).unwrap();
        assert_eq!(f.committed().unwrap().gtid_executed.to_string(), format!("{}:1-2", SID));
    }

    #[test]
    fn reconnect_drops_the_staged_gtid_and_table_ids() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let gtid = f.builder.gtid(SID, 8);
        f.feed(&gtid).unwrap();
        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();

        f.processor.reset_for_reconnect();
        let xid = f.builder.xid(1);
        f.feed(&xid).unwrap();
        assert!(!f.committed().unwrap().gtid_executed.contains(SID, 8));

        let rows = f.builder.rows(LogEventType::WRITE_ROWS_EVENT, ORDERS_ID, 1, &[int_row(1)]);
        f.feed(&rows).unwrap();
        assert!(f.rows().is_empty());
        assert!(f.processor.relay_log_info().get_table("shop", "orders").is_some());
    }

    #[test]
    fn rotate_moves_to_the_next_file() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let rotate = f.builder.rotate("mysql-bin.000002", 4);
        f.feed(&rotate).unwrap();
        assert_eq!(f.processor.position(), &Position::new("mysql-bin.000002", 4));
        assert_eq!(f.committed(), Some(Position::new("mysql-bin.000002", 4)));
        assert_eq!(CountingEventStat::get(&f.stats.rotates), 2);
    }

    #[test]
    fn corrupted_event_needs_a_reconnect() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let mut xid = f.builder.xid(3);
        xid[20] ^= 0xFF;
        let err = f.feed(&xid).unwrap_err();
        assert!(matches!(err, ReError::ChecksumMismatch { .. }));
        assert!(err.requires_reconnect());
        assert_eq!(f.commits(), 0);
    }

    #[test]
    fn event_type_out_of_range_is_corrupt() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let mut ev = f.builder.xid(3);
        ev[4] = 43;
        let err = f.feed(&ev).unwrap_err();
        assert!(err.requires_reconnect());
    }

    #[test]
    fn ignored_events_are_skipped() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let hb = f.builder.artificial(LogEventType::HEARTBEAT_LOG_EVENT, b"mysql-bin.000001");
        assert_eq!(f.feed(&hb).unwrap(), EventOutcome::Skipped);
        let prev = f.builder.event(LogEventType::PREVIOUS_GTIDS_LOG_EVENT, &0u64.to_le_bytes());
        assert_eq!(f.feed(&prev).unwrap(), EventOutcome::Skipped);
        assert_eq!(CountingEventStat::get(&f.stats.others), 2);
    }

    #[test]
    fn bounded_replay_stops_at_the_commit_past_the_target() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let begin = f.builder.query("shop", "BEGIN");
        f.feed(&begin).unwrap();
        let xid = f.builder.xid(1);
        f.feed(&xid).unwrap();
        let first_commit = f.builder.pos as u64;

        let stop = Position::new("mysql-bin.000001", first_commit + 10);
        assert!(!f.processor.position().reached_other_pos(&stop));

        let begin = f.builder.query("shop", "BEGIN");
        f.feed(&begin).unwrap();
        let xid = f.builder.xid(2);
        f.feed(&xid).unwrap();
        assert!(f.processor.position().reached_other_pos(&stop));

        let later_file = Position::new("mysql-bin.000000", 999_999);
        assert!(f.processor.position().reached_other_pos(&later_file));
    }
}
