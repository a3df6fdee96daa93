#[cfg(test)]
mod test_rows {
    use binlog::column::column_value::ColumnValue;
    use binlog::events::event_type::LogEventType;
    use binlog::processor::event_processor::EventOutcome;
    use binlog::row::record_set::{EventKind, TypeEvent};
    use binlog::schema::catalog::ColumnRow;
    use binlog::state::ext_state::ExtState;
    use binlog::stats::CountingEventStat;
    use common::log::init_test_log;

    use crate::event_builder::{
        int_row, varchar2_row, EventBuilder, MYSQL_TYPE_DATETIME, MYSQL_TYPE_LONG, MYSQL_TYPE_VARCHAR,
    };
    use crate::fixture::{Fixture, ORDERS_ID};

    #[test]
    fn insert_is_delivered_at_its_row_event() {
        init_test_log();
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let begin = f.builder.query("shop", "BEGIN");
        assert_eq!(f.feed(&begin).unwrap(), EventOutcome::Processed);
        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();
        let rows = f
            .builder
            .rows(LogEventType::WRITE_ROWS_EVENT, ORDERS_ID, 1, &[int_row(12321)]);
        assert_eq!(f.feed(&rows).unwrap(), EventOutcome::Processed);

        let delivered = f.rows();
        assert_eq!(delivered.len(), 1);
        let rs = &delivered[0];
        assert_eq!(rs.type_event, TypeEvent::Write);
        assert_eq!(rs.db_name, "shop");
        assert_eq!(rs.tbl_name, "orders");
        assert_eq!(rs.master_id, 1);
        assert_eq!(rs.value("id"), Some(&ColumnValue::SignedInt(12321)));
        assert!(rs.old_row.is_empty());

        let xid = f.builder.xid(77);
        assert_eq!(f.feed(&xid).unwrap(), EventOutcome::Committed);
        assert_eq!(f.commits(), 1);
        assert_eq!(f.ext_state.get_state().table_counts["shop.orders"], 1);
        assert_eq!(CountingEventStat::get(&f.stats.rows_done), 1);
    }

    #[test]
    fn update_carries_both_images() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();
        let mut image = int_row(12321);
        image.extend_from_slice(&int_row(12322));
        let rows = f.builder.rows(LogEventType::UPDATE_ROWS_EVENT, ORDERS_ID, 1, &[image]);
        f.feed(&rows).unwrap();

        let rs = &f.rows()[0];
        assert_eq!(rs.type_event, TypeEvent::Update);
        assert_eq!(rs.old_value("id"), Some(&ColumnValue::SignedInt(12321)));
        assert_eq!(rs.value("id"), Some(&ColumnValue::SignedInt(12322)));
    }

    #[test]
    fn delete_image_lands_in_row() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();
        let rows = f.builder.rows(
            LogEventType::DELETE_ROWS_EVENT,
            ORDERS_ID,
            1,
            &[int_row(5), int_row(6)],
        );
        f.feed(&rows).unwrap();

        let delivered = f.rows();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].type_event, TypeEvent::Delete);
        assert_eq!(delivered[1].value("id"), Some(&ColumnValue::SignedInt(6)));
        assert!(delivered[1].old_row.is_empty());
    }

    #[test]
    fn alter_table_reloads_the_definition() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        f.catalog.set_columns(
            "shop",
            "orders",
            vec![ColumnRow::new("id", "varchar(64)", Some("utf8mb4_general_ci"))],
        );
        let alter = f.builder.query("shop", "ALTER TABLE orders MODIFY id varchar(64)");
        assert_eq!(f.feed(&alter).unwrap(), EventOutcome::Committed);

        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_VARCHAR]);
        f.feed(&map).unwrap();
        let rows = f
            .builder
            .rows(LogEventType::WRITE_ROWS_EVENT, ORDERS_ID, 1, &[varchar2_row("12321")]);
        f.feed(&rows).unwrap();

        let rs = &f.rows()[0];
        assert_eq!(rs.value("id"), Some(&ColumnValue::String(b"12321".to_vec())));
        assert_eq!(rs.row["id"].0, "varchar(64)");
    }

    #[test]
    fn ddl_on_another_database_is_ignored() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        f.catalog.set_columns("shop", "orders", vec![ColumnRow::new("id", "bigint(20)", None)]);
        let alter = f.builder.query("archive", "ALTER TABLE orders ADD COLUMN x int");
        f.feed(&alter).unwrap();

        let table = f.processor.relay_log_info().get_table("shop", "orders").unwrap();
        assert_eq!(table.fields[0].field_type, "int(11)");
    }

    #[test]
    fn schema_qualified_alter_reloads_without_a_session_database() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        f.catalog.set_columns("shop", "orders", vec![ColumnRow::new("id", "bigint(20)", None)]);
        let alter = f.builder.query("", "ALTER TABLE shop.orders MODIFY id bigint");
        assert_eq!(f.feed(&alter).unwrap(), EventOutcome::Committed);

        let table = f.processor.relay_log_info().get_table("shop", "orders").unwrap();
        assert_eq!(table.fields[0].field_type, "bigint(20)");

        // the qualifier wins over the session database
        f.catalog.set_columns("shop", "orders", vec![ColumnRow::new("id", "int(11)", None)]);
        let alter = f.builder.query("archive", "ALTER TABLE `shop`.`orders` MODIFY id int");
        f.feed(&alter).unwrap();
        let table = f.processor.relay_log_info().get_table("shop", "orders").unwrap();
        assert_eq!(table.fields[0].field_type, "int(11)");
    }

    #[test]
    fn failed_reload_leaves_the_ddl_uncommitted() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();
        let before = f.committed();

        f.catalog.set_columns("shop", "orders", vec![ColumnRow::new("id", "bigint(20)", None)]);
        f.catalog.set_offline(true);
        let alter = f.builder.query("shop", "ALTER TABLE orders MODIFY id bigint");
        let err = f.feed(&alter).unwrap_err();
        assert!(err.requires_reconnect());
        assert_eq!(f.committed(), before);
        assert_eq!(f.commits(), 0);

        // replayed from the committed position once the catalog is back
        f.catalog.set_offline(false);
        f.processor.reset_for_reconnect();
        assert_eq!(f.feed(&alter).unwrap(), EventOutcome::Committed);
        assert_eq!(f.commits(), 1);
        assert_ne!(f.committed(), before);
        let table = f.processor.relay_log_info().get_table("shop", "orders").unwrap();
        assert_eq!(table.fields[0].field_type, "bigint(20)");
    }

    #[test]
    fn filtered_kind_is_counted_not_delivered() {
        let mut f = Fixture::new(EventKind::INSERT);
        f.start();

        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();
        let rows = f.builder.rows(LogEventType::DELETE_ROWS_EVENT, ORDERS_ID, 1, &[int_row(1)]);
        assert_eq!(f.feed(&rows).unwrap(), EventOutcome::Processed);

        assert!(f.rows().is_empty());
        assert_eq!(CountingEventStat::get(&f.stats.modify_filtered), 1);
        assert_eq!(CountingEventStat::get(&f.stats.modify_ignored), 1);
    }

    #[test]
    fn rows_of_unmapped_table_are_skipped() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let map = f.builder.table_map(71, "shop", "users", &[MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();
        let rows = f.builder.rows(LogEventType::WRITE_ROWS_EVENT, 71, 1, &[int_row(1)]);
        f.feed(&rows).unwrap();
        let rows = f.builder.rows(LogEventType::WRITE_ROWS_EVENT, 99, 1, &[int_row(1)]);
        f.feed(&rows).unwrap();

        assert!(f.rows().is_empty());
        assert_eq!(CountingEventStat::get(&f.stats.modify_ignored), 2);
        assert_eq!(CountingEventStat::get(&f.stats.modify_filtered), 0);
    }

    #[test]
    fn width_mismatch_fails_only_the_event() {
        let mut f = Fixture::new(EventKind::ALL);
        f.start();

        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG, MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();
        let mut two = int_row(1);
        two.extend_from_slice(&2i32.to_le_bytes());
        let rows = f.builder.rows(LogEventType::WRITE_ROWS_EVENT, ORDERS_ID, 2, &[two]);
        let err = f.feed(&rows).unwrap_err();
        assert!(!err.requires_reconnect());
        assert!(!err.is_fatal());
        assert_eq!(CountingEventStat::get(&f.stats.modify_failed), 1);

        // the stream goes on
        let xid = f.builder.xid(1);
        assert_eq!(f.feed(&xid).unwrap(), EventOutcome::Committed);
    }

    #[test]
    fn old_temporal_type_in_table_map_switches_the_codec() {
        let mut f = Fixture::new(EventKind::ALL);
        f.catalog
            .set_columns("shop", "orders", vec![ColumnRow::new("created", "datetime", None)]);
        f.processor.create_database_structure().unwrap();
        f.start();

        // a table created before 5.6.4 keeps the 8 byte layout
        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_DATETIME]);
        f.feed(&map).unwrap();
        let mut row = vec![0u8];
        row.extend_from_slice(&20170615102030u64.to_le_bytes());
        let rows = f.builder.rows(LogEventType::WRITE_ROWS_EVENT, ORDERS_ID, 1, &[row]);
        f.feed(&rows).unwrap();

        assert_eq!(f.rows()[0].value("created"), Some(&ColumnValue::DateTime(20170615102030)));
    }

    #[test]
    fn mysql51_v1_rows_without_checksum() {
        let mut f = Fixture::with_builder(EventBuilder::mysql51(), 50173, EventKind::ALL);
        f.start();

        let map = f.builder.table_map(ORDERS_ID, "shop", "orders", &[MYSQL_TYPE_LONG]);
        f.feed(&map).unwrap();
        let rows = f
            .builder
            .rows(LogEventType::WRITE_ROWS_EVENT_V1, ORDERS_ID, 1, &[int_row(-3), int_row(4)]);
        f.feed(&rows).unwrap();

        let delivered = f.rows();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].value("id"), Some(&ColumnValue::SignedInt(-3)));
        assert_eq!(delivered[1].value("id"), Some(&ColumnValue::SignedInt(4)));
    }
}
