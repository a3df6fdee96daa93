use std::time::Instant;

use tracing::{debug, trace};

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::events::event_header::BasicEventInfo;
use crate::events::rows_event::RowEventInfo;
use crate::row::record_set::{EventKind, RecordSet, Row, TypeEvent};
use crate::schema::relay_log_info::RelayLogInfo;
use crate::schema::table::Table;
use crate::state::ext_state::ExtState;
use crate::stats::EventStat;
use crate::utils::{bit_is_set, n_set_bits};

/// Decodes one row image from the front of `buf` into `row`, returning the bytes consumed.
///
/// Layout: a NULL bitmap with one bit per column present in `cols`, then the values
/// of the present, non-NULL columns in table order. NULL columns get no entry.
pub fn unpack_row(table: &Table, row: &mut Row, width: usize, buf: &[u8], cols: &[u8]) -> CResult<usize> {
    trace!("Unpacking row: {}, {}, {}", table.fields.len(), width, cols.len());

    if width != table.fields.len() {
        return Err(ReError::SchemaMismatch(format!(
            "Field count mismatch in unpacking row for {}: {} != {}",
            table.full_name,
            width,
            table.fields.len()
        )));
    }
    if cols.len() < (width + 7) / 8 {
        return Err(ReError::CorruptEvent(format!(
            "column bitmap of {} bytes for {} columns",
            cols.len(),
            width
        )));
    }

    let null_bytes = (n_set_bits(cols, width) + 7) / 8;
    let null_bitmap = buf.get(..null_bytes).ok_or_else(|| {
        ReError::MalformedValue(format!(
            "{}: null bitmap needs {} bytes, {} left",
            table.full_name,
            null_bytes,
            buf.len()
        ))
    })?;

    let mut pos = null_bytes;
    let mut null_idx = 0;
    for (i, field) in table.fields.iter().enumerate() {
        if !bit_is_set(cols, i) {
            trace!("field {} is not in column list.", field.name);
            continue;
        }

        let is_null = bit_is_set(null_bitmap, null_idx);
        null_idx += 1;
        if is_null {
            trace!("field {} is null", field.name);
            continue;
        }

        let (value, used) = field.unpack(&buf[pos..])?;
        pos += used;
        row.insert(field.name.clone(), (field.field_type.clone(), value));
    }

    Ok(pos)
}

fn type_event_of(info: &BasicEventInfo) -> CResult<TypeEvent> {
    let t = info.event_type;
    if t.is_write_rows() {
        Ok(TypeEvent::Write)
    } else if t.is_update_rows() {
        Ok(TypeEvent::Update)
    } else if t.is_delete_rows() {
        Ok(TypeEvent::Delete)
    } else {
        Err(ReError::CorruptEvent(format!("{:?} is not a rows event", t)))
    }
}

/// Decodes one row (two images for UPDATE) and runs the table callback. Returns the bytes consumed.
fn apply_one_row(
    table: &Table,
    info: &BasicEventInfo,
    roi: &RowEventInfo,
    type_event: TypeEvent,
    buf: &[u8],
    ext_state: &dyn ExtState,
) -> CResult<usize> {
    let mut rs = RecordSet::new(
        type_event,
        &table.database_name,
        &table.table_name,
        info.when,
        info.server_id,
    );

    let used = match type_event {
        TypeEvent::Update => {
            let before = unpack_row(table, &mut rs.old_row, roi.width, buf, &roi.cols)?;
            let cols_ai = roi.cols_ai.as_deref().unwrap_or(&roi.cols);
            before + unpack_row(table, &mut rs.row, roi.width, &buf[before..], cols_ai)?
        }
        // DELETE's only image goes to `row` as well
        TypeEvent::Write | TypeEvent::Delete => unpack_row(table, &mut rs.row, roi.width, buf, &roi.cols)?,
    };

    table.call_callback(&rs, ext_state)?;
    Ok(used)
}

/// Delivers every row of a rows event to the table's callback.
///
/// Rows of unknown tables and of kinds outside the table filter are counted and skipped.
/// The first failing row abandons the rest of the event.
pub fn apply_row_event(
    rli: &RelayLogInfo,
    info: &BasicEventInfo,
    roi: &RowEventInfo,
    ext_state: &dyn ExtState,
    stats: &dyn EventStat,
) -> CResult<()> {
    let type_event = type_event_of(info)?;
    let kind: EventKind = type_event.kind();

    if let Some(table) = rli.get_table_by_id(roi.table_id) {
        debug!("applyRowEvent(): {} {}", roi.table_id, table.full_name);

        if table.should_process(kind) {
            let mut pos = 0;
            while pos < roi.rows.len() {
                let start = Instant::now();
                match apply_one_row(table, info, roi, type_event, &roi.rows[pos..], ext_state) {
                    Ok(0) => {
                        // a row without bytes would never advance
                        stats.tick_modify_event_failed(roi.table_id, kind);
                        return Err(ReError::CorruptEvent(format!(
                            "empty row image in rows event for {}",
                            table.full_name
                        )));
                    }
                    Ok(used) => pos += used,
                    Err(e) => {
                        stats.tick_modify_event_failed(roi.table_id, kind);
                        return Err(e);
                    }
                }
                stats.tick_modify_row_done(roi.table_id, kind, start.elapsed().as_nanos() as u64);
            }

            stats.tick_modify_event_done(roi.table_id, kind);
            return Ok(());
        }

        stats.tick_modify_event_filtered(roi.table_id, kind);
    }

    stats.tick_modify_event_ignored(roi.table_id, kind);
    Ok(())
}
