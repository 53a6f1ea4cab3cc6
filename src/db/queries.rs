use crate::errors::{AppError, AppResult};
use crate::models::action::ClockAction;
use crate::models::event::{ClockEvent, NewClockEvent, TIMESTAMP_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

pub fn map_row(row: &Row) -> rusqlite::Result<ClockEvent> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(0, AppError::InvalidDate(date_str.clone())))?;

    let ts_str: String = row.get("timestamp")?;
    let timestamp = NaiveDateTime::parse_from_str(&ts_str, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| conversion_error(0, AppError::InvalidDate(ts_str.clone())))?;

    let action_str: String = row.get("action")?;
    let action = ClockAction::from_db_str(&action_str)
        .ok_or_else(|| conversion_error(0, AppError::InvalidEventKind(action_str.clone())))?;

    let depts_str: String = row.get("department_ids")?;
    let department_ids: Vec<i64> = serde_json::from_str(&depts_str)
        .map_err(|e| conversion_error(0, AppError::Json(e)))?;

    Ok(ClockEvent {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        company_id: row.get("company_id")?,
        department_ids,
        action,
        timestamp,
        date,
        notes: row.get("notes")?,
        source: row.get("source")?,
    })
}

/// Surface the typed cause hidden inside a row conversion failure,
/// so an unknown action kind reaches the user as `InvalidEventKind`.
fn unwrap_conversion(err: rusqlite::Error) -> AppError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
            match inner.downcast::<AppError>() {
                Ok(app) => *app,
                Err(other) => AppError::Other(other.to_string()),
            }
        }
        other => AppError::StoreUnavailable(other),
    }
}

pub fn load_events_by_user_date(
    conn: &Connection,
    user_id: i64,
    date: &NaiveDate,
) -> AppResult<Vec<ClockEvent>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM clock_events
         WHERE user_id = ?1 AND date = ?2
         ORDER BY id ASC",
    )?;

    let date_str = date.format("%Y-%m-%d").to_string();
    let rows = stmt.query_map(params![user_id, date_str], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(unwrap_conversion)?);
    }
    Ok(out)
}

/// Distinct days with at least one event for the user, within `[from, to]`.
pub fn load_event_dates(
    conn: &Connection,
    user_id: i64,
    from: &NaiveDate,
    to: &NaiveDate,
) -> AppResult<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT date FROM clock_events
         WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
         ORDER BY date ASC",
    )?;

    let rows = stmt.query_map(
        params![user_id, from.to_string(), to.to_string()],
        |row| row.get::<_, String>(0),
    )?;

    let mut out = Vec::new();
    for r in rows {
        let d = r?;
        let date =
            NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(d))?;
        out.push(date);
    }
    Ok(out)
}

fn last_event_id(conn: &Connection, user_id: i64, date_str: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM clock_events
         WHERE user_id = ?1 AND date = ?2
         ORDER BY id DESC
         LIMIT 1",
        params![user_id, date_str],
        |row| row.get(0),
    )
    .optional()
}

/// Insert one event stamped with `now`, provided the user's last event of
/// that day is still `expected_last`. Check and insert share one
/// IMMEDIATE transaction, so two writers cannot both pass the check.
pub fn append_event_checked(
    conn: &mut Connection,
    ev: &NewClockEvent,
    now: NaiveDateTime,
    expected_last: Option<i64>,
) -> AppResult<ClockEvent> {
    let date = now.date();
    let date_str = date.format("%Y-%m-%d").to_string();
    let ts_str = now.format(TIMESTAMP_FORMAT).to_string();
    let depts = serde_json::to_string(&ev.department_ids)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let actual_last = last_event_id(&tx, ev.user_id, &date_str)?;
    if actual_last != expected_last {
        // dropping `tx` rolls back
        return Err(AppError::Conflict(format!(
            "the clock for {} changed since it was read; reload the status and try again",
            date_str
        )));
    }

    tx.execute(
        "INSERT INTO clock_events
            (user_id, company_id, department_ids, action, timestamp, date, notes, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            ev.user_id,
            ev.company_id,
            depts,
            ev.action.to_db_str(),
            ts_str,
            date_str,
            ev.notes,
            ev.source,
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(ClockEvent {
        id,
        user_id: ev.user_id,
        company_id: ev.company_id,
        department_ids: ev.department_ids.clone(),
        action: ev.action,
        // round-trip through the stored text so the value equals what a reload returns
        timestamp: NaiveDateTime::parse_from_str(&ts_str, "%Y-%m-%dT%H:%M:%S%.f")
            .unwrap_or(now),
        date,
        notes: ev.notes.clone(),
        source: ev.source.clone(),
    })
}
