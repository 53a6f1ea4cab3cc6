//! The event store seam: everything the clock needs from persistence.

use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::event::{ClockEvent, NewClockEvent};
use chrono::{Local, NaiveDate};

pub trait EventStore {
    /// All events of `user_id` on `date` in append order (ascending id).
    /// Timestamps follow that order unless the wall clock stepped back.
    fn load_day(&mut self, user_id: i64, date: NaiveDate) -> AppResult<Vec<ClockEvent>>;

    /// Append one event. The store assigns id, timestamp and date.
    ///
    /// `expected_last` is the id of the last event the caller saw for the
    /// user's current day (`None` for an empty day). If the store's view
    /// differs, nothing is written and `AppError::Conflict` is returned.
    fn append(
        &mut self,
        event: &NewClockEvent,
        expected_last: Option<i64>,
    ) -> AppResult<ClockEvent>;

    /// The calendar day the store would assign to an event written now.
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

impl EventStore for DbPool {
    fn load_day(&mut self, user_id: i64, date: NaiveDate) -> AppResult<Vec<ClockEvent>> {
        queries::load_events_by_user_date(&self.conn, user_id, &date)
    }

    fn append(
        &mut self,
        event: &NewClockEvent,
        expected_last: Option<i64>,
    ) -> AppResult<ClockEvent> {
        let now = Local::now().naive_local();
        queries::append_event_checked(&mut self.conn, event, now, expected_last)
    }
}
