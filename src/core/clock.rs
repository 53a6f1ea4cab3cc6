use crate::core::status::{ClockStatus, derive_status};
use crate::db::store::EventStore;
use crate::errors::AppResult;
use crate::models::action::ClockAction;
use crate::models::event::{ClockEvent, NewClockEvent};
use crate::models::role::Capability;
use crate::models::session::Session;

/// Result of a successful clock action.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub event: ClockEvent,
    pub status: ClockStatus,
}

/// High-level business logic for the `clock` and `status` commands.
pub struct ClockLogic;

impl ClockLogic {
    /// Status of the session user for the store's current day.
    pub fn current_status<S: EventStore>(store: &mut S, session: &Session) -> AppResult<ClockStatus> {
        session.require(Capability::TrackTime)?;
        let today = store.today();
        let events = store.load_day(session.user_id, today)?;
        Ok(derive_status(&events))
    }

    /// Validate `action` against today's status and append it.
    ///
    /// Nothing is written when the action is not available; the store
    /// additionally rejects the write if the day changed since it was read.
    pub fn record<S: EventStore>(
        store: &mut S,
        session: &Session,
        action: ClockAction,
        notes: Option<&str>,
    ) -> AppResult<Recorded> {
        session.require(Capability::TrackTime)?;
        let tenancy = session.tenancy()?;

        let today = store.today();
        let events = store.load_day(session.user_id, today)?;
        let status = derive_status(&events);

        status.state.apply(action)?;

        let new_event = NewClockEvent::new(session.user_id, tenancy, action, notes);
        let expected_last = events.last().map(|e| e.id);
        let event = store.append(&new_event, expected_last)?;

        let events = store.load_day(session.user_id, event.date)?;
        let status = derive_status(&events);

        Ok(Recorded { event, status })
    }
}
