//! Pure date arithmetic behind the calendar.
//!
//! # Responsibility
//! - Expand recurring task specs into concrete instances.
//! - Compute countdown targets, remaining days and urgency.
//! - Aggregate tasks and goals into displayable calendar events.
//!
//! # Invariants
//! - No I/O and no clock reads; callers pass `today` explicitly where a
//!   reference instant is needed.
//! - All bucketing and anchoring happens in UTC. Timezone presentation is
//!   the UI host's concern.
//!
//! # See also
//! - docs/architecture/schedule-math.md

pub mod calendar;
pub mod countdown;
pub mod expansion;
