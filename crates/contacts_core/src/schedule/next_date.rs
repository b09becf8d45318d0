//! Next contact date rules.
//!
//! Rules are evaluated in order:
//! 1. Manual override keeps the record's `next_contact_date`.
//! 2. Already active: last contact date (or now) plus the frequency
//!    interval, rebased on now when that lands in the past.
//! 3. Newly activated: now plus the frequency interval.
//! 4. Inactive: no date.
//!
//! `Custom` and `None` frequencies have no interval, so rules 2 and 3 yield
//! no date for them.

use crate::model::contact::{Contact, ContactFrequency};
use crate::schedule::clock::Clock;
use log::debug;

/// Scheduler result for one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Epoch milliseconds, or `None` when nothing is scheduled.
    pub next_date: Option<i64>,
    pub active_status: bool,
}

/// Computes the next contact date for a (merged) contact.
///
/// `contact` must already carry the incoming changes. `active_status` is
/// returned unchanged; `ContactFrequency::None` does not deactivate.
pub fn set_next_contact_date(
    contact: &Contact,
    turned_active: bool,
    manual_date_change: bool,
    new_active_status: bool,
    clock: &impl Clock,
) -> ScheduleOutcome {
    let next_date = if manual_date_change {
        contact.next_contact_date
    } else if contact.active_status && !turned_active {
        let now = clock.now_ms();
        let base = contact.last_contact_date.unwrap_or(now);
        match offset_from(contact.contact_frequency, base) {
            Some(next) if next < now => offset_from(contact.contact_frequency, now),
            other => other,
        }
    } else if turned_active {
        offset_from(contact.contact_frequency, clock.now_ms())
    } else {
        None
    };

    debug!(
        "event=schedule_next module=schedule contact_id={} turned_active={} manual={} scheduled={}",
        contact.id,
        turned_active,
        manual_date_change,
        next_date.is_some()
    );

    ScheduleOutcome {
        next_date,
        active_status: new_active_status,
    }
}

/// `base` plus the frequency interval, if the frequency has one.
pub fn offset_from(frequency: ContactFrequency, base: i64) -> Option<i64> {
    frequency
        .interval_ms()
        .map(|interval| base.saturating_add(interval))
}

#[cfg(test)]
mod tests {
    use super::{offset_from, set_next_contact_date, ScheduleOutcome};
    use crate::model::contact::{Contact, ContactFrequency, ContactInput};
    use crate::schedule::clock::FixedClock;

    const DAY: i64 = 24 * 60 * 60 * 1000;
    const NOW: i64 = 1_760_000_000_000;

    fn contact(active: bool, frequency: ContactFrequency) -> Contact {
        let mut input = ContactInput::new("Grace Hopper");
        input.email = Some("grace@navy.mil".to_string());
        input.active_status = active;
        input.contact_frequency = Some(frequency);
        input.into_contact(7)
    }

    #[test]
    fn manual_change_keeps_existing_date_even_with_new_frequency() {
        let mut record = contact(true, ContactFrequency::Yearly);
        record.next_contact_date = Some(NOW + 3 * DAY);
        record.last_contact_date = Some(NOW - 400 * DAY);

        let outcome = set_next_contact_date(&record, false, true, true, &FixedClock(NOW));
        assert_eq!(outcome.next_date, Some(NOW + 3 * DAY));
        assert!(outcome.active_status);
    }

    #[test]
    fn active_contact_schedules_from_last_contact_date() {
        let mut record = contact(true, ContactFrequency::Monthly);
        record.last_contact_date = Some(NOW - 10 * DAY);

        let outcome = set_next_contact_date(&record, false, false, true, &FixedClock(NOW));
        assert_eq!(outcome.next_date, Some(NOW + 20 * DAY));
    }

    #[test]
    fn active_contact_rebases_on_now_when_result_is_past() {
        let mut record = contact(true, ContactFrequency::Monthly);
        record.last_contact_date = Some(NOW - 45 * DAY);

        let outcome = set_next_contact_date(&record, false, false, true, &FixedClock(NOW));
        assert_eq!(outcome.next_date, Some(NOW + 30 * DAY));
    }

    #[test]
    fn active_contact_without_last_date_uses_now() {
        let record = contact(true, ContactFrequency::Biweekly);

        let outcome = set_next_contact_date(&record, false, false, true, &FixedClock(NOW));
        assert_eq!(outcome.next_date, Some(NOW + 14 * DAY));
    }

    #[test]
    fn activation_schedules_from_now_ignoring_last_date() {
        let mut record = contact(true, ContactFrequency::Weekly);
        record.last_contact_date = Some(NOW - 2 * DAY);

        let outcome = set_next_contact_date(&record, true, false, true, &FixedClock(NOW));
        assert_eq!(outcome.next_date, Some(NOW + 7 * DAY));
    }

    #[test]
    fn inactive_contact_gets_no_date() {
        let mut record = contact(false, ContactFrequency::Weekly);
        record.next_contact_date = Some(NOW + DAY);

        let outcome = set_next_contact_date(&record, false, false, false, &FixedClock(NOW));
        assert_eq!(
            outcome,
            ScheduleOutcome {
                next_date: None,
                active_status: false,
            }
        );
    }

    #[test]
    fn custom_and_none_frequencies_never_compute_a_date() {
        for frequency in [ContactFrequency::Custom, ContactFrequency::None] {
            let record = contact(true, frequency);
            let active = set_next_contact_date(&record, false, false, true, &FixedClock(NOW));
            let activated = set_next_contact_date(&record, true, false, true, &FixedClock(NOW));
            assert_eq!(active.next_date, None);
            assert_eq!(activated.next_date, None);
        }
    }

    #[test]
    fn none_frequency_does_not_force_inactive() {
        let record = contact(true, ContactFrequency::None);
        let outcome = set_next_contact_date(&record, false, false, true, &FixedClock(NOW));
        assert!(outcome.active_status);
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let mut record = contact(true, ContactFrequency::Quarterly);
        record.last_contact_date = Some(NOW - 5 * DAY);
        let clock = FixedClock(NOW);

        let first = set_next_contact_date(&record, false, false, true, &clock);
        let second = set_next_contact_date(&record, false, false, true, &clock);
        assert_eq!(first, second);
        assert_eq!(first.next_date, offset_from(ContactFrequency::Quarterly, NOW - 5 * DAY));
    }
}
