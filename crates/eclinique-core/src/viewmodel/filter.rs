//! Filtering and ordering of the appointment list.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Appointment;

/// Which appointments to show.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, uniffi::Enum)]
pub enum Filter {
    All,
    /// Scheduled at or after now
    #[default]
    Upcoming,
    /// Scheduled strictly before now
    Past,
}

impl Filter {
    pub fn keeps(&self, appointment: &Appointment, now: NaiveDateTime) -> bool {
        match self {
            Filter::All => true,
            Filter::Upcoming => appointment.scheduled_at() >= now,
            Filter::Past => appointment.scheduled_at() < now,
        }
    }
}

/// Chronological direction of the list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, uniffi::Enum)]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Filter `items`, then stable-sort them by scheduled time.
///
/// Appointments sharing a timestamp keep their fetch order in both directions.
pub fn visible(
    items: &[Appointment],
    filter: Filter,
    order: SortOrder,
    now: NaiveDateTime,
) -> Vec<Appointment> {
    let mut list: Vec<Appointment> = items
        .iter()
        .filter(|a| filter.keeps(a, now))
        .cloned()
        .collect();

    match order {
        SortOrder::Ascending => list.sort_by_key(Appointment::scheduled_at),
        SortOrder::Descending => list.sort_by(|a, b| b.scheduled_at().cmp(&a.scheduled_at())),
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn appt(id: i64, date: (i32, u32, u32), time: Option<(u32, u32)>) -> Appointment {
        Appointment {
            id,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: time.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            consultation_type: "Consultation".into(),
            reminder_enabled: false,
            status: None,
            practitioner_id: None,
            practitioner: None,
            patient: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn ids(list: &[Appointment]) -> Vec<i64> {
        list.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_scenario_two_appointments() {
        let a = appt(1, (2025, 1, 10), Some((9, 0)));
        let b = appt(2, (2025, 1, 5), Some((10, 0)));
        let items = vec![a, b];
        let now = at(2024, 12, 1, 8, 0);

        assert_eq!(ids(&visible(&items, Filter::All, SortOrder::Ascending, now)), vec![2, 1]);
        assert_eq!(ids(&visible(&items, Filter::All, SortOrder::Descending, now)), vec![1, 2]);
    }

    #[test]
    fn test_boundary_belongs_to_upcoming() {
        let items = vec![appt(1, (2025, 1, 7), Some((9, 0)))];
        let now = at(2025, 1, 7, 9, 0);

        assert_eq!(visible(&items, Filter::Upcoming, SortOrder::Ascending, now).len(), 1);
        assert!(visible(&items, Filter::Past, SortOrder::Ascending, now).is_empty());
    }

    #[test]
    fn test_missing_time_treated_as_midnight() {
        let items = vec![appt(1, (2025, 1, 7), None)];

        let just_after_midnight = at(2025, 1, 7, 0, 1);
        assert_eq!(ids(&visible(&items, Filter::Past, SortOrder::Ascending, just_after_midnight)), vec![1]);

        let midnight = at(2025, 1, 7, 0, 0);
        assert_eq!(ids(&visible(&items, Filter::Upcoming, SortOrder::Ascending, midnight)), vec![1]);
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let items = vec![
            appt(3, (2025, 2, 1), Some((10, 0))),
            appt(1, (2025, 2, 1), Some((10, 0))),
            appt(2, (2025, 1, 1), Some((9, 0))),
        ];
        let now = at(2020, 1, 1, 0, 0);

        assert_eq!(ids(&visible(&items, Filter::All, SortOrder::Ascending, now)), vec![2, 3, 1]);
        assert_eq!(ids(&visible(&items, Filter::All, SortOrder::Descending, now)), vec![3, 1, 2]);
    }

    #[test]
    fn test_toggle() {
        assert_eq!(SortOrder::Ascending.toggled(), SortOrder::Descending);
        assert_eq!(SortOrder::Descending.toggled(), SortOrder::Ascending);
        assert_eq!(Filter::default(), Filter::Upcoming);
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
    }
}
