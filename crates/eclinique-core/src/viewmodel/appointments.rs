//! Appointment list view model.

use std::sync::Arc;

use chrono::NaiveDateTime;

use super::clock::{Clock, SystemClock};
use super::filter::{visible, Filter, SortOrder};
use super::form::AppointmentForm;
use crate::api::Backend;
use crate::error::ClientResult;
use crate::models::{Appointment, Practitioner};
use crate::session::SessionStore;

/// State behind one appointment screen.
///
/// Each screen owns its own instance; only the [`SessionStore`] is shared.
/// Local state changes only after the backend has acknowledged a write.
pub struct AppointmentViewModel {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    items: Vec<Appointment>,
    filter: Filter,
    sort_order: SortOrder,
}

impl AppointmentViewModel {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionStore>) -> Self {
        Self::with_clock(backend, session, Arc::new(SystemClock))
    }

    pub fn with_clock(
        backend: Arc<dyn Backend>,
        session: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            session,
            clock,
            items: Vec::new(),
            filter: Filter::default(),
            sort_order: SortOrder::default(),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch the patient's appointments and replace the local list.
    pub fn load(&mut self) -> ClientResult<Vec<Appointment>> {
        let token = self.session.guard(self.session.require_token())?;
        let items = self
            .session
            .guard(self.backend.list_appointments(&token))?;
        tracing::info!(count = items.len(), "Appointments loaded");
        self.items = items.clone();
        Ok(items)
    }

    /// Pull-to-refresh; same as [`Self::load`].
    pub fn refresh(&mut self) -> ClientResult<Vec<Appointment>> {
        self.load()
    }

    /// Fetch one appointment, e.g. to pre-fill the edit form.
    pub fn get(&self, id: i64) -> ClientResult<Appointment> {
        let token = self.session.guard(self.session.require_token())?;
        self.session.guard(self.backend.get_appointment(&token, id))
    }

    /// Practitioners offered by the booking form.
    pub fn practitioners(&self) -> ClientResult<Vec<Practitioner>> {
        self.backend.list_practitioners()
    }

    // =========================================================================
    // View state
    // =========================================================================

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    pub fn toggle_sort_order(&mut self) -> SortOrder {
        self.sort_order = self.sort_order.toggled();
        self.sort_order
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Everything fetched, in fetch order.
    pub fn items(&self) -> &[Appointment] {
        &self.items
    }

    /// The list as displayed right now.
    pub fn visible_items(&self) -> Vec<Appointment> {
        self.visible_items_at(self.clock.now())
    }

    /// The list as displayed at `now`.
    pub fn visible_items_at(&self, now: NaiveDateTime) -> Vec<Appointment> {
        visible(&self.items, self.filter, self.sort_order, now)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Cancel (delete) an appointment.
    ///
    /// On failure the local list is left exactly as it was.
    pub fn cancel(&mut self, id: i64) -> ClientResult<()> {
        let token = self.session.guard(self.session.require_token())?;
        self.session
            .guard(self.backend.delete_appointment(&token, id))?;
        self.items.retain(|a| a.id != id);
        tracing::info!(appointment_id = id, "Appointment cancelled");
        Ok(())
    }

    /// Book a new appointment. Invalid forms never reach the backend.
    pub fn create(&mut self, form: &AppointmentForm) -> ClientResult<Appointment> {
        let payload = form.validate(self.clock.today())?;
        let token = self.session.guard(self.session.require_token())?;
        let created = self
            .session
            .guard(self.backend.create_appointment(&token, &payload))?;
        tracing::info!(appointment_id = created.id, "Appointment created");
        self.merge(created.clone());
        Ok(created)
    }

    /// Edit an existing appointment. Invalid forms never reach the backend.
    pub fn update(&mut self, id: i64, form: &AppointmentForm) -> ClientResult<Appointment> {
        let payload = form.validate(self.clock.today())?;
        let token = self.session.guard(self.session.require_token())?;
        let updated = self
            .session
            .guard(self.backend.update_appointment(&token, id, &payload))?;
        tracing::info!(appointment_id = updated.id, "Appointment updated");
        self.merge(updated.clone());
        Ok(updated)
    }

    /// Replace the record with the same id, or append it.
    fn merge(&mut self, appointment: Appointment) {
        match self.items.iter_mut().find(|a| a.id == appointment.id) {
            Some(existing) => *existing = appointment,
            None => self.items.push(appointment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockBackend, Operation};
    use crate::error::ClientError;
    use crate::models::AuthUser;
    use crate::session::SessionState;
    use crate::viewmodel::FixedClock;
    use chrono::{NaiveDate, NaiveTime};

    fn appt(id: i64, date: &str, time: &str) -> Appointment {
        Appointment {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").ok(),
            consultation_type: "Consultation".into(),
            reminder_enabled: false,
            status: None,
            practitioner_id: Some(1),
            practitioner: None,
            patient: None,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 7)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn setup(appointments: Vec<Appointment>) -> (Arc<MockBackend>, Arc<SessionStore>, AppointmentViewModel) {
        let backend = Arc::new(MockBackend::new().with_appointments(appointments));
        let session = Arc::new(SessionStore::in_memory());
        session.begin("mock-token", &AuthUser::default()).unwrap();
        let vm = AppointmentViewModel::with_clock(
            backend.clone(),
            session.clone(),
            Arc::new(FixedClock(now())),
        );
        (backend, session, vm)
    }

    fn form() -> AppointmentForm {
        AppointmentForm {
            date: "2025-01-20".into(),
            time: "10:00".into(),
            consultation_type: "Bilan".into(),
            reminder_enabled: true,
            practitioner_id: Some(1),
        }
    }

    fn ids(list: &[Appointment]) -> Vec<i64> {
        list.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_load_then_filter_by_clock() {
        let (_, _, mut vm) = setup(vec![
            appt(1, "2025-01-10", "09:00"),
            appt(2, "2025-01-05", "10:00"),
            appt(3, "2025-01-07", "12:00"),
        ]);
        vm.load().unwrap();

        assert_eq!(vm.filter(), Filter::Upcoming);
        assert_eq!(ids(&vm.visible_items()), vec![3, 1]);

        vm.set_filter(Filter::Past);
        assert_eq!(ids(&vm.visible_items()), vec![2]);

        vm.set_filter(Filter::All);
        vm.set_sort_order(SortOrder::Descending);
        assert_eq!(ids(&vm.visible_items()), vec![1, 3, 2]);
    }

    #[test]
    fn test_load_without_token_makes_no_call() {
        let (backend, session, mut vm) = setup(vec![]);
        session.end().unwrap();

        assert!(vm.load().unwrap_err().is_unauthorized());
        assert_eq!(backend.call_count(Operation::ListAppointments), 0);
    }

    #[test]
    fn test_unauthorized_list_clears_session() {
        let (backend, session, mut vm) = setup(vec![appt(1, "2025-01-10", "09:00")]);
        backend.revoke_token();

        assert!(vm.load().unwrap_err().is_unauthorized());
        assert_eq!(session.state().unwrap(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_failed_load_keeps_previous_items() {
        let (backend, _, mut vm) = setup(vec![appt(1, "2025-01-10", "09:00")]);
        vm.load().unwrap();

        backend.fail_next(Operation::ListAppointments, ClientError::Network("offline".into()));
        assert!(vm.refresh().is_err());
        assert_eq!(ids(vm.items()), vec![1]);
    }

    #[test]
    fn test_cancel_success_removes_one() {
        let (backend, _, mut vm) = setup(vec![
            appt(1, "2025-01-10", "09:00"),
            appt(2, "2025-01-11", "09:00"),
        ]);
        vm.load().unwrap();

        vm.cancel(1).unwrap();
        assert_eq!(ids(vm.items()), vec![2]);
        assert_eq!(ids(&backend.appointments()), vec![2]);
    }

    #[test]
    fn test_cancel_failure_leaves_list_untouched() {
        let (backend, _, mut vm) = setup(vec![
            appt(1, "2025-01-10", "09:00"),
            appt(2, "2025-01-11", "09:00"),
        ]);
        vm.load().unwrap();
        let before = vm.items().to_vec();

        backend.fail_next(
            Operation::DeleteAppointment,
            ClientError::Server {
                status: 500,
                message: "Deletion failed.".into(),
            },
        );
        assert!(vm.cancel(1).is_err());
        assert_eq!(vm.items(), before.as_slice());

        // Unknown id: backend answers 404, nothing removed
        assert!(vm.cancel(42).is_err());
        assert_eq!(vm.items(), before.as_slice());
    }

    #[test]
    fn test_create_with_empty_date_never_calls_backend() {
        let (backend, _, mut vm) = setup(vec![]);
        let form = AppointmentForm {
            date: String::new(),
            ..form()
        };

        let err = vm.create(&form).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref e) if e.get("date").is_some()));
        assert_eq!(backend.call_count(Operation::CreateAppointment), 0);
        assert!(vm.items().is_empty());
    }

    #[test]
    fn test_create_merges_returned_record() {
        let (_, _, mut vm) = setup(vec![appt(1, "2025-01-10", "09:00")]);
        vm.load().unwrap();

        let created = vm.create(&form()).unwrap();
        assert_eq!(created.id, 2);
        assert_eq!(ids(vm.items()), vec![1, 2]);
        assert_eq!(created.consultation_type, "Bilan");
    }

    #[test]
    fn test_update_replaces_in_place() {
        let (_, _, mut vm) = setup(vec![
            appt(1, "2025-01-10", "09:00"),
            appt(2, "2025-01-11", "09:00"),
        ]);
        vm.load().unwrap();

        let updated = vm.update(1, &form()).unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(ids(vm.items()), vec![1, 2]);
        assert_eq!(vm.items()[0].date, NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
    }

    #[test]
    fn test_update_backend_rejection_surfaces_message() {
        let (backend, _, mut vm) = setup(vec![appt(1, "2025-01-10", "09:00")]);
        vm.load().unwrap();

        backend.fail_next(
            Operation::UpdateAppointment,
            ClientError::Server {
                status: 409,
                message: "Slot already taken".into(),
            },
        );
        let err = vm.update(1, &form()).unwrap_err();
        assert_eq!(err.user_message(), "Slot already taken");
        assert_eq!(vm.items()[0].date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }

    #[test]
    fn test_get_and_practitioners() {
        let (backend, _, vm) = setup(vec![appt(5, "2025-01-10", "09:00")]);

        assert_eq!(vm.get(5).unwrap().id, 5);
        assert!(vm.practitioners().unwrap().is_empty());
        assert_eq!(backend.call_count(Operation::ListPractitioners), 1);
    }

    #[test]
    fn test_toggle_sort_order() {
        let (_, _, mut vm) = setup(vec![]);
        assert_eq!(vm.toggle_sort_order(), SortOrder::Descending);
        assert_eq!(vm.toggle_sort_order(), SortOrder::Ascending);
    }
}
