//! In-memory backend for tests and offline demos.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{status_error, Backend};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Appointment, AppointmentPayload, AppointmentStatus, AuthResponse, AuthUser, Credentials,
    Practitioner, PractitionerRef, ProfileUpdate, ProfileUpdateReply, Registration, UserProfile,
};

/// Backend operations, for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Register,
    ListAppointments,
    GetAppointment,
    CreateAppointment,
    UpdateAppointment,
    DeleteAppointment,
    ListPractitioners,
    GetProfile,
    UpdateProfile,
}

/// One call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: Operation,
    pub token: Option<String>,
    pub appointment_id: Option<i64>,
}

struct Account {
    email: String,
    password: String,
    user: AuthUser,
}

#[derive(Default)]
struct MockState {
    token: String,
    token_revoked: bool,
    accounts: Vec<Account>,
    appointments: Vec<Appointment>,
    practitioners: Vec<Practitioner>,
    profile: UserProfile,
    failures: HashMap<Operation, VecDeque<ClientError>>,
    calls: Vec<RecordedCall>,
}

impl MockState {
    fn record(&mut self, operation: Operation, token: Option<&str>, appointment_id: Option<i64>) {
        self.calls.push(RecordedCall {
            operation,
            token: token.map(str::to_string),
            appointment_id,
        });
    }

    fn injected(&mut self, operation: Operation) -> ClientResult<()> {
        match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn authorize(&self, token: &str) -> ClientResult<()> {
        if self.token_revoked || token != self.token {
            return Err(status_error(401, "Invalid or expired token.".into()));
        }
        Ok(())
    }

    fn position(&self, id: i64) -> ClientResult<usize> {
        self.appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| status_error(404, "Appointment not found.".into()))
    }

    fn build(&self, id: i64, payload: &AppointmentPayload) -> Appointment {
        let practitioner = self
            .practitioners
            .iter()
            .find(|p| p.id == payload.practitioner_id)
            .map(|p| PractitionerRef {
                id: Some(p.id),
                user: p.user.clone(),
                specialty: Some(p.specialty.clone()),
            });
        Appointment {
            id,
            date: payload.date,
            time: Some(payload.time.to_time()),
            consultation_type: payload.consultation_type.label().to_string(),
            reminder_enabled: payload.reminder_enabled,
            status: Some(AppointmentStatus::Pending),
            practitioner_id: Some(payload.practitioner_id),
            practitioner,
            patient: None,
        }
    }

    fn session(&self, user: &AuthUser) -> AuthResponse {
        AuthResponse {
            token: Some(self.token.clone()),
            user: Some(user.clone()),
            message: None,
        }
    }
}

/// Fake eClinique backend that behaves like the real one for a single patient.
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                token: "mock-token".to_string(),
                ..Default::default()
            }),
        }
    }

    /// Token handed out on login/sign-up and accepted on authenticated calls.
    pub fn with_token(self, token: &str) -> Self {
        self.edit(|s| s.token = token.to_string())
    }

    pub fn with_account(self, email: &str, password: &str, user: AuthUser) -> Self {
        self.edit(|s| {
            s.accounts.push(Account {
                email: email.to_string(),
                password: password.to_string(),
                user,
            })
        })
    }

    pub fn with_appointments(self, appointments: Vec<Appointment>) -> Self {
        self.edit(|s| s.appointments = appointments)
    }

    pub fn with_practitioners(self, practitioners: Vec<Practitioner>) -> Self {
        self.edit(|s| s.practitioners = practitioners)
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        self.edit(|s| s.profile = profile)
    }

    fn edit(self, f: impl FnOnce(&mut MockState)) -> Self {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
        self
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: ClientError) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.entry(operation).or_default().push_back(error);
        }
    }

    /// Reject the current token from now on.
    pub fn revoke_token(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.token_revoked = true;
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Server-side appointment list.
    pub fn appointments(&self) -> Vec<Appointment> {
        self.state
            .lock()
            .map(|s| s.appointments.clone())
            .unwrap_or_default()
    }

    pub fn profile(&self) -> UserProfile {
        self.state
            .lock()
            .map(|s| s.profile.clone())
            .unwrap_or_default()
    }
}

impl Backend for MockBackend {
    fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let mut state = self.state.lock()?;
        state.record(Operation::Login, None, None);
        state.injected(Operation::Login)?;

        let account = state
            .accounts
            .iter()
            .find(|a| a.email == credentials.email && a.password == credentials.password)
            .ok_or_else(|| status_error(401, "Invalid email or password.".into()))?;
        Ok(state.session(&account.user))
    }

    fn register(&self, registration: &Registration) -> ClientResult<AuthResponse> {
        let mut state = self.state.lock()?;
        state.record(Operation::Register, None, None);
        state.injected(Operation::Register)?;

        if state.accounts.iter().any(|a| a.email == registration.email) {
            return Err(status_error(409, "Email already in use.".into()));
        }
        let user = AuthUser {
            id: Some(state.accounts.len() as i64 + 1),
            last_name: Some(registration.last_name.clone()),
            first_name: Some(registration.first_name.clone()),
            email: Some(registration.email.clone()),
            role: Some("patient".to_string()),
            phone: Some(registration.phone.clone()),
            address: Some(registration.address.clone()),
            birth_date: Some(registration.birth_date.clone()),
        };
        state.accounts.push(Account {
            email: registration.email.clone(),
            password: registration.password.clone(),
            user: user.clone(),
        });
        Ok(state.session(&user))
    }

    fn list_appointments(&self, token: &str) -> ClientResult<Vec<Appointment>> {
        let mut state = self.state.lock()?;
        state.record(Operation::ListAppointments, Some(token), None);
        state.injected(Operation::ListAppointments)?;
        state.authorize(token)?;
        Ok(state.appointments.clone())
    }

    fn get_appointment(&self, token: &str, id: i64) -> ClientResult<Appointment> {
        let mut state = self.state.lock()?;
        state.record(Operation::GetAppointment, Some(token), Some(id));
        state.injected(Operation::GetAppointment)?;
        state.authorize(token)?;
        let index = state.position(id)?;
        Ok(state.appointments[index].clone())
    }

    fn create_appointment(
        &self,
        token: &str,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment> {
        let mut state = self.state.lock()?;
        state.record(Operation::CreateAppointment, Some(token), None);
        state.injected(Operation::CreateAppointment)?;
        state.authorize(token)?;

        let id = state.appointments.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let created = state.build(id, payload);
        state.appointments.push(created.clone());
        Ok(created)
    }

    fn update_appointment(
        &self,
        token: &str,
        id: i64,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment> {
        let mut state = self.state.lock()?;
        state.record(Operation::UpdateAppointment, Some(token), Some(id));
        state.injected(Operation::UpdateAppointment)?;
        state.authorize(token)?;

        let index = state.position(id)?;
        let updated = state.build(id, payload);
        state.appointments[index] = updated.clone();
        Ok(updated)
    }

    fn delete_appointment(&self, token: &str, id: i64) -> ClientResult<()> {
        let mut state = self.state.lock()?;
        state.record(Operation::DeleteAppointment, Some(token), Some(id));
        state.injected(Operation::DeleteAppointment)?;
        state.authorize(token)?;

        let index = state.position(id)?;
        state.appointments.remove(index);
        Ok(())
    }

    fn list_practitioners(&self) -> ClientResult<Vec<Practitioner>> {
        let mut state = self.state.lock()?;
        state.record(Operation::ListPractitioners, None, None);
        state.injected(Operation::ListPractitioners)?;
        Ok(state.practitioners.clone())
    }

    fn get_profile(&self, token: &str) -> ClientResult<UserProfile> {
        let mut state = self.state.lock()?;
        state.record(Operation::GetProfile, Some(token), None);
        state.injected(Operation::GetProfile)?;
        state.authorize(token)?;
        Ok(state.profile.clone())
    }

    fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> ClientResult<ProfileUpdateReply> {
        let mut state = self.state.lock()?;
        state.record(Operation::UpdateProfile, Some(token), None);
        state.injected(Operation::UpdateProfile)?;
        state.authorize(token)?;

        let password_changed = update.changes_password();
        if password_changed {
            let email = state.profile.email.clone();
            let current = update.current_password.clone().unwrap_or_default();
            let new_password = update.new_password.clone().unwrap_or_default();
            let account = state
                .accounts
                .iter_mut()
                .find(|a| a.email == email && a.password == current)
                .ok_or_else(|| status_error(400, "Current password is incorrect.".into()))?;
            account.password = new_password;
        }

        state.profile = update.profile.clone();
        Ok(ProfileUpdateReply {
            password_changed,
            profile: state.profile.clone(),
        })
    }
}
