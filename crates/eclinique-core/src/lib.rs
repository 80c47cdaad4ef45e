//! eClinique Core Library
//!
//! Client-side core of the eClinique patient app: session state, appointment
//! list logic and the typed backend contract. Mobile shells call it through
//! UniFFI; all business authority stays with the remote backend.
//!
//! # Architecture
//!
//! ```text
//!   UI event
//!      │
//!      ▼
//! ┌──────────────────────┐      ┌───────────────────────┐
//! │ AppointmentViewModel │      │    AccountService     │
//! │  filter / sort       │      │  login / register     │
//! │  create / update     │      │  profile / logout     │
//! │  cancel              │      │                       │
//! └──────────┬───────────┘      └───────────┬───────────┘
//!            │      one request per action  │
//!            ▼                              ▼
//!      ┌─────────────────────────────────────────┐
//!      │   Backend (HttpBackend │ MockBackend)   │──▶ REST API
//!      └─────────────────────────────────────────┘
//!            │ on success / on 401
//!            ▼
//!      ┌─────────────────────────────────────────┐
//!      │ SessionStore (SQLite or in-memory)      │
//!      └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: appointment list filtering, sorting and mutations
//! - [`session`]: session/profile store and its state machine
//! - [`account`]: login, sign-up, profile operations
//! - [`api`]: backend trait, HTTP client, in-memory mock
//! - [`models`]: wire and domain types
//! - [`db`]: SQLite persistence for the session store
//! - [`config`], [`logging`], [`error`]: ambient plumbing

pub mod account;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod viewmodel;

// Re-export commonly used types
pub use account::AccountService;
pub use api::{Backend, HttpBackend, MockBackend};
pub use config::{ClientConfig, ConfigError};
pub use db::Database;
pub use error::{ClientError, ClientResult, ValidationErrors};
pub use models::{
    Appointment, AppointmentPayload, AppointmentStatus, AuthUser, ConsultationType, Credentials,
    Practitioner, ProfileUpdate, Registration, Role, TimeSlot, UserProfile,
};
pub use session::{KeyValueStore, MemoryStore, SessionField, SessionState, SessionStore};
pub use viewmodel::{
    AppointmentForm, AppointmentViewModel, Clock, Filter, FixedClock, SortOrder, SystemClock,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ECliniqueError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<ClientError> for ECliniqueError {
    fn from(e: ClientError) -> Self {
        let message = e.user_message();
        match e {
            ClientError::Validation(_) => ECliniqueError::ValidationError(message),
            ClientError::Unauthorized(_) => ECliniqueError::Unauthorized(message),
            ClientError::Network(_) => ECliniqueError::NetworkFailure(message),
            ClientError::Server { .. } => ECliniqueError::ServerError(message),
            ClientError::Storage(_) => ECliniqueError::StorageFailure(message),
        }
    }
}

impl From<ConfigError> for ECliniqueError {
    fn from(e: ConfigError) -> Self {
        ECliniqueError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ECliniqueError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ECliniqueError::StorageFailure(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the log subscriber. Safe to call more than once.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    logging::init_logging(filter.as_deref().unwrap_or(config::DEFAULT_LOG_FILTER))
}

/// Open a client against the backend at `config.api_base_url`.
#[uniffi::export]
pub fn open_client(config: FfiClientConfig) -> Result<Arc<ECliniqueCore>, ECliniqueError> {
    let config = ClientConfig::from(config);
    config.validate()?;
    Ok(Arc::new(ECliniqueCore::from_config(&config)?))
}

/// Open a client configured from `ECLINIQUE_*` environment variables.
///
/// Also installs logging with the configured filter.
#[uniffi::export]
pub fn open_client_from_env() -> Result<Arc<ECliniqueCore>, ECliniqueError> {
    let config = ClientConfig::from_env()?;
    logging::init_logging(&config.log_filter);
    Ok(Arc::new(ECliniqueCore::from_config(&config)?))
}

/// Bookable time slots, in display order.
#[uniffi::export]
pub fn time_slots() -> Vec<String> {
    TimeSlot::ALL.iter().map(|s| s.as_str().to_string()).collect()
}

/// Reasons for visit, in display order.
#[uniffi::export]
pub fn consultation_types() -> Vec<String> {
    ConsultationType::ALL
        .iter()
        .map(|t| t.label().to_string())
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Entry point held by the mobile shell for the lifetime of the app.
#[derive(uniffi::Object)]
pub struct ECliniqueCore {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    account: AccountService,
}

impl ECliniqueCore {
    /// Assemble a client from explicit parts (tests, alternate backends).
    pub fn with_parts(
        backend: Arc<dyn Backend>,
        session: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let account = AccountService::new(backend.clone(), session.clone());
        Self {
            backend,
            session,
            clock,
            account,
        }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let session = match &config.database_path {
            Some(path) => SessionStore::open(path)?,
            None => SessionStore::in_memory(),
        };
        let backend = HttpBackend::new(config)?;
        tracing::info!(
            base_url = backend.base_url(),
            persistent = config.database_path.is_some(),
            "{} core v{} ready",
            config::APP_NAME,
            config::APP_VERSION
        );
        Ok(Self::with_parts(
            Arc::new(backend),
            Arc::new(session),
            Arc::new(SystemClock),
        ))
    }
}

#[uniffi::export]
impl ECliniqueCore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    pub fn login(&self, email: String, password: String) -> Result<FfiSessionUser, ECliniqueError> {
        let user = self.account.login(&Credentials::new(email, password))?;
        Ok(user.into())
    }

    pub fn register(&self, registration: FfiRegistration) -> Result<FfiSessionUser, ECliniqueError> {
        let user = self.account.register(&registration.into())?;
        Ok(user.into())
    }

    pub fn logout(&self) -> Result<(), ECliniqueError> {
        Ok(self.account.logout()?)
    }

    pub fn session_state(&self) -> Result<FfiSessionState, ECliniqueError> {
        Ok(self.session.state()?.into())
    }

    /// Read one session field by storage key (`token`, `role`, `email`, ...).
    pub fn session_field(&self, name: String) -> Result<Option<String>, ECliniqueError> {
        let field = SessionField::parse(&name).ok_or_else(|| {
            ECliniqueError::ValidationError(format!("Unknown session field: {}", name))
        })?;
        Ok(self.session.get_field(field)?)
    }

    // =========================================================================
    // Profile Operations
    // =========================================================================

    /// Locally mirrored profile, no network.
    pub fn cached_profile(&self) -> Result<FfiUserProfile, ECliniqueError> {
        Ok(self.account.cached_profile()?.into())
    }

    pub fn fetch_profile(&self) -> Result<FfiUserProfile, ECliniqueError> {
        Ok(self.account.profile()?.into())
    }

    pub fn update_profile(
        &self,
        update: FfiProfileUpdate,
    ) -> Result<FfiProfileUpdateResult, ECliniqueError> {
        let reply = self.account.update_profile(&update.into())?;
        Ok(FfiProfileUpdateResult {
            profile: reply.profile.into(),
            password_changed: reply.password_changed,
        })
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    pub fn list_practitioners(&self) -> Result<Vec<FfiPractitioner>, ECliniqueError> {
        let practitioners = self.backend.list_practitioners()?;
        Ok(practitioners.into_iter().map(|p| p.into()).collect())
    }

    /// State for a newly displayed appointment screen.
    pub fn appointment_screen(&self) -> Arc<AppointmentScreen> {
        Arc::new(AppointmentScreen {
            vm: Mutex::new(AppointmentViewModel::with_clock(
                self.backend.clone(),
                self.session.clone(),
                self.clock.clone(),
            )),
        })
    }
}

/// One appointment screen's view model.
#[derive(uniffi::Object)]
pub struct AppointmentScreen {
    vm: Mutex<AppointmentViewModel>,
}

#[uniffi::export]
impl AppointmentScreen {
    pub fn load(&self) -> Result<Vec<FfiAppointment>, ECliniqueError> {
        let mut vm = self.vm.lock()?;
        let items = vm.load()?;
        Ok(items.into_iter().map(|a| a.into()).collect())
    }

    pub fn refresh(&self) -> Result<Vec<FfiAppointment>, ECliniqueError> {
        let mut vm = self.vm.lock()?;
        let items = vm.refresh()?;
        Ok(items.into_iter().map(|a| a.into()).collect())
    }

    pub fn set_filter(&self, filter: Filter) -> Result<(), ECliniqueError> {
        self.vm.lock()?.set_filter(filter);
        Ok(())
    }

    pub fn set_sort_order(&self, order: SortOrder) -> Result<(), ECliniqueError> {
        self.vm.lock()?.set_sort_order(order);
        Ok(())
    }

    pub fn toggle_sort_order(&self) -> Result<SortOrder, ECliniqueError> {
        Ok(self.vm.lock()?.toggle_sort_order())
    }

    pub fn visible_items(&self) -> Result<Vec<FfiAppointment>, ECliniqueError> {
        let vm = self.vm.lock()?;
        Ok(vm.visible_items().into_iter().map(|a| a.into()).collect())
    }

    pub fn get(&self, id: i64) -> Result<FfiAppointment, ECliniqueError> {
        Ok(self.vm.lock()?.get(id)?.into())
    }

    /// Edit form pre-filled from the backend's current record.
    pub fn edit_form(&self, id: i64) -> Result<FfiAppointmentForm, ECliniqueError> {
        let appointment = self.vm.lock()?.get(id)?;
        Ok(AppointmentForm::from_appointment(&appointment).into())
    }

    pub fn cancel(&self, id: i64) -> Result<(), ECliniqueError> {
        Ok(self.vm.lock()?.cancel(id)?)
    }

    pub fn create(&self, form: FfiAppointmentForm) -> Result<FfiAppointment, ECliniqueError> {
        let created = self.vm.lock()?.create(&form.into())?;
        Ok(created.into())
    }

    pub fn update(&self, id: i64, form: FfiAppointmentForm) -> Result<FfiAppointment, ECliniqueError> {
        let updated = self.vm.lock()?.update(id, &form.into())?;
        Ok(updated.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe client configuration.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClientConfig {
    pub api_base_url: String,
    pub timeout_secs: Option<u64>,
    pub database_path: Option<String>,
}

impl From<FfiClientConfig> for ClientConfig {
    fn from(config: FfiClientConfig) -> Self {
        let mut out = ClientConfig::new(config.api_base_url);
        if let Some(secs) = config.timeout_secs.filter(|s| *s > 0) {
            out.timeout_secs = secs;
        }
        out.database_path = config.database_path.map(Into::into);
        out
    }
}

/// FFI-safe session state.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSessionState {
    Unauthenticated,
    Authenticated { role: Option<String> },
}

impl From<SessionState> for FfiSessionState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Unauthenticated => FfiSessionState::Unauthenticated,
            SessionState::Authenticated { role } => FfiSessionState::Authenticated {
                role: role.map(|r| r.as_str().to_string()),
            },
        }
    }
}

/// FFI-safe authenticated user.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSessionUser {
    pub id: Option<i64>,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub role: Option<String>,
}

impl From<AuthUser> for FfiSessionUser {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            last_name: user.last_name.unwrap_or_default(),
            first_name: user.first_name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            role: user.role,
        }
    }
}

/// FFI-safe sign-up form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub birth_date: String,
    pub address: String,
    pub phone: String,
}

impl From<FfiRegistration> for Registration {
    fn from(r: FfiRegistration) -> Self {
        Registration {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            password: r.password,
            birth_date: r.birth_date,
            address: r.address,
            phone: r.phone,
        }
    }
}

/// FFI-safe profile.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiUserProfile {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub birth_date: String,
}

impl From<UserProfile> for FfiUserProfile {
    fn from(p: UserProfile) -> Self {
        Self {
            last_name: p.last_name,
            first_name: p.first_name,
            email: p.email,
            phone: p.phone,
            address: p.address,
            birth_date: p.birth_date,
        }
    }
}

impl From<FfiUserProfile> for UserProfile {
    fn from(p: FfiUserProfile) -> Self {
        UserProfile {
            last_name: p.last_name,
            first_name: p.first_name,
            email: p.email,
            phone: p.phone,
            address: p.address,
            birth_date: p.birth_date,
        }
    }
}

/// FFI-safe profile edit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProfileUpdate {
    pub profile: FfiUserProfile,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirm: Option<String>,
}

impl From<FfiProfileUpdate> for ProfileUpdate {
    fn from(u: FfiProfileUpdate) -> Self {
        ProfileUpdate {
            profile: u.profile.into(),
            current_password: u.current_password,
            new_password: u.new_password,
            new_password_confirm: u.new_password_confirm,
        }
    }
}

/// FFI-safe profile update result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProfileUpdateResult {
    pub profile: FfiUserProfile,
    pub password_changed: bool,
}

/// FFI-safe practitioner.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPractitioner {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub label: String,
}

impl From<Practitioner> for FfiPractitioner {
    fn from(p: Practitioner) -> Self {
        Self {
            id: p.id,
            name: p.display_name(),
            label: p.picker_label(),
            specialty: p.specialty,
        }
    }
}

/// FFI-safe appointment.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiAppointment {
    pub id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, absent when the backend sent none
    pub time: Option<String>,
    pub consultation_type: String,
    pub reminder_enabled: bool,
    pub status: Option<String>,
    pub cancelled: bool,
    pub practitioner_id: Option<i64>,
    pub practitioner_name: String,
    pub practitioner_specialty: Option<String>,
    /// `dd/mm/yyyy à HH:MM`
    pub schedule_label: String,
}

impl From<Appointment> for FfiAppointment {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            date: a.date.format("%Y-%m-%d").to_string(),
            time: a.time.map(|t| t.format("%H:%M").to_string()),
            consultation_type: a.consultation_type.clone(),
            reminder_enabled: a.reminder_enabled,
            status: a.status.as_ref().map(|s| s.as_str().to_string()),
            cancelled: a.is_cancelled(),
            practitioner_id: a.practitioner_id(),
            practitioner_name: a.practitioner_name(),
            practitioner_specialty: a.practitioner.as_ref().and_then(|p| p.specialty.clone()),
            schedule_label: a.formatted_schedule(),
        }
    }
}

/// FFI-safe booking form.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiAppointmentForm {
    pub date: String,
    pub time: String,
    pub consultation_type: String,
    pub reminder_enabled: bool,
    pub practitioner_id: Option<i64>,
}

impl From<FfiAppointmentForm> for AppointmentForm {
    fn from(f: FfiAppointmentForm) -> Self {
        AppointmentForm {
            date: f.date,
            time: f.time,
            consultation_type: f.consultation_type,
            reminder_enabled: f.reminder_enabled,
            practitioner_id: f.practitioner_id,
        }
    }
}

impl From<AppointmentForm> for FfiAppointmentForm {
    fn from(f: AppointmentForm) -> Self {
        Self {
            date: f.date,
            time: f.time,
            consultation_type: f.consultation_type,
            reminder_enabled: f.reminder_enabled,
            practitioner_id: f.practitioner_id,
        }
    }
}
