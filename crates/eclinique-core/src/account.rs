//! Account operations: login, sign-up, logout and the patient profile.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::api::{Backend, UNEXPECTED_RESPONSE};
use crate::error::{ClientError, ClientResult, ValidationErrors};
use crate::models::{
    AuthResponse, AuthUser, Credentials, ProfileUpdate, ProfileUpdateReply, Registration,
    UserProfile,
};
use crate::session::SessionStore;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.push("email", "Email is required.");
    } else if !is_valid_email(email) {
        errors.push("email", "Invalid email.");
    }
}

fn check_required(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, format!("{} is required.", label));
    }
}

pub fn validate_credentials(credentials: &Credentials) -> ClientResult<()> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, &credentials.email);
    if credentials.password.is_empty() {
        errors.push("password", "Password is required.");
    } else if credentials.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(
            "password",
            format!("Password must be at least {} characters.", MIN_PASSWORD_LEN),
        );
    }
    errors.into_result(())
}

pub fn validate_registration(registration: &Registration) -> ClientResult<()> {
    let mut errors = ValidationErrors::new();
    check_required(&mut errors, "first_name", "First name", &registration.first_name);
    check_required(&mut errors, "last_name", "Last name", &registration.last_name);
    check_email(&mut errors, &registration.email);
    check_required(&mut errors, "password", "Password", &registration.password);
    check_required(&mut errors, "birth_date", "Birth date", &registration.birth_date);
    check_required(&mut errors, "address", "Address", &registration.address);
    check_required(&mut errors, "phone", "Phone", &registration.phone);
    errors.into_result(())
}

pub fn validate_profile_update(update: &ProfileUpdate) -> ClientResult<()> {
    let mut errors = ValidationErrors::new();
    check_required(&mut errors, "last_name", "Last name", &update.profile.last_name);
    check_required(&mut errors, "first_name", "First name", &update.profile.first_name);
    check_email(&mut errors, &update.profile.email);

    if update.changes_password() {
        let new_password = update.new_password.as_deref().unwrap_or_default();
        if update.current_password.as_deref().map_or(true, str::is_empty) {
            errors.push("current_password", "Current password is required.");
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "new_password",
                format!("Password must be at least {} characters.", MIN_PASSWORD_LEN),
            );
        }
        if update.new_password_confirm.as_deref() != Some(new_password) {
            errors.push("new_password_confirm", "Passwords do not match.");
        }
    }
    errors.into_result(())
}

/// Account and profile operations over a shared session.
pub struct AccountService {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
}

impl AccountService {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionStore>) -> Self {
        Self { backend, session }
    }

    /// Log in and start a session.
    pub fn login(&self, credentials: &Credentials) -> ClientResult<AuthUser> {
        validate_credentials(credentials)?;
        let reply = self.backend.login(credentials)?;
        self.start_session(reply)
    }

    /// Create a patient account and start a session.
    pub fn register(&self, registration: &Registration) -> ClientResult<AuthUser> {
        validate_registration(registration)?;
        let reply = self.backend.register(registration)?;
        self.start_session(reply)
    }

    fn start_session(&self, reply: AuthResponse) -> ClientResult<AuthUser> {
        let (token, user) = reply.into_session().ok_or_else(|| {
            tracing::warn!("Auth reply without token or user");
            ClientError::Server {
                status: 200,
                message: UNEXPECTED_RESPONSE.to_string(),
            }
        })?;
        self.session.begin(&token, &user)?;
        Ok(user)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.session.end()
    }

    /// Fetch the profile from the backend and refresh the local mirror.
    pub fn profile(&self) -> ClientResult<UserProfile> {
        let token = self.session.guard(self.session.require_token())?;
        let profile = self
            .session
            .guard(self.backend.get_profile(&token))?
            .normalized();
        self.session.cache_profile(&profile)?;
        Ok(profile)
    }

    /// Save profile edits, optionally changing the password.
    pub fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<ProfileUpdateReply> {
        validate_profile_update(update)?;
        let token = self.session.guard(self.session.require_token())?;
        let mut reply = self
            .session
            .guard(self.backend.update_profile(&token, update))?;

        // Some backends acknowledge with only the password flag
        if reply.profile == UserProfile::default() {
            reply.profile = update.profile.clone();
        }
        reply.profile = reply.profile.normalized();
        self.session.cache_profile(&reply.profile)?;
        tracing::info!(password_changed = reply.password_changed, "Profile updated");
        Ok(reply)
    }

    /// Profile as last mirrored locally; works offline.
    pub fn cached_profile(&self) -> ClientResult<UserProfile> {
        self.session.cached_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockBackend, Operation};
    use crate::models::Role;
    use crate::session::{SessionField, SessionState};

    fn patient() -> AuthUser {
        AuthUser {
            id: Some(1),
            last_name: Some("Diallo".into()),
            first_name: Some("Awa".into()),
            email: Some("awa@mail.com".into()),
            role: Some("patient".into()),
            ..Default::default()
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            last_name: "Diallo".into(),
            first_name: "Awa".into(),
            email: "awa@mail.com".into(),
            phone: "0601020304".into(),
            address: "1 rue de Paris".into(),
            birth_date: "1990-04-12T00:00:00.000Z".into(),
        }
    }

    fn setup() -> (Arc<MockBackend>, AccountService) {
        let backend = Arc::new(
            MockBackend::new()
                .with_account("awa@mail.com", "secret1", patient())
                .with_profile(profile()),
        );
        let service = AccountService::new(backend.clone(), Arc::new(SessionStore::in_memory()));
        (backend, service)
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("awa@mail.com"));
        assert!(is_valid_email(" awa@mail.co.uk "));
        assert!(!is_valid_email("awa@mail"));
        assert!(!is_valid_email("awa mail@x.fr"));
        assert!(!is_valid_email("@mail.com"));
    }

    #[test]
    fn test_login_validation_happens_locally() {
        let (backend, service) = setup();

        let err = service.login(&Credentials::new("not-an-email", "123")).unwrap_err();
        match err {
            ClientError::Validation(errors) => {
                assert_eq!(errors.get("email"), Some("Invalid email."));
                assert_eq!(
                    errors.get("password"),
                    Some("Password must be at least 6 characters.")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(backend.call_count(Operation::Login), 0);
    }

    #[test]
    fn test_login_starts_session() {
        let (_, service) = setup();

        let user = service.login(&Credentials::new("awa@mail.com", "secret1")).unwrap();
        assert_eq!(user.last_name.as_deref(), Some("Diallo"));
        assert_eq!(
            service.session.state().unwrap(),
            SessionState::Authenticated {
                role: Some(Role::Patient)
            }
        );
        assert_eq!(
            service.session.get_field(SessionField::LastName).unwrap(),
            Some("Diallo".into())
        );
    }

    #[test]
    fn test_login_bad_password() {
        let (_, service) = setup();

        let err = service.login(&Credentials::new("awa@mail.com", "wrong-pass")).unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!service.session.is_authenticated().unwrap());
    }

    #[test]
    fn test_register_requires_every_field() {
        let (backend, service) = setup();

        let err = service.register(&Registration::default()).unwrap_err();
        match err {
            ClientError::Validation(errors) => assert_eq!(errors.len(), 7),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(backend.call_count(Operation::Register), 0);
    }

    #[test]
    fn test_register_then_login() {
        let (_, service) = setup();
        let registration = Registration {
            first_name: "Jean".into(),
            last_name: "Dupont".into(),
            email: "jean@mail.com".into(),
            password: "motdepasse".into(),
            birth_date: "1985-02-03".into(),
            address: "2 avenue Foch".into(),
            phone: "0700000000".into(),
        };

        service.register(&registration).unwrap();
        assert_eq!(
            service.session.get_field(SessionField::Phone).unwrap(),
            Some("0700000000".into())
        );

        service.logout().unwrap();
        assert!(!service.session.is_authenticated().unwrap());

        service.login(&Credentials::new("jean@mail.com", "motdepasse")).unwrap();
        assert!(service.session.is_authenticated().unwrap());
    }

    #[test]
    fn test_register_duplicate_email() {
        let (_, service) = setup();
        let registration = Registration {
            first_name: "Awa".into(),
            last_name: "Diallo".into(),
            email: "awa@mail.com".into(),
            password: "secret1".into(),
            birth_date: "1990-04-12".into(),
            address: "1 rue de Paris".into(),
            phone: "0601020304".into(),
        };
        let err = service.register(&registration).unwrap_err();
        assert_eq!(err.user_message(), "Email already in use.");
    }

    #[test]
    fn test_profile_fetch_normalizes_and_caches() {
        let (_, service) = setup();
        service.login(&Credentials::new("awa@mail.com", "secret1")).unwrap();

        let fetched = service.profile().unwrap();
        assert_eq!(fetched.birth_date, "1990-04-12");
        assert_eq!(service.cached_profile().unwrap(), fetched);
    }

    #[test]
    fn test_profile_requires_session() {
        let (backend, service) = setup();
        assert!(service.profile().unwrap_err().is_unauthorized());
        assert_eq!(backend.call_count(Operation::GetProfile), 0);
    }

    #[test]
    fn test_update_profile_with_password_change() {
        let (backend, service) = setup();
        service.login(&Credentials::new("awa@mail.com", "secret1")).unwrap();

        let mut edited = profile();
        edited.phone = "0699999999".into();
        let update = ProfileUpdate {
            profile: edited,
            current_password: Some("secret1".into()),
            new_password: Some("secret2".into()),
            new_password_confirm: Some("secret2".into()),
        };

        let reply = service.update_profile(&update).unwrap();
        assert!(reply.password_changed);
        assert_eq!(reply.profile.birth_date, "1990-04-12");
        assert_eq!(
            service.session.get_field(SessionField::Phone).unwrap(),
            Some("0699999999".into())
        );
        assert_eq!(backend.profile().phone, "0699999999");
    }

    #[test]
    fn test_update_profile_password_mismatch_is_local() {
        let (backend, service) = setup();
        service.login(&Credentials::new("awa@mail.com", "secret1")).unwrap();

        let update = ProfileUpdate {
            profile: profile(),
            current_password: None,
            new_password: Some("secret2".into()),
            new_password_confirm: Some("secret3".into()),
        };
        match service.update_profile(&update).unwrap_err() {
            ClientError::Validation(errors) => {
                assert!(errors.get("current_password").is_some());
                assert_eq!(errors.get("new_password_confirm"), Some("Passwords do not match."));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(backend.call_count(Operation::UpdateProfile), 0);
    }

    #[test]
    fn test_revoked_token_on_profile_update_ends_session() {
        let (backend, service) = setup();
        service.login(&Credentials::new("awa@mail.com", "secret1")).unwrap();
        backend.revoke_token();

        let err = service.update_profile(&ProfileUpdate::new(profile())).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(service.session.state().unwrap(), SessionState::Unauthenticated);
        assert_eq!(service.cached_profile().unwrap(), UserProfile::default());
    }

    #[test]
    fn test_unexpected_auth_reply() {
        let (_, service) = setup();

        let err = service.start_session(AuthResponse::default()).unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 200, .. }));
        assert!(!service.session.is_authenticated().unwrap());
    }
}
