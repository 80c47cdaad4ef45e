//! Blocking HTTP implementation of [`Backend`].

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{
    Backend, Lenient, Reply, APPOINTMENTS_PATH, LOGIN_PATH, PRACTITIONERS_PATH, PROFILE_PATH, SIGNUP_PATH,
};
use crate::config::{ClientConfig, APP_NAME, APP_VERSION};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Appointment, AppointmentPayload, AuthResponse, Credentials, Practitioner, ProfileUpdate,
    ProfileUpdateReply, Registration, UserProfile,
};

/// REST client for the eClinique backend.
pub struct HttpBackend {
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("{}/{}", APP_NAME, APP_VERSION))
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn appointment_url(&self, id: i64) -> String {
        format!("{}{}/{}", self.base_url, APPOINTMENTS_PATH, id)
    }

    /// Send once and decode. No retries.
    fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        fallback: &str,
    ) -> ClientResult<T> {
        let (status, text) = self.send(operation, request)?;
        report(operation, Reply::<T>::parse(status, &text).into_result(fallback))
    }

    /// Send once; any 2xx counts as done whatever the body.
    fn acknowledge(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        fallback: &str,
    ) -> ClientResult<()> {
        let (status, text) = self.send(operation, request)?;
        report(operation, Reply::ack(status, &text).into_result(fallback))
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> ClientResult<(u16, String)> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let _span = tracing::debug_span!("backend", operation, request_id = %request_id).entered();

        let response = request
            .header("X-Request-Id", &request_id)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| self.transport_error(e))?;
        tracing::debug!(status, "Backend replied");
        Ok((status, text))
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        let err = if e.is_connect() {
            ClientError::Network(format!("Cannot connect to {}", self.base_url))
        } else if e.is_timeout() {
            ClientError::Network(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            ClientError::Network(e.to_string())
        };
        tracing::warn!(error = %err, "Backend unreachable");
        err
    }
}

fn report<T>(operation: &'static str, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(e) = &result {
        tracing::warn!(operation, error = %e, "Backend call failed");
    }
    result
}

impl Backend for HttpBackend {
    fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let request = self.client.post(self.url(LOGIN_PATH)).json(credentials);
        self.execute(
            "login",
            request,
            "Invalid credentials. Check your email and password.",
        )
    }

    fn register(&self, registration: &Registration) -> ClientResult<AuthResponse> {
        let request = self.client.post(self.url(SIGNUP_PATH)).json(registration);
        self.execute("register", request, "Registration failed.")
    }

    fn list_appointments(&self, token: &str) -> ClientResult<Vec<Appointment>> {
        let request = self.client.get(self.url(APPOINTMENTS_PATH)).bearer_auth(token);
        self.execute::<Lenient<Appointment>>("list_appointments", request, "Unknown error.")
            .map(|list| list.0)
    }

    fn get_appointment(&self, token: &str, id: i64) -> ClientResult<Appointment> {
        let request = self.client.get(self.appointment_url(id)).bearer_auth(token);
        self.execute(
            "get_appointment",
            request,
            "Unable to load the appointment.",
        )
    }

    fn create_appointment(
        &self,
        token: &str,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment> {
        let request = self
            .client
            .post(self.url(APPOINTMENTS_PATH))
            .bearer_auth(token)
            .json(payload);
        self.execute(
            "create_appointment",
            request,
            "Error while creating the appointment.",
        )
    }

    fn update_appointment(
        &self,
        token: &str,
        id: i64,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment> {
        let request = self
            .client
            .put(self.appointment_url(id))
            .bearer_auth(token)
            .json(payload);
        self.execute("update_appointment", request, "Update failed.")
    }

    fn delete_appointment(&self, token: &str, id: i64) -> ClientResult<()> {
        let request = self.client.delete(self.appointment_url(id)).bearer_auth(token);
        self.acknowledge("delete_appointment", request, "Deletion failed.")
    }

    fn list_practitioners(&self) -> ClientResult<Vec<Practitioner>> {
        let request = self.client.get(self.url(PRACTITIONERS_PATH));
        self.execute::<Lenient<Practitioner>>(
            "list_practitioners",
            request,
            "Unable to load practitioners.",
        )
        .map(|list| list.0)
    }

    fn get_profile(&self, token: &str) -> ClientResult<UserProfile> {
        let request = self.client.get(self.url(PROFILE_PATH)).bearer_auth(token);
        self.execute("get_profile", request, "Unable to load the profile.")
    }

    fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> ClientResult<ProfileUpdateReply> {
        let request = self
            .client
            .put(self.url(PROFILE_PATH))
            .bearer_auth(token)
            .json(update);
        self.execute("update_profile", request, "Unable to save the profile.")
    }
}
