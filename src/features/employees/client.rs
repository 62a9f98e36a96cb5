//! Thin client wrappers over the employee CRUD and upload endpoints. Glue
//! only: each call is one authenticated request with no local state beyond
//! id validation. The bearer token comes from the injected credential
//! store; callers are expected to have passed the access guard already.

use crate::{api, config::AppConfig, errors::Error, features::auth::store::CredentialStore};
use crate::features::employees::types::Employee;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use tracing::{Instrument, info_span};

const USER_AGENT: &str = concat!("empdesk/", env!("CARGO_PKG_VERSION"));

pub struct EmployeesClient {
    http: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl EmployeesClient {
    /// Builds a client sharing the session's credential store.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        Ok(Self {
            http: api::client(config.request_timeout, USER_AGENT)?,
            base_url: config.api_base_url.clone(),
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        api::build_url(&self.base_url, path)
    }

    fn bearer_token(&self) -> Result<String, Error> {
        self.store
            .load()
            .token()
            .map(str::to_string)
            .ok_or_else(|| Error::Validation("You must log in first.".to_string()))
    }

    fn valid_id(id: u64) -> Result<u64, Error> {
        if id == 0 {
            Err(Error::Validation("Employee id is required.".to_string()))
        } else {
            Ok(id)
        }
    }

    /// Fetches the full employee list.
    ///
    /// # Errors
    /// `Validation` when not logged in, otherwise transport/rejection
    /// errors from the backend.
    pub async fn list(&self) -> Result<Vec<Employee>, Error> {
        let token = self.bearer_token()?;
        let url = self.url("/employees");
        let span = info_span!("employees.list", http.method = "GET", url = %url);
        api::send_json(self.http.get(&url).bearer_auth(token))
            .instrument(span)
            .await
    }

    /// Fetches one employee by id.
    ///
    /// # Errors
    /// `Validation` on a zero id or missing session, otherwise backend
    /// errors.
    pub async fn get(&self, id: u64) -> Result<Employee, Error> {
        let id = Self::valid_id(id)?;
        let token = self.bearer_token()?;
        let url = self.url(&format!("/employees/{id}"));
        let span = info_span!("employees.get", http.method = "GET", url = %url);
        api::send_json(self.http.get(&url).bearer_auth(token))
            .instrument(span)
            .await
    }

    /// Creates an employee and returns the stored record.
    ///
    /// # Errors
    /// `Validation` when not logged in, otherwise backend errors.
    pub async fn create(&self, employee: &Employee) -> Result<Employee, Error> {
        let token = self.bearer_token()?;
        let url = self.url("/employees");
        let span = info_span!("employees.create", http.method = "POST", url = %url);
        api::send_json(self.http.post(&url).bearer_auth(token).json(employee))
            .instrument(span)
            .await
    }

    /// Updates an employee in place.
    ///
    /// # Errors
    /// `Validation` on a zero id or missing session, otherwise backend
    /// errors.
    pub async fn update(&self, id: u64, employee: &Employee) -> Result<Employee, Error> {
        let id = Self::valid_id(id)?;
        let token = self.bearer_token()?;
        let url = self.url(&format!("/employees/{id}"));
        let span = info_span!("employees.update", http.method = "PUT", url = %url);
        api::send_json(self.http.put(&url).bearer_auth(token).json(employee))
            .instrument(span)
            .await
    }

    /// Deletes an employee; the backend replies with plain text.
    ///
    /// # Errors
    /// `Validation` on a zero id or missing session, otherwise backend
    /// errors.
    pub async fn delete(&self, id: u64) -> Result<String, Error> {
        let id = Self::valid_id(id)?;
        let token = self.bearer_token()?;
        let url = self.url(&format!("/employees/{id}"));
        let span = info_span!("employees.delete", http.method = "DELETE", url = %url);
        api::send_text(self.http.delete(&url).bearer_auth(token))
            .instrument(span)
            .await
    }

    /// Uploads a profile photo; the backend replies with plain text.
    ///
    /// # Errors
    /// `Validation` on a zero id or missing session, otherwise backend
    /// errors.
    pub async fn upload_photo(
        &self,
        id: u64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, Error> {
        let id = Self::valid_id(id)?;
        let token = self.bearer_token()?;
        let url = self.url(&format!("/employees/{id}/upload-photo"));
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let span = info_span!("employees.upload_photo", http.method = "POST", url = %url);
        api::send_text(self.http.post(&url).bearer_auth(token).multipart(form))
            .instrument(span)
            .await
    }

    /// Uploads a resume, optionally tied to a job posting; the backend
    /// replies with plain text.
    ///
    /// # Errors
    /// `Validation` on a zero id or missing session, otherwise backend
    /// errors.
    pub async fn upload_resume(
        &self,
        id: u64,
        file_name: &str,
        bytes: Vec<u8>,
        job_id: Option<u64>,
    ) -> Result<String, Error> {
        let id = Self::valid_id(id)?;
        let token = self.bearer_token()?;
        let url = self.url(&format!("/employees/{id}/upload-resume"));
        let mut form =
            Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        if let Some(job_id) = job_id {
            form = form.text("jobId", job_id.to_string());
        }
        let span = info_span!("employees.upload_resume", http.method = "POST", url = %url);
        api::send_text(self.http.post(&url).bearer_auth(token).multipart(form))
            .instrument(span)
            .await
    }

    /// Builds the resume download URL for an employee.
    #[must_use]
    pub fn resume_download_url(&self, id: u64) -> String {
        self.url(&format!("/employees/{id}/resume/download"))
    }
}
