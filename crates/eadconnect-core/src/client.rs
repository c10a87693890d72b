// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the education platform API.
//!
//! One async method per remote operation. Headers are computed per request
//! from the institution and the credential the endpoint needs, so no header
//! state leaks between calls.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::config::{AppConfig, HttpConfig};
use crate::endpoints::{API_BASE_URL, AuthScope, Endpoint, institution_origin};
use crate::error::ApiError;
use crate::models::{CoursesPage, CoursesQuery, DebtsQuery, GradeReport, Period, Profile, TokenResponse};
use crate::token_store::TokenKind;

/// Application alias the web client signs in with.
const APPLICATION_ALIAS: &str = "plataforma";
/// Institution/campus alias expected by the auth service.
const IES_ALIAS: &str = "107_1";
/// Role assumed after signin.
const ROLE_ALIAS: &str = "student";

/// Student credentials, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Platform username.
    pub username: String,
    /// Platform password.
    pub password: SecretString,
    /// Institution slug (e.g. `faesa`), lowercased.
    pub institution: String,
}

impl Credentials {
    /// Creates credentials, normalising the institution slug.
    #[must_use]
    pub fn new(username: impl Into<String>, password: SecretString, institution: &str) -> Self {
        Self {
            username: username.into(),
            password,
            institution: institution.trim().to_lowercase(),
        }
    }
}

/// Client for the education platform.
///
/// Holds the academic token and the elevated app token as two independent
/// credentials.
#[derive(Debug, Clone)]
pub struct EducationClient {
    http: Client,
    api_base: String,
    credentials: Credentials,
    access_token: Option<SecretString>,
    app_access_token: Option<SecretString>,
}

impl EducationClient {
    /// Creates a client against the production API.
    pub fn new(credentials: Credentials, http_config: &HttpConfig) -> Result<Self, ApiError> {
        Self::with_base_url(credentials, &http_config.api_base_url, http_config.timeout_seconds)
    }

    /// Creates a client from the application config.
    pub fn from_config(credentials: Credentials, config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(credentials, &config.http)
    }

    /// Creates a client against an arbitrary API origin.
    pub fn with_base_url(
        credentials: Credentials,
        api_base: &str,
        timeout_seconds: u64,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        let api_base = if api_base.is_empty() {
            API_BASE_URL.to_string()
        } else {
            api_base.trim_end_matches('/').to_string()
        };

        Ok(Self {
            http,
            api_base,
            credentials,
            access_token: None,
            app_access_token: None,
        })
    }

    /// Credentials this client signs in with.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Institution slug.
    #[must_use]
    pub fn institution(&self) -> &str {
        &self.credentials.institution
    }

    /// Sets or clears the token for one credential kind.
    pub fn set_token(&mut self, kind: TokenKind, token: Option<SecretString>) {
        match kind {
            TokenKind::Access => self.access_token = token,
            TokenKind::App => self.app_access_token = token,
        }
    }

    /// Token held for one credential kind.
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> Option<&SecretString> {
        match kind {
            TokenKind::Access => self.access_token.as_ref(),
            TokenKind::App => self.app_access_token.as_ref(),
        }
    }

    fn url(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> String {
        format!("{}/{}", self.api_base, endpoint.path(params))
    }

    /// Header set for one call.
    fn headers(&self, endpoint: Endpoint, token: Option<&SecretString>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let referer = format!("{}/", institution_origin(&self.credentials.institution));
        headers.insert(
            REFERER,
            HeaderValue::from_str(&referer).map_err(|_| ApiError::InvalidHeader("Referer"))?,
        );
        if endpoint.accepts_json() {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(token.expose_secret())
                .map_err(|_| ApiError::InvalidHeader("Authorization"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Resolves the stored credential for scopes that use one.
    fn scoped_token(&self, endpoint: Endpoint) -> Result<Option<&SecretString>, ApiError> {
        match endpoint.scope() {
            AuthScope::Academic => self
                .access_token
                .as_ref()
                .map(Some)
                .ok_or(ApiError::MissingToken(TokenKind::Access)),
            AuthScope::App => self
                .app_access_token
                .as_ref()
                .map(Some)
                .ok_or(ApiError::MissingToken(TokenKind::App)),
            AuthScope::Anonymous | AuthScope::Signin | AuthScope::Probe => Ok(None),
        }
    }

    /// Builds a request with the endpoint's stored credential.
    fn request(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> Result<RequestBuilder, ApiError> {
        let token = self.scoped_token(endpoint)?;
        self.request_with(endpoint, params, token)
    }

    /// Builds a request with an explicit credential.
    fn request_with(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder, ApiError> {
        let headers = self.headers(endpoint, token)?;
        Ok(self
            .http
            .request(endpoint.method(), self.url(endpoint, params))
            .headers(headers))
    }

    /// Sends a request and decodes a successful JSON body.
    async fn execute<T: DeserializeOwned>(
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(endpoint = endpoint.name(), status = status.as_u16(), "Request failed");
            return Err(ApiError::Status {
                endpoint: endpoint.name(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(endpoint = endpoint.name(), bytes = bytes.len(), "Request succeeded");
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            endpoint: endpoint.name(),
            source,
        })
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Signs in with username and password, returning the signin token.
    #[instrument(skip(self), fields(institution = %self.credentials.institution))]
    pub async fn login(&self) -> Result<TokenResponse, ApiError> {
        let endpoint = Endpoint::Signin;
        let payload = json!({
            "username": self.credentials.username,
            "password": self.credentials.password.expose_secret(),
            "applicationAlias": APPLICATION_ALIAS,
            "iesAlias": IES_ALIAS,
        });
        let request = self
            .request_with(endpoint, &[("institution", &self.credentials.institution)], None)?
            .json(&payload);
        Self::execute(endpoint, request).await
    }

    /// Exchanges a signin token for the student access token.
    #[instrument(skip_all)]
    pub async fn assume_role(&self, signin_token: &SecretString) -> Result<TokenResponse, ApiError> {
        let endpoint = Endpoint::AssumeRole;
        let payload = json!({
            "roleAlias": ROLE_ALIAS,
            "applicationAlias": APPLICATION_ALIAS,
            "tenantAlias": self.credentials.institution,
            "iesAlias": IES_ALIAS,
        });
        let request = self
            .request_with(endpoint, &[], Some(signin_token))?
            .json(&payload);
        Self::execute(endpoint, request).await
    }

    /// Calls `/users/me` with the given token.
    #[instrument(skip_all)]
    pub async fn check_me(&self, token: &SecretString) -> Result<Profile, ApiError> {
        let endpoint = Endpoint::Me;
        let request = self.request_with(endpoint, &[], Some(token))?;
        Self::execute(endpoint, request).await
    }

    /// Profile of the authenticated student.
    pub async fn get_me(&self) -> Result<Profile, ApiError> {
        let token = self
            .access_token
            .as_ref()
            .ok_or(ApiError::MissingToken(TokenKind::Access))?;
        self.check_me(token).await
    }

    /// Requests the SSO launch URL of the academic-services app.
    #[instrument(skip(self))]
    pub async fn auth_app_launcher(&self) -> Result<Value, ApiError> {
        let endpoint = Endpoint::AppLauncher;
        let payload = json!({
            "iesAlias": IES_ALIAS,
            "roleAlias": ROLE_ALIAS,
            "tenantAlias": self.credentials.institution,
            "uuid": self.credentials.username,
        });
        let request = self
            .request(endpoint, &[])?
            .query(&[("appLauncher", "false")])
            .json(&payload);
        Self::execute(endpoint, request).await
    }

    /// Calls the app-token validation endpoint with the given token.
    #[instrument(skip_all)]
    pub async fn check_app_token(&self, token: &SecretString) -> Result<Value, ApiError> {
        let endpoint = Endpoint::MyInformations;
        let request = self.request_with(endpoint, &[], Some(token))?;
        Self::execute(endpoint, request).await
    }

    // ------------------------------------------------------------------
    // Academic
    // ------------------------------------------------------------------

    /// Academic periods of the student.
    #[instrument(skip(self))]
    pub async fn get_periods(&self) -> Result<Vec<Period>, ApiError> {
        let endpoint = Endpoint::Periods;
        let request = self
            .request(endpoint, &[])?
            .query(&[("academicMainTypeName", "course"), ("state", "all")]);
        Self::execute(endpoint, request).await
    }

    /// Courses of the student.
    #[instrument(skip(self))]
    pub async fn get_my_courses(&self, query: &CoursesQuery) -> Result<CoursesPage, ApiError> {
        let endpoint = Endpoint::MyCourses;
        let request = self.request(endpoint, &[])?.query(&[
            ("state", query.state.clone()),
            ("period", query.period.to_string()),
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
            ("sort", "asc".to_string()),
            ("sortBy", "name".to_string()),
            ("type", "courses".to_string()),
        ]);
        Self::execute(endpoint, request).await
    }

    /// Content tree of a course.
    #[instrument(skip(self))]
    pub async fn get_contents(&self, course_id: u64) -> Result<Value, ApiError> {
        let endpoint = Endpoint::Contents;
        let id = course_id.to_string();
        let request = self.request(endpoint, &[("course_id", &id)])?;
        Self::execute(endpoint, request).await
    }

    /// A topic of a course, including its exercise content.
    #[instrument(skip(self))]
    pub async fn get_exercises(&self, course_id: u64, topic_id: u64) -> Result<Value, ApiError> {
        let endpoint = Endpoint::Topic;
        let course = course_id.to_string();
        let topic = topic_id.to_string();
        let request = self.request(endpoint, &[("course_id", &course), ("topic_id", &topic)])?;
        Self::execute(endpoint, request).await
    }

    /// Grades of a course.
    #[instrument(skip(self))]
    pub async fn get_grades(&self, course_id: u64) -> Result<GradeReport, ApiError> {
        let endpoint = Endpoint::Grades;
        let id = course_id.to_string();
        let request = self.request(endpoint, &[("course_id", &id)])?;
        Self::execute(endpoint, request).await
    }

    /// Inbox messages.
    #[instrument(skip(self))]
    pub async fn get_messages(&self, page: u32, per_page: u32) -> Result<Value, ApiError> {
        let endpoint = Endpoint::Messages;
        let request = self.request(endpoint, &[])?.query(&[
            ("directory", "inbox".to_string()),
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
        ]);
        Self::execute(endpoint, request).await
    }

    /// Global notices board, newest first.
    #[instrument(skip(self))]
    pub async fn get_notices(&self, page: u32, per_page: u32) -> Result<Value, ApiError> {
        let endpoint = Endpoint::Notices;
        let request = self.request(endpoint, &[])?.query(&[
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
            ("orderBy", "postedAt:desc".to_string()),
        ]);
        Self::execute(endpoint, request).await
    }

    /// Highlighted notices of one course.
    #[instrument(skip(self))]
    pub async fn get_course_notices(
        &self,
        course_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Value, ApiError> {
        let endpoint = Endpoint::CourseNotices;
        let id = course_id.to_string();
        let request = self.request(endpoint, &[("course_id", &id)])?.query(&[
            ("isHighlight", "true".to_string()),
            ("perPage", per_page.to_string()),
            ("page", page.to_string()),
            ("orderBy", "sequence:asc".to_string()),
        ]);
        Self::execute(endpoint, request).await
    }

    /// Calendar appointment types.
    #[instrument(skip(self))]
    pub async fn get_appointment_types(&self) -> Result<Value, ApiError> {
        let endpoint = Endpoint::AppointmentTypes;
        let request = self.request(endpoint, &[])?;
        Self::execute(endpoint, request).await
    }

    /// Calendar appointments between two dates (`YYYY-MM-DD`).
    #[instrument(skip(self))]
    pub async fn get_calendar(&self, start_date: &str, end_date: &str) -> Result<Value, ApiError> {
        let endpoint = Endpoint::Calendar;
        let request = self.request(endpoint, &[])?.query(&[
            ("appointmentCategory", "1,2,5,6"),
            ("startDate", start_date),
            ("endDate", end_date),
        ]);
        Self::execute(endpoint, request).await
    }

    // ------------------------------------------------------------------
    // Financial (app token)
    // ------------------------------------------------------------------

    /// Student record in the academic-services app.
    #[instrument(skip(self))]
    pub async fn get_my_info(&self) -> Result<Value, ApiError> {
        let endpoint = Endpoint::MyInformations;
        let request = self.request(endpoint, &[])?;
        Self::execute(endpoint, request).await
    }

    /// Financial debts.
    #[instrument(skip(self))]
    pub async fn get_debts(&self, query: &DebtsQuery) -> Result<Value, ApiError> {
        let endpoint = Endpoint::Debts;
        let request = self.request(endpoint, &[])?.query(&[
            ("perPage", query.per_page.to_string()),
            ("page", query.page.to_string()),
            (
                "academicRecord",
                query.registration_number.clone().unwrap_or_default(),
            ),
            ("filterYear", String::new()),
            ("filterPeriod", String::new()),
            ("filterType", String::new()),
            ("filterStatusType", query.status.clone()),
            ("checkfitForAgreement", "true".to_string()),
            ("viewSlips", "true".to_string()),
            ("order", "DESC|ASC|ASC|ASC|ASC".to_string()),
            (
                "sortBy",
                "warning_agreement|due_date|debt_number|competency_month|competency_year"
                    .to_string(),
            ),
        ]);
        Self::execute(endpoint, request).await
    }

    /// Slip of a single debt.
    #[instrument(skip(self))]
    pub async fn get_contract_slip(&self, contract_id: u64) -> Result<Value, ApiError> {
        let endpoint = Endpoint::DebtSlip;
        let id = contract_id.to_string();
        let request = self.request(endpoint, &[("contract_id", &id)])?;
        Self::execute(endpoint, request).await
    }

    /// Available payment methods.
    #[instrument(skip(self))]
    pub async fn get_payment_methods(&self) -> Result<Value, ApiError> {
        let endpoint = Endpoint::PaymentMethods;
        let request = self.request(endpoint, &[])?;
        Self::execute(endpoint, request).await
    }

    /// Payment settings.
    #[instrument(skip(self))]
    pub async fn get_payment_settings(&self) -> Result<Value, ApiError> {
        let endpoint = Endpoint::PaymentSettings;
        let request = self.request(endpoint, &[])?;
        Self::execute(endpoint, request).await
    }

    /// Creates a PIX charge for the given registration.
    #[instrument(skip(self, payment_data))]
    pub async fn create_payment(
        &self,
        registration_number: &str,
        payment_data: &Value,
    ) -> Result<Value, ApiError> {
        let endpoint = Endpoint::PixCharge;
        let request = self
            .request(endpoint, &[])?
            .query(&[("academicRecord", registration_number), ("isAgreement", "false")])
            .json(payment_data);
        Self::execute(endpoint, request).await
    }
}
