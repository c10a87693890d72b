// SPDX-License-Identifier: Apache-2.0

//! Endpoint registry for the education platform API.
//!
//! Every remote operation is listed once with its HTTP method, path template
//! and the credential it is called with.

use reqwest::Method;

/// Default API origin.
pub const API_BASE_URL: &str = "https://api.plataforma.grupoa.education";

/// Domain institutions are served under (`https://{institution}.grupoa.education`).
pub const PLATFORM_DOMAIN: &str = "grupoa.education";

/// Which credential goes into the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    /// No authorization header.
    Anonymous,
    /// Short-lived token returned by the signin call.
    Signin,
    /// An arbitrary token being validated.
    Probe,
    /// Academic access token.
    Academic,
    /// Elevated service-portal token.
    App,
}

/// Logical platform operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Username/password signin for a tenant.
    Signin,
    /// Exchange the signin token for a student access token.
    AssumeRole,
    /// Current user profile.
    Me,
    /// Academic periods.
    Periods,
    /// Courses of the current user.
    MyCourses,
    /// Content tree of a course.
    Contents,
    /// A single topic of a course.
    Topic,
    /// Grades of a course.
    Grades,
    /// Inbox messages.
    Messages,
    /// Global notices board.
    Notices,
    /// Notices board of one course.
    CourseNotices,
    /// Calendar appointment types.
    AppointmentTypes,
    /// Calendar appointments in a date range.
    Calendar,
    /// SSO launcher for the academic-services app.
    AppLauncher,
    /// Student record in the academic-services app.
    MyInformations,
    /// Financial debts.
    Debts,
    /// Slip of a single debt.
    DebtSlip,
    /// Available payment methods.
    PaymentMethods,
    /// Payment settings.
    PaymentSettings,
    /// Create a PIX charge.
    PixCharge,
}

impl Endpoint {
    /// Stable name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Endpoint::Signin => "login",
            Endpoint::AssumeRole => "assume-role",
            Endpoint::Me => "who-am-i",
            Endpoint::Periods => "periods",
            Endpoint::MyCourses => "my-courses",
            Endpoint::Contents => "course-contents",
            Endpoint::Topic => "exercises",
            Endpoint::Grades => "grades",
            Endpoint::Messages => "messages",
            Endpoint::Notices => "notices",
            Endpoint::CourseNotices => "course-notices",
            Endpoint::AppointmentTypes => "appointment-types",
            Endpoint::Calendar => "calendar",
            Endpoint::AppLauncher => "app-launcher",
            Endpoint::MyInformations => "my-informations",
            Endpoint::Debts => "debts",
            Endpoint::DebtSlip => "debt-slip",
            Endpoint::PaymentMethods => "payment-methods",
            Endpoint::PaymentSettings => "payment-settings",
            Endpoint::PixCharge => "create-payment",
        }
    }

    /// HTTP method.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Endpoint::Signin | Endpoint::AppLauncher | Endpoint::PixCharge => Method::POST,
            Endpoint::AssumeRole => Method::PUT,
            _ => Method::GET,
        }
    }

    /// Credential used for this call.
    #[must_use]
    pub const fn scope(self) -> AuthScope {
        match self {
            Endpoint::Signin => AuthScope::Anonymous,
            Endpoint::AssumeRole => AuthScope::Signin,
            Endpoint::Me => AuthScope::Probe,
            Endpoint::MyInformations
            | Endpoint::Debts
            | Endpoint::DebtSlip
            | Endpoint::PaymentMethods
            | Endpoint::PaymentSettings
            | Endpoint::PixCharge => AuthScope::App,
            _ => AuthScope::Academic,
        }
    }

    /// Whether the request asks for `application/json` explicitly.
    #[must_use]
    pub const fn accepts_json(self) -> bool {
        !matches!(self, Endpoint::Signin | Endpoint::AssumeRole)
    }

    /// Path template relative to the API origin.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Endpoint::Signin => "v2/safea-client/auth/signin/tenants/{institution}",
            Endpoint::AssumeRole => "v2/safea-client/auth/role/assume",
            Endpoint::Me => "v2/safea-client/users/me",
            Endpoint::Periods => "v1/plataforma/academic/courses/period/me",
            Endpoint::MyCourses => "v1/plataforma/academic/courses/me",
            Endpoint::Contents => "v2/plataforma/content/academics-main/{course_id}/contents",
            Endpoint::Topic => {
                "v2/plataforma/content/academics-main/{course_id}/topics/{topic_id}"
            }
            Endpoint::Grades => "v1/plataforma/grades/me/course/{course_id}",
            Endpoint::Messages => "v1/message/messages",
            Endpoint::Notices => "v1/plataforma/academic/notices-board",
            Endpoint::CourseNotices => "v1/plataforma/academic/courses/{course_id}/notices-board",
            Endpoint::AppointmentTypes => "v1/plataforma/calendar/appointment/type",
            Endpoint::Calendar => "v1/plataforma/calendar/appointment",
            Endpoint::AppLauncher => {
                "v2/safea-client/auth/sso/applications/academic-services/url"
            }
            Endpoint::MyInformations => "v1/academic-services/bff/my-informations",
            Endpoint::Debts => "v1/service-portal/financial/debts",
            Endpoint::DebtSlip => "v1/service-portal/financial/debts/{contract_id}",
            Endpoint::PaymentMethods => "v1/service-portal/financial/payment/methods",
            Endpoint::PaymentSettings => "v1/plataforma/service-portal/financial/settings",
            Endpoint::PixCharge => "v1/service-portal/financial/payment/charges/pix",
        }
    }

    /// Path with `{name}` placeholders substituted.
    #[must_use]
    pub fn path(self, params: &[(&str, &str)]) -> String {
        params
            .iter()
            .fold(self.template().to_string(), |path, (name, value)| {
                path.replace(&format!("{{{name}}}"), value)
            })
    }
}

/// Browser origin of an institution, used as `Referer`.
#[must_use]
pub fn institution_origin(institution: &str) -> String {
    format!("https://{}.{PLATFORM_DOMAIN}", institution.to_lowercase())
}
