use crate::api::attendance::PhotoPayload;
use crate::api::dashboard::{DashboardResponse, DayCount};
use crate::api::staff::StaffForm;
use crate::auth::handlers::ChangePassword;
use crate::engine::{DailySummary, StaffSummary};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::role::Role;
use crate::model::settings::AppSettings;
use crate::models::{LoginReqDto, LoginResponse, UserResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staff Attendance API",
        version = "1.0.0",
        description = r#"
## Staff Attendance Tracker

Staff check in and out with a photo; administrators review the records,
manage staff accounts and tune the lateness rules.

### Key Features
- **Attendance**
  - Photo check-in/check-out, late marking against office start + grace period
  - Working hours computed at check-out
  - Days present and estimated pay per staff member
- **Staff Management**
  - Create, edit, deactivate and delete staff accounts
- **Settings**
  - Office start time and late grace period

### Security
Everything under `/api` requires a **JWT Bearer** token from `/auth/login`.
Review, staff and settings changes are **Admin** only.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::me,
        crate::auth::handlers::change_password,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,
        crate::api::attendance::history,
        crate::api::attendance::summary,
        crate::api::attendance::list_attendance,

        crate::api::dashboard::dashboard,

        crate::api::staff::list_staff,
        crate::api::staff::create_staff,
        crate::api::staff::get_staff,
        crate::api::staff::update_staff,
        crate::api::staff::delete_staff,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            UserResponse,
            ChangePassword,
            Role,
            PhotoPayload,
            AttendanceRecord,
            AttendanceStatus,
            DailySummary,
            StaffSummary,
            DayCount,
            DashboardResponse,
            StaffForm,
            AppSettings
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-in and own account"),
        (name = "Attendance", description = "Check-in/check-out and attendance review"),
        (name = "Dashboard", description = "Daily overview"),
        (name = "Staff", description = "Staff management APIs"),
        (name = "Settings", description = "Lateness rules"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
