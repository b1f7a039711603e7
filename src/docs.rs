use crate::api::admin::AssignTeam;
use crate::api::manager::DecisionComment;
use crate::auth::handlers::{ChangeRole, UpdateProfile};
use crate::model::expense::ExpenseRecord;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::model::team_assignment::TeamAssignment;
use crate::model::user::UserSummary;
use crate::models::{LoginReqDto, LoginResponse, RegisterReqDto};
use crate::service::expense::ExpenseSubmission;
use crate::service::leave_lifecycle::LeaveApplication;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeaveDesk API",
        version = "1.0.0",
        description = r#"
## Leave & Expense Management

Employees request time off and record expenses. Managers review the leave
requests of their team; approval deducts the days from the employee's yearly
balance in the same transaction.

### 🔹 Key Features
- **Accounts**
  - Register, login, token refresh and logout
- **Leave**
  - Apply, cancel while pending, view history and remaining balance
- **Manager review**
  - Pending queue, approve or reject with an optional comment
- **Expenses**
  - Submit and list personal expense records
- **Administration**
  - Change roles, assign employees to managers

### 🔐 Security
Everything under `/api` requires `Authorization: Bearer <access_token>`.
Roles are **employee**, **manager** and **admin**.

### 📦 Response Format
Errors are returned as `{"error": {"code", "message", "details"}}`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,
        crate::auth::handlers::update_me,
        crate::auth::handlers::set_user_role,

        crate::api::leave_request::apply_leave,
        crate::api::leave_request::leave_history,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_balance,

        crate::api::manager::pending_leaves,
        crate::api::manager::approve_leave,
        crate::api::manager::reject_leave,
        crate::api::manager::my_team,

        crate::api::expense::submit_expense,
        crate::api::expense::expense_history,

        crate::api::admin::assign_team,
        crate::api::admin::unassign_team
    ),
    components(
        schemas(
            RegisterReqDto,
            LoginReqDto,
            LoginResponse,
            UserSummary,
            UpdateProfile,
            ChangeRole,
            Role,
            LeaveType,
            LeaveStatus,
            LeaveApplication,
            LeaveRequest,
            LeaveBalance,
            DecisionComment,
            ExpenseSubmission,
            ExpenseRecord,
            AssignTeam,
            TeamAssignment
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Accounts and sessions"),
        (name = "Leave", description = "Leave requests and balances"),
        (name = "Manager", description = "Leave review for managers"),
        (name = "Expense", description = "Expense records"),
        (name = "Admin", description = "Roles and team structure"),
    )
)]
pub struct ApiDoc;
