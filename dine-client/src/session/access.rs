//! Per-view role allow-lists

use shared::models::RoleName;

use super::SessionState;

const ALL_STAFF: &[RoleName] = &[
    RoleName::Admin,
    RoleName::Manager,
    RoleName::Waiter,
    RoleName::Chef,
    RoleName::KitchenStaff,
];
const KITCHEN: &[RoleName] = &[
    RoleName::Admin,
    RoleName::Manager,
    RoleName::Chef,
    RoleName::KitchenStaff,
];
const ADMIN_MANAGER: &[RoleName] = &[RoleName::Admin, RoleName::Manager];
const ADMIN: &[RoleName] = &[RoleName::Admin];

/// Staff-facing screens that sit behind the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaffView {
    Dashboard,
    RealTime,
    Analytics,
    Orders,
    OrderDetail,
    Kitchen,
    Menu,
    MenuEdit,
    Categories,
    CategoryEdit,
    Tables,
    TableEdit,
    QrCodes,
    Payments,
    PaymentDetail,
    ProcessPayment,
    DailySales,
    Users,
    UserDetail,
    UserCreate,
    Roles,
    Profile,
    ChangePassword,
}

impl StaffView {
    pub fn allowed_roles(&self) -> &'static [RoleName] {
        match self {
            StaffView::Kitchen => KITCHEN,
            StaffView::Analytics
            | StaffView::Menu
            | StaffView::MenuEdit
            | StaffView::Categories
            | StaffView::CategoryEdit
            | StaffView::TableEdit
            | StaffView::DailySales
            | StaffView::Users
            | StaffView::UserDetail => ADMIN_MANAGER,
            StaffView::UserCreate | StaffView::Roles => ADMIN,
            StaffView::Dashboard
            | StaffView::RealTime
            | StaffView::Orders
            | StaffView::OrderDetail
            | StaffView::Tables
            | StaffView::QrCodes
            | StaffView::Payments
            | StaffView::PaymentDetail
            | StaffView::ProcessPayment
            | StaffView::Profile
            | StaffView::ChangePassword => ALL_STAFF,
        }
    }

    pub fn allows(&self, role: Option<RoleName>) -> bool {
        role.is_some_and(|role| self.allowed_roles().contains(&role))
    }
}

/// Outcome of checking a view against the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Still verifying; show a spinner, decide later
    Pending,
    LoginRequired,
    Denied,
}

pub fn check(state: &SessionState, view: StaffView) -> Access {
    if state.is_loading {
        return Access::Pending;
    }
    match &state.user {
        None => Access::LoginRequired,
        Some(user) if view.allows(user.role_name()) => Access::Granted,
        Some(_) => Access::Denied,
    }
}
