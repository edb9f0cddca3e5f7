//! Typed endpoints, one module per backend resource
//!
//! Each resource is a thin handle over a cloned [`ApiClient`]; the client
//! itself is an `Arc`, so handles are cheap to create and pass around.

/// Declares a resource handle wrapping an [`ApiClient`]
macro_rules! resource {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            client: $crate::http::ApiClient,
        }

        impl $name {
            pub fn new(client: $crate::http::ApiClient) -> Self {
                Self { client }
            }
        }
    };
}

pub(crate) use resource;

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod menu;
pub mod orders;
pub mod password;
pub mod payments;
pub mod qr;
pub mod roles;
pub mod tables;
pub mod users;

pub use auth::AuthApi;
pub use categories::CategoriesApi;
pub use dashboard::DashboardApi;
pub use menu::MenuApi;
pub use orders::OrdersApi;
pub use password::PasswordApi;
pub use payments::PaymentsApi;
pub use qr::QrApi;
pub use roles::RolesApi;
pub use tables::TablesApi;
pub use users::UsersApi;

use crate::http::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn password(&self) -> PasswordApi {
        PasswordApi::new(self.clone())
    }

    pub fn orders(&self) -> OrdersApi {
        OrdersApi::new(self.clone())
    }

    pub fn tables(&self) -> TablesApi {
        TablesApi::new(self.clone())
    }

    pub fn menu(&self) -> MenuApi {
        MenuApi::new(self.clone())
    }

    pub fn categories(&self) -> CategoriesApi {
        CategoriesApi::new(self.clone())
    }

    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    pub fn roles(&self) -> RolesApi {
        RolesApi::new(self.clone())
    }

    pub fn payments(&self) -> PaymentsApi {
        PaymentsApi::new(self.clone())
    }

    pub fn dashboard(&self) -> DashboardApi {
        DashboardApi::new(self.clone())
    }

    pub fn qr(&self) -> QrApi {
        QrApi::new(self.clone())
    }
}
