//! Payment Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Identified, Order, Ref, string_enum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Fonepay,
    NepalPay,
    Khalti,
}

string_enum!(PaymentMethod, "payment method", {
    Cash => "Cash",
    Card => "Card",
    Fonepay => "Fonepay",
    NepalPay => "NepalPay",
    Khalti => "Khalti",
});

impl PaymentMethod {
    /// Non-cash methods carry an external transaction id
    pub fn needs_transaction_id(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
    Failed,
    Refunded,
}

string_enum!(PaymentStatus, "payment", {
    Paid => "Paid",
    Pending => "Pending",
    Failed => "Failed",
    Refunded => "Refunded",
});

/// Payment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub order: Ref<Box<Order>>,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Payment {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Box<Order> {
    fn id(&self) -> &str {
        &self.id
    }
}

/// `POST /payments`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPayment {
    #[validate(length(min = 1))]
    pub order_id: String,
    pub payment_method: PaymentMethod,
    pub amount: Decimal,
    /// Staff member handling the payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handled_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// `PATCH /payments/:id/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
}

/// `POST /payments/:id/refund`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub amount: Decimal,
    #[validate(length(min = 1))]
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_by: Option<String>,
}

/// `GET /payments/reports/daily` query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySalesQuery {
    /// `YYYY-MM-DD`
    pub date: String,
}

/// Khalti initiation result: where to send the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KhaltiInitiation {
    #[serde(alias = "payment_url")]
    pub payment_url: String,
    #[serde(default)]
    pub pidx: Option<String>,
}
