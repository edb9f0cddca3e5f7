//! `/payments` endpoints

use rust_decimal::Decimal;
use shared::models::{
    DailySalesQuery, KhaltiInitiation, Payment, PaymentStatus, PaymentStatusUpdate,
    ProcessPayment, RefundRequest,
};
use shared::{ListQuery, Page};
use validator::Validate;

use super::resource;
use crate::error::{ClientError, ClientResult};

resource!(PaymentsApi);

impl PaymentsApi {
    pub async fn process(&self, payment: &ProcessPayment) -> ClientResult<Payment> {
        payment.validate()?;
        if payment.payment_method.needs_transaction_id()
            && payment
                .transaction_id
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
        {
            return Err(ClientError::Validation(format!(
                "{} payments need a transaction id",
                payment.payment_method
            )));
        }
        tracing::info!(order_id = %payment.order_id, method = %payment.payment_method, "Processing payment");
        self.client.post("/payments", payment).await
    }

    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<Payment>> {
        self.client.get_page("/payments", query).await
    }

    pub async fn get(&self, payment_id: &str) -> ClientResult<Payment> {
        self.client.get(&format!("/payments/{payment_id}")).await
    }

    pub async fn by_order(&self, order_id: &str) -> ClientResult<Vec<Payment>> {
        self.client
            .get(&format!("/payments/order/{order_id}"))
            .await
    }

    pub async fn update_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> ClientResult<Payment> {
        self.client
            .patch(
                &format!("/payments/{payment_id}/status"),
                &PaymentStatusUpdate { status },
            )
            .await
    }

    pub async fn refund(&self, payment_id: &str, refund: &RefundRequest) -> ClientResult<Payment> {
        refund.validate()?;
        if refund.amount <= Decimal::ZERO {
            return Err(ClientError::Validation(
                "refund amount must be positive".into(),
            ));
        }
        self.client
            .post(&format!("/payments/{payment_id}/refund"), refund)
            .await
    }

    /// Daily sales report; the shape is report-specific, so it stays JSON
    pub async fn daily_report(&self, date: &str) -> ClientResult<serde_json::Value> {
        self.client
            .get_with(
                "/payments/reports/daily",
                &DailySalesQuery {
                    date: date.to_string(),
                },
            )
            .await
    }

    /// Start a Khalti checkout for an order; the caller opens `payment_url`
    pub async fn initiate_khalti(&self, order_id: &str) -> ClientResult<KhaltiInitiation> {
        self.client
            .post(
                "/payments/khalti/initiate",
                &serde_json::json!({ "orderId": order_id }),
            )
            .await
    }
}
