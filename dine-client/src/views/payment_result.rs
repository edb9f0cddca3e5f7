//! Outcome page after an online payment redirect

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Failed,
    Error,
}

impl PaymentOutcome {
    /// Unknown or missing values count as `Error`
    pub fn parse(status: Option<&str>) -> Self {
        match status {
            Some("success") => PaymentOutcome::Success,
            Some("failed") => PaymentOutcome::Failed,
            _ => PaymentOutcome::Error,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => "Payment Successful!",
            PaymentOutcome::Failed => "Payment Failed",
            PaymentOutcome::Error => "Something Went Wrong",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => {
                "Your payment has been processed. Thank you for dining with us!"
            }
            PaymentOutcome::Failed => {
                "Your payment could not be processed. Please try again or pay with cash."
            }
            PaymentOutcome::Error => {
                "We could not verify your payment. Please contact a staff member."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResult {
    pub outcome: PaymentOutcome,
    /// Server-supplied message, shown instead of the default description
    pub message: Option<String>,
    pub table_number: Option<u32>,
}

impl PaymentResult {
    /// Parse the redirect's query string (with or without the leading `?`)
    pub fn from_query(query: &str, table_number: Option<u32>) -> Self {
        let params: HashMap<String, String> = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(k), decode_component(v))
            })
            .collect();

        Self {
            outcome: PaymentOutcome::parse(params.get("status").map(String::as_str)),
            message: params.get("message").filter(|m| !m.is_empty()).cloned(),
            table_number,
        }
    }

    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.outcome.description())
    }
}

/// `+` is a space in form-encoded queries; undecodable input is kept as-is
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
