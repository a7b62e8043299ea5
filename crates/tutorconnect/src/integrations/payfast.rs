//! PayFast redirect payload.
//!
//! Only the form a client would post to PayFast is built here. Nothing is
//! submitted and no signature is computed: payment itself is simulated by the
//! booking flow and always succeeds.

use serde::Serialize;

use crate::booking::FeeBreakdown;
use crate::config::PayFastConfig;
use crate::model::User;

/// Hidden form fields, in the order PayFast documents them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayFastRequest {
    pub merchant_id: String,
    pub merchant_key: String,
    pub return_url: String,
    pub cancel_url: String,
    pub notify_url: String,
    pub name_first: String,
    pub email_address: String,
    pub m_payment_id: String,
    /// Rand with two decimals
    pub amount: String,
    pub item_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayFastRedirect {
    pub action: String,
    pub method: &'static str,
    pub fields: PayFastRequest,
    /// Always false
    pub submitted: bool,
}

pub fn build_redirect(
    config: &PayFastConfig,
    payer: &User,
    payment_id: &str,
    teacher_name: &str,
    fees: &FeeBreakdown,
) -> PayFastRedirect {
    let profile = payer.profile();
    let name_first = profile
        .name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();

    PayFastRedirect {
        action: config.process_url.clone(),
        method: "POST",
        fields: PayFastRequest {
            merchant_id: config.merchant_id.clone(),
            merchant_key: config.merchant_key.clone(),
            return_url: config.return_url.clone(),
            cancel_url: config.cancel_url.clone(),
            notify_url: config.notify_url.clone(),
            name_first,
            email_address: profile.email.clone(),
            m_payment_id: payment_id.to_string(),
            amount: fees.total_as_decimal(),
            item_name: format!("Lesson with {}", teacher_name),
        },
        submitted: false,
    }
}
