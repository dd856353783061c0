//! UPI deep links and QR image URLs for registration payments. Payment itself
//! is simulated: nothing here talks to a payment gateway.

use infra::models::TournamentRow;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub payee_vpa: String,
    pub payee_name: String,
    pub qr_service_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            payee_vpa: "tournament@upi".to_string(),
            payee_name: "BGMI Tournament".to_string(),
            qr_service_url: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
        }
    }
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            payee_vpa: std::env::var("UPI_PAYEE_VPA").unwrap_or(defaults.payee_vpa),
            payee_name: std::env::var("UPI_PAYEE_NAME").unwrap_or(defaults.payee_name),
            qr_service_url: std::env::var("UPI_QR_SERVICE_URL").unwrap_or(defaults.qr_service_url),
        }
    }

    pub fn payment_request(&self, tournament: &TournamentRow) -> PaymentRequest {
        let upi_string = upi_link(
            &self.payee_vpa,
            &self.payee_name,
            tournament.entry_fee,
            &format!("Tournament Registration - {}", tournament.title),
        );
        let qr_code_url = qr_code_url(&self.qr_service_url, &upi_string);

        PaymentRequest {
            upi_string,
            qr_code_url,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub upi_string: String,
    pub qr_code_url: String,
}

/// `upi://pay` link in INR. Payee name and note are percent-encoded.
pub fn upi_link(payee_vpa: &str, payee_name: &str, amount: i32, note: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR&tn={}",
        payee_vpa,
        urlencoding::encode(payee_name),
        amount,
        urlencoding::encode(note)
    )
}

/// 300x300 QR image encoding `data`.
pub fn qr_code_url(service_url: &str, data: &str) -> String {
    format!(
        "{}?size=300x300&data={}",
        service_url,
        urlencoding::encode(data)
    )
}
