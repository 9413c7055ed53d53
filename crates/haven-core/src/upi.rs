//! # UPI Payment Links
//!
//! Construction of UPI deep links and the QR-image fallback URL.
//!
//! This module only builds strings. Rendering a QR code, opening a wallet
//! app, and confirming a payment all happen on the UI side; the data layer
//! hands over ready-made URIs.
//!
//! ## Link Shapes
//! ```text
//! upi://pay?pa=<payee>&pn=<name>&am=<amount>&cu=INR      generic UPI
//! tez://upi/pay?...                                      Google Pay
//! phonepe://pay?...                                      PhonePe
//! paytmmp://pay?...                                      Paytm
//! https://api.qrserver.com/v1/create-qr-code/?...        QR image fallback
//! ```

use url::Url;

/// Merchant UPI id payments are addressed to.
pub const UPI_PAYEE_ID: &str = "sridharani916@okaxis";

/// Merchant display name carried in the link.
pub const UPI_PAYEE_NAME: &str = "DesignHaven";

/// Currency code carried in the link.
pub const UPI_CURRENCY: &str = "INR";

/// QR image rendering service used when no local encoder is available.
const QR_API_BASE: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Wallet apps the storefront offers one-tap payment buttons for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentApp {
    GooglePay,
    PhonePe,
    Paytm,
}

impl PaymentApp {
    /// Scheme-and-path prefix of the app's deep link.
    fn link_prefix(&self) -> &'static str {
        match self {
            PaymentApp::GooglePay => "tez://upi/pay",
            PaymentApp::PhonePe => "phonepe://pay",
            PaymentApp::Paytm => "paytmmp://pay",
        }
    }
}

/// Formats an amount the way the links carry it: no trailing `.0`, no
/// thousands separators.
fn format_amount(amount: f64) -> String {
    format!("{}", amount)
}

fn pay_query(amount: f64) -> String {
    format!(
        "pa={}&pn={}&am={}&cu={}",
        UPI_PAYEE_ID,
        UPI_PAYEE_NAME,
        format_amount(amount),
        UPI_CURRENCY
    )
}

/// The generic `upi://pay` deep link for an amount.
pub fn payment_link(amount: f64) -> String {
    format!("upi://pay?{}", pay_query(amount))
}

/// The wallet-specific deep link for an amount.
///
/// If the app is not installed the UI falls back to [`payment_link`].
pub fn app_link(app: PaymentApp, amount: f64) -> String {
    format!("{}?{}", app.link_prefix(), pay_query(amount))
}

/// URL of a rendered QR image for a UPI link, via the qrserver web API.
///
/// Used when no client-side QR encoder is available; the final fallback
/// below this is showing [`UPI_PAYEE_ID`] as plain text.
pub fn qr_image_url(upi_link: &str) -> String {
    let url = Url::parse_with_params(
        QR_API_BASE,
        &[("size", "250x250"), ("data", upi_link)],
    )
    .expect("QR base URL is valid");
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_link() {
        assert_eq!(
            payment_link(2499.0),
            "upi://pay?pa=sridharani916@okaxis&pn=DesignHaven&am=2499&cu=INR"
        );
    }

    #[test]
    fn test_fractional_amount_keeps_decimals() {
        assert_eq!(
            payment_link(2499.5),
            "upi://pay?pa=sridharani916@okaxis&pn=DesignHaven&am=2499.5&cu=INR"
        );
    }

    #[test]
    fn test_app_links() {
        assert!(app_link(PaymentApp::GooglePay, 100.0).starts_with("tez://upi/pay?"));
        assert!(app_link(PaymentApp::PhonePe, 100.0).starts_with("phonepe://pay?"));
        assert!(app_link(PaymentApp::Paytm, 100.0).starts_with("paytmmp://pay?"));
    }

    #[test]
    fn test_qr_image_url_encodes_link() {
        let url = qr_image_url(&payment_link(100.0));
        assert!(url.starts_with("https://api.qrserver.com/v1/create-qr-code/?"));
        assert!(url.contains("size=250x250"));
        // The UPI link itself must be percent-encoded into the data param.
        assert!(url.contains("data=upi%3A%2F%2Fpay"));
    }
}
