//! Outbound contact links for the marketing pages.

use std::fmt;
use std::str::FromStr;

use crate::config::ClinicConfig;
use crate::error::{AppError, Result};

const WHATSAPP_SEND: &str = "https://api.whatsapp.com/send";

/// Canned WhatsApp openers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPurpose {
    Booking,
    Question,
    Consultation,
}

impl ContactPurpose {
    pub const ALL: [ContactPurpose; 3] = [
        ContactPurpose::Booking,
        ContactPurpose::Question,
        ContactPurpose::Consultation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPurpose::Booking => "booking",
            ContactPurpose::Question => "question",
            ContactPurpose::Consultation => "consultation",
        }
    }

    /// Message text for a clinic.
    pub fn message(&self, clinic_name: &str) -> String {
        match self {
            ContactPurpose::Booking => {
                format!("Assalamualaikum, saya ingin booking terapi bekam di {clinic_name}")
            }
            ContactPurpose::Question => format!("Assalamualaikum, saya ingin bertanya tentang {clinic_name}"),
            ContactPurpose::Consultation => "Assalamualaikum, saya ingin konsultasi tentang terapi bekam".to_string(),
        }
    }
}

impl fmt::Display for ContactPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactPurpose {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ContactPurpose::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::validation(format!("Unknown contact purpose '{s}'")))
    }
}

/// WhatsApp deep link for `phone` with a prefilled `text`.
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!("{WHATSAPP_SEND}?phone={phone}&text={}", urlencoding::encode(text))
}

/// Contact links of the configured clinic.
pub struct ContactLinks<'a> {
    clinic: &'a ClinicConfig,
}

impl<'a> ContactLinks<'a> {
    pub fn new(clinic: &'a ClinicConfig) -> Self {
        Self { clinic }
    }

    pub fn whatsapp(&self, purpose: ContactPurpose) -> String {
        whatsapp_link(&self.clinic.whatsapp_phone, &purpose.message(&self.clinic.name))
    }

    pub fn maps(&self) -> &str {
        &self.clinic.maps_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_link() {
        let clinic = ClinicConfig::default();
        let link = ContactLinks::new(&clinic).whatsapp(ContactPurpose::Booking);
        assert_eq!(
            link,
            "https://api.whatsapp.com/send?phone=6287854179686&text=Assalamualaikum%2C%20saya%20ingin%20booking%20terapi%20bekam%20di%20Rumah%20Sehat%20Al-Fatih"
        );
    }

    #[test]
    fn test_links_encode_messages() {
        let link = whatsapp_link("628", "a&b=c ?");
        assert_eq!(link, "https://api.whatsapp.com/send?phone=628&text=a%26b%3Dc%20%3F");
    }

    #[test]
    fn test_purpose_parse_and_maps() {
        assert_eq!("Consultation".parse::<ContactPurpose>().unwrap(), ContactPurpose::Consultation);
        assert!("spam".parse::<ContactPurpose>().is_err());

        let clinic = ClinicConfig::default();
        assert_eq!(ContactLinks::new(&clinic).maps(), "https://share.google/4pWbyv6nZofVgRNCb");
    }
}
