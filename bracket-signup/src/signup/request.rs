use serde::Deserialize;

use crate::error::{SignupError, SignupResult};

/// Signup body posted by the form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// A competing band as entered on the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The slot a band asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredSlot {
    pub date: String,
    pub time: String,
}

impl DesiredSlot {
    /// Composite label as it appears in column A of the Scores table
    pub fn label(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// A signup that passed validation. Without a desired slot the band only
/// joins the waitlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub entrant: Entrant,
    pub desired: Option<DesiredSlot>,
}

/// Parses a raw request body
pub fn parse_signup(body: &[u8]) -> SignupResult<SignupRequest> {
    serde_json::from_slice(body).map_err(|e| SignupError::Validation(format!("could not parse signup: {e}")))
}

/// Validates a signup request
pub fn validate_signup(req: &SignupRequest) -> SignupResult<ValidSignup> {
    let name = req.name.trim();
    let email = req.email.trim();
    let phone = req.phone.trim();

    if name.is_empty() {
        return Err(SignupError::Validation("Band name is required".to_string()));
    }
    if email.is_empty() {
        return Err(SignupError::Validation("Email is required".to_string()));
    }
    if phone.is_empty() {
        return Err(SignupError::Validation("Phone is required".to_string()));
    }

    let present = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let desired = match (present(&req.date), present(&req.time)) {
        (Some(date), Some(time)) => Some(DesiredSlot { date, time }),
        (None, None) => None,
        _ => {
            return Err(SignupError::Validation(
                "Date and time must be given together".to_string(),
            ))
        }
    };

    Ok(ValidSignup {
        entrant: Entrant {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        },
        desired,
    })
}
