//! Input checks for the sign-up and sign-in forms.

use crate::error::AuthError;
use crate::model::Registration;

/// Minimum password length; configuration can raise it but never lower it
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim and lower-case an email; this is the uniqueness key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a sign-up form and return a cleaned copy.
///
/// The returned registration has a normalized email, trimmed names and a
/// blank phone collapsed to `None`. The password is kept verbatim.
pub fn validate_registration(
    candidate: &Registration,
    min_password_len: usize,
) -> Result<Registration, AuthError> {
    let first_name = candidate.first_name.trim();
    if first_name.is_empty() {
        return Err(AuthError::validation("Please enter your first name."));
    }

    let last_name = candidate.last_name.trim();
    if last_name.is_empty() {
        return Err(AuthError::validation("Please enter your last name."));
    }

    let email = normalize_email(&candidate.email);
    if email.is_empty() {
        return Err(AuthError::validation("Please enter your email address."));
    }
    if !email.contains('@') {
        return Err(AuthError::validation("Please enter a valid email address."));
    }

    if candidate.password.trim().is_empty() {
        return Err(AuthError::validation("Please enter a password."));
    }
    let min_password_len = min_password_len.max(MIN_PASSWORD_LEN);
    if candidate.password.chars().count() < min_password_len {
        return Err(AuthError::validation(format!(
            "Password must be at least {} characters long.",
            min_password_len
        )));
    }

    let phone = candidate
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Ok(Registration {
        email,
        password: candidate.password.clone(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone,
    })
}

/// Both sign-in fields must be present
pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(AuthError::validation(
            "Please enter your email and password",
        ));
    }
    Ok(())
}

/// Compare the password with its confirmation field
pub fn check_password_confirmation(password: &str, confirm: &str) -> Result<(), AuthError> {
    if password != confirm {
        return Err(AuthError::validation("Passwords do not match."));
    }
    Ok(())
}
