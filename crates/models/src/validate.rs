//! Field-level validation helpers shared by entities and services.

use crate::errors::ModelError;

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::Validation(msg.into())
}

/// Lowercase and trim an email, then check its shape (`local@domain.tld`).
pub fn normalize_email(email: &str) -> Result<String, ModelError> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@').ok_or_else(|| invalid("invalid email"))?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid("invalid email"));
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid("invalid email"));
    }
    Ok(email)
}

/// Letters, digits and underscores only; 3 to 150 characters.
pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let len = username.chars().count();
    if !(3..=150).contains(&len) {
        return Err(invalid("username must be between 3 and 150 characters"));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("username can only contain letters, numbers, and underscores"));
    }
    Ok(())
}

/// Phone numbers of the form `+999999999`: optional `+`, optional leading `1`, then 9 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let ok = digits.chars().all(|c| c.is_ascii_digit())
        && match digits.len() {
            9..=15 => true,
            16 => digits.starts_with('1'),
            _ => false,
        };
    if ok {
        Ok(())
    } else {
        Err(invalid("phone number must be entered in the format '+999999999', up to 15 digits"))
    }
}

pub fn required(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(())
}

pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.chars().count() > max {
        return Err(invalid(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

/// Password must be 8+ characters and equal its confirmation.
pub fn password_pair(password: &str, confirm: &str) -> Result<(), ModelError> {
    if password.chars().count() < 8 {
        return Err(invalid("password must be at least 8 characters"));
    }
    if password != confirm {
        return Err(invalid("passwords don't match"));
    }
    Ok(())
}

/// Round to cents. Negative zero collapses to `0.0`.
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0 + 0.0
}

pub fn non_negative_money(field: &str, amount: f64) -> Result<f64, ModelError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid(format!("{field} must be zero or greater")));
    }
    Ok(round_money(amount))
}

pub fn positive_money(field: &str, amount: f64) -> Result<f64, ModelError> {
    let rounded = non_negative_money(field, amount)?;
    if rounded < 0.01 {
        return Err(invalid(format!("{field} must be at least 0.01")));
    }
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased_and_checked() {
        assert_eq!(normalize_email("  Bob@Example.COM ").unwrap(), "bob@example.com");
        assert!(normalize_email("bob").is_err());
        assert!(normalize_email("bob@localhost").is_err());
        assert!(normalize_email("@x.com").is_err());
        assert!(normalize_email("a b@x.com").is_err());
        assert!(normalize_email("a@b@x.com").is_err());
    }

    #[test]
    fn username_charset() {
        assert!(validate_username("shop_owner_1").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has-dash").is_err());
        assert!(validate_username("space here").is_err());
    }

    #[test]
    fn phone_shapes() {
        assert!(validate_phone("+919876543210").is_ok());
        assert!(validate_phone("987654321").is_ok());
        assert!(validate_phone("1234567890123456").is_ok());
        assert!(validate_phone("9234567890123456").is_err());
        assert!(validate_phone("12345678").is_err());
        assert!(validate_phone("+91-98765").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(password_pair("Secret123", "Secret123").is_ok());
        assert!(password_pair("short", "short").is_err());
        assert!(password_pair("Secret123", "Secret124").is_err());
    }

    #[test]
    fn money_rounding_and_bounds() {
        assert_eq!(round_money(10.005_1), 10.01);
        assert_eq!(non_negative_money("amount", 0.0).unwrap(), 0.0);
        assert!(non_negative_money("amount", -1.0).is_err());
        assert!(positive_money("amount", 0.001).is_err());
        assert_eq!(positive_money("amount", 299.999).unwrap(), 300.0);
    }
}
