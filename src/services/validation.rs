use std::collections::HashMap;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_BIO_LENGTH: usize = 500;

/// Field name → message, collected so a client sees every problem at once
pub type FieldErrors = HashMap<String, String>;

/// Usernames are stored trimmed
pub fn normalize_username(username: &str) -> String {
    username.trim().to_string()
}

/// Emails are stored trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    let length = username.chars().count();
    if length < MIN_USERNAME_LENGTH {
        return Err(format!("Username must be at least {} characters", MIN_USERNAME_LENGTH));
    }
    if length > MAX_USERNAME_LENGTH {
        return Err(format!("Username must be at most {} characters", MAX_USERNAME_LENGTH));
    }

    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("Invalid email format".to_string());
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), String> {
    if bio.chars().count() > MAX_BIO_LENGTH {
        return Err(format!("Bio must be at most {} characters", MAX_BIO_LENGTH));
    }
    Ok(())
}

/// Runs `check` and records its message under `field` on failure
pub fn collect(errors: &mut FieldErrors, field: &str, check: Result<(), String>) {
    if let Err(message) = check {
        errors.insert(field.to_string(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_bounds() {
        assert!(validate_username_format("").is_err());
        assert!(validate_username_format("ab").is_err());
        assert!(validate_username_format("abc").is_ok());
        assert!(validate_username_format(&"a".repeat(51)).is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email_format("test@example.com").is_ok());
        assert!(validate_email_format("test@example").is_err());
        assert!(validate_email_format("@example.com").is_err());
        assert!(validate_email_format("a@b@example.com").is_err());
        assert!(validate_email_format("te st@example.com").is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Test@Example.COM "), "test@example.com");
    }

    #[test]
    fn password_and_bio_limits() {
        assert!(validate_password_strength("12345").is_err());
        assert!(validate_password_strength("123456").is_ok());
        assert!(validate_bio(&"x".repeat(500)).is_ok());
        assert!(validate_bio(&"x".repeat(501)).is_err());
    }

    #[test]
    fn collect_records_only_failures() {
        let mut errors = FieldErrors::new();
        collect(&mut errors, "username", validate_username_format("ok_name"));
        collect(&mut errors, "password", validate_password_strength("123"));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("password"));
    }
}
