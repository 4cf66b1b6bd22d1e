//! Policy checks for newly chosen passwords.

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Checks a new password; the first violation is returned as `Validation`.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        let classes = [
            password.chars().any(char::is_uppercase),
            password.chars().any(char::is_lowercase),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_alphanumeric()),
        ];
        if classes.iter().filter(|present| **present).count() < 3 {
            return Err(AppError::validation(
                "Password must mix at least three of: uppercase, lowercase, digits, symbols",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if estimate.score() < zxcvbn::Score::Three {
            return Err(AppError::validation(
                "Password is too easy to guess; choose a longer or less common one",
            ));
        }

        Ok(())
    }

    /// Rejects a new password equal to the current one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> AppResult<()> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_accepts_strong_password() {
        assert!(validator().validate("Corr3ct-Horse-Battery").is_ok());
    }

    #[test]
    fn test_rejects_short_and_single_class() {
        let v = validator();
        assert!(v.validate("Ab1!").is_err());
        assert!(v.validate("alllowercaseletters").is_err());
    }

    #[test]
    fn test_rejects_common_password() {
        assert!(validator().validate("Password1").is_err());
    }

    #[test]
    fn test_rejects_same_password() {
        assert!(validator().validate_not_same("a", "a").is_err());
        assert!(validator().validate_not_same("a", "b").is_ok());
    }
}
