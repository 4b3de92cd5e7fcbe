use std::fmt;

/// Form field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Username => f.write_str("username"),
            Field::Password => f.write_str("password"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0} must not be empty")]
    EmptyField(Field),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("user already exists")]
    DuplicateUser,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error("password hashing failed: {0}")]
    Hash(#[from] argon2::password_hash::Error),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error("session store: {0}")]
    Session(#[source] anyhow::Error),
}

impl AuthError {
    /// Text flashed on the form, or `None` when the failure is ours rather
    /// than the user's. Unknown user and wrong password read the same.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            AuthError::EmptyField(Field::Username) => Some("Must provide username"),
            AuthError::EmptyField(Field::Password) => Some("Must provide password"),
            AuthError::PasswordMismatch => Some("Passwords do not match"),
            AuthError::DuplicateUser => Some("Username already exists"),
            AuthError::UserNotFound | AuthError::InvalidPassword => {
                Some("Invalid username or password")
            }
            AuthError::Hash(_) | AuthError::Store(_) | AuthError::Session(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failures_share_one_message() {
        assert_eq!(
            AuthError::UserNotFound.user_message(),
            AuthError::InvalidPassword.user_message()
        );
    }

    #[test]
    fn store_errors_are_not_user_facing() {
        assert!(AuthError::Store(sqlx::Error::RowNotFound).user_message().is_none());
        assert!(AuthError::Session(anyhow::anyhow!("gone")).user_message().is_none());
    }
}
