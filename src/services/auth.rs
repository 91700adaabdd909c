use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;

use crate::{
    error::ApiError,
    models::{
        auth::Claims,
        customer::{Customer, CustomerProfile, LoginResponse},
    },
    services::sanitize::sanitize,
};

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()-_+=<>?/|{}[]";

pub struct AuthService;

impl AuthService {
    /// Create a customer account. The display name starts empty and is
    /// back-filled the first time a consultation is submitted.
    pub async fn signup(
        pool: &PgPool,
        email: &str,
        password: &str,
        repeat_password: &str,
    ) -> Result<CustomerProfile, ApiError> {
        let email = sanitize(Some(email))
            .ok_or_else(|| ApiError::validation("Invalid characters in email"))?;
        if email.is_empty() {
            return Err(ApiError::validation("Email is required"));
        }

        if password != repeat_password {
            return Err(ApiError::validation("Passwords don't match"));
        }

        if !validate_password(password) {
            return Err(ApiError::validation(
                "Please enter at least one uppercase, lowercase, digit, and special character",
            ));
        }

        let password_hash =
            bcrypt::hash(password, 12).map_err(|e| ApiError::Internal(e.into()))?;

        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (full_name, email, password_hash)
             VALUES ('', $1, $2)
             RETURNING id, full_name, email, password_hash, created_at",
        )
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return ApiError::Conflict("Email already registered".into());
                }
            }
            ApiError::Database(e)
        })?;

        Ok(customer.into())
    }

    /// Verify credentials and mint an access token.
    pub async fn login(
        pool: &PgPool,
        email: &str,
        password: &str,
        jwt_secret: &str,
        access_ttl: u64,
    ) -> Result<LoginResponse, ApiError> {
        let email = sanitize(Some(email))
            .ok_or_else(|| ApiError::validation("Invalid characters in email"))?;

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, full_name, email, password_hash, created_at
             FROM customers WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::validation("Account does not exist with this email"))?;

        let valid = bcrypt::verify(password, &customer.password_hash)
            .map_err(|e| ApiError::Internal(e.into()))?;
        if !valid {
            return Err(ApiError::validation("Incorrect password"));
        }

        let access_token = generate_access_token(&customer, jwt_secret, access_ttl)
            .map_err(ApiError::Internal)?;

        Ok(LoginResponse {
            access_token,
            customer: customer.into(),
        })
    }

    /// Look a customer up by id. `None` means the principal no longer
    /// resolves to a row.
    pub async fn resolve_customer(
        pool: &PgPool,
        customer_id: i64,
    ) -> Result<Option<Customer>, ApiError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, full_name, email, password_hash, created_at
             FROM customers WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
        Ok(customer)
    }
}

/// Password policy: at least one uppercase, one lowercase, one digit and one
/// special character.
pub fn validate_password(password: &str) -> bool {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    has_upper && has_lower && has_digit && has_special
}

fn generate_access_token(
    customer: &Customer,
    secret: &str,
    ttl_seconds: u64,
) -> anyhow::Result<String> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: customer.id.to_string(),
        email: customer.email.clone(),
        iat: now,
        exp: now + ttl_seconds as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_policy_requires_all_four_classes() {
        assert!(validate_password("Sunny4@home"));
        assert!(!validate_password("sunny4@home")); // no uppercase
        assert!(!validate_password("SUNNY4@HOME")); // no lowercase
        assert!(!validate_password("Sunny@home")); // no digit
        assert!(!validate_password("Sunny4home")); // no special
        assert!(!validate_password(""));
    }
}
