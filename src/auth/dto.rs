use serde::Serialize;
use serde_json::Value;

use crate::{
    error::AppError,
    validation::{self, FieldErrors},
};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Validated body of `POST /register`.
#[derive(Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Validated body of `POST /login`.
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

impl RegisterRequest {
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let body = validation::object(body)?;
        let mut errors = FieldErrors::new();
        let email = validation::email(&mut errors, body, "email");
        let password = validation::string(&mut errors, body, "password").filter(|p| {
            let long_enough = p.chars().count() >= MIN_PASSWORD_CHARS;
            if !long_enough {
                errors.add(
                    "password",
                    format!("Ensure this field has at least {MIN_PASSWORD_CHARS} characters."),
                );
            }
            long_enough
        });
        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Self { email, password }),
            _ => Err(errors.into_error()),
        }
    }
}

impl LoginRequest {
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let body = validation::object(body)?;
        let mut errors = FieldErrors::new();
        let email = validation::email(&mut errors, body, "email");
        let password = validation::string(&mut errors, body, "password");
        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Self { email, password }),
            _ => Err(errors.into_error()),
        }
    }
}
