use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const MESSAGE_MIN_CHARS: usize = 10;

// local@domain.tld: no whitespace, a single '@', a dot in the domain part.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// The three contact fields as they arrived, before any trimming.
///
/// Only JSON strings count; anything else is treated as a missing field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    pub fn from_value(body: &Value) -> Self {
        Self {
            name: field(body, &["name", "nombre"]),
            email: field(body, &["email"]),
            message: field(body, &["message", "mensaje"]),
        }
    }
}

fn field(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub errors: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate(name: Option<&str>, email: Option<&str>, message: Option<&str>) -> Validation {
    let mut errors = Vec::new();

    match name.map(str::trim).filter(|s| !s.is_empty()) {
        None => errors.push("name is required".to_string()),
        Some(name) if name.chars().count() > NAME_MAX_CHARS => {
            errors.push(format!("name must be at most {NAME_MAX_CHARS} characters"));
        }
        Some(_) => {}
    }

    match email.map(str::trim).filter(|s| !s.is_empty()) {
        None => errors.push("email is required".to_string()),
        Some(email) if email.chars().count() > EMAIL_MAX_CHARS => {
            errors.push(format!("email must be at most {EMAIL_MAX_CHARS} characters"));
        }
        Some(email) if !EMAIL_RE.is_match(email) => {
            errors.push("email is not a valid address".to_string());
        }
        Some(_) => {}
    }

    match message.map(str::trim).filter(|s| !s.is_empty()) {
        None => errors.push("message is required".to_string()),
        Some(message) if message.chars().count() < MESSAGE_MIN_CHARS => {
            errors.push(format!(
                "message must be at least {MESSAGE_MIN_CHARS} characters"
            ));
        }
        Some(_) => {}
    }

    Validation { errors }
}
