//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the canonical student table and raw uploads
    pub data_dir: PathBuf,

    /// Path of the serialized classifier artifact
    pub model_path: PathBuf,

    /// Frontend build directory for the static fallback
    pub frontend_dir: PathBuf,

    /// JWT secret key
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub token_ttl_hours: u64,

    /// Teacher allow-list as (email, password) pairs
    pub teachers: Vec<(String, String)>,

    /// Shared secret accepted for student logins
    pub student_secret: String,

    /// External training command, whitespace-separated
    pub train_command: String,

    /// Training timeout in seconds
    pub train_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model/model.json")),

            frontend_dir: env::var("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("../frontend/build")),

            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "CHANGE_THIS_SECRET".to_string()),

            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(8),

            teachers: parse_teachers(
                &env::var("TEACHER_LOGINS")
                    .unwrap_or_else(|_| "teacher@example.com:teacher123".to_string()),
            ),

            student_secret: env::var("STUDENT_SECRET")
                .unwrap_or_else(|_| "student123".to_string()),

            train_command: env::var("TRAIN_COMMAND")
                .unwrap_or_else(|_| String::new()),

            train_timeout_secs: env::var("TRAIN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),
        }
    }
}

/// `email:password` pairs separated by commas.
fn parse_teachers(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (email, password) = pair.split_once(':')?;
            let email = email.trim();
            if email.is_empty() {
                return None;
            }
            Some((email.to_string(), password.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_teacher_pairs() {
        let teachers = parse_teachers("a@x.com:pw1, b@y.com:pw2");
        assert_eq!(teachers.len(), 2);
        assert_eq!(teachers[0], ("a@x.com".to_string(), "pw1".to_string()));
        assert_eq!(teachers[1], ("b@y.com".to_string(), "pw2".to_string()));
    }

    #[test]
    fn skips_malformed_pairs() {
        let teachers = parse_teachers("nopassword,:missing,ok@x.com:pw");
        assert_eq!(teachers, vec![("ok@x.com".to_string(), "pw".to_string())]);
    }
}
