use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {env_var}: {reason}")]
    Invalid { env_var: String, reason: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

// Convert a configuration key into the environment variable that sets it
pub fn to_env_var(field: &str) -> String {
    format!("CHATCORE_{}", field.to_uppercase().replace('.', "__"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("server.port"), "CHATCORE_SERVER__PORT");
        assert_eq!(
            to_env_var("limits.max_stream_lines"),
            "CHATCORE_LIMITS__MAX_STREAM_LINES"
        );
    }
}
