//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("emergencies.{0}.name must not be empty")]
    EmptyCategoryName(String),
    #[error("emergencies.{0}: dispatch_par ({1}) exceeds dispatch_cap ({2})")]
    ParExceedsCap(String, u32, u32),
    #[error("dispatch.sweep_interval_secs must be greater than zero")]
    ZeroSweepInterval,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (key, category) in &config.emergencies {
        if category.name.trim().is_empty() {
            errors.push(ValidationError::EmptyCategoryName(key.clone()));
        }
        // Cap values below 1 are coerced later, so validate par against the
        // effective cap.
        let cap = category.dispatch_cap.max(1);
        if category.dispatch_par > cap {
            errors.push(ValidationError::ParExceedsCap(
                key.clone(),
                category.dispatch_par,
                cap,
            ));
        }
    }

    if config.dispatch.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = parse(
            r#"
            [emergencies.bad]
            name = "  "
            "#,
        );
        let errors = validate(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyCategoryName("bad".into())));
    }

    #[test]
    fn test_par_beyond_cap_rejected() {
        let config = parse(
            r#"
            [emergencies.riot]
            name = "Riot"
            dispatch_cap = 2
            dispatch_par = 5
            "#,
        );
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ParExceedsCap("riot".into(), 5, 2)]);
    }

    #[test]
    fn test_all_errors_reported_at_once() {
        let config = parse(
            r#"
            [dispatch]
            sweep_interval_secs = 0

            [emergencies.bad]
            name = ""
            "#,
        );
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
