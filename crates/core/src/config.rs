//! Engine runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the engine as an
//! `Arc<CoreConfig>`. Nothing in the engine reads environment variables while a wizard is
//! running.

use crate::constants::DEFAULT_AUTOSAVE_DEBOUNCE;
use crate::error::{WizardError, WizardResult};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    autosave_debounce: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidInput`] if `autosave_debounce` is zero, which would turn
    /// every keystroke into a save.
    pub fn new(autosave_debounce: Duration) -> WizardResult<Self> {
        if autosave_debounce.is_zero() {
            return Err(WizardError::InvalidInput(
                "autosave debounce interval cannot be zero".into(),
            ));
        }

        Ok(Self { autosave_debounce })
    }

    pub fn autosave_debounce(&self) -> Duration {
        self.autosave_debounce
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
        }
    }
}

/// Parse the autosave debounce interval (milliseconds) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_AUTOSAVE_DEBOUNCE`].
pub fn autosave_debounce_from_env_value(value: Option<String>) -> WizardResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(raw) = value else {
        return Ok(DEFAULT_AUTOSAVE_DEBOUNCE);
    };

    let millis = raw.parse::<u64>().map_err(|_| {
        WizardError::InvalidInput(format!(
            "autosave debounce must be a whole number of milliseconds, got '{}'",
            raw
        ))
    })?;

    if millis == 0 {
        return Err(WizardError::InvalidInput(
            "autosave debounce interval cannot be zero".into(),
        ));
    }

    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_debounce() {
        let err = CoreConfig::new(Duration::ZERO).expect_err("zero should be rejected");
        assert!(matches!(err, WizardError::InvalidInput(_)));
    }

    #[test]
    fn default_uses_three_second_debounce() {
        assert_eq!(
            CoreConfig::default().autosave_debounce(),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn env_value_absent_or_blank_uses_default() {
        assert_eq!(
            autosave_debounce_from_env_value(None).expect("default"),
            DEFAULT_AUTOSAVE_DEBOUNCE
        );
        assert_eq!(
            autosave_debounce_from_env_value(Some("   ".into())).expect("default"),
            DEFAULT_AUTOSAVE_DEBOUNCE
        );
    }

    #[test]
    fn env_value_parses_milliseconds() {
        assert_eq!(
            autosave_debounce_from_env_value(Some(" 1500 ".into())).expect("parse"),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn env_value_rejects_garbage_and_zero() {
        assert!(autosave_debounce_from_env_value(Some("soon".into())).is_err());
        assert!(autosave_debounce_from_env_value(Some("0".into())).is_err());
    }
}
