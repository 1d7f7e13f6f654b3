//! Type-level configuration for a settings schema.

use serde::{Deserialize, Serialize};

use crate::settings::providers::AdditionalGetter;

/// How keys that match no declared field are treated.
///
/// # Examples
///
/// ```
/// use envsettings::settings::ExtraPolicy;
///
/// assert_eq!(ExtraPolicy::default(), ExtraPolicy::Forbid);
/// assert!(!ExtraPolicy::Forbid.tolerates_unknown());
/// assert!(ExtraPolicy::Ignore.tolerates_unknown());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPolicy {
    /// Unknown keys are rejected.
    #[default]
    Forbid,
    /// Unknown keys are kept in the final mapping.
    Allow,
    /// Unknown keys are accepted by sources but dropped on validation.
    Ignore,
}

impl ExtraPolicy {
    /// Whether normalization lets unknown keys through.
    #[must_use]
    pub const fn tolerates_unknown(self) -> bool {
        matches!(self, Self::Allow | Self::Ignore)
    }
}

/// Immutable configuration attached to a settings schema.
///
/// # Examples
///
/// ```
/// use envsettings::settings::{ExtraPolicy, SettingsConfig};
///
/// let config = SettingsConfig::new()
///     .with_env_prefix("APP_")
///     .with_case_sensitive(true)
///     .with_extra(ExtraPolicy::Allow);
///
/// assert_eq!(config.env_prefix(), "APP_");
/// assert!(config.case_sensitive());
/// assert!(config.getters().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettingsConfig {
    env_prefix: String,
    case_sensitive: bool,
    extra: ExtraPolicy,
    getters: Vec<AdditionalGetter>,
}

impl SettingsConfig {
    /// Create a configuration with the defaults: no prefix, case-insensitive,
    /// unknown keys forbidden, no auxiliary getters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix applied to default environment variable names.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Set whether environment and source keys are matched case-sensitively.
    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set the extra-key policy.
    #[must_use]
    pub fn with_extra(mut self, extra: ExtraPolicy) -> Self {
        self.extra = extra;
        self
    }

    /// Register an auxiliary getter after any already registered.
    ///
    /// Later getters override earlier ones for the same key.
    #[must_use]
    pub fn with_getter(mut self, getter: AdditionalGetter) -> Self {
        self.getters.push(getter);
        self
    }

    /// The environment variable prefix.
    #[must_use]
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Whether matching is case-sensitive.
    #[must_use]
    pub const fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The extra-key policy.
    #[must_use]
    pub const fn extra(&self) -> ExtraPolicy {
        self.extra
    }

    /// Registered auxiliary getters in registration order.
    #[must_use]
    pub fn getters(&self) -> &[AdditionalGetter] {
        &self.getters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SettingsConfig::new();
        assert_eq!(config.env_prefix(), "");
        assert!(!config.case_sensitive());
        assert_eq!(config.extra(), ExtraPolicy::Forbid);
        assert!(config.getters().is_empty());
    }

    #[test]
    fn test_getters_keep_registration_order() {
        let config = SettingsConfig::new()
            .with_getter(AdditionalGetter::new("first", || Ok(Default::default())))
            .with_getter(AdditionalGetter::new("second", || Ok(Default::default())));

        let names: Vec<_> = config.getters().iter().map(AdditionalGetter::name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_extra_policy_serde() {
        let policy: ExtraPolicy = serde_yaml::from_str("ignore").unwrap();
        assert_eq!(policy, ExtraPolicy::Ignore);
        assert!(serde_yaml::from_str::<ExtraPolicy>("maybe").is_err());
    }
}
