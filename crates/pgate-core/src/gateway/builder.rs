//! Builder for creating and configuring Gateway instances.

use super::Gateway;
use crate::config::{Profile, ProfileOverrides};

/// Builder for creating and configuring Gateway instances.
#[derive(Debug, Clone, Default)]
pub struct GatewayBuilder {
    defaults: Option<Profile>,
    overrides: Option<ProfileOverrides>,
}

impl GatewayBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base profile every call starts from.
    ///
    /// If not specified, [`Profile::from_env`] is used.
    pub fn with_defaults(mut self, defaults: Profile) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Sets the process-wide override applied on top of the defaults.
    pub fn with_overrides(mut self, overrides: ProfileOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Builds the configured gateway instance.
    pub fn build(self) -> Gateway {
        Gateway::new(self.defaults.unwrap_or_else(Profile::from_env), self.overrides)
    }
}
