//! Environment-driven mode switches.
//!
//! These are consumed by the entrypoint, not by the core: the core receives
//! explicit values derived from them.

/// Setting this to `update` turns on update mode.
pub const MODE_ENV: &str = "SHOTDIFF_MODE";
/// Setting this to `1` opts out of telemetry.
pub const DISABLE_TELEMETRY_ENV: &str = "SHOTDIFF_DISABLE_TELEMETRY";

const UPDATE: &str = "update";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Switches {
    /// Current shots replace the baseline instead of being compared with it.
    pub update_mode: bool,
    pub telemetry_disabled: bool,
}
impl Switches {
    /// Reads the switches from the process environment. `cli_update` is
    /// whether the command line asked for update mode.
    pub fn from_env(cli_update: bool) -> Self {
        Self::from_lookup(cli_update, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(cli_update: bool, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            update_mode: cli_update || lookup(MODE_ENV).is_some_and(|mode| mode == UPDATE),
            telemetry_disabled: lookup(DISABLE_TELEMETRY_ENV).is_some_and(|value| value == "1"),
        }
    }
}
