use std::str::FromStr;

use tracing::warn;

const TRACE_LAYOUT_VAR: &str = "LUMEN_TRACE_LAYOUT";
const MAX_PASS_ITERATIONS_VAR: &str = "LUMEN_MAX_PASS_ITERATIONS";
const CLOCK_POOL_CAPACITY_VAR: &str = "LUMEN_CLOCK_POOL_CAPACITY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Emit a `trace!` event for every element a pass recomputes.
    pub trace_layout: bool,
    /// Upper bound on elements processed by one queue drain.
    pub max_pass_iterations: usize,
    /// Idle clocks kept per pooled type.
    pub clock_pool_capacity: usize,
    pub wrap_tab_navigation: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            trace_layout: false,
            max_pass_iterations: 100_000,
            clock_pool_capacity: 64,
            wrap_tab_navigation: true,
        }
    }
}

impl LayoutConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trace_layout: std::env::var(TRACE_LAYOUT_VAR).is_ok(),
            max_pass_iterations: parse_env(MAX_PASS_ITERATIONS_VAR)
                .unwrap_or(defaults.max_pass_iterations),
            clock_pool_capacity: parse_env(CLOCK_POOL_CAPACITY_VAR)
                .unwrap_or(defaults.clock_pool_capacity),
            ..defaults
        }
    }

    pub fn with_trace_layout(mut self, enabled: bool) -> Self {
        self.trace_layout = enabled;
        self
    }

    pub fn with_max_pass_iterations(mut self, limit: usize) -> Self {
        self.max_pass_iterations = limit;
        self
    }

    pub fn with_clock_pool_capacity(mut self, capacity: usize) -> Self {
        self.clock_pool_capacity = capacity;
        self
    }

    pub fn with_wrap_tab_navigation(mut self, wrap: bool) -> Self {
        self.wrap_tab_navigation = wrap;
        self
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparsable layout setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = LayoutConfig::default()
            .with_max_pass_iterations(10)
            .with_clock_pool_capacity(2)
            .with_wrap_tab_navigation(false)
            .with_trace_layout(true);
        assert_eq!(config.max_pass_iterations, 10);
        assert_eq!(config.clock_pool_capacity, 2);
        assert!(!config.wrap_tab_navigation);
        assert!(config.trace_layout);
    }

    #[test]
    fn unparsable_env_value_is_ignored() {
        assert_eq!(parse_env::<usize>("LUMEN_TEST_UNSET_VARIABLE"), None);
    }
}
