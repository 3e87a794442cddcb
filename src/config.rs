//! Debug output switches.
//!
//! Both switches default to off. Environment variables turn them on for every run; the
//! command-line flags applied by the binary take precedence over the environment.

/// Environment variable enabling the post-compile listing.
pub const PRINT_CODE_ENV: &str = "CLOX_PRINT_CODE";

/// Environment variable enabling per-instruction tracing.
pub const TRACE_ENV: &str = "CLOX_TRACE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Print the chunk disassembly after a successful compile.
    pub print_code: bool,
    /// Print the stack and the next instruction before executing it.
    pub trace_execution: bool,
}

impl Config {
    /// Read the switches from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the switches through `lookup`, so tests need not touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            print_code: lookup(PRINT_CODE_ENV).is_some_and(|v| is_truthy(&v)),
            trace_execution: lookup(TRACE_ENV).is_some_and(|v| is_truthy(&v)),
        }
    }

    pub fn with_print_code(mut self, enabled: bool) -> Self {
        self.print_code = enabled;
        self
    }

    pub fn with_trace_execution(mut self, enabled: bool) -> Self {
        self.trace_execution = enabled;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
