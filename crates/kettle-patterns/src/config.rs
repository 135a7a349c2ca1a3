// SPDX-License-Identifier: (MIT OR Apache-2.0)

/// Environment variable that turns on the lowered-tree dump.
pub const DEBUG_PATTERNS_ENV: &str = "KETTLE_DEBUG_PATTERNS";

/// Options for the pattern lowering pass.
#[derive(Debug, Clone, Default)]
pub struct LowerConfig {
    /// Print each lowered class to stderr.
    pub debug_dump: bool,
}

impl LowerConfig {
    /// Read options from the environment.
    pub fn from_env() -> Self {
        let debug_dump = std::env::var(DEBUG_PATTERNS_ENV)
            .map(|v| !matches!(v.as_str(), "" | "0" | "false"))
            .unwrap_or(false);
        Self { debug_dump }
    }

    pub fn with_debug_dump(mut self, on: bool) -> Self {
        self.debug_dump = on;
        self
    }
}
