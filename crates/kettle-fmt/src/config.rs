// SPDX-License-Identifier: (MIT OR Apache-2.0)

pub struct FormatConfig {
    pub indent_width: usize,
    /// Suffix variable names with `#id`, to tell apart variables that
    /// share a name (a binding's storage and its source name, say).
    pub show_var_ids: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            show_var_ids: false,
        }
    }
}
