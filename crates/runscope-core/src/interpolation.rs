use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$\{\{\s*([^}]+?)\s*\}\}|\$\{([A-Za-z_][A-Za-z0-9_.]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("placeholder pattern is valid")
});

/// Expands environment placeholders in configured values such as the
/// trigger endpoint.
#[derive(Debug, Clone, Default)]
pub struct EnvExpander {
    /// Build variables, consulted before the process environment.
    pub variables: HashMap<String, String>,
    /// Whether to fall back to the process environment.
    pub use_process_env: bool,
}

impl EnvExpander {
    /// Create an expander that consults the process environment only.
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
            use_process_env: true,
        }
    }

    /// Create an expander over a fixed set of variables.
    pub fn with_variables(variables: HashMap<String, String>) -> Self {
        Self {
            variables,
            use_process_env: true,
        }
    }

    /// Disable the process environment fallback.
    pub fn isolated(mut self) -> Self {
        self.use_process_env = false;
        self
    }

    /// Expand placeholders in a string.
    ///
    /// Supports:
    /// - `$VAR` and `${VAR}`
    /// - `${{ env.VAR }}` and `${{ VAR }}`
    ///
    /// References that cannot be resolved are left in place.
    pub fn expand(&self, input: &str) -> String {
        PLACEHOLDER
            .replace_all(input, |caps: &regex::Captures| {
                let name = caps
                    .get(1)
                    .map(|m| {
                        let expr = m.as_str().trim();
                        expr.strip_prefix("env.").unwrap_or(expr)
                    })
                    .or_else(|| caps.get(2).map(|m| m.as_str()))
                    .or_else(|| caps.get(3).map(|m| m.as_str()))
                    .unwrap_or_default();

                self.lookup(name)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned().or_else(|| {
            if self.use_process_env {
                std::env::var(name).ok()
            } else {
                None
            }
        })
    }
}
