use serde::{Deserialize, Serialize};

/// Options controlling how operations become tools.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Which operations are turned into tools.
    #[serde(default)]
    pub auto_discover: AutoDiscoverConfig,

    /// Seed tool annotations from HTTP method semantics before applying `x-mcp-*` extensions.
    #[serde(default)]
    pub infer_annotations: bool,
}

/// Auto-discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AutoDiscoverConfig {
    /// Simple boolean: true = convert all operations, false = convert none.
    Enabled(bool),
    /// Detailed configuration with include/exclude patterns.
    Detailed {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

impl Default for AutoDiscoverConfig {
    fn default() -> Self {
        AutoDiscoverConfig::Enabled(true)
    }
}

impl AutoDiscoverConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            AutoDiscoverConfig::Enabled(b) => *b,
            AutoDiscoverConfig::Detailed { .. } => true,
        }
    }

    #[must_use]
    pub fn include_patterns(&self) -> &[String] {
        match self {
            AutoDiscoverConfig::Enabled(_) => &[],
            AutoDiscoverConfig::Detailed { include, .. } => include,
        }
    }

    #[must_use]
    pub fn exclude_patterns(&self) -> &[String] {
        match self {
            AutoDiscoverConfig::Enabled(_) => &[],
            AutoDiscoverConfig::Detailed { exclude, .. } => exclude,
        }
    }

    /// Check whether an operation should be converted.
    ///
    /// Patterns are matched against `"<METHOD> <path>"` (e.g. `"GET /users/{id}"`).
    #[must_use]
    pub fn should_discover(&self, method: &str, path: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let operation = format!("{} {}", method.to_uppercase(), path);

        // Exclude patterns win.
        if self
            .exclude_patterns()
            .iter()
            .any(|p| glob_match(p, &operation))
        {
            return false;
        }

        let include = self.include_patterns();
        include.is_empty() || include.iter().any(|p| glob_match(p, &operation))
    }
}

/// Simple glob matching on bytes: `*` is any sequence, `?` any single character.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_bytes = pattern.as_bytes();
    let text_bytes = text.as_bytes();

    let mut pattern_index = 0usize;
    let mut text_index = 0usize;

    let mut star_index: Option<usize> = None;
    let mut star_text_index: usize = 0;

    while text_index < text_bytes.len() {
        match pattern_bytes.get(pattern_index) {
            Some(b'*') => {
                star_index = Some(pattern_index);
                pattern_index += 1;
                star_text_index = text_index;
            }
            Some(b'?') => {
                pattern_index += 1;
                text_index += 1;
            }
            Some(&b) if b == text_bytes[text_index] => {
                pattern_index += 1;
                text_index += 1;
            }
            _ => {
                let Some(si) = star_index else {
                    return false;
                };

                pattern_index = si + 1;
                star_text_index += 1;
                text_index = star_text_index;
            }
        }
    }

    while matches!(pattern_bytes.get(pattern_index), Some(b'*')) {
        pattern_index += 1;
    }

    pattern_index == pattern_bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("GET *", "GET /users"));
        assert!(glob_match("GET /users/*", "GET /users/123"));
        assert!(!glob_match("GET /users/*", "POST /users/123"));
        assert!(glob_match("DELETE /pets/?", "DELETE /pets/1"));
        // Braces in templated paths are literal.
        assert!(glob_match("GET /users/{id}", "GET /users/{id}"));
    }

    #[test]
    fn test_default_discovers_everything() {
        let cfg = AutoDiscoverConfig::default();
        assert!(cfg.should_discover("get", "/users"));
        assert!(cfg.should_discover("delete", "/users/{id}"));
    }

    #[test]
    fn test_disabled_discovers_nothing() {
        let cfg = AutoDiscoverConfig::Enabled(false);
        assert!(!cfg.should_discover("get", "/users"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let cfg = AutoDiscoverConfig::Detailed {
            include: vec!["GET *".to_string(), "DELETE *".to_string()],
            exclude: vec!["DELETE /admin/*".to_string()],
        };
        assert!(cfg.should_discover("get", "/admin/users"));
        assert!(cfg.should_discover("delete", "/users/{id}"));
        assert!(!cfg.should_discover("delete", "/admin/users"));
        assert!(!cfg.should_discover("post", "/users"));
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let opts: ConvertOptions = serde_json::from_value(json!({
            "autoDiscover": { "exclude": ["DELETE *"] },
            "inferAnnotations": true
        }))
        .unwrap();
        assert!(opts.infer_annotations);
        assert_eq!(opts.auto_discover.exclude_patterns(), ["DELETE *".to_string()]);

        let defaults: ConvertOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(defaults, ConvertOptions::default());
    }
}
