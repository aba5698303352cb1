//! Provider registry: static presets for the supported chat-completions endpoints.
//!
//! Both presets speak the OpenAI chat completions protocol; they differ only
//! in default base URL and where the API key comes from.

use kai_core::config::ProviderSettings;

/// Static specification describing one provider preset.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"lmstudio"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"LM Studio"`.
    pub display_name: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
    /// Environment variable consulted when no API key is configured.
    pub env_key: Option<&'static str>,
    /// Whether this is a local/self-hosted server (no key required).
    pub is_local: bool,
}

/// All provider presets, in lookup order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "lmstudio",
        display_name: "LM Studio",
        default_api_base: "http://localhost:1234/v1",
        env_key: None,
        is_local: true,
    },
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        default_api_base: "https://api.openai.com/v1",
        env_key: Some("OPENAI_API_KEY"),
        is_local: false,
    },
];

/// Find a provider preset by name (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name.trim()))
}

/// Resolve the API key: config first, then the preset's env var.
pub fn resolve_api_key(settings: &ProviderSettings, spec: &ProviderSpec) -> Option<String> {
    if settings.has_api_key() {
        return Some(settings.api_key.clone());
    }
    spec.env_key
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.is_empty())
}

/// Resolve the API base: config override, else the preset default.
pub fn resolve_api_base(settings: &ProviderSettings, spec: &ProviderSpec) -> String {
    settings
        .api_base
        .clone()
        .unwrap_or_else(|| spec.default_api_base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_by_name("lmstudio").unwrap().display_name, "LM Studio");
        assert_eq!(find_by_name("OpenAI").unwrap().name, "openai");
        assert!(find_by_name("nope").is_none());
    }

    #[test]
    fn test_resolve_api_base_override() {
        let spec = find_by_name("lmstudio").unwrap();
        let mut settings = ProviderSettings::default();
        assert_eq!(resolve_api_base(&settings, spec), "http://localhost:1234/v1");

        settings.api_base = Some("http://gpu-box:8080/v1".into());
        assert_eq!(resolve_api_base(&settings, spec), "http://gpu-box:8080/v1");
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let spec = find_by_name("openai").unwrap();
        let settings = ProviderSettings {
            api_key: "sk-config".into(),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&settings, spec).as_deref(), Some("sk-config"));
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let spec = find_by_name("lmstudio").unwrap();
        assert!(spec.is_local);
        assert!(resolve_api_key(&ProviderSettings::default(), spec).is_none());
    }
}
