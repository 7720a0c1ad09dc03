//! Built-in default configuration embedded in the binary
//!
//! The builtin configuration is the lowest-priority layer. It carries the
//! region catalog and the default marker vocabulary, and is parsed once on
//! first access.

use super::schema::EngineConfig;
use std::sync::LazyLock;

/// Lazy-initialized builtin configuration
static BUILTIN_CONFIG: LazyLock<EngineConfig> = LazyLock::new(load_builtin_config);

/// Get the builtin configuration
pub fn get_builtin() -> &'static EngineConfig {
    &BUILTIN_CONFIG
}

/// Load builtin configuration from embedded TOML string
fn load_builtin_config() -> EngineConfig {
    const BUILTIN_TOML: &str = include_str!("../builtin-catalog.toml");
    toml::from_str(BUILTIN_TOML).expect("Failed to parse builtin configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtpl_filter::CatalogValidator;

    #[test]
    fn test_builtin_loads() {
        let config = get_builtin();
        assert_eq!(config.common.config_version, "1.0");
        assert_eq!(config.template.inventory_key, "proxies");
        assert_eq!(config.markers.proxy_nodes, "__PROXY_NODES__");
    }

    #[test]
    fn test_builtin_cached() {
        let config1 = get_builtin();
        let config2 = get_builtin();
        assert_eq!(config1 as *const _, config2 as *const _);
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let config = get_builtin();
        assert!(config.regions.entries.len() >= 6);
        assert!(CatalogValidator::validate(&config.regions).is_ok());
        assert!(config
            .regions
            .entries
            .iter()
            .any(|r| r.name == "🇭🇰 香港节点"));
    }
}
