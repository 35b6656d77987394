//! YAML loaders for wizard configuration and catalogs.

use crate::catalog::Catalog;
use crate::config::WizardConfig;
use crate::context::check_template;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a catalog from a YAML string.
///
/// # Example
///
/// ```rust
/// use pm_wizard::yaml::parse_catalog;
///
/// let yaml = r#"
/// name: setup
/// steps:
///   - title: Initialize Git Repository
///     endpoint: /setup/init_git
///   - title: Create .gitignore
///     endpoint: /setup/create_gitignore
/// "#;
///
/// let catalog = parse_catalog(yaml).unwrap();
/// assert_eq!(catalog.name, "setup");
/// assert_eq!(catalog.steps[1].id, 2);
/// ```
pub fn parse_catalog(yaml: &str) -> Result<Catalog> {
    let mut catalog: Catalog =
        serde_yaml::from_str(yaml).context("Failed to parse catalog YAML")?;

    validate_catalog(&catalog)?;
    catalog.assign_ids();

    Ok(catalog)
}

/// Load and parse a catalog from a YAML file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

    parse_catalog(&content)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
}

/// Parse the wizard configuration from a YAML string.
///
/// Omitted fields take their defaults, so an empty mapping yields
/// [`WizardConfig::default`].
pub fn parse_config(yaml: &str) -> Result<WizardConfig> {
    let mut config: WizardConfig =
        serde_yaml::from_str(yaml).context("Failed to parse wizard config YAML")?;

    validate_catalog(&config.setup)?;
    config.setup.assign_ids();

    if config.upload.aggregate_endpoint.is_empty() {
        anyhow::bail!("Upload aggregate endpoint cannot be empty");
    }
    if config.upload.endpoint.is_empty() {
        anyhow::bail!("Upload endpoint cannot be empty");
    }
    check_template(&config.upload.endpoint)?;

    Ok(config)
}

/// Load and parse the wizard configuration from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use pm_wizard::yaml::load_config;
///
/// let config = load_config("wizard.yaml")?;
/// println!("{} setup steps", config.setup.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<WizardConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Validate a catalog.
fn validate_catalog(catalog: &Catalog) -> Result<()> {
    if catalog.name.is_empty() {
        anyhow::bail!("Catalog name cannot be empty");
    }

    if catalog.steps.is_empty() {
        tracing::warn!(catalog = %catalog.name, "Catalog has no steps");
    }

    for (i, step) in catalog.steps.iter().enumerate() {
        if step.title.is_empty() {
            anyhow::bail!("Step {} has empty title", i);
        }
        if step.endpoint.is_empty() {
            anyhow::bail!("Step {} has empty endpoint", i);
        }
        check_template(&step.endpoint).with_context(|| format!("Step {} endpoint", i))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_catalog() {
        let yaml = r#"
name: setup
description: Bootstrap steps
steps:
  - id: 10
    title: Initialize Git Repository
    endpoint: /setup/init_git
"#;

        let catalog = parse_catalog(yaml).unwrap();
        assert_eq!(catalog.name, "setup");
        assert_eq!(catalog.description, Some("Bootstrap steps".to_string()));
        assert_eq!(catalog.steps.len(), 1);
        assert_eq!(catalog.steps[0].id, 10);
        assert_eq!(catalog.steps[0].endpoint, "/setup/init_git");
    }

    #[test]
    fn test_parse_empty_catalog() {
        let catalog = parse_catalog("name: nothing\nsteps: []\n").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_validate_empty_name() {
        let yaml = r#"
name: ""
steps:
  - title: Init
    endpoint: /setup/init_git
"#;

        let result = parse_catalog(yaml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name cannot be empty"));
    }

    #[test]
    fn test_validate_empty_endpoint() {
        let yaml = r#"
name: setup
steps:
  - title: Init
    endpoint: ""
"#;

        let result = parse_catalog(yaml);
        assert!(result.unwrap_err().to_string().contains("empty endpoint"));
    }

    #[test]
    fn test_validate_broken_template() {
        let yaml = r#"
name: setup
steps:
  - title: Init
    endpoint: "/projects/{{#if project_id}}/init"
"#;

        assert!(parse_catalog(yaml).is_err());
    }

    #[test]
    fn test_parse_config_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, WizardConfig::default());
    }

    #[test]
    fn test_parse_config_overrides() {
        let yaml = r#"
step_timeout_ms: 500
settle_delay_ms: 1000
setup:
  name: short-setup
  steps:
    - title: Initialize Git Repository
      endpoint: /setup/init_git
upload:
  aggregate_endpoint: /aggregate
"#;

        let config = parse_config(yaml).unwrap();
        assert_eq!(config.step_timeout_ms, 500);
        assert_eq!(config.settle_delay_ms, 1000);
        assert_eq!(config.setup.len(), 1);
        assert_eq!(config.setup.steps[0].id, 1);
        assert_eq!(config.upload.aggregate_endpoint, "/aggregate");
        assert_eq!(config.upload.endpoint, "/api/user_inputs/upload/{{ file }}");
    }
}
