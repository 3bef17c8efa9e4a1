//! Tenant selection
//!
//! Precedence: `--orgs`, then the config's `organizations`, then every
//! organization the token can see.

use anyhow::Context;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use varsync_core::{list_tenants, ControlPlane, TargetConfig, Tenant};

/// Parse `--orgs`: an existing file is read one name per line, anything
/// else is a comma-separated list
pub(crate) fn parse_orgs(value: &str) -> anyhow::Result<Vec<Tenant>> {
    let path = Path::new(value);
    let names: Vec<String> = if path.is_file() {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read organizations file {}", path.display()))?
            .lines()
            .map(str::to_string)
            .collect()
    } else {
        value.split(',').map(str::to_string).collect()
    };
    Ok(dedup(names))
}

fn dedup(names: impl IntoIterator<Item = String>) -> Vec<Tenant> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .map(Tenant::from)
        .collect()
}

/// Tenants named by the flag or the config, if either is present
pub(crate) fn configured(
    orgs: Option<&str>,
    target: &TargetConfig,
) -> anyhow::Result<Option<Vec<Tenant>>> {
    if let Some(value) = orgs {
        let tenants = parse_orgs(value)?;
        info!(count = tenants.len(), "using organizations from --orgs");
        return Ok(Some(tenants));
    }
    if let Some(listed) = &target.organizations {
        let tenants = dedup(listed.iter().map(|t| t.name().to_string()));
        info!(count = tenants.len(), "using organizations from configuration");
        return Ok(Some(tenants));
    }
    Ok(None)
}

/// Resolve the tenant list, enumerating the API as a last resort
pub(crate) async fn select(
    orgs: Option<&str>,
    target: &TargetConfig,
    api: &ControlPlane,
    page_size: u32,
) -> anyhow::Result<Vec<Tenant>> {
    if let Some(tenants) = configured(orgs, target)? {
        return Ok(tenants);
    }
    info!("no organizations given, listing all");
    let tenants = list_tenants(api, page_size).await;
    info!(count = tenants.len(), "retrieved organizations");
    Ok(tenants)
}
