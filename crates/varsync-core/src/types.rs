//! Core types for varsync
//!
//! Defines the data model shared by every component:
//! - Tenants (organizations)
//! - Desired entries from configuration
//! - Remote entries and configuration sets as the API returns them
//! - The comparable attribute projection used by the reconciler

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An organization managed by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tenant(String);

impl Tenant {
    /// Create tenant from its name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Tenant name (also its id in the API)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tenant {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Tenant {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Entry category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Terraform input variable
    #[default]
    Terraform,
    /// Environment variable
    Env,
}

impl Category {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::Env => "env",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared target state for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredEntry {
    /// Unique key within the desired set
    pub key: String,
    /// Value, empty when omitted
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Write-only on the server once set
    #[serde(default)]
    pub sensitive: bool,
    /// Entry category
    #[serde(default)]
    pub category: Category,
    /// Value is HCL rather than a literal string
    #[serde(default)]
    pub hcl: bool,
}

impl DesiredEntry {
    /// Create entry with defaults for every optional attribute
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: None,
            sensitive: false,
            category: Category::default(),
            hcl: false,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark sensitive
    #[inline]
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Mark as HCL
    #[inline]
    #[must_use]
    pub fn hcl(mut self) -> Self {
        self.hcl = true;
        self
    }

    /// Default-filled comparable attributes
    #[must_use]
    pub fn attributes(&self) -> EntryAttributes {
        EntryAttributes {
            value: Some(self.value.clone()),
            description: self.description.clone().unwrap_or_default(),
            sensitive: self.sensitive,
            category: self.category,
            hcl: self.hcl,
        }
    }

    /// JSON:API document for create and update requests
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "type": "vars",
                "attributes": {
                    "key": self.key,
                    "value": self.value,
                    "description": self.description.as_deref().unwrap_or_default(),
                    "sensitive": self.sensitive,
                    "category": self.category,
                    "hcl": self.hcl,
                }
            }
        })
    }

    /// Payload safe to write to logs: sensitive values are masked
    #[must_use]
    pub fn to_redacted_payload(&self) -> serde_json::Value {
        let mut payload = self.to_payload();
        if self.sensitive {
            payload["data"]["attributes"]["value"] = serde_json::Value::from("<redacted>");
        }
        payload
    }
}

/// YAML authors write `value: 8080` or `value: true`; keep the literal text.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "entry value must be a scalar, got {other:?}"
        ))),
    }
}

/// One entry inside a remote configuration set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Server-assigned id
    pub id: String,
    /// Entry key
    pub key: String,
    /// Absent for sensitive entries
    pub value: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Sensitive flag
    pub sensitive: bool,
    /// Category
    pub category: Category,
    /// HCL flag
    pub hcl: bool,
}

impl RemoteEntry {
    /// Default-filled comparable attributes
    #[must_use]
    pub fn attributes(&self) -> EntryAttributes {
        EntryAttributes {
            value: self.value.clone(),
            description: self.description.clone().unwrap_or_default(),
            sensitive: self.sensitive,
            category: self.category,
            hcl: self.hcl,
        }
    }
}

impl From<Resource<RemoteEntryAttributes>> for RemoteEntry {
    fn from(resource: Resource<RemoteEntryAttributes>) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            key: attrs.key,
            value: attrs.value,
            description: attrs.description,
            sensitive: attrs.sensitive.unwrap_or(false),
            category: attrs.category.unwrap_or_default(),
            hcl: attrs.hcl.unwrap_or(false),
        }
    }
}

/// The five mutable attributes of an entry, defaults already applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAttributes {
    /// `None` when the server withholds a sensitive value
    pub value: Option<String>,
    /// Description, empty when unset
    pub description: String,
    /// Sensitive flag
    pub sensitive: bool,
    /// Category
    pub category: Category,
    /// HCL flag
    pub hcl: bool,
}

impl EntryAttributes {
    /// Names of the attributes that differ from `current`
    ///
    /// `self` is the desired side. The value is not compared when `current`
    /// is sensitive: the API never returns it, so drift in a sensitive value
    /// goes unnoticed unless another attribute also changed.
    #[must_use]
    pub fn changed_from(&self, current: &EntryAttributes) -> Vec<&'static str> {
        let mut changed = Vec::new();

        if !current.sensitive {
            let desired = self.value.as_deref().unwrap_or_default();
            let actual = current.value.as_deref().unwrap_or_default();
            if desired != actual {
                changed.push("value");
            }
        }
        if self.description != current.description {
            changed.push("description");
        }
        if self.sensitive != current.sensitive {
            changed.push("sensitive");
        }
        if self.category != current.category {
            changed.push("category");
        }
        if self.hcl != current.hcl {
            changed.push("hcl");
        }

        changed
    }
}

/// Attributes of a configuration set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAttributes {
    /// Set name
    #[serde(default)]
    pub name: String,
    /// Set description
    #[serde(default)]
    pub description: Option<String>,
    /// Applies to every workspace
    #[serde(default)]
    pub global: bool,
    /// Overrides workspace-level values
    #[serde(default)]
    pub priority: bool,
}

/// A configuration set inside one tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSet {
    /// Server-assigned id
    pub id: String,
    /// Attributes as returned
    pub attributes: SetAttributes,
}

impl ConfigurationSet {
    /// Check the singleton predicate: same name, global and priority
    #[inline]
    #[must_use]
    pub fn is_global_priority(&self, name: &str) -> bool {
        self.attributes.name == name && self.attributes.global && self.attributes.priority
    }
}

impl From<Resource<SetAttributes>> for ConfigurationSet {
    fn from(resource: Resource<SetAttributes>) -> Self {
        Self {
            id: resource.id,
            attributes: resource.attributes,
        }
    }
}

/// Attributes of an entry as the API serializes them
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteEntryAttributes {
    /// Entry key
    pub key: String,
    /// Withheld for sensitive entries
    #[serde(default)]
    pub value: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Sensitive flag
    #[serde(default)]
    pub sensitive: Option<bool>,
    /// Category
    #[serde(default)]
    pub category: Option<Category>,
    /// HCL flag
    #[serde(default)]
    pub hcl: Option<bool>,
}

/// A JSON:API resource object
#[derive(Debug, Clone, Deserialize)]
pub struct Resource<A> {
    /// Resource id
    pub id: String,
    /// Resource attributes
    #[serde(default)]
    pub attributes: A,
}

/// A JSON:API document holding a single resource
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    /// Primary data
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desired_entry_defaults() {
        let entry: DesiredEntry = serde_yaml::from_str("key: region").unwrap();
        assert_eq!(entry.value, "");
        assert_eq!(entry.description, None);
        assert!(!entry.sensitive);
        assert_eq!(entry.category, Category::Terraform);
        assert!(!entry.hcl);
    }

    #[test]
    fn desired_entry_accepts_scalar_values() {
        let entry: DesiredEntry = serde_yaml::from_str("key: port\nvalue: 8080").unwrap();
        assert_eq!(entry.value, "8080");

        let entry: DesiredEntry = serde_yaml::from_str("key: flag\nvalue: true").unwrap();
        assert_eq!(entry.value, "true");

        let result: Result<DesiredEntry, _> = serde_yaml::from_str("key: bad\nvalue: [1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn omitted_fields_match_explicit_defaults() {
        let implicit = DesiredEntry::new("a", "1");
        let explicit = DesiredEntry::new("a", "1")
            .with_description("")
            .with_category(Category::Terraform);

        assert!(implicit.attributes().changed_from(&explicit.attributes()).is_empty());
    }

    #[test]
    fn changed_fields_are_named() {
        let desired = DesiredEntry::new("a", "2").hcl().attributes();
        let current = DesiredEntry::new("a", "1").attributes();

        assert_eq!(desired.changed_from(&current), vec!["value", "hcl"]);
    }

    #[test]
    fn sensitive_remote_value_is_not_compared() {
        let remote = RemoteEntry {
            id: "var-1".to_string(),
            key: "token".to_string(),
            value: None,
            description: None,
            sensitive: true,
            category: Category::Env,
            hcl: false,
        };
        let desired = DesiredEntry::new("token", "rotated")
            .sensitive()
            .with_category(Category::Env);

        assert!(desired.attributes().changed_from(&remote.attributes()).is_empty());

        let described = desired.with_description("now documented");
        assert_eq!(
            described.attributes().changed_from(&remote.attributes()),
            vec!["description"]
        );
    }

    #[test]
    fn remote_entry_from_resource_fills_defaults() {
        let json = serde_json::json!({
            "id": "var-9",
            "type": "vars",
            "attributes": { "key": "region", "value": "eu-west-1" }
        });
        let resource: Resource<RemoteEntryAttributes> = serde_json::from_value(json).unwrap();
        let entry = RemoteEntry::from(resource);

        assert_eq!(entry.id, "var-9");
        assert_eq!(entry.value.as_deref(), Some("eu-west-1"));
        assert!(!entry.sensitive);
        assert_eq!(entry.category, Category::Terraform);
    }

    #[test]
    fn payload_uses_defaults() {
        let payload = DesiredEntry::new("region", "us-east-1").to_payload();
        let attrs = &payload["data"]["attributes"];

        assert_eq!(payload["data"]["type"], "vars");
        assert_eq!(attrs["description"], "");
        assert_eq!(attrs["category"], "terraform");
        assert_eq!(attrs["sensitive"], false);
    }

    #[test]
    fn redacted_payload_masks_sensitive_values() {
        let secret = DesiredEntry::new("token", "hunter2").sensitive();
        assert_eq!(secret.to_redacted_payload()["data"]["attributes"]["value"], "<redacted>");
        assert_eq!(secret.to_payload()["data"]["attributes"]["value"], "hunter2");

        let plain = DesiredEntry::new("region", "eu");
        assert_eq!(plain.to_redacted_payload(), plain.to_payload());
    }

    #[test]
    fn global_priority_predicate() {
        let set = ConfigurationSet {
            id: "varset-1".to_string(),
            attributes: SetAttributes {
                name: "platform".to_string(),
                description: None,
                global: true,
                priority: false,
            },
        };
        assert!(!set.is_global_priority("platform"));
    }
}
