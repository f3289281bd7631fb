//! Deferred reference objects.
//!
//! A reference object is a value that depends on several other rows of its
//! group. The resolver asks it for its anchors (reference strings such as
//! `.p1.id`), binds the resolved value of each one, and finally evaluates it.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{FactureError, Result};
use crate::value::display_text;

/// Capability implemented by every deferred reference value.
pub trait ReferenceObject: fmt::Debug {
    /// Identifier used in configuration files and structured dumps.
    fn kind(&self) -> &str {
        "custom"
    }

    /// Reference strings this object depends on.
    fn anchors(&self) -> Vec<String>;

    /// Record the resolved value for one anchor.
    fn bind(&mut self, anchor: &str, value: Value);

    /// Produce the final value. Called once every anchor is bound.
    fn eval(&self) -> Result<Value>;
}

/// Matches `facture_anchor{.alias.key}` and captures the reference string.
pub const ANCHOR_PATTERN: &str = r"facture_anchor\{([^}]+)\}";

/// String template embedding anchors as `facture_anchor{.alias.key}`.
#[derive(Debug, Clone)]
pub struct TemplateReference {
    template: String,
    anchors: Vec<String>,
    bound: BTreeMap<String, Value>,
}

impl TemplateReference {
    pub const KIND: &'static str = "template";

    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let re = Regex::new(ANCHOR_PATTERN)
            .map_err(|err| FactureError::conf(format!("invalid anchor pattern: {err}")))?;

        let mut anchors: Vec<String> = Vec::new();
        for captures in re.captures_iter(&template) {
            if let Some(anchor) = captures.get(1) {
                let anchor = anchor.as_str().to_string();
                if !anchors.contains(&anchor) {
                    anchors.push(anchor);
                }
            }
        }

        Ok(Self {
            template,
            anchors,
            bound: BTreeMap::new(),
        })
    }

    /// Build from configuration parameters (`{ kind = "template", template = "..." }`).
    pub fn from_params(params: &Map<String, Value>) -> Result<Box<dyn ReferenceObject>> {
        let template = params
            .get("template")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FactureError::conf(
                    "reference object of kind 'template' needs a string 'template' parameter",
                )
            })?;
        Ok(Box::new(Self::new(template)?))
    }
}

impl ReferenceObject for TemplateReference {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn anchors(&self) -> Vec<String> {
        self.anchors.clone()
    }

    fn bind(&mut self, anchor: &str, value: Value) {
        self.bound.insert(anchor.to_string(), value);
    }

    fn eval(&self) -> Result<Value> {
        let mut result = self.template.clone();
        for anchor in &self.anchors {
            let value = self.bound.get(anchor).ok_or_else(|| {
                FactureError::conf(format!(
                    "anchor \"{anchor}\" was never bound in template \"{}\"",
                    self.template
                ))
            })?;
            result = result.replace(&format!("facture_anchor{{{anchor}}}"), &display_text(value));
        }
        Ok(Value::String(result))
    }
}

type ReferenceFactory = Box<dyn Fn(&Map<String, Value>) -> Result<Box<dyn ReferenceObject>>>;

/// Factories for reference objects declared in configuration files, keyed by kind.
pub struct ReferenceRegistry {
    factories: BTreeMap<String, ReferenceFactory>,
}

impl ReferenceRegistry {
    /// Registry with the built-in kinds.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(TemplateReference::KIND, TemplateReference::from_params);
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&Map<String, Value>) -> Result<Box<dyn ReferenceObject>> + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, kind: &str, params: &Map<String, Value>) -> Result<Box<dyn ReferenceObject>> {
        let factory = self.factories.get(kind).ok_or_else(|| {
            let known: Vec<&str> = self.kinds().collect();
            FactureError::conf(format!(
                "unknown reference object kind '{kind}' (known: {})",
                known.join(", ")
            ))
        })?;
        factory(params)
    }
}

impl Default for ReferenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReferenceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
