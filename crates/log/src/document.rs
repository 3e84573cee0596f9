//! Logging document: serialized configuration
//!
//! A document is a tree of domain nodes whose nesting encodes the qualified
//! names; the special top-level name `global` addresses the root domain.
//! Applying a document drives the ordinary registry setters in document
//! order, so precedence follows position: later nodes win, and a propagating
//! ancestor written before its children is refined by them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::DomainConfig;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::registry::{Registry, ROOT_NAME};
use crate::stream::StreamKind;

/// Top-level node name addressing the root domain.
pub const GLOBAL_SEGMENT: &str = "global";

/// A complete logging configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingDocument {
    /// Top-level domain nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<DomainSpec>,
}

/// One domain node of a document. Absent settings leave the registry state
/// untouched, so a document can adjust a single flag deep in the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainSpec {
    /// Local name segment; `global` at the top level addresses the root.
    pub name: String,
    /// Whether updates to this domain overwrite its subtree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configures_subtree: Option<bool>,
    /// Whether the domain emits at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether lines start with the current time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_time: Option<bool>,
    /// Whether lines include the qualified domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_name: Option<bool>,
    /// Whether lines include a level tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_level: Option<bool>,
    /// Whether lines include the `file:line` call site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_location: Option<bool>,
    /// Severity ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_level: Option<Level>,
    /// Single sink kind. Mutually exclusive with `streams`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamKind>,
    /// Full sink list. Mutually exclusive with `stream`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<Vec<StreamKind>>,
    /// Nested domain nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<DomainSpec>,
}

impl Registry {
    /// Applies a document by driving the per-setting mutators in document
    /// order. Stops at the first conflicting node.
    pub fn apply_document(&self, document: &LoggingDocument) -> Result<()> {
        for spec in &document.domains {
            self.apply_spec(spec, None)?;
        }
        Ok(())
    }

    fn apply_spec(&self, spec: &DomainSpec, parent: Option<&str>) -> Result<()> {
        let name = qualified(parent, &spec.name);
        if let Some(value) = spec.configures_subtree {
            self.set_configures_subtree(&name, value);
        }
        if let Some(value) = spec.enabled {
            self.set_enabled(&name, value);
        }
        if let Some(value) = spec.print_time {
            self.set_prints_time(&name, value);
        }
        if let Some(value) = spec.print_name {
            self.set_prints_name(&name, value);
        }
        if let Some(value) = spec.print_level {
            self.set_prints_level(&name, value);
        }
        if let Some(value) = spec.print_location {
            self.set_prints_location(&name, value);
        }
        if let Some(value) = spec.max_level {
            self.set_max_level(&name, value);
        }
        match (spec.stream, &spec.streams) {
            (Some(_), Some(_)) => return Err(Error::ConflictingStreams { domain: name }),
            (Some(kind), None) => self.set_stream(&name, kind),
            (None, Some(kinds)) => self.set_stream_mask(&name, kinds.iter().copied().collect()),
            (None, None) => {}
        }
        for child in &spec.domains {
            self.apply_spec(child, Some(&name))?;
        }
        Ok(())
    }

    /// Reads a JSON document from `path` and applies it.
    pub fn configure_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        let document: LoggingDocument = serde_json::from_str(&text)?;
        self.apply_document(&document)
    }

    /// Snapshot of all configurations as a document. Every known setting is
    /// written explicitly, so applying the result to a fresh registry
    /// reproduces the configuration state. Names with no configuration of
    /// their own appear as bare structural nodes.
    #[must_use]
    pub fn export_document(&self) -> LoggingDocument {
        #[derive(Default)]
        struct TreeNode {
            settings: Option<DomainSpec>,
            children: BTreeMap<String, TreeNode>,
        }

        fn collapse(name: String, tree: TreeNode) -> DomainSpec {
            let mut spec = tree.settings.unwrap_or_default();
            spec.name = name;
            spec.domains = tree
                .children
                .into_iter()
                .map(|(child_name, child)| collapse(child_name, child))
                .collect();
            spec
        }

        let mut root = TreeNode::default();
        for config in self.all_configs() {
            let mut entry = &mut root;
            if config.name() != ROOT_NAME {
                for segment in config.name().split('.') {
                    entry = entry.children.entry(segment.to_string()).or_default();
                }
            }
            entry.settings = Some(spec_of(&config));
        }
        LoggingDocument {
            domains: vec![collapse(GLOBAL_SEGMENT.to_string(), root)],
        }
    }
}

fn spec_of(config: &DomainConfig) -> DomainSpec {
    DomainSpec {
        name: String::new(),
        configures_subtree: Some(config.configures_subtree()),
        enabled: Some(config.is_enabled()),
        print_time: Some(config.prints_time()),
        print_name: Some(config.prints_name()),
        print_level: Some(config.prints_level()),
        print_location: Some(config.prints_location()),
        max_level: Some(config.max_level()),
        stream: None,
        streams: Some(config.stream_mask().iter().collect()),
        domains: Vec::new(),
    }
}

fn qualified(parent: Option<&str>, segment: &str) -> String {
    match parent {
        None if segment == GLOBAL_SEGMENT => ROOT_NAME.to_string(),
        None => segment.to_string(),
        Some(ROOT_NAME) => segment.to_string(),
        Some(parent) => format!("{parent}.{segment}"),
    }
}
