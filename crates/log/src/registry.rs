//! Domain registry
//!
//! The registry owns the domain forest, every configuration created so far
//! (a configuration may exist before its domain does), the resolution caches
//! and the file-name prefix for file sinks. It is an explicit state container
//! rather than a hidden singleton, so tests can build isolated instances; the
//! process-wide default used by the macros lives in [`crate::global`].
//!
//! Domains are arena records addressed by [`DomainId`]. The parent edge is a
//! plain index used only for upward walks; children are owned by the arena
//! for the life of the registry and never removed.

use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use crate::config::DomainConfig;
use crate::domain::{Domain, EmitState};
use crate::level::Level;
use crate::stream::{StreamKind, StreamMask};
use crate::writer::FileSlot;

/// Qualified name of the root domain.
pub(crate) const ROOT_NAME: &str = ".";

/// Stable handle of a domain record inside a registry's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DomainId(usize);

const ROOT: DomainId = DomainId(0);

/// One domain record.
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<DomainId>,
    children: Mutex<Vec<DomainId>>,
    /// The configuration this domain currently reads. Either the registry's
    /// config for this name (independent) or a derived copy kept in sync by
    /// subtree propagation (inherited). Swapped, never mutated, from here.
    pub(crate) config: ArcSwap<DomainConfig>,
    pub(crate) emit: Mutex<EmitState>,
    pub(crate) file: Mutex<FileSlot>,
}

impl Node {
    fn new(name: String, parent: Option<DomainId>, config: Arc<DomainConfig>) -> Self {
        Self {
            name,
            parent,
            children: Mutex::new(Vec::new()),
            config: ArcSwap::from(config),
            emit: Mutex::new(EmitState::default()),
            file: Mutex::new(FileSlot::Closed),
        }
    }
}

pub(crate) struct Shared {
    /// Arena of domain records. Push-only; indices stay valid forever.
    nodes: RwLock<Vec<Arc<Node>>>,
    /// All configurations created so far, keyed by qualified name.
    configs: DashMap<String, Arc<DomainConfig>>,
    /// Qualified name -> domain resolution cache.
    names: DashMap<String, DomainId>,
    /// Module path -> domain resolution cache.
    modules: DashMap<String, DomainId>,
    /// Serializes first-touch creation of a name, so two racing threads
    /// cannot create sibling records for the same path segment.
    create: Mutex<()>,
    /// Prefix for file-sink names; must be set before a file sink opens.
    file_prefix: RwLock<Option<String>>,
}

impl Shared {
    pub(crate) fn node(&self, id: DomainId) -> Arc<Node> {
        Arc::clone(&self.nodes.read()[id.0])
    }

    pub(crate) fn prefix(&self) -> Option<String> {
        self.file_prefix.read().clone()
    }
}

/// Central management facility for domains and their configuration.
///
/// Cloning is cheap and yields a handle to the same underlying state.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry holding only the root domain.
    #[must_use]
    pub fn new() -> Self {
        let root_config = Arc::new(DomainConfig::new(ROOT_NAME));
        let configs = DashMap::new();
        configs.insert(ROOT_NAME.to_string(), Arc::clone(&root_config));
        let names = DashMap::new();
        names.insert(ROOT_NAME.to_string(), ROOT);

        Self {
            shared: Arc::new(Shared {
                nodes: RwLock::new(vec![Arc::new(Node::new(
                    ROOT_NAME.to_string(),
                    None,
                    root_config,
                ))]),
                configs,
                names,
                modules: DashMap::new(),
                create: Mutex::new(()),
                file_prefix: RwLock::new(None),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// The root domain.
    #[must_use]
    pub fn root(&self) -> Domain {
        Domain::new(Arc::clone(&self.shared), ROOT)
    }

    /// Resolves a domain by qualified dot-path, creating any missing path
    /// segments on the way.
    ///
    /// The empty string and `"."` resolve to the root; a single leading
    /// separator is ignored. Resolution is idempotent: repeated calls with
    /// the same name return the same domain.
    ///
    /// # Panics
    ///
    /// Panics on an empty path segment (`"a..b"`), which is a programming
    /// error rather than a recoverable condition.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Domain {
        let key = canonical(name);
        if let Some(id) = self.shared.names.get(key) {
            return Domain::new(Arc::clone(&self.shared), *id);
        }

        let _guard = self.shared.create.lock();
        // Another thread may have created the path while we waited.
        if let Some(id) = self.shared.names.get(key) {
            return Domain::new(Arc::clone(&self.shared), *id);
        }

        let mut current = ROOT;
        for segment in key.split('.') {
            assert!(!segment.is_empty(), "empty segment in domain name `{name}`");
            current = self.child_of(current, segment);
        }
        Domain::new(Arc::clone(&self.shared), current)
    }

    /// Resolves the domain for a `::`-separated module path, as produced by
    /// `module_path!()`. Keeps its own cache so call sites pay the mapping
    /// cost once.
    #[must_use]
    pub fn resolve_module(&self, module: &str) -> Domain {
        if let Some(id) = self.shared.modules.get(module) {
            return Domain::new(Arc::clone(&self.shared), *id);
        }
        let domain = self.resolve(&module.replace("::", "."));
        self.shared
            .modules
            .insert(module.to_string(), domain.id());
        domain
    }

    /// Looks up the configuration for a qualified name, if one was created.
    #[must_use]
    pub fn config(&self, name: &str) -> Option<Arc<DomainConfig>> {
        self.shared
            .configs
            .get(canonical(name))
            .map(|entry| Arc::clone(&entry))
    }

    /// Finds or creates the child of `parent` for one path segment.
    /// Caller holds the creation lock.
    fn child_of(&self, parent: DomainId, segment: &str) -> DomainId {
        let parent_node = self.shared.node(parent);
        let full_name = if parent == ROOT {
            segment.to_string()
        } else {
            format!("{}.{segment}", parent_node.name)
        };
        if let Some(id) = self.shared.names.get(full_name.as_str()) {
            return *id;
        }

        let config = self.config_entry(&full_name);
        let id = {
            let mut nodes = self.shared.nodes.write();
            let id = DomainId(nodes.len());
            nodes.push(Arc::new(Node::new(full_name.clone(), Some(parent), config)));
            id
        };
        parent_node.children.lock().push(id);
        self.shared.names.insert(full_name, id);
        // A pre-existing ancestor configuration takes effect immediately.
        self.configure_subtree(id);
        id
    }

    /// Finds or creates the configuration object for a name.
    fn config_entry(&self, key: &str) -> Arc<DomainConfig> {
        Arc::clone(
            &self
                .shared
                .configs
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(DomainConfig::new(key))),
        )
    }

    /// Recursively re-derives the configuration of the subtree rooted at
    /// `id` from its parent, wherever the parent propagates.
    pub(crate) fn configure_subtree(&self, id: DomainId) {
        let node = self.shared.node(id);
        let Some(parent_id) = node.parent else {
            return;
        };
        let parent = self.shared.node(parent_id);
        if !parent.config.load().configures_subtree() {
            return;
        }
        node.config.store(Arc::new(DomainConfig::derive(
            node.name.clone(),
            &parent.config.load(),
        )));
        let children: Vec<DomainId> = node.children.lock().clone();
        for child in children {
            self.configure_subtree(child);
        }
    }

    /// Re-runs subtree configuration on the direct children of a named
    /// domain, if that domain exists yet. The mutation that precedes this
    /// call already changed the named configuration itself in place.
    fn propagate(&self, key: &str) {
        let Some(id) = self.shared.names.get(key).map(|entry| *entry) else {
            return;
        };
        let children: Vec<DomainId> = self.shared.node(id).children.lock().clone();
        for child in children {
            self.configure_subtree(child);
        }
    }

    fn set_field(&self, name: &str, mutate: impl FnOnce(&Arc<DomainConfig>)) {
        let key = canonical(name);
        let config = self.config_entry(key);
        mutate(&config);
        self.propagate(key);
    }

    /// Sets whether configuration updates to `name` overwrite its subtree.
    pub fn set_configures_subtree(&self, name: &str, value: bool) {
        self.set_field(name, |config| {
            config.update(|s| s.configures_subtree = value);
        });
    }

    /// Enables or disables a domain. A disabled domain is totally quiet
    /// regardless of its severity ceiling.
    pub fn set_enabled(&self, name: &str, value: bool) {
        self.set_field(name, |config| config.update(|s| s.enabled = value));
    }

    /// Sets whether messages start with the current time.
    pub fn set_prints_time(&self, name: &str, value: bool) {
        self.set_field(name, |config| config.update(|s| s.print_time = value));
    }

    /// Sets whether messages include the qualified domain name.
    pub fn set_prints_name(&self, name: &str, value: bool) {
        self.set_field(name, |config| config.update(|s| s.print_name = value));
    }

    /// Sets whether messages include their level tag.
    pub fn set_prints_level(&self, name: &str, value: bool) {
        self.set_field(name, |config| config.update(|s| s.print_level = value));
    }

    /// Sets whether messages include their `file:line` call site.
    pub fn set_prints_location(&self, name: &str, value: bool) {
        self.set_field(name, |config| {
            config.update(|s| s.print_location = value);
        });
    }

    /// Sets the severity ceiling: the least-urgent level still emitted.
    pub fn set_max_level(&self, name: &str, value: Level) {
        self.set_field(name, |config| config.update(|s| s.max_level = value));
    }

    /// Replaces the set of sink kinds the domain writes to.
    pub fn set_stream_mask(&self, name: &str, mask: StreamMask) {
        self.set_field(name, |config| config.set_stream_mask(mask));
    }

    /// Sets a single sink kind. Shorthand for a one-element mask.
    pub fn set_stream(&self, name: &str, kind: StreamKind) {
        self.set_stream_mask(name, StreamMask::of(kind));
    }

    /// Enables a domain, optionally turning subtree configuration on first.
    pub fn enable(&self, name: &str, with_subtree: bool) {
        self.set_configures_subtree(name, with_subtree);
        self.set_enabled(name, true);
    }

    /// Disables a domain, optionally turning subtree configuration on first.
    pub fn disable(&self, name: &str, with_subtree: bool) {
        self.set_configures_subtree(name, with_subtree);
        self.set_enabled(name, false);
    }

    /// Sets the prefix used to build file-sink names as
    /// `<prefix><domain>.log`. Must be set before the first file sink opens;
    /// `basename(argv[0])` is the usual choice.
    pub fn set_output_file_name_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        assert!(!prefix.is_empty(), "file name prefix must not be empty");
        *self.shared.file_prefix.write() = Some(prefix);
    }

    /// The configured file-name prefix, if any.
    #[must_use]
    pub fn output_file_name_prefix(&self) -> Option<String> {
        self.shared.prefix()
    }

    /// Every configuration created so far, ordered by name. Used by the
    /// document export.
    pub(crate) fn all_configs(&self) -> Vec<Arc<DomainConfig>> {
        let mut configs: Vec<_> = self
            .shared
            .configs
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        configs.sort_by(|a, b| a.name().cmp(b.name()));
        configs
    }
}

/// Maps caller-supplied names onto the canonical convention: the root is
/// `"."`, every other name is a dot-path without a leading separator.
fn canonical(name: &str) -> &str {
    if name.is_empty() || name == ROOT_NAME {
        return ROOT_NAME;
    }
    name.strip_prefix('.').unwrap_or(name)
}
