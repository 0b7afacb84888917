//! Project — the shared workspace the tree builder resolves against.
//!
//! Holds the tag manifest (namespace + tag name → qualified class
//! name), per-class property tables, the well-known runtime class
//! names, and the expression-dependency registry that later code
//! generation consumes.
//!
//! One project is shared by every document builder in a compilation.
//! Resolution is read-only; dependency registration is an append and
//! goes through a lock, so independent documents may build
//! concurrently against the same project.

use std::fmt;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

// ============================================================================
// QUALIFIED NAMES
// ============================================================================

/// A dot-separated fully qualified runtime class name, e.g.
/// `ui.controls.Button`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName(SmolStr);

impl QName {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last dotted segment (`Button` for `ui.controls.Button`).
    pub fn local_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// WELL-KNOWN RUNTIME CLASSES
// ============================================================================

/// The kind of remote-invocation service a class represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Binary remoting; operations arrive as `<method>` child tags.
    Remoting,
    /// SOAP; operations arrive as `<operation>` child tags.
    Soap,
}

/// Qualified names of the runtime classes the builder must know about.
///
/// Defaults name the standard runtime; embedders with a different
/// runtime substitute their own set.
#[derive(Debug, Clone)]
pub struct WellKnownTypes {
    /// Concrete factory class every factory node instantiates.
    pub factory_class: QName,
    /// Interface marking factory-typed properties.
    pub factory_interface: QName,
    /// Class backing `<DesignLayer>` tags; its declared properties are
    /// settable as layer attributes.
    pub design_layer: QName,
    /// Remoting service class; its `method` children specialize.
    pub remote_service: QName,
    /// SOAP service class; its `operation` children specialize.
    pub web_service: QName,
    /// Network-request service class; its `request` child specializes.
    pub http_service: QName,
    /// Operation class for remoting services.
    pub remoting_operation: QName,
    /// Operation class for SOAP services.
    pub soap_operation: QName,
    /// Metadata class behind `@Embed(...)`.
    pub embed_asset: QName,
    /// Metadata class behind `@Resource(...)`.
    pub resource_bundle: QName,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        Self {
            factory_class: QName::new("ui.core.ClassFactory"),
            factory_interface: QName::new("ui.core.IFactory"),
            design_layer: QName::new("ui.core.DesignLayer"),
            remote_service: QName::new("ui.rpc.remoting.RemoteService"),
            web_service: QName::new("ui.rpc.soap.WebService"),
            http_service: QName::new("ui.rpc.http.HttpService"),
            remoting_operation: QName::new("ui.rpc.remoting.Operation"),
            soap_operation: QName::new("ui.rpc.soap.Operation"),
            embed_asset: QName::new("ui.embedding.EmbedAsset"),
            resource_bundle: QName::new("ui.resources.ResourceBundle"),
        }
    }
}

// ============================================================================
// PROJECT
// ============================================================================

/// A property known on a class, with its declared type when the
/// manifest supplies one.
#[derive(Debug, Clone, Default)]
pub struct PropertyDef {
    pub type_name: Option<QName>,
}

/// The shared compilation workspace.
pub struct Project {
    well_known: WellKnownTypes,
    /// (namespace URI, tag local name) → qualified class name.
    manifest: FxHashMap<(SmolStr, SmolStr), QName>,
    /// Per-class property tables, in declaration order.
    properties: FxHashMap<QName, IndexMap<SmolStr, PropertyDef>>,
    /// Qualified names the built trees depend on for code generation.
    expression_deps: RwLock<FxHashSet<QName>>,
}

impl Project {
    pub fn new() -> Self {
        Self::with_well_known(WellKnownTypes::default())
    }

    pub fn with_well_known(well_known: WellKnownTypes) -> Self {
        Self {
            well_known,
            manifest: FxHashMap::default(),
            properties: FxHashMap::default(),
            expression_deps: RwLock::new(FxHashSet::default()),
        }
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    // ------------------------------------------------------------------
    // Registration (done while assembling the project, before builds)
    // ------------------------------------------------------------------

    /// Map a tag in a namespace to a runtime class.
    pub fn register_tag(
        &mut self,
        namespace: impl Into<SmolStr>,
        tag_name: impl Into<SmolStr>,
        class: QName,
    ) {
        self.manifest
            .insert((namespace.into(), tag_name.into()), class);
    }

    /// Declare a property on a class.
    pub fn register_property(
        &mut self,
        class: QName,
        name: impl Into<SmolStr>,
        type_name: Option<QName>,
    ) {
        self.properties
            .entry(class)
            .or_default()
            .insert(name.into(), PropertyDef { type_name });
    }

    // ------------------------------------------------------------------
    // Resolution (read-only, callable from any builder thread)
    // ------------------------------------------------------------------

    /// Resolve a tag's namespace-qualified name to a class.
    pub fn resolve_tag(&self, namespace: &str, tag_name: &str) -> Option<&QName> {
        self.manifest
            .get(&(SmolStr::new(namespace), SmolStr::new(tag_name)))
    }

    /// Whether `class` declares a property named `name`.
    pub fn class_has_property(&self, class: &QName, name: &str) -> bool {
        self.properties
            .get(class)
            .is_some_and(|props| props.contains_key(name))
    }

    /// The declared type of `class.name`, when known.
    pub fn property_type(&self, class: &QName, name: &str) -> Option<&QName> {
        self.properties
            .get(class)?
            .get(name)?
            .type_name
            .as_ref()
    }

    /// Which service kind a class represents, if any.
    pub fn service_kind(&self, class: &QName) -> Option<ServiceKind> {
        if *class == self.well_known.remote_service {
            Some(ServiceKind::Remoting)
        } else if *class == self.well_known.web_service {
            Some(ServiceKind::Soap)
        } else {
            None
        }
    }

    /// The well-known operation class for a service kind.
    pub fn operation_class(&self, kind: ServiceKind) -> &QName {
        match kind {
            ServiceKind::Remoting => &self.well_known.remoting_operation,
            ServiceKind::Soap => &self.well_known.soap_operation,
        }
    }

    /// Whether a class takes the network-request specialization.
    pub fn is_request_style(&self, class: &QName) -> bool {
        *class == self.well_known.http_service
    }

    // ------------------------------------------------------------------
    // Dependency registry (concurrent append)
    // ------------------------------------------------------------------

    /// Record that built trees depend on `class` for code generation.
    pub fn add_expression_dependency(&self, class: QName) {
        self.expression_deps.write().insert(class);
    }

    /// Snapshot of the registered dependencies, sorted for determinism.
    pub fn expression_dependencies(&self) -> Vec<QName> {
        let mut deps: Vec<_> = self.expression_deps.read().iter().cloned().collect();
        deps.sort();
        deps
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("manifest_entries", &self.manifest.len())
            .field("classes_with_properties", &self.properties.len())
            .field("expression_deps", &self.expression_deps.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_resolution() {
        let mut project = Project::new();
        project.register_tag("lib://ui", "Button", QName::new("ui.controls.Button"));
        assert_eq!(
            project.resolve_tag("lib://ui", "Button").map(QName::as_str),
            Some("ui.controls.Button")
        );
        assert!(project.resolve_tag("lib://ui", "Missing").is_none());
    }

    #[test]
    fn dependency_registry_deduplicates() {
        let project = Project::new();
        project.add_expression_dependency(QName::new("ui.core.ClassFactory"));
        project.add_expression_dependency(QName::new("ui.core.ClassFactory"));
        assert_eq!(project.expression_dependencies().len(), 1);
    }

    #[test]
    fn qname_local_name() {
        assert_eq!(QName::new("ui.controls.Button").local_name(), "Button");
        assert_eq!(QName::new("Button").local_name(), "Button");
    }
}
