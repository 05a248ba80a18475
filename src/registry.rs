//! Package tree and type-name resolution.
//!
//! Mirrors the dotted package names declared by every file in a request. Each
//! node maps local message names to the borrowed message descriptors, so a
//! type name (absolute `.a.b.Msg`, relative `b.Msg`, or nested `Msg.Inner`)
//! resolves the way protoc scopes it: from the current package outwards.
//!
//! Nodes live in an arena; `parent` is an id, children are owned by the arena.
//! Nothing is removed or mutated once the tree is built.

use indexmap::IndexMap;
use prost_types::DescriptorProto;
use tracing::debug;

use crate::error::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(usize);

#[derive(Debug)]
pub struct PackageNode<'a> {
    /// full dotted path from the root (`""`, `.foo`, `.foo.bar`)
    pub name: String,
    pub parent: Option<PackageId>,
    pub children: IndexMap<String, PackageId>,
    pub types: IndexMap<String, &'a DescriptorProto>,
}

#[derive(Debug)]
pub struct PackageRegistry<'a> {
    nodes: Vec<PackageNode<'a>>,
}

impl<'a> Default for PackageRegistry<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PackageRegistry<'a> {
    pub const ROOT: PackageId = PackageId(0);

    pub fn new() -> Self {
        let root = PackageNode {
            name: String::new(),
            parent: None,
            children: IndexMap::new(),
            types: IndexMap::new(),
        };
        Self { nodes: vec![root] }
    }

    pub fn node(&self, id: PackageId) -> &PackageNode<'a> {
        &self.nodes[id.0]
    }

    /// Store `message` under its local name in the node for `package`,
    /// creating nodes along the way.
    pub fn register(&mut self, package: &str, message: &'a DescriptorProto) -> PackageId {
        let mut id = Self::ROOT;
        for segment in segments(package) {
            id = match self.nodes[id.0].children.get(segment) {
                Some(child) => *child,
                None => {
                    let child = PackageId(self.nodes.len());
                    let name = format!("{}.{}", self.nodes[id.0].name, segment);
                    self.nodes.push(PackageNode {
                        name,
                        parent: Some(id),
                        children: IndexMap::new(),
                        types: IndexMap::new(),
                    });
                    self.nodes[id.0].children.insert(segment.to_string(), child);
                    child
                }
            };
        }
        self.nodes[id.0].types.insert(message.name().to_string(), message);
        id
    }

    /// Resolve a file's declared package from the root. The empty package is
    /// the root itself.
    pub fn lookup_package(&self, package: &str) -> Result<PackageId, LookupError> {
        self.relative_lookup_package(Self::ROOT, package)
    }

    pub fn relative_lookup_package(&self, from: PackageId, path: &str) -> Result<PackageId, LookupError> {
        let mut id = from;
        for segment in segments(path) {
            id = *self.nodes[id.0]
                .children
                .get(segment)
                .ok_or_else(|| LookupError::NoSuchPackage(format!("{}.{}", self.nodes[id.0].name, segment)))?;
        }
        Ok(id)
    }

    /// Absolute names (leading dot) resolve from the root; anything else is
    /// tried from `context` and then from each ancestor in turn.
    pub fn lookup_type(&self, context: PackageId, name: &str) -> Result<&'a DescriptorProto, LookupError> {
        if let Some(absolute) = name.strip_prefix('.') {
            return self.relative_lookup_type(Self::ROOT, absolute);
        }
        let mut cursor = Some(context);
        while let Some(id) = cursor {
            match self.relative_lookup_type(id, name) {
                Ok(found) => return Ok(found),
                Err(error) => debug!(type_name = name, package = %self.nodes[id.0].name, %error, "type not found here"),
            }
            cursor = self.nodes[id.0].parent;
        }
        Err(LookupError::NotFound {
            name: name.to_string(),
            context: self.nodes[context.0].name.clone(),
        })
    }

    pub fn relative_lookup_type(&self, id: PackageId, name: &str) -> Result<&'a DescriptorProto, LookupError> {
        if name.is_empty() {
            return Err(LookupError::EmptyName);
        }
        let node = &self.nodes[id.0];
        match name.split_once('.') {
            None => node.types.get(name).copied().ok_or_else(|| LookupError::NotFound {
                name: name.to_string(),
                context: node.name.clone(),
            }),
            Some((head, rest)) => {
                debug!(head, rest, package = %node.name, "looking up qualified type");
                if let Some(child) = node.children.get(head) {
                    return self.relative_lookup_type(*child, rest);
                }
                if let Some(message) = node.types.get(head).copied() {
                    return relative_lookup_nested_type(message, rest);
                }
                Err(LookupError::NoSuchPackageOrMessage {
                    segment: head.to_string(),
                    package: node.name.clone(),
                })
            }
        }
    }
}

/// Walk `Outer.Inner.Deeper` through nested message declarations.
pub fn relative_lookup_nested_type<'a>(
    message: &'a DescriptorProto,
    name: &str,
) -> Result<&'a DescriptorProto, LookupError> {
    let mut current = message;
    for component in name.split('.') {
        current = current
            .nested_type
            .iter()
            .find(|nested| nested.name() == component)
            .ok_or_else(|| LookupError::NoSuchNestedMessage {
                component: component.to_string(),
                message: current.name().to_string(),
            })?;
    }
    Ok(current)
}

// Leading (and doubled) dots produce empty segments; none of them name a package.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::message;

    fn names(registry: &PackageRegistry, id: PackageId) -> String {
        registry.node(id).name.clone()
    }

    #[test]
    fn register_builds_dotted_nodes() {
        let msg = message("Payload", vec![]);
        let mut registry = PackageRegistry::new();
        let id = registry.register("acme.payments", &msg);

        assert_eq!(names(&registry, id), ".acme.payments");
        let parent = registry.node(id).parent.unwrap();
        assert_eq!(names(&registry, parent), ".acme");
        assert_eq!(registry.node(PackageRegistry::ROOT).name, "");
        assert!(registry.node(PackageRegistry::ROOT).parent.is_none());
        assert!(registry.node(id).types.contains_key("Payload"));
    }

    #[test]
    fn leading_dot_is_skipped() {
        let msg = message("Payload", vec![]);
        let mut registry = PackageRegistry::new();
        let a = registry.register(".acme", &msg);
        let b = registry.register("acme", &msg);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_package_is_the_root() {
        let msg = message("Loose", vec![]);
        let mut registry = PackageRegistry::new();
        assert_eq!(registry.register("", &msg), PackageRegistry::ROOT);
        assert_eq!(registry.lookup_package("").unwrap(), PackageRegistry::ROOT);
        assert!(std::ptr::eq(registry.lookup_type(PackageRegistry::ROOT, ".Loose").unwrap(), &msg));
    }

    #[test]
    fn absolute_names_resolve_from_root() {
        let msg = message("Payload", vec![]);
        let mut registry = PackageRegistry::new();
        let id = registry.register("acme.payments", &msg);
        let other = registry.register("other", &msg);

        let found = registry.lookup_type(other, ".acme.payments.Payload").unwrap();
        assert!(std::ptr::eq(found, &msg));
        assert!(registry.lookup_type(id, ".payments.Payload").is_err());
    }

    #[test]
    fn relative_names_walk_up_through_ancestors() {
        let outer = message("Shared", vec![]);
        let inner = message("Local", vec![]);
        let mut registry = PackageRegistry::new();
        registry.register("acme", &outer);
        let deep = registry.register("acme.payments.v1", &inner);

        assert!(std::ptr::eq(registry.lookup_type(deep, "Local").unwrap(), &inner));
        assert!(std::ptr::eq(registry.lookup_type(deep, "Shared").unwrap(), &outer));
        assert!(std::ptr::eq(registry.lookup_type(deep, "payments.v1.Local").unwrap(), &inner));
        assert_eq!(
            registry.lookup_type(deep, "Missing"),
            Err(LookupError::NotFound { name: "Missing".into(), context: ".acme.payments.v1".into() })
        );
    }

    #[test]
    fn nested_types_resolve_through_their_parent_message() {
        let mut outer = message("Outer", vec![]);
        let mut middle = message("Middle", vec![]);
        middle.nested_type.push(message("Inner", vec![]));
        outer.nested_type.push(middle);

        let mut registry = PackageRegistry::new();
        let id = registry.register("acme", &outer);

        let found = registry.lookup_type(id, ".acme.Outer.Middle.Inner").unwrap();
        assert_eq!(found.name(), "Inner");
        assert_eq!(
            registry.relative_lookup_type(id, "Outer.Middle.Nope"),
            Err(LookupError::NoSuchNestedMessage { component: "Nope".into(), message: "Middle".into() })
        );
    }

    #[test]
    fn unknown_segment_reports_package_searched() {
        let msg = message("Payload", vec![]);
        let mut registry = PackageRegistry::new();
        let id = registry.register("acme", &msg);
        assert_eq!(
            registry.relative_lookup_type(id, "billing.Invoice"),
            Err(LookupError::NoSuchPackageOrMessage { segment: "billing".into(), package: ".acme".into() })
        );
        assert_eq!(registry.relative_lookup_type(id, ""), Err(LookupError::EmptyName));
    }

    #[test]
    fn package_lookup_fails_on_missing_segment() {
        let msg = message("Payload", vec![]);
        let mut registry = PackageRegistry::new();
        let id = registry.register("acme.payments", &msg);
        assert_eq!(registry.lookup_package("acme.payments").unwrap(), id);
        assert_eq!(
            registry.lookup_package("acme.billing"),
            Err(LookupError::NoSuchPackage(".acme.billing".into()))
        );
    }
}
