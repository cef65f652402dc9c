//! Flattened field layout
//!
//! A class map is a tree: reference maps own their nested maps. Record
//! processing wants the flat view instead. [`FieldLayout`] walks the tree
//! once and stores every class map it meets as a node in an arena addressed
//! by [`NodeId`], together with one [`FieldBinding`] per property map that
//! carries the full member path and the effective (prefixed) header names.
//!
//! Nodes are stored depth-first, so a parent always precedes its children.
//! Default reference prefixes are resolved here, with the separator of the
//! configuration the layout is built for.
//!
//! Reference maps interpret their indices in the parent record's field
//! space, and nothing stops two siblings from claiming the same field.
//! [`FieldLayout::collisions`] reports such overlaps; nothing enforces them.

use std::fmt;

use csvmap_core::{MappingConfig, MemberPath, DEFAULT_PREFIX_SEPARATOR};
use smallvec::SmallVec;

use crate::class_map::RawClassMap;
use crate::property_map::PropertyMap;

/// Handle of a node in a [`FieldLayout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a node is attached to its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOrigin {
    /// The class map the layout was built from
    Root,
    /// A property reference map for the named property
    Property(String),
    /// A parameter reference map for the named constructor parameter
    Parameter(String),
}

/// One class map in the layout
#[derive(Debug)]
pub struct LayoutNode<'a> {
    map: &'a RawClassMap,
    parent: Option<NodeId>,
    origin: NodeOrigin,
    path: MemberPath,
    prefix: String,
    children: Vec<NodeId>,
    bindings: Vec<usize>,
}

impl<'a> LayoutNode<'a> {
    /// The class map of this node
    pub fn map(&self) -> &'a RawClassMap {
        self.map
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// How the node hangs off its parent
    pub fn origin(&self) -> &NodeOrigin {
        &self.origin
    }

    /// Member path from the root type to this node
    pub fn path(&self) -> &MemberPath {
        &self.path
    }

    /// Accumulated header prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Child nodes: parameter reference maps first, then property reference maps
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Positions of this node's bindings in [`FieldLayout::bindings`]
    pub fn binding_positions(&self) -> &[usize] {
        &self.bindings
    }
}

/// A property map placed in the flat record
#[derive(Debug)]
pub struct FieldBinding<'a> {
    node: NodeId,
    path: MemberPath,
    property: &'a PropertyMap,
    names: SmallVec<[String; 1]>,
}

impl<'a> FieldBinding<'a> {
    /// Node owning the property map
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Full member path from the root type
    pub fn path(&self) -> &MemberPath {
        &self.path
    }

    /// The property map
    pub fn property(&self) -> &'a PropertyMap {
        self.property
    }

    /// Effective candidate names, prefix applied
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name written to the header
    pub fn header_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// Fields claimed by explicit index, inclusive
    fn index_span(&self) -> Option<(usize, usize)> {
        let start = self.property.index()?;
        let end = self.property.index_end().unwrap_or(start).max(start);
        Some((start, end))
    }
}

/// Two bindings from different nodes claiming the same field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCollision {
    /// Overlapping explicit indices
    Index {
        /// First index claimed by both
        index: usize,
        /// Earlier binding
        first: MemberPath,
        /// Later binding
        second: MemberPath,
    },
    /// Same effective header name
    Name {
        /// The shared name
        name: String,
        /// Earlier binding
        first: MemberPath,
        /// Later binding
        second: MemberPath,
    },
}

impl fmt::Display for FieldCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldCollision::Index {
                index,
                first,
                second,
            } => write!(f, "index {} used by '{}' and '{}'", index, first, second),
            FieldCollision::Name {
                name,
                first,
                second,
            } => write!(f, "name '{}' used by '{}' and '{}'", name, first, second),
        }
    }
}

/// Arena view of a class map tree
#[derive(Debug)]
pub struct FieldLayout<'a> {
    nodes: Vec<LayoutNode<'a>>,
    bindings: Vec<FieldBinding<'a>>,
}

impl<'a> FieldLayout<'a> {
    /// Flatten `map` with the default prefix separator
    pub fn new(map: &'a RawClassMap) -> Self {
        Self::with_separator(map, DEFAULT_PREFIX_SEPARATOR)
    }

    /// Flatten `map` using the prefix separator of `config`
    pub fn with_config(map: &'a RawClassMap, config: &MappingConfig) -> Self {
        Self::with_separator(map, &config.prefix_separator)
    }

    fn with_separator(map: &'a RawClassMap, separator: &str) -> Self {
        let mut layout = FieldLayout {
            nodes: Vec::new(),
            bindings: Vec::new(),
        };
        layout.push_node(
            map,
            separator,
            None,
            NodeOrigin::Root,
            MemberPath::root(),
            String::new(),
        );
        layout
    }

    fn push_node(
        &mut self,
        map: &'a RawClassMap,
        separator: &str,
        parent: Option<NodeId>,
        origin: NodeOrigin,
        path: MemberPath,
        prefix: String,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(LayoutNode {
            map,
            parent,
            origin,
            path: path.clone(),
            prefix: prefix.clone(),
            children: Vec::new(),
            bindings: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }

        for property in map.property_maps() {
            let position = self.bindings.len();
            self.bindings.push(FieldBinding {
                node: id,
                path: path.clone().key(property.member()),
                property,
                names: property.header_names(&prefix).collect(),
            });
            self.nodes[id.0].bindings.push(position);
        }

        for parameter in map.parameter_maps() {
            let name = parameter.parameter().name.clone();
            let own = parameter.resolved_prefix(separator).unwrap_or_default();
            let child_prefix = format!("{}{}", prefix, own);
            self.push_node(
                parameter.map(),
                separator,
                Some(id),
                NodeOrigin::Parameter(name.clone()),
                path.clone().key(name),
                child_prefix,
            );
        }

        for reference in map.reference_maps() {
            let own = reference.resolved_prefix(separator).unwrap_or_default();
            let child_prefix = format!("{}{}", prefix, own);
            self.push_node(
                reference.map(),
                separator,
                Some(id),
                NodeOrigin::Property(reference.member().to_string()),
                path.clone().key(reference.member()),
                child_prefix,
            );
        }

        id
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node by handle
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this layout.
    pub fn node(&self, id: NodeId) -> &LayoutNode<'a> {
        &self.nodes[id.0]
    }

    /// All nodes, parents before children
    pub fn nodes(&self) -> &[LayoutNode<'a>] {
        &self.nodes
    }

    /// All bindings in declaration order
    pub fn bindings(&self) -> &[FieldBinding<'a>] {
        &self.bindings
    }

    /// Bindings owned by `id`
    pub fn bindings_of(&self, id: NodeId) -> impl Iterator<Item = &FieldBinding<'a>> + '_ {
        self.nodes[id.0]
            .bindings
            .iter()
            .map(move |&position| &self.bindings[position])
    }

    /// Binding for the full member path `path`
    pub fn binding(&self, path: &MemberPath) -> Option<&FieldBinding<'a>> {
        self.bindings.iter().find(|b| &b.path == path)
    }

    /// Bindings in output order
    ///
    /// Ignored members are left out. Bindings with an explicit index come
    /// first, ordered by index; the rest follow in declaration order.
    pub fn write_order(&self) -> Vec<&FieldBinding<'a>> {
        let mut order: Vec<_> = self
            .bindings
            .iter()
            .filter(|b| !b.property.is_ignored())
            .collect();
        order.sort_by_key(|b| b.property.index().unwrap_or(usize::MAX));
        order
    }

    /// Header row matching [`FieldLayout::write_order`]
    pub fn header(&self) -> Vec<String> {
        self.write_order()
            .into_iter()
            .map(|b| b.header_name().to_string())
            .collect()
    }

    /// Fields claimed by bindings of more than one node
    ///
    /// Only bindings that read a field are considered. Bindings inside the
    /// same class map are the caller's own business and are not compared.
    pub fn collisions(&self) -> Vec<FieldCollision> {
        let readers: Vec<_> = self
            .bindings
            .iter()
            .filter(|b| b.property.reads_field())
            .collect();

        let mut found = Vec::new();
        for (i, first) in readers.iter().enumerate() {
            for second in &readers[i + 1..] {
                if first.node == second.node {
                    continue;
                }
                match (first.index_span(), second.index_span()) {
                    (Some((a_start, a_end)), Some((b_start, b_end))) => {
                        if a_start <= b_end && b_start <= a_end {
                            found.push(FieldCollision::Index {
                                index: a_start.max(b_start),
                                first: first.path.clone(),
                                second: second.path.clone(),
                            });
                        }
                    }
                    (None, None) => {
                        if let Some(name) = first.names.iter().find(|n| second.names.contains(n)) {
                            found.push(FieldCollision::Name {
                                name: name.clone(),
                                first: first.path.clone(),
                                second: second.path.clone(),
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        found
    }
}
