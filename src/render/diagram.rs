//! Class-diagram renderer
//!
//! Builds a directed graph of the catalog (one node per resource, one edge
//! per reference field or inheritance link) and emits GraphViz DOT with
//! record-shaped nodes listing each resource's fields. Enumerated fields get
//! a companion enum node.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::catalog::ResourceCatalog;
use crate::error::Result;
use crate::fields::{order_by_sink, AccessMode, FieldDescriptor, FieldType, FlattenContext, Flattener};
use crate::render::value_label;

/// A node in the class diagram
#[derive(Debug, Clone)]
struct DiagramNode {
    name: String,
    /// DOT record label; plain name for nodes only referenced, never defined
    label: Option<String>,
    group: Option<String>,
}

/// An edge in the class diagram
#[derive(Debug, Clone)]
enum DiagramEdge {
    /// Reference field, labeled with the field name and its multiplicity
    Relation { field: String, head_label: &'static str },
    /// Sub-resource to super-resource link
    Inheritance,
}

/// Renders the catalog as a GraphViz class diagram
pub struct DiagramRenderer<'a> {
    catalog: &'a ResourceCatalog,
}

impl<'a> DiagramRenderer<'a> {
    pub fn new(catalog: &'a ResourceCatalog) -> Self {
        DiagramRenderer { catalog }
    }

    /// Render the catalog to DOT
    pub fn render(&self) -> Result<String> {
        let graph = self.build_graph()?;
        Ok(to_dot(&graph))
    }

    fn build_graph(&self) -> Result<DiGraph<DiagramNode, DiagramEdge>> {
        let mut graph = DiGraph::new();
        let mut indices: HashMap<String, NodeIndex> = HashMap::new();
        let flattener = Flattener::new(self.catalog);

        for def in self.catalog.iter() {
            debug!(resource = %def.name, "adding resource to diagram");
            let ctx = FlattenContext::new(&def.type_name, AccessMode::None);
            let mut descriptors = flattener.flatten(&def.fields, &ctx)?;
            order_by_sink(&mut descriptors);

            let mut field_lines = Vec::new();
            let mut edges = Vec::new();
            for descriptor in &descriptors {
                match &descriptor.reference {
                    Some(target) => edges.push((
                        target.clone(),
                        DiagramEdge::Relation {
                            field: descriptor.name.clone(),
                            head_label: multiplicity(descriptor),
                        },
                    )),
                    None => field_lines.push(self.field_line(
                        &def.type_name,
                        descriptor,
                        &mut graph,
                        &mut indices,
                    )),
                }
            }

            let label = format!("{{{}|{}}}", def.type_name, field_lines.join("\\l"));
            let node = ensure_node(&mut graph, &mut indices, &def.type_name);
            graph[node].label = Some(label);
            graph[node].group = def.group.clone();

            for (target, edge) in edges {
                let target = ensure_node(&mut graph, &mut indices, &target);
                graph.add_edge(node, target, edge);
            }

            if let Some(parent) = &def.parent {
                let parent_type = self.catalog.type_name(parent)?.to_string();
                let parent_node = ensure_node(&mut graph, &mut indices, &parent_type);
                graph.add_edge(node, parent_node, DiagramEdge::Inheritance);
            }
        }

        Ok(graph)
    }

    /// One `+ name: type` line for the record label
    ///
    /// Enumerated fields are typed by a companion enum node instead of their
    /// primitive type.
    fn field_line(
        &self,
        type_name: &str,
        descriptor: &FieldDescriptor,
        graph: &mut DiGraph<DiagramNode, DiagramEdge>,
        indices: &mut HashMap<String, NodeIndex>,
    ) -> String {
        let mut line = format!("+ {}", descriptor.name);

        let has_enum = descriptor
            .attributes
            .allowed
            .as_ref()
            .map(|allowed| !allowed.is_empty())
            .unwrap_or(false);
        if has_enum {
            let enum_name = format!("{}Enum", type_name);
            let values = descriptor.attributes.allowed.as_deref().unwrap_or(&[]);
            let enum_label = format!(
                "{{{}\\lEnum|{}}}",
                enum_name,
                values.iter().map(value_label).collect::<Vec<_>>().join("\\l")
            );
            let node = ensure_node(graph, indices, &enum_name);
            graph[node].label = Some(enum_label);
            line.push_str(&format!(": {}", enum_name));
        } else {
            line.push_str(&format!(": {}", descriptor.field_type));
        }

        if !descriptor.attributes.is_required() {
            line.push_str(" [0..1]");
        }
        if descriptor.attributes.is_writeonly() {
            line.push_str(" (write-only)");
        }
        if descriptor.attributes.is_readonly() {
            line.push_str(" (read-only)");
        }
        line
    }
}

/// Multiplicity shown at the head of a relation edge
fn multiplicity(descriptor: &FieldDescriptor) -> &'static str {
    let is_list = matches!(descriptor.field_type, FieldType::List | FieldType::ListOf(_));
    match (is_list, descriptor.attributes.is_required()) {
        (false, true) => "1",
        (false, false) => "0..1",
        (true, true) => "*",
        (true, false) => "1..*",
    }
}

fn ensure_node(
    graph: &mut DiGraph<DiagramNode, DiagramEdge>,
    indices: &mut HashMap<String, NodeIndex>,
    name: &str,
) -> NodeIndex {
    if let Some(&index) = indices.get(name) {
        return index;
    }
    let index = graph.add_node(DiagramNode {
        name: name.to_string(),
        label: None,
        group: None,
    });
    indices.insert(name.to_string(), index);
    index
}

/// Emit the diagram graph as DOT, grouped into subgraphs where declared
fn to_dot(graph: &DiGraph<DiagramNode, DiagramEdge>) -> String {
    let mut output = String::new();
    output.push_str("digraph ClassDiagram {\n");
    output.push_str("  node [shape=record];\n");
    output.push('\n');

    // Nodes, grouped by their declared diagram group
    let groups: Vec<Option<&str>> = graph
        .node_indices()
        .map(|i| graph[i].group.as_deref())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    for group in groups {
        if let Some(group_name) = group {
            output.push_str(&format!("  subgraph {} {{\n", sanitize(group_name)));
        }
        for index in graph.node_indices() {
            let node = &graph[index];
            if node.group.as_deref() != group {
                continue;
            }
            let indent = if group.is_some() { "    " } else { "  " };
            match &node.label {
                Some(label) => {
                    output.push_str(&format!("{}\"{}\" [label=\"{}\"];\n", indent, node.name, label))
                }
                None => output.push_str(&format!("{}\"{}\";\n", indent, node.name)),
            }
        }
        if group.is_some() {
            output.push_str("  }\n");
        }
    }

    output.push('\n');

    for edge in graph.edge_references() {
        let source = &graph[edge.source()].name;
        let target = &graph[edge.target()].name;
        match edge.weight() {
            DiagramEdge::Relation { field, head_label } => output.push_str(&format!(
                "  \"{}\" -> \"{}\" [headlabel=\"{}\", taillabel=\"*\", label=\"{}\"];\n",
                source, target, head_label, field
            )),
            DiagramEdge::Inheritance => output.push_str(&format!(
                "  \"{}\" -> \"{}\" [arrowhead=empty];\n",
                source, target
            )),
        }
    }

    output.push_str("}\n");
    output
}

fn sanitize(name: &str) -> String {
    name.replace(|c: char| !c.is_ascii_alphanumeric(), "_")
}
