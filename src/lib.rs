//! Resource Documentation Generator
//!
//! Turns the declarative schemas of a resource-oriented API into two
//! human-facing artifacts: endpoint documentation (RST, compatible with
//! `sphinxcontrib.httpdomain`) and class-relationship diagrams (GraphViz
//! DOT).
//!
//! ## Architecture
//!
//! Both artifacts are driven by the same transformation: a nested resource
//! schema is flattened into a flat, ordered list of field descriptors.
//!
//! ```text
//! catalog (*.resource.json)
//!   └── ResourceDef ── schema: SchemaNode tree
//!         └── Flattener ── FieldDescriptor list (dotted names, references)
//!               ├── RstRenderer     -> api.rst
//!               └── DiagramRenderer -> diagram.dot / .svg
//! ```
//!
//! Flattening is pure and stateless: one pass per resource and access mode,
//! no caching, no mutation of the externally-owned schema trees.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod naming;
pub mod render;
pub mod schema;
pub mod special;
pub mod units;

pub use catalog::{ResourceCatalog, ResourceDef};
pub use config::DocConfig;
pub use error::{DocError, Result};
pub use fields::{order_by_sink, AccessMode, FieldDescriptor, FieldType, FlattenContext, Flattener};
pub use render::{DiagramRenderer, RstRenderer};
pub use schema::{FieldAttributes, SchemaNode};
