//! Core graph data structures

mod edge;
mod node;
mod store;


pub use edge::{Edge, EdgeDecl, FanOut};
pub use node::{NodeAttrs, NodeDecl, NodeName, DEFAULT_KIND};
pub use store::{GraphDocument, GraphStore, LoadError, LoadResult};
