//! Module descriptors and the session-wide module graph.

mod descriptor;
mod graph;

pub use descriptor::{ModuleDescriptor, PackageGrant, Provides, Requires};
pub use graph::{ModuleGraph, ModuleId, ModuleNode, ModuleOrigin};
