//! Block type/state registry and model-derivation compiler.
//!
//! Runs once at process startup: a declarative block table is interpreted
//! into a combinatorial state space, deduplicated box geometry per state,
//! and the per-state light tables. After [`registry::WorldBuilder::finalize`]
//! the resulting [`registry::WorldConfig`] is immutable and shared read-only
//! with the protocol, collision, and lighting code for the rest of the
//! process lifetime.
#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod props;
pub mod registry;
pub mod state;
pub mod types;
pub mod vanilla;

pub use builder::BlockConfig;
pub use error::BuildError;
pub use model::{BlockModel, MODEL_EMPTY, ModelRegistry};
pub use props::{PropertySpec, PropertyTable};
pub use registry::{NameRegistry, WorldBuilder, WorldConfig};
pub use state::{SchemaEntry, StateInfo};
pub use types::{Behaviour, BlockStateId, BlockTypeId, ModelId, PropertyId};
