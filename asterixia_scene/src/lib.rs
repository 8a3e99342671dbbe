//! In-memory model of the sky overlay: celestial bodies, rotation axes, guide
//! lines and labels, plus the generators and per-frame animation that act on it.

pub mod animation;
pub mod color;
pub mod graph;
pub mod node_arena;
pub mod nodes;
pub mod orbit;
pub mod scale;

pub use animation::{AnimationClock, GLOBAL_SPIN_STEP_DEG};
pub use color::Color;
pub use graph::SceneGraph;
pub use node_arena::NodeArena;
pub use nodes::*;
pub use orbit::{ORBIT_SEGMENTS, OrbitalPathDesc, GuideCircleDesc, orbital_path_points};
pub use scale::BodyKind;
