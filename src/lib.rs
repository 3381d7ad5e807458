#![allow(clippy::many_single_char_names, clippy::too_many_arguments)]
#[macro_use]
extern crate derive_more;
#[macro_use]
extern crate serde;
// http://prng.di.unimi.it/

mod random;
mod utils;
pub use crate::random::{norminv, PRng, RandomSource, StandardNormal, UnitCircle};
mod vector;
pub use crate::vector::{UnitVector, Vector};
mod error;
pub use crate::error::{Error, Result};
mod shape;
pub use crate::shape::{BoxShape, CAR_TOLERANCE, HALF_TOLERANCE};
mod geometry;
pub use crate::geometry::{
    Geometry, GeometryConfig, Location, Slab, Volume, LEAVING_DISTANCE, LEAVING_THRESHOLD, MATERIAL_ABSORBER,
    MATERIAL_GAP, MATERIAL_VACUUM,
};
mod track;
pub use crate::track::{ParticleKind, Track};
mod track_stack;
pub use crate::track_stack::TrackStack;
mod physics;
pub use crate::physics::{MaterialCutsTable, MscData, PhysicsEngine, TrackContext, MAX_SECONDARIES};
mod analog;
pub use crate::analog::{AnalogPhysics, MaterialData, ELECTRON_MASS};
mod results;
pub use crate::results::{Hist, PerEventResults, Results, RunSummary, Tally};
mod stepping;
pub use crate::stepping::{stack_secondaries, stepping_action, Fate, SteppingLoop, TrackHistory, TransportConfig};
mod sources;
pub use crate::sources::{PrimaryConfig, PrimaryGenerator, Source};
mod event_loop;
pub use crate::event_loop::{EventLoop, EventStats};
mod config;
pub use crate::config::SimulationConfig;
