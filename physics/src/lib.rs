//! Vehicle simulation: suspension and tires, the rigid body they push around, and the chase
//! camera that follows it. Every step is a deterministic function of the previous state, the
//! time step, the controls and the terrain.

extern crate nalgebra as na;
#[macro_use]
extern crate serde_derive;

pub mod camera;
pub mod spring;
pub mod sway;
pub mod terrain;
pub mod vehicle;
pub mod wheel;

pub use camera::ChaseCamera;
pub use spring::SpringDamper1D;
pub use sway::BodySway;
pub use terrain::{FlatTerrain, HeightField};
pub use vehicle::{drive_readout, BodyMode, SkipReason, StepOutcome, VehicleBody};
pub use wheel::{update_wheel, WheelContribution, WheelDrive};
