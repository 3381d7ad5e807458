use crate::error::{Error, Result};
use crate::geometry::{Geometry, Location};
use crate::physics::{MaterialCutsTable, PhysicsEngine, TrackContext};
use crate::results::Results;
use crate::shape::HALF_TOLERANCE;
use crate::track::{ParticleKind, Track};
use crate::track_stack::TrackStack;
use crate::utils::sqr;

/// MSC displacements shorter than this are not applied (0.05 nm).
const GEOM_MIN_LENGTH: f64 = 5e-8;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Length of the push that moves a mis-located track across a boundary (mm).
    pub push_length: f64,
    /// Consecutive pushes allowed before the track is given up as stuck.
    pub max_consecutive_pushes: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            push_length: 1e-6,
            max_consecutive_pushes: 1_000_000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fate {
    /// Reached the calorimeter surface moving out.
    LeftDetector,
    /// Kinetic energy dropped to zero (absorbed, stopped or annihilated).
    Stopped,
}

/// What happened to one track over its history.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackHistory {
    pub fate: Fate,
    pub steps: u32,
    pub pushes: u32,
    /// Sum of the recorded (physical) step lengths.
    pub length: f64,
}

impl TrackHistory {
    fn new() -> Self {
        Self {
            fate: Fate::Stopped,
            steps: 0,
            pushes: 0,
            length: 0.0,
        }
    }
}

/// Shorter of the geometry and physics limits; ties go to the boundary.
fn select_step(dist_to_boundary: f64, dist_to_physics: f64) -> (f64, bool) {
    if dist_to_physics < dist_to_boundary {
        (dist_to_physics.max(0.0), false)
    } else {
        (dist_to_boundary, true)
    }
}

/// Step-by-step history driver of a single track.
///
/// The engine only ever sees the track through the [`TrackContext`]; the
/// loop owns navigation, step selection and secondary bookkeeping.
pub struct SteppingLoop<'a, P: ?Sized> {
    engine: &'a P,
    geometry: &'a Geometry,
    material_cuts: &'a MaterialCutsTable,
    config: TransportConfig,
}

impl<'a, P: PhysicsEngine + ?Sized> SteppingLoop<'a, P> {
    pub fn new(
        engine: &'a P,
        geometry: &'a Geometry,
        material_cuts: &'a MaterialCutsTable,
        config: TransportConfig,
    ) -> Self {
        Self {
            engine,
            geometry,
            material_cuts,
            config,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        self.geometry
    }

    /// Runs the track in `ctx` to the end of its history with the stepper of its species.
    pub fn track(&self, ctx: &mut TrackContext, stack: &mut TrackStack, results: &mut Results) -> Result<TrackHistory> {
        match ctx.track.kind() {
            ParticleKind::Gamma => self.gamma_stepper(ctx, stack, results),
            ParticleKind::Electron | ParticleKind::Positron => self.electron_stepper(ctx, stack, results),
        }
    }

    fn push(&self, track: &mut Track, pushes: &mut u32, history: &mut TrackHistory) -> Result<()> {
        *pushes += 1;
        history.pushes += 1;
        if *pushes > self.config.max_consecutive_pushes {
            return Err(Error::RelocationLimit {
                track_id: track.id,
                pushes: *pushes,
                position: track.position,
            });
        }
        log::trace!("track {}: push at {}", track.id, track.position);
        track.position = (*track.direction).mul_add(self.config.push_length, track.position);
        Ok(())
    }

    fn material_cuts_index(&self, loc: &Location) -> Result<usize> {
        self.material_cuts
            .get(self.geometry.volume(loc.volume).material_index())
    }

    pub fn gamma_stepper(
        &self,
        ctx: &mut TrackContext,
        stack: &mut TrackStack,
        results: &mut Results,
    ) -> Result<TrackHistory> {
        let mut history = TrackHistory::new();
        let mut pushes = 0u32;
        while ctx.track.ekin > 0.0 {
            let loc = self.geometry.locate(ctx.track.position, ctx.track.direction);
            if loc.is_leaving() {
                history.fate = Fate::LeftDetector;
                return Ok(history);
            }
            let pre_step_safety = self.geometry.volume(loc.volume).safety(loc.local);
            ctx.track.mc_index = self.material_cuts_index(&loc)?;
            ctx.track.on_boundary = pre_step_safety == 0.0;
            self.engine.how_far(ctx);

            let (step_length, on_boundary) = select_step(loc.distance, ctx.track.step_length);
            if step_length == 0.0 {
                self.push(&mut ctx.track, &mut pushes, &mut history)?;
                continue;
            }
            pushes = 0;
            let track = &mut ctx.track;
            track.position = (*track.direction).mul_add(step_length, track.position);
            track.step_length = step_length;
            track.on_boundary = on_boundary;
            track.energy_deposit = 0.0;
            ctx.msc.reset();
            self.engine.perform(ctx);

            stack_secondaries(ctx, stack);
            stepping_action(results, &ctx.track, step_length, &loc);
            history.steps += 1;
            history.length += step_length;
        }
        Ok(history)
    }

    /// Like [`Self::gamma_stepper`], plus the multiple-scattering
    /// corrections reported by the engine: the true path length replaces
    /// the geometric one in the tallies, and the lateral displacement is
    /// applied when the step did not end on a boundary.
    ///
    /// The pre-step safety is only computed on the first step; after that
    /// the on-boundary flag of the previous post-step point is reused. This
    /// relies on every volume being a convex box.
    pub fn electron_stepper(
        &self,
        ctx: &mut TrackContext,
        stack: &mut TrackStack,
        results: &mut Results,
    ) -> Result<TrackHistory> {
        let mut history = TrackHistory::new();
        let mut pushes = 0u32;
        let mut was_on_boundary = false;
        while ctx.track.ekin > 0.0 {
            let loc = self.geometry.locate(ctx.track.position, ctx.track.direction);
            if loc.is_leaving() {
                history.fate = Fate::LeftDetector;
                return Ok(history);
            }
            let volume = self.geometry.volume(loc.volume);
            let safety = volume.safety(loc.local);
            let pre_on_boundary = if history.steps == 0 {
                safety < HALF_TOLERANCE
            } else {
                was_on_boundary
            };
            ctx.track.mc_index = self.material_cuts_index(&loc)?;
            ctx.track.on_boundary = pre_on_boundary;
            ctx.track.safety = if pre_on_boundary { 0.0 } else { safety };
            self.engine.how_far(ctx);

            let (step_length, on_boundary) = select_step(loc.distance, ctx.track.step_length);
            if step_length == 0.0 {
                self.push(&mut ctx.track, &mut pushes, &mut history)?;
                continue;
            }
            pushes = 0;
            let org_direction = ctx.track.direction;
            let track = &mut ctx.track;
            track.position = (*track.direction).mul_add(step_length, track.position);
            track.step_length = step_length;
            track.on_boundary = on_boundary;
            track.energy_deposit = 0.0;
            was_on_boundary = on_boundary;
            ctx.msc.reset();
            self.engine.perform(ctx);

            let true_step_length = if ctx.msc.true_step_length > 0.0 {
                ctx.msc.true_step_length
            } else {
                step_length
            };

            if !on_boundary {
                let displacement = ctx.msc.displacement;
                let d_length2 = displacement.norm_sqr();
                if d_length2 > sqr(GEOM_MIN_LENGTH) {
                    let disp_r = d_length2.sqrt();
                    // post-step point along the original direction, in the pre-step volume
                    let local_post = (*org_direction).mul_add(step_length, loc.local);
                    let post_safety = 0.99 * volume.safety(local_post);
                    if disp_r < post_safety {
                        ctx.track.position = ctx.track.position + displacement;
                    } else if post_safety > GEOM_MIN_LENGTH {
                        ctx.track.position = displacement.mul_add(post_safety / disp_r, ctx.track.position);
                    }
                }
            }

            stack_secondaries(ctx, stack);
            stepping_action(results, &ctx.track, true_step_length, &loc);
            history.steps += 1;
            history.length += true_step_length;
        }
        Ok(history)
    }
}

/// Moves the secondaries produced in the last step onto the stack, stamped
/// with fresh ids and born at the primary's post-step point.
pub fn stack_secondaries(ctx: &mut TrackContext, stack: &mut TrackStack) {
    let primary = &ctx.track;
    for mut secondary in ctx.secondaries.drain(..) {
        secondary.id = stack.next_track_id();
        secondary.parent_id = Some(primary.id);
        secondary.position = primary.position;
        secondary.mc_index = primary.mc_index;
        stack.push(&secondary);
    }
}

/// Tallies one step, provided it was taken inside the calorimeter.
pub fn stepping_action(results: &mut Results, track: &Track, step_length: f64, loc: &Location) {
    let layer = match loc.layer {
        Some(layer) => layer,
        None => return,
    };
    results.record_edep(layer, loc.slab, track.energy_deposit);
    results.record_step(layer, step_length, track.kind());
}
