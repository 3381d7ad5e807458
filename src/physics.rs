use rand::SeedableRng;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::random::PRng;
use crate::track::Track;
use crate::vector::Vector;

/// Number of secondary slots kept inline in a [`TrackContext`].
pub const MAX_SECONDARIES: usize = 4;

/// Multiple-scattering output of the last `perform` on a charged track.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MscData {
    /// Physical path length of the step; zero when it equals the geometric one.
    pub true_step_length: f64,
    /// Lateral displacement to apply at the post-step point.
    pub displacement: Vector<f64>,
}

impl MscData {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-thread scratch the physics engine works on: the track being
/// simulated, its secondaries and the random engine.
#[derive(Debug, Clone)]
pub struct TrackContext {
    pub track: Track,
    pub msc: MscData,
    pub secondaries: SmallVec<[Track; MAX_SECONDARIES]>,
    /// Set by `how_far` when the step limit comes from a discrete interaction.
    pub discrete_pending: bool,
    pub rng: PRng,
}

impl TrackContext {
    pub fn new(rng: PRng) -> Self {
        Self {
            track: Track::default(),
            msc: MscData::default(),
            secondaries: SmallVec::new(),
            discrete_pending: false,
            rng,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(PRng::seed_from_u64(seed))
    }

    pub fn reset_for_tracking(&mut self) {
        self.track.reset();
        self.msc.reset();
        self.secondaries.clear();
        self.discrete_pending = false;
    }

    pub fn add_secondary(&mut self, track: Track) {
        self.secondaries.push(track);
    }
}

/// Step limitation and interactions, for photons and e-/e+ alike.
///
/// `how_far` reads position, direction, energy, `mc_index`, `on_boundary`
/// (and `safety` for charged tracks) and writes the straight-line distance
/// to the next physics-driven event into `track.step_length`.
///
/// `perform` is called after the track was moved by the chosen
/// `step_length`, with `on_boundary` telling whether the geometry limited
/// the step. It updates energy, direction, `energy_deposit`, the MSC data
/// and may add secondaries.
pub trait PhysicsEngine {
    fn how_far(&self, ctx: &mut TrackContext);
    fn perform(&self, ctx: &mut TrackContext);
}

impl<P: PhysicsEngine + ?Sized> PhysicsEngine for &P {
    fn how_far(&self, ctx: &mut TrackContext) {
        P::how_far(*self, ctx)
    }

    fn perform(&self, ctx: &mut TrackContext) {
        P::perform(*self, ctx)
    }
}

/// Maps geometry material indices to the engine's material-cuts couples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCutsTable(Vec<usize>);

impl MaterialCutsTable {
    pub fn new(mc_indices: Vec<usize>) -> Self {
        Self(mc_indices)
    }

    /// Material `i` maps onto couple `i`.
    pub fn identity(num_materials: usize) -> Self {
        Self((0..num_materials).collect())
    }

    pub fn get(&self, material: usize) -> Result<usize> {
        self.0
            .get(material)
            .copied()
            .ok_or(Error::UnknownMaterial { material })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::ParticleKind;
    use crate::vector::UnitVector;

    #[test]
    fn material_lookup() {
        let table = MaterialCutsTable::new(vec![0, 2, 1]);
        assert_eq!(table.get(1).unwrap(), 2);
        assert!(matches!(table.get(3), Err(Error::UnknownMaterial { material: 3 })));
        assert_eq!(MaterialCutsTable::identity(3).get(2).unwrap(), 2);
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn reset_for_tracking_clears_scratch() {
        let mut ctx = TrackContext::from_seed(1);
        ctx.track = Track::new(ParticleKind::Electron, 5.0, Vector::zero(), UnitVector::x_axis());
        ctx.msc.true_step_length = 1.0;
        ctx.discrete_pending = true;
        for _ in 0..2 * MAX_SECONDARIES {
            ctx.add_secondary(Track::default());
        }
        ctx.reset_for_tracking();
        assert_eq!(ctx.track, Track::default());
        assert_eq!(ctx.msc, MscData::default());
        assert!(ctx.secondaries.is_empty());
        assert!(!ctx.discrete_pending);
    }
}
