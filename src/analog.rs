use rand::prelude::{Distribution, Rng};

use crate::physics::{PhysicsEngine, TrackContext};
use crate::random::{RandomSource, StandardNormal, UnitCircle};
use crate::track::{ParticleKind, Track};
use crate::utils::{sqr, BoolExt};
use crate::vector::{UnitVector, Vector};

/// MeV
pub const ELECTRON_MASS: f64 = 0.510_998_95;

/// Per material-cuts couple constants of the analog engine.
///
/// Lengths in mm, energies in MeV. Vacuum has infinite lengths and no
/// stopping power.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialData {
    pub name: &'static str,
    pub photon_attenuation_length: f64,
    /// MeV / mm
    pub stopping_power: f64,
    pub radiation_length: f64,
    /// Secondaries below this kinetic energy are deposited on the spot.
    pub production_threshold: f64,
}

impl MaterialData {
    pub const VACUUM: MaterialData = MaterialData {
        name: "Galactic",
        photon_attenuation_length: f64::INFINITY,
        stopping_power: 0.0,
        radiation_length: f64::INFINITY,
        production_threshold: 0.1,
    };

    pub const PBWO4: MaterialData = MaterialData {
        name: "PbWO4",
        photon_attenuation_length: 11.4,
        stopping_power: 1.02,
        radiation_length: 8.9,
        production_threshold: 0.1,
    };

    pub const LIQUID_ARGON: MaterialData = MaterialData {
        name: "liquidArgon",
        photon_attenuation_length: 180.0,
        stopping_power: 0.211,
        radiation_length: 140.0,
        production_threshold: 0.1,
    };

    fn is_vacuum(&self) -> bool {
        !self.radiation_length.is_finite()
    }
}

/// Small analog electromagnetic engine for gamma, e- and e+.
///
/// Photons fly exponential free paths and then undergo photo-absorption,
/// pair conversion or Compton scattering. Charged tracks lose energy
/// continuously, scatter following the Highland formula and radiate
/// bremsstrahlung photons; positrons annihilate at rest.
#[derive(Debug, Clone)]
pub struct AnalogPhysics {
    materials: Vec<MaterialData>,
    /// Charged tracks below this kinetic energy stop and deposit it.
    pub tracking_cut: f64,
    /// Photons below this energy are photo-absorbed at their next interaction.
    pub photo_absorption_limit: f64,
    /// Largest fraction of the residual range travelled in one step.
    pub range_fraction: f64,
    /// mm
    pub min_step: f64,
}

impl Default for AnalogPhysics {
    fn default() -> Self {
        Self::new(vec![
            MaterialData::VACUUM,
            MaterialData::PBWO4,
            MaterialData::LIQUID_ARGON,
        ])
    }
}

fn henyey_greenstein_phase(g: f64, rand: f64) -> f64 {
    if g != 0.0 {
        let g2 = sqr(g);
        (1.0 / (2.0 * g)) * (1.0 + g2 - sqr((1.0 - g2) / (1.0 - g + 2.0 * g * rand)))
    } else {
        1.0 - 2.0 * rand
    }
}

/// Rotates `v` by the polar angle (`ct`, `st`) around the azimuth (`cp`, `sp`).
fn scatter(v: &Vector<f64>, ct: f64, st: f64, cp: f64, sp: f64) -> UnitVector<f64> {
    const EPS_N_1: f64 = 1.0 - 1e-12;
    if v.z.abs() < EPS_N_1 {
        let d = 1.0 - sqr(v.z);
        let denom = d.sqrt();
        let rdenom = 1.0 / denom;
        UnitVector(Vector {
            x: st * (v.x * v.z * cp - v.y * sp) * rdenom + v.x * ct,
            y: st * (v.y * v.z * cp + v.x * sp) * rdenom + v.y * ct,
            z: -denom * st * cp + v.z * ct,
        })
    } else {
        UnitVector(Vector {
            x: st * cp,
            y: st * sp * (1.0f64).copysign(v.z),
            z: ct * (1.0f64).copysign(v.z),
        })
    }
}

fn isotropic<R: Rng + ?Sized>(rng: &mut R) -> UnitVector<f64> {
    let ct = 1.0 - 2.0 * rng.flat();
    let st = (1.0 - sqr(ct)).max(0.0).sqrt();
    let [cp, sp] = UnitCircle.sample(rng);
    UnitVector(Vector::new(st * cp, st * sp, ct))
}

/// Highland width of the projected scattering angle after `path` mm.
fn highland_theta0(ekin: f64, path: f64, radiation_length: f64) -> f64 {
    let t = path / radiation_length;
    if !(t > 0.0) {
        return 0.0;
    }
    let p2 = ekin * (ekin + 2.0 * ELECTRON_MASS);
    let beta_cp = p2 / (ekin + ELECTRON_MASS);
    let correction = (1.0 + 0.038 * t.ln()).max(0.0);
    13.6 / beta_cp * t.sqrt() * correction
}

impl AnalogPhysics {
    pub fn new(materials: Vec<MaterialData>) -> Self {
        Self {
            materials,
            tracking_cut: 0.01,
            photo_absorption_limit: 0.05,
            range_fraction: 0.2,
            min_step: 0.01,
        }
    }

    pub fn materials(&self) -> &[MaterialData] {
        &self.materials
    }

    /// Couples without data behave as vacuum.
    pub fn material(&self, mc_index: usize) -> &MaterialData {
        self.materials.get(mc_index).unwrap_or(&MaterialData::VACUUM)
    }

    /// Mean free path between bremsstrahlung emissions above the production threshold.
    fn brems_mean_free_path(&self, mat: &MaterialData, ekin: f64) -> f64 {
        if mat.is_vacuum() || ekin <= mat.production_threshold {
            return f64::INFINITY;
        }
        mat.radiation_length / (4.0 / 3.0 * (ekin / mat.production_threshold).ln())
    }

    fn gamma_how_far(&self, ctx: &mut TrackContext) {
        let lambda = self.material(ctx.track.mc_index).photon_attenuation_length;
        if lambda.is_finite() {
            ctx.track.step_length = -ctx.rng.flat().ln() * lambda;
            ctx.discrete_pending = true;
        } else {
            ctx.track.step_length = f64::INFINITY;
            ctx.discrete_pending = false;
        }
    }

    fn charged_how_far(&self, ctx: &mut TrackContext) {
        let mat = self.material(ctx.track.mc_index);
        let ekin = ctx.track.ekin;
        let continuous = if mat.stopping_power > 0.0 {
            let range = ekin / mat.stopping_power;
            (self.range_fraction * range).max(self.min_step).min(range)
        } else {
            f64::INFINITY
        };
        let brems = -ctx.rng.flat().ln() * self.brems_mean_free_path(mat, ekin);
        ctx.discrete_pending = brems < continuous;
        ctx.track.step_length = ctx.discrete_pending.if_else(brems, continuous);
    }

    /// Emits `kind` from the current track, or deposits its energy when it is
    /// below the production threshold.
    fn emit(&self, ctx: &mut TrackContext, kind: ParticleKind, ekin: f64, direction: UnitVector<f64>) {
        let threshold = self.material(ctx.track.mc_index).production_threshold;
        if kind != ParticleKind::Positron && ekin < threshold {
            ctx.track.energy_deposit += ekin;
        } else {
            ctx.add_secondary(Track::new(kind, ekin, Vector::zero(), direction));
        }
    }

    fn gamma_perform(&self, ctx: &mut TrackContext) {
        if !ctx.discrete_pending || ctx.track.on_boundary {
            return;
        }
        ctx.discrete_pending = false;
        let energy = ctx.track.ekin;
        let dir = ctx.track.direction;

        if energy < self.photo_absorption_limit {
            ctx.track.energy_deposit += energy;
            ctx.track.ekin = 0.0;
            return;
        }

        let pair_threshold = 2.0 * ELECTRON_MASS;
        if energy > pair_threshold && ctx.rng.flat() < sqr(1.0 - pair_threshold / energy) {
            let available = energy - pair_threshold;
            let share = ctx.rng.flat();
            ctx.track.ekin = 0.0;
            self.emit(ctx, ParticleKind::Electron, share * available, dir);
            self.emit(ctx, ParticleKind::Positron, (1.0 - share) * available, dir);
            return;
        }

        // Compton: forward peaked angle, exact two-body kinematics
        let g = energy / (energy + ELECTRON_MASS);
        let ct = henyey_greenstein_phase(g, ctx.rng.flat()).max(-1.0).min(1.0);
        let st = (1.0 - sqr(ct)).sqrt();
        let [cp, sp] = UnitCircle.sample(&mut ctx.rng);
        let scattered = energy / (1.0 + energy / ELECTRON_MASS * (1.0 - ct));
        let new_dir = scatter(&dir, ct, st, cp, sp);
        let recoil = energy - scattered;
        let recoil_dir = UnitVector::normalize(*dir * energy - *new_dir * scattered).unwrap_or(dir);
        ctx.track.ekin = scattered;
        ctx.track.direction = new_dir;
        self.emit(ctx, ParticleKind::Electron, recoil, recoil_dir);
    }

    fn charged_perform(&self, ctx: &mut TrackContext) {
        let mat = *self.material(ctx.track.mc_index);
        let step = ctx.track.step_length;
        let ekin = ctx.track.ekin;

        if !mat.is_vacuum() && step > 0.0 {
            let theta0 = highland_theta0(ekin, step, mat.radiation_length);
            let true_length = step * (1.0 + 0.25 * sqr(theta0));
            let loss = (mat.stopping_power * true_length).min(ekin);
            ctx.track.ekin -= loss;
            ctx.track.energy_deposit += loss;
            ctx.msc.true_step_length = true_length;

            if theta0 > 0.0 {
                let dir = ctx.track.direction;
                let e1 = scatter(&dir, 0.0, 1.0, 1.0, 0.0);
                let e2 = dir.cross(*e1);
                let mut n = [0.0; 4];
                for v in n.iter_mut() {
                    *v = StandardNormal.sample(&mut ctx.rng);
                }
                let (theta_1, theta_2) = (theta0 * n[0], theta0 * n[1]);
                let lateral = step * theta0 / 12f64.sqrt();
                let y1 = 0.5 * step * theta_1 + lateral * n[2];
                let y2 = 0.5 * step * theta_2 + lateral * n[3];
                ctx.msc.displacement = *e1 * y1 + e2 * y2;
                ctx.track.direction =
                    UnitVector::normalize(*dir + *e1 * theta_1 + e2 * theta_2).unwrap_or(dir);
            }
        }

        if ctx.discrete_pending && !ctx.track.on_boundary && ctx.track.ekin > mat.production_threshold {
            let threshold = mat.production_threshold;
            let photon = threshold * (ctx.track.ekin / threshold).powf(ctx.rng.flat());
            ctx.track.ekin -= photon;
            let dir = ctx.track.direction;
            self.emit(ctx, ParticleKind::Gamma, photon, dir);
        }
        ctx.discrete_pending = false;

        if ctx.track.ekin < self.tracking_cut {
            ctx.track.energy_deposit += ctx.track.ekin;
            ctx.track.ekin = 0.0;
            if ctx.track.kind() == ParticleKind::Positron {
                self.annihilate(ctx);
            }
        }
    }

    /// Two back-to-back photons from a positron at rest.
    fn annihilate(&self, ctx: &mut TrackContext) {
        let dir = isotropic(&mut ctx.rng);
        ctx.add_secondary(Track::new(ParticleKind::Gamma, ELECTRON_MASS, Vector::zero(), dir));
        ctx.add_secondary(Track::new(ParticleKind::Gamma, ELECTRON_MASS, Vector::zero(), UnitVector(-*dir)));
    }
}

impl PhysicsEngine for AnalogPhysics {
    fn how_far(&self, ctx: &mut TrackContext) {
        if ctx.track.kind().is_charged() {
            self.charged_how_far(ctx)
        } else {
            self.gamma_how_far(ctx)
        }
    }

    fn perform(&self, ctx: &mut TrackContext) {
        if ctx.track.kind().is_charged() {
            self.charged_perform(ctx)
        } else {
            self.gamma_perform(ctx)
        }
    }
}
