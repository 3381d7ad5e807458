use crate::vector::{UnitVector, Vector};

/// Particle species, told apart by charge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ParticleKind {
    #[serde(rename = "e-")]
    #[display(fmt = "e-")]
    Electron,
    #[serde(rename = "gamma")]
    #[display(fmt = "gamma")]
    Gamma,
    #[serde(rename = "e+")]
    #[display(fmt = "e+")]
    Positron,
}

impl ParticleKind {
    pub fn charge(self) -> i8 {
        match self {
            ParticleKind::Electron => -1,
            ParticleKind::Gamma => 0,
            ParticleKind::Positron => 1,
        }
    }

    pub fn from_charge(charge: i8) -> Self {
        match charge {
            0 => ParticleKind::Gamma,
            c if c < 0 => ParticleKind::Electron,
            _ => ParticleKind::Positron,
        }
    }

    pub fn is_charged(self) -> bool {
        self.charge() != 0
    }
}

impl core::str::FromStr for ParticleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "e-" => Ok(ParticleKind::Electron),
            "e+" => Ok(ParticleKind::Positron),
            "gamma" => Ok(ParticleKind::Gamma),
            other => Err(format!("unknown particle name {:?} (e-, e+ or gamma)", other)),
        }
    }
}

/// Instantaneous state of one particle, in global coordinates.
///
/// `step_length` is written by the physics engine's step limit and then
/// overwritten by the stepper with the length actually travelled.
/// `energy_deposit` holds the deposit of the last step only.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub position: Vector<f64>,
    pub direction: UnitVector<f64>,
    /// MeV
    pub ekin: f64,
    pub charge: i8,
    pub id: u32,
    /// `None` for primaries.
    pub parent_id: Option<u32>,
    pub mc_index: usize,
    pub on_boundary: bool,
    pub safety: f64,
    pub step_length: f64,
    pub energy_deposit: f64,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            position: Vector::zero(),
            direction: UnitVector::x_axis(),
            ekin: 0.0,
            charge: 0,
            id: 0,
            parent_id: None,
            mc_index: 0,
            on_boundary: false,
            safety: 0.0,
            step_length: 0.0,
            energy_deposit: 0.0,
        }
    }
}

impl Track {
    pub fn new(kind: ParticleKind, ekin: f64, position: Vector<f64>, direction: UnitVector<f64>) -> Self {
        Self {
            position,
            direction,
            ekin,
            charge: kind.charge(),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> ParticleKind {
        ParticleKind::from_charge(self.charge)
    }

    pub fn is_primary(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Copies the persistent state of `from`; per-step scratch
    /// (step length and energy deposit) starts from zero.
    pub fn copy_from(&mut self, from: &Track) {
        self.reset();
        self.position = from.position;
        self.direction = from.direction;
        self.ekin = from.ekin;
        self.charge = from.charge;
        self.safety = from.safety;
        self.id = from.id;
        self.parent_id = from.parent_id;
        self.mc_index = from.mc_index;
        self.on_boundary = from.on_boundary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_charge() {
        for kind in [ParticleKind::Electron, ParticleKind::Gamma, ParticleKind::Positron] {
            assert_eq!(ParticleKind::from_charge(kind.charge()), kind);
            assert_eq!(kind.to_string().parse::<ParticleKind>().unwrap(), kind);
        }
        assert!("proton".parse::<ParticleKind>().is_err());
        assert!(!ParticleKind::Gamma.is_charged());
    }

    #[test]
    fn copy_drops_step_scratch() {
        let mut src = Track::new(
            ParticleKind::Positron,
            12.5,
            Vector::new(1.0, -2.0, 3.0),
            UnitVector::normalize(Vector::new(1.0, 1.0, 0.0)).unwrap(),
        );
        src.id = 7;
        src.parent_id = Some(3);
        src.mc_index = 2;
        src.on_boundary = true;
        src.safety = 0.25;
        src.step_length = 4.0;
        src.energy_deposit = 0.5;
        let mut dst = Track::default();
        dst.copy_from(&src);
        assert_eq!(dst.step_length, 0.0);
        assert_eq!(dst.energy_deposit, 0.0);
        dst.step_length = src.step_length;
        dst.energy_deposit = src.energy_deposit;
        assert_eq!(dst, src);
    }
}
