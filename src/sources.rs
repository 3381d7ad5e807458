use crate::error::{Error, Result};
use crate::track::{ParticleKind, Track};
use crate::vector::{UnitVector, Vector};

/// Fills in the primary particle of an event.
///
/// Only the physical state is set; ids and bookkeeping belong to the caller.
pub trait Source {
    fn generate_one(&self, track: &mut Track);
}

impl<S: Source + ?Sized> Source for &S {
    fn generate_one(&self, track: &mut Track) {
        S::generate_one(*self, track)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    pub particle: ParticleKind,
    /// Kinetic energy in MeV.
    pub energy: f64,
    pub position: [f64; 3],
    pub direction: [f64; 3],
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            particle: ParticleKind::Electron,
            energy: 10_000.0,
            position: [0.0; 3],
            direction: [1.0, 0.0, 0.0],
        }
    }
}

impl PrimaryConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.energy > 0.0 && self.energy.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "primary energy must be > 0, got {}",
                self.energy
            )));
        }
        if self.position.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "primary position {:?} is not finite",
                self.position
            )));
        }
        if UnitVector::normalize(self.direction.into()).is_none() {
            return Err(Error::InvalidConfig(format!(
                "primary direction {:?} cannot be normalised",
                self.direction
            )));
        }
        Ok(())
    }
}

/// Particle gun: the same particle, energy, position and direction every event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimaryGenerator {
    pub kind: ParticleKind,
    pub ekin: f64,
    pub position: Vector<f64>,
    pub direction: UnitVector<f64>,
}

impl PrimaryGenerator {
    pub fn new(kind: ParticleKind, ekin: f64, position: Vector<f64>, direction: UnitVector<f64>) -> Self {
        Self {
            kind,
            ekin,
            position,
            direction,
        }
    }

    pub fn from_config(config: &PrimaryConfig) -> Result<Self> {
        config.validate()?;
        let direction = UnitVector::normalize(config.direction.into())
            .ok_or_else(|| Error::InvalidConfig("primary direction cannot be normalised".into()))?;
        Ok(Self::new(
            config.particle,
            config.energy,
            config.position.into(),
            direction,
        ))
    }
}

impl Source for PrimaryGenerator {
    fn generate_one(&self, track: &mut Track) {
        track.charge = self.kind.charge();
        track.ekin = self.ekin;
        track.position = self.position;
        track.direction = self.direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gun_sets_physical_state_only() {
        let gun = PrimaryGenerator::new(
            ParticleKind::Positron,
            250.0,
            Vector::new(0.0, 1.0, 2.0),
            UnitVector::x_axis(),
        );
        let mut track = Track::default();
        track.id = 9;
        (&gun).generate_one(&mut track);
        assert_eq!(track.kind(), ParticleKind::Positron);
        assert_eq!(track.ekin, 250.0);
        assert_eq!(track.position, Vector::new(0.0, 1.0, 2.0));
        assert_eq!(track.id, 9);
    }

    #[test]
    fn config_is_validated() {
        let gun = PrimaryGenerator::from_config(&PrimaryConfig {
            direction: [0.0, 0.0, 2.0],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(*gun.direction, Vector::new(0.0, 0.0, 1.0));
        assert_eq!(gun.kind, ParticleKind::Electron);

        let bad = PrimaryConfig {
            energy: 0.0,
            ..Default::default()
        };
        assert!(matches!(PrimaryGenerator::from_config(&bad), Err(Error::InvalidConfig(_))));
        let bad = PrimaryConfig {
            direction: [0.0; 3],
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn particle_names_in_json() {
        let config: PrimaryConfig = serde_json::from_str(r#"{"particle": "gamma", "energy": 5.0}"#).unwrap();
        assert_eq!(config.particle, ParticleKind::Gamma);
        assert_eq!(config.energy, 5.0);
        assert_eq!(config.direction, [1.0, 0.0, 0.0]);
    }
}
