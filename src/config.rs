use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::geometry::GeometryConfig;
use crate::sources::PrimaryConfig;
use crate::stepping::TransportConfig;

/// Everything needed to set up and run a simulation. Missing fields take
/// their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub geometry: GeometryConfig,
    pub primary: PrimaryConfig,
    pub transport: TransportConfig,
    pub num_events: usize,
    pub random_seed: u64,
    /// 0 silences progress reports.
    pub verbosity: u8,
    /// Histograms are written here when set.
    pub output_dir: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            primary: PrimaryConfig::default(),
            transport: TransportConfig::default(),
            num_events: 1000,
            random_seed: 1234,
            verbosity: 1,
            output_dir: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.primary.validate()?;
        // x is moved onto the entry face, y and z are kept
        let half_yz = 0.5 * self.geometry.transverse_size;
        let [_, y, z] = self.primary.position;
        if y.abs() >= half_yz || z.abs() >= half_yz {
            return Err(Error::InvalidConfig(format!(
                "primary position (y = {}, z = {}) is outside the calorimeter face of half size {}",
                y, z, half_yz
            )));
        }
        let transport = &self.transport;
        if !(transport.push_length > 0.0 && transport.push_length.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "push length must be > 0, got {}",
                transport.push_length
            )));
        }
        if transport.max_consecutive_pushes == 0 {
            return Err(Error::InvalidConfig("at least one push must be allowed".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::ParticleKind;

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{
                "geometry": {"num_layers": 10, "gap_thickness": 0.0},
                "primary": {"particle": "e+"},
                "num_events": 5
            }"#,
        )
        .unwrap();
        assert_eq!(config.geometry.num_layers, 10);
        assert_eq!(config.geometry.absorber_thickness, 2.3);
        assert_eq!(config.geometry.gap_thickness, 0.0);
        assert_eq!(config.primary.particle, ParticleKind::Positron);
        assert_eq!(config.num_events, 5);
        assert_eq!(config.random_seed, 1234);
        assert_eq!(config.transport, TransportConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.transport.push_length = 0.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        let mut config = SimulationConfig::default();
        config.geometry.transverse_size = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn primary_must_hit_the_calorimeter_face() {
        let mut config = SimulationConfig::default();
        config.geometry.transverse_size = 100.0;
        config.primary.position = [0.0, 49.0, -49.0];
        assert!(config.validate().is_ok());
        config.primary.position = [0.0, 300.0, 0.0];
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        config.primary.position = [0.0, 0.0, -50.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::from_json_file("/nonexistent/slabshow.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("slabshow-config-{}.json", std::process::id()));
        let mut config = SimulationConfig::default();
        config.num_events = 3;
        config.output_dir = Some("out".into());
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = SimulationConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
