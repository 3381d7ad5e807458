use crate::error::{Error, Result};
use crate::shape::BoxShape;
use crate::vector::{UnitVector, Vector};

/// Distance reported by [`Geometry::locate`] when the track is leaving the calorimeter.
pub const LEAVING_DISTANCE: f64 = 1e20;

/// Anything above this is read as [`LEAVING_DISTANCE`].
pub const LEAVING_THRESHOLD: f64 = 1e10;

/// Material indices of the default material list: vacuum, PbWO4 and liquid argon.
pub const MATERIAL_VACUUM: usize = 0;
pub const MATERIAL_ABSORBER: usize = 1;
pub const MATERIAL_GAP: usize = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Volume {
    World,
    Calorimeter,
    Layer,
    Absorber,
    Gap,
}

/// Which part of a layer a point was located in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Slab {
    Absorber,
    Gap,
}

impl Slab {
    pub fn index(self) -> usize {
        match self {
            Slab::Absorber => 0,
            Slab::Gap => 1,
        }
    }
}

/// Result of locating a global point.
///
/// `local` is the point in the frame of `volume`, which is translated along
/// x only: `global = local + (offset_x, 0, 0)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Location {
    pub distance: f64,
    pub volume: Volume,
    pub layer: Option<usize>,
    pub slab: Option<Slab>,
    pub local: Vector<f64>,
    pub offset_x: f64,
}

impl Location {
    pub fn is_leaving(&self) -> bool {
        self.distance > LEAVING_THRESHOLD
    }

    pub fn to_global(&self) -> Vector<f64> {
        Vector::new(self.local.x + self.offset_x, self.local.y, self.local.z)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub num_layers: usize,
    /// mm
    pub absorber_thickness: f64,
    /// mm
    pub gap_thickness: f64,
    /// Full transverse (yz) size of the calorimeter in mm.
    pub transverse_size: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            num_layers: 50,
            absorber_thickness: 2.3,
            gap_thickness: 5.7,
            transverse_size: 400.0,
        }
    }
}

impl GeometryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_layers < 1 {
            return Err(Error::InvalidConfig("calorimeter number of layers must be >= 1".into()));
        }
        if !valid_thicknesses(self.absorber_thickness, self.gap_thickness) {
            return Err(Error::InvalidConfig(format!(
                "absorber ({}) and gap ({}) thickness must be >= 0 and not both zero",
                self.absorber_thickness, self.gap_thickness
            )));
        }
        if !(self.transverse_size > 0.0 && self.transverse_size.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "transverse size must be > 0, got {}",
                self.transverse_size
            )));
        }
        Ok(())
    }
}

fn valid_thicknesses(absorber: f64, gap: f64) -> bool {
    absorber >= 0.0 && gap >= 0.0 && absorber.is_finite() && gap.is_finite() && absorber + gap > 0.0
}

/// Sampling calorimeter: `num_layers` layers of absorber + gap stacked along
/// x, centred on the origin inside a vacuum world.
#[derive(Debug, Clone)]
pub struct Geometry {
    num_layers: usize,
    absorber_thickness: f64,
    gap_thickness: f64,
    calo_size_yz: f64,
    layer_thickness: f64,
    calo_thickness: f64,
    calo_start_x: f64,
    primary_x: f64,
    world: BoxShape,
    calo: BoxShape,
    layer: BoxShape,
    absorber: BoxShape,
    gap: BoxShape,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::build(&GeometryConfig::default())
    }
}

impl Geometry {
    pub fn new(config: &GeometryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &GeometryConfig) -> Self {
        let mut geom = Self {
            num_layers: config.num_layers,
            absorber_thickness: config.absorber_thickness,
            gap_thickness: config.gap_thickness,
            calo_size_yz: config.transverse_size,
            layer_thickness: 0.0,
            calo_thickness: 0.0,
            calo_start_x: 0.0,
            primary_x: 0.0,
            world: BoxShape::new("World", MATERIAL_VACUUM, [1.0; 3]),
            calo: BoxShape::new("Calo", MATERIAL_VACUUM, [1.0; 3]),
            layer: BoxShape::new("Layer", MATERIAL_VACUUM, [1.0; 3]),
            absorber: BoxShape::new("Abs", MATERIAL_ABSORBER, [1.0; 3]),
            gap: BoxShape::new("Gap", MATERIAL_GAP, [1.0; 3]),
        };
        geom.update_parameters();
        geom
    }

    pub fn config(&self) -> GeometryConfig {
        GeometryConfig {
            num_layers: self.num_layers,
            absorber_thickness: self.absorber_thickness,
            gap_thickness: self.gap_thickness,
            transverse_size: self.calo_size_yz,
        }
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    pub fn set_num_layers(&mut self, num_layers: usize) {
        if num_layers > 0 {
            self.num_layers = num_layers;
            self.update_parameters();
        } else {
            log::warn!("number of layers must be > 0, keeping {}", self.num_layers);
        }
    }

    pub fn absorber_thickness(&self) -> f64 {
        self.absorber_thickness
    }

    pub fn set_absorber_thickness(&mut self, thickness: f64) {
        if valid_thicknesses(thickness, self.gap_thickness) {
            self.absorber_thickness = thickness;
            self.update_parameters();
        } else {
            log::warn!(
                "rejected absorber thickness {}, keeping {}",
                thickness,
                self.absorber_thickness
            );
        }
    }

    pub fn gap_thickness(&self) -> f64 {
        self.gap_thickness
    }

    /// A zero gap builds a block of absorber sliced into layers.
    pub fn set_gap_thickness(&mut self, thickness: f64) {
        if valid_thicknesses(self.absorber_thickness, thickness) {
            self.gap_thickness = thickness;
            self.update_parameters();
        } else {
            log::warn!("rejected gap thickness {}, keeping {}", thickness, self.gap_thickness);
        }
    }

    pub fn calo_size_yz(&self) -> f64 {
        self.calo_size_yz
    }

    pub fn set_calo_size_yz(&mut self, size: f64) {
        if size > 0.0 && size.is_finite() {
            self.calo_size_yz = size;
            self.update_parameters();
        } else {
            log::warn!("rejected transverse size {}, keeping {}", size, self.calo_size_yz);
        }
    }

    pub fn layer_thickness(&self) -> f64 {
        self.layer_thickness
    }

    pub fn calo_thickness(&self) -> f64 {
        self.calo_thickness
    }

    /// x of the calorimeter's entry face, where primaries start.
    pub fn calo_start_x(&self) -> f64 {
        self.calo_start_x
    }

    /// x of the mid-point between the world and calorimeter entry faces.
    pub fn primary_x(&self) -> f64 {
        self.primary_x
    }

    pub fn volume(&self, volume: Volume) -> &BoxShape {
        match volume {
            Volume::World => &self.world,
            Volume::Calorimeter => &self.calo,
            Volume::Layer => &self.layer,
            Volume::Absorber => &self.absorber,
            Volume::Gap => &self.gap,
        }
    }

    /// x of the centre of layer `layer`.
    pub fn layer_center_x(&self, layer: usize) -> f64 {
        self.calo_start_x + (layer as f64 + 0.5) * self.layer_thickness
    }

    fn update_parameters(&mut self) {
        self.layer_thickness = self.absorber_thickness + self.gap_thickness;
        self.calo_thickness = self.num_layers as f64 * self.layer_thickness;
        self.calo_start_x = -0.5 * self.calo_thickness;
        let world_thickness = 1.1 * self.calo_thickness;
        self.primary_x = -0.25 * (world_thickness + self.calo_thickness);

        let half_yz = 0.5 * self.calo_size_yz;
        let set = |shape: &mut BoxShape, half_x: f64, half_yz: f64| {
            shape.set_half_length(half_x, 0);
            shape.set_half_length(half_yz, 1);
            shape.set_half_length(half_yz, 2);
        };
        set(&mut self.world, 0.5 * world_thickness, 1.1 * half_yz);
        set(&mut self.calo, 0.5 * self.calo_thickness, half_yz);
        set(&mut self.layer, 0.5 * self.layer_thickness, half_yz);
        set(&mut self.absorber, 0.5 * self.absorber_thickness, half_yz);
        set(&mut self.gap, 0.5 * self.gap_thickness, half_yz);
    }

    /// Locates the global point `r` and computes the distance, along `v`, to
    /// the boundary of the deepest volume containing it.
    ///
    /// The location is computed from the layer pitch alone, without looking
    /// at the tolerance or the direction. A point on a layer face that moves
    /// out of it is therefore reported in the layer it is leaving, with a
    /// zero distance: the caller has to push it a little and locate again.
    /// A point on the calorimeter surface moving out gets
    /// [`LEAVING_DISTANCE`] in the world volume.
    pub fn locate(&self, r: Vector<f64>, v: UnitVector<f64>) -> Location {
        // the calorimeter is neither translated nor rotated
        if self.calo.distance_to_out(r, v) == 0.0 {
            return Location {
                distance: LEAVING_DISTANCE,
                volume: Volume::World,
                layer: None,
                slab: None,
                local: r,
                offset_x: 0.0,
            };
        }

        let layer = ((r.x - self.calo_start_x) / self.layer_thickness) as usize;
        let layer_x = self.layer_center_x(layer);
        let in_layer = Vector::new(r.x - layer_x, r.y, r.z);
        if self.layer.distance_to_out(in_layer, v) == 0.0 {
            return Location {
                distance: 0.0,
                volume: Volume::Layer,
                layer: Some(layer),
                slab: None,
                local: in_layer,
                offset_x: layer_x,
            };
        }

        let (volume, slab, shift) =
            if in_layer.x + 0.5 * self.layer_thickness < self.absorber_thickness || self.gap_thickness == 0.0 {
                (Volume::Absorber, Slab::Absorber, -0.5 * (self.layer_thickness - self.absorber_thickness))
            } else {
                (
                    Volume::Gap,
                    Slab::Gap,
                    -0.5 * (self.layer_thickness - self.gap_thickness) + self.absorber_thickness,
                )
            };
        let local = Vector::new(in_layer.x - shift, in_layer.y, in_layer.z);
        Location {
            distance: self.volume(volume).distance_to_out(local, v),
            volume,
            layer: Some(layer),
            slab: Some(slab),
            local,
            offset_x: layer_x + shift,
        }
    }
}
