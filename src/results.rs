use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::Slab;
use crate::track::ParticleKind;

/// `printf("%.*g")`: `precision` significant digits, trailing zeros
/// dropped, exponent form outside `1e-4 <= |v| < 10^precision`.
fn format_g(v: f64, precision: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return v.to_string();
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };
    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let fixed = format!("{:.*}", (precision as i32 - 1 - exp) as usize, v);
        trim_zeros(&fixed).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Fixed-width 1D histogram over `[min, max)`; a value equal to `max` goes to
/// the last bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Hist {
    min: f64,
    max: f64,
    delta: f64,
    inv_delta: f64,
    x: Vec<f64>,
    y: Vec<f64>,
    sum: f64,
}

impl Hist {
    pub fn new(min: f64, max: f64, num_bins: usize) -> Self {
        let num_bins = num_bins.max(1);
        let delta = (max - min) / num_bins as f64;
        Self {
            min,
            max,
            delta,
            inv_delta: 1.0 / delta,
            x: (0..num_bins).map(|i| min + i as f64 * delta).collect(),
            y: vec![0.0; num_bins],
            sum: 0.0,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.y.len()
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Lower bin edges.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    fn bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.min) {
            return None;
        }
        let idx = if x == self.max {
            self.num_bins() - 1
        } else {
            ((x - self.min) * self.inv_delta) as usize
        };
        (idx < self.num_bins()).then(|| idx)
    }

    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0)
    }

    pub fn fill_weighted(&mut self, x: f64, w: f64) {
        if let Some(idx) = self.bin(x) {
            self.y[idx] += w;
            self.sum += w;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for y in self.y.iter_mut() {
            *y *= factor;
        }
    }

    pub fn add(&mut self, other: &Hist) -> Result<()> {
        if self.num_bins() != other.num_bins() || self.min != other.min || self.max != other.max {
            return Err(Error::HistogramMismatch {
                left: self.binning(),
                right: other.binning(),
            });
        }
        for (y, o) in self.y.iter_mut().zip(other.y.iter()) {
            *y += o;
        }
        self.sum += other.sum;
        Ok(())
    }

    fn binning(&self) -> String {
        format!("[{}, {}) in {} bins", self.min, self.max, self.num_bins())
    }

    /// Writes `index \t bin-centre \t value * norm` lines.
    pub fn write<W: Write>(&self, mut out: W, norm: f64) -> std::io::Result<()> {
        for (i, (x, y)) in self.x.iter().zip(self.y.iter()).enumerate() {
            writeln!(
                out,
                "{}\t{}\t{}",
                i,
                format_g(x + 0.5 * self.delta, 8),
                format_g(y * norm, 8)
            )?;
        }
        Ok(())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, norm: f64) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(&mut out, norm)?;
        out.flush()?;
        Ok(())
    }
}

/// Tallies of a single event.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PerEventResults {
    pub edep_absorber: f64,
    pub edep_gap: f64,
    pub num_sec_gamma: f64,
    pub num_sec_electron: f64,
    pub num_sec_positron: f64,
    pub num_steps_gamma: f64,
    pub num_steps_elpos: f64,
}

/// Sum and sum of squares of a per-event quantity.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Tally {
    pub sum: f64,
    pub sum2: f64,
}

impl Tally {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.sum2 += value * value;
    }

    pub fn merge(&mut self, other: &Tally) {
        self.sum += other.sum;
        self.sum2 += other.sum2;
    }

    pub fn mean(&self, num_events: usize) -> f64 {
        self.sum * norm(num_events)
    }

    pub fn std_dev(&self, num_events: usize) -> f64 {
        let mean = self.mean(num_events);
        (self.sum2 * norm(num_events) - mean * mean).abs().sqrt()
    }
}

fn norm(num_events: usize) -> f64 {
    if num_events > 0 {
        1.0 / num_events as f64
    } else {
        1.0
    }
}

/// Run-level accumulators: per-layer histograms plus per-event tallies.
#[derive(Debug, Clone, PartialEq)]
pub struct Results {
    pub edep_per_layer: Hist,
    pub gamma_track_length_per_layer: Hist,
    pub elpos_track_length_per_layer: Hist,
    pub edep_absorber: Tally,
    pub edep_gap: Tally,
    pub num_sec_gamma: Tally,
    pub num_sec_electron: Tally,
    pub num_sec_positron: Tally,
    pub num_steps_gamma: Tally,
    pub num_steps_elpos: Tally,
    pub per_event: PerEventResults,
}

impl Results {
    pub fn new(num_layers: usize) -> Self {
        let layers = num_layers.max(1);
        let hist = || Hist::new(0.0, layers as f64, layers);
        Self {
            edep_per_layer: hist(),
            gamma_track_length_per_layer: hist(),
            elpos_track_length_per_layer: hist(),
            edep_absorber: Tally::default(),
            edep_gap: Tally::default(),
            num_sec_gamma: Tally::default(),
            num_sec_electron: Tally::default(),
            num_sec_positron: Tally::default(),
            num_steps_gamma: Tally::default(),
            num_steps_elpos: Tally::default(),
            per_event: PerEventResults::default(),
        }
    }

    pub fn begin_event(&mut self) {
        self.per_event = PerEventResults::default();
    }

    /// Moves the per-event tallies into the run accumulators.
    pub fn end_event(&mut self) {
        let ev = self.per_event;
        self.edep_absorber.add(ev.edep_absorber);
        self.edep_gap.add(ev.edep_gap);
        self.num_sec_gamma.add(ev.num_sec_gamma);
        self.num_sec_electron.add(ev.num_sec_electron);
        self.num_sec_positron.add(ev.num_sec_positron);
        self.num_steps_gamma.add(ev.num_steps_gamma);
        self.num_steps_elpos.add(ev.num_steps_elpos);
    }

    pub fn count_secondary(&mut self, kind: ParticleKind) {
        match kind {
            ParticleKind::Gamma => self.per_event.num_sec_gamma += 1.0,
            ParticleKind::Electron => self.per_event.num_sec_electron += 1.0,
            ParticleKind::Positron => self.per_event.num_sec_positron += 1.0,
        }
    }

    pub fn record_edep(&mut self, layer: usize, slab: Option<Slab>, edep: f64) {
        if edep <= 0.0 {
            return;
        }
        self.edep_per_layer.fill_weighted(layer as f64, edep);
        match slab {
            Some(Slab::Absorber) => self.per_event.edep_absorber += edep,
            Some(Slab::Gap) => self.per_event.edep_gap += edep,
            None => {}
        }
    }

    pub fn record_step(&mut self, layer: usize, step_length: f64, kind: ParticleKind) {
        if step_length <= 0.0 {
            return;
        }
        if kind.is_charged() {
            self.elpos_track_length_per_layer.fill_weighted(layer as f64, step_length);
            self.per_event.num_steps_elpos += 1.0;
        } else {
            self.gamma_track_length_per_layer.fill_weighted(layer as f64, step_length);
            self.per_event.num_steps_gamma += 1.0;
        }
    }

    /// Adds the run accumulators of `other`, e.g. of another worker.
    pub fn merge(&mut self, other: &Results) -> Result<()> {
        self.edep_per_layer.add(&other.edep_per_layer)?;
        self.gamma_track_length_per_layer
            .add(&other.gamma_track_length_per_layer)?;
        self.elpos_track_length_per_layer
            .add(&other.elpos_track_length_per_layer)?;
        self.edep_absorber.merge(&other.edep_absorber);
        self.edep_gap.merge(&other.edep_gap);
        self.num_sec_gamma.merge(&other.num_sec_gamma);
        self.num_sec_electron.merge(&other.num_sec_electron);
        self.num_sec_positron.merge(&other.num_sec_positron);
        self.num_steps_gamma.merge(&other.num_steps_gamma);
        self.num_steps_elpos.merge(&other.num_steps_elpos);
        Ok(())
    }

    pub fn summary(&self, num_events: usize) -> RunSummary {
        RunSummary {
            num_events,
            edep_absorber: self.edep_absorber.mean(num_events),
            edep_absorber_std: self.edep_absorber.std_dev(num_events),
            edep_gap: self.edep_gap.mean(num_events),
            edep_gap_std: self.edep_gap.std_dev(num_events),
            num_sec_gamma: self.num_sec_gamma.mean(num_events),
            num_sec_electron: self.num_sec_electron.mean(num_events),
            num_sec_positron: self.num_sec_positron.mean(num_events),
            num_steps_gamma: self.num_steps_gamma.mean(num_events),
            num_steps_elpos: self.num_steps_elpos.mean(num_events),
        }
    }

    /// Writes the per-layer histograms, normalised per event, into `dir`.
    pub fn write_histograms<P: AsRef<Path>>(&self, dir: P, num_events: usize) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let norm = norm(num_events);
        self.edep_per_layer
            .write_to_file(dir.join("hist_edep_layer.dat"), norm)?;
        self.gamma_track_length_per_layer
            .write_to_file(dir.join("hist_gamma_tracklength_layer.dat"), norm)?;
        self.elpos_track_length_per_layer
            .write_to_file(dir.join("hist_elpos_tracklength_layer.dat"), norm)?;
        log::info!("histograms written to {}", dir.display());
        Ok(())
    }
}

/// Per-event means (and deposit standard deviations) of a finished run.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub num_events: usize,
    pub edep_absorber: f64,
    pub edep_absorber_std: f64,
    pub edep_gap: f64,
    pub edep_gap_std: f64,
    pub num_sec_gamma: f64,
    pub num_sec_electron: f64,
    pub num_sec_positron: f64,
    pub num_steps_gamma: f64,
    pub num_steps_elpos: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "results of {} events", self.num_events)?;
        writeln!(
            f,
            " Absorber: mean Edep = {:.6} [MeV] and  Std-dev = {:.6} [MeV]",
            self.edep_absorber, self.edep_absorber_std
        )?;
        writeln!(
            f,
            " Gap     : mean Edep = {:.6} [MeV] and  Std-dev = {:.6} [MeV]",
            self.edep_gap, self.edep_gap_std
        )?;
        writeln!(f, " Mean number of gamma       {:.6}", self.num_sec_gamma)?;
        writeln!(f, " Mean number of e-          {:.6}", self.num_sec_electron)?;
        writeln!(f, " Mean number of e+          {:.6}", self.num_sec_positron)?;
        writeln!(f, " Mean number of e-/e+ steps {:.6}", self.num_steps_elpos)?;
        write!(f, " Mean number of gamma steps {:.6}", self.num_steps_gamma)
    }
}
