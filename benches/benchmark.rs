use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use slabshow::*;

const ENERGIES: &[f64] = &[100.0, 1_000.0];

fn bench_locate(c: &mut Criterion) {
    let geom = Geometry::default();
    let dir = UnitVector::normalize(Vector::new(1.0, 0.3, -0.2)).unwrap();
    let points: Vec<_> = (0..1000)
        .map(|i| {
            let f = i as f64 / 1000.0;
            Vector::new(geom.calo_start_x() + f * geom.calo_thickness(), 10.0 * f, -5.0 * f)
        })
        .collect();
    c.bench_function("Geometry::locate", |b| {
        b.iter(|| {
            for &p in points.iter() {
                black_box(geom.locate(black_box(p), dir));
            }
        })
    });
}

fn bench_events(c: &mut Criterion) {
    let geom = Geometry::default();
    let engine = AnalogPhysics::default();
    let cuts = MaterialCutsTable::identity(engine.materials().len());
    let mut group = c.benchmark_group("Shower in default calorimeter");
    group.sample_size(10);
    for &energy in ENERGIES {
        for kind in [ParticleKind::Electron, ParticleKind::Gamma] {
            let source = PrimaryGenerator::new(kind, energy, Vector::zero(), UnitVector::x_axis());
            group.bench_with_input(
                BenchmarkId::new(kind.to_string(), energy),
                &source,
                |b, source| {
                    let stepper = SteppingLoop::new(&engine, &geom, &cuts, TransportConfig::default());
                    let mut event_loop = EventLoop::new(stepper, source, PRng::seed_from_u64(123456u64));
                    let mut results = Results::new(geom.num_layers());
                    b.iter(|| event_loop.process_event(&mut results).unwrap())
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_locate, bench_events);
criterion_main!(benches);
