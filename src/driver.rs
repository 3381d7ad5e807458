use std::process::ExitCode;

use rand::SeedableRng;
use slabshow::{
    AnalogPhysics, EventLoop, Geometry, MaterialCutsTable, PRng, PrimaryGenerator, Results, SimulationConfig,
    SteppingLoop,
};

fn run(config: &SimulationConfig) -> slabshow::Result<()> {
    let geometry = Geometry::new(&config.geometry)?;
    let engine = AnalogPhysics::default();
    let material_cuts = MaterialCutsTable::identity(engine.materials().len());
    let source = PrimaryGenerator::from_config(&config.primary)?;
    log::info!(
        "{} layers of {} mm absorber + {} mm gap, {} of {} MeV",
        geometry.num_layers(),
        geometry.absorber_thickness(),
        geometry.gap_thickness(),
        source.kind,
        source.ekin
    );

    let stepper = SteppingLoop::new(&engine, &geometry, &material_cuts, config.transport);
    let mut event_loop =
        EventLoop::new(stepper, &source, PRng::seed_from_u64(config.random_seed)).with_verbosity(config.verbosity);
    let mut results = Results::new(geometry.num_layers());
    event_loop.process_events(config.num_events, &mut results)?;

    log::info!("{}", results.summary(config.num_events));
    if let Some(dir) = &config.output_dir {
        results.write_histograms(dir, config.num_events)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => SimulationConfig::from_json_file(&path),
        None => {
            let config = SimulationConfig::default();
            config.validate().map(|_| config)
        }
    };
    let result = config.and_then(|config| {
        log::debug!("{:?}", config);
        run(&config)
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
