use std::sync::Arc;

use pin_app::affinity;
use pin_app::cli;
use pin_app::config_loader;
use pin_app::rotation;
use pin_app::tracing_setup;
use pin_app::CoreAffinityFactory;
use pin_selector::CyclicPinSelector;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli::get_config_path(cli::DEFAULT_CONFIG_PATH);
    let config = config_loader::load_pin_config_or_default(&config_path);

    let level = tracing_setup::parse_level(&config.log_level)?;
    let _guard = tracing_setup::init_with_stdout("pin_rotate", &config.log_dir, level);

    let cpu_ids = config.cpu_ids();
    info!(
        "Rotating over CPUs {:?}: workers={}, rounds_per_worker={}, apply_affinity={}",
        cpu_ids,
        config.workers,
        config.rounds_per_worker,
        config.apply_affinity
    );

    let factory = CoreAffinityFactory::detect();
    let selector = Arc::new(CyclicPinSelector::new(&cpu_ids, &factory)?);

    let assignments = if config.apply_affinity {
        rotation::run_rotation(Arc::clone(&selector), config.workers, config.rounds_per_worker, affinity::apply_pin)?
    } else {
        rotation::run_rotation(Arc::clone(&selector), config.workers, config.rounds_per_worker, |_| false)?
    };

    let summary = rotation::summarize(&assignments);
    for (cpu_id, count) in &summary.per_cpu {
        info!("CPU {cpu_id}: {count} draws");
    }
    if summary.unpinned > 0 {
        info!("Unpinned draws: {}", summary.unpinned);
    }
    info!("Bound {} of {} draws; next pin would be {:?}", summary.applied, assignments.len(), selector.peek_next().map(|core| core.id));

    Ok(())
}
