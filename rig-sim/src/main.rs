use anyhow::Context;
use rig_core::settings::Settings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod physics;
mod sim;

use sim::script::ScriptedInput;
use sim::Simulation;

const SCRIPT_SEED: u64 = 0x5eed;

fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let settings = Settings::load().context("could not load settings")?;
    info!(
        mode = ?settings.controller.reconciliation_mode,
        ticks = settings.sim.ticks,
        tick_ms = settings.sim.tick_ms,
        "starting simulation"
    );

    let script = ScriptedInput::walkabout(settings.sim.ticks, SCRIPT_SEED);
    let mut simulation = Simulation::new(&settings, sim::default_scene(), script)
        .context("could not set up simulation")?;
    simulation.run();

    if let Some(avatar) = simulation.avatars().local_avatar() {
        info!(
            id = %avatar.id,
            character = ?simulation.motor().position(),
            "final avatar position"
        );
    }
    if let Some(report) = simulation.controller().last_report() {
        info!(case = ?report.case, headset_offset = ?report.headset_offset, "last reconciliation");
    }

    if settings.sim.report_json {
        for report in simulation.reports() {
            println!("{}", serde_json::to_string(report)?);
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
