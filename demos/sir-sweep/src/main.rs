//! Sweep an SIR model over infection rate × initial infections and write the
//! aggregated results to CSV.
//!
//! ```text
//! cargo run -p sir-sweep [OUTPUT_DIR]    # default: ./out
//! RUST_LOG=info cargo run -p sir-sweep   # with progress logging
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use abm_batch::{BatchConfig, BatchSpec, run_batch};
use abm_engine::CancelToken;
use abm_models::{SirModel, SirParams};
use abm_output::write_table;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let base = SirParams {
        population:          200,
        width:               20,
        height:              20,
        recovery_time_range: (3, 8),
        max_step_size:       2,
        ..SirParams::default()
    };
    let spec = BatchSpec::new()
        .sweep("infection_rate", [0.05, 0.1, 0.2, 0.4, 0.8])
        .sweep("n_initial_infections", [1i64, 5, 20]);
    let config = BatchConfig {
        iterations:        10,
        max_steps:         120,
        collection_period: 1,
        seed:              2024,
        track_agents:      false,
    };

    log::info!(
        "sweeping {} combinations × {} iterations of {} agents",
        spec.combinations().len(),
        config.iterations,
        base.population,
    );
    let output = run_batch::<SirModel>(&base, &spec, &config, &CancelToken::new())
        .context("running the sweep")?;

    for failure in &output.failures {
        log::warn!("skipped instance: {failure:?}");
    }

    let model_path = out_dir.join("sir_model.csv");
    write_table(&output.model_table, &model_path)
        .with_context(|| format!("writing {}", model_path.display()))?;

    println!(
        "{} combinations, {} completed instances, {} rows -> {}",
        output.combinations,
        output.completed,
        output.model_table.len(),
        model_path.display(),
    );
    Ok(())
}
