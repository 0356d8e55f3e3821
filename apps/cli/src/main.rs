// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! topenergy - convert building topology to and from energy models.
//!
//! Options come from the environment, see [`config::Config`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use topenergy::{assemble, export, reconstruct, SimulationFiles};
use topenergy_model::Model;
use topenergy_topology::{CellComplexKey, TopologyArena};

mod config;

use config::{Config, LogFormat};

#[derive(Parser)]
#[command(name = "topenergy")]
#[command(about = "Convert building topology to and from energy models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Builds a simulation model from a topology snapshot and exports it with its workflow
    Assemble {
        /// Topology snapshot (JSON)
        input: PathBuf,
        /// Directory receiving the model, workflow and annotated topology
        output_dir: PathBuf,
    },
    /// Rebuilds the topology of a saved model
    Import {
        /// Saved model (JSON)
        model: PathBuf,
        /// Topology snapshot to write
        topology: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,topenergy=debug".into()),
    );
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).pretty().init(),
    }

    match cli.command {
        Commands::Assemble { input, output_dir } => run_assemble(&config, &input, &output_dir),
        Commands::Import { model, topology } => run_import(&config, &model, &topology),
    }
}

fn run_assemble(config: &Config, input: &Path, output_dir: &Path) -> anyhow::Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut arena = TopologyArena::from_json(&json)
        .with_context(|| format!("parsing {}", input.display()))?;

    let complex = first_complex(&mut arena)?;
    let shading = arena.free_faces();
    let levels = match &config.floor_levels {
        Some(levels) => levels.clone(),
        None => floor_levels_of(&arena, complex),
    };

    tracing::info!(
        input = %input.display(),
        cells = arena.complex_cells(complex).len(),
        shading = shading.len(),
        ?levels,
        "assembling"
    );

    let template = load_template(config)?;
    let assembly = assemble(
        &arena,
        complex,
        &shading,
        &levels,
        &config.assembly_options(),
        template,
    )?;

    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    let written = export(&assembly.model, output_dir, name)?;

    let annotated = output_dir.join(format!("{name}.topology.json"));
    fs::write(&annotated, assembly.topology.to_json()?)
        .with_context(|| format!("writing {}", annotated.display()))?;

    tracing::info!(
        model = %written.model.display(),
        workflow = %written.workflow.display(),
        topology = %annotated.display(),
        "done"
    );
    Ok(())
}

fn run_import(config: &Config, input: &Path, output: &Path) -> anyhow::Result<()> {
    let model = Model::load(input)?;
    let rebuilt = reconstruct(&model, config.tolerance)?;
    fs::write(output, rebuilt.arena.to_json()?)
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        cells = rebuilt.cells.len(),
        shading = rebuilt.shading.len(),
        output = %output.display(),
        "imported"
    );
    Ok(())
}

/// The snapshot's first complex, or a new one holding every cell.
fn first_complex(arena: &mut TopologyArena) -> anyhow::Result<CellComplexKey> {
    if let Some(complex) = arena.cell_complex_keys().next() {
        return Ok(complex);
    }
    let cells: Vec<_> = arena.cell_keys().collect();
    if cells.is_empty() {
        bail!("topology has no cells");
    }
    Ok(arena.add_cell_complex(&cells)?)
}

/// Distinct cell bottoms plus the top of the tallest cell.
fn floor_levels_of(arena: &TopologyArena, complex: CellComplexKey) -> Vec<f64> {
    let mut levels = Vec::new();
    let mut top = f64::NEG_INFINITY;
    for cell in arena.complex_cells(complex) {
        if let Some((lo, hi)) = arena.cell_bounding_box(cell) {
            levels.push(lo.z);
            top = top.max(hi.z);
        }
    }
    levels.push(top);
    levels.sort_by(f64::total_cmp);
    levels.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    levels
}

fn load_template(config: &Config) -> anyhow::Result<Model> {
    match (&config.weather, &config.design_day) {
        (Some(weather), Some(design_day)) => {
            let files = SimulationFiles {
                template: config.template.clone(),
                weather: weather.clone(),
                design_day: design_day.clone(),
            };
            Ok(files.load_template()?)
        }
        (Some(_), None) => bail!("TOPENERGY_WEATHER is set but TOPENERGY_DESIGN_DAY is not"),
        (None, Some(_)) => bail!("TOPENERGY_DESIGN_DAY is set but TOPENERGY_WEATHER is not"),
        (None, None) => {
            tracing::warn!("TOPENERGY_WEATHER and TOPENERGY_DESIGN_DAY unset, exporting without weather");
            match &config.template {
                Some(path) => Ok(Model::load(path)?),
                None => Ok(Model::standard_template()),
            }
        }
    }
}
