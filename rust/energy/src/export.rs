// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Writing a validated model and its run workflow to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use topenergy_model::Model;

use crate::error::{Error, Result};

/// Run description handed to the simulation engine next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub seed_file: PathBuf,
    pub weather_file: Option<PathBuf>,
    pub design_day_file: Option<PathBuf>,
    pub steps: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub model: PathBuf,
    pub workflow: PathBuf,
}

/// Validates `model` and writes `<name>.json` and `<name>.osw.json` into
/// `output_dir`.
///
/// Validation errors are joined into one [`Error::ExternalLibrary`] and
/// nothing is written.
pub fn export(model: &Model, output_dir: &Path, name: &str) -> Result<ExportedFiles> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("export name is empty".into()));
    }

    let report = model.validate();
    for warning in &report.warnings {
        tracing::warn!(%warning, "model warning");
    }
    if !report.is_ok() {
        return Err(Error::ExternalLibrary(report.errors.join("; ")));
    }

    fs::create_dir_all(output_dir).map_err(|e| {
        Error::ExternalLibrary(format!("cannot create {}: {e}", output_dir.display()))
    })?;

    let model_path = output_dir.join(format!("{name}.json"));
    model.save(&model_path)?;

    let workflow = Workflow {
        seed_file: model_path.clone(),
        weather_file: model.weather_file.clone(),
        design_day_file: model.design_day_file.clone(),
        steps: Vec::new(),
    };
    let workflow_path = output_dir.join(format!("{name}.osw.json"));
    let json = serde_json::to_string_pretty(&workflow)
        .map_err(|e| Error::ExternalLibrary(format!("workflow: {e}")))?;
    fs::write(&workflow_path, json).map_err(|e| {
        Error::ExternalLibrary(format!("cannot write {}: {e}", workflow_path.display()))
    })?;

    tracing::info!(model = %model_path.display(), workflow = %workflow_path.display(), "exported");
    Ok(ExportedFiles {
        model: model_path,
        workflow: workflow_path,
    })
}
