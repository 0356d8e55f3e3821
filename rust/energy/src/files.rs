// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Template, weather and design-day files.
//!
//! The files are only checked for existence and recorded by path; their
//! contents are left to the simulation engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use topenergy_model::Model;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationFiles {
    /// Saved model to start from. `None` uses the built-in standard template.
    pub template: Option<PathBuf>,
    pub weather: PathBuf,
    pub design_day: PathBuf,
}

fn require(kind: &'static str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidInput(format!("{kind} path is empty")));
    }
    if !path.is_file() {
        return Err(Error::FileNotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

impl SimulationFiles {
    /// Fails with [`Error::FileNotFound`] for the first missing file.
    pub fn check(&self) -> Result<()> {
        if let Some(template) = &self.template {
            require("template", template)?;
        }
        require("weather", &self.weather)?;
        require("design day", &self.design_day)?;
        Ok(())
    }

    /// The template model with the weather and design-day paths recorded.
    pub fn load_template(&self) -> Result<Model> {
        self.check()?;
        let mut model = match &self.template {
            Some(path) => Model::load(path)?,
            None => Model::standard_template(),
        };
        model.weather_file = Some(self.weather.clone());
        model.design_day_file = Some(self.design_day.clone());

        tracing::debug!(
            template = ?self.template,
            weather = %self.weather.display(),
            "loaded template"
        );
        Ok(model)
    }
}
