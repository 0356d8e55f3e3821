// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs;

use topenergy::{assemble, export, AssemblyOptions, Error, SimulationFiles, Workflow};
use topenergy_model::Model;
use topenergy_topology::TopologyArena;

fn simulation_files(dir: &std::path::Path) -> SimulationFiles {
    let weather = dir.join("city.epw");
    let design_day = dir.join("city.ddy");
    fs::write(&weather, "LOCATION,City").unwrap();
    fs::write(&design_day, "! design days").unwrap();
    SimulationFiles {
        template: None,
        weather,
        design_day,
    }
}

#[test]
fn assembled_model_is_written_with_its_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let files = simulation_files(dir.path());

    let levels = [0.0, 3.5, 7.0];
    let mut arena = TopologyArena::new();
    let complex = arena
        .make_stacked_boxes([0.0, 0.0], [12.0, 6.0], &levels, 1e-6)
        .unwrap();
    let options = AssemblyOptions {
        glazing_ratio: Some(0.3),
        ..Default::default()
    };
    let assembly = assemble(
        &arena,
        complex,
        &[],
        &levels,
        &options,
        files.load_template().unwrap(),
    )
    .unwrap();

    let out = dir.path().join("out");
    let written = export(&assembly.model, &out, "office").unwrap();
    assert_eq!(written.model, out.join("office.json"));
    assert_eq!(written.workflow, out.join("office.osw.json"));

    let loaded = Model::load(&written.model).unwrap();
    assert_eq!(loaded.surfaces().count(), assembly.model.surfaces().count());
    assert_eq!(loaded.sub_surfaces().count(), assembly.model.sub_surfaces().count());
    assert_eq!(loaded.weather_file.as_deref(), Some(files.weather.as_path()));

    let workflow: Workflow =
        serde_json::from_str(&fs::read_to_string(&written.workflow).unwrap()).unwrap();
    assert_eq!(workflow.seed_file, written.model);
    assert_eq!(workflow.weather_file, Some(files.weather));
    assert!(workflow.steps.is_empty());
}

#[test]
fn missing_design_day_stops_before_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let files = simulation_files(dir.path());
    fs::remove_file(&files.design_day).unwrap();

    assert!(matches!(
        files.load_template(),
        Err(Error::FileNotFound { kind: "design day", .. })
    ));
}
