// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named resources: constructions, space types and default sets.
//!
//! Objects refer to resources by name, so a resource can be shared by any
//! number of surfaces or spaces and removed once nothing names it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    pub name: String,
    /// Overall U-factor in W/(m²·K).
    pub u_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceType {
    pub name: String,
    pub standards_building_type: Option<String>,
    pub standards_space_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultConstructionSet {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultScheduleSet {
    pub name: String,
}

/// Resource names of the standard template.
pub mod template {
    pub const INTERIOR_CEILING: &str = "000 Interior Ceiling";
    pub const INTERIOR_FLOOR: &str = "000 Interior Floor";
    pub const INTERIOR_WALL: &str = "000 Interior Wall";
    pub const EXTERIOR_DOOR: &str = "000 Exterior Door";
    pub const EXTERIOR_WINDOW: &str = "ASHRAE 189.1-2009 ExtWindow ClimateZone 4-5";
    pub const EXTERIOR_ROOF: &str = "ASHRAE 189.1-2009 ExtRoof IEAD ClimateZone 2-5";
    pub const EXTERIOR_WALL: &str = "ASHRAE 189.1-2009 ExtWall SteelFrame ClimateZone 4-8";

    pub const MEDIUM_OFFICE: &str = "ASHRAE 189::1-2009 ClimateZone 4-8 MediumOffice";
    pub const CONSTRUCTION_SET: &str = "ASHRAE 189.1-2009 ClimateZone 4-8 Office";
    pub const SCHEDULE_SET: &str = "Office Default Schedules";
}

impl Model {
    /// An empty building carrying the standard template resources.
    pub fn standard_template() -> Self {
        let mut model = Model::new();
        for (name, u_factor) in [
            (template::INTERIOR_CEILING, 1.43),
            (template::INTERIOR_FLOOR, 1.43),
            (template::INTERIOR_WALL, 2.04),
            (template::EXTERIOR_DOOR, 2.84),
            (template::EXTERIOR_WINDOW, 2.56),
            (template::EXTERIOR_ROOF, 0.18),
            (template::EXTERIOR_WALL, 0.36),
        ] {
            model.add_construction(Construction {
                name: name.to_string(),
                u_factor,
            });
        }
        model.add_space_type(SpaceType {
            name: template::MEDIUM_OFFICE.to_string(),
            standards_building_type: Some("MediumOffice".to_string()),
            standards_space_type: Some("OpenOffice".to_string()),
        });
        model.add_construction_set(DefaultConstructionSet {
            name: template::CONSTRUCTION_SET.to_string(),
        });
        model.add_schedule_set(DefaultScheduleSet {
            name: template::SCHEDULE_SET.to_string(),
        });
        model
    }

    /// Drops every resource no object names. Returns how many were removed.
    pub fn purge_unused_resources(&mut self) -> usize {
        let mut constructions = BTreeSet::new();
        let mut space_types = BTreeSet::new();
        let mut construction_sets = BTreeSet::new();
        let mut schedule_sets = BTreeSet::new();

        let b = &self.building;
        space_types.extend(b.space_type.clone());
        construction_sets.extend(b.default_construction_set.clone());
        schedule_sets.extend(b.default_schedule_set.clone());
        for (_, story) in self.stories() {
            construction_sets.extend(story.default_construction_set.clone());
            schedule_sets.extend(story.default_schedule_set.clone());
        }
        for (_, space) in self.spaces() {
            space_types.extend(space.space_type.clone());
            construction_sets.extend(space.default_construction_set.clone());
            schedule_sets.extend(space.default_schedule_set.clone());
        }
        for (_, surface) in self.surfaces() {
            constructions.extend(surface.construction.clone());
        }
        for (_, sub) in self.sub_surfaces() {
            constructions.extend(sub.construction.clone());
        }

        let before = self.resource_count();
        self.constructions.retain(|name, _| constructions.contains(name));
        self.space_types.retain(|name, _| space_types.contains(name));
        self.construction_sets
            .retain(|name, _| construction_sets.contains(name));
        self.schedule_sets.retain(|name, _| schedule_sets.contains(name));
        let removed = before - self.resource_count();

        tracing::debug!(removed, "purged unused resources");
        removed
    }

    fn resource_count(&self) -> usize {
        self.constructions.len()
            + self.space_types.len()
            + self.construction_sets.len()
            + self.schedule_sets.len()
    }
}
