// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed keys for model objects.

use slotmap::new_key_type;

new_key_type! {
    pub struct StoryKey;
    pub struct SpaceKey;
    pub struct ZoneKey;
    pub struct ScheduleKey;
    pub struct SurfaceKey;
    pub struct SubSurfaceKey;
    pub struct ShadingGroupKey;
    pub struct ShadingSurfaceKey;
}
