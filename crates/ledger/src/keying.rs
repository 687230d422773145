// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cg_events::Category;
use serde::{Deserialize, Serialize};

/// Which part of a decrypted record names the category it is counted under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKeying {
    /// The whole 3D shape string.
    #[default]
    #[serde(rename = "shape3d")]
    Shape3D,
    /// The whole 2D shape string.
    #[serde(rename = "shape2d")]
    Shape2D,
    /// The 3D shape up to its first `:`, so `cube:1,1,1` counts as `cube`.
    #[serde(rename = "shape3d_kind")]
    Shape3DKind,
}

impl CategoryKeying {
    /// Derive the category of a decrypted record. None when the derived key would be empty.
    pub fn category_for(&self, shape2d: &str, shape3d: &str) -> Option<Category> {
        let key = match self {
            CategoryKeying::Shape3D => shape3d,
            CategoryKeying::Shape2D => shape2d,
            CategoryKeying::Shape3DKind => shape3d.split(':').next().unwrap_or_default().trim(),
        };
        (!key.is_empty()).then(|| Category::new(key))
    }
}
