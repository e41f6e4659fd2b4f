//! Response type definitions.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Manifest served for episodes delivered through the motion-toon viewer.
///
/// Only the still-image table is used. Keys are opaque identifiers whose
/// lexicographic order is the page order; the JSON object order is not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotiontoonManifest {
    #[serde(default)]
    pub assets: MotiontoonAssets,
}

/// Asset tables of a motion-toon manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotiontoonAssets {
    /// Opaque key to image filename.
    #[serde(default)]
    pub image: BTreeMap<String, String>,
}

impl MotiontoonManifest {
    /// Image filenames ordered by their sorted keys.
    pub fn ordered_filenames(&self) -> impl Iterator<Item = &str> {
        self.assets.image.values().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_sorted_regardless_of_json_order() {
        let json = r#"{
            "assets": {
                "image": {
                    "layer-3": "c.png",
                    "layer-1": "a.png",
                    "layer-2": "b.png"
                },
                "sound": {}
            }
        }"#;
        let manifest: MotiontoonManifest = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = manifest.ordered_filenames().collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_missing_assets() {
        let manifest: MotiontoonManifest = serde_json::from_str("{}").unwrap();
        assert_eq!(manifest.ordered_filenames().count(), 0);
    }
}
