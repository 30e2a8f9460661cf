//! Construction parameters for [`TriangleTracer`](super::TriangleTracer).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bvh::Bvh;
use crate::util::{Error, Result, Vec3, EPS, INF};

/// Tracer sizing and feature switches.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Face capacity of the triangle store.
    pub max_faces: usize,
    /// BVH slot count; derived from `max_faces` when absent.
    pub tree_capacity: Option<usize>,
    /// Number of traversal stacks (concurrent rays).
    pub stack_slots: usize,
    /// Entries per traversal stack; derived from `max_faces` when absent.
    pub stack_depth: Option<usize>,

    // Per-face attributes
    pub smoothing: bool,
    pub texturing: bool,
    pub multi_material: bool,

    // Tolerances
    pub eps: f32,
    pub inf: f32,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            max_faces: 1 << 16,
            tree_capacity: None,
            stack_slots: 64,
            stack_depth: None,
            smoothing: false,
            texturing: false,
            multi_material: true,
            eps: EPS,
            inf: INF,
        }
    }
}

impl TracerConfig {
    /// Default config with room for `max_faces` faces.
    pub fn with_max_faces(max_faces: usize) -> Self {
        Self {
            max_faces,
            ..Default::default()
        }
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Tree slots actually allocated.
    pub fn tree_capacity(&self) -> usize {
        self.tree_capacity
            .unwrap_or_else(|| Bvh::<Vec3>::required_capacity(self.max_faces))
    }

    /// Stack entries actually allocated per slot.
    pub fn stack_depth(&self) -> usize {
        self.stack_depth
            .unwrap_or_else(|| Bvh::<Vec3>::required_stack_depth(self.max_faces))
    }

    /// Check that a full store can always be built and traversed.
    pub fn validate(&self) -> Result<()> {
        if self.max_faces == 0 {
            return Err(Error::config("max_faces must be positive"));
        }
        if self.stack_slots == 0 {
            return Err(Error::config("stack_slots must be positive"));
        }

        let required = Bvh::<Vec3>::checked_required_capacity(self.max_faces)
            .ok_or_else(|| Error::config(format!("max_faces {} is too large", self.max_faces)))?;
        let capacity = self.tree_capacity();
        if capacity < required {
            return Err(Error::TreeCapacity { required, capacity });
        }

        let depth = Bvh::<Vec3>::required_stack_depth(self.max_faces);
        if self.stack_depth() < depth {
            return Err(Error::config(format!(
                "stack_depth {} below the {} needed for {} faces",
                self.stack_depth(),
                depth,
                self.max_faces
            )));
        }

        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(Error::config(format!("eps must be positive, got {}", self.eps)));
        }
        if !(self.inf.is_finite() && self.inf > self.eps) {
            return Err(Error::config(format!("inf must exceed eps, got {}", self.inf)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TracerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tree_capacity(), 1 << 17);
        assert_eq!(config.stack_depth(), 17);
    }

    #[test]
    fn test_partial_json() {
        let config = TracerConfig::from_json(r#"{ "max_faces": 100, "smoothing": true }"#).unwrap();
        assert_eq!(config.max_faces, 100);
        assert!(config.smoothing);
        assert!(!config.texturing);
        assert_eq!(config.stack_slots, 64);
        assert_eq!(config.tree_capacity(), 256);
    }

    #[test]
    fn test_small_tree_rejected() {
        let config = TracerConfig {
            max_faces: 100,
            tree_capacity: Some(128),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::TreeCapacity { required: 256, capacity: 128 })
        ));
    }

    #[test]
    fn test_shallow_stack_rejected() {
        let config = TracerConfig {
            max_faces: 100,
            stack_depth: Some(4),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = TracerConfig { stack_depth: Some(512), ..config };
        config.validate().unwrap();
    }

    #[test]
    fn test_huge_max_faces_rejected() {
        let config = TracerConfig::with_max_faces(usize::MAX);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let err = TracerConfig::from_json(r#"{ "max_faces": 18446744073709551615 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_tolerances() {
        let config = TracerConfig {
            eps: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TracerConfig {
            inf: f32::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracer.json");

        let config = TracerConfig {
            max_faces: 512,
            stack_slots: 8,
            texturing: true,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(TracerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TracerConfig::load(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ max_faces: ").unwrap();
        assert!(matches!(TracerConfig::load(&path), Err(Error::Json(_))));
    }
}
