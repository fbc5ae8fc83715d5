//! Material and alpha state derived from source property blocks

use std::path::PathBuf;

use crate::paths::{relative_to, source_texture_path, texture_output_path, to_uri};
use crate::scene::{AlphaProperty, ShaderProperty};

/// Alpha blend flag (bit 0 of the alpha property flags)
pub const ALPHA_BLEND_FLAG: u16 = 1;
/// Alpha test flag (bit 9 of the alpha property flags)
pub const ALPHA_TEST_FLAG: u16 = 1 << 9;

/// Metalness written when unreal compatibility is off
pub const DEFAULT_METALNESS: f32 = 1e-5;
const UNREAL_ALPHA_METALNESS: f32 = 1.0;
const UNREAL_OPAQUE_METALNESS: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Output-relative texture URIs in fixed slot order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSlots {
    pub diffuse: Option<String>,
    pub normal: Option<String>,
    pub emissive: Option<String>,
    /// Carried for completeness, never attached to a material channel
    pub height: Option<String>,
}

impl TextureSlots {
    pub fn count(&self) -> usize {
        [&self.diffuse, &self.normal, &self.emissive, &self.height]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}

/// Resolved material state for one geometry node
///
/// `alpha_cutoff` is `Some` exactly when `alpha_mode` is [`AlphaMode::Mask`],
/// and both non-opaque modes are double sided.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: Option<f32>,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: [f32; 3],
    pub double_sided: bool,
    pub textures: TextureSlots,
}

/// Directories used to turn source texture references into document URIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureLocations {
    /// Where texture references are resolved from
    pub texture_root: PathBuf,
    /// Root that output paths mirror
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Directory of the document being written
    pub document_dir: PathBuf,
    /// Source texture extension rewritten to `.png`
    pub source_extension: String,
}

impl TextureLocations {
    /// URI of the converted texture as seen from the document directory
    pub fn uri_for(&self, reference: &str) -> String {
        let source = source_texture_path(&self.texture_root, reference);
        let output = texture_output_path(
            &source,
            &self.input_root,
            &self.output_root,
            &self.source_extension,
        );
        to_uri(&relative_to(&output, &self.document_dir))
    }
}

pub struct MaterialResolver {
    unreal: bool,
    emissive: [f32; 3],
    locations: TextureLocations,
}

impl MaterialResolver {
    pub fn new(unreal: bool, emissive: [f32; 3], locations: TextureLocations) -> Self {
        Self {
            unreal,
            emissive: emissive.map(|f| f.clamp(0.0, 1.0)),
            locations,
        }
    }

    pub fn resolve(
        &self,
        name: &str,
        shader: Option<&ShaderProperty>,
        alpha: Option<&AlphaProperty>,
    ) -> MaterialDescriptor {
        let roughness = shader
            .and_then(|s| s.glossiness)
            .map(|g| (g / 255.0).clamp(0.0, 1.0))
            .unwrap_or(1.0);

        let (test, blend, cutoff) = match alpha {
            Some(alpha) => (
                alpha.flags & ALPHA_TEST_FLAG != 0,
                alpha.flags & ALPHA_BLEND_FLAG != 0,
                alpha.threshold as f32 / 255.0,
            ),
            None => (false, false, 0.0),
        };

        let (alpha_mode, alpha_cutoff) = if blend {
            (AlphaMode::Blend, None)
        } else if test {
            (AlphaMode::Mask, Some(cutoff))
        } else {
            (AlphaMode::Opaque, None)
        };

        let metalness = match (self.unreal, test || blend) {
            (false, _) => DEFAULT_METALNESS,
            (true, true) => UNREAL_ALPHA_METALNESS,
            (true, false) => UNREAL_OPAQUE_METALNESS,
        };

        MaterialDescriptor {
            alpha_mode,
            alpha_cutoff,
            roughness,
            metalness,
            emissive: self.emissive,
            double_sided: alpha_mode != AlphaMode::Opaque,
            textures: self.resolve_textures(name, shader),
        }
    }

    fn resolve_textures(&self, name: &str, shader: Option<&ShaderProperty>) -> TextureSlots {
        let Some(set) = shader.and_then(|s| s.textures.as_ref()) else {
            tracing::warn!("Mesh '{}' has no texture set", name);
            return TextureSlots::default();
        };

        let slot = |index: usize| {
            set.get(index)
                .map(|reference| reference.trim())
                .filter(|reference| !reference.is_empty())
                .map(|reference| self.locations.uri_for(reference))
        };

        TextureSlots {
            diffuse: slot(0),
            normal: slot(1),
            emissive: slot(2),
            height: slot(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> TextureLocations {
        TextureLocations {
            texture_root: PathBuf::from("/data"),
            input_root: PathBuf::from("/data"),
            output_root: PathBuf::from("/out"),
            document_dir: PathBuf::from("/out/meshes/arch/wall/wall"),
            source_extension: "dds".to_string(),
        }
    }

    fn resolver(unreal: bool) -> MaterialResolver {
        MaterialResolver::new(unreal, [1.0, 1.0, 1.0], locations())
    }

    #[test]
    fn test_alpha_test_is_mask() {
        let alpha = AlphaProperty {
            flags: ALPHA_TEST_FLAG,
            threshold: 64,
        };
        let material = resolver(false).resolve("Leaf", None, Some(&alpha));

        assert_eq!(material.alpha_mode, AlphaMode::Mask);
        let cutoff = material.alpha_cutoff.unwrap();
        assert!((cutoff - 0.251).abs() < 1e-3);
        assert!(material.double_sided);
    }

    #[test]
    fn test_blend_overrides_mask() {
        let alpha = AlphaProperty {
            flags: ALPHA_TEST_FLAG | ALPHA_BLEND_FLAG,
            threshold: 128,
        };
        let material = resolver(false).resolve("Glass", None, Some(&alpha));

        assert_eq!(material.alpha_mode, AlphaMode::Blend);
        assert_eq!(material.alpha_cutoff, None);
        assert!(material.double_sided);
    }

    #[test]
    fn test_no_alpha_property_is_opaque() {
        let shader = ShaderProperty {
            glossiness: Some(51.0),
            textures: None,
        };
        let material = resolver(false).resolve("Wall", Some(&shader), None);

        assert_eq!(material.alpha_mode, AlphaMode::Opaque);
        assert_eq!(material.alpha_cutoff, None);
        assert!(!material.double_sided);
        assert!((material.roughness - 0.2).abs() < 1e-6);
        assert_eq!(material.metalness, DEFAULT_METALNESS);
    }

    #[test]
    fn test_roughness_defaults_and_clamps() {
        assert_eq!(resolver(false).resolve("A", None, None).roughness, 1.0);

        let glossy = ShaderProperty {
            glossiness: Some(400.0),
            textures: None,
        };
        assert_eq!(resolver(false).resolve("B", Some(&glossy), None).roughness, 1.0);
    }

    #[test]
    fn test_unreal_metalness() {
        let alpha = AlphaProperty {
            flags: ALPHA_BLEND_FLAG,
            threshold: 0,
        };
        assert_eq!(resolver(true).resolve("A", None, Some(&alpha)).metalness, 1.0);
        assert_eq!(resolver(true).resolve("B", None, None).metalness, 0.001);

        // alpha property present but neither flag set
        let inert = AlphaProperty {
            flags: 0,
            threshold: 200,
        };
        assert_eq!(resolver(true).resolve("C", None, Some(&inert)).metalness, 0.001);
    }

    #[test]
    fn test_texture_slots() {
        let shader = ShaderProperty {
            glossiness: None,
            textures: Some(vec![
                r"Textures\Arch\Wall01.dds".to_string(),
                String::new(),
                r"textures\arch\wall01_g.DDS".to_string(),
                r"textures\arch\wall01_p.dds".to_string(),
            ]),
        };
        let material = resolver(false).resolve("Wall", Some(&shader), None);

        assert_eq!(
            material.textures.diffuse.as_deref(),
            Some("../../../../textures/arch/wall01.png")
        );
        assert_eq!(material.textures.normal, None);
        assert_eq!(
            material.textures.emissive.as_deref(),
            Some("../../../../textures/arch/wall01_g.png")
        );
        assert!(material.textures.height.is_some());
        assert_eq!(material.textures.count(), 3);
    }

    #[test]
    fn test_emissive_is_clamped() {
        let resolver = MaterialResolver::new(false, [3.0, 0.5, -2.0], locations());
        assert_eq!(resolver.resolve("A", None, None).emissive, [1.0, 0.5, 0.0]);
    }
}
