//! Phong lighting shared by the lit fragment stage.
//!
//! `shade` is the CPU rendition of `fs_main` in the lit fragment shader, which
//! declares the same three constants.

use glam::{Vec3, Vec4};

pub const AMBIENT_STRENGTH: f32 = 0.1;
pub const SPECULAR_INTENSITY: f32 = 0.8;
pub const HIGHLIGHT_SIZE: f32 = 16.0;

/// Color the lamp marker is drawn with.
pub const LAMP_COLOR: Vec4 = Vec4::ONE;

/// Everything a single fragment needs to be lit.
#[derive(Debug, Clone, Copy)]
pub struct PhongInputs {
    /// World-space fragment position.
    pub fragment_position: Vec3,
    /// Interpolated world-space normal; renormalized by `shade`.
    pub normal: Vec3,
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub object_color: Vec3,
    pub view_position: Vec3,
    /// Sampled texel.
    pub texel: Vec4,
}

/// Ambient, diffuse and specular terms before object color and texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongTerms {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl PhongTerms {
    pub fn sum(&self) -> Vec3 {
        self.ambient + self.diffuse + self.specular
    }
}

pub fn terms(inputs: &PhongInputs) -> PhongTerms {
    let ambient = AMBIENT_STRENGTH * inputs.light_color;

    let normal = inputs.normal.normalize_or_zero();
    let light_dir = (inputs.light_position - inputs.fragment_position).normalize_or_zero();
    let impact = normal.dot(light_dir).max(0.0);
    let diffuse = impact * inputs.light_color;

    let view_dir = (inputs.view_position - inputs.fragment_position).normalize_or_zero();
    let reflect_dir = reflect(-light_dir, normal);
    let highlight = view_dir.dot(reflect_dir).max(0.0).powf(HIGHLIGHT_SIZE);
    let specular = SPECULAR_INTENSITY * highlight * inputs.light_color;

    PhongTerms {
        ambient,
        diffuse,
        specular,
    }
}

/// Final fragment color: `texel * vec4((ambient + diffuse + specular) * object, 1)`.
pub fn shade(inputs: &PhongInputs) -> Vec4 {
    let phong = terms(inputs).sum() * inputs.object_color;
    inputs.texel * phong.extend(1.0)
}

/// GLSL/WGSL `reflect`: `i - 2 * dot(n, i) * n`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head_on() -> PhongInputs {
        PhongInputs {
            fragment_position: Vec3::ZERO,
            normal: Vec3::Z,
            light_position: Vec3::new(0.0, 0.0, 5.0),
            light_color: Vec3::ONE,
            object_color: Vec3::ONE,
            view_position: Vec3::new(0.0, 0.0, 2.0),
            texel: Vec4::ONE,
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn head_on_light_saturates() {
        let inputs = head_on();
        let terms = terms(&inputs);
        assert!(approx(terms.ambient, Vec3::splat(0.1)));
        assert!(approx(terms.diffuse, Vec3::ONE));
        assert!(approx(terms.specular, Vec3::splat(0.8)));
        let color = shade(&inputs);
        assert!(approx(color.truncate(), Vec3::splat(1.9)));
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn light_behind_surface_leaves_ambient() {
        let mut inputs = head_on();
        inputs.light_position = Vec3::new(0.0, 0.0, -5.0);
        let terms = terms(&inputs);
        assert!(approx(terms.diffuse, Vec3::ZERO));
        assert!(approx(terms.specular, Vec3::ZERO));
        assert!(approx(shade(&inputs).truncate(), Vec3::splat(0.1)));
    }

    #[test]
    fn object_color_and_texel_scale_result() {
        let mut inputs = head_on();
        inputs.object_color = Vec3::new(1.0, 0.9, 1.15);
        inputs.texel = Vec4::new(0.5, 1.0, 1.0, 0.25);
        let color = shade(&inputs);
        assert!(approx(color.truncate(), Vec3::new(0.95, 1.71, 2.185)));
        assert!((color.w - 0.25).abs() < 1e-6);
    }

    #[test]
    fn normal_is_renormalized() {
        let mut inputs = head_on();
        inputs.normal = Vec3::new(0.0, 0.0, 7.5);
        assert!(approx(shade(&inputs).truncate(), Vec3::splat(1.9)));
    }

    #[test]
    fn grazing_view_kills_specular() {
        let mut inputs = head_on();
        inputs.light_position = Vec3::new(5.0, 0.0, 5.0);
        inputs.view_position = Vec3::new(5.0, 0.0, 5.0);
        let terms = terms(&inputs);
        // reflection points away from the viewer
        assert!(terms.specular.max_element() < 1e-3);
        assert!((terms.diffuse.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn reflect_mirrors_about_normal() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert!(approx(r, Vec3::new(1.0, 1.0, 0.0)));
    }
}
