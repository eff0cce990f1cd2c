//! Per-frame draw planning.
//!
//! A frame is `Clear -> DrawLit(mesh)* -> DrawLamp -> Present`. The plan is
//! built on the CPU from the scene and the camera, then handed to the GPU
//! renderer, which replays it inside a single render pass.

use glam::{Mat3, Mat4, Vec3};

use crate::camera::CameraView;
use crate::geometry::MeshId;
use crate::scene::{Scene, SceneConstants};
use crate::shader::ProgramKind;
use crate::uniforms::UniformBlock;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// One step of the frame state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Clear,
    DrawLit(MeshId),
    DrawLamp,
    Present,
}

/// A single non-indexed draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub program: ProgramKind,
    pub mesh: MeshId,
    pub model: Mat4,
}

impl DrawCall {
    /// Stages every uniform the frame knows about; the program keeps the
    /// ones it declares.
    pub fn write_uniforms(&self, plan: &FramePlan, block: &mut UniformBlock) {
        block.set_mat4("model", self.model);
        block.set_mat4("view", plan.view);
        block.set_mat4("projection", plan.projection);
        block.set_mat3(
            "normalMatrix",
            Mat3::from_mat4(self.model).inverse().transpose(),
        );
        block.set_vec3("objectColor", plan.constants.object_color);
        block.set_vec3("lightColor", plan.constants.light_color);
        block.set_vec3("lightPos", plan.constants.light_position);
        block.set_vec3("viewPosition", plan.view_position);
    }
}

/// Matrices and ordered draws for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec3,
    pub constants: SceneConstants,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    pub fn stages(&self) -> Vec<FrameStage> {
        let mut stages = Vec::with_capacity(self.draws.len() + 2);
        stages.push(FrameStage::Clear);
        stages.extend(self.draws.iter().map(|draw| match draw.program {
            ProgramKind::Lit => FrameStage::DrawLit(draw.mesh),
            ProgramKind::Lamp => FrameStage::DrawLamp,
        }));
        stages.push(FrameStage::Present);
        stages
    }
}

/// Perspective projection for the camera zoom and the surface aspect ratio.
pub fn projection(zoom_degrees: f32, aspect: f32) -> Mat4 {
    let aspect = if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    };
    Mat4::perspective_rh(zoom_degrees.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
}

/// Width over height, or 1 while the surface is degenerate.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

pub fn plan_frame(scene: &Scene, camera: &impl CameraView, aspect: f32) -> FramePlan {
    let mut draws: Vec<DrawCall> = scene
        .objects
        .iter()
        .map(|object| DrawCall {
            program: ProgramKind::Lit,
            mesh: object.mesh,
            model: object.transform.matrix(),
        })
        .collect();
    draws.push(DrawCall {
        program: ProgramKind::Lamp,
        mesh: scene.lamp_mesh,
        model: scene.lamp_model(),
    });

    FramePlan {
        view: camera.view_matrix(),
        projection: projection(camera.zoom(), aspect),
        view_position: camera.position(),
        constants: scene.constants,
        draws,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::uniforms::{LAMP_UNIFORMS, LIT_UNIFORMS};

    #[test]
    fn stages_follow_draw_order() {
        let plan = plan_frame(&Scene::default(), &Camera::default(), 4.0 / 3.0);
        assert_eq!(
            plan.stages(),
            vec![
                FrameStage::Clear,
                FrameStage::DrawLit(MeshId::Desk),
                FrameStage::DrawLit(MeshId::Mug),
                FrameStage::DrawLit(MeshId::Keyboard),
                FrameStage::DrawLamp,
                FrameStage::Present,
            ]
        );
    }

    #[test]
    fn lamp_draw_uses_light_transform() {
        let scene = Scene::default();
        let plan = plan_frame(&scene, &Camera::default(), 1.0);
        let lamp = plan.draws.last().unwrap();
        assert_eq!(lamp.program, ProgramKind::Lamp);
        assert_eq!(lamp.model, scene.lamp_model());
    }

    #[test]
    fn projection_tracks_zoom_and_aspect() {
        let mut camera = Camera::default();
        let wide = plan_frame(&Scene::default(), &camera, 2.0).projection;
        let square = plan_frame(&Scene::default(), &camera, 1.0).projection;
        assert!((square.x_axis.x - 2.0 * wide.x_axis.x).abs() < 1e-5);

        camera.process_mouse_scroll(20.0);
        let zoomed = plan_frame(&Scene::default(), &camera, 1.0).projection;
        assert!(zoomed.y_axis.y > square.y_axis.y);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        assert_eq!(aspect_ratio(800, 0), 1.0);
        assert_eq!(projection(45.0, 0.0), projection(45.0, 1.0));
        assert_eq!(aspect_ratio(800, 600), 800.0 / 600.0);
    }

    #[test]
    fn lit_block_receives_lighting() {
        let plan = plan_frame(&Scene::default(), &Camera::default(), 1.0);
        let mut block = UniformBlock::new(LIT_UNIFORMS);
        plan.draws[0].write_uniforms(&plan, &mut block);
        let light = block.read_floats("lightPos").unwrap();
        assert_eq!(&light[..3], &[1.5, 0.5, 3.0]);
        let eye = block.read_floats("viewPosition").unwrap();
        assert_eq!(&eye[..3], &[0.0, 0.0, 3.0]);
    }

    #[test]
    fn lamp_block_ignores_lighting_names() {
        let plan = plan_frame(&Scene::default(), &Camera::default(), 1.0);
        let mut block = UniformBlock::new(LAMP_UNIFORMS);
        let lamp = plan.draws.last().unwrap();
        lamp.write_uniforms(&plan, &mut block);
        let model = block.read_floats("model").unwrap();
        assert_eq!(model, lamp.model.to_cols_array().to_vec());
        assert_eq!(block.as_bytes().len(), LAMP_UNIFORMS.size);
    }
}
