use wgpu::util::DeviceExt;
use winit::dpi::PhysicalPosition;
use winit::event::*;

use crate::config::CameraConfig;
use crate::process::transform::{
    model_view, normal_matrix, perspective_projection, vertical_fov, FAR, NEAR,
};

/// Orbit state of the model: rotation angles driven by a damped angular
/// velocity.
pub struct SpinCamera {
    pub angle: [f32; 2],
    pub angular_velocity: [f32; 2],
    pub aspect: f32,
    config: CameraConfig,
    last_frame: Option<f64>,
    last_spin_sound: Option<f64>,
}

impl SpinCamera {
    pub fn new(config: CameraConfig, aspect: f32) -> Self {
        Self {
            angle: [0.0, 0.0],
            angular_velocity: [0.0, 0.0],
            aspect,
            config,
            last_frame: None,
            last_spin_sound: None,
        }
    }

    /// Drag velocity in pixels per second.
    pub fn set_drag_velocity(&mut self, velocity: [f32; 2]) {
        self.angular_velocity = [
            velocity[0] * self.config.velocity_scale,
            velocity[1] * self.config.velocity_scale,
        ];
    }

    pub fn spin_speed(&self) -> f32 {
        self.angular_velocity[0].hypot(self.angular_velocity[1])
    }

    /// Advances the rotation to time `now` (seconds). Returns `true` when
    /// the model is spinning fast enough to play the spin sound and the
    /// previous one has had time to finish.
    pub fn update(&mut self, now: f64) -> bool {
        let dt = match self.last_frame.replace(now) {
            Some(last) => (now - last) as f32,
            None => return false,
        };
        if dt <= 0.0 {
            return false;
        }

        self.angle[0] += self.angular_velocity[0] * dt;
        self.angle[1] += self.angular_velocity[1] * dt;

        let keep = 1.0 - self.config.rotation_damping;
        self.angular_velocity[0] *= keep;
        self.angular_velocity[1] *= keep;

        let rested = self
            .last_spin_sound
            .map_or(true, |last| now > last + self.config.sound_cooldown);
        if self.spin_speed() > self.config.spin_threshold && rested {
            self.last_spin_sound = Some(now);
            return true;
        }
        false
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    // mat3x3 columns are 16-byte aligned in WGSL uniforms
    pub normal_matrix: [[f32; 4]; 3],
}

impl Uniforms {
    /// Matrices for a model rotated by `angle` and pushed `distance` units
    /// in front of the eye.
    pub fn from_view(angle: [f32; 2], aspect: f32, distance: f32) -> Self {
        let model_view = model_view(angle, distance);
        let projection = perspective_projection(aspect, vertical_fov(aspect), NEAR, FAR);
        let normal = normal_matrix(&model_view);
        Self {
            model_view_projection: (projection * model_view).into(),
            model_view: model_view.into(),
            normal_matrix: [
                normal.x.extend(0.0).into(),
                normal.y.extend(0.0).into(),
                normal.z.extend(0.0).into(),
            ],
        }
    }

    pub fn to_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(self),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, buffer: &wgpu::Buffer, queue: &wgpu::Queue) {
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(self));
    }
}

impl From<&SpinCamera> for Uniforms {
    fn from(camera: &SpinCamera) -> Self {
        Uniforms::from_view(camera.angle, camera.aspect, camera.config.distance)
    }
}

/// Turns mouse drags and touch moves into a drag velocity.
pub struct DragController {
    dragging: bool,
    last: Option<([f64; 2], f64)>,
    velocity: Option<[f32; 2]>,
}

impl DragController {
    pub fn new() -> Self {
        Self {
            dragging: false,
            last: None,
            velocity: None,
        }
    }

    pub fn process_events(&mut self, event: &WindowEvent, now: f64) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => self.begin_drag(),
                    ElementState::Released => self.end_drag(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    self.drag_to(*position, now);
                }
                self.dragging
            }
            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => {
                match phase {
                    TouchPhase::Started => {
                        self.begin_drag();
                        self.drag_to(*location, now);
                    }
                    TouchPhase::Moved => self.drag_to(*location, now),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.end_drag(),
                }
                true
            }
            _ => false,
        }
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.last = None;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.last = None;
    }

    pub fn drag_to(&mut self, position: PhysicalPosition<f64>, now: f64) {
        let position = [position.x, position.y];
        if let Some((last, time)) = self.last {
            let dt = now - time;
            if dt > 1e-4 {
                self.velocity = Some([
                    ((position[0] - last[0]) / dt) as f32,
                    ((position[1] - last[1]) / dt) as f32,
                ]);
            }
        }
        self.last = Some((position, now));
    }

    /// Hands the latest sampled velocity to the camera, once.
    pub fn update_camera(&mut self, camera: &mut SpinCamera) {
        if let Some(velocity) = self.velocity.take() {
            camera.set_drag_velocity(velocity);
        }
    }
}
