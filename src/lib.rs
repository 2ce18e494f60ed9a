pub mod config;
pub mod error;
pub mod primitives;
pub mod process;

use std::iter;
use std::time::Instant;

use anyhow::Context;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use config::ViewerConfig;
use primitives::camera::{DragController, SpinCamera, Uniforms};
use primitives::group::Group;
use primitives::material::Material;
use primitives::mesh::Mesh;
use primitives::sound::{LogSound, SoundEffect};
use primitives::texture::Texture;
use process::obj::ObjModel;
use process::pipeline::create_render_pipeline;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub struct State {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    depth_texture: Texture,
    mesh: Mesh,
    material: Material,
    camera: SpinCamera,
    drag_controller: DragController,
    uniforms: Uniforms,
    uniform_buffer: wgpu::Buffer,
    clear_color: wgpu::Color,
    spin_sound: Box<dyn SoundEffect>,
    start: Instant,
    window: Window,
}

/// Picks the configured group, or the first one with geometry.
pub fn select_group<'a>(model: &'a ObjModel, name: Option<&str>) -> anyhow::Result<&'a Group> {
    let group = match name {
        Some(name) => model.group_named(name)?,
        None => model
            .first_non_empty()
            .context("model has no faces to draw")?,
    };
    anyhow::ensure!(!group.is_empty(), "group '{}' has no faces", group.name());
    Ok(group)
}

impl State {
    async fn new(window: Window, viewer: &ViewerConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let model = ObjModel::from_path(&viewer.model.path, viewer.model.generate_normals)
            .with_context(|| format!("failed to load {}", viewer.model.path.display()))?;
        let group = select_group(&model, viewer.model.group.as_deref())?;

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // The surface must not outlive the window; both live in State.
        let surface = unsafe { instance.create_surface(&window) }
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        log::info!("{:#?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_texture = Texture::create_depth_texture(&device, &config, "Depth Texture");

        let aspect = config.width as f32 / config.height as f32;
        let camera = SpinCamera::new(viewer.camera, aspect);
        let uniforms = Uniforms::from(&camera);
        let uniform_buffer = uniforms.to_buffer(&device);

        let mesh = Mesh::from_group(&device, group);

        let diffuse = match Texture::from_path(&device, &queue, &viewer.texture) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{:#}; using a white texture", e);
                Texture::white(&device, &queue)
            }
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("./shaders/shader.wgsl").into()),
        });
        let material = Material::new(&device, shader, diffuse, &uniform_buffer);
        let render_pipeline = create_render_pipeline(&device, &material, config.format);

        let [r, g, b, a] = viewer.clear_color;
        let spin_sound = LogSound::new(viewer.sound.clone());
        log::debug!("spin sound: {}", spin_sound.name());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            depth_texture,
            mesh,
            material,
            camera,
            drag_controller: DragController::new(),
            uniforms,
            uniform_buffer,
            clear_color: wgpu::Color { r, g, b, a },
            spin_sound: Box::new(spin_sound),
            start: Instant::now(),
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture =
                Texture::create_depth_texture(&self.device, &self.config, "Depth Texture");
            self.camera.aspect = new_size.width as f32 / new_size.height as f32;
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        let now = self.now();
        self.drag_controller.process_events(event, now)
    }

    fn update(&mut self) {
        let now = self.now();
        self.drag_controller.update_camera(&mut self.camera);
        if self.camera.update(now) {
            self.spin_sound.play();
        }
        self.uniforms = Uniforms::from(&self.camera);
        self.uniforms.update_buffer(&self.uniform_buffer, &self.queue);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.material.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.mesh.index_buffer.slice(..), Mesh::INDEX_FORMAT);
            render_pass.draw_indexed(0..self.mesh.index_count(), 0, 0..1);
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

pub async fn run(viewer: ViewerConfig) -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&viewer.window.title)
        .with_inner_size(winit::dpi::LogicalSize::new(
            viewer.window.width,
            viewer.window.height,
        ))
        .build(&event_loop)
        .context("failed to create window")?;

    let mut state = State::new(window, &viewer).await?;
    log::info!("drawing group '{}'", state.mesh.name);

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == state.window().id() => {
            if !state.input(event) {
                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        state.resize(**new_inner_size);
                    }
                    _ => {}
                }
            }
        }
        Event::RedrawRequested(window_id) if window_id == state.window().id() => {
            state.update();
            match state.render() {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    state.resize(state.size)
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("out of GPU memory");
                    *control_flow = ControlFlow::Exit
                }
                Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
            }
        }
        Event::MainEventsCleared => {
            state.window().request_redraw();
        }
        _ => {}
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GROUPS: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\ng empty\ng tri\nf 1 2 3\n";

    #[test]
    fn selects_first_group_with_faces() {
        let model = ObjModel::parse(TWO_GROUPS, false).unwrap();
        assert_eq!(select_group(&model, None).unwrap().name(), "tri");
        assert_eq!(select_group(&model, Some("tri")).unwrap().name(), "tri");
    }

    #[test]
    fn rejects_missing_or_empty_groups() {
        let model = ObjModel::parse(TWO_GROUPS, false).unwrap();
        assert!(select_group(&model, Some("empty")).is_err());
        assert!(select_group(&model, Some("nope")).is_err());

        let bare = ObjModel::parse("v 0 0 0\n", false).unwrap();
        assert!(select_group(&bare, None).is_err());
    }

    #[test]
    fn depth_maps_to_zero_one() {
        use cgmath::{Matrix4, SquareMatrix, Vector4};
        let m: Matrix4<f32> = OPENGL_TO_WGPU_MATRIX * Matrix4::identity();
        let near = m * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = m * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-6);
        assert!((far.z / far.w - 1.0).abs() < 1e-6);
    }
}
