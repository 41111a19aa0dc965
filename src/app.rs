use std::{
    collections::HashMap,
    mem, process,
    sync::Arc,
    time::{Duration, Instant},
};

use bytemuck::NoUninit;
use wgpu::{
    util::{DeviceExt, TextureDataOrder},
    Adapter, Backends, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Buffer, BufferBindingType, BufferDescriptor, BufferUsages, Color, ColorTargetState,
    ColorWrites, CommandEncoder, Device, DeviceDescriptor, Extent3d, FilterMode, FragmentState,
    InstanceDescriptor, LoadOp, MemoryHints, MultisampleState, Operations,
    PipelineCompilationOptions, PipelineLayoutDescriptor, PrimitiveState, PrimitiveTopology, Queue,
    RenderPass, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline,
    RenderPipelineDescriptor, RequestAdapterOptions, SamplerBindingType, SamplerDescriptor,
    ShaderModuleDescriptor, ShaderSource, ShaderStages, Surface, SurfaceError, SurfaceTarget,
    Texture, TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages,
    TextureViewDimension, VertexState,
};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    cmd::Action,
    config::{self, Config},
    dial::Dial,
    engine::{Engine, Segment},
    math::{lerp, srgb_to_linear, vec2, Vec2f},
};

/// Cadence of the keyboard tick, roughly one per display refresh.
const FRAME: Duration = Duration::from_millis(16);

const MARGIN: f32 = 28.0;
const DIAL_STRIP: f32 = 150.0;
const DIAL_RADIUS: f32 = 48.0;
const KNOB_RADIUS: f32 = 7.0;
const DISC_TEXTURE_SIZE: u32 = 64;
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub struct App {
    instance: wgpu::Instance,
    config: Config,
    binds: HashMap<KeyCode, Action>,
    win: Option<Win>,
}

struct Gpu {
    adapter: Adapter,
    device: Device,
    queue: Queue,
    /// Format of the window surface, used as the format of every render target.
    format: TextureFormat,

    render_pipeline: RenderPipeline,
    sampler_bg: BindGroup,

    texture_bgl: BindGroupLayout,
    uniforms_bgl: BindGroupLayout,
    instances_bgl: BindGroupLayout,
}

impl Gpu {
    fn new(
        instance: &wgpu::Instance,
        surface: &Surface<'_>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            compatible_surface: Some(surface),
            ..Default::default()
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            memory_hints: MemoryHints::MemoryUsage,
            ..Default::default()
        }))?;

        let config = surface
            .get_default_config(&adapter, width, height)
            .expect("adapter does not support surface");

        // Shader
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("shader"),
            source: ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // BGLs
        let sampler_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("sampler"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                count: None,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
            }],
        });
        let texture_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("texture"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                count: None,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
            }],
        });
        let uniforms_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("uniforms"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                count: None,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
            }],
        });
        let instances_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("instances"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                count: None,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
            }],
        });

        // Pipeline.
        let render_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("main_render_pipeline"),
            layout: Some(&device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some("main_render_pipeline"),
                bind_group_layouts: &[&sampler_bgl, &texture_bgl, &uniforms_bgl, &instances_bgl],
                ..Default::default()
            })),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vertex"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[],
            },
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fragment"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: config.format,
                    blend: Some(BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: ColorWrites::all(),
                })],
            }),
            multiview: None,
            cache: None,
        });
        let sampler = device.create_sampler(&SamplerDescriptor {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });
        let sampler_bg = device.create_bind_group(&BindGroupDescriptor {
            label: Some("sampler"),
            layout: &sampler_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Sampler(&sampler),
            }],
        });

        Ok(Gpu {
            adapter,
            device,
            queue,
            format: config.format,
            render_pipeline,
            sampler_bg,
            texture_bgl,
            uniforms_bgl,
            instances_bgl,
        })
    }
}

/// Placement of the screen and the two dials inside the window, in physical
/// pixels. The engine works in screen-local coordinates; the layout decides
/// where that screen sits and where the dial hit regions are.
struct Layout {
    screen_origin: Vec2f,
    screen_size: Vec2f,
    dials: [Vec2f; 2],
}

impl Layout {
    fn compute(size: PhysicalSize<u32>) -> Layout {
        let w = size.width as f32;
        let h = size.height as f32;
        let dial_y = (h - DIAL_STRIP * 0.5).max(0.0);
        Layout {
            screen_origin: vec2(MARGIN, MARGIN),
            screen_size: vec2((w - 2.0 * MARGIN).max(1.0), (h - MARGIN - DIAL_STRIP).max(1.0)),
            dials: [
                vec2(MARGIN + DIAL_RADIUS, dial_y),
                vec2((w - MARGIN - DIAL_RADIUS).max(MARGIN + DIAL_RADIUS), dial_y),
            ],
        }
    }

    fn screen_center(&self) -> Vec2f {
        self.screen_origin + self.screen_size * 0.5
    }

    fn dial_center(&self, dial: Dial) -> Vec2f {
        match dial {
            Dial::Left => self.dials[0],
            Dial::Right => self.dials[1],
        }
    }
}

struct Win {
    window: Arc<Window>,
    surface: Surface<'static>,
    gpu: Gpu,

    engine: Engine,
    layout: Layout,
    stroke_width: f32,
    fill: Color,
    bezel: Color,

    canvas: Drawable,
    brush: Drawable,
    faces: Drawable,
    knobs: Drawable,

    pointer: Vec2f,
}

impl Win {
    fn recreate_swapchain(&self) {
        let res = self.window.inner_size();

        let config = self
            .surface
            .get_default_config(&self.gpu.adapter, res.width, res.height)
            .expect("adapter does not support surface");

        log::debug!(
            "configuring window surface for {}x{} (format: {:?}, present mode: {:?})",
            res.width,
            res.height,
            config.format,
            config.present_mode,
        );

        self.surface.configure(&self.gpu.device, &config);
    }

    /// Recomputes the layout for the current window size and re-initializes
    /// the screen at the new dimensions. Prior drawing is discarded; a size
    /// change is a full clear.
    fn relayout(&mut self) {
        self.layout = Layout::compute(self.window.inner_size());
        let size = self.layout.screen_size;
        self.engine.resize(size.x, size.y);
        self.canvas = Drawable::target(&self.gpu, size.x as u32, size.y as u32);
        self.faces.set_instances(
            &self.gpu,
            &[
                Instance::new(self.layout.dials[0], 1.0),
                Instance::new(self.layout.dials[1], 1.0),
            ],
        );
        log::debug!("screen resized to {}x{}", size.x, size.y);
    }

    fn redraw(&mut self) {
        let st = match self.surface.get_current_texture() {
            Ok(st) => st,
            Err(err @ (SurfaceError::Outdated | SurfaceError::Lost)) => {
                log::debug!("surface error: {}", err);
                self.recreate_swapchain();
                self.surface
                    .get_current_texture()
                    .expect("failed to acquire next frame after recreating swapchain")
            }
            Err(e) => {
                panic!("failed to acquire frame: {}", e);
            }
        };

        let frame = self.engine.take_frame();
        let mut enc = self.gpu.device.create_command_encoder(&Default::default());

        // Raster updates: the wipe repaints the base fill and always comes
        // before any queued stroke work.
        if frame.wipe {
            drop(Pass::new(
                &self.gpu,
                &mut enc,
                &self.canvas.texture,
                Some(self.fill),
            ));
        }
        if !frame.segments.is_empty() {
            let dots = stamp(&frame.segments, self.stroke_width * 0.25);
            self.brush.set_instances(&self.gpu, &dots);
            let mut pass = Pass::new(&self.gpu, &mut enc, &self.canvas.texture, None);
            self.brush.draw(&mut pass);
            drop(pass);
        }

        // Compose the screen and the dials onto the window surface.
        self.canvas.set_instances(
            &self.gpu,
            &[Instance::new(self.layout.screen_center(), self.engine.opacity())],
        );
        self.knobs.set_instances(
            &self.gpu,
            &[
                Instance::new(self.knob_pos(Dial::Left), 1.0),
                Instance::new(self.knob_pos(Dial::Right), 1.0),
            ],
        );

        let mut pass = Pass::new(&self.gpu, &mut enc, &st.texture, Some(self.bezel));
        self.canvas.draw(&mut pass);
        self.faces.draw(&mut pass);
        self.knobs.draw(&mut pass);
        drop(pass);

        self.gpu.queue.submit([enc.finish()]);
        self.window.pre_present_notify();
        st.present();
    }

    fn knob_pos(&self, dial: Dial) -> Vec2f {
        let rad = self.engine.angle(dial).to_radians();
        self.layout.dial_center(dial) + vec2(rad.cos(), rad.sin()) * (DIAL_RADIUS - KNOB_RADIUS - 4.0)
    }
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let binds = config
            .bind
            .iter()
            .map(|(key, &action)| (key.0, action))
            .collect();
        Ok(Self {
            instance: wgpu::Instance::new(&InstanceDescriptor {
                backends: Backends::PRIMARY,
                ..Default::default()
            }),
            config,
            binds,
            win: None,
        })
    }

    fn create_win(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Win> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title("Etchling")
                    .with_inner_size(LogicalSize::new(
                        self.config.window.width,
                        self.config.window.height,
                    )),
            )?,
        );

        let surface = self
            .instance
            .create_surface(SurfaceTarget::from(window.clone()))?;
        let res = window.inner_size();
        let gpu = Gpu::new(&self.instance, &surface, res.width, res.height)?;

        let layout = Layout::compute(res);
        let size = layout.screen_size;
        log::debug!(
            "creating screen at {}x{}, format={:?}",
            size.x,
            size.y,
            gpu.format
        );

        let engine = Engine::new(size.x, size.y, self.config.tuning, &self.config.wipe);
        let screen = self.config.screen;

        let canvas = Drawable::target(&gpu, size.x as u32, size.y as u32);
        let brush = Drawable::from_texture(
            &gpu,
            disc_texture(&gpu),
            vec2(screen.stroke_width, screen.stroke_width),
            linear_tint(screen.ink),
        );
        let mut faces = Drawable::from_texture(
            &gpu,
            disc_texture(&gpu),
            vec2(DIAL_RADIUS * 2.0, DIAL_RADIUS * 2.0),
            linear_tint(screen.fill),
        );
        faces.set_instances(
            &gpu,
            &[
                Instance::new(layout.dials[0], 1.0),
                Instance::new(layout.dials[1], 1.0),
            ],
        );
        let knobs = Drawable::from_texture(
            &gpu,
            disc_texture(&gpu),
            vec2(KNOB_RADIUS * 2.0, KNOB_RADIUS * 2.0),
            linear_tint(screen.ink),
        );

        let win = Win {
            window,
            surface,
            gpu,
            engine,
            layout,
            stroke_width: screen.stroke_width,
            fill: linear_color(screen.fill),
            bezel: linear_color(screen.bezel),
            canvas,
            brush,
            faces,
            knobs,
            pointer: Vec2f::ZERO,
        };
        win.recreate_swapchain();
        Ok(win)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.win.is_none() {
            let win = match self.create_win(event_loop) {
                Ok(win) => win,
                Err(e) => {
                    eprintln!("could not create window: {e}");
                    process::exit(1);
                }
            };
            self.win = Some(win);
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + FRAME));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(win) = &mut self.win else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => win.redraw(),
            WindowEvent::Resized(_) => {
                win.recreate_swapchain();
                win.relayout();
                win.window.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                // Held state is polled per tick; repeats carry no information.
                if !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if let Some(&action) = self.binds.get(&code) {
                            win.engine.key(action, event.state.is_pressed(), Instant::now());
                        }
                    }
                }
            }
            WindowEvent::Focused(false) => win.engine.release_keys(),
            WindowEvent::CursorMoved { position, .. } => {
                win.pointer = vec2(position.x as f32, position.y as f32);
                let mut turned = false;
                for dial in Dial::ALL {
                    turned |= win.engine.drag_to(dial, win.pointer);
                }
                if turned {
                    win.window.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    for dial in Dial::ALL {
                        let center = win.layout.dial_center(dial);
                        if win.pointer.dist(center) <= DIAL_RADIUS {
                            win.engine.begin_drag(dial, center, win.pointer);
                        }
                    }
                }
                // TODO: pointer capture so a drag survives leaving the window
                ElementState::Released => {
                    for dial in Dial::ALL {
                        win.engine.end_drag(dial);
                    }
                }
            },
            _ => {}
        }
    }

    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        let Some(win) = &mut self.win else { return };
        if let StartCause::ResumeTimeReached { .. } = cause {
            win.engine.tick();
            win.engine.advance(Instant::now());
            win.window.request_redraw();
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + FRAME));
        }
    }
}

/// Stamps brush impressions along each segment, spaced `spacing` pixels
/// apart and including both endpoints, which gives the stroke its round caps
/// and joints.
fn stamp(segments: &[Segment], spacing: f32) -> Vec<Instance> {
    let mut dots = Vec::new();
    for seg in segments {
        let n = (seg.from.dist(seg.to) / spacing).ceil().max(1.0) as usize;
        for i in 0..=n {
            let pos = lerp(seg.from..=seg.to, i as f32 / n as f32);
            dots.push(Instance::new(pos, 1.0));
        }
    }
    dots
}

/// A white disc with a one-pixel feathered edge, premultiplied. Tinting it
/// per drawable turns it into the brush tip, a dial face, or a knob marker.
fn disc_texture(gpu: &Gpu) -> Texture {
    let size = DISC_TEXTURE_SIZE;
    let center = (size - 1) as f32 * 0.5;
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let d = vec2(x as f32, y as f32).dist(vec2(center, center));
            let coverage = (center - d + 0.5).clamp(0.0, 1.0);
            let byte = (coverage * 255.0) as u8;
            data.extend_from_slice(&[byte; 4]);
        }
    }
    gpu.device.create_texture_with_data(
        &gpu.queue,
        &TextureDescriptor {
            label: None,
            size: Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        TextureDataOrder::MipMajor,
        &data,
    )
}

fn linear_tint(color: config::Color) -> [f32; 4] {
    let [r, g, b] = color.0;
    [
        srgb_to_linear(r),
        srgb_to_linear(g),
        srgb_to_linear(b),
        1.0,
    ]
}

fn linear_color(color: config::Color) -> Color {
    let [r, g, b] = color.0;
    Color {
        r: srgb_to_linear(r) as f64,
        g: srgb_to_linear(g) as f64,
        b: srgb_to_linear(b) as f64,
        a: 1.0,
    }
}

#[derive(Clone, Copy, NoUninit)]
#[repr(C)]
struct Uniforms {
    render_target_size: Vec2f,
    quad_size: Vec2f,
    tint: [f32; 4],
}

#[derive(Debug, Clone, Copy, NoUninit)]
#[repr(C)]
struct Instance {
    /// Center position in pixel coordinates.
    pos: Vec2f,
    opacity: f32,
    _padding: f32,
}

impl Instance {
    fn new(position: Vec2f, opacity: f32) -> Self {
        Self {
            pos: position,
            opacity,
            _padding: 0.0,
        }
    }
}

struct Pass<'a> {
    gpu: &'a Gpu,
    pass: RenderPass<'a>,
    render_target_size: Vec2f,
}

impl<'a> Pass<'a> {
    fn new(
        gpu: &'a Gpu,
        enc: &'a mut CommandEncoder,
        target: &Texture,
        clear: Option<Color>,
    ) -> Self {
        let pass = enc.begin_render_pass(&RenderPassDescriptor {
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &target.create_view(&Default::default()),
                depth_slice: None,
                resolve_target: None,
                ops: Operations {
                    load: if let Some(clear) = clear {
                        LoadOp::Clear(clear)
                    } else {
                        LoadOp::Load
                    },
                    ..Default::default()
                },
            })],
            ..Default::default()
        });

        Self {
            gpu,
            pass,
            render_target_size: vec2(target.width() as f32, target.height() as f32),
        }
    }
}

struct Drawable {
    texture: Texture,
    quad_size: Vec2f,
    tint: [f32; 4],
    uniform_buf: Buffer,
    instance_buf: Buffer,
    texture_bg: BindGroup,
    uniforms_bg: BindGroup,
    instances_bg: BindGroup,
    instance_count: u32,
}

impl Drawable {
    /// A drawable that can also be rendered into: the ink raster.
    fn target(gpu: &Gpu, width: u32, height: u32) -> Self {
        let texture = gpu.device.create_texture(&TextureDescriptor {
            label: None,
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: gpu.format,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self::from_texture(gpu, texture, vec2(width as f32, height as f32), WHITE)
    }

    fn from_texture(gpu: &Gpu, texture: Texture, quad_size: Vec2f, tint: [f32; 4]) -> Self {
        let uniform_buf = gpu.device.create_buffer(&BufferDescriptor {
            label: None,
            size: mem::size_of::<Uniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let instance_buf = gpu.device.create_buffer(&BufferDescriptor {
            label: None,
            size: mem::size_of::<Instance>() as u64, // 1 instance preallocated
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let texture_bg = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &gpu.texture_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&texture.create_view(&Default::default())),
            }],
        });
        let uniforms_bg = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &gpu.uniforms_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(uniform_buf.as_entire_buffer_binding()),
            }],
        });
        let instances_bg = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &gpu.instances_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(instance_buf.as_entire_buffer_binding()),
            }],
        });

        Self {
            texture,
            quad_size,
            tint,
            uniform_buf,
            instance_buf,
            texture_bg,
            uniforms_bg,
            instances_bg,
            instance_count: 0,
        }
    }

    fn set_instances(&mut self, gpu: &Gpu, instances: &[Instance]) {
        let size = (mem::size_of::<Instance>() * instances.len()) as u64;
        if self.instance_buf.size() < size {
            self.instance_buf = gpu.device.create_buffer(&BufferDescriptor {
                label: None,
                size,
                usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.instances_bg = gpu.device.create_bind_group(&BindGroupDescriptor {
                label: None,
                layout: &gpu.instances_bgl,
                entries: &[BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Buffer(self.instance_buf.as_entire_buffer_binding()),
                }],
            });
        }
        gpu.queue
            .write_buffer(&self.instance_buf, 0, bytemuck::cast_slice(instances));
        self.instance_count = instances.len() as u32;
    }

    // The uniform and instance buffers are written through the queue, so a
    // Drawable may be drawn at most once per submission.
    fn draw(&self, p: &mut Pass<'_>) {
        let uniforms = Uniforms {
            render_target_size: p.render_target_size,
            quad_size: self.quad_size,
            tint: self.tint,
        };
        p.gpu
            .queue
            .write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(&uniforms));

        p.pass.set_pipeline(&p.gpu.render_pipeline);
        p.pass.set_bind_group(0, &p.gpu.sampler_bg, &[]);
        p.pass.set_bind_group(1, &self.texture_bg, &[]);
        p.pass.set_bind_group(2, &self.uniforms_bg, &[]);
        p.pass.set_bind_group(3, &self.instances_bg, &[]);
        p.pass.draw(0..4, 0..self.instance_count);
    }
}
