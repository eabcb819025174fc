//! Path: native/transdim_render/src/renderer/mod.rs
//! Summary: wgpu によるタイル/プレイヤー/HUD アイコンのインスタンス描画と egui HUD

use std::sync::Arc;

use transdim_core::constants::{BG_B, BG_G, BG_R, SCREEN_WIDTH, TILE_SIZE};
use transdim_core::player::Facing;
use transdim_core::snapshot::{HudData, PlayerSprite, RenderFrame};
use transdim_core::tile::TileCode;
use transdim_core::world::WorldId;
use transdim_core::Phase;
use wgpu::util::DeviceExt;
use winit::window::Window;

mod ui;

// ─── 頂点・インデックス ────────────────────────────────────────

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 2],
}

const VERTICES: &[Vertex] = &[
    Vertex { position: [0.0, 0.0] }, // 左上
    Vertex { position: [1.0, 0.0] }, // 右上
    Vertex { position: [1.0, 1.0] }, // 右下
    Vertex { position: [0.0, 1.0] }, // 左下
];

const INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

// ─── インスタンスデータ ────────────────────────────────────────

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pub position:   [f32; 2], // ワールド座標（左上）
    pub size:       [f32; 2], // ピクセルサイズ
    pub uv_offset:  [f32; 2], // シート UV オフセット（0.0〜1.0）
    pub uv_size:    [f32; 2], // シート UV サイズ（0.0〜1.0）
    pub color_tint: [f32; 4], // RGBA 乗算カラー
}

// ─── タイルシート（1024x3072 px）─────────────────────────────
// プレイヤー（各 150x252、縦に 256 px 間隔）:
//   x =  54 待機 / x = 310 右走り / x = 566 左走り
// 静止スプライト:
//   (768,   0) 256x256 世界 A の壁
//   (768, 256) 256x256 世界 B の壁
//   (768, 512) 128x128 世界 A アイコン / (896, 512) 世界 B アイコン
//   (768, 640) 256x256 転送ブロック
const SHEET_W: f32 = 1024.0;
const SHEET_H: f32 = 3072.0;

const PLAYER_FRAME_W: f32 = 150.0;
const PLAYER_FRAME_H: f32 = 252.0;
const PLAYER_FRAME_STRIDE: f32 = 256.0;
const PLAYER_IDLE_X: f32 = 54.0;
const PLAYER_RIGHT_X: f32 = 310.0;
const PLAYER_LEFT_X: f32 = 566.0;

const TILE_REGION: f32 = 256.0;
const ICON_REGION: f32 = 128.0;

/// HUD の世界アイコン / ブロックアイコンの表示サイズ
const WORLD_ICON_SIZE: f32 = 128.0;
const BLOCK_ICON_SIZE: f32 = 64.0;
const BLOCK_ICON_MARGIN: f32 = 32.0;

const GHOST_ALPHA: f32 = 0.2;
const DECORATIVE_ALPHA: f32 = 0.35;

// マップ全体のタイル + 残像・プレイヤー・HUD アイコン
const MAX_INSTANCES: usize = 65_536;
// インスタンスバッファ先頭の背景 / オーバーレイ用スロット
const LAYER_SLOTS: usize = 2;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

type UvRect = ([f32; 2], [f32; 2]);

fn sheet_uv(x: f32, y: f32, w: f32, h: f32) -> UvRect {
    ([x / SHEET_W, y / SHEET_H], [w / SHEET_W, h / SHEET_H])
}

/// プレイヤーのアニメーション UV
pub fn player_uv(facing: Facing, frame: u8) -> UvRect {
    let x = match facing {
        Facing::Idle  => PLAYER_IDLE_X,
        Facing::Right => PLAYER_RIGHT_X,
        Facing::Left  => PLAYER_LEFT_X,
    };
    sheet_uv(x, PLAYER_FRAME_STRIDE * frame as f32, PLAYER_FRAME_W, PLAYER_FRAME_H)
}

pub fn tile_uv(code: TileCode) -> Option<UvRect> {
    match code {
        TileCode::Empty => None,
        TileCode::SolidA | TileCode::Decorative => Some(sheet_uv(768.0, 0.0, TILE_REGION, TILE_REGION)),
        TileCode::SolidB => Some(sheet_uv(768.0, 256.0, TILE_REGION, TILE_REGION)),
        TileCode::Transferable => Some(sheet_uv(768.0, 640.0, TILE_REGION, TILE_REGION)),
    }
}

pub fn world_icon_uv(world: WorldId) -> UvRect {
    match world {
        WorldId::A => sheet_uv(768.0, 512.0, ICON_REGION, ICON_REGION),
        WorldId::B => sheet_uv(896.0, 512.0, ICON_REGION, ICON_REGION),
    }
}

/// シートが読めなかったときは 1x1 の白テクスチャに色を乗せて描く
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetMode {
    Atlas,
    Flat,
}

impl SheetMode {
    fn uv(self, rect: UvRect) -> UvRect {
        match self {
            Self::Atlas => rect,
            Self::Flat  => ([0.0, 0.0], [1.0, 1.0]),
        }
    }

    fn tile_tint(self, code: TileCode) -> [f32; 4] {
        match (self, code) {
            (Self::Atlas, TileCode::Decorative) => [1.0, 1.0, 1.0, DECORATIVE_ALPHA],
            (Self::Atlas, _) => WHITE,
            (Self::Flat, TileCode::SolidA) => [0.25, 0.45, 0.75, 1.0],
            (Self::Flat, TileCode::SolidB) => [0.55, 0.30, 0.65, 1.0],
            (Self::Flat, TileCode::Transferable) => [0.95, 0.65, 0.15, 1.0],
            (Self::Flat, TileCode::Decorative) => [0.6, 0.6, 0.6, DECORATIVE_ALPHA],
            (Self::Flat, TileCode::Empty) => [0.0; 4],
        }
    }

    fn player_tint(self, alpha: f32) -> [f32; 4] {
        match self {
            Self::Atlas => [1.0, 1.0, 1.0, alpha],
            Self::Flat  => [0.15, 0.15, 0.2, alpha],
        }
    }

    fn world_icon_tint(self, world: WorldId) -> [f32; 4] {
        match (self, world) {
            (Self::Atlas, _) => WHITE,
            (Self::Flat, WorldId::A) => [0.25, 0.45, 0.75, 0.8],
            (Self::Flat, WorldId::B) => [0.55, 0.30, 0.65, 0.8],
        }
    }
}

fn player_instance(mode: SheetMode, p: &PlayerSprite, camera: (f32, f32), alpha: f32) -> SpriteInstance {
    let (uv_offset, uv_size) = mode.uv(player_uv(p.facing, p.frame));
    SpriteInstance {
        // 画面座標なのでカメラ分を足し戻す
        position:   [p.x + camera.0, p.y + camera.1],
        size:       [p.width, p.height],
        uv_offset,
        uv_size,
        color_tint: mode.player_tint(alpha),
    }
}

/// スナップショットから GPU に送るインスタンス列を組み立てる
pub fn build_instances(frame: &RenderFrame, mode: SheetMode) -> Vec<SpriteInstance> {
    let cam = frame.camera_offset;
    let mut instances = Vec::with_capacity(frame.tiles.len() + 4);

    // 1. タイル（ワールド座標）
    for tile in &frame.tiles {
        let Some(rect) = tile_uv(tile.code) else { continue };
        let (uv_offset, uv_size) = mode.uv(rect);
        instances.push(SpriteInstance {
            position:   [tile.x, tile.y],
            size:       [TILE_SIZE, TILE_SIZE],
            uv_offset,
            uv_size,
            color_tint: mode.tile_tint(tile.code),
        });
        if instances.len() >= MAX_INSTANCES - 4 {
            log::warn!("instance buffer full, dropping remaining tiles");
            break;
        }
    }

    // 2. 残像 → プレイヤー
    if let Some(ghost) = &frame.ghost {
        instances.push(player_instance(mode, ghost, cam, GHOST_ALPHA));
    }
    if let Some(player) = &frame.player {
        instances.push(player_instance(mode, player, cam, 1.0));
    }

    // 3. HUD アイコン
    let hud = &frame.hud;
    if hud.phase == Phase::Playing && hud.show_hud {
        let (uv_offset, uv_size) = mode.uv(world_icon_uv(hud.world));
        instances.push(SpriteInstance {
            position:   [SCREEN_WIDTH - WORLD_ICON_SIZE - 4.0 + cam.0, cam.1],
            size:       [WORLD_ICON_SIZE, WORLD_ICON_SIZE],
            uv_offset,
            uv_size,
            color_tint: mode.world_icon_tint(hud.world),
        });
    }
    if hud.phase == Phase::Playing && hud.carrying && hud.world == WorldId::B {
        if let Some(rect) = tile_uv(TileCode::Transferable) {
            let (uv_offset, uv_size) = mode.uv(rect);
            instances.push(SpriteInstance {
                position:   [BLOCK_ICON_MARGIN + cam.0, BLOCK_ICON_MARGIN + cam.1],
                size:       [BLOCK_ICON_SIZE, BLOCK_ICON_SIZE],
                uv_offset,
                uv_size,
                color_tint: mode.tile_tint(TileCode::Transferable),
            });
        }
    }

    instances
}

// ─── 画面サイズ Uniform ────────────────────────────────────────

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ScreenUniform {
    half_size: [f32; 2],
    _pad: [f32; 2],
}

impl ScreenUniform {
    fn new(width: u32, height: u32) -> Self {
        Self {
            half_size: [width as f32 / 2.0, height as f32 / 2.0],
            _pad: [0.0; 2],
        }
    }
}

// ─── カメラ Uniform（アクティブプレイヤーのビュー）─────────

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    offset: [f32; 2],
    _pad:   [f32; 2],
}

impl CameraUniform {
    fn new(offset_x: f32, offset_y: f32) -> Self {
        Self { offset: [offset_x, offset_y], _pad: [0.0; 2] }
    }
}

/// 起動時に渡す画像（PNG バイト列）。どれも省略可
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneImages<'a> {
    pub tilesheet:  Option<&'a [u8]>,
    /// レベルの下に敷く画面サイズの画像
    pub background: Option<&'a [u8]>,
    /// プレイヤーの上、フェードの下に重ねる画像
    pub overlay:    Option<&'a [u8]>,
}

/// 画面左上に原寸で貼る 1 枚絵
fn layer_instance(image_size: [f32; 2], camera: (f32, f32)) -> SpriteInstance {
    SpriteInstance {
        position:   [camera.0, camera.1],
        size:       image_size,
        uv_offset:  [0.0, 0.0],
        uv_size:    [1.0, 1.0],
        color_tint: WHITE,
    }
}

/// 背景・オーバーレイ画像。無い場合やデコード失敗時は描かない
fn decode_layer(bytes: Option<&[u8]>, name: &str) -> Option<image::RgbaImage> {
    match image::load_from_memory(bytes?) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            log::warn!("{name} decode failed, skipping layer: {e}");
            None
        }
    }
}

/// デコード済みの RGBA 画像。失敗時は 1x1 白
fn decode_sheet(bytes: Option<&[u8]>) -> (image::RgbaImage, SheetMode) {
    let decoded = bytes.map(|b| image::load_from_memory(b).map(|img| img.to_rgba8()));
    match decoded {
        Some(Ok(img)) => (img, SheetMode::Atlas),
        Some(Err(e)) => {
            log::warn!("tilesheet decode failed, using flat colours: {e}");
            (image::RgbaImage::from_pixel(1, 1, image::Rgba([255; 4])), SheetMode::Flat)
        }
        None => (image::RgbaImage::from_pixel(1, 1, image::Rgba([255; 4])), SheetMode::Flat),
    }
}

/// GPU に載せた 1 枚絵
struct ScreenLayer {
    bind_group: wgpu::BindGroup,
    size:       [f32; 2],
}

/// RGBA 画像をテクスチャにして group(0) のバインドグループを作る
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &image::RgbaImage,
    label: &str,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width:                 image.width(),
        height:                image.height(),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label:           Some(label),
        size,
        mip_level_count: 1,
        sample_count:    1,
        dimension:       wgpu::TextureDimension::D2,
        format:          wgpu::TextureFormat::Rgba8UnormSrgb,
        usage:           wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats:    &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture:   &texture,
            mip_level: 0,
            origin:    wgpu::Origin3d::ZERO,
            aspect:    wgpu::TextureAspect::All,
        },
        image,
        wgpu::TexelCopyBufferLayout {
            offset:         0,
            bytes_per_row:  Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        size,
    );
    let view = texture.create_view(&Default::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label:   Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding:  0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding:  1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

// ─── Renderer ─────────────────────────────────────────────────

pub struct Renderer {
    surface:              wgpu::Surface<'static>,
    device:               wgpu::Device,
    queue:                wgpu::Queue,
    config:               wgpu::SurfaceConfiguration,
    render_pipeline:      wgpu::RenderPipeline,
    vertex_buffer:        wgpu::Buffer,
    index_buffer:         wgpu::Buffer,
    instance_buffer:      wgpu::Buffer,
    instance_count:       u32,
    sheet_mode:           SheetMode,
    bind_group:           wgpu::BindGroup,
    background:           Option<ScreenLayer>,
    overlay:              Option<ScreenLayer>,
    layers_visible:       bool,
    screen_uniform_buf:   wgpu::Buffer,
    screen_bind_group:    wgpu::BindGroup,
    camera_uniform_buf:   wgpu::Buffer,
    camera_bind_group:    wgpu::BindGroup,
    // egui
    egui_ctx:             egui::Context,
    egui_renderer:        egui_wgpu::Renderer,
    egui_winit:           egui_winit::State,
    // FPS 計測
    frame_count:          u32,
    fps_timer:            std::time::Instant,
    pub current_fps:      f32,
}

impl Renderer {
    /// タイルシートが None またはデコード失敗なら単色描画になる
    pub async fn new(window: Arc<Window>, images: SceneImages<'_>) -> Self {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .expect("サーフェスの作成に失敗しました");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference:   wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .expect("アダプターの取得に失敗しました");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .expect("デバイスとキューの取得に失敗しました");

        let size = window.inner_size();
        let config = surface
            .get_default_config(&adapter, size.width, size.height)
            .expect("サーフェス設定の取得に失敗しました");
        surface.configure(&device, &config);

        // ─── タイルシート ────────────────────────────────────────
        let (sheet_image, sheet_mode) = decode_sheet(images.tilesheet);
        log::info!(
            "tilesheet {}x{} ({:?})",
            sheet_image.width(),
            sheet_image.height(),
            sheet_mode
        );
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label:          Some("Tilesheet Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter:     wgpu::FilterMode::Linear,
            min_filter:     wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // ─── group(0): テクスチャ ────────────────────────────────
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label:   Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding:    0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty:         wgpu::BindingType::Texture {
                            multisampled:   false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type:    wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding:    1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty:         wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count:      None,
                    },
                ],
            });

        let bind_group = upload_texture(
            &device,
            &queue,
            &texture_bind_group_layout,
            &sampler,
            &sheet_image,
            "Tilesheet Texture",
        );
        let load_layer = |bytes: Option<&[u8]>, name: &str| {
            decode_layer(bytes, name).map(|img| ScreenLayer {
                bind_group: upload_texture(&device, &queue, &texture_bind_group_layout, &sampler, &img, name),
                size:       [img.width() as f32, img.height() as f32],
            })
        };
        let background = load_layer(images.background, "Background Texture");
        let overlay = load_layer(images.overlay, "Overlay Texture");

        // ─── group(1) 画面サイズ / group(2) カメラ ──────────────
        let uniform_layout = |label: &'static str| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label:   Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding:    0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty:         wgpu::BindingType::Buffer {
                        ty:                 wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size:   None,
                    },
                    count: None,
                }],
            })
        };
        let screen_bind_group_layout = uniform_layout("Screen Bind Group Layout");
        let camera_bind_group_layout = uniform_layout("Camera Bind Group Layout");

        let screen_uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Screen Uniform Buffer"),
            contents: bytemuck::bytes_of(&ScreenUniform::new(size.width, size.height)),
            usage:    wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Screen Bind Group"),
            layout:  &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: screen_uniform_buf.as_entire_binding(),
            }],
        });

        let camera_uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Camera Uniform Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::new(0.0, 0.0)),
            usage:    wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Camera Bind Group"),
            layout:  &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: camera_uniform_buf.as_entire_binding(),
            }],
        });

        // ─── シェーダー・パイプライン ────────────────────────────
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Sprite Pipeline Layout"),
            bind_group_layouts:   &[&texture_bind_group_layout, &screen_bind_group_layout, &camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label:  Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module:      &shader,
                entry_point: Some("vs_main"),
                buffers:     &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode:    wgpu::VertexStepMode::Vertex,
                        attributes:   &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
                        step_mode:    wgpu::VertexStepMode::Instance,
                        attributes:   &wgpu::vertex_attr_array![
                            1 => Float32x2, // i_position
                            2 => Float32x2, // i_size
                            3 => Float32x2, // i_uv_offset
                            4 => Float32x2, // i_uv_size
                            5 => Float32x4, // i_color_tint
                        ],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module:      &shader,
                entry_point: Some("fs_main"),
                targets:     &[Some(wgpu::ColorTargetState {
                    format:     config.format,
                    blend:      Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology:  wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample:   wgpu::MultisampleState::default(),
            multiview:     None,
            cache:         None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(VERTICES),
            usage:    wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Index Buffer"),
            contents: bytemuck::cast_slice(INDICES),
            usage:    wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("Instance Buffer"),
            size:               (std::mem::size_of::<SpriteInstance>() * (LAYER_SLOTS + MAX_INSTANCES)) as u64,
            usage:              wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // ─── egui ────────────────────────────────────────────────
        let egui_ctx = egui::Context::default();
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1, false);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            instance_count: 0,
            sheet_mode,
            bind_group,
            background,
            overlay,
            layers_visible: false,
            screen_uniform_buf,
            screen_bind_group,
            camera_uniform_buf,
            camera_bind_group,
            egui_ctx,
            egui_renderer,
            egui_winit,
            frame_count: 0,
            fps_timer: std::time::Instant::now(),
            current_fps: 0.0,
        }
    }

    /// winit のウィンドウイベントを egui に転送する
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit.on_window_event(window, event).consumed
    }

    /// スナップショットからカメラとインスタンスバッファを更新する
    pub fn update_instances(&mut self, frame: &RenderFrame) {
        let (cx, cy) = frame.camera_offset;
        self.queue.write_buffer(&self.camera_uniform_buf, 0, bytemuck::bytes_of(&CameraUniform::new(cx, cy)));

        // 先頭 2 スロットは背景 / オーバーレイ、その後ろにシートのスプライト
        let layer_size = |layer: &Option<ScreenLayer>| layer.as_ref().map_or([0.0; 2], |l| l.size);
        let mut instances = vec![
            layer_instance(layer_size(&self.background), frame.camera_offset),
            layer_instance(layer_size(&self.overlay), frame.camera_offset),
        ];
        let mut sprites = build_instances(frame, self.sheet_mode);
        sprites.truncate(MAX_INSTANCES);
        self.instance_count = sprites.len() as u32;
        self.layers_visible = frame.hud.phase == Phase::Playing;
        instances.extend(sprites);
        self.queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            return;
        }
        self.config.width  = new_width;
        self.config.height = new_height;
        self.surface.configure(&self.device, &self.config);
        self.queue.write_buffer(
            &self.screen_uniform_buf,
            0,
            bytemuck::bytes_of(&ScreenUniform::new(new_width, new_height)),
        );
    }

    pub fn render(&mut self, window: &Window, hud: &HudData) {
        self.frame_count += 1;
        let elapsed = self.fps_timer.elapsed();
        if elapsed.as_secs_f32() >= 1.0 {
            self.current_fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_count = 0;
            self.fps_timer   = std::time::Instant::now();
        }

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::warn!("surface error: {e:?}");
                return;
            }
        };

        let view = output.texture.create_view(&Default::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        // ─── スプライト描画パス ──────────────────────────────────
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view:           &view,
                    resolve_target: None,
                    ops:            wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(wgpu::Color { r: BG_R, g: BG_G, b: BG_B, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
            });

            pass.set_pipeline(&self.render_pipeline);
            pass.set_bind_group(1, &self.screen_bind_group, &[]);
            pass.set_bind_group(2, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            let index_count = INDICES.len() as u32;
            let layers = if self.layers_visible {
                (self.background.as_ref(), self.overlay.as_ref())
            } else {
                (None, None)
            };
            if let Some(background) = layers.0 {
                pass.set_bind_group(0, &background.bind_group, &[]);
                pass.draw_indexed(0..index_count, 0, 0..1);
            }
            if self.instance_count > 0 {
                let first = LAYER_SLOTS as u32;
                pass.set_bind_group(0, &self.bind_group, &[]);
                pass.draw_indexed(0..index_count, 0, first..first + self.instance_count);
            }
            if let Some(overlay) = layers.1 {
                pass.set_bind_group(0, &overlay.bind_group, &[]);
                pass.draw_indexed(0..index_count, 0, 1..2);
            }
        }

        // ─── egui HUD パス（フェードもここで重ねる）─────────────
        let raw_input = self.egui_winit.take_egui_input(window);
        let fps = self.current_fps;
        let full_output = self.egui_ctx.run(raw_input, |ctx| ui::build_hud_ui(ctx, hud, fps));

        self.egui_winit.handle_platform_output(window, full_output.platform_output);
        let tris = self.egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, delta) in full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, id, &delta);
        }

        let screen_desc = egui_wgpu::ScreenDescriptor {
            size_in_pixels:   [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        self.egui_renderer.update_buffers(&self.device, &self.queue, &mut encoder, &tris, &screen_desc);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view:           &view,
                    resolve_target: None,
                    ops:            wgpu::Operations {
                        load:  wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
            });
            self.egui_renderer.render(&mut render_pass.forget_lifetime(), &tris, &screen_desc);
        }

        for id in full_output.textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }

        self.queue.submit([encoder.finish()]);
        output.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transdim_core::snapshot::TileSprite;

    fn sprite(x: f32, y: f32) -> PlayerSprite {
        PlayerSprite { x, y, width: 37.0, height: 64.0, facing: Facing::Idle, frame: 0 }
    }

    fn playing_frame() -> RenderFrame {
        RenderFrame {
            tiles: vec![
                TileSprite { x: 0.0, y: 128.0, code: TileCode::SolidA },
                TileSprite { x: 64.0, y: 128.0, code: TileCode::Transferable },
            ],
            player: Some(sprite(100.0, 64.0)),
            ghost: None,
            camera_offset: (320.0, 0.0),
            hud: HudData { phase: Phase::Playing, ..HudData::default() },
        }
    }

    #[test]
    fn player_uv_walks_down_the_sheet() {
        let (off0, size) = player_uv(Facing::Right, 0);
        let (off3, _) = player_uv(Facing::Right, 3);
        assert_eq!(off0[0], PLAYER_RIGHT_X / SHEET_W);
        assert_eq!(off3[1] - off0[1], 3.0 * PLAYER_FRAME_STRIDE / SHEET_H);
        assert_eq!(size, [PLAYER_FRAME_W / SHEET_W, PLAYER_FRAME_H / SHEET_H]);
        // 最終フレームもシート内に収まる
        let (last, size) = player_uv(Facing::Idle, 11);
        assert!(last[1] + size[1] <= 1.0);
    }

    #[test]
    fn empty_tiles_have_no_uv() {
        assert!(tile_uv(TileCode::Empty).is_none());
        assert_eq!(tile_uv(TileCode::Decorative), tile_uv(TileCode::SolidA));
    }

    #[test]
    fn player_is_shifted_back_into_world_space() {
        let instances = build_instances(&playing_frame(), SheetMode::Atlas);
        assert_eq!(instances.len(), 3);
        let player = instances[2];
        assert_eq!(player.position, [420.0, 64.0]);
        assert_eq!(player.size, [37.0, 64.0]);
        assert_eq!(instances[0].position, [0.0, 128.0]);
    }

    #[test]
    fn ghost_is_translucent_and_drawn_before_player() {
        let mut frame = playing_frame();
        frame.ghost = Some(sprite(10.0, 64.0));
        let instances = build_instances(&frame, SheetMode::Atlas);
        assert_eq!(instances[2].color_tint[3], GHOST_ALPHA);
        assert_eq!(instances[3].color_tint[3], 1.0);
    }

    #[test]
    fn hud_icons_follow_flags() {
        let mut frame = playing_frame();
        frame.hud.show_hud = true;
        frame.hud.world = WorldId::B;
        frame.hud.carrying = true;
        let instances = build_instances(&frame, SheetMode::Atlas);
        assert_eq!(instances.len(), 5);
        assert_eq!(instances[3].size, [WORLD_ICON_SIZE, WORLD_ICON_SIZE]);
        assert_eq!(instances[3].uv_offset, world_icon_uv(WorldId::B).0);
        assert_eq!(instances[4].position, [BLOCK_ICON_MARGIN + 320.0, BLOCK_ICON_MARGIN]);

        frame.hud.world = WorldId::A;
        assert_eq!(build_instances(&frame, SheetMode::Atlas).len(), 4);
    }

    #[test]
    fn flat_mode_uses_whole_texture_and_tints() {
        let instances = build_instances(&playing_frame(), SheetMode::Flat);
        assert_eq!(instances[0].uv_offset, [0.0, 0.0]);
        assert_eq!(instances[0].uv_size, [1.0, 1.0]);
        assert_ne!(instances[0].color_tint, instances[1].color_tint);
    }

    #[test]
    fn loading_frame_draws_nothing() {
        assert!(build_instances(&RenderFrame::default(), SheetMode::Atlas).is_empty());
    }

    #[test]
    fn layer_is_pinned_to_screen_origin() {
        let inst = layer_instance([960.0, 640.0], (320.0, 0.0));
        assert_eq!(inst.position, [320.0, 0.0]);
        assert_eq!(inst.size, [960.0, 640.0]);
        assert_eq!((inst.uv_offset, inst.uv_size), ([0.0, 0.0], [1.0, 1.0]));
    }

    #[test]
    fn missing_or_broken_layers_are_skipped() {
        assert!(decode_layer(None, "background").is_none());
        assert!(decode_layer(Some(&b"not a png"[..]), "overlay").is_none());

        let mut png = Vec::new();
        image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let layer = decode_layer(Some(&png), "background").unwrap();
        assert_eq!((layer.width(), layer.height()), (4, 2));
    }

    #[test]
    fn missing_sheet_falls_back_to_flat() {
        let (img, mode) = decode_sheet(None);
        assert_eq!((img.width(), img.height(), mode), (1, 1, SheetMode::Flat));
        let (_, mode) = decode_sheet(Some(&b"not a png"[..]));
        assert_eq!(mode, SheetMode::Flat);
    }
}
