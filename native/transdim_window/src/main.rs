//! Path: native/transdim_window/src/main.rs
//! Summary: スタンドアロンのウィンドウ・入力・固定刻みループ（winit/wgpu）、transdim バイナリ

mod asset;
mod audio;
mod config;
mod input_map;
mod levels;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use asset::AssetLoader;
use audio::{start_audio_thread, AudioCommand, AudioCommandSender};
use config::Cli;
use levels::LevelLoader;
use transdim_core::constants::{FRAME_DT, SCREEN_HEIGHT, SCREEN_WIDTH};
use transdim_core::{build_render_frame, FrameEvent, GameSession, InputTracker};
use transdim_render::{Renderer, SceneImages};

/// 1 フレームで追いつく最大 tick 数
const MAX_STEPS_PER_FRAME: u32 = 5;
/// これ以上の経過時間は切り捨てる（ウィンドウ移動中など）
const MAX_FRAME_TIME: f32 = 0.25;

/// 経過時間を貯めて固定刻みの tick 数に変換する
#[derive(Debug, Default)]
struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    /// この描画フレームで進める tick 数
    fn advance(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_TIME);
        let mut steps = 0;
        while self.accumulator >= FRAME_DT && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= FRAME_DT;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            // 追いつけない分は捨てる
            self.accumulator = self.accumulator.min(FRAME_DT);
        }
        steps
    }
}

struct App {
    cli:         Cli,
    assets:      AssetLoader,
    window:      Option<Arc<Window>>,
    renderer:    Option<Renderer>,
    session:     GameSession,
    input:       InputTracker,
    levels:      LevelLoader,
    audio:       Option<AudioCommandSender>,
    clock:       FixedStep,
    last_update: Option<Instant>,
}

impl App {
    fn new(cli: Cli) -> Result<Self, String> {
        let assets = AssetLoader::new(cli.assets.clone());
        let levels = LevelLoader::spawn(cli.levels.clone())?;
        let (first_a, first_b) = cli.first_pair();
        levels.request_pair(&first_a, &first_b);

        let audio = if cli.mute {
            log::info!("audio muted");
            None
        } else {
            Some(start_audio_thread(assets.clone()))
        };

        Ok(Self {
            cli,
            assets,
            window: None,
            renderer: None,
            session: GameSession::new(),
            input: InputTracker::new(),
            levels,
            audio,
            clock: FixedStep::default(),
            last_update: None,
        })
    }

    /// 読み込み済みのレベルをセッションへ渡す
    fn receive_levels(&mut self) {
        for reply in self.levels.poll() {
            let result = reply
                .result
                .and_then(|doc| self.session.submit_level(reply.world, doc));
            match result {
                Ok(()) => log::debug!("level {} accepted for world {}", reply.name, reply.world.number()),
                Err(e) => log::error!("level {} ({:?}) rejected: {e}", reply.name, self.cli.levels),
            }
        }
    }

    fn handle_events(&mut self) {
        for event in self.session.drain_events() {
            if let (Some(audio), Some(command)) = (&self.audio, AudioCommand::for_event(&event)) {
                audio.send(command);
            }
            match event {
                FrameEvent::FadeStarted => self.input.clear_held(),
                FrameEvent::ReachedNextLevel { target_a, target_b } => {
                    log::info!("next level: {target_a} / {target_b}");
                    self.session.reset_for_next_level();
                    self.levels.request_pair(&target_a, &target_b);
                }
                FrameEvent::GameCompleted => log::info!("all levels completed"),
                _ => {}
            }
        }
    }

    fn on_key(&mut self, code: KeyCode, state: ElementState, event_loop: &ActiveEventLoop) {
        if code == KeyCode::Escape && state == ElementState::Pressed {
            event_loop.exit();
            return;
        }
        let Some(action) = input_map::action_for_key(code) else { return };
        match state {
            ElementState::Pressed  => self.input.press(action),
            ElementState::Released => self.input.release(action),
        }
    }

    fn tick(&mut self) {
        self.receive_levels();

        let now = Instant::now();
        let elapsed = self.last_update.map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_update = Some(now);

        for _ in 0..self.clock.advance(elapsed) {
            let input = self.input.sample();
            self.session.step(&input, FRAME_DT);
            self.handle_events();
        }
    }

    fn draw(&mut self) {
        let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.as_ref()) else {
            return;
        };
        let frame = build_render_frame(&self.session);
        renderer.update_instances(&frame);
        renderer.render(window, &frame.hud);
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("transdim")
                        .with_resizable(false)
                        .with_inner_size(winit::dpi::LogicalSize::new(
                            SCREEN_WIDTH as u32,
                            SCREEN_HEIGHT as u32,
                        )),
                )
                .expect("ウィンドウの作成に失敗しました"),
        );

        let bytes = self.assets.load_images();
        let images = SceneImages {
            tilesheet:  bytes.tilesheet.as_deref(),
            background: bytes.background.as_deref(),
            overlay:    bytes.overlay.as_deref(),
        };
        let renderer = pollster::block_on(Renderer::new(window.clone(), images));

        self.window      = Some(window);
        self.renderer    = Some(renderer);
        self.last_update = Some(Instant::now());
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        // egui にイベントを転送（消費された場合はゲームへ渡さない）
        if let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.as_ref()) {
            if renderer.handle_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }

            WindowEvent::Focused(false) => self.input.clear_held(),

            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, repeat: false, .. },
                ..
            } => self.on_key(code, state, event_loop),

            WindowEvent::RedrawRequested => {
                self.tick();
                self.draw();
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(audio) = &self.audio {
            audio.shutdown();
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let event_loop = EventLoop::new().map_err(|e| format!("event loop: {e}"))?;
    let mut app = App::new(cli)?;
    event_loop.run_app(&mut app).map_err(|e| format!("event loop: {e}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env().init();
    let cli = Cli::parse();
    log::info!("levels from {}, starting at {}", cli.levels.display(), cli.level);
    run(cli)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_accumulates_partial_frames() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(FRAME_DT * 0.5), 0);
        assert_eq!(clock.advance(FRAME_DT * 0.6), 1);
        assert_eq!(clock.advance(FRAME_DT * 2.0), 2);
    }

    #[test]
    fn fixed_step_caps_catch_up() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(10.0), MAX_STEPS_PER_FRAME);
        assert!(clock.accumulator <= FRAME_DT);
        assert_eq!(FixedStep::default().advance(-1.0), 0);
    }
}
