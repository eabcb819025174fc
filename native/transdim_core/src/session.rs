//! Path: native/transdim_core/src/session.rs
//! Summary: ゲームセッション（両世界・プレイヤー・フェード・ブロック運搬・HUD を 1 つに束ね、1 tick ずつ進める）

use crate::constants::{BLOCK_PICKUP_PROMPT, TILE_SIZE};
use crate::controller::step_player;
use crate::event::FrameEvent;
use crate::input::{Actions, FrameInput};
use crate::level::{LevelDocument, LevelError};
use crate::physics::aabb::{boxes_touch, Aabb};
use crate::player::{PlayerAnimation, PlayerParams, PlayerSlots, PlayerState};
use crate::tile::{Tile, TileCache, TileCode};
use crate::transfer::{try_pickup, try_place, PlaceDirection, PlacementNotice};
use crate::transition::{Fade, WorldTransition};
use crate::world::{WorldId, WorldPair, WorldState};

/// セッションの進行段階
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    /// 両方の世界のレベルが揃うまで待機
    #[default]
    Loading,
    Playing,
    /// 次レベルのトリガーに触れた。新しいレベルが届くまで停止
    LevelComplete,
    /// 最終レベルをクリアした
    Completed,
}

/// 読み込み済みのレベル（両世界とプレイヤー）
#[derive(Clone, Debug)]
struct ActiveLevel {
    worlds:  WorldPair,
    players: PlayerSlots,
}

/// シミュレーション全体の状態
pub struct GameSession {
    pub frame_id:  u32,
    phase:         Phase,
    params:        PlayerParams,
    /// 読み込み途中の世界（両方揃った時点で `level` へ移る）
    pending:       [Option<WorldState>; 2],
    level:         Option<ActiveLevel>,
    transition:    WorldTransition,
    carrying:      bool,
    notice:        PlacementNotice,
    show_hud:      bool,
    hint:          Option<String>,
    animation:     PlayerAnimation,
    tile_cache:    TileCache,
    /// この tick で発生したイベント（毎フレーム drain される）
    frame_events:  Vec<FrameEvent>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_params(PlayerParams::default())
    }

    pub fn with_params(params: PlayerParams) -> Self {
        Self {
            frame_id:     0,
            phase:        Phase::Loading,
            params,
            pending:      [None, None],
            level:        None,
            transition:   WorldTransition::default(),
            carrying:     false,
            notice:       PlacementNotice::default(),
            show_hud:     false,
            hint:         None,
            animation:    PlayerAnimation::default(),
            tile_cache:   TileCache::new(),
            frame_events: Vec::new(),
        }
    }

    /// フェード定数を差し替える
    pub fn with_fade(mut self, fade: Fade) -> Self {
        self.transition = WorldTransition::new(fade);
        self
    }

    // ── レベル読み込み ────────────────────────────────────────

    /// 片方の世界のレベルを受け取る。順不同で、両方揃った時点でゲームを開始する。
    ///
    /// 2 つの世界の組み合わせが不正な場合は受け取り済みの世界も破棄し、`Loading` のまま。
    pub fn submit_level(&mut self, world: WorldId, doc: LevelDocument) -> Result<(), LevelError> {
        let state = doc.into_world()?;
        self.pending[world.index()] = Some(state);

        if self.pending.iter().all(Option::is_some) {
            if let [Some(a), Some(b)] = std::mem::take(&mut self.pending) {
                self.install(WorldPair::new(a, b)?);
            }
        }
        Ok(())
    }

    /// 検証済みの世界ペアを直接読み込んで開始する
    pub fn install(&mut self, worlds: WorldPair) {
        let players = PlayerSlots::new(
            worlds.get(WorldId::A).spawn,
            worlds.get(WorldId::B).spawn,
            self.params,
        );
        log::info!(
            "levels installed: {}x{} tiles, transferable block at {:?}",
            worlds.grid(WorldId::A).cols(),
            worlds.grid(WorldId::A).rows(),
            worlds.transferable_cells().first(),
        );
        self.level = Some(ActiveLevel { worlds, players });
        self.phase = Phase::Playing;
        self.transition.reset();
        self.carrying = false;
        self.notice.clear();
        self.hint = None;
        self.tile_cache.invalidate();
        self.frame_events.push(FrameEvent::LevelsReady);
    }

    /// 次のレベルを待つ状態に戻す（HUD 表示は引き継ぐ）
    pub fn reset_for_next_level(&mut self) {
        self.level = None;
        self.pending = [None, None];
        self.phase = Phase::Loading;
        self.carrying = false;
        self.hint = None;
        self.notice.clear();
        self.tile_cache.invalidate();
    }

    // ── tick ─────────────────────────────────────────────────

    /// 1 tick 進める。タイマーは `dt` 秒、物理は 1 tick 単位
    pub fn step(&mut self, input: &FrameInput, dt: f32) {
        log::trace!("session step: frame_id={} dt={}s phase={:?}", self.frame_id, dt, self.phase);
        self.frame_id = self.frame_id.wrapping_add(1);
        self.notice.tick(dt);

        if self.phase != Phase::Playing {
            return;
        }
        let Some(level) = self.level.as_mut() else {
            return;
        };

        // ── 世界切り替え ──────────────────────────────────────
        if input.pressed.contains(Actions::TOGGLE_WORLD) && self.transition.request_toggle() {
            self.show_hud = true;
            self.frame_events.push(FrameEvent::FadeStarted);
        }
        if let Some(to) = self.transition.tick(&mut level.players) {
            log::debug!("world switched to {:?} (carrying={})", to, self.carrying);
            self.frame_events.push(FrameEvent::WorldSwitched { to });
        }

        let current = level.players.current();
        self.tile_cache.refresh(level.worlds.grid(current));
        self.animation.tick(
            input.held.contains(Actions::MOVE_LEFT),
            input.held.contains(Actions::MOVE_RIGHT),
        );

        // フェード中はゲームプレイ入力をすべて無視
        if self.transition.is_fading() {
            return;
        }

        // ── プレイヤー ────────────────────────────────────────
        let map_width = level.worlds.grid(current).pixel_width();
        let map_height = level.worlds.grid(current).pixel_height();
        step_player(
            level.players.active_mut(),
            input.move_intent(),
            self.tile_cache.tiles(),
            current == WorldId::B,
            map_width,
        );

        let player = level.players.active();
        if player.view.y + player.position.y > map_height {
            let spawn = level.worlds.get(current).spawn;
            level.players.active_mut().respawn(spawn);
            log::debug!("player fell out of world {:?}, respawned at {:?}", current, spawn);
            self.frame_events.push(FrameEvent::Respawned);
        }

        // ── ブロック拾い上げ（世界 B のみ）──────────────────────
        if current == WorldId::B && !self.carrying && input.pressed.contains(Actions::PICKUP) {
            if let Some((row, col)) =
                try_pickup(&mut level.worlds, level.players.active(), self.tile_cache.tiles())
            {
                log::debug!("picked up transferable block at ({row}, {col})");
                self.carrying = true;
                self.tile_cache.refresh(level.worlds.grid(current));
                self.frame_events.push(FrameEvent::BlockPickedUp);
            }
        }

        // ── ブロック設置（世界 B で運搬中のみ）──────────────────
        if current == WorldId::B && self.carrying {
            for (action, direction) in [
                (Actions::PLACE_LEFT, PlaceDirection::Left),
                (Actions::PLACE_RIGHT, PlaceDirection::Right),
            ] {
                if !self.carrying || !input.pressed.contains(action) {
                    continue;
                }
                let placed = try_place(
                    &mut level.worlds,
                    level.players.active(),
                    level.players.player_in(WorldId::A),
                    direction,
                );
                match placed {
                    Ok((row, col)) => {
                        log::debug!("placed transferable block at ({row}, {col})");
                        self.carrying = false;
                        self.tile_cache.refresh(level.worlds.grid(current));
                        self.frame_events.push(FrameEvent::BlockPlaced { row, col });
                    }
                    Err(reason) => {
                        log::warn!("block placement rejected: {:?}", reason);
                        if let Some(message) = reason.message() {
                            self.notice.show(message);
                        }
                        self.frame_events.push(FrameEvent::PlacementRejected { reason });
                    }
                }
            }
        }

        // ── 案内タイル・ヒント ────────────────────────────────
        let body = level.players.active().world_bounds();
        let world = level.worlds.get(current);
        self.hint = None;
        for marker in &world.markers {
            if boxes_touch(&body, &marker.bounds()) {
                self.hint = Some(marker.text.clone());
                if marker.activate_hud && !self.show_hud {
                    self.show_hud = true;
                    self.frame_events.push(FrameEvent::HudActivated);
                }
            }
        }
        if current == WorldId::B
            && !self.carrying
            && self.tile_cache.tiles().iter().any(|t| {
                t.code == TileCode::Transferable && boxes_touch(&body, &Aabb::square(t.position, TILE_SIZE))
            })
        {
            self.hint = Some(BLOCK_PICKUP_PROMPT.to_string());
        }

        // ── 次レベル ──────────────────────────────────────────
        if let Some(trigger) = &world.next_level {
            if boxes_touch(&body, &trigger.bounds()) {
                if trigger.last_level {
                    log::info!("final level completed");
                    self.phase = Phase::Completed;
                    self.frame_events.push(FrameEvent::GameCompleted);
                } else {
                    log::info!(
                        "reached next level trigger: {} / {}",
                        trigger.target_grid_a,
                        trigger.target_grid_b
                    );
                    self.phase = Phase::LevelComplete;
                    self.frame_events.push(FrameEvent::ReachedNextLevel {
                        target_a: trigger.target_grid_a.clone(),
                        target_b: trigger.target_grid_b.clone(),
                    });
                }
            }
        }
    }

    /// このフレームのイベントを取り出す
    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.frame_events)
    }

    // ── 読み取り専用アクセサ（描画・オーディオ用）──────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 両方の世界が揃っているか
    pub fn is_ready(&self) -> bool {
        self.level.is_some()
    }

    pub fn current_world(&self) -> WorldId {
        self.level.as_ref().map_or(WorldId::A, |l| l.players.current())
    }

    pub fn active_player(&self) -> Option<&PlayerState> {
        self.level.as_ref().map(|l| l.players.active())
    }

    pub fn player_in(&self, world: WorldId) -> Option<&PlayerState> {
        self.level.as_ref().map(|l| l.players.player_in(world))
    }

    pub fn worlds(&self) -> Option<&WorldPair> {
        self.level.as_ref().map(|l| &l.worlds)
    }

    /// アクティブ世界の派生タイルリスト（最後に更新された tick 時点）
    pub fn tiles(&self) -> &[Tile] {
        self.tile_cache.tiles()
    }

    pub fn fade(&self) -> &Fade {
        self.transition.fade()
    }

    pub fn is_fading(&self) -> bool {
        self.transition.is_fading()
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying
    }

    pub fn show_hud(&self) -> bool {
        self.show_hud
    }

    pub fn notice(&self) -> &PlacementNotice {
        &self.notice
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn animation(&self) -> &PlayerAnimation {
        &self.animation
    }
}
