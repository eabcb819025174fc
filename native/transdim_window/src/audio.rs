//! Path: native/transdim_window/src/audio.rs
//! Summary: BGM・SE 管理（rodio）+ コマンド駆動オーディオスレッド
//!
//! 音声データは [AssetLoader](crate::asset::AssetLoader) 経由で取得する。
//! 出力デバイスやファイルが無い場合は warn を出して無音で続行する。

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use transdim_core::FrameEvent;

use crate::asset::{AssetId, AssetLoader};

pub struct AudioManager {
    stream:   OutputStream,
    bgm_sink: Sink,
}

impl AudioManager {
    pub fn new() -> Option<Self> {
        let stream = OutputStreamBuilder::open_default_stream().ok()?;
        let bgm_sink = Sink::connect_new(stream.mixer());
        Some(Self { stream, bgm_sink })
    }

    /// 終端に達したら先頭から繰り返す
    pub fn play_bgm(&self, bytes: Vec<u8>) {
        if !self.bgm_sink.empty() {
            return;
        }
        match Decoder::new(std::io::Cursor::new(bytes)) {
            Ok(source) => self.bgm_sink.append(source.buffered().repeat_infinite()),
            Err(e) => log::warn!("bgm decode failed: {e}"),
        }
    }

    pub fn play_se(&self, bytes: Vec<u8>, volume: f32) {
        match Decoder::new(std::io::Cursor::new(bytes)) {
            Ok(source) => {
                let sink = Sink::connect_new(self.stream.mixer());
                sink.set_volume(volume.clamp(0.0, 1.0));
                sink.append(source);
                sink.detach();
            }
            Err(e) => log::warn!("sound effect decode failed: {e}"),
        }
    }
}

/// Audio スレッドに送るコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    PlayBgm,
    PlaySe(AssetId, f32),
    Shutdown,
}

impl AudioCommand {
    /// ゲームイベントに対応する効果音
    pub fn for_event(event: &FrameEvent) -> Option<Self> {
        match event {
            FrameEvent::WorldSwitched { .. } => Some(Self::PlaySe(AssetId::SwitchSfx, 0.8)),
            FrameEvent::BlockPickedUp        => Some(Self::PlaySe(AssetId::PickupSfx, 1.0)),
            FrameEvent::BlockPlaced { .. }   => Some(Self::PlaySe(AssetId::PlaceSfx, 1.0)),
            FrameEvent::LevelsReady          => Some(Self::PlayBgm),
            _ => None,
        }
    }
}

/// Audio コマンド送信ハンドル（クローン可能）
#[derive(Clone)]
pub struct AudioCommandSender {
    tx: Sender<AudioCommand>,
}

impl AudioCommandSender {
    pub fn send(&self, command: AudioCommand) {
        if self.tx.send(command).is_err() {
            log::trace!("audio thread is gone; command dropped");
        }
    }

    pub fn shutdown(&self) {
        self.send(AudioCommand::Shutdown);
    }
}

/// Audio ワーカーを起動し、コマンド送信ハンドルを返す。
/// スレッド起動に失敗してもハンドルは返す（送信は捨てられる）。
pub fn start_audio_thread(loader: AssetLoader) -> AudioCommandSender {
    let (tx, rx) = mpsc::channel::<AudioCommand>();
    if let Err(e) = thread::Builder::new()
        .name("audio-thread".to_string())
        .spawn(move || run_audio_loop(rx, loader))
    {
        log::warn!("failed to spawn audio thread: {e}");
    }
    AudioCommandSender { tx }
}

fn run_audio_loop(rx: Receiver<AudioCommand>, loader: AssetLoader) {
    let Some(audio) = AudioManager::new() else {
        log::warn!("audio output device is unavailable; audio commands will be dropped");
        while let Ok(command) = rx.recv() {
            if command == AudioCommand::Shutdown {
                break;
            }
        }
        return;
    };

    while let Ok(command) = rx.recv() {
        match command {
            AudioCommand::PlayBgm => {
                if let Some(bytes) = loader.load_bytes(AssetId::Bgm) {
                    audio.play_bgm(bytes);
                }
            }
            AudioCommand::PlaySe(id, volume) => {
                if let Some(bytes) = loader.load_bytes(id) {
                    audio.play_se(bytes, volume);
                }
            }
            AudioCommand::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transdim_core::transfer::PlacementRejection;
    use transdim_core::WorldId;

    #[test]
    fn events_map_to_sounds() {
        assert_eq!(
            AudioCommand::for_event(&FrameEvent::WorldSwitched { to: WorldId::B }),
            Some(AudioCommand::PlaySe(AssetId::SwitchSfx, 0.8))
        );
        assert_eq!(
            AudioCommand::for_event(&FrameEvent::BlockPlaced { row: 1, col: 2 }),
            Some(AudioCommand::PlaySe(AssetId::PlaceSfx, 1.0))
        );
        assert_eq!(AudioCommand::for_event(&FrameEvent::LevelsReady), Some(AudioCommand::PlayBgm));
        assert_eq!(
            AudioCommand::for_event(&FrameEvent::PlacementRejected {
                reason: PlacementRejection::OccupiedInWorldB
            }),
            None
        );
    }
}
