use crate::codec::{self, SharedState};
use crate::container::BlockEncoder;
use crate::controls::ControlStates;
use crate::error::Result;
use crate::export::{export, ExportedFile};
use crate::kits::SoundKit;
use crate::layout::{GridLayout, TileLayout};
use crate::player::{OnFinish, PlayOutcome, Player, Trigger};
use crate::recorder::Recorder;
use crate::render::RenderSettings;
use crate::scheduler::Scheduler;
use crate::sequence::{Event, Sequence};
use crate::synth::{synthesize_now, ToneSink};
use crate::themes::Theme;
use std::cell::Cell;
use std::rc::Rc;

/// Everything the instrument knows about the current session: theme, kit,
/// the recorded take and the transport state.
///
/// Recording and playback exclude each other: arming stops playback, and
/// asking to play while armed ends the recording first.
pub struct Session<L: TileLayout = GridLayout> {
    theme: Theme,
    // shared with playback triggers so a kit change applies mid-playback
    kit: Rc<Cell<SoundKit>>,
    sequence: Sequence,
    recorder: Recorder,
    player: Player,
    layout: L,
}

impl Default for Session<GridLayout> {
    fn default() -> Self {
        Self::with_layout(GridLayout::default())
    }
}

impl Session<GridLayout> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: TileLayout> Session<L> {
    pub fn with_layout(layout: L) -> Self {
        Self {
            theme: Theme::default(),
            kit: Rc::new(Cell::new(SoundKit::default())),
            sequence: Sequence::new(),
            recorder: Recorder::new(),
            player: Player::new(),
            layout,
        }
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Unknown names are logged and leave the theme unchanged.
    pub fn set_theme_by_name(&mut self, name: &str) -> Result<Theme> {
        let theme = Theme::from_name(name).inspect_err(|e| log::warn!("[session] {e}"))?;
        self.theme = theme;
        Ok(theme)
    }

    pub fn kit(&self) -> SoundKit {
        self.kit.get()
    }

    pub fn select_kit(&mut self, kit: SoundKit) {
        self.kit.set(kit);
    }

    /// Unknown names are logged and leave the kit unchanged.
    pub fn select_kit_by_name(&mut self, name: &str) -> Result<SoundKit> {
        let kit = SoundKit::from_name(name).inspect_err(|e| log::warn!("[session] {e}"))?;
        self.kit.set(kit);
        Ok(kit)
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_armed()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn controls(&self) -> ControlStates {
        ControlStates::derive(
            self.is_recording(),
            self.is_playing(),
            !self.sequence.is_empty(),
        )
    }

    /// Arm a fresh take, stopping playback first.
    pub fn start_recording(&mut self, now_ms: f64, scheduler: &mut dyn Scheduler) {
        self.player.stop(scheduler);
        self.recorder.arm(&mut self.sequence, now_ms);
    }

    pub fn stop_recording(&mut self) {
        self.recorder.disarm();
    }

    /// Returns whether the session is recording afterwards.
    pub fn toggle_recording(&mut self, now_ms: f64, scheduler: &mut dyn Scheduler) -> bool {
        if self.is_recording() {
            self.stop_recording();
        } else {
            self.start_recording(now_ms, scheduler);
        }
        self.is_recording()
    }

    /// A tile was tapped: capture it if armed, then sound it on `output`.
    ///
    /// Taps are ignored during playback. The tap is captured even when the
    /// output cannot sound it; the output error is still returned.
    pub fn tap(
        &mut self,
        tile_index: usize,
        now_ms: f64,
        output: &mut dyn ToneSink,
    ) -> Result<Option<Event>> {
        if self.is_playing() {
            return Ok(None);
        }
        let Some(position) = self.layout.tile_position(tile_index) else {
            log::warn!("[session] tap on unknown tile {tile_index}");
            return Ok(None);
        };
        let captured = self
            .recorder
            .capture(&mut self.sequence, tile_index, position, now_ms);
        synthesize_now(position, &self.kit().envelope(), output)?;
        Ok(captured)
    }

    /// Replay the take. `voice` sounds one event with the kit selected at
    /// the moment it fires.
    pub fn play(
        &mut self,
        scheduler: &mut dyn Scheduler,
        voice: impl Fn(&Event, SoundKit) + 'static,
        on_finish: Option<OnFinish>,
    ) -> PlayOutcome {
        if self.is_recording() {
            self.stop_recording();
        }
        let kit = Rc::clone(&self.kit);
        let trigger: Trigger = Rc::new(move |event: &Event| voice(event, kit.get()));
        self.player
            .play(&self.sequence, scheduler, trigger, on_finish)
    }

    /// Stop playback and recording. Safe to call in any state.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        self.player.stop(scheduler);
        self.recorder.disarm();
    }

    pub fn clear(&mut self, scheduler: &mut dyn Scheduler) {
        self.stop(scheduler);
        self.sequence.clear();
    }

    /// Share token for the current session, `None` when nothing is recorded.
    pub fn share_token(&self) -> Result<Option<String>> {
        if self.sequence.is_empty() {
            return Ok(None);
        }
        let state = SharedState::capture(self.theme, self.kit(), &self.sequence);
        codec::encode(&state).map(Some)
    }

    /// Replace the session with a shared one.
    ///
    /// The token is fully validated before anything changes; on error the
    /// session is left exactly as it was. Unknown theme or kit names keep the
    /// current value.
    pub fn load_shared(&mut self, token: &str, scheduler: &mut dyn Scheduler) -> Result<()> {
        let loaded = codec::decode(token).and_then(|state| {
            let sequence = state.to_sequence(&self.layout)?;
            Ok((state, sequence))
        });
        let (state, sequence) = loaded.inspect_err(|e| log::warn!("[session] {e}"))?;

        self.stop(scheduler);
        if let Some(name) = state.theme.as_deref() {
            _ = self.set_theme_by_name(name);
        }
        if let Some(name) = state.kit.as_deref() {
            _ = self.select_kit_by_name(name);
        }
        log::info!("[session] loaded {} shared events", sequence.len());
        self.sequence = sequence;
        Ok(())
    }

    /// Render and encode the take. Nothing is produced for an empty take.
    pub fn export(
        &self,
        encoder: &mut dyn BlockEncoder,
        settings: &RenderSettings,
        epoch_ms: u64,
    ) -> Result<Option<ExportedFile>> {
        export(&self.sequence, self.kit(), settings, encoder, epoch_ms)
    }
}
