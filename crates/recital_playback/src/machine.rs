//! The playback state machine.
//!
//! [`PlaybackMachine`] owns the position, play state, voice and rate of one
//! narrated presentation. It is driven entirely through [`PlaybackMachine::handle`]
//! (or the equivalent named operations): UI commands, generation-tagged speech
//! events and timer ticks all arrive as [`PlaybackMessage`]s.
//!
//! Every operation that changes the position or the play state bumps the
//! generation first. Speech events carrying any other generation are dropped,
//! so a late `Ended` from a cancelled utterance can never advance playback.

use crate::{PlaybackConfig, ProgressModel, SceneResolver, SpeechController, SpeechOutcome};
use derive_getters::Getters;
use recital_core::{
    AnimationCue, DurationManifest, LineCursor, PlaybackPosition, SceneCatalog, SceneTable,
    Script, VisualState, Voice,
};
use recital_error::ConfigError;
use recital_interface::{Clock, Generation, SpeechBackend, SpeechEvent, UtteranceRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Coarse lifecycle phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlaybackPhase {
    /// No script loaded
    #[default]
    Idle,
    /// Script loaded, not yet played
    Ready,
    /// Speaking the current line
    Playing,
    /// Stopped on a line after playing
    Paused,
    /// Past the last line
    Ended,
}

/// A UI command.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum PlaybackCommand {
    /// Restart from the first line and play
    #[display("start")]
    StartNarration,
    /// Play if stopped, pause if playing
    #[display("toggle")]
    TogglePlay,
    /// Play the current line
    #[display("play")]
    Play,
    /// Stop speaking, keeping the position
    #[display("pause")]
    Pause,
    /// Move one line forward
    #[display("next")]
    NextLine,
    /// Move one line back
    #[display("prev")]
    PrevLine,
    /// Move to a specific line
    #[display("jump {} {}", section, line)]
    JumpToLine {
        /// Section index
        section: usize,
        /// Line index within the section
        line: usize,
    },
    /// Move to the first line of a section
    #[display("section {}", _0)]
    JumpToSection(usize),
    /// Move to the line playing at a time on the timeline
    #[display("seek {:?}", _0)]
    Seek(Duration),
    /// Change the voice
    #[display("voice {}", _0)]
    SetVoice(Voice),
    /// Change the rate
    #[display("rate {}", _0)]
    SetPlaybackRate(f32),
    /// Stop and unload
    #[display("exit")]
    ExitNarration,
}

/// Anything the machine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackMessage {
    /// A UI command
    Command(PlaybackCommand),
    /// A speech backend event
    Speech(SpeechEvent),
    /// Timer tick: fires fallbacks and animation cues that are due
    Tick,
}

impl From<PlaybackCommand> for PlaybackMessage {
    fn from(command: PlaybackCommand) -> Self {
        Self::Command(command)
    }
}

impl From<SpeechEvent> for PlaybackMessage {
    fn from(event: SpeechEvent) -> Self {
        Self::Speech(event)
    }
}

/// Something the presenter may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackNotification {
    /// The current line changed (also sent on load)
    LineChanged {
        /// New position
        cursor: LineCursor,
        /// Generation of the change
        generation: Generation,
    },
    /// The backend started speaking the current line
    SpeechStarted {
        /// Line being spoken
        cursor: LineCursor,
    },
    /// Playback paused
    Paused {
        /// Line paused on
        cursor: LineCursor,
    },
    /// Playback resumed
    Resumed {
        /// Line restarted
        cursor: LineCursor,
    },
    /// Every line of a section was narrated
    SectionCompleted {
        /// Section index
        section: usize,
    },
    /// The last line finished
    Ended,
    /// An animation cue is due
    Cue {
        /// Line the cue belongs to
        cursor: LineCursor,
        /// The cue
        cue: AnimationCue,
    },
    /// The script was unloaded
    Exited,
}

/// Read-only view of the machine at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Getters)]
pub struct PlaybackSnapshot {
    /// Loaded script id
    script_id: Option<String>,
    /// Lifecycle phase
    phase: PlaybackPhase,
    /// Position, unless idle
    position: Option<PlaybackPosition>,
    /// Whether a line is being spoken
    is_playing: bool,
    /// Selected voice
    voice: Option<Voice>,
    /// Playback rate
    playback_rate: f32,
    /// Text of the current line
    current_text: Option<String>,
    /// Estimated time on the timeline
    current_time: Duration,
    /// Estimated length of the timeline
    total_duration: Duration,
    /// Resolved visual state
    visual_state: VisualState,
    /// Current generation
    generation: Generation,
    /// Indices of fully narrated sections
    completed_sections: Vec<usize>,
}

#[derive(Debug, Clone)]
struct PendingCue {
    due: Duration,
    generation: Generation,
    cursor: LineCursor,
    cue: AnimationCue,
}

#[derive(Debug)]
struct LoadedScript {
    script: Arc<Script>,
    cursors: Vec<LineCursor>,
    resolver: SceneResolver,
    manifest: Option<DurationManifest>,
    progress: ProgressModel,
    // Flat line index; cursors.len() means ended
    index: usize,
    visual: VisualState,
    completed: BTreeSet<usize>,
}

impl LoadedScript {
    fn cursor(&self) -> Option<LineCursor> {
        self.cursors.get(self.index).copied()
    }

    fn last_index(&self) -> usize {
        self.cursors.len().saturating_sub(1)
    }
}

/// Narration playback state machine over a speech backend.
///
/// # Examples
///
/// ```
/// use recital_core::{LineBuilder, ScriptBuilder, SectionBuilder};
/// use recital_error::SpeechError;
/// use recital_interface::{Generation, ManualClock, SpeechBackend, UtteranceRequest};
/// use recital_playback::{PlaybackConfig, PlaybackMachine, PlaybackPhase};
/// use std::sync::Arc;
///
/// struct Silent;
///
/// impl SpeechBackend for Silent {
///     fn speak(&mut self, _request: &UtteranceRequest) -> Result<(), SpeechError> {
///         Ok(())
///     }
///     fn cancel(&mut self, _generation: Generation) {}
///     fn name(&self) -> &str {
///         "silent"
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let line = LineBuilder::default().id("1").text("Hello").build()?;
/// let section = SectionBuilder::default().id("intro").lines(vec![line]).build()?;
/// let script = ScriptBuilder::default().id("demo").title("Demo").sections(vec![section]).build()?;
///
/// let mut machine = PlaybackMachine::new(Silent, PlaybackConfig::default(), Arc::new(ManualClock::new()))?;
/// machine.load_script(script)?;
/// assert_eq!(machine.phase(), PlaybackPhase::Ready);
///
/// machine.toggle_play();
/// assert!(machine.is_playing());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PlaybackMachine<B> {
    config: PlaybackConfig,
    clock: Arc<dyn Clock>,
    speech: SpeechController<B>,
    catalog: SceneCatalog,
    loaded: Option<LoadedScript>,
    phase: PlaybackPhase,
    voice: Voice,
    rate: f32,
    generation: Generation,
    cues: Vec<PendingCue>,
    notifications: Vec<PlaybackNotification>,
}

impl<B: SpeechBackend> PlaybackMachine<B> {
    /// Creates an idle machine.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`PlaybackConfig::validate`].
    pub fn new(backend: B, config: PlaybackConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            speech: SpeechController::new(backend, &config),
            voice: config.voice(),
            rate: config.default_rate,
            config,
            clock,
            catalog: SceneCatalog::new(),
            loaded: None,
            phase: PlaybackPhase::Idle,
            generation: Generation::default(),
            cues: Vec::new(),
            notifications: Vec::new(),
        })
    }

    /// Uses `catalog` to find scene tables in [`load_script`](Self::load_script).
    #[must_use]
    pub fn with_catalog(mut self, catalog: SceneCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Loads a script, taking its scene table from the catalog.
    ///
    /// A script with no registered table plays with an empty default state.
    ///
    /// # Errors
    ///
    /// Returns an error if the script has no sections, a section has no
    /// lines, or ids collide. The previous script stays loaded.
    pub fn load_script(&mut self, script: Script) -> Result<(), ConfigError> {
        let table = self.table_for(script.id());
        self.load_script_with(script, table, None)
    }

    /// The catalog's scene table for a script, or an empty one.
    pub fn table_for(&self, script_id: &str) -> Arc<SceneTable> {
        self.catalog.get(script_id).unwrap_or_else(|| {
            warn!(script_id, "No scene table registered, using empty default state");
            Arc::new(SceneTable::empty(script_id))
        })
    }

    /// Loads a script with an explicit scene table and optional measured
    /// durations.
    ///
    /// Loading always resets to the first line, stops speech and discards the
    /// previous visual state.
    ///
    /// # Errors
    ///
    /// Returns an error if the script is malformed. The previous script stays
    /// loaded.
    #[tracing::instrument(skip_all, fields(script_id = %script.id()))]
    pub fn load_script_with(
        &mut self,
        script: Script,
        table: Arc<SceneTable>,
        manifest: Option<DurationManifest>,
    ) -> Result<(), ConfigError> {
        script.validate()?;
        if table.script_id() != script.id() {
            warn!(table = %table.script_id(), "Scene table belongs to another script");
        }

        let generation = self.bump();
        self.speech.cancel();

        let script = Arc::new(script);
        let cursors: Vec<LineCursor> = script.cursors().collect();
        let resolver = SceneResolver::new(table);
        let visual = resolver.resolve_at(&script, LineCursor::default());
        let progress = ProgressModel::new(&script, &self.config, manifest.as_ref(), self.rate);

        info!(
            lines = cursors.len(),
            sections = script.sections().len(),
            total_secs = progress.total_duration().as_secs_f32(),
            "Loaded script"
        );

        self.loaded = Some(LoadedScript {
            script,
            cursors,
            resolver,
            manifest,
            progress,
            index: 0,
            visual,
            completed: BTreeSet::new(),
        });
        self.phase = PlaybackPhase::Ready;
        self.notify(PlaybackNotification::LineChanged {
            cursor: LineCursor::default(),
            generation,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Single entry point for commands, speech events and ticks.
    pub fn handle(&mut self, message: PlaybackMessage) {
        match message {
            PlaybackMessage::Command(command) => self.execute(command),
            PlaybackMessage::Speech(event) => self.on_speech_event(event),
            PlaybackMessage::Tick => self.tick(),
        }
    }

    /// Applies a UI command.
    pub fn execute(&mut self, command: PlaybackCommand) {
        debug!(command = %command, "Executing command");
        match command {
            PlaybackCommand::StartNarration => self.start_narration(),
            PlaybackCommand::TogglePlay => self.toggle_play(),
            PlaybackCommand::Play => self.play(),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::NextLine => self.next_line(),
            PlaybackCommand::PrevLine => self.prev_line(),
            PlaybackCommand::JumpToLine { section, line } => self.jump_to_line(section, line),
            PlaybackCommand::JumpToSection(section) => self.jump_to_section(section),
            PlaybackCommand::Seek(time) => self.seek(time),
            PlaybackCommand::SetVoice(voice) => self.set_voice(voice),
            PlaybackCommand::SetPlaybackRate(rate) => self.set_playback_rate(rate),
            PlaybackCommand::ExitNarration => self.exit_narration(),
        }
    }

    /// Restarts from the first line and plays, clearing completed sections.
    #[tracing::instrument(skip(self))]
    pub fn start_narration(&mut self) {
        if self.loaded.is_none() {
            debug!("No script loaded");
            return;
        }
        self.bump();
        self.speech.cancel();
        self.phase = PlaybackPhase::Playing;
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.completed.clear();
            loaded.visual = loaded.resolver.resolve_at(&loaded.script, LineCursor::default());
        }
        self.enter_line(0);
    }

    /// Plays if stopped, pauses if playing.
    pub fn toggle_play(&mut self) {
        if self.phase == PlaybackPhase::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Speaks the current line from its beginning.
    ///
    /// From [`PlaybackPhase::Ended`] this restarts the presentation.
    #[tracing::instrument(skip(self))]
    pub fn play(&mut self) {
        match self.phase {
            PlaybackPhase::Idle | PlaybackPhase::Playing => {}
            PlaybackPhase::Ended => self.start_narration(),
            PlaybackPhase::Ready | PlaybackPhase::Paused => {
                self.bump();
                self.phase = PlaybackPhase::Playing;
                if let Some(cursor) = self.cursor() {
                    self.notify(PlaybackNotification::Resumed { cursor });
                }
                self.speak_current();
            }
        }
    }

    /// Stops speaking and keeps the position.
    #[tracing::instrument(skip(self))]
    pub fn pause(&mut self) {
        if self.phase != PlaybackPhase::Playing {
            return;
        }
        self.bump();
        self.speech.cancel();
        self.phase = PlaybackPhase::Paused;
        let now = self.clock.now();
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.progress.freeze(now);
        }
        if let Some(cursor) = self.cursor() {
            self.notify(PlaybackNotification::Paused { cursor });
        }
    }

    /// Moves one line forward, into the next section at a section end.
    ///
    /// A no-op on the last line or after the end.
    #[tracing::instrument(skip(self))]
    pub fn next_line(&mut self) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        if self.phase == PlaybackPhase::Ended || loaded.index >= loaded.last_index() {
            debug!("Already on the last line");
            return;
        }
        self.bump();
        self.speech.cancel();
        self.step_forward();
    }

    /// Moves one line back, into the previous section at a section start.
    ///
    /// A no-op on the first line. After the end it returns to the last line.
    #[tracing::instrument(skip(self))]
    pub fn prev_line(&mut self) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let target = if self.phase == PlaybackPhase::Ended {
            loaded.last_index()
        } else if loaded.index == 0 {
            debug!("Already on the first line");
            return;
        } else {
            loaded.index - 1
        };
        self.relocate(target);
    }

    /// Moves to a line; out-of-range indices are ignored.
    ///
    /// The visual state is replayed from the start of the script, so scenes
    /// that build on earlier lines resolve the same as after playing through.
    #[tracing::instrument(skip(self))]
    pub fn jump_to_line(&mut self, section: usize, line: usize) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let cursor = LineCursor::new(section, line);
        match loaded.cursors.binary_search(&cursor) {
            Ok(index) => self.relocate(index),
            Err(_) => debug!(%cursor, "Ignoring jump to a line that does not exist"),
        }
    }

    /// Moves to the first line of a section.
    pub fn jump_to_section(&mut self, section: usize) {
        self.jump_to_line(section, 0);
    }

    /// Moves to the start of the line playing at `time`.
    #[tracing::instrument(skip(self))]
    pub fn seek(&mut self, time: Duration) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let index = loaded.progress.line_at_time(time);
        self.relocate(index);
    }

    /// Changes the voice; while playing, restarts the current line with it.
    #[tracing::instrument(skip(self, voice), fields(voice = %voice))]
    pub fn set_voice(&mut self, voice: Voice) {
        if voice == self.voice {
            return;
        }
        self.voice = voice;
        self.restart_if_playing();
    }

    /// Changes the rate, clamped to the configured range; while playing,
    /// restarts the current line at the new rate.
    ///
    /// NaN and infinite rates are ignored.
    #[tracing::instrument(skip(self))]
    pub fn set_playback_rate(&mut self, rate: f32) {
        let Some(rate) = self.config.clamp_rate(rate) else {
            warn!(rate, "Ignoring non-finite playback rate");
            return;
        };
        if rate == self.rate {
            return;
        }
        self.rate = rate;
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.progress.set_rate(rate);
        }
        self.restart_if_playing();
    }

    /// Stops speech and unloads the script. Idempotent.
    #[tracing::instrument(skip(self))]
    pub fn exit_narration(&mut self) {
        if self.phase == PlaybackPhase::Idle {
            return;
        }
        self.bump();
        self.speech.cancel();
        self.loaded = None;
        self.phase = PlaybackPhase::Idle;
        self.cues.clear();
        self.notify(PlaybackNotification::Exited);
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Feeds a speech event; events from earlier generations are dropped.
    #[tracing::instrument(skip_all, fields(event = %event))]
    pub fn on_speech_event(&mut self, event: SpeechEvent) {
        if *event.generation() != self.generation {
            debug!(current = %self.generation, "Dropped stale speech event");
            return;
        }
        let now = self.clock.now();
        match self.speech.accept(&event, now) {
            SpeechOutcome::Started => {
                if let Some(cursor) = self.cursor() {
                    self.notify(PlaybackNotification::SpeechStarted { cursor });
                }
            }
            SpeechOutcome::Finished => self.on_line_finished(),
            SpeechOutcome::Pending | SpeechOutcome::Stale => {}
        }
    }

    /// Fires fallbacks and animation cues that are due.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(generation) = self.speech.poll(now) {
            if generation == self.generation {
                self.on_line_finished();
            }
        }

        self.fire_cues(now);
    }

    /// Takes the queued notifications, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<PlaybackNotification> {
        std::mem::take(&mut self.notifications)
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Lifecycle phase.
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Whether a line is being spoken.
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    /// The loaded script.
    pub fn script(&self) -> Option<&Script> {
        self.loaded.as_ref().map(|loaded| loaded.script.as_ref())
    }

    /// Current position; `None` when idle.
    pub fn position(&self) -> Option<PlaybackPosition> {
        let loaded = self.loaded.as_ref()?;
        Some(match loaded.cursor() {
            Some(cursor) => PlaybackPosition::Line(cursor),
            None => PlaybackPosition::Ended,
        })
    }

    /// Current line; `None` when idle or ended.
    pub fn cursor(&self) -> Option<LineCursor> {
        self.loaded.as_ref().and_then(LoadedScript::cursor)
    }

    /// Selected voice.
    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    /// Playback rate.
    pub fn playback_rate(&self) -> f32 {
        self.rate
    }

    /// Text of the current line.
    pub fn current_text(&self) -> Option<&str> {
        let loaded = self.loaded.as_ref()?;
        let line = loaded.script.line(loaded.cursor()?)?;
        Some(line.text().as_str())
    }

    /// Estimated time on the timeline.
    pub fn current_time(&self) -> Duration {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.progress.current_time(self.clock.now()))
            .unwrap_or_default()
    }

    /// Estimated length of the timeline.
    pub fn total_duration(&self) -> Duration {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.progress.total_duration())
            .unwrap_or_default()
    }

    /// Resolved visual state; empty when idle.
    pub fn visual_state(&self) -> Option<&VisualState> {
        self.loaded.as_ref().map(|loaded| &loaded.visual)
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Sections narrated to their end, in index order.
    pub fn completed_sections(&self) -> Vec<usize> {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.completed.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Measured durations in use, if any.
    pub fn manifest(&self) -> Option<&DurationManifest> {
        self.loaded.as_ref().and_then(|loaded| loaded.manifest.as_ref())
    }

    /// Playback settings.
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// The speech backend.
    pub fn backend(&self) -> &B {
        self.speech.backend()
    }

    /// Copies the observable state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            script_id: self.script().map(|script| script.id().clone()),
            phase: self.phase,
            position: self.position(),
            is_playing: self.is_playing(),
            voice: Some(self.voice.clone()),
            playback_rate: self.rate,
            current_text: self.current_text().map(str::to_string),
            current_time: self.current_time(),
            total_duration: self.total_duration(),
            visual_state: self.visual_state().cloned().unwrap_or_default(),
            generation: self.generation,
            completed_sections: self.completed_sections(),
        }
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn bump(&mut self) -> Generation {
        self.generation = self.generation.next();
        debug!(generation = %self.generation, "Generation advanced");
        self.generation
    }

    fn notify(&mut self, notification: PlaybackNotification) {
        self.notifications.push(notification);
    }

    // The active utterance finished (or its fallback fired) while playing.
    fn on_line_finished(&mut self) {
        if self.phase != PlaybackPhase::Playing {
            return;
        }
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let at_end = loaded.index >= loaded.last_index();
        self.bump();
        if at_end {
            self.finish();
        } else {
            self.step_forward();
        }
    }

    // Incremental move to the next line; caller has bumped and cancelled.
    fn step_forward(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let from = loaded.index;
        let to = from + 1;
        let (Some(old), Some(new)) = (loaded.cursors.get(from).copied(), loaded.cursors.get(to).copied())
        else {
            return;
        };

        if let Some(section) = loaded.script.section(new.section) {
            if let Some(line) = section.lines().get(new.line) {
                loaded.visual = loaded.resolver.step(&loaded.visual, section, line);
            }
        }
        let completed = old.section != new.section && loaded.completed.insert(old.section);
        if completed {
            self.notify(PlaybackNotification::SectionCompleted {
                section: old.section,
            });
        }
        self.enter_line(to);
    }

    // Direct move with full replay; no-op bookkeeping stays with callers.
    fn relocate(&mut self, index: usize) {
        self.bump();
        self.speech.cancel();
        if self.phase == PlaybackPhase::Ended {
            self.phase = PlaybackPhase::Paused;
        }
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let Some(cursor) = loaded.cursors.get(index).copied() else {
            return;
        };
        loaded.visual = loaded.resolver.resolve_at(&loaded.script, cursor);
        self.enter_line(index);
    }

    // Sets the index, resets progress, notifies, and speaks when playing.
    fn enter_line(&mut self, index: usize) {
        let playing = self.phase == PlaybackPhase::Playing;
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        loaded.index = index;
        if !playing {
            loaded.progress.snap_to_line(index);
        }
        let Some(cursor) = loaded.cursor() else {
            return;
        };
        debug!(%cursor, generation = %self.generation, playing, "Entered line");
        let generation = self.generation;
        self.notify(PlaybackNotification::LineChanged { cursor, generation });
        if playing {
            self.speak_current();
        }
    }

    fn finish(&mut self) {
        self.speech.cancel();
        self.phase = PlaybackPhase::Ended;
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let last_section = loaded.cursors.last().map(|cursor| cursor.section);
        loaded.index = loaded.cursors.len();
        loaded.progress.finish();
        let completed = last_section.filter(|section| loaded.completed.insert(*section));
        if let Some(section) = completed {
            self.notify(PlaybackNotification::SectionCompleted { section });
        }
        info!(generation = %self.generation, "Narration ended");
        self.notify(PlaybackNotification::Ended);
    }

    fn restart_if_playing(&mut self) {
        if self.phase != PlaybackPhase::Playing {
            return;
        }
        self.bump();
        self.speak_current();
    }

    // Issues the utterance for the current line under the current generation
    // and schedules its animation cue.
    fn speak_current(&mut self) {
        let now = self.clock.now();
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        let Some(cursor) = loaded.cursor() else {
            return;
        };
        let Some(line) = loaded.script.line(cursor) else {
            return;
        };
        let text = line.text().clone();
        let cue = line.cue().clone();
        loaded.progress.begin_line(loaded.index, now);

        let request = UtteranceRequest::new(self.generation, text, self.voice.clone(), self.rate);
        self.speech.speak(request, now);

        if let Some(cue) = cue {
            self.cues.push(PendingCue {
                due: now + Duration::from_millis(*cue.delay_ms()),
                generation: self.generation,
                cursor,
                cue,
            });
            self.fire_cues(now);
        }
    }

    fn fire_cues(&mut self, now: Duration) {
        let generation = self.generation;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.cues)
            .into_iter()
            .filter(|pending| pending.generation == generation)
            .partition(|pending| pending.due <= now);
        self.cues = waiting;
        for pending in due {
            debug!(action = %pending.cue.action(), cursor = %pending.cursor, "Firing animation cue");
            self.notify(PlaybackNotification::Cue {
                cursor: pending.cursor,
                cue: pending.cue,
            });
        }
    }
}
