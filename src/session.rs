//! Screen state machine
//!
//! Owns one round at a time and wires player input, the stream simulation,
//! the audio scheduler and persistence together. Drivers call [`Session::frame`]
//! on the animation clock and [`Session::audio_tick`] on the audio timer, and
//! ask `wants_frames` / `wants_audio_ticks` which loops should be alive.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;
use thiserror::Error;

use crate::audio::{AudioBackend, AudioScheduler, SoundEffect};
use crate::consts::{MAX_CHOICES, STARTING_LIVES};
use crate::dictionary::{Category, CharacterEntry, Dictionary, KanaDictionary, Script};
use crate::highscores::BestScore;
use crate::persistence::KeyValueStore;
use crate::pool::{CategoryFlags, resolve, resolve_or_default};
use crate::settings::{Language, Level, Pacing, Preferences};
use crate::sim::{
    Layout, Orientation, RoundConfig, StreamEvent, StreamState, TileView, advance, submit_answer,
};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    Menu,
    Setup,
    Playing,
    Paused,
    GameOver,
    /// Overlay; remembers the screen it interrupted
    About,
}

/// Player intents coming from the input layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(String),
    /// Pick the n-th shown option (keyboard 1-4)
    AnswerSlot(usize),
    TogglePause,
    Quit,
    ToggleMute,
    ToggleLanguage,
    OpenAbout,
    CloseAbout,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no character category selected")]
    EmptyPool,
    #[error("a round can only be launched from the setup screen")]
    NotInSetup,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub screen: Screen,
    pub tiles: Vec<TileView>,
    pub active_index: usize,
    pub options: Vec<CharacterEntry>,
    pub score: u32,
    pub high_score: u32,
    pub lives: u8,
    pub speed: f32,
    pub level: Level,
    pub muted: bool,
    pub language: Language,
    pub orientation: Orientation,
    pub pool_size: usize,
}

pub struct Session<B: AudioBackend, S: KeyValueStore> {
    screen: Screen,
    /// Screen to return to when the About overlay closes
    before_about: Screen,
    script: Script,
    categories: CategoryFlags,
    level: Level,
    pacing: Pacing,
    layout: Layout,
    stream: Option<StreamState>,
    audio: AudioScheduler<B>,
    store: S,
    best: BestScore,
    preferences: Preferences,
    dictionary: Box<dyn Dictionary>,
    /// Source of per-round seeds
    rng: Pcg32,
    last_frame_ms: Option<f64>,
}

impl<B: AudioBackend, S: KeyValueStore> Session<B, S> {
    pub fn new(audio: AudioScheduler<B>, store: S, seed: u64) -> Self {
        let best = BestScore::load(&store);
        let preferences = Preferences::load(&store);

        Self {
            screen: Screen::Menu,
            before_about: Screen::Menu,
            script: Script::default(),
            categories: CategoryFlags::default(),
            level: Level::default(),
            pacing: Pacing::default(),
            layout: Layout::default(),
            stream: None,
            audio,
            store,
            best,
            preferences,
            dictionary: Box::new(KanaDictionary),
            rng: Pcg32::seed_from_u64(seed),
            last_frame_ms: None,
        }
    }

    /// Swap the character tables
    pub fn with_dictionary(mut self, dictionary: impl Dictionary + 'static) -> Self {
        self.dictionary = Box::new(dictionary);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn stream(&self) -> Option<&StreamState> {
        self.stream.as_ref()
    }

    pub fn audio(&self) -> &AudioScheduler<B> {
        &self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn best_score(&self) -> u32 {
        self.best.score
    }

    pub fn categories(&self) -> CategoryFlags {
        self.categories
    }

    // --- Menu & setup ---

    pub fn set_script(&mut self, script: Script) {
        if matches!(self.screen, Screen::Menu | Screen::Setup) {
            self.script = script;
        }
    }

    pub fn enter_setup(&mut self, level: Level) -> bool {
        if self.screen != Screen::Menu {
            return false;
        }
        self.level = level;
        self.screen = Screen::Setup;
        true
    }

    pub fn toggle_category(&mut self, category: Category) {
        if self.screen == Screen::Setup {
            self.categories.toggle(category);
        }
    }

    pub fn back_to_menu(&mut self) -> bool {
        if self.screen != Screen::Setup {
            return false;
        }
        self.screen = Screen::Menu;
        true
    }

    /// Size of the pool the current setup would play with
    pub fn pool_size(&self) -> usize {
        resolve(&*self.dictionary, self.script, self.categories).len()
    }

    /// Start a fresh round from the setup screen
    pub fn launch(&mut self) -> Result<(), SessionError> {
        if self.screen != Screen::Setup {
            return Err(SessionError::NotInSetup);
        }
        if self.pool_size() == 0 {
            log::debug!("Launch refused: no category selected");
            return Err(SessionError::EmptyPool);
        }
        let pool = resolve_or_default(&*self.dictionary, self.script, self.categories);

        let config = RoundConfig {
            level: self.level,
            pacing: self.pacing,
            seed: self.rng.random(),
        };
        let mut stream = StreamState::with_fallback(pool, &*self.dictionary, self.layout, config);
        let events = stream.start();
        log::info!(
            "Launching {} round at level {} with {} characters",
            self.script.as_str(),
            self.level.number(),
            stream.pool().len()
        );

        self.stream = Some(stream);
        self.screen = Screen::Playing;
        self.last_frame_ms = None;
        self.audio.initialize();
        self.apply(events);
        Ok(())
    }

    // --- Round flow ---

    pub fn toggle_pause(&mut self) -> bool {
        match self.screen {
            Screen::Playing => self.pause(),
            Screen::Paused => self.resume(),
            _ => false,
        }
    }

    /// Returns false unless a round was playing
    pub fn pause(&mut self) -> bool {
        if self.screen != Screen::Playing {
            return false;
        }
        if let Some(stream) = self.stream.as_mut() {
            stream.pause();
        }
        self.screen = Screen::Paused;
        self.audio.suspend();
        log::info!("Paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.screen != Screen::Paused {
            return false;
        }
        if let Some(stream) = self.stream.as_mut() {
            stream.resume();
        }
        self.screen = Screen::Playing;
        self.last_frame_ms = None;
        self.audio.resume();
        log::info!("Resumed");
        true
    }

    /// Abandon the round
    pub fn quit_to_menu(&mut self) -> bool {
        if !matches!(self.screen, Screen::Playing | Screen::Paused) {
            return false;
        }
        self.stream = None;
        self.screen = Screen::Menu;
        self.audio.stop_loop();
        self.audio.suspend();
        log::info!("Round abandoned");
        true
    }

    /// Leave the game-over screen
    pub fn try_again(&mut self) -> bool {
        if self.screen != Screen::GameOver {
            return false;
        }
        self.stream = None;
        self.screen = Screen::Menu;
        self.audio.suspend();
        true
    }

    pub fn open_about(&mut self) -> bool {
        if self.screen == Screen::About {
            return false;
        }
        if self.screen == Screen::Playing {
            if let Some(stream) = self.stream.as_mut() {
                stream.pause();
            }
            self.audio.suspend();
        }
        self.before_about = self.screen;
        self.screen = Screen::About;
        true
    }

    pub fn close_about(&mut self) -> bool {
        if self.screen != Screen::About {
            return false;
        }
        self.screen = self.before_about;
        if self.screen == Screen::Playing {
            if let Some(stream) = self.stream.as_mut() {
                stream.resume();
            }
            self.last_frame_ms = None;
            self.audio.resume();
        }
        true
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.audio.is_muted();
        self.audio.set_muted(muted);
        // Only a live round has a loop worth restarting
        if !muted && self.screen == Screen::Playing {
            self.audio.resume();
        }
    }

    pub fn toggle_language(&mut self) {
        self.preferences.language = self.preferences.language.toggled();
        self.preferences.save(&mut self.store);
    }

    // --- Answers ---

    /// Returns true if the answer was taken
    pub fn answer(&mut self, reading: &str) -> bool {
        if self.screen != Screen::Playing {
            return false;
        }
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };
        let events = submit_answer(stream, reading);
        let taken = !events.is_empty();
        self.apply(events);
        taken
    }

    /// Answer with the option at `index`; only when the full set of choices is shown
    pub fn answer_slot(&mut self, index: usize) -> bool {
        let reading = self
            .stream
            .as_ref()
            .filter(|s| s.options.len() >= MAX_CHOICES)
            .and_then(|s| s.options.get(index))
            .map(|o| o.reading);
        match reading {
            Some(reading) => self.answer(reading),
            None => false,
        }
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Answer(reading) => {
                self.answer(&reading);
            }
            Command::AnswerSlot(index) => {
                self.answer_slot(index);
            }
            Command::TogglePause => {
                self.toggle_pause();
            }
            Command::Quit => {
                self.quit_to_menu();
            }
            Command::ToggleMute => self.toggle_mute(),
            Command::ToggleLanguage => self.toggle_language(),
            Command::OpenAbout => {
                self.open_about();
            }
            Command::CloseAbout => {
                self.close_about();
            }
        }
    }

    // --- Clocks ---

    /// One animation frame at `now_ms`. Returns whether another frame is wanted.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.screen != Screen::Playing {
            self.last_frame_ms = None;
            return false;
        }
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };

        let elapsed_secs = self
            .last_frame_ms
            .map_or(0.0, |last| ((now_ms - last) / 1000.0).max(0.0)) as f32;
        self.last_frame_ms = Some(now_ms);

        let events = advance(stream, elapsed_secs);
        self.apply(events);
        self.wants_frames()
    }

    /// One pass of the audio look-ahead timer
    pub fn audio_tick(&mut self) -> usize {
        self.audio.tick()
    }

    pub fn wants_frames(&self) -> bool {
        self.screen == Screen::Playing
            && self.stream.as_ref().is_some_and(|s| s.wants_next_frame())
    }

    pub fn wants_audio_ticks(&self) -> bool {
        self.audio.wants_ticks()
    }

    /// Viewport changed; new geometry applies to the current round too
    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout = Layout::new(width, height);
        if let Some(stream) = self.stream.as_mut() {
            stream.layout = self.layout;
        }
        log::debug!(
            "Viewport {}x{} ({:?})",
            width,
            height,
            self.layout.orientation()
        );
    }

    /// Release the audio device for good
    pub fn shutdown(&mut self) {
        self.audio.close();
    }

    pub fn snapshot(&self) -> Snapshot {
        let stream = self.stream.as_ref();
        Snapshot {
            screen: self.screen,
            tiles: stream.map(|s| s.tile_views()).unwrap_or_default(),
            active_index: stream.map_or(0, |s| s.active_index),
            options: stream.map(|s| s.options.clone()).unwrap_or_default(),
            score: stream.map_or(0, |s| s.score),
            high_score: self.best.score,
            lives: stream.map_or(STARTING_LIVES, |s| s.lives),
            speed: stream.map_or(self.level.initial_speed(), |s| s.speed),
            level: self.level,
            muted: self.audio.is_muted(),
            language: self.preferences.language,
            orientation: self.layout.orientation(),
            pool_size: self.pool_size(),
        }
    }

    /// Turn stream events into sound and screen changes
    fn apply(&mut self, events: Vec<StreamEvent>) {
        for event in events {
            match event {
                StreamEvent::Answered { correct: true, .. } => {
                    self.audio.play_effect(SoundEffect::Correct);
                }
                StreamEvent::Answered { correct: false, .. } | StreamEvent::Missed { .. } => {
                    self.audio.play_effect(SoundEffect::Wrong);
                }
                StreamEvent::RoundEnded { score } => self.end_round(score),
                StreamEvent::Spawned { .. } | StreamEvent::SpeedUp { .. } => {}
            }
        }
    }

    fn end_round(&mut self, score: u32) {
        // Clock keeps running so the end tone can ring out
        self.audio.play_effect(SoundEffect::End);
        self.audio.stop_loop();
        self.best.submit(score, &mut self.store);
        self.screen = Screen::GameOver;
        self.last_frame_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioError, AudioState, LEAD_TIME, OfflineDevice, Voice};
    use crate::persistence::{BEST_SCORE_KEY, LANGUAGE_KEY, MemoryStore};
    use crate::sim::StreamPhase;

    type TestSession = Session<OfflineDevice, MemoryStore>;

    fn session_with(store: MemoryStore) -> (TestSession, OfflineDevice) {
        let device = OfflineDevice::new();
        let handle = device.clone();
        let audio = AudioScheduler::new(move || Ok(device.clone()), 7);
        (Session::new(audio, store, 1), handle)
    }

    fn session() -> (TestSession, OfflineDevice) {
        session_with(MemoryStore::new())
    }

    fn playing(level: Level) -> (TestSession, OfflineDevice) {
        let (mut s, device) = session();
        s.resize(1280.0, 720.0);
        assert!(s.enter_setup(level));
        s.launch().unwrap();
        (s, device)
    }

    fn active_reading(s: &TestSession) -> &'static str {
        let stream = s.stream().unwrap();
        stream.tiles[stream.active_index].reading()
    }

    fn effects(device: &OfflineDevice, effect: SoundEffect) -> usize {
        device
            .scheduled()
            .iter()
            .filter(|v| v.voice == Voice::Effect(effect))
            .count()
    }

    #[test]
    fn test_menu_to_playing() {
        let (mut s, device) = session();
        assert_eq!(s.screen(), Screen::Menu);
        assert_eq!(s.launch(), Err(SessionError::NotInSetup));

        assert!(s.enter_setup(Level::Fast));
        assert_eq!(s.screen(), Screen::Setup);
        s.launch().unwrap();

        assert_eq!(s.screen(), Screen::Playing);
        let snap = s.snapshot();
        assert_eq!(snap.tiles.len(), 1);
        assert_eq!(snap.options.len(), 4);
        assert_eq!(snap.speed, 3.0);
        assert_eq!(snap.lives, STARTING_LIVES);
        assert!(s.wants_frames());
        assert!(s.wants_audio_ticks());
        assert!(!device.is_suspended());
    }

    #[test]
    fn test_empty_pool_launch_refused() {
        let (mut s, _device) = session();
        s.enter_setup(Level::Normal);
        s.toggle_category(Category::Base);
        assert_eq!(s.pool_size(), 0);

        assert_eq!(s.launch(), Err(SessionError::EmptyPool));
        assert_eq!(s.screen(), Screen::Setup);
        assert!(s.stream().is_none());
        assert_eq!(s.audio().state(), AudioState::Uninitialized);
    }

    #[test]
    fn test_setup_pool_size_follows_categories() {
        let (mut s, _device) = session();
        s.set_script(Script::Hiragana);
        s.enter_setup(Level::Normal);
        assert_eq!(s.pool_size(), 46);
        s.toggle_category(Category::Voiced);
        s.toggle_category(Category::Combo);
        assert_eq!(s.snapshot().pool_size, 46 + 25 + 33);
        assert!(s.back_to_menu());
        assert_eq!(s.screen(), Screen::Menu);
    }

    #[test]
    fn test_last_life_miss_ends_round() {
        let (mut s, device) = playing(Level::Normal);
        s.stream.as_mut().unwrap().lives = 1;

        let mut now = 0.0;
        while s.frame(now) {
            now += 16.0;
            assert!(now < 60_000.0, "round never ended");
        }

        assert_eq!(s.screen(), Screen::GameOver);
        let stream = s.stream().unwrap();
        assert_eq!(stream.lives, 0);
        assert_eq!(stream.phase, StreamPhase::Ended);
        assert_eq!(effects(&device, SoundEffect::End), 1);
        assert_eq!(effects(&device, SoundEffect::Wrong), 1);

        // Nothing more happens after the round is over
        assert!(!s.frame(now + 16.0));
        assert_eq!(effects(&device, SoundEffect::End), 1);
        assert!(!s.wants_audio_ticks());
    }

    #[test]
    fn test_best_score_saved_only_when_beaten() {
        let (mut s, _device) = playing(Level::Normal);
        for _ in 0..3 {
            let reading = active_reading(&s);
            assert!(s.answer(reading));
        }
        s.stream.as_mut().unwrap().lives = 1;
        assert!(s.answer("??"));

        assert_eq!(s.screen(), Screen::GameOver);
        assert_eq!(s.snapshot().score, 3);
        assert_eq!(s.best_score(), 3);
        assert_eq!(s.store().get(BEST_SCORE_KEY).as_deref(), Some("3"));

        // A worse round leaves the stored value alone
        assert!(s.try_again());
        assert_eq!(s.screen(), Screen::Menu);
        s.enter_setup(Level::Normal);
        s.launch().unwrap();
        s.stream.as_mut().unwrap().lives = 1;
        s.answer("??");
        assert_eq!(s.screen(), Screen::GameOver);
        assert_eq!(s.store().get(BEST_SCORE_KEY).as_deref(), Some("3"));
        assert_eq!(s.snapshot().high_score, 3);
    }

    #[test]
    fn test_best_score_loaded_from_store() {
        let mut store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, "17");
        let (s, _device) = session_with(store);
        assert_eq!(s.snapshot().high_score, 17);
    }

    #[test]
    fn test_answer_effects() {
        let (mut s, device) = playing(Level::Normal);
        let reading = active_reading(&s);
        s.answer(reading);
        s.answer("??");
        assert_eq!(effects(&device, SoundEffect::Correct), 1);
        assert_eq!(effects(&device, SoundEffect::Wrong), 1);
        assert_eq!(s.snapshot().lives, STARTING_LIVES - 1);
    }

    #[test]
    fn test_answer_slot_needs_four_options() {
        let (mut s, _device) = playing(Level::Normal);
        assert_eq!(s.snapshot().options.len(), 2);
        assert!(!s.answer_slot(0));

        let (mut s, _device) = playing(Level::Insane);
        let reading = active_reading(&s);
        let slot = s
            .snapshot()
            .options
            .iter()
            .position(|o| o.reading == reading)
            .unwrap();
        assert!(s.answer_slot(slot));
        assert_eq!(s.snapshot().score, 1);
        assert!(!s.answer_slot(7));
    }

    #[test]
    fn test_pause_twice() {
        let (mut s, device) = playing(Level::Normal);
        assert!(s.pause());
        assert!(!s.pause());
        assert_eq!(s.screen(), Screen::Paused);
        assert!(device.is_suspended());
        assert!(!s.wants_frames());
        assert!(!s.wants_audio_ticks());

        // Paused rounds ignore frames and answers
        let before = s.snapshot().tiles;
        s.frame(0.0);
        s.frame(500.0);
        let reading = active_reading(&s);
        assert!(!s.answer(reading));
        assert_eq!(s.snapshot().tiles, before);

        assert!(s.toggle_pause());
        assert_eq!(s.screen(), Screen::Playing);
        assert!(!device.is_suspended());
        assert!(s.wants_audio_ticks());
    }

    #[test]
    fn test_about_restores_playing() {
        let (mut s, device) = playing(Level::Normal);
        assert!(s.open_about());
        assert!(!s.open_about());
        assert_eq!(s.screen(), Screen::About);
        assert_eq!(s.stream().unwrap().phase, StreamPhase::Paused);
        assert!(device.is_suspended());
        assert!(!s.wants_frames());

        assert!(s.close_about());
        assert_eq!(s.screen(), Screen::Playing);
        assert_eq!(s.stream().unwrap().phase, StreamPhase::Running);
        assert!(!device.is_suspended());
        assert!(s.wants_frames());
    }

    #[test]
    fn test_about_restores_other_screens() {
        let (mut s, _device) = session();
        s.enter_setup(Level::Normal);
        s.open_about();
        s.close_about();
        assert_eq!(s.screen(), Screen::Setup);

        let (mut s, device) = playing(Level::Normal);
        s.pause();
        s.open_about();
        s.close_about();
        assert_eq!(s.screen(), Screen::Paused);
        assert!(device.is_suspended());
    }

    #[test]
    fn test_mute_during_play() {
        let (mut s, device) = playing(Level::Normal);
        device.advance(0.05);
        assert!(s.audio_tick() > 0);

        s.toggle_mute();
        assert!(s.snapshot().muted);
        assert!(device.is_suspended());
        let before = device.scheduled().len();
        device.advance(2.0);
        assert_eq!(s.audio_tick(), 0);
        assert_eq!(device.scheduled().len(), before);
        assert!(!s.wants_audio_ticks());

        // Effects are silent too
        let reading = active_reading(&s);
        s.answer(reading);
        assert_eq!(effects(&device, SoundEffect::Correct), 0);

        s.toggle_mute();
        assert!(!s.snapshot().muted);
        assert!(s.wants_audio_ticks());
        let now = device.now();
        assert!((s.audio().next_event_time() - (now + LEAD_TIME)).abs() < 1e-9);
        s.audio_tick();
        assert!(device.scheduled().iter().skip(before).all(|v| v.at >= now));
    }

    #[test]
    fn test_mute_resets_each_session() {
        let (mut s, _device) = playing(Level::Normal);
        s.toggle_mute();
        assert!(s.audio().is_muted());
        // Nothing written for mute
        assert!(s.store().is_empty());

        let (fresh, _device) = session_with(s.store().clone());
        assert!(!fresh.snapshot().muted);
        assert!(!fresh.audio().is_muted());
    }

    #[test]
    fn test_unmute_in_menu_stays_quiet() {
        let (mut s, device) = playing(Level::Normal);
        s.quit_to_menu();
        s.toggle_mute();
        s.toggle_mute();
        assert!(device.is_suspended());
        assert!(!s.wants_audio_ticks());
    }

    #[test]
    fn test_quit_to_menu() {
        let (mut s, device) = playing(Level::Normal);
        s.handle(Command::TogglePause);
        s.handle(Command::Quit);
        assert_eq!(s.screen(), Screen::Menu);
        assert!(s.stream().is_none());
        assert!(device.is_suspended());
        assert_eq!(s.snapshot().tiles.len(), 0);

        // A new round restarts the loop from the top
        s.enter_setup(Level::Normal);
        s.launch().unwrap();
        assert!(!device.is_suspended());
        assert_eq!(s.audio().beat_index(), 0);
    }

    #[test]
    fn test_language_toggle_persists() {
        let (mut s, _device) = session();
        assert_eq!(s.snapshot().language, Language::Si);
        s.handle(Command::ToggleLanguage);
        assert_eq!(s.snapshot().language, Language::En);
        assert_eq!(s.store().get(LANGUAGE_KEY).as_deref(), Some("en"));

        let mut store = MemoryStore::new();
        store.set(LANGUAGE_KEY, "en");
        let (s, _device) = session_with(store);
        assert_eq!(s.snapshot().language, Language::En);
    }

    #[test]
    fn test_frames_move_tiles() {
        let (mut s, _device) = playing(Level::Normal);
        let start = s.snapshot().tiles[0].x;
        for i in 0..10 {
            s.frame(i as f64 * 16.0);
        }
        assert!((start - s.snapshot().tiles[0].x - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_resize_switches_orientation() {
        let (mut s, _device) = session();
        s.resize(400.0, 800.0);
        assert_eq!(s.snapshot().orientation, Orientation::Vertical);
        s.resize(1024.0, 768.0);
        assert_eq!(s.snapshot().orientation, Orientation::Horizontal);
    }

    #[test]
    fn test_audio_unavailable_round_still_plays() {
        let audio = AudioScheduler::<OfflineDevice>::new(
            || Err(AudioError::Unavailable("no device".into())),
            3,
        );
        let mut s = Session::new(audio, MemoryStore::new(), 9);
        s.enter_setup(Level::Normal);
        s.launch().unwrap();
        assert!(s.wants_frames());
        assert!(!s.wants_audio_ticks());
        let reading = active_reading(&s);
        assert!(s.answer(reading));
    }

    struct TinyDictionary;

    impl Dictionary for TinyDictionary {
        fn entries(&self, _script: Script, category: Category) -> &[CharacterEntry] {
            const BASE: &[CharacterEntry] =
                &[CharacterEntry::new("カ", "ka"), CharacterEntry::new("キ", "ki")];
            match category {
                Category::Base => BASE,
                _ => &[],
            }
        }
    }

    #[test]
    fn test_custom_dictionary_and_pacing() {
        let (s, _device) = session();
        let mut s = s
            .with_dictionary(TinyDictionary)
            .with_pacing(Pacing::TimeNormalized { reference_hz: 60.0 });
        s.enter_setup(Level::Normal);
        assert!(s.categories().is_enabled(Category::Base));
        assert_eq!(s.pool_size(), 2);

        s.launch().unwrap();
        assert_eq!(s.stream().unwrap().pool().len(), 2);
        assert!(matches!(active_reading(&s), "ka" | "ki"));

        // First frame has no elapsed time, so nothing moves
        let x = s.snapshot().tiles[0].x;
        s.frame(1000.0);
        assert_eq!(s.snapshot().tiles[0].x, x);
        s.frame(1050.0);
        assert!((x - s.snapshot().tiles[0].x - 4.5).abs() < 1e-3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (s, _device) = playing(Level::Normal);
        let json = serde_json::to_string(&s.snapshot()).unwrap();
        assert!(json.contains("\"screen\":\"Playing\""));
        assert!(json.contains("\"tiles\""));
    }
}
