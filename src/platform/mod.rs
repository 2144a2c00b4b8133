//! Platform abstraction layer
//!
//! Maps raw browser input to session calls:
//! - Keyboard keys to [`Command`]s
//! - `data-action` / `data-value` attributes on clicked UI elements to [`UiAction`]s
//!
//! Focus and visibility handling live in the browser driver, which calls
//! `Session::pause` directly.

use crate::audio::AudioBackend;
use crate::consts::MAX_CHOICES;
use crate::dictionary::{Category, Script};
use crate::persistence::KeyValueStore;
use crate::session::{Command, Session};
use crate::settings::Level;

/// Translate a `KeyboardEvent.key` value.
///
/// Number keys only answer while the full set of choices is on screen.
pub fn command_for_key(key: &str, option_count: usize) -> Option<Command> {
    match key {
        "Escape" => Some(Command::TogglePause),
        "1" | "2" | "3" | "4" if option_count >= MAX_CHOICES => {
            let slot = key.parse::<usize>().ok()?;
            Some(Command::AnswerSlot(slot - 1))
        }
        "m" | "M" => Some(Command::ToggleMute),
        "l" | "L" => Some(Command::ToggleLanguage),
        _ => None,
    }
}

/// A click on a menu, setup or HUD control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SetScript(Script),
    EnterSetup(Level),
    ToggleCategory(Category),
    BackToMenu,
    Launch,
    TryAgain,
    Command(Command),
}

/// Parse a control's `data-action` (and optional `data-value`)
pub fn parse_action(action: &str, value: Option<&str>) -> Option<UiAction> {
    let action = match action {
        "script" => UiAction::SetScript(match value? {
            "katakana" => Script::Katakana,
            "hiragana" => Script::Hiragana,
            _ => return None,
        }),
        "setup" => UiAction::EnterSetup(Level::from_number(value?.parse().ok()?)?),
        "category" => UiAction::ToggleCategory(match value? {
            "base" => Category::Base,
            "voiced" => Category::Voiced,
            "combo" => Category::Combo,
            _ => return None,
        }),
        "back" => UiAction::BackToMenu,
        "launch" => UiAction::Launch,
        "try-again" => UiAction::TryAgain,
        "answer" => UiAction::Command(Command::Answer(value?.to_string())),
        "pause" => UiAction::Command(Command::TogglePause),
        "quit" => UiAction::Command(Command::Quit),
        "mute" => UiAction::Command(Command::ToggleMute),
        "lang" => UiAction::Command(Command::ToggleLanguage),
        "about" => UiAction::Command(Command::OpenAbout),
        "close-about" => UiAction::Command(Command::CloseAbout),
        _ => return None,
    };
    Some(action)
}

/// Route a UI action to the session
pub fn apply_action<B: AudioBackend, S: KeyValueStore>(
    session: &mut Session<B, S>,
    action: UiAction,
) {
    match action {
        UiAction::SetScript(script) => session.set_script(script),
        UiAction::EnterSetup(level) => {
            session.enter_setup(level);
        }
        UiAction::ToggleCategory(category) => session.toggle_category(category),
        UiAction::BackToMenu => {
            session.back_to_menu();
        }
        UiAction::Launch => {
            if let Err(e) = session.launch() {
                log::info!("Launch refused: {}", e);
            }
        }
        UiAction::TryAgain => {
            session.try_again();
        }
        UiAction::Command(command) => session.handle(command),
    }
}
