use crate::kits::SoundKit;

/// What a key press asks the instrument to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ToggleRecording,
    Play,
    Stop,
    Clear,
    SelectKit(SoundKit),
}

/// Where the key press happened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyContext {
    /// Focus is inside a text field (e.g. the share link box).
    pub in_text_input: bool,
    pub meta: bool,
    pub ctrl: bool,
}

#[inline]
pub fn kit_for_digit(key: &str) -> Option<SoundKit> {
    match key {
        "1" | "2" | "3" | "4" => key.parse().ok().and_then(SoundKit::from_digit),
        _ => None,
    }
}

/// Map a `KeyboardEvent.key` value to an action. Typing in text fields and
/// platform shortcuts (meta/ctrl held) are left alone.
pub fn action_for_key(key: &str, ctx: KeyContext) -> Option<Action> {
    if ctx.in_text_input || ctx.meta || ctx.ctrl {
        return None;
    }
    if let Some(kit) = kit_for_digit(key) {
        return Some(Action::SelectKit(kit));
    }
    match key {
        "r" | "R" => Some(Action::ToggleRecording),
        "p" | "P" => Some(Action::Play),
        "s" | "S" => Some(Action::Stop),
        "c" | "C" => Some(Action::Clear),
        _ => None,
    }
}
