/// Which transport buttons are usable, derived from engine state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlStates {
    pub record: bool,
    pub play: bool,
    pub stop: bool,
    pub clear: bool,
    pub share: bool,
    pub download: bool,
}

impl ControlStates {
    pub fn derive(is_recording: bool, is_playing: bool, has_sequence: bool) -> Self {
        let idle_with_take = !is_playing && !is_recording && has_sequence;
        Self {
            record: !is_playing,
            play: idle_with_take,
            stop: is_playing || is_recording,
            clear: idle_with_take,
            share: idle_with_take,
            download: idle_with_take,
        }
    }
}
