// Tuning constants shared by the web and native front-ends.

// Synthesis
pub const PEAK_GAIN: f64 = 0.4;
pub const RELEASE_TAIL_SEC: f64 = 0.1; // final ramp to silence
pub const STOP_PAD_SEC: f64 = 0.5; // oscillator stops this long after the release stage ends

// Depth (world z) to pitch mapping
pub const DEPTH_MIN: f32 = -50.0;
pub const DEPTH_MAX: f32 = 50.0;
pub const FREQ_MIN_HZ: f32 = 150.0;
pub const FREQ_MAX_HZ: f32 = 600.0;

// Floor grid
pub const GRID_SIZE: usize = 25;
pub const TILE_SIZE: f32 = 4.0;
pub const TILE_GAP: f32 = 0.2;
pub const TILE_HEIGHT: f32 = 0.2;

// Playback
pub const FINISH_DELAY_MS: f64 = 1000.0; // after the last trigger

// Offline render and export
pub const SAMPLE_RATE: u32 = 44_100;
pub const RENDER_CHANNELS: usize = 2;
pub const RENDER_TAIL_SEC: f64 = 2.0;
pub const MAX_RENDER_SEC: f64 = 600.0;
pub const BLOCK_FRAMES: usize = 1152; // samples per channel per encoder block
pub const EXPORT_FILE_PREFIX: &str = "Soundscape";

// Share links
pub const SHARE_QUERY_PARAM: &str = "state";
