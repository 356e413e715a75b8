//! Sequence engine for the soundscape instrument.
//!
//! Everything here is platform-free: the web and native front-ends supply a
//! live [`ToneSink`], a [`Scheduler`] and a [`Clock`], and drive a [`Session`].

pub mod clock;
pub mod codec;
pub mod constants;
pub mod container;
pub mod controls;
pub mod error;
pub mod export;
pub mod input;
pub mod kits;
pub mod layout;
pub mod player;
pub mod recorder;
pub mod render;
pub mod scheduler;
pub mod sequence;
pub mod session;
pub mod synth;
pub mod themes;

pub use clock::*;
pub use codec::{SharedNote, SharedState};
pub use constants::*;
pub use container::*;
pub use controls::*;
pub use error::*;
pub use export::*;
pub use input::*;
pub use kits::*;
pub use layout::*;
pub use player::*;
pub use recorder::*;
pub use render::*;
pub use scheduler::*;
pub use sequence::*;
pub use session::*;
pub use synth::*;
pub use themes::*;
