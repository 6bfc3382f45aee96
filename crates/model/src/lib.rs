pub mod buffer;
pub mod clip;
pub mod notify;
pub mod song;

pub use buffer::SampleBuffer;
pub use clip::{Clip, ClipId, ClipState};
pub use notify::{Notifier, UpdateObserver};
pub use song::{Song, SongError};
