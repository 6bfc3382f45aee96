use std::fmt;

/// Playback state of a clip on the grid.
///
/// The grid only toggles between the paired states; advancing `Starting`
/// to `Playing` (and `Stopping` to `Stopped`) at the right beat boundary
/// is the playback clock's job, outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    Stopped,
    Starting,
    Playing,
    Stopping,
}

impl ClipState {
    /// Toggle between the paired states: Stopped<->Starting and
    /// Playing<->Stopping. Applying it twice returns the original state.
    pub fn toggle(self) -> Self {
        match self {
            ClipState::Stopped => ClipState::Starting,
            ClipState::Starting => ClipState::Stopped,
            ClipState::Playing => ClipState::Stopping,
            ClipState::Stopping => ClipState::Playing,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ClipState::Starting | ClipState::Playing)
    }
}

impl fmt::Display for ClipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClipState::Stopped => "stopped",
            ClipState::Starting => "starting",
            ClipState::Playing => "playing",
            ClipState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Stable handle to a clip placed in a [`Song`](crate::Song).
///
/// Handles are assigned by the song on placement and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub u64);

/// One audio loop placed (or about to be placed) on the grid.
///
/// A clip references its audio by an opaque source identifier; the decoded
/// samples live in the song's audio pool under the same key. All playback
/// parameters are plain fields - nothing is validated at construction, the
/// accessors and the archive codec check what they need.
#[derive(Debug, Clone)]
pub struct Clip {
    /// Audio source identifier, the key into the song's audio pool.
    pub audio_file: String,
    /// Display name, defaults to the source identifier.
    pub name: String,
    /// Per-clip gain applied by the sample-window accessor.
    pub volume: f32,
    /// Loop start offset into the buffer, in frames.
    pub frame_offset: u64,
    /// Loop start offset within the beat.
    pub beat_offset: f64,
    /// Integer subdivision of a beat used to align the loop point to the
    /// song's tempo grid.
    pub beat_diviser: u32,
    pub state: ClipState,
    /// Playback cursor, advanced by the external playback clock.
    pub cursor: u64,
    pub(crate) position: Option<(usize, usize)>,
}

impl Clip {
    pub fn new(audio_file: impl Into<String>) -> Self {
        let audio_file = audio_file.into();
        Self {
            name: audio_file.clone(),
            audio_file,
            volume: 1.0,
            frame_offset: 0,
            beat_offset: 0.0,
            beat_diviser: 1,
            state: ClipState::Stopped,
            cursor: 0,
            position: None,
        }
    }

    /// Grid coordinates, present while the clip is placed in a song.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involutive() {
        for state in [
            ClipState::Stopped,
            ClipState::Starting,
            ClipState::Playing,
            ClipState::Stopping,
        ] {
            assert_eq!(state.toggle().toggle(), state);
        }
    }

    #[test]
    fn test_toggle_pairs() {
        assert_eq!(ClipState::Stopped.toggle(), ClipState::Starting);
        assert_eq!(ClipState::Starting.toggle(), ClipState::Stopped);
        assert_eq!(ClipState::Playing.toggle(), ClipState::Stopping);
        assert_eq!(ClipState::Stopping.toggle(), ClipState::Playing);
    }

    #[test]
    fn test_clip_defaults() {
        let clip = Clip::new("drums/kick.wav");

        assert_eq!(clip.audio_file, "drums/kick.wav");
        assert_eq!(clip.name, "drums/kick.wav");
        assert_eq!(clip.volume, 1.0);
        assert_eq!(clip.frame_offset, 0);
        assert_eq!(clip.beat_offset, 0.0);
        assert_eq!(clip.beat_diviser, 1);
        assert_eq!(clip.state, ClipState::Stopped);
        assert_eq!(clip.cursor, 0);
        assert_eq!(clip.position(), None);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ClipState::Starting.to_string(), "starting");
        assert!(!ClipState::Stopped.is_active());
        assert!(ClipState::Playing.is_active());
    }
}
