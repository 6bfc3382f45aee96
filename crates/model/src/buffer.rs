/// Decoded audio sample data held in a song's audio pool.
///
/// Samples are stored interleaved: for stereo, the layout is
/// `[L, R, L, R, ...]`. A frame is one sample per channel, so a stereo
/// buffer with 4 samples has 2 frames.
///
/// # Examples
///
/// ```
/// use loopgrid_model::SampleBuffer;
///
/// let buffer = SampleBuffer::new(vec![0.0, 0.5, 1.0, 0.5], 44100, 2);
/// assert_eq!(buffer.frames(), 2);
/// assert_eq!(buffer.channels(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    /// Create a buffer from interleaved sample data.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is 0 or if `samples.len()` is not divisible by
    /// `channels`.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        assert!(channels > 0, "channels must be greater than 0");
        assert_eq!(
            samples.len() % channels as usize,
            0,
            "samples.len() must be divisible by channels"
        );
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// All interleaved samples.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels.
    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Iterator over one channel's samples.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is >= `self.channels()`.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        assert!(
            channel < self.channels as usize,
            "channel index out of bounds"
        );
        let channels = self.channels as usize;
        (0..self.frames()).map(move |frame| self.samples[frame * channels + channel])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_buffer_new() {
        let buffer = SampleBuffer::new(vec![0.0, 0.1, 0.2, 0.3], 44100, 2);

        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 2);
        assert!(!buffer.is_empty());
    }

    #[test]
    #[should_panic(expected = "channels must be greater than 0")]
    fn test_sample_buffer_zero_channels() {
        SampleBuffer::new(vec![0.0], 44100, 0);
    }

    #[test]
    #[should_panic(expected = "samples.len() must be divisible by channels")]
    fn test_sample_buffer_invalid_length() {
        // 5 samples with 2 channels is invalid
        SampleBuffer::new(vec![0.0, 0.1, 0.2, 0.3, 0.4], 44100, 2);
    }

    #[test]
    fn test_sample_buffer_channel_iterator() {
        let samples = vec![0.0, 1.0, 0.5, 1.5, 0.25, 1.25]; // 3 frames, 2 channels
        let buffer = SampleBuffer::new(samples, 44100, 2);

        let left: Vec<f32> = buffer.channel(0).collect();
        assert_eq!(left, vec![0.0, 0.5, 0.25]);

        let right: Vec<f32> = buffer.channel(1).collect();
        assert_eq!(right, vec![1.0, 1.5, 1.25]);
    }

    #[test]
    #[should_panic(expected = "channel index out of bounds")]
    fn test_sample_buffer_channel_out_of_bounds() {
        let buffer = SampleBuffer::new(vec![0.0, 0.0], 44100, 2);
        let _: Vec<f32> = buffer.channel(2).collect();
    }

    #[test]
    fn test_sample_buffer_duration() {
        // 44100 frames at 44100 Hz = 1 second
        let buffer = SampleBuffer::new(vec![0.0; 44100 * 2], 44100, 2);
        assert!((buffer.duration_secs() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_buffer_empty() {
        let buffer = SampleBuffer::new(vec![], 44100, 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.frames(), 0);
    }
}
