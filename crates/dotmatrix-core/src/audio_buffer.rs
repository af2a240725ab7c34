/// Bounded buffer of interleaved unsigned 16-bit stereo samples at the APU
/// rate (one pair per two CPU cycles, ~2 MHz).
///
/// The emulator thread appends pairs while it runs; the host copies
/// [`SampleBuffer::samples`] and calls [`SampleBuffer::clear`] between
/// consecutive returns from `run_until_event`, under whatever lock it shares
/// with its audio callback. The buffer itself is single-threaded.
///
/// The buffer is lossy when full: new pushes are dropped and counted.
pub struct SampleBuffer {
    data: Vec<u16>,
    capacity: usize,
    dropped: u64,
}

/// Default capacity in samples (two per stereo frame): enough for the samples
/// produced between host audio callbacks at common callback sizes, with the
/// slack a worst-case instruction can add. Hosts with unusual callback
/// periods can size their own with [`SampleBuffer::with_capacity`]:
/// `callback_frames * (2_097_152 / host_sample_rate) * 2 + 256`.
pub const DEFAULT_BUFFER_SAMPLES: usize = 4096 * 48 * 2 + 256;

impl SampleBuffer {
    pub fn with_capacity(capacity_samples: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity_samples),
            capacity: capacity_samples,
            dropped: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SAMPLES)
    }

    /// Append one stereo pair (SO1 terminal first). Returns false if the
    /// buffer was full and the pair was dropped.
    pub fn push_stereo(&mut self, so1: u16, so2: u16) -> bool {
        if self.data.len() + 2 > self.capacity {
            self.dropped += 2;
            return false;
        }
        self.data.push(so1);
        self.data.push(so2);
        true
    }

    /// Number of queued samples (individual u16 values, not frames).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples dropped because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn samples(&self) -> &[u16] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
