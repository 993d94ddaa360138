use std::fmt::Debug;
use std::time::Instant;

use derive_more::{Add, AddAssign};
use number_prefix::NumberPrefix;

/// Number of bytes of FASTQ input processed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Add, AddAssign)]
#[repr(transparent)]
pub struct ByteNum(usize);

impl ByteNum {
    pub const ZERO: ByteNum = ByteNum(0);

    #[inline]
    #[must_use]
    pub const fn new(bytes: usize) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Receives progress updates from long-running archive operations.
pub trait ProgressNotifier: Debug + Send + Sync {
    fn processed_bytes(&self, bytes: ByteNum);

    /// Called when a new pass over the input starts (profiling, encoding).
    fn start_pass(&self, name: &str);
}

impl<T: ProgressNotifier> ProgressNotifier for &T {
    fn processed_bytes(&self, bytes: ByteNum) {
        T::processed_bytes(self, bytes)
    }

    fn start_pass(&self, name: &str) {
        T::start_pass(self, name)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct DummyProgressNotifier;

impl ProgressNotifier for DummyProgressNotifier {
    fn processed_bytes(&self, _bytes: ByteNum) {
        // do nothing
    }

    fn start_pass(&self, _name: &str) {
        // do nothing
    }
}

#[must_use]
pub(crate) fn format_stats(start_time: Instant, bytes: ByteNum) -> String {
    let elapsed = start_time.elapsed();

    let rate = bytes.get() as f32 / elapsed.as_secs_f32();
    let rate_human = match NumberPrefix::decimal(rate) {
        NumberPrefix::Standalone(bytes) => {
            format!("{} B/s", bytes)
        }
        NumberPrefix::Prefixed(prefix, n) => {
            format!("{:.3} {}B/s", n, prefix)
        }
    };

    format!(
        "{} in {:.2}s ({})",
        format_bytes(bytes),
        elapsed.as_secs_f32(),
        rate_human,
    )
}

#[must_use]
pub fn format_bytes(bytes: ByteNum) -> String {
    match NumberPrefix::decimal(bytes.get() as f32) {
        NumberPrefix::Standalone(bytes) => {
            format!("{} bytes", bytes)
        }
        NumberPrefix::Prefixed(prefix, n) => {
            format!("{:.2} {}B", n, prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::progress::{format_bytes, ByteNum, DummyProgressNotifier, ProgressNotifier};

    #[test]
    fn test_dummy_progress_notifier() {
        let notifier = DummyProgressNotifier;
        notifier.start_pass("profile");
        notifier.processed_bytes(ByteNum::new(1337));
        (&notifier).processed_bytes(ByteNum::new(666));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(ByteNum::new(12)), "12 bytes");
        assert_eq!(format_bytes(ByteNum::new(1_500_000)), "1.50 MB");
    }

    #[test]
    fn test_byte_num_add() {
        let mut total = ByteNum::ZERO;
        total += ByteNum::new(3);
        assert_eq!(total + ByteNum::new(4), ByteNum::new(7));
    }
}
