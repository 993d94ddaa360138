use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use fqarc::progress::{ByteNum, ProgressNotifier};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

#[derive(Debug)]
struct FqarcProgressBarState {
    length: u64,
    pass: Option<String>,
    initialized: bool,
}

impl FqarcProgressBarState {
    fn new() -> Self {
        Self {
            length: 0,
            pass: None,
            initialized: false,
        }
    }
}

/// Byte-based progress bar shared by the logger and the library's
/// [`ProgressNotifier`] callbacks.
#[derive(Debug, Clone)]
pub(crate) struct FqarcProgressBar {
    bar: ProgressBar,
    state: Arc<Mutex<FqarcProgressBarState>>,
}

impl FqarcProgressBar {
    pub fn new() -> FqarcProgressBar {
        let init_bar = ProgressBar::hidden();
        init_bar.set_style(ProgressStyle::default_spinner());
        init_bar.enable_steady_tick(Duration::from_millis(50));
        init_bar.set_message("Initializing...");

        Self {
            bar: init_bar,
            state: Arc::new(Mutex::new(FqarcProgressBarState::new())),
        }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    fn state(&self) -> MutexGuard<'_, FqarcProgressBarState> {
        // the state stays consistent even if a holder panicked
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[inline]
    fn init(&self) {
        let mut state = self.state();
        if state.initialized {
            return;
        }

        if state.length != 0 {
            self.bar.set_length(state.length);
        }
        self.bar.set_position(0);
        self.bar
            .set_message(state.pass.clone().unwrap_or_default());

        let template = if state.length == 0 {
            "{spinner} {msg} {bytes}/? ({bytes_per_sec})"
        } else {
            "{msg} {wide_bar} {bytes}/{total_bytes} [ETA {eta}]"
        };
        let style = if state.length == 0 {
            ProgressStyle::default_spinner()
        } else {
            ProgressStyle::default_bar()
        };
        self.bar.set_style(
            style
                .template(template)
                .expect("Invalid progress bar template"),
        );

        state.initialized = true;
    }

    pub fn set_total_bytes(&self, length: u64) {
        let mut state = self.state();

        state.initialized = false;
        state.length = length;
    }

    pub fn inc(&self, value: u64) {
        self.init();
        self.bar.inc(value);
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }
}

impl ProgressNotifier for FqarcProgressBar {
    fn processed_bytes(&self, bytes: ByteNum) {
        self.inc(bytes.get() as u64);
    }

    fn start_pass(&self, name: &str) {
        let mut state = self.state();

        state.initialized = false;
        state.pass = Some(name.to_owned());
    }
}
