use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_yellow};

/// Spinner shown on stderr while a request is in flight
pub struct FetchProgress {
    pb: ProgressBar,
}

impl FetchProgress {
    pub fn start(message: &str) -> Self {
        let pb = create_spinner(bright_yellow(message).to_string());
        Self { pb }
    }

    pub fn finish(self, message: &str) {
        self.pb
            .finish_with_message(bright_green(format!("{message} ✓")).to_string());
    }

    pub fn abandon(self) {
        self.pb.abandon();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(ProgressStyle::default_spinner().template("  {msg} {spinner}").unwrap());
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
