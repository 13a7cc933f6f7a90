use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pkgview_config::display::ProgressStyle as BarKind;

use crate::utils::{display_settings, progress_enabled};

/// Shared MultiProgress instance for suspend/stop from other modules.
static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

fn template_or_default(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or(fallback)
}

fn spinner_style() -> ProgressStyle {
    template_or_default("{spinner:.cyan} {msg}", ProgressStyle::default_spinner())
}

fn percent_style(kind: BarKind) -> ProgressStyle {
    match kind {
        BarKind::Classic => {
            template_or_default("{msg} [{bar:40}] {pos:>3}%", ProgressStyle::default_bar())
                .progress_chars("=> ")
        }
        BarKind::Modern => {
            template_or_default(
                "{spinner:.cyan} {msg}  {wide_bar:.cyan/dim}  {pos:>3}%",
                ProgressStyle::default_bar(),
            )
            .progress_chars("━━─")
        }
        BarKind::Minimal => template_or_default("{msg} {pos}%", ProgressStyle::default_bar()),
    }
}

/// Creates the job shown while applications load.
///
/// It starts as a spinner unless spinners are disabled, in which case it is a
/// percentage bar from the start.
pub fn create_loading_job(message: &str) -> ProgressBar {
    let settings = display_settings();
    let pb = if !progress_enabled() {
        MULTI.add(ProgressBar::hidden())
    } else if settings.spinners() {
        let pb = MULTI.add(ProgressBar::new_spinner());
        pb.set_style(spinner_style());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        let pb = MULTI.add(ProgressBar::new(100));
        pb.set_style(percent_style(settings.progress_style()));
        pb
    };
    pb.set_message(message.to_string());
    pb
}

/// Sets the percentage of a loading job, switching a spinner to a bar first.
pub fn set_percent(pb: &ProgressBar, percent: u8) {
    if pb.length().is_none() {
        pb.set_length(100);
        pb.set_style(percent_style(display_settings().progress_style()));
    }
    pb.set_position(u64::from(percent));
}
