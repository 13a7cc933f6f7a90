use std::cell::RefCell;

use indicatif::ProgressBar;
use nu_ansi_term::Color::{Cyan, Green};
use pkgview_core::models::{PackageEntry, SortDescriptor, SortOption};
use pkgview_operations::PackagesView;
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, Style, Width},
};
use tracing::{error, info};

use crate::{
    progress::{self, create_loading_job, set_percent},
    utils::{icon_or, term_width, Colored, Icons},
};

/// Terminal rendering of the application list.
pub struct TerminalView {
    json: bool,
    bar: RefCell<Option<ProgressBar>>,
}

impl TerminalView {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            bar: RefCell::new(None),
        }
    }
}

impl Drop for TerminalView {
    fn drop(&mut self) {
        if let Some(pb) = self.bar.get_mut().take() {
            pb.finish_and_clear();
        }
    }
}

pub fn sort_key_name(option: SortOption) -> &'static str {
    match option {
        SortOption::None => "none",
        SortOption::ByName => "name",
        SortOption::ByPackageId => "package",
    }
}

pub fn render_entries(entries: &[PackageEntry]) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Name", "Package", "System", "Icon"]);

    for entry in entries {
        let system = if entry.is_system() {
            icon_or(Icons::CHECK, "yes")
        } else {
            icon_or(Icons::NOT_SYSTEM, "no")
        };
        builder.push_record([
            Colored(Cyan, entry.display_name()).to_string(),
            entry.package_id().to_string(),
            system.to_string(),
            entry.icon().to_string(),
        ]);
    }

    builder
        .build()
        .with(Style::rounded())
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string()
}

pub fn render_sort_options(options: &[SortDescriptor]) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Key", "Description"]);

    for descriptor in options {
        builder.push_record([
            Colored(Green, sort_key_name(descriptor.option())).to_string(),
            descriptor.description().to_string(),
        ]);
    }

    builder.build().with(Style::rounded()).to_string()
}

fn sort_options_json(options: &[SortDescriptor]) -> serde_json::Value {
    options
        .iter()
        .map(|descriptor| {
            serde_json::json!({
                "key": sort_key_name(descriptor.option()),
                "description": descriptor.description(),
            })
        })
        .collect()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => progress::suspend(|| println!("{json}")),
        Err(err) => error!("Failed to serialize output: {err}"),
    }
}

impl PackagesView for TerminalView {
    fn show_progress(&self) {
        let mut bar = self.bar.borrow_mut();
        if let Some(pb) = bar.take() {
            pb.finish_and_clear();
        }
        *bar = Some(create_loading_job("Loading applications"));
    }

    fn show_percent_progress(&self, percent: u8) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            set_percent(pb, percent);
        }
    }

    fn hide_progress(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }

    fn show_data(&self, entries: &[PackageEntry]) {
        if self.json {
            print_json(entries);
            return;
        }

        let system_count = entries.iter().filter(|entry| entry.is_system()).count();
        info!("\n{}", render_entries(entries));
        info!(
            "{} {} applications ({} system)",
            icon_or(Icons::PACKAGE, "*"),
            Colored(Cyan, entries.len()),
            system_count
        );
    }

    fn show_sort_options(&self, options: &[SortDescriptor]) {
        if self.json {
            print_json(&sort_options_json(options));
            return;
        }

        info!(
            "{} Sort options\n{}",
            icon_or(Icons::SORT, "#"),
            render_sort_options(options)
        );
    }
}
