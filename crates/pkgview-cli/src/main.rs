use std::{fs, rc::Rc};

use clap::Parser;
use cli::{Args, Commands};
use logging::setup_logging;
use pkgview_config::config::{
    self, config_path, generate_default_config, get_config, set_config_path, Config,
};
use pkgview_core::{
    enumerator::PackageEnumerator,
    error::{ErrorContext, PkgviewError},
    models::SortOption,
    registry::DesktopRegistry,
    PkgviewResult,
};
use pkgview_operations::PackagesPresenter;
use pkgview_utils::path::resolve_path;
use tracing::{debug, info, warn};
use utils::{set_flag, COLOR, PROGRESS};
use view::TerminalView;

mod cli;
mod logging;
mod progress;
mod utils;
mod view;

fn list_applications(
    include_system: Option<bool>,
    sort: Option<pkgview_config::listing::SortKey>,
    sync: bool,
    json: bool,
) -> PkgviewResult<()> {
    let config = get_config();
    let include_system = include_system.unwrap_or_else(|| config.include_system());
    let sort = SortOption::from(sort.unwrap_or_else(|| config.sort()));

    let enumerator = PackageEnumerator::from_config(&config)?;
    let descriptor = enumerator
        .sort_options()
        .into_iter()
        .find(|descriptor| descriptor.option() == sort);

    let view = Rc::new(TerminalView::new(json));
    let mut presenter = PackagesPresenter::new(&view, enumerator);

    debug!(include_system, ?sort, sync, "listing applications");
    if sync {
        presenter.load_data_sync(include_system, descriptor.as_ref());
    } else {
        presenter.load_data_async(include_system, descriptor.as_ref())?;
        presenter.wait_for_loads();
    }

    Ok(())
}

fn show_sort_options(json: bool) -> PkgviewResult<()> {
    let enumerator = PackageEnumerator::from_config(&get_config())?;
    let view = Rc::new(TerminalView::new(json));
    PackagesPresenter::new(&view, enumerator).load_sort_options();
    Ok(())
}

fn show_config() -> PkgviewResult<()> {
    let config_path = config_path();
    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found", config_path.display());
            toml::to_string_pretty(&Config::default_config())
                .map_err(|err| PkgviewError::Config(err.into()))?
        }
        Err(err) => {
            return Err(PkgviewError::IoError {
                action: "reading config".to_string(),
                source: err,
            });
        }
    };
    info!("{}", content);
    Ok(())
}

fn show_env() -> PkgviewResult<()> {
    let config = get_config();
    let registry = DesktopRegistry::from_config(&config)?;

    info!("PKGVIEW_CONFIG={}", config_path().display());
    for dir in registry.application_dirs() {
        let scope = if dir.system { "system" } else { "user" };
        info!("APPLICATIONS[{scope}]={}", dir.path.display());
    }
    for dir in config.get_icon_dirs()? {
        info!("ICONS={}", dir.display());
    }
    info!("LOCALE={}", config.locale().unwrap_or_default());
    Ok(())
}

fn handle_cli() -> PkgviewResult<()> {
    let args = Args::parse();

    setup_logging(&args)?;

    if args.no_color {
        set_flag(&COLOR, false);
    }

    if args.no_progress || args.json {
        set_flag(&PROGRESS, false);
    }

    if let Some(ref c) = args.config {
        set_config_path(resolve_path(c)?);
    }

    match args.command {
        Commands::DefConfig => generate_default_config()?,
        command => {
            config::init()?;

            match command {
                Commands::List {
                    system,
                    sort,
                    sync,
                } => list_applications(system, sort, sync, args.json)?,
                Commands::SortOptions => show_sort_options(args.json)?,
                Commands::Config => show_config()?,
                Commands::Env => show_env()?,
                Commands::DefConfig => unreachable!(),
            }

            progress::stop();
        }
    }

    std::io::Write::flush(&mut std::io::stdout())
        .with_context(|| "flushing stdout stream".to_string())?;

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
