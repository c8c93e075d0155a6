// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    ffi::OsString,
    io::{Read, Write},
    panic,
    process::ExitCode,
    sync::Arc,
};

use anstream::{eprint, eprintln};
use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

use adjust_core::{
    adjust::AdjustContext,
    auth::StandardHTTPAuthentication,
    config::{
        Config, StoreLocation,
        local_fs::{get_config, load_configs},
    },
    describe::DescribeClient,
    store::{any::AnyStore, local_directory::LocalDirectoryStore, memory::MemoryStore},
};

use crate::{
    cli::{Args, Mode},
    commands::{
        adjust::command_adjust,
        info::{command_info, command_version},
        query::command_query,
    },
};

pub mod cli;
pub mod commands;
pub mod env_vars;
pub mod logger;
pub mod style;

mod error;
pub use error::CliError;

pub type Store = AnyStore<StandardHTTPAuthentication>;

pub fn lib_main<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    set_panic_hook();

    match Args::try_parse_from(args) {
        Ok(args) => {
            let input = std::io::stdin().lock();
            let output = std::io::stdout().lock();
            if let Err(err) = run_cli(args, input, output) {
                let style = style::ERROR;
                eprint!("{style}error{style:#}: ");
                for cause in err.chain() {
                    eprintln!("{}", cause);
                }
                return ExitCode::FAILURE;
            }
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(err.exit_code() as u8);
        }
    }
    ExitCode::SUCCESS
}

fn set_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        std::eprintln!(
            "The adjust driver crashed. This is a bug. Please report it together with\n\
            the details below and the settings document the driver was given."
        );
        default_hook(panic_info);
    }));
}

/// Runs the driver for already parsed arguments, reading the settings
/// document from `input` and writing protocol output to `output`.
pub fn run_cli<R: Read, W: Write>(args: Args, input: R, output: W) -> Result<()> {
    adjust_core::style::set_style_config(crate::style::CONFIG);

    match args.mode() {
        Mode::Version => return command_version(output),
        Mode::Info => return command_info(output),
        Mode::Query | Mode::Adjust => (),
    }

    let cwd = current_dir()?;
    let config = get_configs(&args, &cwd)?;

    let log_level = get_log_level(&args, &config);
    if logger::init(log_level).is_err() {
        let warn = style::WARN;
        eprintln!(
            "{warn}warning{warn:#}: failed to set up logger because it has already been set up;\n\
            {:>8} log messages may not be formatted properly",
            ' '
        );
        log::set_max_level(log_level);
    }

    let target = args.target.as_deref().ok_or(CliError::MissingTarget)?;

    let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build();
    let runtime = Arc::new(
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?,
    );

    let describer = DescribeClient::new(client.clone(), runtime.clone(), config.describe_endpoint());
    let inventory = config.inventory(&cwd);

    match args.mode() {
        Mode::Query => {
            let store = get_store(&config, &cwd, client, runtime).unwrap_or_else(|e| {
                log::warn!("ignoring stored settings: {e}");
                AnyStore::Memory(MemoryStore::new())
            });
            command_query(
                target,
                &inventory,
                &describer,
                &store,
                config.declarations(),
                output,
            )
        }
        _ => {
            let mut store = get_store(&config, &cwd, client, runtime)?;
            command_adjust(
                target,
                input,
                output,
                AdjustContext {
                    inventory: &inventory,
                    describer: &describer,
                    store: &mut store,
                    declarations: config.declarations(),
                    settle: config.settle(),
                },
            )
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(Utf8PathBuf::from_path_buf(cwd)
        .map_err(|path| CliError::InvalidDirectory(path.to_string_lossy().into_owned()))?)
}

/// The explicitly given configuration file takes precedence over discovered ones.
fn get_configs(args: &Args, cwd: &Utf8Path) -> Result<Config> {
    let mut config = if let Some(config_file) = &args.global_opts.config_file {
        get_config(config_file)?
    } else {
        Config::default()
    };

    if !args.global_opts.no_config {
        config.merge(load_configs(cwd)?);
    }

    Ok(config)
}

fn get_log_level(args: &Args, config: &Config) -> log::LevelFilter {
    let opts = &args.global_opts;
    let (verbose, quiet) = if opts.sets_log_level() {
        (opts.verbose, opts.quiet)
    } else {
        (
            config.verbose.unwrap_or(false),
            config.quiet.unwrap_or(false),
        )
    };

    match (verbose, quiet) {
        (true, _) => log::LevelFilter::Debug,
        (false, true) => log::LevelFilter::Error,
        (false, false) => log::LevelFilter::Info,
    }
}

/// Credentials for the HTTP settings store, from the environment.
pub fn get_store_auth() -> StandardHTTPAuthentication {
    if let Ok(token) = std::env::var(env_vars::ADJUST_STORE_TOKEN) {
        return StandardHTTPAuthentication::bearer(token);
    }

    match (
        std::env::var(env_vars::ADJUST_STORE_USER),
        std::env::var(env_vars::ADJUST_STORE_PASS),
    ) {
        (Ok(username), Ok(password)) => StandardHTTPAuthentication::basic(username, password),
        (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
            log::warn!(
                "both {} and {} are needed for basic authentication, sending no credentials",
                env_vars::ADJUST_STORE_USER,
                env_vars::ADJUST_STORE_PASS
            );
            StandardHTTPAuthentication::default()
        }
        (Err(_), Err(_)) => StandardHTTPAuthentication::default(),
    }
}

pub fn get_store(
    config: &Config,
    cwd: &Utf8Path,
    client: reqwest_middleware::ClientWithMiddleware,
    runtime: Arc<tokio::runtime::Runtime>,
) -> Result<Store> {
    Ok(match config.store_location(cwd)? {
        StoreLocation::Local(path) => AnyStore::Local(LocalDirectoryStore::new(path)),
        StoreLocation::Http(url) => {
            AnyStore::http(url, client, runtime, Arc::new(get_store_auth()))
        }
    })
}
