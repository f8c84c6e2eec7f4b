//! `dockenv` application entry point.
//!
//! Resolves container engine connection settings from the process
//! environment and translates container declarations into engine shapes.
//! Domain errors stay typed inside `run`; the binary boundary converts them
//! into `eyre` reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/dockenv/config.toml` or path from `DOCKENV_CONFIG_PATH`)
//! 3. Environment variables (`DOCKENV_*`)
//! 4. Command-line arguments

use clap::Parser;
use dockenv::config::{Cli, Commands, DockenvConfig, PortsArgs, VolumesArgs, load_config};
use dockenv::engine::{
    EnvironmentSnapshot, translate_binds, translate_ports, translate_volumes,
    translate_volumes_from,
};
use dockenv::error::Result as DockenvResult;
use eyre::{Report, Result as EyreResult};
use mockable::{DefaultEnv, Env};
use ortho_config::serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    let env = DefaultEnv::new();

    init_tracing(&env, &cli.log_level)?;

    let config = load_config(&cli, &env).map_err(Report::from)?;
    let snapshot = EnvironmentSnapshot::capture(&env);

    run(&cli, &config, &snapshot).map_err(Report::from)
}

/// Install a stderr subscriber. `RUST_LOG` takes full control when set;
/// otherwise only this crate logs, at `level`.
fn init_tracing<E: Env>(env: &E, level: &str) -> EyreResult<()> {
    let directives = env
        .string("RUST_LOG")
        .unwrap_or_else(|| format!("dockenv={level}"));
    let filter = EnvFilter::try_new(directives)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(cli: &Cli, config: &DockenvConfig, snapshot: &EnvironmentSnapshot) -> DockenvResult<()> {
    match &cli.command {
        Commands::Env => print_environment(config, snapshot),
        Commands::Binds => print_binds(config, snapshot),
        Commands::Ports(args) => print_ports(args),
        Commands::Volumes(args) => {
            print_volumes(args);
            Ok(())
        }
        Commands::Check => check_client(config, snapshot),
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_environment(config: &DockenvConfig, snapshot: &EnvironmentSnapshot) -> DockenvResult<()> {
    let environment = config.resolver().resolve(snapshot)?;
    for assignment in environment.environment_variables() {
        println!("{assignment}");
    }
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_binds(config: &DockenvConfig, snapshot: &EnvironmentSnapshot) -> DockenvResult<()> {
    let environment = config.resolver().resolve(snapshot)?;
    let mapping = environment.host_volume_bindings();
    for bind in translate_binds(mapping.as_ref()).unwrap_or_default() {
        println!("{bind}");
    }
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_ports(args: &PortsArgs) -> DockenvResult<()> {
    let Some(declarations) = translate_ports(&args.expose, &args.publish)? else {
        return Ok(());
    };
    let output = json!({
        "exposed_ports": declarations.exposed_port_keys(),
        "port_bindings": declarations.host_port_bindings(),
    });
    println!("{output:#}");
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_volumes(args: &VolumesArgs) {
    for volume in translate_volumes(&args.volumes).unwrap_or_default() {
        println!("volume {volume}");
    }
    let shared = translate_volumes_from(&args.volumes_from);
    if !shared.is_empty() {
        println!("volumes-from {shared}");
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn check_client(config: &DockenvConfig, snapshot: &EnvironmentSnapshot) -> DockenvResult<()> {
    let environment = config.resolver().resolve(snapshot)?;
    let api_version = config.api_version()?;
    let builder = config.client_builder();
    builder.build(&environment, api_version)?;
    let host = if environment.tls_verify() {
        builder.tls_host(environment.host())?
    } else {
        environment.host().to_owned()
    };
    println!(
        "engine client ready: host={host} tls={} api={api_version}",
        environment.tls_verify(),
    );
    Ok(())
}
