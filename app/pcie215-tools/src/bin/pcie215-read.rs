use std::{env, path::Path, process::ExitCode};

use anyhow::{Result, anyhow, bail};
use clap::{ArgAction, Parser};
use irq_wait::Error;
use log::warn;
use nix::errno::Errno;
use pcie215_tools::{
    config::{CONFIG_ENV, Config, DEFAULT_CONFIG_PATH},
    open, setup,
};

/// Blocks until the PCIe-215 raises an interrupt on an enabled pin.
#[derive(Parser, Debug)]
#[command(version, about, disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    #[arg(long, action = ArgAction::SetTrue)]
    help: bool,
}

fn usage(name: &str, config: &Config) {
    let path = config.device.path.display();
    eprintln!();
    eprintln!("usage:\t {name} --help");
    eprintln!();
    eprintln!("     \t No arguments. Program will open [{path}] read-write");
    eprintln!("     \t and issue a zero-length read on it. The read blocks");
    eprintln!("     \t until an interrupt arrives on one of the enabled pins");
    eprintln!("     \t (use pcie215-ioctl to configure them).");
    eprintln!();
    eprintln!("     \t Config: ${CONFIG_ENV} or {DEFAULT_CONFIG_PATH}.");
    eprintln!();
}

fn run(config: &Config) -> Result<()> {
    let path = config.device.path.display();
    let mut handle = open(config)
        .map_err(|e| anyhow!("Err, can't open [{path}].\nIs the driver running? ({e})"))?;

    let res = match config.wait.timeout() {
        Some(timeout) => handle.wait_for_interrupt_timeout(timeout),
        None => handle.wait_for_interrupt(),
    };

    match res {
        Ok(()) => {
            eprintln!("OK, read [0].");
            Ok(())
        }
        Err(Error::Interrupted) => {
            if let Some(timeout) = config.wait.timeout() {
                warn!("no interrupt within {timeout:?}");
            }
            bail!(
                "Err, interrupted by signal, read [-1] errno [{}][{}].",
                Errno::EINTR as i32,
                Errno::EINTR.desc()
            )
        }
        Err(e) => {
            let code = e.code().unwrap_or(Errno::EIO as i32);
            bail!(
                "Err, read failed [-1] errno [{code}][{}].",
                Errno::from_i32(code).desc()
            )
        }
    }
}

fn main() -> ExitCode {
    let name = env::args()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "pcie215-read".into());

    let config = match setup() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Err, {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Any argument, `--help` included, only prints the usage.
    match Cli::try_parse() {
        Ok(cli) if !cli.help => {}
        _ => {
            usage(&name, &config);
            return ExitCode::FAILURE;
        }
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
