use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use ringlog_kernel::{KernelLog, Klogctl, Kmsg};
use ringlog_types::ColorMode;

mod config;
mod controller;

use config::{FileConfig, Mode, Settings};

/// ringlog - print or control the kernel ring buffer
#[derive(Parser, Debug)]
#[command(name = "ringlog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Clear the ring buffer
    #[arg(short = 'C', long = "clear", conflicts_with = "console_level")]
    clear: bool,

    /// Clear the ring buffer after printing
    #[arg(short = 'c', long = "read-clear")]
    read_clear: bool,

    /// Set kernel console logging LEVEL (1-9)
    #[arg(
        short = 'n',
        long = "console-level",
        value_name = "LEVEL",
        value_parser = clap::value_parser!(u8).range(1..=9)
    )]
    console_level: Option<u8>,

    /// Raw output (with <level markers>)
    #[arg(short = 'r', long, conflicts_with = "notime")]
    raw: bool,

    /// Don't print kernel's timestamps
    #[arg(short = 't', long)]
    notime: bool,

    /// Show the last SIZE many bytes (legacy ring buffer read)
    #[arg(
        short = 's',
        long = "buffer-size",
        value_name = "SIZE",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    buffer_size: Option<u64>,

    /// Keep waiting for more output (aka --follow)
    #[arg(short = 'w', long)]
    follow: bool,

    /// Colorize output: auto, always or never
    #[arg(long, value_name = "WHEN")]
    color: Option<ColorMode>,

    /// Config file (defaults to ~/.config/ringlog/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout carries only the log
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ringlog: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let file = FileConfig::load(args.config.as_deref())?;
    let settings = Settings::resolve(&args, file, io::stdout().is_terminal());
    let klog = Klogctl;

    match settings.mode {
        Mode::ConsoleLevel(level) => {
            klog.set_console_level(level).context("klogctl console level")?;
        }
        Mode::Clear => {
            klog.clear().context("klogctl clear")?;
        }
        Mode::Read => {
            let mut out = io::stdout().lock();
            let completed = controller::run(
                || Kmsg::open(&settings.kmsg_path, settings.follow),
                &klog,
                &settings,
                &mut out,
            )?;
            debug!(?completed, "Finished reading kernel log");
        }
    }

    Ok(())
}
