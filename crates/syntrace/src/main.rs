#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::struct_excessive_bools
)]
#![forbid(unsafe_code)]

use crate::config::SyntraceConfig;
use clap::Parser;
use config::Args;
use syntrace_privilege::Privilege;

mod app;
mod config;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let privilege = Privilege::acquire_privileges()?;
    let cfg = SyntraceConfig::from(args, &privilege)?;
    app::run_syntrace(&cfg)
}
