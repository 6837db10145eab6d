//! Profile command - show and create client profiles.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use dutyrefund::core::ClientProfile;

#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileCommand,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Print a profile as JSON
    Show {
        /// Built-in preset: netherlands or direct
        #[arg(long)]
        preset: Option<String>,

        /// Profile file to validate and print
        #[arg(long, conflicts_with = "preset")]
        file: Option<PathBuf>,
    },

    /// Write the default profile to a file
    Init(InitArgs),
}

#[derive(Args)]
struct InitArgs {
    /// Output path for the profile
    path: PathBuf,

    /// Start from a preset instead of the default
    #[arg(long)]
    preset: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ProfileArgs) -> anyhow::Result<()> {
    match args.command {
        ProfileCommand::Show { preset, file } => show(preset.as_deref(), file),
        ProfileCommand::Init(init_args) => init(init_args),
    }
}

fn preset(name: Option<&str>) -> anyhow::Result<ClientProfile> {
    match name {
        Some(name) => ClientProfile::preset(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown preset '{}' (expected netherlands or direct)", name)),
        None => Ok(ClientProfile::default()),
    }
}

fn show(name: Option<&str>, file: Option<PathBuf>) -> anyhow::Result<()> {
    let profile = match file {
        Some(path) => super::load_profile(Some(path.as_path()))?,
        None => preset(name)?,
    };
    println!("{}", profile.to_json_string()?);
    Ok(())
}

fn init(args: InitArgs) -> anyhow::Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "Profile already exists at {}. Use --force to overwrite.",
            args.path.display()
        );
    }

    if let Some(parent) = args.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let profile = preset(args.preset.as_deref())?;
    fs::write(&args.path, profile.to_json_string()?)?;

    println!("Created profile '{}' at {}", profile.name, args.path.display());
    Ok(())
}
