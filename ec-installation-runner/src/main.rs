mod logging;

/// The ec-installation-runner executable
///
/// Exercises the unknown configuration properties round trip on files. This
/// is not needed by a running cluster, which works on stored records.
use std::{
    io::IsTerminal as _,
    path::{Path, PathBuf},
    process::exit,
};

use anyhow::Result;
use clap::{ColorChoice, CommandFactory as _, Parser, Subcommand};
use ec_installation::{installation_scheme, Installation};
use ec_installation_runner as runner;

fn main() {
    let args = Args::parse();
    handle_result(run_args(args));
}

fn run_args(args: Args) -> Result<()> {
    logging::set_up(&to_logging_options(&args.options))?;
    run_command(&args.command)
}

fn run_command(command: &Commands) -> Result<()> {
    match command {
        Commands::Store {
            installation,
            config,
            in_place,
        } => {
            let scheme = installation_scheme()?;
            let result = runner::store(&scheme, installation, config)?;
            output_installation(&result, installation, *in_place)
        }
        Commands::Apply {
            installation,
            in_place,
        } => {
            let scheme = installation_scheme()?;
            let (result, _outcome) = runner::apply(&scheme, installation)?;
            output_installation(&result, installation, *in_place)
        }
        Commands::Diff { source, target } => {
            print!("{}", runner::diff(source, target)?);
            Ok(())
        }
        Commands::Merge { document, patch } => {
            print!("{}", runner::merge(document, patch)?);
            Ok(())
        }
        Commands::GenerateMan => {
            let cmd = Args::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buffer: Vec<u8> = Default::default();
            man.render(&mut buffer)?;
            println!("{}", String::from_utf8(buffer)?);
            Ok(())
        }
        Commands::GenerateMarkdown => {
            let opts = clap_markdown::MarkdownOptions::new().show_footer(false);
            let markdown: String = clap_markdown::help_markdown_custom::<Args>(&opts);
            println!("{}", markdown);
            Ok(())
        }
    }
}

fn output_installation(installation: &Installation, path: &Path, in_place: bool) -> Result<()> {
    if in_place {
        runner::write_installation(installation, path)
    } else {
        print!("{}", runner::installation_to_yaml(installation)?);
        Ok(())
    }
}

fn to_logging_options(options: &Options) -> logging::Options {
    logging::Options {
        verbose: options.verbose,
        color: match options.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stderr().is_terminal(),
        },
    }
}

fn handle_result(r: Result<()>) {
    match r {
        Ok(()) => {}
        Err(e) => {
            eprintln!("ec-installation-runner error: {}, {:#}", e.root_cause(), e);
            exit(1);
        }
    }
}

/// Store and apply unknown configuration properties of Installation files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: Options,
}

#[derive(Parser, Debug, Clone)]
struct Options {
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the desired configuration of an Installation, storing the fields
    /// this version does not know as unknown config properties
    Store {
        /// The Installation file, YAML or JSON
        #[arg(long)]
        installation: PathBuf,

        /// The new configuration document, YAML or JSON
        #[arg(long)]
        config: PathBuf,

        /// Overwrite the Installation file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },

    /// Apply the unknown config properties of an Installation to its config
    Apply {
        /// The Installation file, YAML or JSON
        #[arg(long)]
        installation: PathBuf,

        /// Overwrite the Installation file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },

    /// Print the merge patch that turns SOURCE into TARGET
    Diff { source: PathBuf, target: PathBuf },

    /// Print DOCUMENT with the merge patch PATCH applied
    Merge { document: PathBuf, patch: PathBuf },

    /// Generate markdown documentation for ec-installation-runner
    #[command(hide = true)]
    GenerateMarkdown,

    /// Generate a manpage for ec-installation-runner
    #[command(hide = true)]
    GenerateMan,
}
