//! create-nft-gallery CLI: scaffold an NFT gallery for an ArNS domain.
//!
//! Copies the base template tree, overlays the chosen variant, merges their
//! `package.json` fragments, renders every `.ejs` file, then runs
//! `npm install` and `git init` in the new project.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use commands::create::CreateArgs;
use nft_gallery_core::config::Answers;

#[derive(Parser, Debug)]
#[command(
    name = "create-nft-gallery",
    about = "Create a new NFT gallery application for Arweave Name System (ArNS) domains",
    version
)]
struct Cli {
    /// Name of the project (creates a directory with this name)
    project_name: Option<String>,

    /// ArNS domain the gallery is served from
    #[arg(long, value_name = "AR-DOMAIN")]
    domain: Option<String>,

    /// Template variant to use (e.g. manifold, metaplex)
    #[arg(long)]
    variant: Option<String>,

    /// NFT contract or collection address written to .env
    #[arg(long)]
    contract_address: Option<String>,

    /// RPC endpoint URL written to .env
    #[arg(long)]
    rpc_endpoint: Option<String>,

    /// Template store directory (default: the bundled templates)
    #[arg(long, env = "CREATE_NFT_GALLERY_TEMPLATES")]
    templates: Option<PathBuf>,

    /// JSON file with answers for non-interactive runs
    #[arg(long, value_name = "FILE")]
    answers: Option<PathBuf>,

    /// Write the resolved answers to a JSON file
    #[arg(long, value_name = "FILE")]
    save_answers: Option<PathBuf>,

    /// Accept defaults for every answer not given instead of prompting
    #[arg(short, long)]
    yes: bool,

    /// Do not run `npm install`
    #[arg(long)]
    skip_install: bool,

    /// Do not initialize a git repository
    #[arg(long)]
    skip_git: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_args(self) -> CreateArgs {
        CreateArgs {
            answers: Answers {
                project_name: self.project_name,
                domain: self.domain,
                variant: self.variant,
                contract_address: self.contract_address,
                rpc_endpoint: self.rpc_endpoint,
            },
            answers_file: self.answers,
            save_answers: self.save_answers,
            templates: self.templates,
            yes: self.yes,
            skip_install: self.skip_install,
            skip_git: self.skip_git,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match commands::create::run(cli.into_args()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let cli = Cli::try_parse_from([
            "create-nft-gallery",
            "my-gallery",
            "--domain",
            "art",
            "--variant",
            "metaplex",
            "-y",
            "--skip-git",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);

        let args = cli.into_args();
        assert_eq!(args.answers.project_name.as_deref(), Some("my-gallery"));
        assert_eq!(args.answers.domain.as_deref(), Some("art"));
        assert_eq!(args.answers.variant.as_deref(), Some("metaplex"));
        assert!(args.answers.contract_address.is_none());
        assert!(args.yes);
        assert!(args.skip_git);
        assert!(!args.skip_install);
    }

    #[test]
    fn test_parse_no_arguments() {
        let args = Cli::try_parse_from(["create-nft-gallery"]).unwrap().into_args();
        assert_eq!(args.answers, Answers::default());
        assert!(!args.yes);
    }
}
