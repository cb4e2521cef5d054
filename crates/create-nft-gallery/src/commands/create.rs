use std::path::PathBuf;

use anyhow::Result;

use nft_gallery_core::bootstrap::{self, Bootstrapper, GitOutcome, NpmGitBootstrapper};
use nft_gallery_core::config::Answers;
use nft_gallery_core::scaffold;
use nft_gallery_core::store::TemplateStore;

use super::prompts;
use crate::output;

/// Everything the `create` command needs from the command line.
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Answers given as flags; they win over the answers file.
    pub answers: Answers,
    pub answers_file: Option<PathBuf>,
    pub save_answers: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub yes: bool,
    pub skip_install: bool,
    pub skip_git: bool,
}

/// Create a new NFT gallery project.
///
/// Resolves the answers (flags, then answers file, then prompts or defaults),
/// scaffolds the project directory from the template store, installs
/// dependencies and initializes a git repository.
pub async fn run(args: CreateArgs) -> Result<()> {
    let store = match &args.templates {
        Some(dir) => TemplateStore::open(dir)?,
        None => TemplateStore::bundled()?,
    };
    let variants = store.variants()?;

    let from_file = match &args.answers_file {
        Some(path) => Answers::load(path)?,
        None => Answers::default(),
    };
    let answers = args.answers.or(from_file);

    let config = if args.yes {
        answers.with_defaults()
    } else {
        prompts::complete(answers, &variants)?
    };
    tracing::debug!(?config, "resolved answers");

    if let Some(path) = &args.save_answers {
        Answers {
            project_name: Some(config.project_name.clone()),
            domain: Some(config.domain.clone()),
            variant: Some(config.variant.clone()),
            contract_address: Some(config.contract_address.clone()),
            rpc_endpoint: Some(config.rpc_endpoint.clone()),
        }
        .save(path)?;
    }

    let name = &config.project_name;
    output::print_header(&format!("create-nft-gallery: {name}"));
    output::print_key_value("Domain", &config.domain);
    output::print_key_value("Variant", &config.variant);
    if let Some(dir) = &args.templates {
        output::print_key_value("Templates", &dir.display().to_string());
    }

    let project_dir = std::env::current_dir()?.join(name);

    output::print_step(1, 3, &format!("Creating project directory: {name}/"));
    let spinner = output::spinner("Copying and rendering templates");
    let result = scaffold::scaffold(&store, &config, &project_dir);
    spinner.finish_and_clear();
    let report = result?;
    output::print_key_value("Files", &report.files.len().to_string());
    output::print_key_value("Rendered", &report.rendered.len().to_string());

    let bootstrapper = NpmGitBootstrapper::new();

    output::print_step(2, 3, "Installing dependencies");
    if args.skip_install {
        output::print_warning("Dependency install skipped (--skip-install)");
    } else {
        bootstrapper.install_dependencies(&project_dir).await?;
    }

    output::print_step(3, 3, "Initializing git repository");
    let git = if args.skip_git {
        GitOutcome::Disabled
    } else {
        let spinner = output::spinner("git init, add, commit");
        let outcome = bootstrap::init_git(&bootstrapper, &project_dir).await;
        spinner.finish_and_clear();
        outcome
    };
    match &git {
        GitOutcome::Initialized => output::print_success("Git repository initialized"),
        GitOutcome::Skipped(_) => output::print_warning("Git initialization skipped"),
        GitOutcome::Disabled => output::print_warning("Git initialization skipped (--skip-git)"),
    }

    output::print_success(&format!(
        "Created {name} as an NFT gallery on {} using the {} variant",
        config.domain, config.variant
    ));
    println!();
    println!("  Next steps:");
    println!("    cd {name}");
    if args.skip_install {
        println!("    npm install");
    }
    println!("    npm run dev");
    println!();

    Ok(())
}
