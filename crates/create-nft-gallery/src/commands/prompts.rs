//! Interactive prompts for answers not given on the command line.

use anyhow::Result;
use dialoguer::{Input, Select};

use nft_gallery_core::config::{Answers, ScaffoldConfig};

/// Ask for every missing answer, seeding each prompt with its default.
pub fn complete(answers: Answers, variants: &[String]) -> Result<ScaffoldConfig> {
    let defaults = ScaffoldConfig::default();

    let project_name = match answers.project_name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("What is your project named?")
            .default(defaults.project_name)
            .interact_text()?,
    };

    let variant = match answers.variant {
        Some(variant) => variant,
        None => select_variant(variants, &defaults.variant)?,
    };

    let domain = match answers.domain {
        Some(domain) => domain,
        None => Input::<String>::new()
            .with_prompt("What is your ArNS domain?")
            .default(defaults.domain)
            .interact_text()?,
    };

    let contract_address = match answers.contract_address {
        Some(address) => address,
        None => optional_input("Enter your NFT contract address (optional)")?,
    };

    let rpc_endpoint = match answers.rpc_endpoint {
        Some(endpoint) => endpoint,
        None => optional_input("Enter your RPC endpoint URL (optional)")?,
    };

    Ok(ScaffoldConfig {
        project_name,
        domain,
        variant,
        contract_address,
        rpc_endpoint,
    })
}

fn select_variant(variants: &[String], default: &str) -> Result<String> {
    if variants.is_empty() {
        anyhow::bail!("the template store has no variants");
    }
    let default_index = variants.iter().position(|v| v == default).unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Which variant would you like to use?")
        .items(variants)
        .default(default_index)
        .interact()?;

    Ok(variants[selection].clone())
}

fn optional_input(prompt: &str) -> Result<String> {
    let value = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}
