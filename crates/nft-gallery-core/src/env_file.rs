//! The generated `.env` file.

use std::path::{Path, PathBuf};

use crate::config::{ScaffoldConfig, DEPLOY_KEY_PLACEHOLDER};
use crate::error::Result;

pub const ENV_FILE: &str = ".env";

/// Render the `.env` contents for a project.
pub fn render(config: &ScaffoldConfig) -> String {
    format!(
        "# Environment variables for {name}\n\
         ARNS_NAME={domain}\n\
         NFT_CONTRACT_ADDRESS={contract}\n\
         RPC_ENDPOINT={rpc}\n\
         DEPLOY_KEY=\"{DEPLOY_KEY_PLACEHOLDER}\"\n",
        name = config.project_name,
        domain = config.domain,
        contract = config.contract_address,
        rpc = config.rpc_endpoint,
    )
}

/// Write `.env` into the project root, replacing any existing file.
pub fn write(project_dir: &Path, config: &ScaffoldConfig) -> Result<PathBuf> {
    let path = project_dir.join(ENV_FILE);
    std::fs::write(&path, render(config))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_env() {
        let config = ScaffoldConfig {
            project_name: "gallery".into(),
            domain: "art".into(),
            contract_address: "0x123".into(),
            ..Default::default()
        };
        assert_eq!(
            render(&config),
            "# Environment variables for gallery\n\
             ARNS_NAME=art\n\
             NFT_CONTRACT_ADDRESS=0x123\n\
             RPC_ENDPOINT=\n\
             DEPLOY_KEY=\"a base64 of your arweave wallet key\"\n"
        );
    }

    #[test]
    fn test_write_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), &ScaffoldConfig::default()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("ARNS_NAME=mygallery\n"));
    }
}
