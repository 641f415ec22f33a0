//! Project initialization.
//!
//! Connects the current npm package to an update server: picks or creates a
//! remote project, checks the matching client package is installed, and
//! writes the configuration file.

use std::env;
use std::path::Path;

use url::Url;

use crate::api::types::{Project, UpdateProtocol};
use crate::api::ApiClient;
use crate::cli::{prompt, OutputManager};
use crate::config::{self, Config, CONFIG_FILE_NAME};
use crate::error::{Result, ToolchainError};
use crate::toolchain;

pub(super) async fn execute_init(output: &OutputManager) -> Result<()> {
    let current_dir = env::current_dir()?;
    config::assert_npm_package_dir(&current_dir)?;

    let config_path = config::config_file_path(&current_dir);
    if config_path.exists() {
        output.warn(&format!(
            "Airlift is already initialized ({CONFIG_FILE_NAME} exists)"
        ));
        return Ok(());
    }

    let api_base_url = prompt_api_base_url()?;
    // No project is configured yet; init only calls project endpoints.
    let client = ApiClient::with_base_url(&api_base_url, None);

    let project = get_or_create_project(&client, output).await?;
    assert_protocol_package_installed(&current_dir, project.update_protocol)?;

    let config = Config {
        api_base_url,
        protocol: project.update_protocol,
        project_id: project.id,
    };
    let saved_path = config.save(&current_dir)?;

    output.success("Airlift initialized 🚀");
    output.println(&format!("Configuration saved to {}", saved_path.display()));
    output.println(
        "You now need to set up your native projects. Please follow the instructions in the docs.",
    );
    Ok(())
}

fn prompt_api_base_url() -> Result<String> {
    loop {
        let raw = prompt::input("Enter the URL of the update server")?;
        match Url::parse(&raw) {
            Ok(_) => return Ok(raw),
            Err(e) => println!("That is not a valid URL ({e}). Try again."),
        }
    }
}

async fn get_or_create_project(client: &ApiClient, output: &OutputManager) -> Result<Project> {
    let action = prompt::select(
        "Use an existing project or create a new one?",
        &["Use existing project", "Create new project"],
    )?;

    if action == 0 {
        let project_id = prompt::input("Enter the ID of the existing project")?;
        output.progress("Fetching project");
        return client.get_project(&project_id).await;
    }

    let name = prompt::input("Enter a name for the new project")?;

    let protocols = [UpdateProtocol::Expo, UpdateProtocol::Codepush];
    let labels: Vec<&str> = protocols.iter().map(|p| p.display_name()).collect();
    let choice = prompt::select("Which update protocol does your project use?", &labels)?;

    output.progress("Creating project");
    client.create_project(&name, protocols[choice]).await
}

/// The app must have the protocol's client package installed to receive
/// updates at runtime.
fn assert_protocol_package_installed(
    project_dir: &Path,
    protocol: UpdateProtocol,
) -> Result<()> {
    let package = protocol.required_package();
    toolchain::resolve_from(project_dir, package).ok_or_else(|| ToolchainError::ToolNotFound {
        tool: package.to_string(),
        project_dir: project_dir.to_path_buf(),
    })?;
    Ok(())
}
