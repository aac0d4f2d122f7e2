//! CLI subcommands and the shared bootstrap.

pub mod ask;
pub mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use markaz_application::MindMapController;
use markaz_core::assistant::Assistant;
use markaz_core::config::{AssistantBackend, MarkazConfig};
use markaz_infrastructure::{ConfigService, JsonChatRepository, MarkazPaths};
use markaz_interaction::{OpenAiMindMapAgent, RemoteAskClient};

use crate::console::{ConsolePresenter, LoggingSimulation};

/// Global options shared by every subcommand.
pub struct Options {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub remote: Option<String>,
}

/// A ready controller plus the repository it persists to.
pub struct Workspace {
    pub controller: MindMapController,
    pub repository: JsonChatRepository,
    /// Set when the OpenAI backend answers; it keeps chat histories locally.
    pub agent: Option<Arc<OpenAiMindMapAgent>>,
}

impl Workspace {
    pub async fn persist(&mut self) -> Result<()> {
        self.controller
            .persist(&self.repository)
            .await
            .context("Failed to save chats")
    }
}

/// Loads config, builds collaborators and restores saved chats.
pub async fn bootstrap(options: &Options) -> Result<Workspace> {
    let paths = MarkazPaths::new(options.data_dir.as_deref());
    let config_service = match &options.config {
        Some(path) => ConfigService::new(path.clone()),
        None => {
            let service = ConfigService::from_paths(&paths)?;
            service.ensure_config_file()?;
            service
        }
    };
    let config = config_service
        .get_config()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    let (assistant, agent) = build_assistant(&config, options.remote.as_deref())?;
    let repository = JsonChatRepository::from_paths(&paths).await?;

    let presenter = Arc::new(ConsolePresenter::new(config.theme.clone()));
    let mut controller = MindMapController::new(
        config,
        presenter,
        Arc::new(LoggingSimulation::default()),
        assistant,
    );

    let restored = controller.restore(&repository).await?;
    if restored == 0 {
        controller.start();
    }
    tracing::info!("[Bootstrap] Ready with {} chat(s)", controller.list_chats().len());

    Ok(Workspace {
        controller,
        repository,
        agent,
    })
}

type AssistantHandles = (Arc<dyn Assistant>, Option<Arc<OpenAiMindMapAgent>>);

fn build_assistant(config: &MarkazConfig, remote: Option<&str>) -> Result<AssistantHandles> {
    let settings = &config.assistant;
    if let Some(url) = remote {
        let client: Arc<dyn Assistant> = Arc::new(RemoteAskClient::new(url, settings.timeout())?);
        return Ok((client, None));
    }

    match settings.backend {
        AssistantBackend::Remote => {
            let client: Arc<dyn Assistant> = Arc::new(RemoteAskClient::new(
                settings.endpoint.clone(),
                settings.timeout(),
            )?);
            Ok((client, None))
        }
        AssistantBackend::OpenAi => {
            let agent = Arc::new(
                OpenAiMindMapAgent::try_from_env(settings)
                    .context("Set OPENAI_API_KEY or pass --remote <url>")?,
            );
            tracing::info!("[Bootstrap] Using OpenAI model {}", agent.model());
            let assistant: Arc<dyn Assistant> = agent.clone();
            Ok((assistant, Some(agent)))
        }
    }
}
