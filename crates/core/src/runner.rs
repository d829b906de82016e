//! Main runner that wires scanning, affordances, detection and invocation together

use crate::{
    affordance::{make_affordances, validate_handler_name, workspace_folder_for},
    config::Config,
    dispatch::{CommandArgs, CommandOutput, CommandRegistry, DETECT_COMMAND, VALIDATE_VERSION_COMMAND},
    document::TextDocument,
    error::{Error, Result},
    interfaces::{DocumentProvider, Notifier, OutputSink, ProcessRunner, ProcessSpec, WorkspaceResolver},
    invoke::{ErrorKind, InvocationRequest, InvocationResult, LocalInvoker},
    patterns::HandlerScanner,
    probe::{SamCliLocator, SupportedRange, ToolDetectionResult, ToolProbe, ValidationOutcome},
    services::{
        FsDocumentProvider, StaticWorkspaceResolver, TokioProcessRunner, TracingNotifier,
        TracingOutputSink,
    },
    telemetry::{FileTelemetrySink, NoopTelemetrySink, TelemetrySink, TracingTelemetrySink},
    types::{Affordance, CONFIGURE_COMMAND, HandlerCandidate, Language, WorkspaceFolder},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Collaborators a [`SamRunner`] talks to.
pub struct SamServices {
    pub documents: Arc<dyn DocumentProvider>,
    pub resolver: Arc<dyn WorkspaceResolver>,
    pub runner: Arc<dyn ProcessRunner>,
    pub notifier: Arc<dyn Notifier>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub output: Arc<dyn OutputSink>,
    pub locator: SamCliLocator,
}

impl SamServices {
    /// The default services for `config`, resolving against `workspace_folders`
    pub fn new(config: &Config, workspace_folders: Vec<PathBuf>) -> Self {
        let telemetry: Arc<dyn TelemetrySink> = match (&config.telemetry.file, config.telemetry.enabled) {
            (_, false) => Arc::new(NoopTelemetrySink),
            (Some(file), true) => Arc::new(FileTelemetrySink::new(file)),
            (None, true) => Arc::new(TracingTelemetrySink),
        };

        Self {
            documents: Arc::new(FsDocumentProvider::new()),
            resolver: Arc::new(StaticWorkspaceResolver::from_paths(workspace_folders)),
            runner: Arc::new(TokioProcessRunner::new()),
            notifier: Arc::new(TracingNotifier),
            telemetry,
            output: Arc::new(TracingOutputSink),
            locator: SamCliLocator::from_env(config.sam_cli.location.clone()),
        }
    }

    pub fn with_process_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_output(mut self, output: Arc<dyn OutputSink>) -> Self {
        self.output = output;
        self
    }

    pub fn with_locator(mut self, locator: SamCliLocator) -> Self {
        self.locator = locator;
        self
    }
}

pub struct SamRunner {
    config: Config,
    documents: Arc<dyn DocumentProvider>,
    resolver: Arc<dyn WorkspaceResolver>,
    scanner: HandlerScanner,
    probe: ToolProbe,
    invoker: LocalInvoker,
    commands: CommandRegistry,
}

impl SamRunner {
    pub fn with_config(config: Config, workspace_folders: Vec<PathBuf>) -> Result<Self> {
        config.validate()?;
        let services = SamServices::new(&config, workspace_folders);
        Ok(Self::with_services(config, services))
    }

    pub fn with_services(config: Config, services: SamServices) -> Self {
        let probe = ToolProbe::new(services.locator, Arc::clone(&services.runner), services.notifier)
            .with_range(SupportedRange::new(
                config.sam_cli.min_version.clone(),
                config.sam_cli.max_version.clone(),
            ))
            .with_timeout(config.sam_cli.detect_timeout());
        let invoker =
            LocalInvoker::new(probe.clone(), services.runner).with_timeouts(&config.sam_cli);
        let commands = register_commands(
            services.telemetry,
            invoker.clone(),
            probe.clone(),
            services.output,
        );

        Self {
            config,
            documents: services.documents,
            resolver: services.resolver,
            scanner: HandlerScanner::new(),
            probe,
            invoker,
            commands,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
        self.resolver.folders()
    }

    pub fn workspace_folder_for(&self, path: &Path) -> Result<WorkspaceFolder> {
        workspace_folder_for(path, self.resolver.as_ref())
    }

    pub async fn open(&self, path: &Path) -> Result<TextDocument> {
        self.documents.open(path).await
    }

    pub fn scan(&self, document: &TextDocument) -> Vec<HandlerCandidate> {
        self.scan_cancellable(document, &CancellationToken::new())
    }

    pub fn scan_cancellable(
        &self,
        document: &TextDocument,
        cancel: &CancellationToken,
    ) -> Vec<HandlerCandidate> {
        self.scanner.scan(document, cancel).candidates()
    }

    /// Scan `document` and turn its handlers into affordances
    pub fn build_affordances(&self, document: &TextDocument, language: Language) -> Result<Vec<Affordance>> {
        let candidates = self.scan(document);
        make_affordances(
            document,
            &candidates,
            language,
            self.resolver.as_ref(),
            &self.config.debug_policy(),
        )
    }

    /// Open `path` and build its affordances; unsupported files have none
    pub async fn analyze(&self, path: &Path) -> Result<Vec<Affordance>> {
        let document = self.open(path).await?;
        match document.language() {
            Some(language) => self.build_affordances(&document, language),
            None => {
                debug!("No handler support for {}", path.display());
                Ok(Vec::new())
            }
        }
    }

    /// Resolve handler settings from the config nearest to the handler's source
    pub fn request_for(&self, affordance: &Affordance, is_debug: bool) -> InvocationRequest {
        let nearest = affordance
            .document
            .parent()
            .and_then(Config::find_config_file)
            .and_then(|path| match Config::load_from_file(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Ignoring {}: {e}", path.display());
                    None
                }
            });
        let config = nearest.as_ref().unwrap_or(&self.config);
        InvocationRequest::from_affordance(affordance, is_debug, config)
    }

    /// Build and invoke the handler behind `affordance` through the command table
    pub async fn invoke(&self, affordance: &Affordance, is_debug: bool) -> InvocationResult {
        let request = self.request_for(affordance, is_debug);
        let key = affordance.language.invoke_command_key();

        match self
            .commands
            .execute(&key, CommandArgs::Invoke(Box::new(request)))
            .await
        {
            Ok(CommandOutput::Invocation(result)) => result,
            Ok(other) => InvocationResult::failure(
                ErrorKind::Invoke,
                format!("Unexpected output from {key}: {other:?}"),
                None,
            ),
            Err(e) => InvocationResult::failure(ErrorKind::Invoke, e.to_string(), None),
        }
    }

    /// Commands an invocation would run, or `None` without a SAM CLI
    pub async fn plan(&self, affordance: &Affordance, is_debug: bool) -> Option<Vec<ProcessSpec>> {
        let request = self.request_for(affordance, is_debug);
        self.invoker.plan(&request).await
    }

    pub async fn detect_tool(&self, force_refresh: bool) -> ToolDetectionResult {
        self.probe.detect(force_refresh).await
    }

    pub async fn validate_tool_version(&self) -> ValidationOutcome {
        self.probe.validate_and_notify().await
    }

    /// Add `handler_name` to the config of `workspace_folder`
    pub fn configure(&self, workspace_folder: &Path, handler_name: &str) -> Result<PathBuf> {
        configure_handler(workspace_folder, handler_name)
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }
}

fn configure_handler(workspace_folder: &Path, handler_name: &str) -> Result<PathBuf> {
    validate_handler_name(handler_name)?;
    Config::configure_handler(workspace_folder, handler_name)
}

fn register_commands(
    telemetry: Arc<dyn TelemetrySink>,
    invoker: LocalInvoker,
    probe: ToolProbe,
    output: Arc<dyn OutputSink>,
) -> CommandRegistry {
    let mut registry = CommandRegistry::new(telemetry);

    for language in Language::ALL {
        let key = language.invoke_command_key();
        let invoker = invoker.clone();
        let output = Arc::clone(&output);
        registry.register(key.clone(), move |args| {
            let invoker = invoker.clone();
            let output = Arc::clone(&output);
            let key = key.clone();
            async move {
                match args {
                    CommandArgs::Invoke(request) => Ok(CommandOutput::Invocation(
                        invoker.invoke(&request, output.as_ref()).await,
                    )),
                    _ => Err(Error::InvalidCommandArgs { command: key }),
                }
            }
        });
    }

    registry.register(CONFIGURE_COMMAND, |args| async move {
        match args {
            CommandArgs::Configure {
                workspace_folder,
                handler_name,
            } => configure_handler(&workspace_folder, &handler_name).map(CommandOutput::Configured),
            _ => Err(Error::InvalidCommandArgs {
                command: CONFIGURE_COMMAND.to_string(),
            }),
        }
    });

    let detect_probe = probe.clone();
    registry.register(DETECT_COMMAND, move |_args| {
        let probe = detect_probe.clone();
        async move { Ok(CommandOutput::Detection(probe.detect(true).await)) }
    });

    registry.register(VALIDATE_VERSION_COMMAND, move |_args| {
        let probe = probe.clone();
        async move { Ok(CommandOutput::Validation(probe.validate_and_notify().await)) }
    });

    registry
}
