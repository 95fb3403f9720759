use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use k8_client::K8Client;
use openshift_provider::{
    ConnectionMode, FieldDefault, FieldSchema, FieldType, ImageStreamAdapter, ProjectAdapter,
    Provider, ProviderConfig, RemoteClient, ResourceAdapter, ResourceKind, ResourceManager,
    RouteAdapter,
};

#[derive(Debug, Args, Clone, Default)]
pub struct GlobalOptions {
    /// How to connect: `cluster` or `kubeconfig`
    #[arg(long, global = true, default_value = "kubeconfig")]
    mode: String,

    /// Credential file for kubeconfig mode, defaults to ~/.kube/config
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,
}

impl GlobalOptions {
    fn provider_config(&self) -> Result<ProviderConfig> {
        let mode: ConnectionMode = self.mode.parse()?;
        let kubeconfig = match (mode, &self.kubeconfig) {
            (ConnectionMode::KubeConfig, None) => Some(default_kubeconfig()?),
            (_, path) => path.clone(),
        };
        Ok(ProviderConfig { mode, kubeconfig })
    }
}

fn default_kubeconfig() -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| anyhow!("unable to find home directory"))?;
    Ok(home.join(".kube").join("config"))
}

#[derive(Debug, Parser)]
#[command(
    about = "Manage OpenShift projects, routes and image streams declaratively",
    name = "oc-provider",
    max_term_width = 100
)]
pub struct Cli {
    #[clap(flatten)]
    global_opts: GlobalOptions,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the resource described by the state file
    Create(StateOpt),
    /// Refresh the state file's resource from the cluster
    Read(StateOpt),
    /// Apply the state file to an existing resource
    Update(UpdateOpt),
    /// Delete the resource tracked by the state file
    Delete(StateOpt),
    /// Adopt an existing resource by identifier
    Import(ImportOpt),
    /// Print the declared fields of a kind
    Schema(KindOpt),
}

#[derive(Debug, Args)]
pub struct KindOpt {
    /// project, route or image_stream
    #[arg(long)]
    kind: ResourceKind,
}

#[derive(Debug, Args)]
pub struct StateOpt {
    #[clap(flatten)]
    kind: KindOpt,
    /// YAML file with the resource fields
    state: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateOpt {
    #[clap(flatten)]
    state: StateOpt,
    /// YAML file with the last known state
    #[arg(long)]
    prior: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportOpt {
    #[clap(flatten)]
    kind: KindOpt,
    /// `<namespace>/<name>`, or `<name>` for projects
    id: String,
}

/// lifecycle request, independent of kind
enum Action<'a> {
    Create(&'a Path),
    Read(&'a Path),
    Update { state: &'a Path, prior: &'a Path },
    Delete(&'a Path),
    Import(&'a str),
}

impl Cli {
    pub async fn process(self) -> Result<()> {
        let (kind, action) = match &self.command {
            Command::Schema(opt) => return print_schema(opt.kind),
            Command::Create(opt) => (opt.kind.kind, Action::Create(&opt.state)),
            Command::Read(opt) => (opt.kind.kind, Action::Read(&opt.state)),
            Command::Update(opt) => (
                opt.state.kind.kind,
                Action::Update {
                    state: &opt.state.state,
                    prior: &opt.prior,
                },
            ),
            Command::Delete(opt) => (opt.kind.kind, Action::Delete(&opt.state)),
            Command::Import(opt) => (opt.kind.kind, Action::Import(&opt.id)),
        };

        let config = self.global_opts.provider_config()?;
        debug!(?config, %kind, "starting");
        let provider = Provider::configure(&config)?;

        match kind {
            ResourceKind::Project => run::<ProjectAdapter>(provider.projects(), action).await,
            ResourceKind::Route => run::<RouteAdapter>(provider.routes(), action).await,
            ResourceKind::ImageStream => {
                run::<ImageStreamAdapter>(provider.image_streams(), action).await
            }
        }
    }
}

async fn run<A>(manager: ResourceManager<A, K8Client>, action: Action<'_>) -> Result<()>
where
    A: ResourceAdapter,
    K8Client: RemoteClient<A::K8Spec>,
{
    let data = match action {
        Action::Create(path) => {
            let mut data = load_state::<A>(path)?;
            manager.create(&mut data).await?;
            data
        }
        Action::Read(path) => {
            let mut data = load_state::<A>(path)?;
            manager.read(&mut data).await?;
            data
        }
        Action::Update { state, prior } => {
            let prior = load_state::<A>(prior)?;
            let mut data = load_state::<A>(state)?;
            manager.update(&prior, &mut data).await?;
            data
        }
        Action::Delete(path) => {
            let mut data = load_state::<A>(path)?;
            manager.delete(&mut data).await?;
            data
        }
        Action::Import(id) => match manager.import(id).await? {
            Some(data) => data,
            None => {
                eprintln!("{} {id} does not exist", A::LABEL);
                return Ok(());
            }
        },
    };

    print_yaml(&data)
}

fn load_state<A: ResourceAdapter>(path: &Path) -> Result<A::Data> {
    let source =
        fs::read_to_string(path).with_context(|| format!("unable to read {}", path.display()))?;
    serde_yaml::from_str(&source)
        .with_context(|| format!("invalid {} state in {}", A::LABEL, path.display()))
}

fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_yaml::to_string(value)?;
    io::stdout().write_all(output.as_bytes())?;
    Ok(())
}

#[derive(Serialize)]
struct FieldView {
    path: &'static str,
    #[serde(rename = "type")]
    ty: &'static str,
    required: bool,
    immutable: bool,
    computed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    description: &'static str,
}

impl From<&FieldSchema> for FieldView {
    fn from(field: &FieldSchema) -> Self {
        let ty = match field.ty {
            FieldType::String => "string",
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::List => "list",
        };
        let default = field.default.map(|default| match default {
            FieldDefault::Bool(value) => value.to_string(),
            FieldDefault::Str(value) => value.to_owned(),
        });

        Self {
            path: field.path,
            ty,
            required: field.required,
            immutable: field.immutable,
            computed: field.computed,
            default,
            description: field.description,
        }
    }
}

fn print_schema(kind: ResourceKind) -> Result<()> {
    let fields: Vec<FieldView> = kind.schema().iter().map(FieldView::from).collect();
    print_yaml(&fields)
}
