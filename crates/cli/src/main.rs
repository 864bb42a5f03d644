#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use netsync_apply::{apply_paged, compare_many_by, diff_summary, page_count};
use netsync_core::{in_scope, HierarchyClient, KindRegistry, RemoteError, Resource, RootEnvelope, SyncConfig};
use netsync_store::{build_query, ResyncFilter};
use serde_json::Value as Json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "netsyncctl", version, about = "netsync CLI: inspect hierarchical patches offline")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Cluster identity tag value
    #[arg(long = "cluster", global = true, env = "NETSYNC_CLUSTER")]
    cluster: Option<String>,

    /// Objects per hierarchical patch
    #[arg(long = "page-size", global = true, env = "NETSYNC_BATCH_PAGE_SIZE")]
    page_size: Option<usize>,

    /// Log filter, tracing directive syntax (e.g. "netsync_apply=debug"); logs go to stderr
    #[arg(long = "log", global = true, env = "NETSYNC_LOG", default_value = "warn")]
    log: String,

    /// Serve Prometheus metrics on host:port while the command runs
    #[arg(long = "metrics-addr", global = true, env = "NETSYNC_METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in resource kinds and their hierarchy
    Kinds,
    /// Print the patch envelopes a batch write of FILE would send, page by page
    Render {
        /// Kind id, e.g. "subnet" (see `kinds`)
        kind: String,
        /// JSON array of resources
        file: PathBuf,
    },
    /// Classify desired objects against existing ones
    Diff {
        kind: String,
        /// JSON array of cached resources
        existing: PathBuf,
        /// JSON array of desired resources
        desired: PathBuf,
    },
    /// Print the search query a full resync would issue
    Query {
        kind: String,
        /// Extra tag clause, `scope=value` (empty value matches on scope only)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "org")]
        org: Option<String>,
        #[arg(long = "project")]
        project: Option<String>,
    },
    /// List the resources of FILE a cleanup for namespace/VPC would delete
    Scope {
        #[arg(long = "namespace", default_value = "")]
        namespace: String,
        #[arg(long = "vpc", default_value = "")]
        vpc: String,
        file: PathBuf,
    },
}

/// stdout carries command output, so diagnostics always go to stderr.
fn init_tracing(directives: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter {:?}", directives))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {}", e))
}

fn init_metrics(addr: Option<SocketAddr>) -> Result<()> {
    let Some(addr) = addr else { return Ok(()) };
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("starting metrics exporter on {}", addr))?;
    info!(%addr, "metrics exporter listening");
    Ok(())
}

fn read_resources(path: &Path) -> Result<Vec<Resource>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("decoding {} as a resource array", path.display()))
}

fn parse_tag(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((scope, value)) if !scope.is_empty() => Ok((scope.to_string(), value.to_string())),
        _ => Err(anyhow!("invalid --tag {:?}; expected scope=value", s)),
    }
}

/// Collects envelopes instead of sending them.
#[derive(Default)]
struct CaptureClient {
    envelopes: Mutex<Vec<Json>>,
}

#[async_trait::async_trait]
impl HierarchyClient for CaptureClient {
    async fn patch(&self, envelope: &RootEnvelope, _enforce_revision_check: bool) -> Result<(), RemoteError> {
        self.envelopes.lock().map_err(|_| RemoteError::Transport("capture poisoned".into()))?.push(envelope.to_json());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;
    init_metrics(cli.metrics_addr)?;

    let mut config = SyncConfig::from_env();
    if let Some(c) = cli.cluster.clone() {
        config.cluster = c;
    }
    if let Some(n) = cli.page_size {
        config.batch_page_size = n;
    }
    let registry = KindRegistry::builtin();

    match cli.command {
        Commands::Kinds => match cli.output {
            Output::Human => {
                for spec in registry.kinds() {
                    let chain: Vec<&str> = spec.descriptor.levels().iter().map(|l| l.model_key.as_str()).collect();
                    println!("{} • {} • {}", spec.kind, spec.descriptor.root.model_key(), chain.join(" > "));
                }
            }
            Output::Json => {
                let rows: Vec<Json> = registry
                    .kinds()
                    .map(|s| serde_json::json!({"kind": s.kind, "resource_type": s.resource_type(), "descriptor": s.descriptor}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        },
        Commands::Render { kind, file } => {
            let spec = registry.get(&kind)?;
            let objects = read_resources(&file)?;
            let pages = page_count(objects.len(), config.batch_page_size);
            info!(kind = %kind, objects = objects.len(), pages, "rendering");
            let client = CaptureClient::default();
            apply_paged(&objects, config.batch_page_size, &spec, &client, &CancellationToken::new(), |_| {})
                .await
                .context("rendering pages")?;
            let envelopes = client.envelopes.into_inner().map_err(|_| anyhow!("capture poisoned"))?;
            match cli.output {
                Output::Human => {
                    for (i, env) in envelopes.iter().enumerate() {
                        println!("# page {}/{}", i + 1, pages);
                        println!("{}", serde_json::to_string_pretty(env)?);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&envelopes)?),
            }
        }
        Commands::Diff { kind, existing, desired } => {
            let spec = registry.get(&kind)?;
            let existing = read_resources(&existing)?;
            let desired = read_resources(&desired)?;
            let (mut changed, mut stale) = compare_many_by(&existing, &desired, |o| (spec.id_of)(o));
            changed.sort_by(|a, b| a.id.cmp(&b.id));
            stale.sort_by(|a, b| a.id.cmp(&b.id));
            match cli.output {
                Output::Human => {
                    for obj in &changed {
                        match existing.iter().find(|e| e.id == obj.id) {
                            Some(prev) => {
                                let d = diff_summary(&obj.canonical(), &prev.canonical());
                                println!("~ {} (+{} ~{} -{})", obj.id, d.adds, d.updates, d.removes);
                            }
                            None => println!("+ {}", obj.id),
                        }
                    }
                    for obj in &stale {
                        println!("- {}", obj.id);
                    }
                    if changed.is_empty() && stale.is_empty() {
                        println!("in sync");
                    }
                }
                Output::Json => {
                    let ids = |v: &[Resource]| v.iter().map(|o| o.id.clone()).collect::<Vec<_>>();
                    let out = serde_json::json!({"changed": ids(&changed), "stale": ids(&stale)});
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
        }
        Commands::Query { kind, tags, org, project } => {
            let spec = registry.get(&kind)?;
            let mut filter = ResyncFilter::default();
            for t in &tags {
                let (scope, value) = parse_tag(t)?;
                filter = filter.with_tag(&scope, &value);
            }
            filter.org = org;
            filter.project = project;
            if filter.project.is_some() && filter.org.is_none() {
                warn!("--project without --org adds no path clause");
            }
            let q = build_query(spec.resource_type(), &config.cluster, &filter);
            match cli.output {
                Output::Human => println!("{}", q),
                Output::Json => println!("{}", serde_json::to_string_pretty(&serde_json::json!({"query": q, "page_size": config.resync_page_size}))?),
            }
        }
        Commands::Scope { namespace, vpc, file } => {
            let objects = read_resources(&file)?;
            let hits: Vec<&Resource> = objects.iter().filter(|o| in_scope(&namespace, &vpc, o.path.as_deref(), &o.tags)).collect();
            info!(namespace = %namespace, vpc = %vpc, total = objects.len(), selected = hits.len(), "cleanup scope");
            match cli.output {
                Output::Human => {
                    for o in &hits {
                        println!("{} • {}", o.id, o.path.as_deref().unwrap_or("-"));
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
            }
        }
    }

    Ok(())
}
