use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pedigree_map::ancestry::AncestorNumber;
use pedigree_map::config::{
    ConfigError, MapConfig, PROJECT_CONFIG_FILE, default_config_yaml, load_effective_config,
};
use pedigree_map::map::{MapError, MapResponse};
use pedigree_map::provider::{AncestorFact, FamilyTree, ProviderError, TreeError};
use pedigree_map::store::write_if_absent;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const USER_CONFIG_DIR: &str = ".pedigree-map";
const USER_CONFIG_FILE: &str = "config.yml";

#[derive(Debug)]
struct CliError {
    code: &'static str,
    message: String,
}

impl CliError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn io(code: &'static str, err: io::Error) -> Self {
        Self::new(code, err.to_string())
    }
}

impl From<MapError> for CliError {
    fn from(value: MapError) -> Self {
        let code = match &value {
            MapError::InvalidAncestorNumber(_) | MapError::OutOfOrder { .. } => "invalid_facts",
            MapError::Provider(ProviderError::UnknownIndividual(_)) => "individual_not_found",
            MapError::Provider(ProviderError::AccessDenied(_)) => "access_denied",
            MapError::Json(_) => "json_error",
        };
        Self::new(code, value.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::new("config_error", value.to_string())
    }
}

impl From<TreeError> for CliError {
    fn from(value: TreeError) -> Self {
        Self::new("tree_error", value.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::new("json_error", value.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "pedigree-map")]
#[command(about = "Plot an individual's ancestors on a map, linked by descent")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    verbose: bool,
    /// Config file applied on top of the user and project configs.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Init(InitArgs),
    Map(MapArgs),
    Facts(FactsArgs),
    Sosa(SosaArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    global: bool,
}

#[derive(Args, Debug)]
struct MapArgs {
    #[arg(long)]
    tree: PathBuf,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    generations: Option<u32>,
}

#[derive(Args, Debug)]
struct FactsArgs {
    #[arg(long)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct SosaArgs {
    #[arg(allow_negative_numbers = true)]
    number: i64,
}

#[derive(Debug, Deserialize)]
struct FactsDocument {
    #[serde(default)]
    facts: Vec<NumberedFact>,
}

#[derive(Debug, Deserialize)]
struct NumberedFact {
    number: i64,
    #[serde(flatten)]
    fact: AncestorFact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let payload = json!({
                "error": {
                    "code": err.code,
                    "message": err.message,
                }
            });
            eprintln!("{payload}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cwd = std::env::current_dir().map_err(|err| CliError::io("cwd_error", err))?;
    match cli.command {
        Command::Init(args) => cmd_init(&cwd, args),
        Command::Map(args) => cmd_map(&cwd, cli.config.as_deref(), args),
        Command::Facts(args) => cmd_facts(&cwd, cli.config.as_deref(), args),
        Command::Sosa(args) => cmd_sosa(&cwd, cli.config.as_deref(), args),
    }
}

fn cmd_init(cwd: &Path, args: InitArgs) -> Result<(), CliError> {
    let target = if args.global {
        home_dir()?.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE)
    } else {
        cwd.join(PROJECT_CONFIG_FILE)
    };
    let created = write_if_absent(&target, default_config_yaml().as_bytes())
        .map_err(|err| CliError::io("write_error", err))?;

    print_json(&json!({
        "status": "ok",
        "config": target,
        "created": created,
    }))
}

fn cmd_map(cwd: &Path, explicit: Option<&Path>, args: MapArgs) -> Result<(), CliError> {
    let config = load_config(cwd, explicit)?;
    let tree = FamilyTree::load(&args.tree)?;
    let generations = config.generations(args.generations);
    tracing::debug!(
        subject = %args.subject,
        generations,
        individuals = tree.len(),
        "building pedigree map"
    );

    let response = config
        .builder()
        .build_for_subject(&tree, &args.subject, generations)?;
    print_response(
        &response,
        json!({
            "subject": args.subject,
            "generations": generations,
        }),
    )
}

fn cmd_facts(cwd: &Path, explicit: Option<&Path>, args: FactsArgs) -> Result<(), CliError> {
    let config = load_config(cwd, explicit)?;
    let content =
        fs::read_to_string(&args.input).map_err(|err| CliError::io("read_error", err))?;
    let document: FactsDocument = serde_yaml::from_str(&content)
        .map_err(|err| CliError::new("facts_parse_error", err.to_string()))?;

    let response = config
        .builder()
        .build(document.facts.iter().map(|item| (item.number, &item.fact)))?;
    print_response(&response, json!({ "input": args.input }))
}

fn cmd_sosa(cwd: &Path, explicit: Option<&Path>, args: SosaArgs) -> Result<(), CliError> {
    let config = load_config(cwd, explicit)?;
    let number = AncestorNumber::try_from(args.number)
        .map_err(|err| CliError::new("invalid_number", err.to_string()))?;

    print_json(&json!({
        "number": number.get(),
        "generation": number.generation(),
        "color": config.colors.color_for(number),
        "descendant": number.descendant().map(AncestorNumber::get),
        "father": number.father().map(AncestorNumber::get),
        "mother": number.mother().map(AncestorNumber::get),
        "relationship": number.relationship(),
    }))
}

fn load_config(cwd: &Path, explicit: Option<&Path>) -> Result<MapConfig, CliError> {
    let user_config = home_dir()
        .ok()
        .map(|home| home.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE));
    Ok(load_effective_config(cwd, explicit, user_config.as_deref())?)
}

fn print_response(response: &MapResponse, request: Value) -> Result<(), CliError> {
    print_json(&json!({
        "status": response.status.http_code(),
        "etag": response.etag()?,
        "facts_considered": response.facts_considered,
        "request": request,
        "geojson": response.collection,
    }))
}

fn home_dir() -> Result<PathBuf, CliError> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| CliError::new("home_error", "HOME environment variable is not set"))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string(value)?;
    println!("{rendered}");
    Ok(())
}
