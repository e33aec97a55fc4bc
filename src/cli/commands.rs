use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Manage anomaly detectors on an OpenSearch-compatible cluster
#[derive(Parser, Debug)]
#[command(
    name = "adctl",
    about = "Manage anomaly detectors on an OpenSearch-compatible cluster",
    version,
    author,
    long_about = "adctl creates, inspects, starts, stops, updates and deletes anomaly \
                  detectors. A detector definition with a partition field fans out into \
                  one detector per distinct value of that field."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        value_name = "NAME",
        help = "Connection profile from the profiles file"
    )]
    pub profile: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Cluster endpoint, overriding the profile"
    )]
    pub endpoint: Option<String>,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Create detectors from definition files",
        long_about = "Reads each detector definition file and creates the detector. When the \
                      definition names a partition field, one detector is created per \
                      distinct value after confirmation; if any of them fails, the ones \
                      already created are removed.\n\n\
                      Examples:\n  \
                      adctl create orders.json\n  \
                      adctl create orders.json payments.json"
    )]
    Create(CreateArgs),

    #[command(about = "Print a detector definition skeleton to start from")]
    Generate,

    #[command(
        about = "Show detectors",
        long_about = "Shows every detector whose name matches NAME, or the detector with \
                      id NAME when --id is given.\n\n\
                      Examples:\n  \
                      adctl get orders-*\n  \
                      adctl get m4ccEnIBTXsGi3mvMt9p --id --format json"
    )]
    Get(GetArgs),

    #[command(about = "Start detectors")]
    Start(TargetArgs),

    #[command(about = "Stop detectors")]
    Stop(TargetArgs),

    #[command(
        about = "Delete detectors",
        long_about = "Deletes every detector whose name matches NAME, asking once per \
                      detector. Running detectors must be stopped first; --force stops \
                      them before deleting.\n\n\
                      Examples:\n  \
                      adctl delete orders-*\n  \
                      adctl delete m4ccEnIBTXsGi3mvMt9p --id --force"
    )]
    Delete(DeleteArgs),

    #[command(
        about = "Update a detector from an edited definition",
        long_about = "Submits a detector previously fetched with `adctl get --format json` \
                      and edited. The update is refused if the detector changed since it \
                      was fetched, unless --force is given.\n\n\
                      Examples:\n  \
                      adctl update orders.json\n  \
                      adctl update orders.json --start"
    )]
    Update(UpdateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    #[arg(value_name = "FILE", required = true, help = "Detector definition files")]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    #[arg(value_name = "NAME", help = "Detector name or name pattern")]
    pub name: String,

    #[arg(long, help = "Treat NAME as a detector id")]
    pub id: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long, help = "Stop running detectors before deleting them")]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    #[arg(value_name = "FILE", help = "Edited detector file")]
    pub file: PathBuf,

    #[arg(long, help = "Skip the freshness check and the confirmation prompt")]
    pub force: bool,

    #[arg(long, help = "Restart the detector around the update")]
    pub start: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_create_takes_several_files() {
        let args = CliArgs::parse_from(["adctl", "create", "a.json", "b.json"]);
        match args.command {
            Commands::Create(create) => {
                assert_eq!(
                    create.files,
                    vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
                );
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_create_requires_a_file() {
        assert!(CliArgs::try_parse_from(["adctl", "create"]).is_err());
    }

    #[test]
    fn test_get_defaults() {
        let args = CliArgs::parse_from(["adctl", "get", "orders*"]);
        match args.command {
            Commands::Get(get) => {
                assert_eq!(get.target.name, "orders*");
                assert!(!get.target.id);
                assert_eq!(get.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_get_by_id_as_json() {
        let args = CliArgs::parse_from(["adctl", "get", "abc", "--id", "--format", "json"]);
        match args.command {
            Commands::Get(get) => {
                assert!(get.target.id);
                assert_eq!(get.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_delete_flags() {
        let args = CliArgs::parse_from(["adctl", "delete", "orders", "--force"]);
        match args.command {
            Commands::Delete(delete) => {
                assert!(delete.force);
                assert!(!delete.target.id);
            }
            _ => panic!("Expected Delete command"),
        }
    }

    #[test]
    fn test_update_flags() {
        let args = CliArgs::parse_from(["adctl", "update", "d.json", "--start"]);
        match args.command {
            Commands::Update(update) => {
                assert_eq!(update.file, PathBuf::from("d.json"));
                assert!(update.start);
                assert!(!update.force);
            }
            _ => panic!("Expected Update command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from([
            "adctl",
            "stop",
            "orders",
            "--profile",
            "staging",
            "--endpoint",
            "https://search:9200",
            "-v",
        ]);
        assert_eq!(args.profile.as_deref(), Some("staging"));
        assert_eq!(args.endpoint.as_deref(), Some("https://search:9200"));
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::Stop(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["adctl", "-v", "-q", "generate"]).is_err());
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["adctl", "--log-level", "debug", "generate"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
