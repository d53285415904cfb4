//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use shipwright::util::shell::ColorChoice;

/// Shipwright - build TypeScript libraries for ESM and CommonJS consumers
#[derive(Parser)]
#[command(name = "shipwright")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for status messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the package and rewrite package.json
    Build(BuildArgs),

    /// Rewrite the entry-point fields of package.json without compiling
    Manifest(ManifestArgs),

    /// List the source files a build would pick up
    Files(FilesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Status output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

/// Options shared by commands that rewrite package.json.
#[derive(Args, Debug, Clone, Default)]
pub struct PackageArgs {
    /// Output directory [default: dist]
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<String>,

    /// package.json to rewrite [default: nearest package.json]
    #[arg(long, value_name = "FILE")]
    pub package_json: Option<PathBuf>,

    /// Primary entry module, without extension [default: index]
    #[arg(long, value_name = "MODULE")]
    pub main: Option<String>,

    /// Subpath exports, e.g. `foo/*,bar:some/other/file`
    #[arg(long = "exports-map", visible_alias = "exportsMap", value_name = "LIST")]
    pub exports_map: Vec<String>,

    /// Also emit a CommonJS tree and conditional exports
    #[arg(long, overrides_with = "no_cjs")]
    pub cjs: bool,

    /// Emit a single ES module tree even if config sets `cjs = true`
    #[arg(long = "no-cjs", overrides_with = "cjs")]
    pub no_cjs: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub package: PackageArgs,

    /// Language target for the transpiler [default: es2022]
    #[arg(long, value_name = "TARGET")]
    pub target: Option<String>,

    /// Project tsconfig for the declaration build [default: tsconfig.json]
    #[arg(long, value_name = "FILE")]
    pub tsconfig: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    #[command(flatten)]
    pub package: PackageArgs,
}

#[derive(Args, Debug, Clone)]
pub struct FilesArgs {
    /// package.json of the package to inspect [default: nearest package.json]
    #[arg(long, value_name = "FILE")]
    pub package_json: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::parse_from([
            "shipwright",
            "build",
            "--cjs",
            "--exports-map",
            "foo/*,bar:some/other/file",
            "--target",
            "es2019",
        ]);

        match cli.command {
            Commands::Build(args) => {
                assert!(args.package.cjs);
                assert_eq!(args.package.exports_map, vec!["foo/*,bar:some/other/file"]);
                assert_eq!(args.target.as_deref(), Some("es2019"));
            }
            _ => panic!("expected build"),
        }
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_last_cjs_flag_wins() {
        let cli = Cli::parse_from(["shipwright", "manifest", "--cjs", "--no-cjs"]);
        match cli.command {
            Commands::Manifest(args) => {
                assert!(!args.package.cjs);
                assert!(args.package.no_cjs);
            }
            _ => panic!("expected manifest"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from([
            "shipwright",
            "files",
            "--color",
            "never",
            "--message-format",
            "json",
        ]);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.message_format, MessageFormat::Json);
    }
}
