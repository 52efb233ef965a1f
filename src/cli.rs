use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfbatch")]
#[command(about = "Split or merge every PDF in a directory tree")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an operation over a directory tree
    #[command(alias = "run")]
    Process {
        /// Root directory to scan
        path: PathBuf,

        /// Operation to perform: split or merge
        #[arg(short, long, default_value = "split")]
        operation: String,

        #[command(flatten)]
        merge: MergeArgs,
    },

    /// Split every multi-page PDF into one PDF per page
    #[command(alias = "burst")]
    Split {
        /// Root directory to scan
        path: PathBuf,
    },

    /// Merge the PDFs of each directory into one file per directory
    Merge {
        /// Root directory to scan
        path: PathBuf,

        #[command(flatten)]
        merge: MergeArgs,
    },

    /// Serve the local HTTP endpoint
    Serve(ServeArgs),

    /// Run as MCP server over stdio
    Mcp,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Do not stamp page numbers on merged output
    #[arg(long)]
    pub no_page_numbers: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "PDFBATCH_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PDFBATCH_PORT", default_value = "3000")]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_defaults_to_split() {
        let cli = Cli::try_parse_from(["pdfbatch", "process", "/docs"]).unwrap();
        match cli.command {
            Commands::Process {
                path,
                operation,
                merge,
            } => {
                assert_eq!(path, PathBuf::from("/docs"));
                assert_eq!(operation, "split");
                assert!(!merge.no_page_numbers);
            }
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn test_merge_flags() {
        let cli =
            Cli::try_parse_from(["pdfbatch", "merge", "/docs", "--no-page-numbers"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Merge { merge: MergeArgs { no_page_numbers: true }, .. }
        ));
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["pdfbatch", "serve", "--port", "4100"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 4100);
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["pdfbatch", "split"]).is_err());
    }
}
