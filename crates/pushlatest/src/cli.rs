//! CLI argument parsing with clap

use clap::Parser;
use pushlatest_core::Verbosity;

/// Push a locally built image, and promote it to a target tag only if its content changed
#[derive(Parser, Debug)]
#[command(name = "pushlatest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Local image tag to be considered for pushing,
    /// for example `docker.example.com/img-name:2017.01.05`
    #[arg(long, value_name = "REPO:TAG")]
    pub source: String,

    /// Target remote image to push if the image changed.
    /// Defaults to `<repository of --source>:latest`
    #[arg(long, value_name = "REPO[:TAG]")]
    pub target: Option<String>,

    /// Show what would happen without tagging or pushing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase verbosity (-v: runtime commands, -vv: full recipes and package lists)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Container runtime binary, by name or path
    #[arg(long, default_value = "docker", value_name = "PATH")]
    pub docker: String,

    /// Command whose output lists the installed content of an image
    /// (default: `dpkg -l`). Split with shell quoting rules but run without
    /// a shell, so wrap pipelines as `sh -c 'rpm -qa | sort'`
    #[arg(long, value_name = "COMMAND")]
    pub package_list_command: Option<String>,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_count(self.verbose)
    }

    /// `--package-list-command` split into program and arguments, if given
    pub fn package_list_command(&self) -> Result<Option<Vec<String>>, shell_words::ParseError> {
        self.package_list_command
            .as_deref()
            .map(shell_words::split)
            .transpose()
    }
}
