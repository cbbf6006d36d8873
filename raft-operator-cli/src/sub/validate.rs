use super::*;

use raft_operator::config::Builder;

#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Configuration files, or directories whose *.json files are read in
    /// alphabetical order. Later sources override earlier ones.
    #[arg(value_name = "FILE_OR_DIRECTORY")]
    paths: Vec<PathBuf>,
    #[arg(
        long = "config-file",
        alias = "config-dir",
        value_name = "PATH",
        hide = true
    )]
    flag_paths: Vec<PathBuf>,
    /// Print nothing if the configuration is valid.
    #[arg(long)]
    quiet: bool,
}

impl CommandArgs {
    fn sources(&self) -> Vec<PathBuf> {
        self.flag_paths
            .iter()
            .chain(&self.paths)
            .cloned()
            .collect()
    }
}

pub fn run(args: CommandArgs, out: &mut impl Write) -> Result<()> {
    let sources = args.sources();
    if sources.is_empty() {
        anyhow::bail!("Must specify at least one config file or directory");
    }
    let config = Builder::new(sources)
        .build_and_validate()
        .context("Config validation failed")?;
    debug!("validated config (datacenter={})", config.datacenter);
    if !args.quiet {
        writeln!(out, "Configuration is valid!")?;
    }
    Ok(())
}
