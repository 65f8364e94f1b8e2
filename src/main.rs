use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, ExitStatus};

use anyhow::{bail, Context, Result};
use clap::Parser;
use stdio_guard::config::Config;
use stdio_guard::{ChannelSlot, RedirectGuard, RedirectOptions, RestoreFailurePolicy, WritePolicy};

/// Run a command with its standard streams redirected to files.
#[derive(Debug, Parser)]
#[command(name = "stdio-guard", version)]
struct Cli {
    /// Read standard input from this file
    #[arg(long, value_name = "PATH")]
    stdin: Option<PathBuf>,

    /// Write standard output to this file
    #[arg(long, value_name = "PATH")]
    stdout: Option<PathBuf>,

    /// Write standard error to this file
    #[arg(long, value_name = "PATH")]
    stderr: Option<PathBuf>,

    /// Redirect a channel given by name, e.g. `stdout=out.txt` (repeatable)
    #[arg(long = "redirect", value_name = "CHANNEL=PATH", value_parser = parse_redirect)]
    redirect: Vec<(ChannelSlot, PathBuf)>,

    /// Append to existing output files instead of truncating them
    #[arg(long)]
    append: bool,

    /// Abort if a stream cannot be restored after the command exits
    #[arg(long)]
    abort_on_restore_failure: bool,

    /// Config file (default: <config dir>/stdio-guard/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Command to run, followed by its arguments
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

impl Cli {
    /// Requested redirects in installation order (stdin, stdout, stderr).
    ///
    /// Each channel may be named once, either by its own flag or by
    /// `--redirect`.
    fn targets(&self) -> Result<Vec<(ChannelSlot, &Path)>> {
        let mut targets = Vec::new();
        for slot in ChannelSlot::ALL {
            let flag = match slot {
                ChannelSlot::Input => self.stdin.as_deref(),
                ChannelSlot::Output => self.stdout.as_deref(),
                ChannelSlot::Error => self.stderr.as_deref(),
            };
            let mut paths = flag.into_iter().chain(
                self.redirect
                    .iter()
                    .filter(|(target, _)| *target == slot)
                    .map(|(_, path)| path.as_path()),
            );
            if let Some(path) = paths.next() {
                if paths.next().is_some() {
                    bail!("{} is redirected more than once", slot);
                }
                targets.push((slot, path));
            }
        }
        Ok(targets)
    }

    /// Flags override whatever the config file says.
    fn redirect_options(&self, config: &Config) -> RedirectOptions {
        let mut options = config.redirect.clone();
        if self.append {
            options.write_policy = WritePolicy::Append;
        }
        if self.abort_on_restore_failure {
            options.on_restore_failure = RestoreFailurePolicy::Abort;
        }
        options
    }

    fn load_config(&self) -> Result<Config> {
        let path = self.config.clone().unwrap_or_else(Config::config_path);
        Config::load_from(&path).context("Failed to load configuration")
    }
}

fn parse_redirect(value: &str) -> Result<(ChannelSlot, PathBuf), String> {
    let (slot, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CHANNEL=PATH, got '{}'", value))?;
    let slot = slot.parse::<ChannelSlot>().map_err(|e| e.to_string())?;
    if path.is_empty() {
        return Err(format!("missing path for {}", slot));
    }
    Ok((slot, PathBuf::from(path)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::from(2);
        }
    };
    stdio_guard::logging::init_tracing(&config.logging);

    // Guards are gone by the time `run` returns, so errors print to the
    // original stderr.
    match run(&cli, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<ExitCode> {
    let options = cli.redirect_options(config);

    let mut guards = Vec::new();
    for (slot, path) in cli.targets()? {
        let guard = RedirectGuard::create_with(path, slot, &options)
            .with_context(|| format!("Failed to redirect {}", slot))?;
        guards.push(guard);
    }

    let (program, args) = cli
        .command
        .split_first()
        .context("No command given")?;
    let status = Command::new(program).args(args).status();

    while let Some(guard) = guards.pop() {
        drop(guard);
    }

    let status = status.with_context(|| format!("Failed to run '{}'", program))?;
    tracing::debug!("'{}' exited with {}", program, status);
    Ok(exit_code(status))
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::from(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stdio-guard").chain(args.iter().copied()))
            .expect("Failed to parse args")
    }

    #[test]
    fn targets_follow_stdin_stdout_stderr_order() {
        let cli = parse(&["--stderr", "e.txt", "--stdin", "i.txt", "--", "cat"]);
        let targets = cli.targets().unwrap();
        assert_eq!(
            targets,
            vec![
                (ChannelSlot::Input, Path::new("i.txt")),
                (ChannelSlot::Error, Path::new("e.txt")),
            ]
        );
    }

    #[test]
    fn redirect_flag_names_channel() {
        let cli = parse(&["--redirect", "err=e.txt", "--redirect", "stdout=o.txt", "true"]);
        assert_eq!(
            cli.targets().unwrap(),
            vec![
                (ChannelSlot::Output, Path::new("o.txt")),
                (ChannelSlot::Error, Path::new("e.txt")),
            ]
        );
    }

    #[test]
    fn redirect_flag_rejects_unknown_channel_and_missing_path() {
        assert!(Cli::try_parse_from(["stdio-guard", "--redirect", "stdlog=x", "true"]).is_err());
        assert!(Cli::try_parse_from(["stdio-guard", "--redirect", "stdout=", "true"]).is_err());
        assert!(Cli::try_parse_from(["stdio-guard", "--redirect", "stdout", "true"]).is_err());
    }

    #[test]
    fn channel_named_twice_is_an_error() {
        let cli = parse(&["--stdout", "a.txt", "--redirect", "out=b.txt", "true"]);
        let err = cli.targets().unwrap_err();
        assert!(err.to_string().contains("stdout is redirected more than once"));
    }

    #[test]
    fn command_keeps_its_own_flags() {
        let cli = parse(&["--stdout", "o.txt", "ls", "-la", "--color"]);
        assert_eq!(cli.command, vec!["ls", "-la", "--color"]);
    }

    #[test]
    fn command_is_required() {
        let result = Cli::try_parse_from(["stdio-guard", "--stdout", "o.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&["--append", "--abort-on-restore-failure", "true"]);
        let options = cli.redirect_options(&Config::default());
        assert_eq!(options.write_policy, WritePolicy::Append);
        assert_eq!(options.on_restore_failure, RestoreFailurePolicy::Abort);
    }

    #[test]
    fn config_applies_without_flags() {
        let cli = parse(&["true"]);
        let mut config = Config::default();
        config.redirect.write_policy = WritePolicy::Append;
        let options = cli.redirect_options(&config);
        assert_eq!(options.write_policy, WritePolicy::Append);
        assert_eq!(options.on_restore_failure, RestoreFailurePolicy::Log);
    }
}
