//! CLI argument parsing

use crate::DEFAULT_PROGRESS_EVERY;

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config: String,
    pub run: String,
    pub jobs: usize,
    pub progress_every: u64,
    pub dry_run: bool,
    pub json: bool,
    pub quiet: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config: String::new(),
            run: String::new(),
            jobs: 1,
            progress_every: DEFAULT_PROGRESS_EVERY,
            dry_run: false,
            json: false,
            quiet: false,
        }
    }
}

/// Parse command line arguments (`args[0]` is the program name)
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli_args = CliArgs::default();
    let mut positionals: Vec<&str> = Vec::new();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--jobs" => {
                i += 1;
                if i >= args.len() {
                    return Err("--jobs requires a value".to_string());
                }
                let jobs: usize = args[i]
                    .parse()
                    .map_err(|_| "--jobs must be a positive integer".to_string())?;
                if jobs == 0 {
                    return Err("--jobs must be greater than zero".to_string());
                }
                cli_args.jobs = jobs;
            }
            "--progress-every" => {
                i += 1;
                if i >= args.len() {
                    return Err("--progress-every requires a value".to_string());
                }
                let every: u64 = args[i]
                    .parse()
                    .map_err(|_| "--progress-every must be a positive integer".to_string())?;
                if every == 0 {
                    return Err("--progress-every must be greater than zero".to_string());
                }
                cli_args.progress_every = every;
            }
            "--dry-run" => {
                cli_args.dry_run = true;
            }
            "--json" => {
                cli_args.json = true;
            }
            "--quiet" => {
                cli_args.quiet = true;
            }
            arg if !arg.starts_with("--") => positionals.push(arg),
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    match positionals.as_slice() {
        [config, run] => {
            cli_args.config = (*config).to_string();
            cli_args.run = (*run).to_string();
        }
        [] | [_] => return Err("Expected two arguments: <CONFIG> <RUN>".to_string()),
        [_, _, extra, ..] => return Err(format!("Unexpected argument: {extra}")),
    }

    Ok(cli_args)
}
