//! Transcript daemon: serves the HTTP API and runs operator commands.

mod app;
mod config;
mod import;
mod shutdown;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use transcript_rpc::RpcServer;
use transcript_types::ActorRef;
use transcript_utils::{format_rfc3339, init_tracing, LogFormat};

use crate::app::Services;
use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "transcript-daemon", about = "Certified academic transcript service")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, global = true, env = "TRANSCRIPT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the LMDB environment.
    #[arg(long, global = true, env = "TRANSCRIPT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP listen port.
    #[arg(long, global = true, env = "TRANSCRIPT_LISTEN_PORT")]
    listen_port: Option<u16>,

    /// Base of public verification and download URLs.
    #[arg(long, global = true, env = "TRANSCRIPT_PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    #[arg(long, global = true, env = "TRANSCRIPT_INSTITUTION_NAME")]
    institution_name: Option<String>,

    #[arg(long, global = true, env = "TRANSCRIPT_INSTITUTION_SUBTITLE")]
    institution_subtitle: Option<String>,

    #[arg(long, global = true, env = "TRANSCRIPT_ISSUER_LINE")]
    issuer_line: Option<String>,

    /// Worker threads for batch decisions.
    #[arg(long, global = true, env = "TRANSCRIPT_BATCH_PARALLELISM")]
    batch_parallelism: Option<usize>,

    #[arg(long, global = true, env = "TRANSCRIPT_AUDIT_PAGE_DEFAULT")]
    audit_page_default: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "TRANSCRIPT_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "TRANSCRIPT_LOG_LEVEL")]
    log_level: Option<String>,

    /// LMDB map size in MiB.
    #[arg(long, global = true, env = "TRANSCRIPT_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP API until SIGINT/SIGTERM.
    Serve,
    /// Look up a verification code.
    Verify { code: String },
    /// List pending requests, oldest first.
    Pending {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show the most recent audit entries.
    Audit {
        #[arg(long, default_value_t = 20)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Print the effective configuration as TOML.
    Config,
    /// Load students and academic records from a TOML file.
    Import {
        file: PathBuf,
        /// Actor recorded on the audit entries.
        #[arg(long, default_value = "import")]
        actor: String,
    },
}

impl Cli {
    /// Layer CLI flags and env vars over the file (or default) config.
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let base = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => DaemonConfig::default(),
        };
        let config = DaemonConfig {
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            listen_port: self.listen_port.unwrap_or(base.listen_port),
            public_base_url: self.public_base_url.clone().unwrap_or(base.public_base_url),
            institution_name: self.institution_name.clone().unwrap_or(base.institution_name),
            institution_subtitle: self
                .institution_subtitle
                .clone()
                .unwrap_or(base.institution_subtitle),
            issuer_line: self.issuer_line.clone().unwrap_or(base.issuer_line),
            batch_parallelism: self.batch_parallelism.unwrap_or(base.batch_parallelism),
            audit_page_default: self.audit_page_default.unwrap_or(base.audit_page_default),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            map_size_mb: self.map_size_mb.unwrap_or(base.map_size_mb),
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let format: LogFormat = config.log_format.parse().map_err(anyhow::Error::msg)?;
    init_tracing(format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let services = Services::production(&config)?;

    match cli.command {
        Command::Config => {}
        Command::Serve => {
            tracing::info!(
                port = config.listen_port,
                data_dir = %config.data_dir.display(),
                public_base_url = %config.public_base_url,
                "starting transcript daemon"
            );
            let state = services.app_state(&config)?;
            let server = RpcServer::new(config.listen_port, state);
            server.start(shutdown::wait_for_signal()).await?;
            tracing::info!("transcript daemon exited cleanly");
        }
        Command::Verify { code } => {
            let result = services.verification.verify(&code);
            if !result.valid {
                println!("invalid");
                return Ok(());
            }
            println!("valid");
            println!("student:  {}", result.student_name.unwrap_or_default());
            println!("usn:      {}", result.usn.unwrap_or_default());
            if let Some(program) = result.program {
                println!("program:  {program}");
            }
            if let Some(cgpa) = result.latest_cgpa {
                println!("cgpa:     {cgpa}");
            }
            if let Some(at) = result.approval_date {
                println!("approved: {}", format_rfc3339(at));
            }
        }
        Command::Pending { limit } => {
            for item in services.machine.list_pending(limit)? {
                println!(
                    "{}  {}  {}  {}",
                    item.request.id,
                    item.request.student,
                    format_rfc3339(item.request.requested_at),
                    item.student_name
                );
            }
        }
        Command::Audit { count, offset } => {
            for entry in services.machine.audit().latest(offset, count)? {
                println!(
                    "{}  {:<22} {}  {}  by {}",
                    format_rfc3339(entry.created_at),
                    entry.entity_type.as_str(),
                    entry.entity_id,
                    entry.action.label(),
                    entry.actor
                );
            }
        }
        Command::Import { file, actor } => {
            let actor = ActorRef::parse(&actor)?;
            let summary = import::import_file(&file, &services.records, &actor)
                .with_context(|| format!("importing {}", file.display()))?;
            println!(
                "imported {} students, {} records",
                summary.students, summary.records
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&["transcript-daemon", "--listen-port", "9000", "--batch-parallelism", "2", "serve"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.batch_parallelism, 2);
        assert_eq!(config.audit_page_default, 50);
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.toml");
        std::fs::write(&path, "listen_port = 7000\ninstitution_name = \"ACME\"\n").unwrap();
        let path = path.to_string_lossy().to_string();
        let cli = parse(&["transcript-daemon", "--config", &path, "--listen-port", "7100", "pending"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.listen_port, 7100);
        assert_eq!(config.institution_name, "ACME");
    }

    #[test]
    fn zero_audit_page_is_refused() {
        let cli = parse(&["transcript-daemon", "--audit-page-default", "0", "serve"]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn import_takes_file_and_actor() {
        let cli = parse(&["transcript-daemon", "import", "students.toml", "--actor", "coe-7"]);
        match cli.command {
            Command::Import { file, actor } => {
                assert_eq!(file, PathBuf::from("students.toml"));
                assert_eq!(actor, "coe-7");
            }
            _ => panic!("expected import"),
        }
    }
}
