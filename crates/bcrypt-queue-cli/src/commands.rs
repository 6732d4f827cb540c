//! Command handlers for the bcrypt-queue CLI

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use bcrypt_queue_core::HashInfo;
use bcrypt_queue_harness::{Invocation, ScriptValue};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::host_loop::HostLoop;

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        match cli.command {
            Commands::Hash {
                password,
                cost,
                count,
            } => Self::handle_hash_command(config, password, cost, count).await,
            Commands::Verify { password, hash } => {
                Self::handle_verify_command(config, password, hash).await
            }
            Commands::Inspect { hash } => Self::handle_inspect_command(&hash),
            Commands::Stress {
                jobs,
                cost,
                producers,
                hosts,
            } => Self::handle_stress_command(config, jobs, cost, producers, hosts).await,
            Commands::Config => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        }
    }

    /// Handle the hash command
    async fn handle_hash_command(
        config: AppConfig,
        password: String,
        cost: u16,
        count: usize,
    ) -> Result<()> {
        let mut host = HostLoop::start(config, 1)?;
        for id in 0..count {
            if !host.plugin().submit_hash(0, id as i32, password.as_bytes(), cost) {
                return Err(CliError::Rejected(format!(
                    "cost {} is outside 4-31",
                    cost
                )));
            }
        }

        host.run_until(count).await?;
        for call in host.log().snapshot() {
            println!("{}", render(&call));
        }
        host.shutdown();
        Ok(())
    }

    /// Handle the verify command
    async fn handle_verify_command(config: AppConfig, password: String, hash: String) -> Result<()> {
        let mut host = HostLoop::start(config, 1)?;
        if !host
            .plugin()
            .submit_verify(0, 0, password.as_bytes(), hash.as_bytes())
        {
            return Err(CliError::Rejected("verify job was refused".to_string()));
        }

        host.run_until(1).await?;
        for call in host.log().snapshot() {
            println!("{}", render(&call));
        }
        host.shutdown();
        Ok(())
    }

    /// Handle the inspect command
    fn handle_inspect_command(hash: &str) -> Result<()> {
        let info = HashInfo::parse(hash).ok_or_else(|| CliError::MalformedHash(hash.to_string()))?;
        println!("{}", serde_json::to_string_pretty(&info)?);
        Ok(())
    }

    /// Handle the stress command
    async fn handle_stress_command(
        config: AppConfig,
        jobs: usize,
        cost: u16,
        producers: usize,
        hosts: usize,
    ) -> Result<()> {
        if hosts == 0 {
            return Err(CliError::Config(
                "stress needs at least one host to deliver to".to_string(),
            ));
        }
        let producers = producers.max(1);
        let mut host = HostLoop::start(config, hosts)?;
        info!(
            "Submitting {} jobs at cost {} from {} producers to {} scripts",
            jobs, cost, producers, hosts
        );

        let started = Instant::now();
        let dispatcher = Arc::new(host.plugin().dispatcher().clone());
        let handles: Vec<_> = (0..producers)
            .map(|producer| {
                let dispatcher = Arc::clone(&dispatcher);
                thread::spawn(move || {
                    let mut accepted = 0usize;
                    for n in (producer..jobs).step_by(producers) {
                        let secret = format!("stress-{}", n);
                        if dispatcher.submit_hash(producer as i32, n as i32, secret.as_bytes(), cost) {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            accepted += handle
                .join()
                .map_err(|_| CliError::Rejected("producer thread panicked".to_string()))?;
        }
        if accepted != jobs {
            return Err(CliError::Rejected(format!(
                "{} of {} jobs were refused",
                jobs - accepted,
                jobs
            )));
        }

        let outcome = host.run_until(jobs * hosts).await?;
        let elapsed = started.elapsed();
        let stats = host.shutdown();

        println!(
            "{} jobs delivered to {} scripts in {:.2?} over {} ticks ({:.1} jobs/s)",
            jobs,
            hosts,
            elapsed,
            outcome.ticks,
            jobs as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
        );
        println!("{}", serde_json::to_string_pretty(&stats)?);
        Ok(())
    }
}

/// `OnHashed(0, 1, "$2y$...")`
fn render(call: &Invocation) -> String {
    let args: Vec<String> = call
        .args
        .iter()
        .map(|arg| match arg {
            ScriptValue::Int(v) => v.to_string(),
            ScriptValue::Bool(v) => v.to_string(),
            ScriptValue::Str(v) => format!("\"{}\"", v),
        })
        .collect();
    format!("{}({})", call.callback, args.join(", "))
}
