//! Argument parsing and end-to-end command runs

use bcrypt_queue_cli::cli::{Cli, Commands, ExecutorArg};
use bcrypt_queue_cli::commands::CommandDispatcher;
use bcrypt_queue_cli::config::AppConfig;
use bcrypt_queue_cli::error::CliError;
use bcrypt_queue_cli::host_loop::HostLoop;
use bcrypt_queue_core::{ExecutorKind, HashInfo};
use bcrypt_queue_harness::ScriptValue;
use clap::Parser;

fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.dispatcher = config
        .dispatcher
        .with_executor(ExecutorKind::Pool)
        .with_pool_workers(4);
    config.host.tick_interval_ms = 1;
    config
}

#[test]
fn test_parse_global_flags_and_hash() {
    let cli = Cli::try_parse_from([
        "bcrypt-queue",
        "-v",
        "--executor",
        "pool",
        "--tick-ms",
        "2",
        "hash",
        "hunter2",
        "-C",
        "6",
        "-n",
        "3",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.executor, Some(ExecutorArg::Pool));
    assert_eq!(cli.tick_ms, Some(2));
    match cli.command {
        Commands::Hash {
            password,
            cost,
            count,
        } => {
            assert_eq!(password, "hunter2");
            assert_eq!((cost, count), (6, 3));
        }
        _ => panic!("expected hash command"),
    }
}

#[test]
fn test_parse_stress_defaults() {
    let cli = Cli::try_parse_from(["bcrypt-queue", "stress"]).unwrap();
    match cli.command {
        Commands::Stress {
            jobs,
            cost,
            producers,
            hosts,
        } => assert_eq!((jobs, cost, producers, hosts), (64, 4, 4, 1)),
        _ => panic!("expected stress command"),
    }
    assert!(Cli::try_parse_from(["bcrypt-queue", "-e", "fibers", "config"]).is_err());
}

#[tokio::test]
async fn test_hash_then_verify_through_host_loop() {
    let mut host = HostLoop::start(fast_config(), 1).unwrap();
    assert!(host.plugin().submit_hash(0, 7, b"hunter2", 4));
    host.run_until(1).await.unwrap();

    let calls = host.log().calls_to("OnHashed");
    assert_eq!(calls[0].tag(), Some((0, 7)));
    let ScriptValue::Str(hash) = calls[0].args[2].clone() else {
        panic!("hash payload must be a string");
    };
    assert_eq!(HashInfo::parse(&hash).unwrap().cost.get(), 4);

    assert!(host.plugin().submit_verify(0, 8, b"hunter2", hash.as_bytes()));
    host.run_until(2).await.unwrap();
    let verified = host.log().calls_to("OnVerified");
    assert_eq!(verified[0].args[2], ScriptValue::Bool(true));

    let stats = host.shutdown();
    assert_eq!(stats.completed, 2);
}

#[tokio::test]
async fn test_commands_run_to_completion() {
    let cli = Cli::try_parse_from(["bcrypt-queue", "stress", "-j", "12", "-p", "3", "--hosts", "2"])
        .unwrap();
    CommandDispatcher::execute(cli, fast_config()).await.unwrap();

    let cli = Cli::try_parse_from(["bcrypt-queue", "hash", "pw", "-C", "3"]).unwrap();
    assert!(matches!(
        CommandDispatcher::execute(cli, fast_config()).await,
        Err(CliError::Rejected(_))
    ));

    let cli = Cli::try_parse_from(["bcrypt-queue", "stress", "-j", "4", "--hosts", "0"]).unwrap();
    assert!(matches!(
        CommandDispatcher::execute(cli, fast_config()).await,
        Err(CliError::Config(_))
    ));

    let cli = Cli::try_parse_from(["bcrypt-queue", "verify", "pw", "not-a-hash"]).unwrap();
    CommandDispatcher::execute(cli, fast_config()).await.unwrap();

    let cli = Cli::try_parse_from(["bcrypt-queue", "inspect", "nope"]).unwrap();
    assert!(matches!(
        CommandDispatcher::execute(cli, fast_config()).await,
        Err(CliError::MalformedHash(_))
    ));
}
