use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::orchestrator::{Action, Completion, Orchestrator};
use crate::platform::readiness::{ReadinessResult, bootstrap};
use crate::platform::{EdgeGateway, IdentityClient, ResolveIdentity, SubmitEvents};
use crate::ui::{render, style};

/// Wire everything together and run the selected mode.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    config.apply_env_overrides();
    if let Some(base_url) = cli.base_url {
        config.edge.base_url = base_url;
    }

    let readiness = Arc::new(bootstrap(&config));
    info!(
        environment_id = %readiness.environment_id,
        ready = readiness.ready,
        "startup handshake complete"
    );

    let gateway: Arc<dyn SubmitEvents> = Arc::new(EdgeGateway::new(&config));
    let identity: Arc<dyn ResolveIdentity> = Arc::new(IdentityClient::new(&config));

    let (completions_tx, completions_rx) = mpsc::unbounded_channel();
    let mut orchestrator = Orchestrator::new(
        gateway,
        identity,
        Arc::clone(&readiness),
        completions_tx,
    );
    orchestrator.log_readiness();

    match cli.command {
        Some(Command::Status) => {
            render_all(&orchestrator, &readiness);
            Ok(())
        }
        Some(Command::Basic) => run_once(orchestrator, &readiness, completions_rx, Action::SendBasic).await,
        Some(Command::Data) => {
            run_once(orchestrator, &readiness, completions_rx, Action::SendWithData).await
        }
        Some(Command::Identity) => {
            run_once(orchestrator, &readiness, completions_rx, Action::FetchIdentity).await
        }
        None => interactive(orchestrator, &readiness, completions_rx).await,
    }
}

/// Dispatch one action, wait for its completion, print the result.
async fn run_once(
    mut orchestrator: Orchestrator,
    readiness: &ReadinessResult,
    mut completions: mpsc::UnboundedReceiver<Completion>,
    action: Action,
) -> Result<()> {
    orchestrator.dispatch(action);
    if let Some(completion) = completions.recv().await {
        orchestrator.apply(completion);
    }
    render_all(&orchestrator, readiness);
    Ok(())
}

/// Interactive mode: this loop is the single consumer of both user commands
/// and remote completions, so display state is only ever touched here.
async fn interactive(
    mut orchestrator: Orchestrator,
    readiness: &ReadinessResult,
    mut completions: mpsc::UnboundedReceiver<Completion>,
) -> Result<()> {
    println!("{}", style::header("edgeprobe"));
    println!(
        "{}",
        style::dim("commands: basic | data | identity | clear | show | quit")
    );
    render_all(&orchestrator, readiness);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            completion = completions.recv() => {
                let Some(completion) = completion else { break };
                orchestrator.apply(completion);
                render_all(&orchestrator, readiness);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {}
                    "basic" => {
                        orchestrator.dispatch(Action::SendBasic);
                        render_all(&orchestrator, readiness);
                    }
                    "data" => {
                        orchestrator.dispatch(Action::SendWithData);
                        render_all(&orchestrator, readiness);
                    }
                    "identity" => {
                        orchestrator.dispatch(Action::FetchIdentity);
                        render_all(&orchestrator, readiness);
                    }
                    "clear" => {
                        orchestrator.dispatch(Action::Clear);
                        render_all(&orchestrator, readiness);
                    }
                    "show" => render_all(&orchestrator, readiness),
                    "quit" | "exit" => break,
                    other => println!("{}", style::yellow(format!("unknown command: {other}"))),
                }
            }
        }
    }

    Ok(())
}

fn render_all(orchestrator: &Orchestrator, readiness: &ReadinessResult) {
    let (entries, status) = orchestrator.snapshot();

    println!();
    println!(
        "{} {}",
        style::cyan("status:"),
        render::status_line(&status, readiness)
    );
    println!(
        "{} {}",
        style::cyan("identity:"),
        style::value(orchestrator.identity_line())
    );
    print!("{}", render::log_text(&entries));
}
