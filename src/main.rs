//! Contest Client - Application Entry Point
//!
//! Command-line host for the contest client. Rendered output goes to
//! stdout, logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use contest_client::{
    api::ContestApi,
    config::{Config, LogConfig, LogFormat},
    constants::SAMPLE_CONTEST_ID,
    display,
    error::AppError,
    models::ProblemId,
    services::{ContestService, LeaderboardSnapshot, TrackerPhase},
    session::SessionContext,
    state::AppState,
    utils::now_local,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a contest under a username
    Join {
        /// Contest identifier, e.g. CONTEST001
        contest_id: String,
        /// Name shown on the leaderboard
        username: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the joined contest and its problems
    Contest {
        /// Contest to open; must match the joined one
        contest_id: Option<String>,
    },
    /// Show a problem statement
    Problem {
        /// Problem id as listed by `contest`
        problem_id: ProblemId,
    },
    /// Print the starter Java solution
    Template,
    /// Submit a solution and follow it until judged
    Submit {
        /// Problem id as listed by `contest`
        problem_id: ProblemId,
        /// Source file; reads stdin when omitted
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
    /// Show the current state of one or more submissions
    Status {
        /// Ids returned by `submit`
        #[arg(required = true)]
        submission_ids: Vec<String>,
    },
    /// Show the contest standings
    Leaderboard {
        /// Keep refreshing until interrupted; type `r` + Enter to retry
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.rust_log.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn report(err: &anyhow::Error) {
    eprintln!("error: {err:#}");

    match err.downcast_ref::<AppError>() {
        Some(AppError::SessionRequired(_)) => {
            eprintln!("hint: run `contest-client join <CONTEST_ID> <USERNAME>`");
        }
        Some(AppError::NotFound(_)) => {
            eprintln!("hint: check the id (the sample contest is {SAMPLE_CONTEST_ID})");
        }
        Some(e) if e.is_retryable() => {
            eprintln!("hint: the backend may be unavailable, try again");
        }
        _ => {}
    }
}

async fn run(command: Commands, config: Config) -> anyhow::Result<ExitCode> {
    let state = AppState::connect(config)?;
    tracing::debug!(base_url = %state.config().api.base_url, "Client ready");

    match command {
        Commands::Join {
            contest_id,
            username,
        } => {
            let session =
                ContestService::join(state.api().as_ref(), state.sessions(), &contest_id, &username)
                    .await?;
            println!(
                "Joined {} as {}",
                session.contest_id, session.username
            );
        }
        Commands::Logout => {
            if state.sessions().clear().await? {
                println!("Logged out");
            } else {
                println!("No active session");
            }
        }
        Commands::Contest { contest_id } => {
            let (_, contest) = open_contest(&state, contest_id.as_deref()).await?;
            print!("{}", display::render_contest(&contest, now_local()));
        }
        Commands::Problem { problem_id } => {
            let (_, contest) = open_contest(&state, None).await?;
            let problem = contest.problem(problem_id).ok_or_else(|| {
                AppError::NotFound(format!("Problem not found with ID: {problem_id}"))
            })?;
            print!("{}", display::render_problem(problem));
        }
        Commands::Template => {
            println!("{}", display::code_template());
        }
        Commands::Submit { problem_id, file } => {
            return submit(&state, problem_id, file).await;
        }
        Commands::Status { submission_ids } => {
            state.sessions().current(state.session_ttl()).await?;
            let api = state.api();
            let submissions = futures::future::try_join_all(
                submission_ids.iter().map(|id| api.get_submission(id)),
            )
            .await?;
            for submission in &submissions {
                print!("{}", display::render_submission(submission));
            }
        }
        Commands::Leaderboard { watch } => {
            let session = state.sessions().current(state.session_ttl()).await?;
            if watch {
                watch_leaderboard(&state, &session).await?;
            } else {
                let refresher = state.leaderboard_refresher();
                let snapshot = LeaderboardSnapshot {
                    contest_id: Some(session.contest_id.clone()),
                    entries: refresher.fetch(&session.contest_id).await?,
                    ..LeaderboardSnapshot::default()
                };
                print!("{}", display::render_leaderboard(&snapshot, refresher.period()));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Load the session and open `contest_id`, or the contest it belongs to
async fn open_contest(
    state: &AppState,
    contest_id: Option<&str>,
) -> anyhow::Result<(SessionContext, contest_client::models::Contest)> {
    let opened = ContestService::open_saved(
        state.api().as_ref(),
        state.sessions(),
        contest_id,
        state.session_ttl(),
    )
    .await?;
    Ok(opened)
}

async fn read_source(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("failed to read source from stdin")?;
            Ok(code)
        }
    }
}

async fn submit(
    state: &AppState,
    problem_id: ProblemId,
    file: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let (session, contest) = open_contest(state, None).await?;
    let problem = contest.problem(problem_id).ok_or_else(|| {
        AppError::NotFound(format!("Problem not found with ID: {problem_id}"))
    })?;
    let code = read_source(file).await?;

    let tracker = state.submission_tracker();
    let mut updates = tracker.subscribe();
    let handle = tracker.submit(problem.id, &session.username, &code).await?;
    println!("Submitted {} for {}", handle.submission_id(), problem.title);

    let mut last_rendered = String::new();
    loop {
        let snapshot = updates.borrow_and_update().clone();
        tracing::debug!(
            phase = snapshot.phase.name(),
            generation = snapshot.generation,
            "Tracker state changed"
        );
        let rendered = display::render_tracker_phase(&snapshot.phase);
        if rendered != last_rendered {
            print!("{rendered}");
            last_rendered = rendered;
        }

        match snapshot.phase {
            TrackerPhase::Done { .. } => return Ok(ExitCode::SUCCESS),
            TrackerPhase::Failed { .. } => return Ok(ExitCode::FAILURE),
            TrackerPhase::Cancelled { .. } => return Ok(ExitCode::from(130)),
            _ => {}
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(ExitCode::FAILURE);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracker.cancel();
            }
        }
    }
}

async fn watch_leaderboard(state: &AppState, session: &SessionContext) -> anyhow::Result<()> {
    let refresher = state.leaderboard_refresher();
    let mut updates = refresher.subscribe();
    let handle = refresher.start(&session.contest_id);
    println!("Watching the {} leaderboard (Ctrl-C to stop)", handle.contest_id());
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.loading {
                    print!("{}", display::render_leaderboard(&snapshot, refresher.period()));
                    println!();
                }
            }
            line = input.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) if line.trim().eq_ignore_ascii_case("r") => {
                        if !refresher.retry(&handle) {
                            println!("Refresh already in progress");
                        }
                    }
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => input_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    refresher.stop(&handle);
    Ok(())
}
