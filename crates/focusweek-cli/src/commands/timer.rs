use std::sync::PoisonError;

use clap::Subcommand;
use focusweek_core::timer::format_clock;
use focusweek_core::{
    Command, Config, CountdownDriver, DriverExit, Event, SessionView, SharedSession, TimerMode,
};
use serde::Serialize;
use tokio::sync::watch;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start when paused, pause when running
    Toggle,
    /// Stop and refill the current mode
    Reset,
    /// Switch to another mode (focus, short, long)
    Mode {
        mode: String,
    },
    /// Clear the focus-session counter
    ResetCycle,
    /// Print current timer state as JSON
    Status,
    /// Start (if needed) and count down in the foreground until the
    /// session ends or Ctrl-C
    Run {
        /// Do not draw the countdown on stderr
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Serialize)]
struct TimerOutcome {
    events: Vec<Event>,
    status: SessionView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutcome {
    stopped_by: &'static str,
    status: SessionView,
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    let command = match action {
        TimerAction::Start => Command::Start,
        TimerAction::Pause => Command::Pause,
        TimerAction::Toggle => Command::Toggle,
        TimerAction::Reset => Command::Reset,
        TimerAction::Mode { mode } => Command::SwitchMode(mode.parse::<TimerMode>()?),
        TimerAction::ResetCycle => Command::ResetCycle,
        TimerAction::Status => {
            let session = open_session(config)?;
            return print_json(&session.view());
        }
        TimerAction::Run { quiet } => return run_foreground(config, quiet),
    };

    let mut session = open_session(config)?;
    let events = session.dispatch(command)?;
    session.save()?;
    print_json(&TimerOutcome {
        events,
        status: session.view(),
    })
}

fn run_foreground(config: &Config, quiet: bool) -> CliResult {
    let mut session = open_session(config)?;
    if !session.engine().is_running() {
        session.dispatch(Command::Start)?;
    }
    session.save()?;

    let shared = session.into_shared();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let exit = runtime.block_on(drive(shared.clone(), quiet));
    if !quiet {
        eprintln!();
    }

    let mut session = shared.lock().unwrap_or_else(PoisonError::into_inner);
    session.save()?;
    print_json(&RunOutcome {
        stopped_by: match exit {
            DriverExit::TimerStopped => "timer",
            DriverExit::Shutdown => "interrupt",
        },
        status: session.view(),
    })
}

async fn drive(session: SharedSession, quiet: bool) -> DriverExit {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    CountdownDriver::new(session)
        .run(shutdown_rx, |state| {
            if !quiet {
                eprint!(
                    "\r{:<11} {}",
                    state.mode.label(),
                    format_clock(state.remaining_seconds)
                );
            }
        })
        .await
}
