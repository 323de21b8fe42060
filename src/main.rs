use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::Confirm;
use hydrate_tracker::{
    clock::SystemClock,
    commands::{render_history, render_status},
    config::Config,
    logging,
    notification::DesktopNotifier,
    storage::FileStore,
    structs::{Goal, Serving},
    tasks::ReminderState,
    Tracker,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

const SESSION_HELP: &str = "Commands: 250 | 500 | reset | goal <ml> | reminders on|off | history | status | quit";

#[derive(Parser)]
#[command(name = "hydrate-tracker", version, about = "a smol daily water tracker")]
struct Cli {
    /// Config file (default: platform config dir/config.json)
    #[arg(long, value_name = "PATH", env = "HYDRATE_CONFIG")]
    config: Option<PathBuf>,

    /// Where the store and logs are kept
    #[arg(long, value_name = "PATH", env = "HYDRATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Also log to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show today's progress (default)
    Status,
    /// Log a glass (+250ml) or a bottle (+500ml)
    Drink {
        #[arg(value_enum, default_value_t = ServingArg::Glass)]
        serving: ServingArg,
    },
    /// Start today over
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Change the daily goal (1500, 2000, 2500 or 3000)
    Goal {
        #[arg(value_parser = parse_goal)]
        ml: Goal,
    },
    /// Turn reminders on or off
    Reminders {
        #[arg(value_enum)]
        switch: Switch,
    },
    /// Show the last 7 days
    History,
    /// Interactive session, keeps reminders firing until you quit
    Run,
}

#[derive(Clone, Copy, ValueEnum)]
enum ServingArg {
    Glass,
    Bottle,
}

impl From<ServingArg> for Serving {
    fn from(value: ServingArg) -> Self {
        match value {
            ServingArg::Glass => Serving::Glass,
            ServingArg::Bottle => Serving::Bottle,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

fn parse_goal(raw: &str) -> Result<Goal, String> {
    let ml: u32 = raw
        .trim_end_matches("ml")
        .parse()
        .map_err(|_| format!("{raw} is not a number"))?;
    Goal::try_from(ml).map_err(|error| error.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Unable to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    let data_dir = config.data_dir()?;

    let _sentry = logging::init_sentry(&config);
    let _log_guard =
        logging::init(&config, &data_dir, cli.verbose).context("Unable to set up logging")?;
    info!(data_dir = %data_dir.display(), "Starting hydrate-tracker");

    let store = FileStore::open(&data_dir)
        .await
        .with_context(|| format!("Unable to open the store in {}", data_dir.display()))?;
    info!(store = %store.path().display(), "Store opened");
    let notifier = DesktopNotifier::new(config.notifications_allowed);
    let mut tracker = Tracker::load(
        Arc::new(store),
        Arc::new(notifier),
        Arc::new(SystemClock),
        config.tracker_options()?,
    )
    .await
    .context("Unable to load today's progress")?;

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => println!("{}", render_status(&tracker.snapshot())),
        Command::Drink { serving } => {
            tracker.drink(serving.into()).await?;
            println!("{}", render_status(&tracker.snapshot()));
        }
        Command::Reset { yes } => {
            let confirmed = yes
                || tokio::task::spawn_blocking(|| {
                    Confirm::new()
                        .with_prompt("Reset today's progress?")
                        .default(false)
                        .interact()
                })
                .await??;
            if confirmed {
                tracker.reset_today().await;
            }
            println!("{}", render_status(&tracker.snapshot()));
        }
        Command::Goal { ml } => {
            tracker.set_goal(ml).await;
            println!("{}", render_status(&tracker.snapshot()));
        }
        Command::Reminders { switch } => {
            let state = tracker.set_reminders(matches!(switch, Switch::On)).await?;
            match (switch, state) {
                (Switch::On, ReminderState::Enabled) => {
                    println!("Reminders ON. They fire while `hydrate-tracker run` is open.")
                }
                (Switch::On, ReminderState::Disabled) => {
                    println!("Notifications are not allowed, reminders stay OFF.")
                }
                (Switch::Off, _) => println!("Reminders OFF."),
            }
        }
        Command::History => println!("{}", render_history(tracker.history())),
        Command::Run => run_session(&mut tracker).await?,
    }

    Ok(())
}

async fn run_session(tracker: &mut Tracker) -> anyhow::Result<()> {
    println!("{}\n{SESSION_HELP}", render_status(&tracker.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut celebration = tracker.subscribe_celebration();
    let mut celebrating = *celebration.borrow_and_update();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(tracker, &mut lines, line.trim()).await? {
                    break;
                }
            }
            changed = celebration.changed() => {
                if changed.is_err() {
                    continue;
                }
                let now = *celebration.borrow_and_update();
                if celebrating && !now {
                    println!("Celebration over. Keep sipping!");
                }
                celebrating = now;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Session closed");
    Ok(())
}

/// Returns `false` once the user wants out.
async fn handle_line(
    tracker: &mut Tracker,
    lines: &mut Lines<BufReader<Stdin>>,
    line: &str,
) -> anyhow::Result<bool> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (None, _) => return Ok(true),
        (Some("250" | "+250" | "glass"), None) => {
            tracker.drink(Serving::Glass).await?;
        }
        (Some("500" | "+500" | "bottle"), None) => {
            tracker.drink(Serving::Bottle).await?;
        }
        (Some("reset"), None) => {
            println!("Reset today's progress? [y/N]");
            let answer = lines.next_line().await?.unwrap_or_default();
            if matches!(answer.trim(), "y" | "Y" | "yes") {
                tracker.reset_today().await;
            }
        }
        (Some("goal"), Some(raw)) => match parse_goal(raw) {
            Ok(goal) => tracker.set_goal(goal).await,
            Err(error) => {
                println!("{error}");
                return Ok(true);
            }
        },
        (Some("reminders"), Some(switch @ ("on" | "off"))) => {
            if let Err(error) = tracker.set_reminders(switch == "on").await {
                warn!(%error, "Unable to update reminders");
                println!("Unable to update reminders: {error}");
            }
        }
        (Some("history"), None) => {
            println!("{}", render_history(tracker.history()));
            return Ok(true);
        }
        (Some("status"), None) => {}
        (Some("quit" | "exit" | "q"), None) => return Ok(false),
        _ => {
            println!("{SESSION_HELP}");
            return Ok(true);
        }
    }

    println!("{}", render_status(&tracker.snapshot()));
    Ok(true)
}
