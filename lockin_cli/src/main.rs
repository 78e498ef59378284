use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lockin_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lockin")]
#[command(about = "Goal obligation calendar for LockIn", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every obligated day with its position
    Obligations {
        #[command(flatten)]
        rule: RuleArgs,

        /// Print a JSON array instead of one line per day
        #[arg(long)]
        json: bool,
    },

    /// Print the number of obligated days
    Total {
        #[command(flatten)]
        rule: RuleArgs,
    },

    /// Print `obligated` or `not obligated` for a date
    Check {
        #[command(flatten)]
        rule: RuleArgs,

        /// Date to check (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },

    /// Show progress for a stored goal document
    Goal {
        /// Path to the goal JSON document
        path: PathBuf,

        /// Evaluate as of this date instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RuleKind {
    Everyday,
    Weekdays,
    Custom,
}

impl RuleKind {
    fn discriminator(self) -> &'static str {
        match self {
            RuleKind::Everyday => "everyday",
            RuleKind::Weekdays => "weekdays",
            RuleKind::Custom => "custom",
        }
    }
}

#[derive(Args)]
struct RuleArgs {
    /// First day of the goal (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last day of the goal, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Recurrence rule
    #[arg(long, value_enum, default_value = "everyday")]
    rule: RuleKind,

    /// Weekday indices, Sunday = 0 .. Saturday = 6 (e.g. 1,3,5)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    weekdays: Vec<i64>,

    /// Explicit dates (e.g. 2024-01-05,2024-01-20)
    #[arg(long, value_delimiter = ',')]
    custom_days: Vec<String>,
}

impl RuleArgs {
    fn schedule(&self) -> Result<ObligationSchedule> {
        let range = DateRange::new(self.start, self.end)?;
        let rule = RecurrenceRule::from_parts(
            self.rule.discriminator(),
            Some(self.weekdays.as_slice()),
            Some(self.custom_days.as_slice()),
        )?;
        if rule.is_vacuous() {
            tracing::warn!("The {} rule matches no days", rule.kind());
        }
        Ok(ObligationSchedule::new(range, rule))
    }
}

fn main() {
    // Initialize logging
    lockin_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Obligations { rule, json } => cmd_obligations(&rule, json),
        Commands::Total { rule } => cmd_total(&rule),
        Commands::Check { rule, date } => cmd_check(&rule, date),
        Commands::Goal { path, today } => {
            // Only the goal report reads the config file
            let config = match cli.config {
                Some(ref config_path) => Config::load_from(config_path)?,
                None => Config::load()?,
            };
            cmd_goal(
                &path,
                today.unwrap_or_else(|| Local::now().date_naive()),
                &config,
            )
        }
    }
}

fn cmd_obligations(args: &RuleArgs, json: bool) -> Result<()> {
    let schedule = args.schedule()?;

    if json {
        let obligations: Vec<Obligation> = schedule.obligations().collect();
        println!("{}", serde_json::to_string_pretty(&obligations)?);
        return Ok(());
    }

    for obligation in schedule.obligations() {
        println!(
            "{}\t{}\t{}",
            obligation.index,
            obligation.date,
            obligation.date.format("%A")
        );
    }
    Ok(())
}

fn cmd_total(args: &RuleArgs) -> Result<()> {
    let schedule = args.schedule()?;
    println!("{}", schedule.total_days());
    Ok(())
}

fn cmd_check(args: &RuleArgs, date: NaiveDate) -> Result<()> {
    let schedule = args.schedule()?;
    if schedule.is_obligated(date) {
        println!("obligated");
    } else {
        println!("not obligated");
    }
    Ok(())
}

fn cmd_goal(path: &Path, today: NaiveDate, config: &Config) -> Result<()> {
    let goal = GoalDocument::load(path)?;
    let schedule = goal.schedule()?;
    let validated = goal.validated_days()?;
    let window = match goal.validation_window {
        Some(window) => window,
        None => config.validation.window()?,
    };

    let progress = GoalProgress::compute(&schedule, &validated, today);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", if goal.title.is_empty() { "Goal" } else { &goal.title });
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Period: {} → {}", schedule.range.start(), schedule.range.end());
    println!("  Rule: {}", schedule.rule.kind());
    println!(
        "  Day {}/{} ({:.0}%)",
        progress.current_day, progress.total_days, progress.percent_complete
    );
    println!("  Remaining: {}", progress.remaining_days);
    println!("  Streak: {}", progress.current_streak);
    if let Some(funds) = goal.funds() {
        println!("  Deposited: {:.2}", funds.deposited);
        println!(
            "  Recovered: {:.2} ({:.0}%)",
            funds.recovered, funds.percent_recovered
        );
        println!("  At stake: {:.2}", funds.at_stake);
    }
    println!();

    let today_status = day_status(&schedule, &validated, today, today);
    println!("  Today ({}): {}", today, today_status.as_str());
    if progress.today_obligated && !progress.today_validated {
        println!("  Validate today between {}", window);
    }

    match progress.next_validation {
        Some(next) => println!(
            "  Next validation: {} (day {}/{})",
            next.date, next.index, progress.total_days
        ),
        None => println!("  Next validation: none"),
    }
    println!();

    let week = week_progress(&schedule, &validated, today, config.display.week_starts_on);
    let strip: Vec<String> = week
        .iter()
        .map(|day| format!("{} {}", day.date.format("%a"), status_mark(day.status)))
        .collect();
    println!("  {}", strip.join("  "));
    println!();

    Ok(())
}

fn status_mark(status: HabitStatus) -> &'static str {
    match status {
        HabitStatus::Success => "✓",
        HabitStatus::Failed => "✗",
        HabitStatus::Pending => "…",
        HabitStatus::Inactive => "·",
    }
}
