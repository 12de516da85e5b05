use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dailylog::api::{ApiConfig, HttpTaskService, TaskService};
use dailylog::chart;
use dailylog::day_view::{DayView, DayViewModel};
use dailylog::error::AppError;
use dailylog::models::TaskId;
use dailylog::stats::{DEFAULT_DAILY_WINDOW, StatsAggregator};
use dailylog::theme::Theme;

#[derive(Parser)]
#[command(name = "dailylog", about = "Daily task tracker client")]
struct Cli {
    /// Base URL of the DailyLog service
    #[arg(long, env = "DAILYLOG_URL")]
    url: Option<String>,

    /// Date to operate on (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the task list for the date
    List,
    /// Add a new task
    Add { name: String },
    /// Toggle a task's completion (earn or remove a star)
    Toggle { id: TaskId },
    /// Attach a footnote to a completion; empty text clears it
    Note { id: TaskId, text: String },
    /// Rename a task
    Rename { id: TaskId, name: String },
    /// Delete a task (historical stars are preserved)
    Rm { id: TaskId },
    /// Reorder tasks to match the given ids
    Reorder { ids: Vec<TaskId> },
    /// Show the chart source statistics
    Stats {
        #[arg(long, default_value_t = DEFAULT_DAILY_WINDOW)]
        days: u32,
    },
    /// Toggle the persisted light/dark theme
    Theme,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dailylog=warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("command failed: {}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    if let Command::Theme = cli.command {
        let path = Theme::default_path();
        let theme = Theme::load_or_default(&path).toggled();
        theme.save(&path)?;
        println!("Theme set to {}", theme);
        return Ok(());
    }

    let config = match cli.url {
        Some(url) => ApiConfig::new(url),
        None => ApiConfig::new_from_env()?,
    };
    let service: Arc<dyn TaskService> = Arc::new(HttpTaskService::new(config)?);
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let stats = StatsAggregator::new(service.clone());

    if let Command::Stats { days } = cli.command {
        return print_stats(&stats, date, days).await;
    }

    let day = DayViewModel::new(service, date);
    day.set_view_date(date).await?;

    match cli.command {
        Command::List => {}
        Command::Add { name } => {
            let task = day.add_task(&name).await?;
            println!("Added task {} ({})", task.name, task.id);
        }
        Command::Toggle { id } => {
            if day.toggle_completion(id).await? {
                println!("Star earned!");
            } else {
                println!("Star removed");
            }
        }
        Command::Note { id, text } => {
            day.set_footnote(id, &text).await?;
            println!("Footnote saved");
        }
        Command::Rename { id, name } => {
            day.rename_task(id, &name).await?;
            println!("Task renamed");
        }
        Command::Rm { id } => {
            day.remove_task(id).await?;
            println!("Task deleted (stars preserved)");
        }
        Command::Reorder { ids } => {
            day.reorder(&ids).await?;
            println!("Tasks reordered");
        }
        Command::Stats { .. } | Command::Theme => unreachable!(),
    }

    print_day_view(&day.day_view());

    match stats.rolling_average(Some(date)).await {
        Ok(avg) => println!("7-day avg: {}", avg.average),
        Err(err) => println!("7-day avg unavailable: {}", err),
    }
    Ok(())
}

fn print_day_view(view: &DayView) {
    println!("\n{}", view.view_date.format("%A, %B %d, %Y"));
    if view.tasks.is_empty() {
        println!("No tasks yet. Add your first daily task!");
        return;
    }
    for (index, task) in view.tasks.iter().enumerate() {
        let mark = if task.completed_today { "x" } else { " " };
        println!("{:>3}. [{}] {} ({})", index + 1, mark, task.name, task.id);
        if let Some(note) = task.display_footnote() {
            println!("         {}", note);
        }
    }
    let progress = view.progress();
    println!(
        "{}/{} completed ({:.0}%)",
        progress.completed,
        progress.total,
        progress.fraction() * 100.0
    );
}

async fn print_stats(stats: &StatsAggregator, date: NaiveDate, days: u32) -> Result<(), AppError> {
    let daily = stats.daily_star_counts(days).await?;
    let counts: Vec<u32> = daily.iter().map(|d| d.star_count).collect();
    let ceiling = chart::axis_ceiling(&counts);
    println!("Daily stars (axis ceiling {}):", ceiling);
    for point in &daily {
        println!("{} {}", point.date, "*".repeat(point.star_count as usize));
    }

    let weekly = stats.weekly_breakdown(Some(date)).await?;
    println!("\nWeek {} - {}:", weekly.week_start, weekly.week_end);
    for task in &weekly.tasks {
        println!(
            "{:<30} {}/7 ({:.1}%) {}",
            task.task_name,
            task.star_count,
            task.percentage,
            chart::completion_color(task.star_count, 7),
        );
    }

    let average = stats.rolling_average(Some(date)).await?;
    println!("\n7-day avg: {}", average.average);
    Ok(())
}
