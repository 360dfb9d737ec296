use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serpent_bravo_lib::calculator::{self, CalculatorInput, Footprint};
use serpent_bravo_lib::chat::{ChatSession, Message, SubmitError, TurnOutcome};
use serpent_bravo_lib::config::AppConfig;
use serpent_bravo_lib::directives::chart::chart_total;
use serpent_bravo_lib::directives::{ChartDataPoint, DEFAULT_CHART_TITLE};
use serpent_bravo_lib::llm::ImageAttachment;
use serpent_bravo_lib::notifications::{NotificationIcon, NotificationUpdate};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Commands:
  /image <path>     attach a photo to the next message
  /clear-image      drop the attached photo
  /status           points, rank and badges
  /notifications    list active notifications
  /dismiss <id>     close a notification
  /reset            start a fresh conversation with the assistant
  /footprint k=v..  estimate a footprint, e.g. mode=car fuel=diesel km=120 kwh=200 beef=1 veg=2 waste=3
  /calc <path>      total a CSV sheet with activity and value columns
  /quit             exit
Type 1-3 to pick a suggestion.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serpent_bravo_lib=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::var_os("SERPENT_BRAVO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path);
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            tracing::warn!("[App] Could not write default config: {}", e);
        }
    }

    let session = Arc::new(serpent_bravo_lib::build_session(&config));
    spawn_notification_printer(&session);

    let snapshot = session.snapshot();
    for message in &snapshot.messages {
        print_message(message);
    }
    print_suggestions(&snapshot.suggestions);
    println!("(/help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let input = line.trim();
        match input.split_once(' ').unwrap_or((input, "")) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => println!("{}", HELP),
            ("/image", path) => stage_image(&session, Path::new(path.trim())).await,
            ("/clear-image", _) => {
                if session.clear_staged_image().is_some() {
                    println!("📎 Photo removed.");
                }
            }
            ("/status", _) => print_status(&session),
            ("/notifications", _) => {
                for active in session.active_notifications().await {
                    println!(
                        "  [{}] {} ({:?})",
                        active.notification.id, active.notification.message, active.phase
                    );
                }
            }
            ("/dismiss", id) => {
                if !session.dismiss_notification(id.trim()).await {
                    println!("No active notification with id {}", id.trim());
                }
            }
            ("/footprint", args) => match CalculatorInput::from_args(args) {
                Ok(input) => print_footprint(&calculator::calculate(&input)),
                Err(e) => println!("{}", e),
            },
            ("/calc", path) => calc_sheet(Path::new(path.trim())).await,
            ("/reset", _) => {
                session.reset_conversation().await;
                println!("🔄 Started a fresh conversation.");
            }
            _ => {
                let text = pick_suggestion(&session, input).unwrap_or_else(|| input.to_string());
                submit(&session, &text).await;
            }
        }
    }

    Ok(())
}

async fn submit(session: &ChatSession, text: &str) {
    match session.submit_turn(text).await {
        Ok(TurnOutcome::Failed { reply, error }) => {
            tracing::debug!("[App] Turn failed: {}", error);
            print_message(&reply);
        }
        Ok(outcome) => print_message(outcome.reply()),
        Err(SubmitError::Empty) => {}
        Err(SubmitError::Busy) => println!("⏳ Still thinking about your last message..."),
    }
}

fn pick_suggestion(session: &ChatSession, input: &str) -> Option<String> {
    let index: usize = input.parse().ok()?;
    session
        .snapshot()
        .suggestions
        .get(index.checked_sub(1)?)
        .cloned()
}

async fn stage_image(session: &ChatSession, path: &Path) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Could not read {}: {}", path.display(), e);
            return;
        }
    };
    match ImageAttachment::from_bytes(bytes) {
        Ok(image) => {
            println!("📸 Attached {} ({}).", path.display(), image.mime_type());
            session.stage_image(image);
        }
        Err(e) => println!("{} is not a supported image: {}", path.display(), e),
    }
}

fn spawn_notification_printer(session: &ChatSession) {
    let mut updates = session.notifications().subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(NotificationUpdate::Shown(notification)) => {
                    let icon = match notification.icon {
                        NotificationIcon::Emoji(emoji) => emoji,
                        NotificationIcon::Badge(_) => "🏅",
                    };
                    println!("{} {}", icon, notification.message);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("[App] Notification printer skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

fn print_message(message: &Message) {
    if message.is_receipt {
        println!("🧾\n{}\n", message.text);
        return;
    }
    println!("{}", message.text);

    if let Some(badge) = message.badge {
        println!("🏅 {}: {}", badge.name, badge.description);
    }
    if let (Some(title), Some(points)) = (&message.chart_title, &message.chart_data) {
        print_chart(title, points);
    }
    println!();
}

fn print_chart(title: &str, points: &[ChartDataPoint]) {
    let total = chart_total(points);
    println!("📊 {}", title);
    for point in points {
        let share = if total > 0.0 {
            point.value / total * 100.0
        } else {
            0.0
        };
        println!("   {:<20} {:>10.1} kg  ({:.0}%)", point.label, point.value, share);
    }
}

fn print_footprint(footprint: &Footprint) {
    println!("{}", footprint.summary());
    let points = footprint.chart_points();
    if !points.is_empty() {
        print_chart(DEFAULT_CHART_TITLE, &points);
    }
    println!();
}

async fn calc_sheet(path: &Path) {
    let sheet = match tokio::fs::read_to_string(path).await {
        Ok(sheet) => sheet,
        Err(e) => {
            println!("Could not read {}: {}", path.display(), e);
            return;
        }
    };
    match calculator::parse_csv(&sheet) {
        Ok(report) => {
            for row in &report.rows {
                println!(
                    "   {:<14} {:>10.2} → {:>10.2} kg CO₂e",
                    row.activity, row.value, row.emissions
                );
            }
            let unknown: Vec<&str> = report.unknown_activities().collect();
            if !unknown.is_empty() {
                println!("   (no factor for: {})", unknown.join(", "));
            }
            print_footprint(&report.footprint());
        }
        Err(e) => println!("{} is not a usable sheet: {}", path.display(), e),
    }
}

fn print_suggestions(suggestions: &[String]) {
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("  {}. {}", i + 1, suggestion);
    }
}

fn print_status(session: &ChatSession) {
    let snapshot = session.snapshot();
    println!(
        "{} {} · {} points · badges: {}",
        snapshot.rank.icon,
        snapshot.rank.name,
        snapshot.points,
        if snapshot.unlocked_badges.is_empty() {
            "none yet".to_string()
        } else {
            snapshot.unlocked_badges.join(", ")
        }
    );
    if session.has_staged_image() {
        println!("📎 A photo is attached to your next message.");
    }
}
