use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use quizmate::{AnswerEvent, AnswerPanel, AnswerStore, ApiClient, ApiConfig, ResolutionState};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    println!("🔎 Inspecting question answers...");

    // Load .env file
    dotenvy::dotenv().ok();

    let question_id = match env::args().nth(1) {
        Some(id) => id,
        None => {
            eprintln!("Usage: inspect_question <question-id>");
            std::process::exit(1);
        }
    };

    let token = env::var("QUIZMATE_SESSION_TOKEN").unwrap_or_default();
    if token.is_empty() {
        println!("⚠️ QUIZMATE_SESSION_TOKEN is not set, the API will likely reject the requests");
    }

    let config = ApiConfig::from_env();
    println!("🌐 API: {}", config.base_url);

    let client = Arc::new(ApiClient::from_config(&config));
    let question = client
        .fetch_question(&token, &question_id)
        .await
        .with_context(|| format!("fetching question {}", question_id))?;

    println!("❓ {}", question.text);

    let (panel, mut events) = AnswerPanel::new(client, token);
    panel.load_question(&question);

    // Wait for the resolutions to land, bounded in case the API hangs.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    while panel
        .snapshot()
        .iter()
        .any(|a| a.state == ResolutionState::Pending)
    {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(AnswerEvent::EntryError { position, message, .. })) => {
                println!("⚠️ Answer {} failed to resolve: {}", position + 1, message);
            }
            Ok(Some(AnswerEvent::EntryUpdated { .. })) => {}
            Ok(None) => break,
            Err(_) => {
                println!("⏰ Timed out waiting for resolutions");
                break;
            }
        }
    }

    let answers = panel.snapshot();
    if answers.is_empty() {
        println!("📭 No answers yet");
        return Ok(());
    }

    println!("\n📋 {} answers:", answers.len());
    println!("{:-<60}", "");
    for (position, answer) in answers.iter().enumerate() {
        let label = (b'A' + (position % 26) as u8) as char;
        let marker = if answer.is_correct { "✅" } else { "  " };
        match answer.state {
            ResolutionState::Resolved => println!("{} {}. {}", marker, label, answer.text),
            ResolutionState::Pending => println!("⏳ {}. (still loading {})", label, answer.id),
            ResolutionState::Unresolved => println!("❌ {}. (unresolved {})", label, answer.id),
        }
    }
    println!("{:-<60}", "");

    Ok(())
}
