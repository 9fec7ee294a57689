// chatline - console keyword chatbot
// Reads a line, reacts to its sentiment, answers from the knowledge base and
// reports the turn to the analytics endpoint in the background.

use std::sync::Arc;

use anyhow::Context;
use chatline_core::actors::{AnalyticsActorHandle, HttpAnalyticsSink};
use chatline_core::brain::{KnowledgeBase, TurnAnalyzer};
use chatline_core::config::Settings;
use chatline_core::logging::init_tracing;
use chatline_core::session::ChatSession;
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    init_tracing("chatline", settings.log_format)?;

    let knowledge = KnowledgeBase::load(&settings.knowledge_base_path).with_context(|| {
        format!(
            "Failed to load knowledge base from {:?}",
            settings.knowledge_base_path
        )
    })?;

    let sink = HttpAnalyticsSink::new(&settings.analytics_base_url, settings.analytics_timeout())
        .context("Failed to configure analytics endpoint")?;
    info!("Analytics endpoint: {}", sink.endpoint());
    let analytics = AnalyticsActorHandle::new(sink);

    let analyzer = TurnAnalyzer::new(Arc::new(knowledge));
    let mut session = ChatSession::new(analyzer, analytics.clone());

    let result = session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await;

    // Drain in-flight records even when the console failed.
    match analytics.shutdown(settings.analytics_timeout()).await {
        Ok(report) if report.abandoned > 0 => {
            warn!("{} analytics records were not delivered", report.abandoned)
        }
        Ok(_) => {}
        Err(e) => warn!("Analytics shutdown failed: {}", e),
    }

    let summary = result.context("Chat session failed")?;
    info!(turns = summary.turns, "Bye");
    Ok(())
}
