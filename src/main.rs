use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use chartsight::camera::NoCameraDevice;
use chartsight::logger::setup_logger;
use chartsight::models::AnalysisResult;
use chartsight::platform::{Browser, Platform, StaticProbe};
use chartsight::remote::VisionClient;
use chartsight::services::ChartSession;

const DISCLAIMER: &str = "Probabilistic chart analysis. Not financial advice.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logger();
    dotenv().ok();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: chartsight <chart-image>")?;

    let backend = Arc::new(VisionClient::from_env()?);
    info!("analyzing {} via {}", path.display(), backend.endpoint());

    // Headless driver: no camera hardware, the upload path carries the flow.
    let mut session = ChartSession::new(
        Arc::new(NoCameraDevice),
        backend,
        Arc::new(StaticProbe {
            platform: Platform::Desktop,
            browser: Browser::Other,
        }),
    );

    session.upload_and_analyze(&path).await?;

    if let Some(result) = session.result() {
        render(result);
    }
    Ok(())
}

/// Prints the verdict. The arrow and caption follow `visual_indicator`
/// alone; `direction` is reported on its own line.
fn render(result: &AnalysisResult) {
    println!();
    println!(
        "  {}  {}  {}",
        result.visual_indicator.glyph(),
        result.visual_indicator.caption(),
        result.probability
    );
    println!();
    println!("Direction: {:?}", result.direction);
    println!("Summary:   {}", result.summary);

    if let Some(ref fib) = result.fibonacci {
        println!();
        println!("Fibonacci");
        println!("  current level:  {}", fib.current_level);
        println!("  key support:    {}", fib.key_support);
        println!("  key resistance: {}", fib.key_resistance);
        println!("  projection:     {}", fib.projection);
    }

    if let Some(ref elliott) = result.elliott {
        println!();
        println!("Elliott waves");
        println!("  pattern:   {}", elliott.current_pattern);
        println!("  wave:      {}", elliott.current_wave);
        println!("  phase:     {}", elliott.phase);
        println!("  next move: {}", elliott.next_move);
    }

    println!();
    println!("{DISCLAIMER}");
}
