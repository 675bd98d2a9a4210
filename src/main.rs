use dotenvy::dotenv;
use quotrix::config::AppConfig;
use quotrix::logging;
use quotrix::models::quote::QuoteSet;
use quotrix::quotes::{QuoteEngine, SkewBlender};
use quotrix::services::ReplayMarketData;
use quotrix::signals::{Evaluation, SignalEngine};
use std::env;
use std::path::PathBuf;
use tracing::warn;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env()?;
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.price_history_path.clone())
        .ok_or("usage: quotrix <price-history.json> (or set PRICE_HISTORY_PATH)")?;
    let history = ReplayMarketData::from_file(&path, 1)?;

    let quote_engine = QuoteEngine::from_config(&config.market_making);
    let skew = SkewBlender::new(config.market_making.skew_factor);

    for asset in &config.assets {
        let Some(bars) = history.bars(asset) else {
            warn!(asset = %asset, "No recorded history for {}", asset);
            continue;
        };

        let mut engine = SignalEngine::new(config.strategy.clone())?;
        let evaluations = engine.replay(asset, bars)?;
        let directional: Vec<&Evaluation> = evaluations
            .iter()
            .filter(|evaluation| evaluation.signal.is_directional())
            .collect();

        println!(
            "{}: {} bars, {} evaluated, {} directional signals",
            asset,
            bars.len(),
            evaluations.len(),
            directional.len()
        );
        for evaluation in directional {
            print_evaluation(evaluation);
            let ladder = quote_engine.build(asset, evaluation.signal.price, evaluation.signal.timestamp);
            let ladder = if config.market_making.skew_enabled {
                skew.apply(&ladder, evaluation.signal.action, &quote_engine)
            } else {
                ladder
            };
            print_ladder(&ladder);
            println!();
        }
    }

    Ok(())
}

fn print_evaluation(evaluation: &Evaluation) {
    let signal = &evaluation.signal;
    println!("  {} {} @ {:.2}", signal.timestamp, signal.action, signal.price);
    println!("    {}", signal.rationale);
    if let Some(plan) = &signal.exit_plan {
        println!("    Plan: {}", plan);
    }
    if let Some(risk) = &evaluation.risk {
        match risk.stop_loss {
            Some(sl) => println!("    SL: {:.2}  TP: {:.2}", sl, risk.take_profit),
            None => println!("    SL: off  TP: {:.2}", risk.take_profit),
        }
    }
}

fn print_ladder(ladder: &QuoteSet) {
    println!("    {}", ladder.rationale);
    for (bid, ask) in ladder.bids.iter().zip(&ladder.asks) {
        println!(
            "    L{}  bid {:.4} x ${:.2} ({:.6})  |  ask {:.4} x ${:.2} ({:.6})",
            bid.level,
            bid.price,
            bid.size_usd,
            bid.base_size(ladder.mid_price),
            ask.price,
            ask.size_usd,
            ask.base_size(ladder.mid_price)
        );
    }
}
