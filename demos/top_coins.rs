use coin_market_sdk::comparison::compare;
use coin_market_sdk::format::{format_large_number, format_percent, format_price};
use coin_market_sdk::search::filter_coins;
use coin_market_sdk::{chart, ChartRange, CurrencyPreference, MarketDataService};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let currency = CurrencyPreference::from_default_location()?.load();
    let service = MarketDataService::global().await;

    println!(
        "Loading coin listing (currency: {}, provider: {})...",
        currency.label(),
        service.provider_name()
    );
    let start = Instant::now();
    let listing = service.all_coins(currency).await;
    println!(
        "Loaded {} coins in {:?} using {} requests ({})",
        listing.coins.len(),
        start.elapsed(),
        listing.requests_issued,
        listing.stop_reason
    );
    println!("{:-<60}", "");

    for coin in listing.coins.iter().take(10) {
        println!(
            "{:>4} {:<8} {:>16} {:>10} {:>12}",
            coin.market_cap_rank.map(|r| r.to_string()).unwrap_or_default(),
            coin.symbol.to_uppercase(),
            format_price(coin.current_price, currency),
            format_percent(coin.price_change_percentage_24h),
            format_large_number(coin.market_cap, currency)
        );
    }

    let matches = filter_coins(&listing.coins, "bitcoin", None, Some(5));
    println!("\nSearch 'bitcoin': {} matches", matches.len());

    if let (Some(first), Some(second)) = (listing.coins.first(), listing.coins.get(1)) {
        if let Some(comparison) = compare(first, second) {
            let (a, b) = comparison.score();
            println!("{} vs {}: {} - {}", first.name, second.name, a, b);
        }

        match service.market_chart(&first.id, currency, ChartRange::Week).await {
            Ok(series) => println!(
                "{} 7d change: {:.2}%",
                first.name,
                chart::price_change_percentage(&series.prices)
            ),
            Err(e) => eprintln!("Chart unavailable: {}", e),
        }
    }

    let health = service.health_check().await;
    println!("\nHealth: {:?} - {}", health.status, health.message.unwrap_or_default());

    Ok(())
}
