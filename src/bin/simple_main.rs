use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use timeseries_analytics::{
    catalog,
    econometrics::{annualization_factor, beta, correlation, diff, index, lag, max_drawdown, prices, returns, volatility},
    statistics::generate_series_with,
    Direction, LagMode, Lookback, ReturnsType, SeriesType, Window,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting time series analytics demo");

    let today = Utc::now().date_naive();
    let mut rng = StdRng::seed_from_u64(2024);
    let asset = generate_series_with(260, Direction::EndToday, today, &mut rng)?;
    let market = generate_series_with(260, Direction::EndToday, today, &mut rng)?;

    println!("\nGenerated two random walks of {} daily points ending {}", asset.len(), today);
    println!("  Annualization factor: {}", annualization_factor(&asset)?);

    let daily = returns(&asset, Lookback::Observations(1), ReturnsType::Simple)?;
    let rebuilt = prices(&daily, 100.0, ReturnsType::Simple)?;
    if let (Some(original), Some(rebuilt)) = (asset.last(), rebuilt.last()) {
        println!("  Last level: {:.4}, rebuilt from returns: {:.4}", original.value, rebuilt.value);
    }

    let rebased = index(&asset, 1.0)?;
    let changes = diff(&asset, Lookback::Observations(5))?;
    let lagged = lag(&asset, Lookback::Observations(1), LagMode::Extend)?;
    println!("  Rebased last value: {:.4}", rebased.last().map(|o| o.value).unwrap_or_default());
    println!("  Weekly changes: {} points", changes.len());
    println!("  Lagged series ends {}", lagged.last().map(|o| o.date.to_string()).unwrap_or_default());

    let window = Window::observations(22);
    let vol = volatility(&asset, &window, ReturnsType::Simple)?;
    let corr = correlation(&asset, &market, &window, SeriesType::Prices)?;
    let b = beta(&asset, &market, &window, SeriesType::Prices)?;
    let drawdown = max_drawdown(&asset, &Window::full())?;

    println!("\nRolling 22-day metrics (latest):");
    if let Some(v) = vol.last() {
        println!("  Volatility: {:.2}%", v.value);
    }
    if let Some(c) = corr.last() {
        println!("  Correlation to market: {:.3}", c.value);
    }
    if let Some(b) = b.last() {
        println!("  Beta to market: {:.3}", b.value);
    }
    if let Some(d) = drawdown.last() {
        println!("  Max drawdown: {:.2}%", d.value * 100.0);
    }

    println!("\nFunction index:\n{}", catalog::render_index());
    Ok(())
}
