//! Terminal rendering of scan results and backtest reports.

use chrono::NaiveDateTime;
use prettytable::{Table, format, row};
use range_scout_domain::cadence::parse_timestamp;
use range_scout_scanner::result::ScanResult;
use range_scout_simulation::report::BacktestReport;
use rust_decimal::Decimal;

fn pct(value: Decimal) -> String {
    format!("{:.2}%", value * Decimal::ONE_HUNDRED)
}

fn usd(value: Decimal) -> String {
    format!("${:.2}", value)
}

fn when(timestamp: u64) -> String {
    parse_timestamp(timestamp)
        .as_ref()
        .map(NaiveDateTime::to_string)
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn scan_table(results: &[ScanResult]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row![
        "Pool", "Chain", "DEX", "TVL", "APR", "Vol", "Range ±", "P(in)", "Yield", "Exit loss",
        "Margin", "Ratio", "Verdict", "Id"
    ]);
    for r in results {
        let m = &r.metrics;
        table.add_row(row![
            r.name,
            r.chain_id,
            r.dex,
            usd(r.tvl_usd),
            pct(m.average_apr),
            pct(m.volatility),
            pct(m.range_half_width),
            pct(m.in_range_probability),
            pct(m.probable_yield),
            pct(m.exit_loss),
            pct(m.margin),
            format!("{:.2}", m.ratio),
            r.verdict,
            r.pool_id
        ]);
    }
    table
}

pub fn print_backtest(report: &BacktestReport, show_trace: bool) {
    let meta = &report.metadata;
    println!("\nBacktest ({}, {} days)", meta.strategy, report.days);
    println!("════════════════════════════════════");
    println!("Initial capital:   {}", usd(report.capital_usd));
    println!("Final value:       {}", usd(report.final_value()));
    println!("Hold value:        {}", usd(report.final_hold_value()));
    println!("vs hold:           {}", usd(report.vs_hold()));
    println!("Fees earned:       {}", usd(report.total_fees()));
    println!("Net PnL:           {}", usd(report.net_pnl()));
    println!("Annualized:        {}", pct(report.annualized_return()));
    println!("Max drawdown:      {}", pct(report.max_drawdown()));
    println!("Time in range:     {}", pct(report.time_in_range()));
    println!("Rebalances:        {}", meta.rebalance_count);
    println!("Initial vol:       {}", pct(meta.initial_volatility));
    println!("Realized vol:      {}", pct(meta.realized_volatility));
    println!("Initial range ±:   {}", pct(meta.initial_half_width));
    println!(
        "Final range:       [{:.6}, {:.6}]",
        report.final_range.lower_price.value, report.final_range.upper_price.value
    );
    if meta.skipped_samples > 0 {
        println!("Skipped samples:   {}", meta.skipped_samples);
    }
    println!("════════════════════════════════════");

    if show_trace {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.set_titles(row![
            "Date", "Price", "Lower", "Upper", "In range", "Fees", "Principal", "Total", "Hold"
        ]);
        for step in &report.trace {
            let in_range = if step.in_range { "yes" } else { "no" };
            table.add_row(row![
                when(step.timestamp),
                format!("{:.6}", step.price),
                format!("{:.6}", step.lower),
                format!("{:.6}", step.upper),
                in_range,
                usd(step.cumulative_fees),
                usd(step.principal_value),
                usd(step.total_value),
                usd(step.hold_value)
            ]);
        }
        table.printstd();
    }
}
