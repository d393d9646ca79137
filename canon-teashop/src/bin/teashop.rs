//! `teashop` entry point.
//!
//! Replays the demo orders plus any `--order TABLE:TEA` arguments, prints
//! each serving line and the closing report. `--json` prints the summary as
//! JSON instead of the report line.

use std::process::ExitCode;

use canon_core::{CanonResult, ConfigError};
use canon_teashop::telemetry::init_tracing;
use canon_teashop::{ShopConfig, TeaShop, DEMO_ORDERS};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("teashop: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> CanonResult<()> {
    let config = ShopConfig::load()?;
    init_tracing(&config.logging)?;
    let extra_orders = orders_from_args()?;

    let mut shop = TeaShop::from_config(&config)?;
    tracing::info!(policy = ?shop.policy(), "Tea shop open");

    for (table, tea) in DEMO_ORDERS {
        shop.take_order(table, tea);
    }
    for (table, tea) in extra_orders {
        shop.take_order(table, tea);
    }

    println!("=== Flyweight Tea Shop ===");
    println!();
    println!("Serving orders:");
    for outcome in shop.serve_pending() {
        match outcome {
            Ok(line) => println!("{}", line),
            Err(err) => {
                tracing::warn!(error = %err, "Order rejected");
                println!("Could not serve order: {}", err);
            }
        }
    }
    println!();

    if json_requested() {
        let summary = serde_json::to_string_pretty(&shop.summary()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "--json".to_string(),
                reason: e.to_string(),
            }
        })?;
        println!("{}", summary);
    } else {
        println!("{}", shop.report_line());
    }
    Ok(())
}

fn json_requested() -> bool {
    std::env::args().skip(1).any(|arg| arg == "--json")
}

fn orders_from_args() -> CanonResult<Vec<(u32, String)>> {
    let mut orders = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg != "--order" {
            continue;
        }
        let value = args.next().unwrap_or_default();
        orders.push(parse_order(&value)?);
    }
    Ok(orders)
}

fn parse_order(value: &str) -> CanonResult<(u32, String)> {
    let invalid = || ConfigError::InvalidValue {
        field: "--order".to_string(),
        reason: format!("expected TABLE:TEA, got '{}'", value),
    };
    let (table, tea) = value.split_once(':').ok_or_else(invalid)?;
    let table = table.trim().parse::<u32>().map_err(|_| invalid())?;
    if tea.trim().is_empty() {
        return Err(invalid().into());
    }
    Ok((table, tea.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("7:oolong").unwrap(), (7, "oolong".to_string()));
        assert_eq!(parse_order(" 3 :karak").unwrap(), (3, "karak".to_string()));
    }

    #[test]
    fn test_parse_order_rejects_malformed() {
        assert!(parse_order("oolong").is_err());
        assert!(parse_order("x:karak").is_err());
        assert!(parse_order("4:").is_err());
        assert!(parse_order("").is_err());
    }
}
