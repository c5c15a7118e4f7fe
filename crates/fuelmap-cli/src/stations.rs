//! Static station data: fuel prices and the brand list.

use std::fmt::Write as _;

use fuelmap_core::StationConfig;

/// Print the fuel price table.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub(crate) fn run_prices(stations: &StationConfig, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&stations.fuel_prices)?);
    } else {
        print!("{}", render_prices(stations));
    }
    Ok(())
}

pub(crate) fn run_brands(stations: &StationConfig) {
    for (i, brand) in stations.brands.iter().enumerate() {
        println!("{:>2}. {brand}", i + 1);
    }
}

pub(crate) fn render_prices(stations: &StationConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10}{:>10}", "GRADE", "HUF/L");
    for price in &stations.fuel_prices {
        let _ = writeln!(out, "{:<10}{:>10}", price.grade, price.price.to_string());
    }
    out
}
