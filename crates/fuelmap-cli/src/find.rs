//! `find`: run one finder session end to end and print the result.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use anyhow::Context;
use clap::Args;
use fuelmap_core::{AppConfig, BrandTag, Coordinate, PlaceId, StationConfig};
use fuelmap_providers::{ConfiguredGeolocator, GoogleMapsClient, HttpSettings};
use fuelmap_session::{
    spawn_session, Capabilities, MapSession, RecordingSurface, RuntimeOptions, SessionHandle,
    SessionSettings, SessionSnapshot,
};

#[derive(Debug, Args)]
pub struct FindArgs {
    /// Current latitude; without a position the default center is used
    #[arg(long, env = "FUELMAP_LAT", requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Current longitude
    #[arg(long, env = "FUELMAP_LNG", requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,
    /// Show only this brand (repeatable: --brand MOL --brand Shell)
    #[arg(long = "brand")]
    pub brands: Vec<BrandTag>,
    /// Route to this place id instead of the nearest station
    #[arg(long)]
    pub destination: Option<String>,
    /// Print the final session snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Locate, search, filter, pick a destination, route, and print.
///
/// # Errors
///
/// Returns an error if the API key is missing, the coordinates are invalid,
/// the requested destination is not among the results, or the session dies.
/// Provider failures are not errors: they show up as notices.
pub(crate) async fn run_find(
    config: &AppConfig,
    stations: &StationConfig,
    args: &FindArgs,
) -> anyhow::Result<()> {
    let api_key = config
        .google_maps_api_key
        .as_deref()
        .context("FUELMAP_GOOGLE_MAPS_API_KEY must be set for `find`")?;
    let client = GoogleMapsClient::new(api_key, &HttpSettings::from_app_config(config))?;

    let position = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)?),
        _ => None,
    };

    let session = MapSession::new(
        RecordingSurface::new(),
        SessionSettings::from_app_config(config),
        stations.classifier(),
    );
    let handle = spawn_session(
        session,
        Capabilities {
            geolocator: ConfiguredGeolocator::new(position),
            places: client.clone(),
            directions: client,
        },
        RuntimeOptions::from_app_config(config),
    );

    let snapshot = drive_session(handle, args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_snapshot(&snapshot, config.list_limit));
    }
    Ok(())
}

/// Applies the requested filter and destination, then shuts the session
/// down whether or not those steps succeeded.
pub(crate) async fn drive_session<S>(
    handle: SessionHandle<S>,
    args: &FindArgs,
) -> anyhow::Result<SessionSnapshot> {
    let outcome = settle(&handle, args).await;
    handle.shutdown().await?;
    outcome
}

async fn settle<S>(handle: &SessionHandle<S>, args: &FindArgs) -> anyhow::Result<SessionSnapshot> {
    let mut snapshot = handle.wait_idle().await?;

    if !args.brands.is_empty() {
        let wanted: Vec<BrandTag> = args
            .brands
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        handle.set_filter(args.brands.clone()).await?;
        snapshot = handle
            .wait_for(|s| s.is_idle() && s.selection == wanted)
            .await?;
    }

    if let Some(id) = args.destination.as_deref() {
        let id = PlaceId::new(id);
        if !snapshot.visible.iter().any(|r| r.id() == &id) {
            anyhow::bail!("place '{id}' is not among the visible stations");
        }
        if snapshot.destination.as_ref().map(|p| &p.id) != Some(&id) {
            handle.choose_destination(id.clone()).await?;
            snapshot = handle
                .wait_for(|s| {
                    s.is_idle() && s.destination.as_ref().is_some_and(|p| p.id == id)
                })
                .await?;
        }
    }

    Ok(snapshot)
}

pub(crate) fn render_snapshot(snapshot: &SessionSnapshot, list_limit: usize) -> String {
    let mut out = String::new();

    match (snapshot.my_location, snapshot.search_center) {
        (Some(location), _) => {
            let _ = writeln!(out, "Location: {location}");
        }
        (None, Some(center)) => {
            let _ = writeln!(out, "Location: unknown, searching around {center}");
        }
        (None, None) => {
            let _ = writeln!(out, "Location: unknown");
        }
    }

    let filter = if snapshot.selection.is_empty() {
        "all brands".to_string()
    } else {
        snapshot
            .selection
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let shown = snapshot.visible.len().min(list_limit);
    let _ = writeln!(
        out,
        "Stations: {shown} of {} ({filter})",
        snapshot.visible.len()
    );

    if !snapshot.visible.is_empty() {
        let _ = writeln!(out, "{:<4}{:<10}{:<8}NAME", "#", "DIST", "BRAND");
        for (i, entry) in snapshot.visible.iter().take(list_limit).enumerate() {
            let distance = entry
                .distance_km
                .map_or_else(|| "-".to_string(), |d| format!("{d:.1} km"));
            let brand = entry
                .place
                .brand
                .map_or_else(|| "-".to_string(), |b| b.to_string());
            let marker = if snapshot.destination.as_ref().map(|p| &p.id) == Some(entry.id()) {
                " *"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "{:<4}{:<10}{:<8}{}{marker}",
                i + 1,
                distance,
                brand,
                entry.place.name
            );
        }
    }

    if let Some(nearest) = &snapshot.nearest {
        let _ = writeln!(
            out,
            "Nearest: {} ({:.1} km)",
            nearest.place.name,
            nearest.distance_km.unwrap_or_default()
        );
    }
    if snapshot.my_location.is_some() {
        let _ = writeln!(
            out,
            "Within {} km: {}",
            snapshot.nearby_radius_km, snapshot.nearby_count
        );
    }

    if let Some(destination) = &snapshot.destination {
        let _ = writeln!(out, "Destination: {}", destination.name);
    }
    if let Some(route) = &snapshot.route {
        let _ = writeln!(
            out,
            "Route: {:.1} km, about {} min",
            route.distance_km, route.eta_minutes
        );
    }

    for notice in &snapshot.notices {
        let _ = writeln!(out, "! {}", notice.message);
    }
    out
}
