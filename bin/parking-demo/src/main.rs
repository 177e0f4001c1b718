use anyhow::{Context, Result};
use parking_core::{FacilityLayout, ParkingService};
use tracing::{info, warn};
use tracing_subscriber::fmt::init as tracing_init;

mod summary;

use summary::FacilitySummary;

/// Vehicles seeded at startup so the summary has something to show
const DEMO_REQUESTS: &[(&str, u32)] = &[("ALI-123", 1), ("SHZ-789", 1), ("VIS-456", 2)];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    info!("Starting parking-demo...");

    let layout = load_layout()?;
    let system = layout
        .build_system()
        .context("Failed to build parking system from layout")?;
    let service = ParkingService::new(system);
    info!(
        "Parking system initialized with {} zones",
        layout.zones.len()
    );

    let mut seeded = Vec::new();
    for (vehicle_id, zone_id) in DEMO_REQUESTS {
        match service.submit_request(vehicle_id, *zone_id).await {
            Ok(request_id) => {
                info!(
                    "Seeded request {} for {} in zone {}",
                    request_id, vehicle_id, zone_id
                );
                seeded.push(request_id);
            }
            Err(e) => warn!("Could not seed request for {}: {}", vehicle_id, e),
        }
    }

    // Walk the last seeded request through its full lifecycle
    if let Some(&request_id) = seeded.last() {
        service.occupy_slot(request_id).await?;
        service.release_slot(request_id).await?;
        info!("Request {} occupied and released", request_id);
    }

    let summary = service.read(FacilitySummary::from_system).await;
    summary.log();

    Ok(())
}

/// Load the facility layout from `PARKING_LAYOUT`, or fall back to the demo layout
fn load_layout() -> Result<FacilityLayout> {
    match std::env::var("PARKING_LAYOUT") {
        Ok(path) => {
            let layout = FacilityLayout::load(&path)
                .with_context(|| format!("Failed to load layout from {}", path))?;
            info!("Facility layout loaded from {}", path);
            Ok(layout)
        }
        Err(_) => {
            warn!("PARKING_LAYOUT not set - using built-in demo layout");
            Ok(FacilityLayout::demo())
        }
    }
}
