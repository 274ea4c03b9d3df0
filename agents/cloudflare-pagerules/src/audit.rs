//! Page Rule Audit
//!
//! The report is built in three sequential steps sharing one [`Registry`]:
//! token verification, zone collection and page-rule collection. Each step
//! logs its own failures and carries on with whatever it already gathered.

use std::io::{self, Write};

use tracing::{debug, error, info, warn};

use crate::cloudflare::{ApiError, CloudflareClient};
use crate::registry::Registry;
use crate::report;

/// Printed when the token check fails or the run cannot start
pub const INVALID_TOKEN_MESSAGE: &str = "Token is invalid or is expired!";

/// Check that the API token is active and valid.
///
/// Any transport error, HTTP error or undecodable body counts as invalid.
pub async fn validate_token(client: &CloudflareClient) -> bool {
    match client.verify_token().await {
        Ok(response) => {
            if !response.success {
                warn!("Token verification rejected: {}", response.error_messages());
            }
            response.success
        }
        Err(e) => {
            error!("Error verifying token: {}", e);
            false
        }
    }
}

/// Collect every zone of the account into `registry`.
///
/// Returns the number of new zone names added. On error the remaining pages
/// are skipped and zones already inserted are kept.
pub async fn collect_zones(client: &CloudflareClient, registry: &mut Registry) -> usize {
    let before = registry.len();

    if let Err(e) = fetch_zone_pages(client, registry).await {
        error!("Error fetching zones: {}", e);
    }

    let added = registry.len() - before;
    info!("🌐 Collected {} zones", added);
    added
}

async fn fetch_zone_pages(
    client: &CloudflareClient,
    registry: &mut Registry,
) -> Result<(), ApiError> {
    let first = client.list_zones(None).await?;
    if !first.success {
        debug!("Zone listing unsuccessful: {}", first.error_messages());
        return Ok(());
    }

    let total_pages = first.total_pages();
    debug!("Zone listing spans {} pages", total_pages);

    for page in 1..=total_pages {
        let response = client.list_zones(Some(page)).await?;
        for zone in response.result.unwrap_or_default() {
            registry.insert_zone(&zone.name, &zone.id);
        }
    }

    Ok(())
}

/// Fetch page rules for every zone and record the first action id of each.
///
/// Rules without actions are skipped. A failed zone is logged and left as
/// is. Returns the number of rule ids appended.
pub async fn add_page_rules(client: &CloudflareClient, registry: &mut Registry) -> usize {
    let mut appended = 0;

    for (zone_name, zone_id) in registry.zone_ids() {
        let response = match client.list_page_rules(&zone_id).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error fetching page rules for zone {}: {}", zone_name, e);
                continue;
            }
        };

        if !response.success {
            debug!(
                "Page rules for zone {} unsuccessful: {}",
                zone_name,
                response.error_messages()
            );
            continue;
        }

        for rule in response.result.unwrap_or_default() {
            match rule.first_action_id() {
                Some(action_id) => {
                    registry.push_rule(&zone_name, action_id);
                    appended += 1;
                }
                None => debug!(
                    zone = %zone_name,
                    rule = ?rule.id,
                    "Skipping page rule without actions"
                ),
            }
        }
    }

    info!("📜 Recorded {} page rules", appended);
    appended
}

/// Run the whole audit and write the report to `out`.
///
/// Returns `None` when the token check fails; in that case no zone or
/// page-rule endpoint is called.
pub async fn run<W: Write>(client: &CloudflareClient, out: &mut W) -> io::Result<Option<Registry>> {
    if !validate_token(client).await {
        writeln!(out, "{}", INVALID_TOKEN_MESSAGE)?;
        return Ok(None);
    }

    writeln!(out, "Token is Valid!")?;
    writeln!(out, "----- Checking Page rules of domains...")?;

    let mut registry = Registry::new();
    collect_zones(client, &mut registry).await;
    add_page_rules(client, &mut registry).await;

    report::write_report(&registry, out)?;
    Ok(Some(registry))
}
