use std::sync::Arc;

use venuescout_core::{AppConfig, GeoPoint};
use venuescout_places::{AutocompleteSession, PlacesClient};

/// Print address suggestions for `input`.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the request fails.
pub(crate) async fn run_autocomplete(
    config: &AppConfig,
    input: &str,
    bias: Option<GeoPoint>,
    json: bool,
) -> anyhow::Result<()> {
    let client = Arc::new(PlacesClient::from_config(config)?);
    let session = AutocompleteSession::new(client);
    let predictions = session.suggest(input, bias).await?.unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    if predictions.is_empty() {
        println!("no suggestions");
        return Ok(());
    }
    for p in &predictions {
        println!("{:<30}{}", p.id, p.description);
    }
    Ok(())
}
