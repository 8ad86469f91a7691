//! Best-effort browser pre-navigation
//!
//! Opening the task's starting URL before the agent runs saves it from
//! clicking through the browser chrome manually. This is a convenience, not
//! a contract: every failure is logged and swallowed so a broken browser
//! never aborts the run.

use drover_core::{DroverError, Result};
use headless_chrome::Browser;
use tracing::{info, warn};

use crate::client::Instance;

/// Open `url` in the instance's browser, waiting for the page to load.
///
/// Fire-and-forget: failures are logged at warn level and otherwise
/// ignored.
pub async fn open_url(instance: &Instance, url: &str) {
    match try_open_url(instance, url).await {
        Ok(()) => info!("Opened {} in instance browser", url),
        Err(e) => warn!("Pre-navigation to {} failed (continuing without it): {}", url, e),
    }
}

async fn try_open_url(instance: &Instance, url: &str) -> Result<()> {
    let cdp_url = instance.browser_start().await?;

    let browser = Browser::connect(cdp_url)
        .map_err(|e| DroverError::Browser(format!("Failed to connect over CDP: {}", e)))?;

    let tab = browser
        .new_tab()
        .map_err(|e| DroverError::Browser(format!("Failed to create tab: {}", e)))?;

    tab.navigate_to(url)
        .map_err(|e| DroverError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

    tab.wait_until_navigated()
        .map_err(|e| DroverError::Browser(format!("Navigation to {} did not settle: {}", url, e)))?;

    Ok(())
}
