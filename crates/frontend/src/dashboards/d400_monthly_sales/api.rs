use contracts::dashboards::d400_monthly_sales::{
    DashboardRequest, DashboardResponse, DashboardSettings, ErrorBody,
};
use gloo_net::http::{Request, Response};

use crate::shared::api_utils::api_url;

const API_BASE: &str = "/api/d400";

/// Reads the JSON error body of a failed response, falling back to the status.
async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("HTTP error: {}", status),
    }
}

/// Defaults and select options for the sidebar
pub async fn get_settings() -> Result<DashboardSettings, String> {
    let url = api_url(&format!("{}/settings", API_BASE));

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// Builds the dashboard; `csv_text: None` selects the example data.
pub async fn post_dashboard(request: &DashboardRequest) -> Result<DashboardResponse, String> {
    let url = api_url(&format!("{}/dashboard", API_BASE));

    let response = Request::post(&url)
        .json(request)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
