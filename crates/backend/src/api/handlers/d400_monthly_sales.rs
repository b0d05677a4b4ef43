use axum::{
    extract::{rejection::QueryRejection, Multipart, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::dashboards::d400_monthly_sales::{
    DashboardOptions, DashboardRequest, DashboardResponse, DashboardSettings, ErrorBody,
};

use crate::dashboards::d400_monthly_sales::error::DashboardError;
use crate::dashboards::d400_monthly_sales::service;

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            DashboardError::Load(e) => (StatusCode::UNPROCESSABLE_ENTITY, format!("데이터 로드 오류: {}", e)),
            DashboardError::InvalidOption(_) | DashboardError::UnknownChart(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            DashboardError::Internal(e) => {
                tracing::error!("D400 Dashboard: internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "내부 오류가 발생했습니다".to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

fn log_result(what: &str, result: &Result<DashboardResponse, DashboardError>) {
    match result {
        Ok(response) => tracing::info!(
            "D400 Dashboard: {} -> {} preview rows, {} charts, {} warnings",
            what,
            response.preview.len(),
            response.charts.len(),
            response.warnings.len()
        ),
        Err(e) => tracing::error!("D400 Dashboard: {} failed: {}", what, e),
    }
}

/// Query string options; a malformed query becomes a JSON 400 like other option errors.
fn query_options(query: Result<Query<DashboardOptions>, QueryRejection>) -> Result<DashboardOptions, DashboardError> {
    match query {
        Ok(Query(options)) => Ok(options),
        Err(rejection) => {
            tracing::warn!("D400 Dashboard: rejected query: {}", rejection.body_text());
            Err(DashboardError::InvalidOption(rejection.body_text()))
        }
    }
}

/// GET /api/d400/settings
pub async fn get_settings() -> Json<DashboardSettings> {
    Json(service::settings().await)
}

/// GET /api/d400/dashboard?unit=1000000&goal=200000000&view=all
pub async fn get_sample_dashboard(
    query: Result<Query<DashboardOptions>, QueryRejection>,
) -> Result<Json<DashboardResponse>, DashboardError> {
    let options = query_options(query)?;
    tracing::info!("D400 Dashboard: sample data, view={}", options.view.code());
    let result = service::build_sample_dashboard(options).await;
    log_result("sample dashboard", &result);
    result.map(Json)
}

/// POST /api/d400/dashboard
pub async fn post_dashboard(
    Json(request): Json<DashboardRequest>,
) -> Result<Json<DashboardResponse>, DashboardError> {
    tracing::info!(
        "D400 Dashboard: posted data ({} bytes), view={}",
        request.csv_text.as_ref().map(|t| t.len()).unwrap_or(0),
        request.options.view.code()
    );
    let result = service::build_dashboard(request).await;
    log_result("posted dashboard", &result);
    result.map(Json)
}

/// POST /api/d400/upload (multipart: `file` + option fields)
pub async fn upload_dashboard(mut multipart: Multipart) -> Result<Json<DashboardResponse>, DashboardError> {
    let result = service::build_dashboard_from_multipart(&mut multipart).await;
    log_result("upload", &result);
    result.map(Json)
}

/// GET /api/d400/chart/:file, e.g. `/api/d400/chart/bar_rate.svg`
pub async fn get_chart_svg(
    Path(file): Path<String>,
    query: Result<Query<DashboardOptions>, QueryRejection>,
) -> Result<Response, DashboardError> {
    let options = query_options(query)?;
    let svg = service::render_chart_svg(&file, options).await.map_err(|e| {
        tracing::error!("D400 Dashboard: chart export '{}' failed: {}", file, e);
        e
    })?;
    let disposition = format!("attachment; filename=\"{}\"", file);
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        svg,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_monthly_sales::error::LoadError;

    #[test]
    fn test_error_status_codes() {
        let load = DashboardError::Load(LoadError::NoValidRows).into_response();
        assert_eq!(load.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let option = DashboardError::InvalidOption("goal=inf".into()).into_response();
        assert_eq!(option.status(), StatusCode::BAD_REQUEST);

        let chart = DashboardError::UnknownChart("pie.svg".into()).into_response();
        assert_eq!(chart.status(), StatusCode::BAD_REQUEST);

        let internal = DashboardError::Internal(anyhow::anyhow!("disk")).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_load_error_body_is_prefixed() {
        let response = DashboardError::Load(LoadError::MissingColumn("증감률".into())).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "데이터 로드 오류: 필수 컬럼 누락: 증감률");
    }

    #[tokio::test]
    async fn test_chart_svg_headers() {
        let response = get_chart_svg(
            Path("cum_with_goal.svg".to_string()),
            Ok(Query(DashboardOptions::default())),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_query_options_parse() {
        let uri: axum::http::Uri = "/api/d400/dashboard?unit=1000&goal=150000000&view=trend&show_labels=true"
            .parse()
            .unwrap();
        let options = query_options(Query::try_from_uri(&uri)).unwrap();
        assert_eq!(options.unit, contracts::dashboards::d400_monthly_sales::DisplayUnit::Thousand);
        assert_eq!(options.goal, 150_000_000.0);
        assert!(options.show_labels);
    }

    #[tokio::test]
    async fn test_malformed_query_returns_json_400() {
        let uri: axum::http::Uri = "/api/d400/dashboard?unit=7".parse().unwrap();
        let err = get_sample_dashboard(Query::try_from_uri(&uri)).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidOption(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert!(body.error.starts_with("잘못된 옵션: "));

        let uri: axum::http::Uri = "/api/d400/chart/bar_rate.svg?view=pie".parse().unwrap();
        let err = get_chart_svg(Path("bar_rate.svg".to_string()), Query::try_from_uri(&uri))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidOption(_)));
    }
}
