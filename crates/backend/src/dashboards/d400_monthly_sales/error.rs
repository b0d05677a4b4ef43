use thiserror::Error;

/// Reasons the CSV cannot be turned into a sales table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("필수 컬럼 누락: {0}")]
    MissingColumn(String),

    #[error("유효한 데이터 행이 없습니다 (숫자로 변환 가능한 행이 하나도 없음)")]
    NoValidRows,

    #[error("CSV를 읽을 수 없습니다: {0}")]
    Csv(#[from] csv::Error),

    #[error("UTF-8 텍스트가 아닙니다: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("파일이 너무 큽니다: {size} bytes (최대 {limit} bytes)")]
    TooLarge { size: usize, limit: usize },
}

/// Errors surfaced by the dashboard service.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("잘못된 옵션: {0}")]
    InvalidOption(String),

    #[error("알 수 없는 차트: {0}")]
    UnknownChart(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
