//! 백엔드 헬스 체크 모델.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `GET /health` 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// 서비스 상태 ("healthy")
    pub status: String,
    /// 서버 시각
    #[serde(with = "crate::models::case::timestamp")]
    pub timestamp: NaiveDateTime,
    /// DB 연결 상태 ("connected" 또는 "error: ...")
    pub database: String,
    /// 임베딩 모델 로드 여부
    pub model_loaded: bool,
}

impl HealthStatus {
    /// 유사도 검색까지 가능한 상태인지
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.database == "connected" && self.model_loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_database_is_not_ready() {
        let json = r#"{
            "status": "healthy",
            "timestamp": "2024-01-15T10:30:00.123456",
            "database": "error: login failed",
            "model_loaded": true
        }"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert!(!health.is_ready());
    }
}
