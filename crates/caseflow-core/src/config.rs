//! 애플리케이션 설정 구조체.
//!
//! 백엔드 URL, 추천 개수, 알림 표시 시간, 데모 모드 등 런타임 설정을 정의한다.
//! `ConfigManager`를 통해 JSON 파일에서 로드/저장된다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;
use crate::models::recommendation::{DEFAULT_TOP_K, MAX_TOP_K};

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 백엔드 연결 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 유사 케이스 추천 설정
    #[serde(default)]
    pub recommendation: RecommendationConfig,
    /// 알림 설정
    #[serde(default)]
    pub notification: NotificationConfig,
    /// 데모(오프라인) 설정
    #[serde(default)]
    pub demo: DemoConfig,
}

// ============================================================
// 서버 설정
// ============================================================

/// 백엔드 REST API 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API 서버 기본 URL (예: "http://localhost:8000")
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 재시도 횟수 (0이면 재시도 없음)
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: 0,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

// ============================================================
// 추천 설정
// ============================================================

/// 유사 케이스 추천 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// 요청할 유사 케이스 수 (1 ~ 20)
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

// ============================================================
// 알림 설정
// ============================================================

/// 토스트 알림 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 알림 자동 해제까지의 표시 시간 (밀리초)
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_ms: default_display_ms(),
        }
    }
}

fn default_display_ms() -> u64 {
    4_000
}

/// 알림 표시 시간 상한 (24시간)
pub const MAX_DISPLAY_MS: u64 = 24 * 60 * 60 * 1_000;

// ============================================================
// 데모 설정
// ============================================================

/// 데모 모드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// 추천 결과가 없을 때 합성 데이터로 대체할지
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            recommendation: RecommendationConfig::default(),
            notification: NotificationConfig::default(),
            demo: DemoConfig::default(),
        }
    }

    /// 설정값 범위 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.server.base_url.trim().is_empty() {
            return Err(CoreError::Config("server.base_url이 비어있습니다".to_string()));
        }
        if !(1..=MAX_TOP_K).contains(&self.recommendation.top_k) {
            return Err(CoreError::Config(format!(
                "recommendation.top_k는 1 ~ {MAX_TOP_K} 범위여야 합니다: {}",
                self.recommendation.top_k
            )));
        }
        if !(1..=MAX_DISPLAY_MS).contains(&self.notification.display_ms) {
            return Err(CoreError::Config(format!(
                "notification.display_ms는 1 ~ {MAX_DISPLAY_MS} 범위여야 합니다: {}",
                self.notification.display_ms
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let json = r#"{ "server": { "base_url": "http://backend:8000" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.server.base_url, "http://backend:8000");
        assert_eq!(config.server.request_timeout_ms, 30_000);
        assert_eq!(config.server.max_retries, 0);
        assert_eq!(config.recommendation.top_k, 5);
        assert_eq!(config.notification.display_ms, 4_000);
        assert!(config.demo.fallback_enabled);
    }

    #[test]
    fn validate_rejects_out_of_range_top_k() {
        let mut config = AppConfig::default_config();
        assert!(config.validate().is_ok());

        config.recommendation.top_k = 21;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_display_time() {
        let mut config = AppConfig::default_config();
        config.notification.display_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_display_time() {
        let mut config = AppConfig::default_config();
        config.notification.display_ms = MAX_DISPLAY_MS;
        assert!(config.validate().is_ok());

        config.notification.display_ms = u64::MAX;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn missing_server_section_uses_defaults() {
        let json = r#"{ "recommendation": { "top_k": 8 } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.server.request_timeout_ms, 30_000);
        assert_eq!(config.recommendation.top_k, 8);
        assert!(config.validate().is_ok());
    }
}
