//! 사용자 알림(토스트) 모델.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Success,
    Error,
    Info,
}

/// 화면에 잠시 표시되는 알림
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// 표시 문구
    pub message: String,
    /// 알림 종류
    pub severity: NotificationSeverity,
    /// 게시 시각
    pub created_at: DateTime<Utc>,
    /// 자동 해제 시각
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    /// 지금부터 `display_ms` 동안 표시되는 알림 생성
    pub fn new(message: impl Into<String>, severity: NotificationSeverity, display_ms: u64) -> Self {
        let created_at = Utc::now();
        // 표현 범위를 넘으면 만료 시각을 최대값으로 고정
        let expires_at = i64::try_from(display_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            message: message.into(),
            severity,
            created_at,
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_follows_display_time() {
        let n = Notification::new("Found 3 similar cases", NotificationSeverity::Success, 4_000);
        assert_eq!((n.expires_at - n.created_at).num_milliseconds(), 4_000);
    }

    #[test]
    fn oversized_display_time_saturates() {
        let n = Notification::new("Case #1 created successfully!", NotificationSeverity::Info, u64::MAX);
        assert_eq!(n.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(n.expires_at > n.created_at);
    }
}
