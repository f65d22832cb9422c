//! 워크플로우 에러 타입.
//!
//! 어떤 에러도 프로세스를 중단시키지 않는다. 모든 실패 후 세션은 잘 정의된 상태에 남는다.

use caseflow_core::error::CoreError;
use thiserror::Error;

use crate::state::WorkflowPhase;

/// 워크플로우 컨트롤러 에러
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 필수 필드 누락 (네트워크 호출 전에 거부)
    #[error("입력 검증 실패: {0}")]
    Validation(#[source] CoreError),

    /// Similarity Service 또는 Case Store 호출 실패 (이전 상태로 복귀)
    #[error("외부 서비스 호출 실패: {0}")]
    ServiceUnavailable(#[source] CoreError),

    /// 현재 상태에서 허용되지 않는 동작
    #[error("{phase:?} 상태에서 {action} 불가")]
    InvalidTransition {
        action: &'static str,
        phase: WorkflowPhase,
    },

    /// 이전 케이스 제출이 아직 진행 중
    #[error("케이스 제출 진행 중")]
    SubmissionInFlight,

    /// 전제 조건 위반 — 상태 변화 없는 no-op
    #[error("전제 조건 위반: {0}")]
    InvariantViolation(String),
}

impl WorkflowError {
    /// 치명적 에러 여부 (항상 false — 세션은 재시도/포기 가능한 상태로 남음)
    pub fn is_fatal(&self) -> bool {
        false
    }

    /// 사용자에게 알림으로 이미 보고되었는지
    pub fn is_user_notified(&self) -> bool {
        matches!(self, WorkflowError::ServiceUnavailable(_))
    }
}

impl From<CoreError> for WorkflowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { .. } => WorkflowError::Validation(err),
            other => WorkflowError::ServiceUnavailable(other),
        }
    }
}
