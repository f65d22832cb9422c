//! 워크플로우 상태.
//!
//! 상태마다 필요한 데이터를 variant 안에 담아 `ModalOpen`인데 초안이 없는 식의
//! 불가능한 조합을 타입으로 배제한다.

use caseflow_core::models::case::CaseDraft;
use serde::Serialize;

use crate::escalation::Escalation;

/// 케이스 작성 세션 상태
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WorkflowState {
    /// 폼 작성 중 (초기 상태). 제출 실패 시 초안을 보관한다.
    Editing { held: Option<CaseDraft> },
    /// 유사 케이스 검색 대기 중
    RecommendationPending {
        request_id: u64,
        resume: Box<WorkflowState>,
    },
    /// 유사 케이스 표시 중
    SuggestionsVisible { held: Option<CaseDraft> },
    /// ICM 권고 모달 표시 중 — 제출이 보류된 초안을 보관
    ModalOpen { pending: CaseDraft },
    /// ICM 생성/복제 폼 진행 중
    Escalating(Escalation),
    /// Case Store 호출 중
    Submitting {
        draft: CaseDraft,
        resume: Box<WorkflowState>,
    },
}

/// 상태 종류 (데이터 없는 태그)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Editing,
    RecommendationPending,
    SuggestionsVisible,
    ModalOpen,
    Escalating,
    Submitting,
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::Editing { held: None }
    }
}

impl WorkflowState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::Editing { .. } => WorkflowPhase::Editing,
            WorkflowState::RecommendationPending { .. } => WorkflowPhase::RecommendationPending,
            WorkflowState::SuggestionsVisible { .. } => WorkflowPhase::SuggestionsVisible,
            WorkflowState::ModalOpen { .. } => WorkflowPhase::ModalOpen,
            WorkflowState::Escalating(_) => WorkflowPhase::Escalating,
            WorkflowState::Submitting { .. } => WorkflowPhase::Submitting,
        }
    }

    /// 현재 보관 중인 초안
    pub fn held_draft(&self) -> Option<&CaseDraft> {
        match self {
            WorkflowState::Editing { held } | WorkflowState::SuggestionsVisible { held } => {
                held.as_ref()
            }
            WorkflowState::RecommendationPending { resume, .. } => resume.held_draft(),
            WorkflowState::ModalOpen { pending } => Some(pending),
            WorkflowState::Escalating(escalation) => Some(&escalation.draft),
            WorkflowState::Submitting { draft, .. } => Some(draft),
        }
    }

    /// 진행 중인 검색 요청을 버리고 그 이전 상태로 되돌린다.
    pub(crate) fn settle(self) -> Self {
        match self {
            WorkflowState::RecommendationPending { resume, .. } => resume.settle(),
            other => other,
        }
    }

    /// 같은 상태 종류를 유지하면서 보관 초안만 교체
    pub(crate) fn holding(self, draft: CaseDraft) -> Self {
        match self {
            WorkflowState::Editing { .. } => WorkflowState::Editing { held: Some(draft) },
            WorkflowState::SuggestionsVisible { .. } => {
                WorkflowState::SuggestionsVisible { held: Some(draft) }
            }
            WorkflowState::ModalOpen { .. } => WorkflowState::ModalOpen { pending: draft },
            WorkflowState::RecommendationPending { request_id, resume } => {
                WorkflowState::RecommendationPending {
                    request_id,
                    resume: Box::new(resume.holding(draft)),
                }
            }
            other => other,
        }
    }

    /// 검색 완료 후 보관 초안을 유지한 채 유사 케이스 표시 상태로 전환
    pub(crate) fn into_suggestions(self) -> Self {
        let held = self.held_draft().cloned();
        WorkflowState::SuggestionsVisible { held }
    }
}
