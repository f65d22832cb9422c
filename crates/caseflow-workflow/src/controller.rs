//! 워크플로우 컨트롤러.
//!
//! 케이스 작성 세션의 상태 머신. 추천 요청, 케이스 제출, ICM 권고 모달,
//! 에스컬레이션 진입을 조율한다.
//!
//! 세션 상태는 `parking_lot::Mutex` 안에 있고 `.await` 동안에는 잠금을 잡지 않는다.
//! 추천 요청마다 순번을 붙여 늦게 도착한 이전 요청의 응답은 버린다.

use std::mem;
use std::sync::Arc;

use caseflow_core::config::AppConfig;
use caseflow_core::models::case::{Case, CaseDraft};
use caseflow_core::models::notification::Notification;
use caseflow_core::models::recommendation::{RecommendationRequest, RecommendationResult};
use caseflow_core::ports::case_store::CaseStore;
use caseflow_core::ports::similarity::SimilarityService;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::escalation::Escalation;
use crate::fallback::FallbackProvider;
use crate::notification::NotificationCenter;
use crate::presenter::{self, AlertIndicator, IcmAlertView, SimilarCaseView};
use crate::state::{WorkflowPhase, WorkflowState};

const RECOMMEND_FAILED_MESSAGE: &str = "Failed to get recommendations. Please try again.";
const SUBMIT_FAILED_MESSAGE: &str = "Failed to create case. Please try again.";

/// 컨트롤러 동작 설정
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    /// 추천 요청 시 유사 케이스 수
    pub top_k: u32,
    /// 알림 표시 시간 (밀리초)
    pub display_ms: u64,
    /// 추천 결과 없이 경보를 열 때 합성 데이터 사용 여부
    pub fallback_enabled: bool,
}

impl WorkflowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.recommendation.top_k,
            display_ms: config.notification.display_ms,
            fallback_enabled: config.demo.fallback_enabled,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default_config())
    }
}

/// 추천 요청 결과
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    /// 최신 요청의 결과가 세션에 반영됨
    Ready(RecommendationResult),
    /// 그 사이 새 요청/상태 전환이 있어 응답을 버림
    Superseded,
}

/// 케이스 제출 결과
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Case Store에 케이스 생성됨
    Created(Case),
    /// ICM 권고로 모달이 열려 제출이 보류됨
    Deferred,
}

#[derive(Default)]
struct Session {
    state: WorkflowState,
    recommendation: Option<RecommendationResult>,
    next_request_id: u64,
}

/// 케이스 작성 세션 컨트롤러
pub struct WorkflowController {
    similarity: Arc<dyn SimilarityService>,
    store: Arc<dyn CaseStore>,
    notifications: NotificationCenter,
    fallback: FallbackProvider,
    settings: WorkflowSettings,
    session: Mutex<Session>,
}

impl WorkflowController {
    pub fn new(
        similarity: Arc<dyn SimilarityService>,
        store: Arc<dyn CaseStore>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            similarity,
            store,
            notifications: NotificationCenter::new(settings.display_ms),
            fallback: FallbackProvider::new(),
            settings,
            session: Mutex::new(Session::default()),
        }
    }

    // ============================================================
    // 추천
    // ============================================================

    /// 유사 케이스 검색.
    ///
    /// 제목/설명이 비어있으면 네트워크 호출 없이 `Validation`.
    /// 실패 시 이전 상태로 돌아가고 에러 알림을 게시한다 (자동 재시도 없음).
    pub async fn request_recommendations(
        &self,
        draft: &CaseDraft,
    ) -> Result<RecommendationOutcome, WorkflowError> {
        draft.validate_for_search()?;

        let request_id = {
            let mut session = self.session.lock();
            match session.state.phase() {
                WorkflowPhase::Editing
                | WorkflowPhase::SuggestionsVisible
                | WorkflowPhase::RecommendationPending => {}
                phase => {
                    return Err(WorkflowError::InvalidTransition {
                        action: "request_recommendations",
                        phase,
                    })
                }
            }
            session.next_request_id += 1;
            let request_id = session.next_request_id;
            let prior = mem::take(&mut session.state).settle();
            session.state = WorkflowState::RecommendationPending {
                request_id,
                resume: Box::new(prior),
            };
            request_id
        };

        debug!("유사 케이스 검색 요청 #{request_id}: {}", draft.title);
        let request = RecommendationRequest::from_draft(draft, self.settings.top_k);
        let response = self.similarity.recommend(&request).await;

        let mut session = self.session.lock();
        let is_current = matches!(
            &session.state,
            WorkflowState::RecommendationPending { request_id: id, .. } if *id == request_id
        );
        if !is_current {
            debug!("이전 검색 요청 #{request_id}의 응답 폐기");
            return Ok(RecommendationOutcome::Superseded);
        }
        let pending = mem::take(&mut session.state);

        match response {
            Ok(mut result) => {
                if result.normalize() {
                    warn!("서비스가 보고한 최고 점수가 목록과 달라 재계산함");
                }
                let count = result.len();
                session.state = pending.settle().into_suggestions();
                session.recommendation = Some(result.clone());
                drop(session);

                info!(
                    "유사 케이스 {count}건 (최고 {:.2}, ICM 권고: {})",
                    result.highest_similarity, result.recommend_icm
                );
                self.notifications
                    .success(presenter::found_cases_message(count));
                Ok(RecommendationOutcome::Ready(result))
            }
            Err(e) => {
                session.state = pending.settle();
                drop(session);

                warn!("유사 케이스 검색 실패: {e}");
                self.notifications.error(RECOMMEND_FAILED_MESSAGE);
                Err(WorkflowError::ServiceUnavailable(e))
            }
        }
    }

    // ============================================================
    // 제출
    // ============================================================

    /// 케이스 제출.
    ///
    /// 최근 추천 결과가 ICM을 권고하면 Case Store를 호출하지 않고 모달을 연다.
    /// 모달이 열린 상태에서 다시 제출하면 일반 케이스로 생성한다.
    pub async fn submit_case(&self, draft: CaseDraft) -> Result<SubmitOutcome, WorkflowError> {
        {
            let mut session = self.session.lock();
            let phase = session.state.phase();
            match phase {
                WorkflowPhase::Submitting => return Err(WorkflowError::SubmissionInFlight),
                WorkflowPhase::Escalating => {
                    return Err(WorkflowError::InvalidTransition {
                        action: "submit_case",
                        phase,
                    })
                }
                _ => {}
            }

            let recommend_icm = session
                .recommendation
                .as_ref()
                .is_some_and(|r| r.recommend_icm);
            if recommend_icm && phase != WorkflowPhase::ModalOpen {
                session.state = WorkflowState::ModalOpen { pending: draft };
                info!("ICM 권고 — 케이스 제출 보류, 모달 표시");
                return Ok(SubmitOutcome::Deferred);
            }

            draft.validate()?;
            let prior = mem::take(&mut session.state).settle();
            session.state = WorkflowState::Submitting {
                draft: draft.clone(),
                resume: Box::new(prior),
            };
        }

        let created = self.store.create(&draft).await;

        let mut session = self.session.lock();
        let resume = match mem::take(&mut session.state) {
            WorkflowState::Submitting { resume, .. } => *resume,
            other => {
                let phase = other.phase();
                session.state = other;
                return Err(WorkflowError::InvariantViolation(format!(
                    "제출 완료 시점에 {phase:?} 상태"
                )));
            }
        };

        match created {
            Ok(case) => {
                session.state = WorkflowState::default();
                session.recommendation = None;
                drop(session);

                info!("케이스 생성: #{}", case.case_id);
                self.notifications
                    .success(format!("Case #{} created successfully!", case.case_id));
                Ok(SubmitOutcome::Created(case))
            }
            Err(e) => {
                session.state = resume.holding(draft);
                drop(session);

                warn!("케이스 생성 실패: {e}");
                self.notifications.error(SUBMIT_FAILED_MESSAGE);
                Err(WorkflowError::ServiceUnavailable(e))
            }
        }
    }

    // ============================================================
    // ICM 권고 모달
    // ============================================================

    /// 권고를 무시하고 새 ICM 생성 폼으로 진행 (일반 케이스는 제출하지 않음)
    pub fn create_incident_anyway(&self) -> Result<Escalation, WorkflowError> {
        let mut session = self.session.lock();
        let pending = take_modal_draft(&mut session.state, "create_incident_anyway")?;

        let escalation = Escalation::new_incident(pending);
        session.state = WorkflowState::Escalating(escalation.clone());
        info!("새 ICM 생성 폼 진입");
        Ok(escalation)
    }

    /// 최상위 유사 케이스를 복제하는 ICM 폼으로 진행.
    ///
    /// 유사 케이스가 없으면 상태를 바꾸지 않고 `InvariantViolation`.
    pub fn duplicate_incident(&self) -> Result<Escalation, WorkflowError> {
        let mut session = self.session.lock();
        let phase = session.state.phase();
        if phase != WorkflowPhase::ModalOpen {
            return Err(WorkflowError::InvalidTransition {
                action: "duplicate_incident",
                phase,
            });
        }

        let Some(incident) = session
            .recommendation
            .as_ref()
            .and_then(|r| r.top_case())
            .map(|c| c.case.clone())
        else {
            warn!("복제할 유사 케이스 없음 — 모달 유지");
            return Err(WorkflowError::InvariantViolation(
                "복제할 유사 케이스가 없습니다".to_string(),
            ));
        };

        let pending = take_modal_draft(&mut session.state, "duplicate_incident")?;
        let escalation = Escalation::duplicate(pending, &incident);
        session.state = WorkflowState::Escalating(escalation.clone());
        drop(session);

        info!("ICM 복제 폼 진입: #{}", incident.case_id);
        self.notifications.info(format!(
            "Duplicating ICM #{} - {}",
            incident.case_id, incident.details.title
        ));
        Ok(escalation)
    }

    /// 모달 닫기 — 보류된 초안은 유지
    pub fn cancel_modal(&self) -> Result<(), WorkflowError> {
        let mut session = self.session.lock();
        let pending = take_modal_draft(&mut session.state, "cancel_modal")?;
        session.state = WorkflowState::SuggestionsVisible {
            held: Some(pending),
        };
        debug!("ICM 권고 모달 닫힘");
        Ok(())
    }

    /// 에스컬레이션 폼 닫기 — 보류된 초안도 버린다
    pub fn close_escalation(&self) -> Result<Escalation, WorkflowError> {
        let mut session = self.session.lock();
        match mem::take(&mut session.state) {
            WorkflowState::Escalating(escalation) => {
                debug!("에스컬레이션 폼 닫힘");
                Ok(escalation)
            }
            other => {
                let phase = other.phase();
                session.state = other;
                Err(WorkflowError::InvalidTransition {
                    action: "close_escalation",
                    phase,
                })
            }
        }
    }

    /// 경보 플래그 클릭.
    ///
    /// 추천 결과가 없고 대체 데이터가 켜져 있으면 합성 결과를 설치한 뒤 모달을 연다.
    /// 검색 응답을 기다리는 중에는 거부한다.
    pub fn activate_alert(&self, draft: CaseDraft) -> Result<IcmAlertView, WorkflowError> {
        let mut session = self.session.lock();
        let phase = session.state.phase();
        if matches!(
            phase,
            WorkflowPhase::RecommendationPending
                | WorkflowPhase::Submitting
                | WorkflowPhase::Escalating
        ) {
            return Err(WorkflowError::InvalidTransition {
                action: "activate_alert",
                phase,
            });
        }

        if session.recommendation.is_none() && self.settings.fallback_enabled {
            info!("추천 결과 없음 — 합성 데이터 사용");
            session.recommendation = Some(self.fallback.recommendation());
        }
        let Some(result) = session.recommendation.as_ref() else {
            return Err(WorkflowError::InvariantViolation(
                "표시할 추천 결과가 없습니다".to_string(),
            ));
        };
        let view = presenter::present_alert(result);

        session.state = WorkflowState::ModalOpen { pending: draft };
        Ok(view)
    }

    // ============================================================
    // 조회
    // ============================================================

    /// 현재 상태 스냅샷
    pub fn state(&self) -> WorkflowState {
        self.session.lock().state.clone()
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.session.lock().state.phase()
    }

    /// 가장 최근 추천 결과
    pub fn recommendation(&self) -> Option<RecommendationResult> {
        self.session.lock().recommendation.clone()
    }

    /// 현재 표시 중인 알림
    pub fn notification(&self) -> Option<Notification> {
        self.notifications.current()
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<Option<Notification>> {
        self.notifications.subscribe()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// 보관 중인 초안 (제출 실패 / 모달 보류 시)
    pub fn held_draft(&self) -> Option<CaseDraft> {
        self.session.lock().state.held_draft().cloned()
    }

    /// 진행 중인 에스컬레이션
    pub fn escalation(&self) -> Option<Escalation> {
        match &self.session.lock().state {
            WorkflowState::Escalating(escalation) => Some(escalation.clone()),
            _ => None,
        }
    }

    /// 경보 배지 (추천 결과가 있을 때)
    pub fn alert_indicator(&self) -> Option<AlertIndicator> {
        self.session
            .lock()
            .recommendation
            .as_ref()
            .map(presenter::alert_indicator)
    }

    /// 유사 케이스 카드 목록
    pub fn similar_case_views(&self) -> Vec<SimilarCaseView> {
        self.session
            .lock()
            .recommendation
            .as_ref()
            .map(presenter::present_all)
            .unwrap_or_default()
    }
}

/// `ModalOpen`의 보류 초안을 꺼낸다. 다른 상태면 상태를 그대로 두고 에러.
fn take_modal_draft(
    state: &mut WorkflowState,
    action: &'static str,
) -> Result<CaseDraft, WorkflowError> {
    match mem::take(state) {
        WorkflowState::ModalOpen { pending } => Ok(pending),
        other => {
            let phase = other.phase();
            *state = other;
            Err(WorkflowError::InvalidTransition { action, phase })
        }
    }
}
