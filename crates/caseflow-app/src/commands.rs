//! CLI 명령 실행.
//!
//! 각 명령은 `WorkflowController` 조작 순서를 그대로 따른다.

use anyhow::{bail, Result};
use caseflow_core::models::case::{CaseDraft, CaseId};
use caseflow_core::ports::case_store::CaseStore;
use caseflow_network::http_client::HttpApiClient;
use caseflow_workflow::controller::{RecommendationOutcome, SubmitOutcome, WorkflowController};
use caseflow_workflow::error::WorkflowError;
use caseflow_workflow::presenter;
use clap::ValueEnum;
use tracing::{info, warn};

use crate::console;

/// ICM 권고 모달에서의 선택
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IcmChoice {
    /// 권고를 무시하고 새 ICM 생성
    Create,
    /// 최상위 유사 ICM 복제
    Duplicate,
    /// 모달 닫기 (초안 유지)
    Cancel,
}

/// 데모 시나리오 초안
pub fn demo_draft() -> CaseDraft {
    let mut draft = CaseDraft::new(
        "DB timeout",
        "Customers report connection timeouts to Azure SQL Database during peak hours \
         after the latest deployment.",
        "Azure SQL Database",
        "2",
        "High",
    );
    draft.error_message = Some("Connection timeout".to_string());
    draft.region = Some("East US".to_string());
    draft
}

/// 유사 케이스 검색만 수행
pub async fn recommend(controller: &WorkflowController, draft: &CaseDraft, json: bool) -> Result<()> {
    let result = match controller.request_recommendations(draft).await {
        Ok(RecommendationOutcome::Ready(result)) => result,
        Ok(RecommendationOutcome::Superseded) => return Ok(()),
        Err(e) => {
            notify_failure(controller, &e);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    console::print_notification(controller.notification().as_ref());
    console::print_similar_cases(&controller.similar_case_views());
    if let Some(indicator) = controller.alert_indicator() {
        console::print_indicator(&indicator);
    }
    if result.recommend_icm {
        console::print_alert(&presenter::present_alert(&result));
    }
    Ok(())
}

/// 검색 → 제출 → (권고 시) 모달 처리
pub async fn submit(controller: &WorkflowController, draft: CaseDraft, on_icm: IcmChoice) -> Result<()> {
    match controller.request_recommendations(&draft).await {
        Ok(_) => {
            console::print_notification(controller.notification().as_ref());
            console::print_similar_cases(&controller.similar_case_views());
        }
        Err(e @ WorkflowError::Validation(_)) => return Err(e.into()),
        Err(e) => {
            notify_failure(controller, &e);
            warn!("추천 결과 없이 제출 진행: {e}");
        }
    }

    match controller.submit_case(draft).await {
        Ok(SubmitOutcome::Created(case)) => {
            console::print_notification(controller.notification().as_ref());
            console::print_case(&case);
            Ok(())
        }
        Ok(SubmitOutcome::Deferred) => resolve_modal(controller, on_icm),
        Err(e) => {
            notify_failure(controller, &e);
            Err(e.into())
        }
    }
}

fn resolve_modal(controller: &WorkflowController, on_icm: IcmChoice) -> Result<()> {
    if let Some(result) = controller.recommendation() {
        console::print_alert(&presenter::present_alert(&result));
    }
    info!("ICM 권고 모달 선택: {on_icm:?}");

    match on_icm {
        IcmChoice::Create => {
            let escalation = controller.create_incident_anyway()?;
            console::print_escalation(&escalation);
            controller.close_escalation()?;
        }
        IcmChoice::Duplicate => match controller.duplicate_incident() {
            Ok(escalation) => {
                console::print_notification(controller.notification().as_ref());
                console::print_escalation(&escalation);
                controller.close_escalation()?;
            }
            Err(WorkflowError::InvariantViolation(reason)) => {
                println!("⚠️  {reason}");
                controller.cancel_modal()?;
            }
            Err(e) => return Err(e.into()),
        },
        IcmChoice::Cancel => {
            controller.cancel_modal()?;
            println!("케이스 제출 보류 — 초안은 유지됩니다");
        }
    }
    Ok(())
}

/// 오프라인 데모 시나리오
pub async fn demo(controller: &WorkflowController, on_icm: IcmChoice) -> Result<()> {
    println!("🔌 데모 모드 — 합성 데이터 사용 (백엔드 연결 없음)");
    println!();
    submit(controller, demo_draft(), on_icm).await
}

pub async fn list_cases(store: &dyn CaseStore, limit: u32, offset: u32) -> Result<()> {
    let cases = store.list(limit, offset).await?;
    if cases.is_empty() {
        println!("케이스 없음");
    }
    for case in &cases {
        console::print_case(case);
    }
    Ok(())
}

pub async fn get_case(store: &dyn CaseStore, id: &str) -> Result<()> {
    let case_id = id
        .parse::<i64>()
        .map(CaseId::Number)
        .unwrap_or_else(|_| CaseId::from(id));
    let case = store.get(&case_id).await?;
    console::print_case(&case);
    if !case.details.description.is_empty() {
        println!("  {}", case.details.description);
    }
    Ok(())
}

pub async fn health(client: &HttpApiClient) -> Result<()> {
    let status = client.health().await?;
    console::print_health(&status);
    if !status.is_ready() {
        bail!("백엔드가 아직 준비되지 않았습니다");
    }
    Ok(())
}

fn notify_failure(controller: &WorkflowController, error: &WorkflowError) {
    if error.is_user_notified() {
        console::print_notification(controller.notification().as_ref());
    }
}
