//! 에스컬레이션(ICM 생성) 폼 시드.
//!
//! 새 ICM 생성은 작성 중이던 초안으로, 기존 ICM 복제는 최상위 유사 케이스로 폼을 채운다.

use caseflow_core::models::case::{Case, CaseDraft, CaseId};
use serde::Serialize;

/// 지원 토픽 선택지
pub const SUPPORT_TOPICS: [&str; 3] = [
    "Virtual Machine Scale Sets / Cannot update my scale set / Instances in a failed state",
    "Storage Account / Performance Issue / High Latency",
    "Network / Connectivity Issue / Cannot connect to VM",
];

/// ICM 템플릿 (이름, 템플릿 ID)
pub const TEMPLATES: [(&str, &str); 2] = [("AzureRT SEV3 to EEE", "K2hs2X"), ("VCPE for Sev2", "p2Xh19")];

const DEFAULT_SEVERITY: &str = "3";

/// 에스컬레이션 경로
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationKind {
    /// 권고를 무시하고 새 ICM 생성
    NewIncident,
    /// 기존 ICM 복제
    Duplicate {
        incident_id: CaseId,
        incident_title: String,
    },
}

/// ICM 생성 폼 입력값
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationForm {
    pub support_topic: String,
    pub template: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub impacted_service: String,
    pub subscription: String,
}

impl EscalationForm {
    /// 작성 중인 초안으로 폼 채우기
    pub fn from_draft(draft: &CaseDraft) -> Self {
        Self {
            support_topic: or_default(&draft.product, SUPPORT_TOPICS[0]),
            template: TEMPLATES[0].0.to_string(),
            severity: or_default(&draft.severity, DEFAULT_SEVERITY),
            title: draft.title.clone(),
            description: draft.description.clone(),
            impacted_service: draft.component.clone().unwrap_or_default(),
            subscription: draft.tenant.clone().unwrap_or_default(),
        }
    }

    /// 복제 대상 ICM으로 폼 채우기
    pub fn from_incident(incident: &Case) -> Self {
        let details = &incident.details;
        Self {
            impacted_service: details
                .component
                .clone()
                .unwrap_or_else(|| details.product.clone()),
            ..Self::from_draft(details)
        }
    }

    /// 템플릿 ID (알 수 없는 템플릿이면 None)
    pub fn template_id(&self) -> Option<&'static str> {
        TEMPLATES
            .iter()
            .find(|(name, _)| *name == self.template)
            .map(|(_, id)| *id)
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// 진행 중인 에스컬레이션
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Escalation {
    pub kind: EscalationKind,
    /// 모달을 열게 만든 원래 초안 (케이스로 제출되지 않음)
    pub draft: CaseDraft,
    pub form: EscalationForm,
}

impl Escalation {
    /// 새 ICM 생성 경로
    pub fn new_incident(draft: CaseDraft) -> Self {
        let form = EscalationForm::from_draft(&draft);
        Self {
            kind: EscalationKind::NewIncident,
            draft,
            form,
        }
    }

    /// 기존 ICM 복제 경로
    pub fn duplicate(draft: CaseDraft, incident: &Case) -> Self {
        Self {
            kind: EscalationKind::Duplicate {
                incident_id: incident.case_id.clone(),
                incident_title: incident.details.title.clone(),
            },
            draft,
            form: EscalationForm::from_incident(incident),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self.kind, EscalationKind::Duplicate { .. })
    }
}
