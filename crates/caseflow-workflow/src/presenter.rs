//! 추천 결과 프레젠터.
//!
//! RecommendationResult → UI 표시용 데이터 변환 (유사 케이스 카드, ICM 권고 모달, 경보 배지).

use caseflow_core::models::recommendation::{RecommendationResult, SimilarCase};
use serde::Serialize;

use crate::policy::{self, EscalationReason, RECOMMEND_ICM_THRESHOLD};

/// 모달에 보여줄 상위 매치 수
const MODAL_TOP_MATCHES: usize = 3;

/// 모달 설명 발췌 길이 (문자 수)
const EXCERPT_CHARS: usize = 150;

/// 유사 케이스 카드
#[derive(Debug, Clone, Serialize)]
pub struct SimilarCaseView {
    /// 1부터 시작하는 순위
    pub rank: usize,
    pub case_id: String,
    pub title: String,
    pub score_label: &'static str,
    /// "87.0%"
    pub percent_text: String,
    /// 진행 막대 색상 (#rrggbb)
    pub color: &'static str,
    pub product: String,
    pub component: Option<String>,
    pub severity: String,
    pub status: Option<String>,
    pub description: String,
    pub resolution: Option<String>,
}

/// SimilarCase → SimilarCaseView 변환
pub fn present(rank: usize, item: &SimilarCase) -> SimilarCaseView {
    let details = &item.case.details;
    SimilarCaseView {
        rank,
        case_id: item.case.case_id.to_string(),
        title: details.title.clone(),
        score_label: policy::score_label(item.similarity_score),
        percent_text: percent_text(item.similarity_score),
        color: policy::score_color(item.similarity_score),
        product: details.product.clone(),
        component: details.component.clone(),
        severity: details.severity.clone(),
        status: details.case_status.clone(),
        description: details.description.clone(),
        resolution: details.resolution_notes.clone(),
    }
}

/// 추천 결과 전체를 순위대로 변환
pub fn present_all(result: &RecommendationResult) -> Vec<SimilarCaseView> {
    result
        .similar_cases
        .iter()
        .enumerate()
        .map(|(i, item)| present(i + 1, item))
        .collect()
}

/// "Found N similar case(s)"
pub fn found_cases_message(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Found {count} similar case{plural}")
}

/// 모달의 상위 매치 항목
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub rank: usize,
    pub case_id: String,
    pub title: String,
    /// "Confidence: 87.0%"
    pub confidence_text: String,
    pub product: String,
    /// 비어있으면 "N/A"
    pub severity: String,
    pub status: Option<String>,
    pub excerpt: String,
}

/// ICM 권고 모달
#[derive(Debug, Clone, Serialize)]
pub struct IcmAlertView {
    /// 최고 점수 "87.0%"
    pub score_percent_text: String,
    /// "80%"
    pub threshold_text: String,
    pub reasons: Vec<EscalationReason>,
    pub top_matches: Vec<MatchView>,
    /// 복제 버튼 활성 여부 (유사 케이스가 있어야 함)
    pub can_duplicate: bool,
    /// 합성 데이터 기반인지
    pub synthetic: bool,
}

/// RecommendationResult → IcmAlertView 변환
pub fn present_alert(result: &RecommendationResult) -> IcmAlertView {
    let top_matches = result
        .similar_cases
        .iter()
        .take(MODAL_TOP_MATCHES)
        .enumerate()
        .map(|(i, item)| {
            let details = &item.case.details;
            MatchView {
                rank: i + 1,
                case_id: item.case.case_id.to_string(),
                title: details.title.clone(),
                confidence_text: format!("Confidence: {}", percent_text(item.similarity_score)),
                product: details.product.clone(),
                severity: if details.severity.trim().is_empty() {
                    "N/A".to_string()
                } else {
                    details.severity.clone()
                },
                status: details.case_status.clone(),
                excerpt: excerpt(&details.description),
            }
        })
        .collect();

    IcmAlertView {
        score_percent_text: percent_text(result.highest_similarity),
        threshold_text: format!("{:.0}%", RECOMMEND_ICM_THRESHOLD * 100.0),
        reasons: policy::escalation_reasons(result),
        top_matches,
        can_duplicate: !result.is_empty(),
        synthetic: result.is_synthetic(),
    }
}

/// 경보 플래그 배지
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertIndicator {
    /// 알림 임계값 도달 여부
    pub active: bool,
    /// 임계값 이상 케이스 수 (배지 숫자)
    pub count: usize,
    /// 최고 점수 (정수 백분율, "87%")
    pub highest_text: String,
    pub synthetic: bool,
}

/// RecommendationResult → AlertIndicator 변환
pub fn alert_indicator(result: &RecommendationResult) -> AlertIndicator {
    AlertIndicator {
        active: result.alert_threshold_reached,
        count: policy::alert_count(result),
        highest_text: format!("{:.0}%", result.highest_similarity * 100.0),
        synthetic: result.is_synthetic(),
    }
}

fn percent_text(score: f64) -> String {
    format!("{:.1}%", policy::confidence_percent(score))
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::FallbackProvider;
    use crate::policy::ReasonKind;
    use caseflow_core::models::recommendation::Provenance;

    #[test]
    fn found_message_pluralization() {
        assert_eq!(found_cases_message(0), "Found 0 similar cases");
        assert_eq!(found_cases_message(1), "Found 1 similar case");
        assert_eq!(found_cases_message(3), "Found 3 similar cases");
    }

    #[test]
    fn present_all_ranks_cases() {
        let result = FallbackProvider::new().recommendation();
        let views = present_all(&result);

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].rank, 1);
        assert_eq!(views[0].case_id, "ICM-2024-001234");
        assert_eq!(views[0].score_label, "High");
        assert_eq!(views[0].percent_text, "87.0%");
        assert_eq!(views[0].color, "#f59e0b");
        assert_eq!(views[2].score_label, "Medium");
        assert_eq!(views[2].color, "#ef4444");
        assert_eq!(
            views[1].resolution.as_deref(),
            Some("Performance restored after index maintenance")
        );
    }

    #[test]
    fn alert_view_for_fallback() {
        let result = FallbackProvider::new().recommendation();
        let view = present_alert(&result);

        assert_eq!(view.score_percent_text, "87.0%");
        assert_eq!(view.threshold_text, "80%");
        assert_eq!(view.top_matches.len(), 3);
        assert_eq!(view.top_matches[0].confidence_text, "Confidence: 87.0%");
        assert!(view.top_matches[0].excerpt.ends_with("..."));
        assert!(view.can_duplicate);
        assert!(view.synthetic);
        assert_eq!(view.reasons[0].kind, ReasonKind::HighConfidence);
    }

    #[test]
    fn alert_view_without_cases_disables_duplicate() {
        let view = present_alert(&RecommendationResult::empty(Provenance::Service));
        assert!(!view.can_duplicate);
        assert!(view.top_matches.is_empty());
        assert_eq!(view.score_percent_text, "0.0%");
    }

    #[test]
    fn indicator_for_fallback() {
        let indicator = alert_indicator(&FallbackProvider::new().recommendation());
        assert_eq!(
            indicator,
            AlertIndicator {
                active: true,
                count: 3,
                highest_text: "87%".to_string(),
                synthetic: true,
            }
        );
    }

    #[test]
    fn excerpt_is_char_safe() {
        let long = "가".repeat(200);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), EXCERPT_CHARS + 3);
        assert_eq!(excerpt("short"), "short");
    }
}
