//! 임계값 정책.
//!
//! Similarity Service가 계산한 추천 결과에서 UI용 보조 신호를 도출하는 순수 함수 모음.
//! `alert_threshold_reached` / `recommend_icm` 판정 자체는 서비스 몫이다.

use caseflow_core::models::recommendation::{RecommendationResult, SimilarCase};
use serde::Serialize;

/// 알림 임계값 (이상이면 경보 대상)
pub const ALERT_THRESHOLD: f64 = 0.75;

/// ICM 권고 임계값
pub const RECOMMEND_ICM_THRESHOLD: f64 = 0.80;

/// "Very High" 라벨 임계값
pub const VERY_HIGH_THRESHOLD: f64 = 0.90;

/// 알림 임계값 이상인 유사 케이스 수
pub fn alert_count(result: &RecommendationResult) -> usize {
    result
        .similar_cases
        .iter()
        .filter(|c| c.similarity_score >= ALERT_THRESHOLD)
        .count()
}

/// 점수 → 백분율 (소수점 1자리 반올림)
pub fn confidence_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

/// 점수 → 라벨. 높은 구간부터 검사하며 하한 포함.
pub fn score_label(score: f64) -> &'static str {
    if score >= VERY_HIGH_THRESHOLD {
        "Very High"
    } else if score >= RECOMMEND_ICM_THRESHOLD {
        "High"
    } else if score >= ALERT_THRESHOLD {
        "Medium"
    } else {
        "Low"
    }
}

/// 점수 → 표시 색상 (#rrggbb)
pub fn score_color(score: f64) -> &'static str {
    if score >= VERY_HIGH_THRESHOLD {
        "#10b981" // green
    } else if score >= RECOMMEND_ICM_THRESHOLD {
        "#f59e0b" // amber
    } else if score >= ALERT_THRESHOLD {
        "#ef4444" // red
    } else {
        "#6b7280" // gray
    }
}

/// 유사 케이스 목록의 최고 점수 (비어있으면 0)
pub fn highest_similarity(cases: &[SimilarCase]) -> f64 {
    cases
        .iter()
        .map(|c| c.similarity_score)
        .reduce(f64::max)
        .unwrap_or(0.0)
}

/// 점수 분포 분석 결과
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreAnalysis {
    pub max_score: f64,
    pub alert: bool,
    pub recommend_icm: bool,
    pub count_above_alert: usize,
    pub count_above_icm: usize,
}

/// 점수 분포 분석 (서비스와 같은 기준)
pub fn analyze(scores: &[f64]) -> ScoreAnalysis {
    let max_score = scores.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let nonempty = !scores.is_empty();

    ScoreAnalysis {
        max_score,
        alert: nonempty && max_score >= ALERT_THRESHOLD,
        recommend_icm: nonempty && max_score >= RECOMMEND_ICM_THRESHOLD,
        count_above_alert: scores.iter().filter(|s| **s >= ALERT_THRESHOLD).count(),
        count_above_icm: scores
            .iter()
            .filter(|s| **s >= RECOMMEND_ICM_THRESHOLD)
            .count(),
    }
}

/// ICM 권고 사유 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    HighConfidence,
    SimilarCases,
    HighSeverity,
    DuplicateRisk,
}

/// 사용자에게 보여줄 ICM 권고 사유
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationReason {
    pub kind: ReasonKind,
    pub title: &'static str,
    pub detail: String,
}

/// ICM 권고 사유 목록 조립.
///
/// 유사 케이스 수와 중복 위험은 항상 포함되고,
/// 높은 신뢰도는 `recommend_icm`일 때, 높은 심각도는 Sev 1/2 유사 케이스가 있을 때만 포함된다.
pub fn escalation_reasons(result: &RecommendationResult) -> Vec<EscalationReason> {
    let mut reasons = Vec::with_capacity(4);

    if result.recommend_icm {
        reasons.push(EscalationReason {
            kind: ReasonKind::HighConfidence,
            title: "High Confidence Score",
            detail: format!(
                "{:.1}% (Above {:.0}% threshold)",
                confidence_percent(result.highest_similarity),
                RECOMMEND_ICM_THRESHOLD * 100.0
            ),
        });
    }

    reasons.push(EscalationReason {
        kind: ReasonKind::SimilarCases,
        title: "Similar Cases Found",
        detail: format!(
            "{} cases with high similarity detected",
            result.similar_cases.len()
        ),
    });

    if result.similar_cases.iter().any(|c| c.case.is_high_severity()) {
        reasons.push(EscalationReason {
            kind: ReasonKind::HighSeverity,
            title: "High Severity Cases",
            detail: "Similar cases include Severity 1 or 2 incidents".to_string(),
        });
    }

    reasons.push(EscalationReason {
        kind: ReasonKind::DuplicateRisk,
        title: "Duplicate Risk",
        detail: "Creating an ICM may result in duplicate incidents".to_string(),
    });

    reasons
}
