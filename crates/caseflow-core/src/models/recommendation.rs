//! 유사 케이스 추천 모델.
//!
//! Similarity Service 요청/응답과 ICM 통계.

use serde::{Deserialize, Serialize};

use crate::models::case::{Case, CaseDraft};

/// 기본 추천 개수
pub const DEFAULT_TOP_K: u32 = 5;

/// 서비스가 허용하는 최대 추천 개수
pub const MAX_TOP_K: u32 = 20;

/// 유사 케이스 (점수 포함)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCase {
    /// 과거 케이스
    #[serde(rename = "case")]
    pub case: Case,
    /// 유사도 점수 (0.0 ~ 1.0)
    pub similarity_score: f64,
}

/// 과거 ICM 통계 (표시 전용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcmStatistics {
    pub total_similar_cases_reviewed: u32,
    pub cases_with_icm: u32,
    pub average_delay_days: f64,
    pub confidence_score: f64,
    pub review_period_months: u32,
}

/// 추천 결과의 출처
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Similarity Service 응답
    #[default]
    Service,
    /// 데모용 합성 데이터 (백엔드 없음)
    Synthetic,
}

/// 추천 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// 유사도 내림차순 정렬된 유사 케이스
    pub similar_cases: Vec<SimilarCase>,
    /// 최고 점수가 알림 임계값(0.75) 이상인지
    pub alert_threshold_reached: bool,
    /// 최고 점수가 ICM 권고 임계값(0.80) 이상인지
    pub recommend_icm: bool,
    /// `similar_cases` 중 최고 점수 (비어있으면 0)
    pub highest_similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icm_statistics: Option<IcmStatistics>,
    #[serde(default)]
    pub provenance: Provenance,
}

impl RecommendationResult {
    /// 유사 케이스 목록으로부터 결과 생성.
    ///
    /// 점수 내림차순으로 정렬하고 `highest_similarity`를 목록에서 계산한다.
    pub fn from_cases(
        mut similar_cases: Vec<SimilarCase>,
        alert_threshold_reached: bool,
        recommend_icm: bool,
        provenance: Provenance,
    ) -> Self {
        sort_ranked(&mut similar_cases);
        let highest_similarity = max_score(&similar_cases);
        Self {
            similar_cases,
            alert_threshold_reached,
            recommend_icm,
            highest_similarity,
            icm_statistics: None,
            provenance,
        }
    }

    /// 빈 결과
    pub fn empty(provenance: Provenance) -> Self {
        Self::from_cases(Vec::new(), false, false, provenance)
    }

    /// 정렬 순서와 `highest_similarity`를 목록 기준으로 맞춘다.
    ///
    /// 서비스가 보고한 값과 다르면 `true`를 반환한다.
    pub fn normalize(&mut self) -> bool {
        sort_ranked(&mut self.similar_cases);
        let computed = max_score(&self.similar_cases);
        let mismatched = (computed - self.highest_similarity).abs() > f64::EPSILON;
        self.highest_similarity = computed;
        mismatched
    }

    /// 최상위 유사 케이스
    pub fn top_case(&self) -> Option<&SimilarCase> {
        self.similar_cases.first()
    }

    /// 합성 데이터인지
    pub fn is_synthetic(&self) -> bool {
        self.provenance == Provenance::Synthetic
    }

    pub fn len(&self) -> usize {
        self.similar_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.similar_cases.is_empty()
    }
}

fn sort_ranked(cases: &mut [SimilarCase]) {
    cases.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
}

fn max_score(cases: &[SimilarCase]) -> f64 {
    cases
        .iter()
        .map(|c| c.similarity_score)
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))))
        .unwrap_or(0.0)
}

/// `POST /recommend_icm` 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub case_title: String,
    pub case_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// 반환할 최대 유사 케이스 수 (1 ~ 20)
    pub top_k: u32,
}

impl RecommendationRequest {
    /// 초안에서 요청 생성 (`top_k`는 1 ~ 20으로 보정)
    pub fn from_draft(draft: &CaseDraft, top_k: u32) -> Self {
        Self {
            case_title: draft.title.clone(),
            case_description: draft.description.clone(),
            product: non_empty(&draft.product),
            error_message: draft.error_message.clone(),
            stack_trace: draft.stack_trace.clone(),
            top_k: top_k.clamp(1, MAX_TOP_K),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::case::CaseId;

    fn similar(id: i64, score: f64) -> SimilarCase {
        SimilarCase {
            case: Case {
                case_id: CaseId::Number(id),
                created_date: chrono::NaiveDateTime::default(),
                modified_date: None,
                details: CaseDraft::new("t", "d", "p", "3", "Low"),
            },
            similarity_score: score,
        }
    }

    #[test]
    fn highest_similarity_is_max_score() {
        let result = RecommendationResult::from_cases(
            vec![similar(1, 0.79), similar(2, 0.87), similar(3, 0.82)],
            true,
            true,
            Provenance::Service,
        );
        assert_eq!(result.highest_similarity, 0.87);
        assert_eq!(result.top_case().unwrap().case.case_id, CaseId::Number(2));

        let scores: Vec<f64> = result
            .similar_cases
            .iter()
            .map(|c| c.similarity_score)
            .collect();
        assert_eq!(scores, vec![0.87, 0.82, 0.79]);
    }

    #[test]
    fn empty_result_has_zero_highest() {
        let result = RecommendationResult::empty(Provenance::Service);
        assert_eq!(result.highest_similarity, 0.0);
        assert!(result.top_case().is_none());
    }

    #[test]
    fn normalize_repairs_service_value() {
        let mut result = RecommendationResult {
            similar_cases: vec![similar(1, 0.4), similar(2, 0.6)],
            alert_threshold_reached: false,
            recommend_icm: false,
            highest_similarity: 0.9,
            icm_statistics: None,
            provenance: Provenance::Service,
        };
        assert!(result.normalize());
        assert_eq!(result.highest_similarity, 0.6);
        assert_eq!(result.similar_cases[0].similarity_score, 0.6);
        assert!(!result.normalize());
    }

    #[test]
    fn request_clamps_top_k() {
        let draft = CaseDraft::new("DB timeout", "...", "", "2", "High");
        let request = RecommendationRequest::from_draft(&draft, 50);
        assert_eq!(request.top_k, MAX_TOP_K);
        assert!(request.product.is_none());

        let request = RecommendationRequest::from_draft(&draft, 0);
        assert_eq!(request.top_k, 1);
    }
}
