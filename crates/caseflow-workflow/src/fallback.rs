//! 대체 데이터 제공자.
//!
//! 백엔드 없이 데모를 진행할 수 있도록 고정된 합성 추천 결과를 만든다.
//! 결과에는 `Provenance::Synthetic`이 붙어 실제 서비스 응답과 구분된다.

use caseflow_core::models::case::{timestamp, Case, CaseDraft, CaseId};
use caseflow_core::models::recommendation::{Provenance, RecommendationResult, SimilarCase};

use crate::policy;

/// 합성 ICM 이력 한 건
struct SyntheticIncident {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    severity: &'static str,
    priority: &'static str,
    status: &'static str,
    created: &'static str,
    error_message: &'static str,
    resolution: Option<&'static str>,
    tags: &'static str,
    score: f64,
}

const INCIDENTS: [SyntheticIncident; 3] = [
    SyntheticIncident {
        id: "ICM-2024-001234",
        title: "Azure SQL Database Connection Timeout Issues",
        description: "Multiple users experiencing connection timeouts when accessing Azure SQL Database. \
                      Issue started after recent deployment. Error occurs consistently during peak hours.",
        severity: "2",
        priority: "High",
        status: "Active",
        created: "2024-01-15T10:30:00Z",
        error_message: "Connection timeout",
        resolution: None,
        tags: "sql,timeout,performance",
        score: 0.87,
    },
    SyntheticIncident {
        id: "ICM-2024-001156",
        title: "Database Performance Degradation in Production",
        description: "Significant slowdown in database queries affecting application performance. \
                      CPU usage at 95%. Query execution time increased by 300%.",
        severity: "2",
        priority: "High",
        status: "Resolved",
        created: "2024-01-10T08:15:00Z",
        error_message: "Query timeout",
        resolution: Some("Performance restored after index maintenance"),
        tags: "sql,performance,database",
        score: 0.82,
    },
    SyntheticIncident {
        id: "ICM-2024-000987",
        title: "Azure SQL High CPU Usage Alert",
        description: "Database experiencing sustained high CPU utilization. \
                      Multiple blocking queries detected. Application response time degraded.",
        severity: "3",
        priority: "Medium",
        status: "Resolved",
        created: "2024-01-05T14:20:00Z",
        error_message: "High CPU",
        resolution: Some("Optimized problematic queries"),
        tags: "sql,cpu,performance",
        score: 0.79,
    },
];

impl SyntheticIncident {
    fn to_similar_case(&self) -> SimilarCase {
        let mut details = CaseDraft::new(
            self.title,
            self.description,
            "Azure SQL Database",
            self.severity,
            self.priority,
        );
        details.case_status = Some(self.status.to_string());
        details.error_message = Some(self.error_message.to_string());
        details.region = Some("East US".to_string());
        details.customer_tier = Some("Enterprise".to_string());
        details.resolution_notes = self.resolution.map(str::to_string);
        details.tags = Some(self.tags.to_string());

        SimilarCase {
            case: Case {
                case_id: CaseId::from(self.id),
                created_date: timestamp::parse(self.created).unwrap_or_default(),
                modified_date: None,
                details,
            },
            similarity_score: self.score,
        }
    }
}

/// 합성 추천 결과 제공자
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProvider;

impl FallbackProvider {
    pub fn new() -> Self {
        Self
    }

    /// 고정된 합성 추천 결과 (항상 동일)
    ///
    /// 경보/권고 플래그는 서비스와 같은 임계값으로 점수에서 계산한다.
    pub fn recommendation(&self) -> RecommendationResult {
        let cases: Vec<SimilarCase> = INCIDENTS.iter().map(|i| i.to_similar_case()).collect();
        let scores: Vec<f64> = cases.iter().map(|c| c.similarity_score).collect();
        let analysis = policy::analyze(&scores);

        RecommendationResult::from_cases(
            cases,
            analysis.alert,
            analysis.recommend_icm,
            Provenance::Synthetic,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_result_shape() {
        let result = FallbackProvider::new().recommendation();

        let scores: Vec<f64> = result
            .similar_cases
            .iter()
            .map(|c| c.similarity_score)
            .collect();
        assert_eq!(scores, vec![0.87, 0.82, 0.79]);
        assert_eq!(result.highest_similarity, 0.87);
        assert!(result.alert_threshold_reached);
        assert!(result.recommend_icm);
        assert!(result.icm_statistics.is_none());
    }

    #[test]
    fn synthetic_result_is_tagged() {
        let result = FallbackProvider::new().recommendation();
        assert!(result.is_synthetic());
        assert_eq!(result.provenance, Provenance::Synthetic);
    }

    #[test]
    fn synthetic_result_is_deterministic() {
        let provider = FallbackProvider::new();
        assert_eq!(provider.recommendation(), provider.recommendation());
    }

    #[test]
    fn top_incident_is_sev2_timeout() {
        let result = FallbackProvider::new().recommendation();
        let top = &result.top_case().unwrap().case;
        assert_eq!(top.case_id.to_string(), "ICM-2024-001234");
        assert!(top.is_high_severity());
        assert_eq!(top.created_date.format("%Y-%m-%d").to_string(), "2024-01-15");
    }
}
