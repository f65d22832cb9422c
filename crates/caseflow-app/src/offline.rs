//! 오프라인(데모) 어댑터.
//!
//! 백엔드 없이 워크플로우를 돌리기 위한 프로세스 내 `SimilarityService` / `CaseStore` 구현.

use async_trait::async_trait;
use caseflow_core::error::CoreError;
use caseflow_core::models::case::{Case, CaseDraft, CaseId};
use caseflow_core::models::recommendation::{RecommendationRequest, RecommendationResult};
use caseflow_core::ports::case_store::CaseStore;
use caseflow_core::ports::similarity::SimilarityService;
use caseflow_workflow::fallback::FallbackProvider;
use parking_lot::RwLock;
use tracing::debug;

/// 합성 데이터를 돌려주는 추천 서비스
#[derive(Debug, Default)]
pub struct OfflineSimilarity {
    provider: FallbackProvider,
}

impl OfflineSimilarity {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SimilarityService for OfflineSimilarity {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, CoreError> {
        debug!("오프라인 추천: {}", request.case_title);
        let mut result = self.provider.recommendation();
        result
            .similar_cases
            .truncate(usize::try_from(request.top_k).unwrap_or(usize::MAX));
        result.normalize();
        Ok(result)
    }
}

/// 메모리 케이스 저장소 (ID 1부터 순차 할당)
#[derive(Debug, Default)]
pub struct MemoryCaseStore {
    cases: RwLock<Vec<Case>>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn create(&self, draft: &CaseDraft) -> Result<Case, CoreError> {
        draft.validate()?;

        let mut cases = self.cases.write();
        let id = i64::try_from(cases.len()).unwrap_or(i64::MAX - 1) + 1;
        let case = Case {
            case_id: CaseId::Number(id),
            created_date: chrono::Utc::now().naive_utc(),
            modified_date: None,
            details: draft.clone(),
        };
        cases.push(case.clone());
        debug!("메모리 케이스 생성: #{id}");
        Ok(case)
    }

    /// 최신순 목록
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Case>, CoreError> {
        let cases = self.cases.read();
        Ok(cases
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, case_id: &CaseId) -> Result<Case, CoreError> {
        self.cases
            .read()
            .iter()
            .find(|c| &c.case_id == case_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                resource_type: "Case".to_string(),
                id: case_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_core::models::recommendation::Provenance;

    fn draft(title: &str) -> CaseDraft {
        CaseDraft::new(title, "Connections drop", "Azure SQL Database", "2", "High")
    }

    #[tokio::test]
    async fn offline_similarity_respects_top_k() {
        let service = OfflineSimilarity::new();
        let request = RecommendationRequest::from_draft(&draft("DB timeout"), 2);

        let result = service.recommend(&request).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.highest_similarity, 0.87);
        assert_eq!(result.provenance, Provenance::Synthetic);
        assert!(result.recommend_icm);
    }

    #[tokio::test]
    async fn memory_store_assigns_ids_and_lists_newest_first() {
        let store = MemoryCaseStore::new();
        let first = store.create(&draft("first")).await.unwrap();
        let second = store.create(&draft("second")).await.unwrap();

        assert_eq!(first.case_id, CaseId::Number(1));
        assert_eq!(second.case_id, CaseId::Number(2));

        let listed = store.list(10, 0).await.unwrap();
        assert_eq!(listed[0].details.title, "second");
        assert_eq!(store.list(10, 1).await.unwrap().len(), 1);
        assert_eq!(store.get(&CaseId::Number(1)).await.unwrap(), first);
    }

    #[tokio::test]
    async fn memory_store_rejects_incomplete_draft_and_unknown_id() {
        let store = MemoryCaseStore::new();
        let mut incomplete = draft("x");
        incomplete.severity.clear();

        assert!(matches!(
            store.create(&incomplete).await,
            Err(CoreError::Validation { .. })
        ));
        assert!(store.list(10, 0).await.unwrap().is_empty());
        assert!(matches!(
            store.get(&CaseId::Number(9)).await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
