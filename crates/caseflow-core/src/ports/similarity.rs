//! Similarity Service 포트.
//!
//! 구현: `caseflow-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::recommendation::{RecommendationRequest, RecommendationResult};

/// 유사 케이스 검색 인터페이스
#[async_trait]
pub trait SimilarityService: Send + Sync {
    /// 초안과 유사한 과거 케이스 검색 및 ICM 권고 판정
    ///
    /// 실패 시 잘못된 결과 대신 구분 가능한 `CoreError`를 반환해야 한다.
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, CoreError>;
}
