//! Case Store 포트.
//!
//! 구현: `caseflow-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::case::{Case, CaseDraft, CaseId};

/// 케이스 저장소 인터페이스
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// 케이스 생성
    ///
    /// 서버가 ID와 생성 시각을 할당한 `Case`를 반환한다.
    async fn create(&self, draft: &CaseDraft) -> Result<Case, CoreError>;

    /// 최신순 케이스 목록
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Case>, CoreError>;

    /// 단일 케이스 조회
    async fn get(&self, case_id: &CaseId) -> Result<Case, CoreError>;
}
