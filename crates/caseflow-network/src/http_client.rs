//! HTTP REST API 클라이언트.
//!
//! `CaseStore`, `SimilarityService` 포트 구현. 상태 코드별 에러 매핑 + 선택적 재시도.

use async_trait::async_trait;
use caseflow_core::error::CoreError;
use caseflow_core::models::case::{Case, CaseDraft, CaseId};
use caseflow_core::models::health::HealthStatus;
use caseflow_core::models::recommendation::{RecommendationRequest, RecommendationResult};
use caseflow_core::ports::case_store::CaseStore;
use caseflow_core::ports::similarity::SimilarityService;
use std::time::Duration;
use tracing::{debug, warn};

/// 기본 재시도 횟수 (워크플로우는 자동 재시도하지 않음)
const DEFAULT_MAX_RETRIES: u32 = 0;

/// Retry-After 헤더가 없을 때 기본 대기 시간 (초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 재시도 가능한 에러인지 판별
fn is_retryable(error: &CoreError) -> bool {
    matches!(
        error,
        CoreError::Network(_) | CoreError::ServiceUnavailable(_) | CoreError::RateLimit { .. }
    )
}

/// REST API 클라이언트 — `CaseStore` + `SimilarityService` 포트 구현
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpApiClient {
    /// 새 HTTP API 클라이언트 생성
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// 재시도 횟수 설정
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 서버 상태 확인 (`GET /health`)
    pub async fn health(&self) -> Result<HealthStatus, CoreError> {
        debug!("헬스 체크 요청");

        let resp = self
            .request(reqwest::Method::GET, "/health")
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("헬스 체크 요청 실패: {e}")))?;

        let resp = self.check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| CoreError::Internal(format!("헬스 체크 응답 파싱 실패: {e}")))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            404 => Err(CoreError::NotFound {
                resource_type: "API".to_string(),
                id: text,
            }),
            429 => Err(CoreError::RateLimit {
                retry_after_secs: retry_after,
            }),
            503 => Err(CoreError::ServiceUnavailable(text)),
            _ => Err(CoreError::Internal(format!("API 에러 ({status}): {text}"))),
        }
    }

    /// 재시도가 포함된 요청 실행
    ///
    /// exponential backoff: 1s → 2s → 4s
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut delay = Duration::from_secs(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable(&e) || attempt >= self.max_retries {
                        return Err(e);
                    }

                    warn!(
                        "요청 실패 (시도 {}/{}): {e}, {delay:?} 후 재시도",
                        attempt + 1,
                        self.max_retries + 1
                    );

                    // RateLimit의 경우 서버 지정 대기 시간 사용
                    if let CoreError::RateLimit { retry_after_secs } = &e {
                        delay = Duration::from_secs(*retry_after_secs);
                    }

                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_secs(30));
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl SimilarityService for HttpApiClient {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, CoreError> {
        debug!(
            "유사 케이스 검색 요청: title={}, top_k={}",
            request.case_title, request.top_k
        );

        self.execute_with_retry(|| async {
            let resp = self
                .request(reqwest::Method::POST, "/recommend_icm")
                .json(request)
                .send()
                .await
                .map_err(|e| CoreError::Network(format!("추천 요청 실패: {e}")))?;

            let resp = self.check_response(resp).await?;
            let mut result: RecommendationResult = resp
                .json()
                .await
                .map_err(|e| CoreError::Internal(format!("추천 응답 파싱 실패: {e}")))?;

            if result.normalize() {
                warn!("서버 highest_similarity가 목록 최고 점수와 달라 보정함");
            }

            debug!(
                "유사 케이스 {}건 수신 (최고 {:.3}, ICM 권고={})",
                result.len(),
                result.highest_similarity,
                result.recommend_icm
            );
            Ok(result)
        })
        .await
    }
}

#[async_trait]
impl CaseStore for HttpApiClient {
    /// 케이스 생성 (`POST /create_case`)
    ///
    /// 서버가 이미 케이스를 만들었을 수 있으므로 `max_retries`와 무관하게 재시도하지 않는다.
    async fn create(&self, draft: &CaseDraft) -> Result<Case, CoreError> {
        debug!("케이스 생성 요청: {}", draft.title);

        let resp = self
            .request(reqwest::Method::POST, "/create_case")
            .json(draft)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("케이스 생성 요청 실패: {e}")))?;

        let resp = self.check_response(resp).await?;
        let case: Case = resp
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("케이스 응답 파싱 실패: {e}")))?;

        debug!("케이스 생성 성공: #{}", case.case_id);
        Ok(case)
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Case>, CoreError> {
        debug!("케이스 목록 요청: limit={limit}, offset={offset}");

        self.execute_with_retry(|| async {
            let resp = self
                .request(reqwest::Method::GET, "/cases")
                .query(&[("limit", limit), ("offset", offset)])
                .send()
                .await
                .map_err(|e| CoreError::Network(format!("케이스 목록 요청 실패: {e}")))?;

            let resp = self.check_response(resp).await?;
            resp.json()
                .await
                .map_err(|e| CoreError::Internal(format!("케이스 목록 파싱 실패: {e}")))
        })
        .await
    }

    async fn get(&self, case_id: &CaseId) -> Result<Case, CoreError> {
        debug!("케이스 조회 요청: #{case_id}");

        self.execute_with_retry(|| async {
            let path = format!("/cases/{case_id}");
            let resp = self
                .request(reqwest::Method::GET, &path)
                .send()
                .await
                .map_err(|e| CoreError::Network(format!("케이스 조회 요청 실패: {e}")))?;

            let resp = match self.check_response(resp).await {
                Err(CoreError::NotFound { .. }) => {
                    return Err(CoreError::NotFound {
                        resource_type: "Case".to_string(),
                        id: case_id.to_string(),
                    })
                }
                other => other?,
            };

            resp.json()
                .await
                .map_err(|e| CoreError::Internal(format!("케이스 응답 파싱 실패: {e}")))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE_JSON: &str = r#"{
        "CaseID": 1017,
        "CaseTitle": "DB timeout",
        "CaseDescription": "Queries time out after deployment",
        "Product": "Azure SQL Database",
        "Severity": "2",
        "Priority": "High",
        "CaseStatus": "Open",
        "CreatedDate": "2024-03-02T09:15:00.570000"
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> HttpApiClient {
        HttpApiClient::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn http_client_creation() {
        let client =
            HttpApiClient::new("http://localhost:8000/", Duration::from_secs(30)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn with_max_retries() {
        let client = HttpApiClient::new("http://localhost:8000", Duration::from_secs(30))
            .unwrap()
            .with_max_retries(3);
        assert_eq!(client.max_retries, 3);
    }

    #[test]
    fn is_retryable_errors() {
        assert!(is_retryable(&CoreError::Network("test".to_string())));
        assert!(is_retryable(&CoreError::ServiceUnavailable(
            "test".to_string()
        )));
        assert!(is_retryable(&CoreError::RateLimit {
            retry_after_secs: 60
        }));
        assert!(!is_retryable(&CoreError::Internal("test".to_string())));
        assert!(!is_retryable(&CoreError::validation("title", "empty")));
    }

    #[tokio::test]
    async fn recommend_success() {
        let mut server = mockito::Server::new_async().await;
        let body = format!(
            r#"{{
                "similar_cases": [{{ "case": {CASE_JSON}, "similarity_score": 0.83 }}],
                "alert_threshold_reached": true,
                "recommend_icm": true,
                "highest_similarity": 0.83
            }}"#
        );
        let mock = server
            .mock("POST", "/recommend_icm")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "case_title": "DB timeout",
                "top_k": 5
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = client_for(&server);
        let draft = CaseDraft::new("DB timeout", "...", "Azure SQL Database", "2", "High");
        let request = RecommendationRequest::from_draft(&draft, 5);

        let result = client.recommend(&request).await.unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.recommend_icm);
        assert!(!result.is_synthetic());
        assert_eq!(result.top_case().unwrap().case.case_id, CaseId::Number(1017));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn recommend_server_error_is_distinguishable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/recommend_icm")
            .with_status(500)
            .with_body(r#"{"detail":"Failed to generate recommendations: model not loaded"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let draft = CaseDraft::new("DB timeout", "...", "", "2", "High");
        let err = client
            .recommend(&RecommendationRequest::from_draft(&draft, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Internal(_)));
        assert!(err.is_service_failure());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn service_unavailable_not_retried_by_default() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/create_case")
            .with_status(503)
            .with_body("maintenance")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let draft = CaseDraft::new("DB timeout", "...", "SQL", "2", "High");
        let err = client.create(&draft).await.unwrap_err();

        assert!(matches!(err, CoreError::ServiceUnavailable(ref body) if body == "maintenance"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/cases")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.list(10, 0).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::RateLimit {
                retry_after_secs: 7
            }
        ));
    }

    #[tokio::test]
    async fn create_case_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/create_case")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "CaseTitle": "DB timeout",
                "Severity": "2"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CASE_JSON)
            .create_async()
            .await;

        let client = client_for(&server);
        let draft = CaseDraft::new(
            "DB timeout",
            "Queries time out after deployment",
            "Azure SQL Database",
            "2",
            "High",
        );
        let case = client.create(&draft).await.unwrap();

        assert_eq!(case.case_id.to_string(), "1017");
        assert_eq!(case.details.title, "DB timeout");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_case_is_never_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/create_case")
            .with_status(503)
            .with_body("gateway timeout")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server).with_max_retries(2);
        let draft = CaseDraft::new("DB timeout", "...", "SQL", "2", "High");
        let err = client.create(&draft).await.unwrap_err();

        assert!(matches!(err, CoreError::ServiceUnavailable(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_cases_with_pagination() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cases")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("limit".into(), "20".into()),
                mockito::Matcher::UrlEncoded("offset".into(), "40".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{CASE_JSON}]"))
            .create_async()
            .await;

        let client = client_for(&server);
        let cases = client.list(20, 40).await.unwrap();
        assert_eq!(cases.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_missing_case_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/cases/999")
            .with_status(404)
            .with_body(r#"{"detail":"Case not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get(&CaseId::Number(999)).await.unwrap_err();
        match err {
            CoreError::NotFound { resource_type, id } => {
                assert_eq!(resource_type, "Case");
                assert_eq!(id, "999");
            }
            other => panic!("NotFound 예상, 실제: {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_check() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"healthy","timestamp":"2024-03-02T09:15:00.570000","database":"connected","model_loaded":true}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let health = client.health().await.unwrap();
        assert!(health.is_ready());
    }

    #[tokio::test]
    async fn connection_refused_maps_to_network_error() {
        let client =
            HttpApiClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = client.list(1, 0).await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
    }
}
