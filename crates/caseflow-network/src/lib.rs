//! # caseflow-network
//!
//! 백엔드 REST API 어댑터.
//! `CaseStore`, `SimilarityService` 포트를 reqwest로 구현한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use caseflow_network::http_client::HttpApiClient;
//!
//! let client = HttpApiClient::new("http://localhost:8000", Duration::from_secs(30))?;
//! let health = client.health().await?;
//! ```

pub mod http_client;
