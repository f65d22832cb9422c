//! # caseflow-workflow
//!
//! 케이스 작성 → ICM 에스컬레이션 결정 워크플로우.
//! 유사 케이스 추천 결과를 임계값 정책으로 해석하고,
//! 권고 모달/에스컬레이션 전환과 토스트 알림을 관리한다.
//! 백엔드 없이 데모할 수 있도록 합성 추천 데이터를 제공한다.

pub mod controller;
pub mod error;
pub mod escalation;
pub mod fallback;
pub mod notification;
pub mod policy;
pub mod presenter;
pub mod state;
