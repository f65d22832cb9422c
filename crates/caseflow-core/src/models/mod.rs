//! caseflow 도메인 모델.
//!
//! Case Store / Similarity Service와 주고받는 데이터 구조체를 정의한다.
//! 와이어 포맷은 원본 백엔드 REST API와 호환된다.

pub mod case;
pub mod health;
pub mod notification;
pub mod recommendation;
