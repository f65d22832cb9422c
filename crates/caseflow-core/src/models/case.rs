//! 케이스 모델.
//!
//! 상담원이 작성하는 `CaseDraft`와 Case Store가 저장 후 돌려주는 `Case`.
//! 필드명은 원본 백엔드 스키마(PascalCase)로 직렬화된다.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// 케이스 식별자
///
/// 라이브 백엔드는 정수 ID를, ICM 이력은 `ICM-2024-001234` 같은 문자열 ID를 쓴다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseId::Number(n) => write!(f, "{n}"),
            CaseId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CaseId {
    fn from(value: i64) -> Self {
        CaseId::Number(value)
    }
}

impl From<&str> for CaseId {
    fn from(value: &str) -> Self {
        CaseId::Text(value.to_string())
    }
}

/// 작성 중인 케이스 (폼 입력값)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CaseDraft {
    /// 케이스 제목 (필수)
    #[serde(rename = "CaseTitle")]
    pub title: String,
    /// 케이스 설명 (필수)
    #[serde(rename = "CaseDescription")]
    pub description: String,
    /// 제품 (필수)
    pub product: String,
    /// 심각도 "1"~"4" (필수)
    pub severity: String,
    /// 우선순위 (필수)
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_tier: Option<String>,
    #[serde(
        rename = "SLAImpact",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sla_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_codes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_links_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troubleshooting_steps: Option<String>,
    /// 케이스 상태 (미지정 시 서버가 "Open"으로 저장)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// 쉼표 구분 태그
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl CaseDraft {
    /// 필수 필드만으로 초안 생성
    pub fn new(
        title: &str,
        description: &str,
        product: &str,
        severity: &str,
        priority: &str,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            product: product.to_string(),
            severity: severity.to_string(),
            priority: priority.to_string(),
            ..Default::default()
        }
    }

    /// 유사 케이스 검색에 필요한 필드(제목, 설명) 검증
    pub fn validate_for_search(&self) -> Result<(), CoreError> {
        require("CaseTitle", &self.title)?;
        require("CaseDescription", &self.description)
    }

    /// 케이스 생성에 필요한 필수 필드 전체 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        self.validate_for_search()?;
        require("Product", &self.product)?;
        require("Severity", &self.severity)?;
        require("Priority", &self.priority)
    }

    /// 태그 목록 (공백 제거, 빈 항목 제외)
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "필수 항목이 비어있습니다"));
    }
    Ok(())
}

/// 저장된 케이스 (Case Store가 ID와 생성 시각을 할당)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// 서버 할당 ID
    #[serde(rename = "CaseID")]
    pub case_id: CaseId,
    /// 생성 시각
    #[serde(rename = "CreatedDate", with = "timestamp")]
    pub created_date: NaiveDateTime,
    /// 수정 시각
    #[serde(
        rename = "ModifiedDate",
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_date: Option<NaiveDateTime>,
    /// 케이스 본문
    #[serde(flatten)]
    pub details: CaseDraft,
}

impl Case {
    /// Sev 1/2 케이스인지
    pub fn is_high_severity(&self) -> bool {
        matches!(self.details.severity.trim(), "1" | "2")
    }
}

/// 백엔드 타임스탬프 (타임존 없는 SQL datetime 또는 RFC 3339) 직렬화
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(raw, FORMAT).ok())
            .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("잘못된 시각 형식: {raw}")))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            match raw {
                None => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("잘못된 시각 형식: {raw}"))
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_title_and_description() {
        let draft = CaseDraft::new("", "desc", "SQL", "2", "High");
        let err = draft.validate_for_search().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "CaseTitle"));

        let draft = CaseDraft::new("title", "   ", "SQL", "2", "High");
        let err = draft.validate_for_search().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "CaseDescription"));
    }

    #[test]
    fn validate_requires_product_for_submission() {
        let draft = CaseDraft::new("title", "desc", "", "2", "High");
        assert!(draft.validate_for_search().is_ok());
        assert!(draft.validate().is_err());
    }

    #[test]
    fn case_from_backend_row() {
        let json = r#"{
            "CaseID": 1017,
            "CaseTitle": "DB timeout",
            "CaseDescription": "Queries time out",
            "Product": "Azure SQL Database",
            "Severity": "2",
            "Priority": "High",
            "SLAImpact": "Breached",
            "CaseStatus": "Open",
            "ICMNumber": null,
            "CreatedDate": "2024-03-02T09:15:00.570000"
        }"#;

        let case: Case = serde_json::from_str(json).unwrap();
        assert_eq!(case.case_id, CaseId::Number(1017));
        assert_eq!(case.details.title, "DB timeout");
        assert_eq!(case.details.sla_impact.as_deref(), Some("Breached"));
        assert!(case.modified_date.is_none());
        assert!(case.is_high_severity());
    }

    #[test]
    fn rfc3339_timestamps_are_accepted() {
        let parsed = timestamp::parse("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(parsed.format("%H:%M").to_string(), "10:30");
    }

    #[test]
    fn tag_list_skips_blanks() {
        let mut draft = CaseDraft::new("t", "d", "p", "3", "Low");
        draft.tags = Some("sql, timeout,,performance ".to_string());
        assert_eq!(draft.tag_list(), vec!["sql", "timeout", "performance"]);
    }
}
