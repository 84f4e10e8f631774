//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 패시브 센서 로그에서 정규화된 관측 레코드와, 스토리지에 함께 저장되는
//! 부가 정보 타입을 정의합니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 원시 로그 레코드
///
/// 로그 리더가 내놓는 필드명 → 값 매핑입니다. 스키마는 로그 형식마다 다르며,
/// 정규화 단계에서 한 번 소비되고 버려집니다.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// 정규화된 패시브 관측 레코드
///
/// 하나의 수동 관측 사실(어떤 호스트가 어떤 값을 보였는가)을 나타내는
/// 스토리지 적재 단위입니다. 정규화 단계가 원시 필드를 남김없이 이 형태로
/// 옮기므로, 원시 스키마의 필드명은 여기에 살아남지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 관측 시각 (원시 레코드의 시각 필드에서 치환, 필수)
    pub timestamp: SystemTime,
    /// 수집 센서 식별자 (없을 수 있음)
    pub sensor: Option<String>,
    /// 관측된 네트워크 엔드포인트 (주소 또는 호스트명)
    pub host: String,
    /// 서비스 포트
    pub srvport: Option<u16>,
    /// 관측 분류 태그 (소스 내부 네임스페이스 접두어 제거 후)
    pub recon_type: String,
    /// 관측 출처 (recon_type에 따라 의미가 달라짐)
    pub source: String,
    /// 관측 값
    pub value: String,
    /// 대상 값 (양방향 관측에서 반대편 값)
    pub targetval: Option<String>,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.recon_type, self.host)?;
        if let Some(port) = self.srvport {
            write!(f, ":{port}")?;
        }
        write!(f, " {}={}", self.source, self.value)?;
        if let Some(ref target) = self.targetval {
            write!(f, " -> {target}")?;
        }
        Ok(())
    }
}

/// 관측 레코드에 부착되는 파생 메타데이터
///
/// 커밋 직전 enrichment 단계에서 계산됩니다 (예: DNS 이름의 도메인 체인).
/// key-value 쌍 목록이며 같은 key가 여러 번 나타날 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraInfo {
    /// 파생 필드 (key-value 쌍)
    pub fields: Vec<(String, String)>,
}

impl ExtraInfo {
    /// 빈 부가 정보를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 파생 필드를 추가합니다.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// 필드가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 주어진 key의 모든 값을 순회합니다.
    pub fn values_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
