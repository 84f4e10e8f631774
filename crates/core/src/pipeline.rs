//! 파이프라인 trait — 모듈 확장 포인트 정의

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReconbaseError;
use crate::types::{ExtraInfo, Observation};

/// 커밋 모드
///
/// 동작 차이가 아니라 성능/호환성 스위치입니다. 같은 입력 시퀀스에 대해
/// 두 모드는 동일한 최종 저장 상태를 만들어야 합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitMode {
    /// 배치 단위 벌크 삽입 (기본값, 처리량 우선)
    #[default]
    Bulk,
    /// 행 단위 삽입 (벌크 시맨틱을 지원하지 않는 스토리지용)
    PerRecord,
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bulk => write!(f, "bulk"),
            Self::PerRecord => write!(f, "per-record"),
        }
    }
}

/// 패시브 관측 스토리지 trait
///
/// 새로운 스토리지 백엔드를 추가하려면 이 trait을 구현합니다.
/// 자연 키(natural key)의 정의와 중복 병합 방식은 스토리지 구현이 소유합니다 —
/// 같은 키의 레코드는 로그 라인마다 중복 삽입되는 대신 하나로 병합되어야 합니다.
pub trait PassiveSink {
    /// 스토리지 이름 (진단용)
    fn name(&self) -> &str;

    /// 관측 레코드 한 건을 삽입하거나 기존 레코드에 병합합니다.
    fn insert_or_update(
        &mut self,
        observation: Observation,
        extra: Option<ExtraInfo>,
    ) -> Result<(), ReconbaseError>;

    /// 배치를 삽입하거나 병합합니다.
    ///
    /// 기본 구현은 행 단위 삽입으로 폴백합니다. 벌크 삽입을 지원하는
    /// 스토리지는 이 메서드를 오버라이드하여 배치 내 중복을 먼저 병합한 뒤
    /// 키당 한 번만 쓰도록 최적화합니다.
    fn insert_or_update_bulk(
        &mut self,
        batch: Vec<(Observation, Option<ExtraInfo>)>,
    ) -> Result<(), ReconbaseError> {
        for (observation, extra) in batch {
            self.insert_or_update(observation, extra)?;
        }
        Ok(())
    }
}
