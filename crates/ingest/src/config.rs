//! 적재 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`IngestConfig`](reconbase_core::config::IngestConfig)를
//! 기반으로 파이프라인 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```
//! use reconbase_core::config::ReconbaseConfig;
//! use reconbase_ingest::config::PipelineConfig;
//!
//! let core_config = ReconbaseConfig::default();
//! let config = PipelineConfig::from_core(&core_config.ingest);
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use reconbase_core::error::ConfigError;
use reconbase_core::pipeline::CommitMode;

/// 적재 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 센서 이름 (모든 정규화 레코드에 실리고 무시 규칙 조회 키가 됨)
    pub sensor: Option<String>,
    /// 무시 규칙 파일 경로 (없으면 아무것도 거르지 않음)
    pub ignore_rules: Option<PathBuf>,
    /// 벌크 커밋 배치 크기
    pub batch_size: usize,
    /// 커밋 모드
    pub mode: CommitMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sensor: None,
            ignore_rules: None,
            batch_size: 1000,
            mode: CommitMode::Bulk,
        }
    }
}

impl PipelineConfig {
    /// core의 `IngestConfig`에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &reconbase_core::config::IngestConfig) -> Self {
        Self {
            sensor: core.sensor.clone(),
            ignore_rules: core.ignore_rules.as_ref().map(PathBuf::from),
            batch_size: core.batch_size,
            mode: core.mode,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.batch_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        if let Some(ref sensor) = self.sensor
            && (sensor.is_empty() || sensor == "*")
        {
            return Err(ConfigError::InvalidValue {
                field: "ingest.sensor".to_owned(),
                reason: "must not be empty or the reserved wildcard '*'".to_owned(),
            });
        }
        Ok(())
    }
}
