//! 설정 관리 — reconbase.toml 파싱 및 런타임 설정
//!
//! [`ReconbaseConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`RECONBASE_INGEST_SENSOR=gw0` 형식)
//! 3. 설정 파일 (`reconbase.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), reconbase_core::error::ReconbaseError> {
//! use reconbase_core::config::ReconbaseConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ReconbaseConfig::load("reconbase.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ReconbaseConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ReconbaseError};
use crate::pipeline::CommitMode;

/// Reconbase 통합 설정
///
/// `reconbase.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconbaseConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 적재 파이프라인 설정
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl ReconbaseConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ReconbaseError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ReconbaseError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReconbaseError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ReconbaseError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ReconbaseError> {
        toml::from_str(toml_str).map_err(|e| {
            ReconbaseError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `RECONBASE_{SECTION}_{FIELD}`
    /// 예: `RECONBASE_INGEST_BATCH_SIZE=500`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "RECONBASE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "RECONBASE_GENERAL_LOG_FORMAT");

        // Ingest
        override_opt_string(&mut self.ingest.sensor, "RECONBASE_INGEST_SENSOR");
        override_opt_string(&mut self.ingest.ignore_rules, "RECONBASE_INGEST_IGNORE_RULES");
        override_usize(&mut self.ingest.batch_size, "RECONBASE_INGEST_BATCH_SIZE");
        override_mode(&mut self.ingest.mode, "RECONBASE_INGEST_MODE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ReconbaseError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // batch_size 검증
        if self.ingest.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.batch_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        // sensor 검증: 와일드카드 키는 무시 규칙 전용으로 예약
        if let Some(ref sensor) = self.ingest.sensor
            && (sensor.is_empty() || sensor == "*")
        {
            return Err(ConfigError::InvalidValue {
                field: "ingest.sensor".to_owned(),
                reason: "must not be empty or the reserved wildcard '*'".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 적재 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 기본 센서 이름 (CLI 인자로 오버라이드 가능)
    pub sensor: Option<String>,
    /// 무시 규칙 파일 경로 (없으면 아무것도 거르지 않음)
    pub ignore_rules: Option<String>,
    /// 벌크 커밋 배치 크기
    pub batch_size: usize,
    /// 커밋 모드 (bulk, per-record)
    pub mode: CommitMode,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sensor: None,
            ignore_rules: None,
            batch_size: 1000,
            mode: CommitMode::Bulk,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = Some(val);
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_mode(target: &mut CommitMode, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.as_str() {
            "bulk" => *target = CommitMode::Bulk,
            "per-record" => *target = CommitMode::PerRecord,
            _ => warn!(
                env_key,
                value = val.as_str(),
                "unknown commit mode in env var, ignoring"
            ),
        }
    }
}
