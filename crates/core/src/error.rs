//! 에러 타입 — 도메인별 에러 정의

/// Reconbase 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ReconbaseError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
///
/// 설정 에러는 항상 치명적입니다. 적재가 시작되기 전에 프로세스를 중단시킵니다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 적재 단계 에러 (파일/레코드 단위 에러가 상위로 전파된 경우)
    #[error("ingest failed: {0}")]
    Ingest(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 단건 삽입/갱신 실패
    #[error("insert failed: {0}")]
    Insert(String),

    /// 배치 커밋 실패
    #[error("commit failed: {0}")]
    Commit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound {
            path: "/etc/reconbase/reconbase.toml".to_owned(),
        };
        assert!(err.to_string().contains("reconbase.toml"));
    }

    #[test]
    fn config_error_wraps_into_top_level() {
        let err: ReconbaseError = ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }
        .into();
        assert!(matches!(err, ReconbaseError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn storage_error_display() {
        let err: ReconbaseError = StorageError::Commit("connection reset".to_owned()).into();
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn io_error_wraps_into_top_level() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReconbaseError = io_err.into();
        assert!(matches!(err, ReconbaseError::Io(_)));
    }
}
