//! 적재 파이프라인 에러 타입
//!
//! [`IngestError`]는 적재 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<IngestError> for ReconbaseError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! # 에러 범위 규약
//!
//! - 파일 단위 ([`MissingFile`](IngestError::MissingFile),
//!   [`UnsupportedFormat`](IngestError::UnsupportedFormat),
//!   [`Header`](IngestError::Header)): 해당 파일을 건너뛰고 다음 파일 진행
//! - 레코드 단위 ([`MalformedRecord`](IngestError::MalformedRecord),
//!   [`Enrichment`](IngestError::Enrichment)): 해당 레코드만 건너뛰고 스트림 계속
//! - [`Commit`](IngestError::Commit): 스토리지가 배치를 거부한 경우, 호출자에게 그대로 노출

use reconbase_core::error::{PipelineError, ReconbaseError, StorageError};

/// 적재 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 로그 파일이 존재하지 않음
    #[error("log file not found: {path}")]
    MissingFile {
        /// 주어진 로그 파일 경로
        path: String,
    },

    /// 등록된 정규화기가 없는 로그 형식
    #[error("unsupported log format: {format}")]
    UnsupportedFormat {
        /// 로그 파일의 형식 식별자
        format: String,
    },

    /// 로그 헤더 파싱 실패 (지시어 누락, 잘못된 separator 등)
    #[error("log header error: {path}: {reason}")]
    Header {
        /// 로그 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 형식에 맞지 않는 레코드 (필수 시각 필드 누락 등)
    #[error("malformed record: {reason}")]
    MalformedRecord {
        /// 실패 사유
        reason: String,
    },

    /// 부가 정보 계산 실패
    #[error("enrichment failed for {host}: {reason}")]
    Enrichment {
        /// 대상 레코드의 호스트
        host: String,
        /// 실패 사유
        reason: String,
    },

    /// 스토리지 커밋 실패
    #[error("commit failed: {reason}")]
    Commit {
        /// 스토리지가 보고한 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestError> for ReconbaseError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Commit { reason } => {
                ReconbaseError::Storage(StorageError::Commit(reason))
            }
            other => ReconbaseError::Pipeline(PipelineError::Ingest(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_display() {
        let err = IngestError::MissingFile {
            path: "/var/log/zeek/passiverecon.log".to_owned(),
        };
        assert!(err.to_string().contains("passiverecon.log"));
    }

    #[test]
    fn malformed_record_display() {
        let err = IngestError::MalformedRecord {
            reason: "missing required time field 'ts'".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("malformed record"));
        assert!(msg.contains("'ts'"));
    }

    #[test]
    fn commit_error_converts_to_storage_error() {
        let err = IngestError::Commit {
            reason: "batch rejected".to_owned(),
        };
        let top: ReconbaseError = err.into();
        assert!(matches!(top, ReconbaseError::Storage(_)));
        assert!(top.to_string().contains("batch rejected"));
    }

    #[test]
    fn other_errors_convert_to_pipeline_error() {
        let err = IngestError::UnsupportedFormat {
            format: "conn".to_owned(),
        };
        let top: ReconbaseError = err.into();
        assert!(matches!(top, ReconbaseError::Pipeline(_)));
    }
}
