//! `passiverecon` 로그 정규화기
//!
//! 센서가 내놓는 관측 분류 태그는 `PassiveRecon::HTTP_CLIENT_HEADER` 같은
//! 내부 네임스페이스 접두어를 달고 나옵니다. 정규화 단계에서 접두어를 떼고
//! 접미어만 보존합니다. 시각 필드 `ts`는 필수이며, 없거나 숫자가 아니면
//! 해당 레코드는 레코드 단위 오류로 버려집니다.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

use reconbase_core::types::{Observation, RawRecord};

use crate::error::IngestError;
use crate::normalize::LogNormalizer;

/// 관측 분류 태그의 네임스페이스 접두어
const RECON_TYPE_PREFIX: &str = "PassiveRecon::";

/// `passiverecon` 형식 정규화기
///
/// 원시 레코드 하나가 관측 레코드 하나가 됩니다. 원시 스키마의 필드명은
/// 정규화 이후 살아남지 않습니다 (`uid` 등 매핑되지 않는 필드는 버려짐).
pub struct PassiveReconNormalizer;

impl LogNormalizer for PassiveReconNormalizer {
    fn format_name(&self) -> &'static str {
        "passiverecon"
    }

    fn normalize(&self, record: RawRecord) -> Result<Vec<Observation>, IngestError> {
        let timestamp = parse_timestamp(&record)?;
        let host = required_string(&record, "host")?;
        let recon_type = required_string(&record, "recon_type")?;
        let recon_type = recon_type
            .strip_prefix(RECON_TYPE_PREFIX)
            .unwrap_or(&recon_type)
            .to_owned();
        // source/value는 Zeek unset 마커(`-`)로 비어 나올 수 있는 페이로드
        // 컬럼이므로 없으면 빈 문자열로 통과시킵니다.
        let source = optional_string(&record, "source").unwrap_or_default();
        let value = optional_string(&record, "value").unwrap_or_default();
        let targetval = optional_string(&record, "targetval");
        let srvport = parse_srvport(&record)?;

        Ok(vec![Observation {
            timestamp,
            // 센서는 파이프라인이 주입
            sensor: None,
            host,
            srvport,
            recon_type,
            source,
            value,
            targetval,
        }])
    }
}

fn parse_timestamp(record: &RawRecord) -> Result<SystemTime, IngestError> {
    let ts = record
        .get("ts")
        .and_then(Value::as_f64)
        .ok_or_else(|| IngestError::MalformedRecord {
            reason: "missing or non-numeric time field 'ts'".to_owned(),
        })?;
    if !ts.is_finite() || ts < 0.0 {
        return Err(IngestError::MalformedRecord {
            reason: format!("time field 'ts' out of range: {ts}"),
        });
    }
    Ok(UNIX_EPOCH + Duration::from_secs_f64(ts))
}

fn parse_srvport(record: &RawRecord) -> Result<Option<u16>, IngestError> {
    match record.get("srvport") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let port = value
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(|| IngestError::MalformedRecord {
                    reason: format!("invalid port field 'srvport': {value}"),
                })?;
            Ok(Some(port))
        }
    }
}

fn required_string(record: &RawRecord, field: &str) -> Result<String, IngestError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| IngestError::MalformedRecord {
            reason: format!("missing required field '{field}'"),
        })
}

fn optional_string(record: &RawRecord, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_owned)
}
