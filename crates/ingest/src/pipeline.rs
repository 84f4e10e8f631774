//! 관측 스트림 — 원시 레코드 → 정규화 → 무시 규칙 필터
//!
//! [`ObservationStream`]은 pull 기반 단일 패스 스트림입니다. 소비자가
//! `next()`를 호출할 때마다 필요한 만큼만 원시 레코드를 읽으므로 전체
//! 입력이 메모리에 머무르지 않습니다. 한 번 소비되면 재시작할 수 없습니다.
//!
//! 레코드 단위 오류(형식 불일치)는 경고 로그와 함께 건너뛰고 스트림은
//! 계속됩니다. 파일 단위 오류는 스트림 생성 시점에 반환됩니다.

use std::collections::VecDeque;

use metrics::counter;
use tracing::{trace, warn};

use reconbase_core::metrics::{
    INGEST_RECORDS_IGNORED_TOTAL, INGEST_RECORDS_MALFORMED_TOTAL, INGEST_RECORDS_NORMALIZED_TOTAL,
    INGEST_RECORDS_READ_TOTAL,
};
use reconbase_core::types::{Observation, RawRecord};

use crate::error::IngestError;
use crate::ignore::IgnoreRules;
use crate::normalize::{LogNormalizer, NormalizerRegistry};
use crate::reader::ZeekLogFile;

/// 정규화된 관측 레코드 스트림
pub struct ObservationStream<'a, I> {
    records: I,
    normalizer: &'a dyn LogNormalizer,
    rules: &'a IgnoreRules,
    sensor: Option<String>,
    // 원시 레코드 하나가 여러 관측이 될 때의 대기열
    pending: VecDeque<Observation>,
}

impl<'a, I> ObservationStream<'a, I>
where
    I: Iterator<Item = Result<RawRecord, IngestError>>,
{
    /// 원시 레코드 Iterator 위에 스트림을 구성합니다.
    pub fn new(
        records: I,
        normalizer: &'a dyn LogNormalizer,
        rules: &'a IgnoreRules,
        sensor: Option<String>,
    ) -> Self {
        Self {
            records,
            normalizer,
            rules,
            sensor,
            pending: VecDeque::new(),
        }
    }
}

impl<'a> ObservationStream<'a, ZeekLogFile> {
    /// 열린 Zeek 로그 파일 위에 스트림을 구성합니다.
    ///
    /// 로그의 형식 식별자에 해당하는 정규화기가 레지스트리에 없으면
    /// [`IngestError::UnsupportedFormat`]을 반환합니다 (파일 단위 오류).
    pub fn from_log(
        log: ZeekLogFile,
        registry: &'a NormalizerRegistry,
        rules: &'a IgnoreRules,
        sensor: Option<String>,
    ) -> Result<Self, IngestError> {
        let normalizer =
            registry
                .get(log.path())
                .ok_or_else(|| IngestError::UnsupportedFormat {
                    format: log.path().to_owned(),
                })?;
        Ok(Self::new(log, normalizer, rules, sensor))
    }
}

impl<I> Iterator for ObservationStream<'_, I>
where
    I: Iterator<Item = Result<RawRecord, IngestError>>,
{
    type Item = Observation;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(observation) = self.pending.pop_front() {
                return Some(observation);
            }

            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    counter!(INGEST_RECORDS_MALFORMED_TOTAL).increment(1);
                    warn!(error = %e, "skipping unreadable record");
                    continue;
                }
            };
            counter!(INGEST_RECORDS_READ_TOTAL).increment(1);

            let observations = match self.normalizer.normalize(record) {
                Ok(observations) => observations,
                Err(e) => {
                    counter!(INGEST_RECORDS_MALFORMED_TOTAL).increment(1);
                    warn!(error = %e, "skipping malformed record");
                    continue;
                }
            };

            for mut observation in observations {
                observation.sensor = self.sensor.clone();
                if self
                    .rules
                    .should_ignore(observation.sensor.as_deref(), &observation.host)
                {
                    counter!(INGEST_RECORDS_IGNORED_TOTAL).increment(1);
                    trace!(host = %observation.host, "record dropped by ignore rules");
                    continue;
                }
                counter!(INGEST_RECORDS_NORMALIZED_TOTAL).increment(1);
                self.pending.push_back(observation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::PassiveReconNormalizer;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn raw(ts: f64, host: &str, recon_type: &str) -> RawRecord {
        let serde_json::Value::Object(map) = json!({
            "ts": ts,
            "host": host,
            "recon_type": recon_type,
            "source": "SSH-SERVER",
            "value": "OpenSSH_8.9",
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn normalizes_and_injects_sensor() {
        let records = vec![Ok(raw(1.0, "10.0.0.1", "PassiveRecon::SSH_SERVER"))];
        let rules = IgnoreRules::default();
        let stream = ObservationStream::new(
            records.into_iter(),
            &PassiveReconNormalizer,
            &rules,
            Some("gw0".to_owned()),
        );
        let observations: Vec<_> = stream.collect();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].sensor.as_deref(), Some("gw0"));
        assert_eq!(observations[0].recon_type, "SSH_SERVER");
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let mut bad = raw(1.0, "10.0.0.1", "PassiveRecon::SSH_SERVER");
        bad.remove("ts");
        let records = vec![
            Ok(raw(1.0, "10.0.0.1", "PassiveRecon::SSH_SERVER")),
            Ok(bad),
            Err(IngestError::MalformedRecord {
                reason: "field count".to_owned(),
            }),
            Ok(raw(2.0, "10.0.0.2", "PassiveRecon::SSH_SERVER")),
        ];
        let rules = IgnoreRules::default();
        let stream =
            ObservationStream::new(records.into_iter(), &PassiveReconNormalizer, &rules, None);
        let hosts: Vec<String> = stream.map(|o| o.host).collect();
        assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn ignore_rules_drop_records() {
        let rules = IgnoreRules::parse(
            r#"
[always_ignore]
"*" = ["ignored.net"]
"#,
        )
        .unwrap();
        let records = vec![
            Ok(raw(1.0, "ignored.net", "PassiveRecon::SSH_SERVER")),
            Ok(raw(2.0, "kept.net", "PassiveRecon::SSH_SERVER")),
        ];
        let stream =
            ObservationStream::new(records.into_iter(), &PassiveReconNormalizer, &rules, None);
        let hosts: Vec<String> = stream.map(|o| o.host).collect();
        assert_eq!(hosts, vec!["kept.net"]);
    }

    #[test]
    fn never_ignore_keeps_record_without_payload_fields() {
        // 페이로드 컬럼이 전부 unset인 레코드도 never_ignore 대상이면 살아남음
        let rules = IgnoreRules::parse(
            r#"
[always_ignore]
s1 = ["ignored.net"]

[never_ignore]
s1 = ["ignored.net"]
"#,
        )
        .unwrap();
        let serde_json::Value::Object(minimal) = json!({
            "ts": 100.0,
            "recon_type": "PassiveRecon::DNS",
            "host": "ignored.net",
        }) else {
            unreachable!()
        };
        let records = vec![Ok(minimal)];
        let stream = ObservationStream::new(
            records.into_iter(),
            &PassiveReconNormalizer,
            &rules,
            Some("s1".to_owned()),
        );
        let observations: Vec<_> = stream.collect();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].recon_type, "DNS");
        assert_eq!(observations[0].host, "ignored.net");
        assert_eq!(observations[0].source, "");
        assert_eq!(observations[0].value, "");
    }

    #[test]
    fn stream_is_lazy() {
        // 소비한 만큼만 원시 레코드를 읽는지 확인
        let pulled = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&pulled);
        let records = (0..100).map(move |i| {
            counter.set(counter.get() + 1);
            Ok(raw(i as f64, "10.0.0.1", "PassiveRecon::SSH_SERVER"))
        });
        let rules = IgnoreRules::default();
        let mut stream = ObservationStream::new(records, &PassiveReconNormalizer, &rules, None);

        for _ in 0..3 {
            stream.next().unwrap();
        }
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn from_log_rejects_unknown_format() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "#separator \\x09\n#path\tconn\n#fields\tts\n#types\ttime\n"
        )
        .unwrap();
        file.flush().unwrap();

        let log = ZeekLogFile::open(file.path()).unwrap();
        let registry = NormalizerRegistry::with_defaults();
        let rules = IgnoreRules::default();
        let result = ObservationStream::from_log(log, &registry, &rules, None);
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedFormat { format }) if format == "conn"
        ));
    }
}
