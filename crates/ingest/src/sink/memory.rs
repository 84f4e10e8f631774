//! 인메모리 스토리지 구현
//!
//! 자연 키(센서, 호스트, 포트, 분류, 출처, 값, 대상 값)가 같은 레코드는
//! 하나로 병합됩니다: `firstseen`/`lastseen` 구간이 넓어지고 `count`가
//! 누적됩니다. 같은 시퀀스를 두 번 커밋해도 저장 레코드 수는 늘지 않습니다.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::SystemTime;

use serde::Serialize;

use reconbase_core::error::ReconbaseError;
use reconbase_core::pipeline::PassiveSink;
use reconbase_core::types::{ExtraInfo, Observation};

/// 저장 레코드의 자연 키
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordKey {
    pub sensor: Option<String>,
    pub host: String,
    pub srvport: Option<u16>,
    pub recon_type: String,
    pub source: String,
    pub value: String,
    pub targetval: Option<String>,
}

impl RecordKey {
    fn from_observation(observation: &Observation) -> Self {
        Self {
            sensor: observation.sensor.clone(),
            host: observation.host.clone(),
            srvport: observation.srvport,
            recon_type: observation.recon_type.clone(),
            source: observation.source.clone(),
            value: observation.value.clone(),
            targetval: observation.targetval.clone(),
        }
    }
}

/// 키당 하나 저장되는 병합 레코드
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    /// 최초 관측 시각
    pub firstseen: SystemTime,
    /// 최종 관측 시각
    pub lastseen: SystemTime,
    /// 누적 관측 횟수
    pub count: u64,
    /// 부가 정보 (최초로 계산된 값 유지)
    pub extra: Option<ExtraInfo>,
}

impl StoredRecord {
    fn merge(&mut self, timestamp: SystemTime, extra: Option<ExtraInfo>) {
        self.firstseen = self.firstseen.min(timestamp);
        self.lastseen = self.lastseen.max(timestamp);
        self.count += 1;
        if self.extra.is_none() {
            self.extra = extra;
        }
    }
}

/// 스냅샷 항목 (키 + 병합 레코드)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkEntry {
    pub key: RecordKey,
    pub record: StoredRecord,
}

/// 인메모리 패시브 관측 스토리지
#[derive(Debug, Default)]
pub struct MemorySink {
    records: HashMap<RecordKey, StoredRecord>,
}

impl MemorySink {
    /// 빈 싱크를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장 레코드 수 (병합 후 고유 키 수)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 저장 레코드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 누적 관측 횟수 합계
    pub fn total_count(&self) -> u64 {
        self.records.values().map(|r| r.count).sum()
    }

    /// 키로 저장 레코드를 조회합니다.
    pub fn get(&self, key: &RecordKey) -> Option<&StoredRecord> {
        self.records.get(key)
    }

    /// 키 순으로 정렬된 스냅샷을 반환합니다.
    pub fn snapshot(&self) -> Vec<SinkEntry> {
        let mut entries: Vec<SinkEntry> = self
            .records
            .iter()
            .map(|(key, record)| SinkEntry {
                key: key.clone(),
                record: record.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

impl PassiveSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn insert_or_update(
        &mut self,
        observation: Observation,
        extra: Option<ExtraInfo>,
    ) -> Result<(), ReconbaseError> {
        let key = RecordKey::from_observation(&observation);
        match self.records.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(observation.timestamp, extra),
            Entry::Vacant(entry) => {
                entry.insert(StoredRecord {
                    firstseen: observation.timestamp,
                    lastseen: observation.timestamp,
                    count: 1,
                    extra,
                });
            }
        }
        Ok(())
    }

    fn insert_or_update_bulk(
        &mut self,
        batch: Vec<(Observation, Option<ExtraInfo>)>,
    ) -> Result<(), ReconbaseError> {
        // 배치 내 중복을 먼저 병합한 뒤 키당 한 번만 저장소에 반영
        let mut merged: HashMap<RecordKey, StoredRecord> = HashMap::new();
        for (observation, extra) in batch {
            let key = RecordKey::from_observation(&observation);
            match merged.entry(key) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(observation.timestamp, extra),
                Entry::Vacant(entry) => {
                    entry.insert(StoredRecord {
                        firstseen: observation.timestamp,
                        lastseen: observation.timestamp,
                        count: 1,
                        extra,
                    });
                }
            }
        }

        for (key, incoming) in merged {
            match self.records.entry(key) {
                Entry::Occupied(mut entry) => {
                    let stored = entry.get_mut();
                    stored.firstseen = stored.firstseen.min(incoming.firstseen);
                    stored.lastseen = stored.lastseen.max(incoming.lastseen);
                    stored.count += incoming.count;
                    if stored.extra.is_none() {
                        stored.extra = incoming.extra;
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(incoming);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn observation(host: &str, secs: u64) -> Observation {
        Observation {
            timestamp: UNIX_EPOCH + Duration::from_secs(secs),
            sensor: Some("s1".to_owned()),
            host: host.to_owned(),
            srvport: Some(22),
            recon_type: "SSH_SERVER".to_owned(),
            source: "SSH-SERVER".to_owned(),
            value: "OpenSSH_8.9".to_owned(),
            targetval: None,
        }
    }

    #[test]
    fn same_key_merges_into_one_record() {
        let mut sink = MemorySink::new();
        sink.insert_or_update(observation("10.0.0.1", 200), None)
            .unwrap();
        sink.insert_or_update(observation("10.0.0.1", 100), None)
            .unwrap();
        sink.insert_or_update(observation("10.0.0.1", 300), None)
            .unwrap();

        assert_eq!(sink.len(), 1);
        let entry = sink.snapshot().pop().unwrap();
        assert_eq!(entry.record.count, 3);
        assert_eq!(entry.record.firstseen, UNIX_EPOCH + Duration::from_secs(100));
        assert_eq!(entry.record.lastseen, UNIX_EPOCH + Duration::from_secs(300));
    }

    #[test]
    fn different_value_is_a_different_key() {
        let mut sink = MemorySink::new();
        let mut other = observation("10.0.0.1", 100);
        other.value = "OpenSSH_9.0".to_owned();
        sink.insert_or_update(observation("10.0.0.1", 100), None)
            .unwrap();
        sink.insert_or_update(other, None).unwrap();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn bulk_merges_within_batch_and_with_store() {
        let mut sink = MemorySink::new();
        sink.insert_or_update_bulk(vec![
            (observation("10.0.0.1", 100), None),
            (observation("10.0.0.1", 300), None),
            (observation("10.0.0.2", 200), None),
        ])
        .unwrap();
        sink.insert_or_update_bulk(vec![(observation("10.0.0.1", 50), None)])
            .unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.total_count(), 4);
        let entries = sink.snapshot();
        assert_eq!(entries[0].key.host, "10.0.0.1");
        assert_eq!(entries[0].record.count, 3);
        assert_eq!(
            entries[0].record.firstseen,
            UNIX_EPOCH + Duration::from_secs(50)
        );
    }

    #[test]
    fn recommit_does_not_grow_cardinality() {
        let batch = vec![
            (observation("10.0.0.1", 100), None),
            (observation("10.0.0.2", 200), None),
        ];
        let mut sink = MemorySink::new();
        sink.insert_or_update_bulk(batch.clone()).unwrap();
        let cardinality = sink.len();
        sink.insert_or_update_bulk(batch).unwrap();
        assert_eq!(sink.len(), cardinality);
        assert_eq!(sink.total_count(), 4);
    }

    #[test]
    fn first_extra_info_wins() {
        let mut sink = MemorySink::new();
        let mut first = ExtraInfo::new();
        first.push("domain", "example.com");
        sink.insert_or_update(observation("10.0.0.1", 100), Some(first.clone()))
            .unwrap();
        let mut second = ExtraInfo::new();
        second.push("domain", "other.com");
        sink.insert_or_update(observation("10.0.0.1", 200), Some(second))
            .unwrap();

        let entry = sink.snapshot().pop().unwrap();
        assert_eq!(entry.record.extra, Some(first));
    }
}
