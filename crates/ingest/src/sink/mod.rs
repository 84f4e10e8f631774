//! 커밋 드라이버와 스토리지 구현
//!
//! [`Committer`]가 관측 스트림을 소비하여 [`PassiveSink`]에 적재합니다.
//! 커밋 모드(벌크/행 단위)는 성능 스위치일 뿐이며 최종 저장 상태는 동일합니다.

mod memory;

use metrics::counter;
use tracing::warn;

use reconbase_core::metrics::{
    SINK_BATCHES_TOTAL, SINK_ENRICH_FAILURES_TOTAL, SINK_RECORDS_COMMITTED_TOTAL,
};
use reconbase_core::pipeline::{CommitMode, PassiveSink};
use reconbase_core::types::{ExtraInfo, Observation};

use crate::enrich::EnrichFn;
use crate::error::IngestError;

pub use memory::{MemorySink, RecordKey, SinkEntry, StoredRecord};

/// 커밋 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// 싱크로 넘어간 레코드 수
    pub records: usize,
    /// 실행된 벌크 배치 수 (행 단위 모드에서는 0)
    pub batches: usize,
    /// 부가 정보 계산 실패 수 (레코드는 부가 정보 없이 저장됨)
    pub enrich_failures: usize,
}

/// 관측 스트림을 싱크에 적재하는 커밋 드라이버
pub struct Committer<'a> {
    sink: &'a mut dyn PassiveSink,
    mode: CommitMode,
    batch_size: usize,
    enrich: Option<&'a EnrichFn>,
}

impl<'a> Committer<'a> {
    /// 커밋 드라이버를 생성합니다. `batch_size`는 벌크 모드에서만 의미가 있습니다.
    pub fn new(sink: &'a mut dyn PassiveSink, mode: CommitMode, batch_size: usize) -> Self {
        Self {
            sink,
            mode,
            batch_size,
            enrich: None,
        }
    }

    /// 커밋 직전 레코드별로 호출할 enrichment 함수를 설정합니다.
    pub fn with_enrich(mut self, enrich: &'a EnrichFn) -> Self {
        self.enrich = Some(enrich);
        self
    }

    /// 스트림 전체를 소비하여 싱크에 적재합니다.
    ///
    /// 스토리지가 삽입/배치를 거부하면 [`IngestError::Commit`]으로 중단합니다.
    /// enrichment 실패는 레코드 단위입니다: 경고를 남기고 부가 정보 없이
    /// 저장합니다.
    pub fn commit(
        &mut self,
        stream: impl Iterator<Item = Observation>,
    ) -> Result<CommitStats, IngestError> {
        let mut stats = CommitStats::default();
        let mut batch: Vec<(Observation, Option<ExtraInfo>)> = Vec::new();

        for observation in stream {
            let extra = match self.enrich {
                Some(enrich) => match enrich(&observation) {
                    Ok(extra) => extra,
                    Err(e) => {
                        stats.enrich_failures += 1;
                        counter!(SINK_ENRICH_FAILURES_TOTAL).increment(1);
                        warn!(host = %observation.host, error = %e, "enrichment failed, storing without extra info");
                        None
                    }
                },
                None => None,
            };

            stats.records += 1;
            counter!(SINK_RECORDS_COMMITTED_TOTAL).increment(1);
            match self.mode {
                CommitMode::Bulk => {
                    batch.push((observation, extra));
                    if batch.len() >= self.batch_size {
                        self.flush(&mut batch, &mut stats)?;
                    }
                }
                CommitMode::PerRecord => {
                    self.sink
                        .insert_or_update(observation, extra)
                        .map_err(commit_error)?;
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut stats)?;
        }
        Ok(stats)
    }

    fn flush(
        &mut self,
        batch: &mut Vec<(Observation, Option<ExtraInfo>)>,
        stats: &mut CommitStats,
    ) -> Result<(), IngestError> {
        self.sink
            .insert_or_update_bulk(std::mem::take(batch))
            .map_err(commit_error)?;
        stats.batches += 1;
        counter!(SINK_BATCHES_TOTAL).increment(1);
        Ok(())
    }
}

fn commit_error(e: reconbase_core::error::ReconbaseError) -> IngestError {
    IngestError::Commit {
        reason: e.to_string(),
    }
}
