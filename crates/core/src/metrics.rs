//! 메트릭 상수 등록
//!
//! 모든 Prometheus 메트릭의 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `reconbase_`
//! - 모듈명: `ingest_`, `sink_`
//! - 접미어: `_total` (counter)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 형식 레이블 키 (passiverecon 등, 헤더를 읽지 못했으면 `unknown`)
pub const LABEL_FORMAT: &str = "format";

// ─── Ingest 메트릭 ─────────────────────────────────────────────────

/// 읽어들인 원시 레코드 수 (counter)
pub const INGEST_RECORDS_READ_TOTAL: &str = "reconbase_ingest_records_read_total";

/// 정규화에 성공한 관측 레코드 수 (counter)
pub const INGEST_RECORDS_NORMALIZED_TOTAL: &str = "reconbase_ingest_records_normalized_total";

/// 무시 규칙으로 걸러진 레코드 수 (counter)
pub const INGEST_RECORDS_IGNORED_TOTAL: &str = "reconbase_ingest_records_ignored_total";

/// 형식 오류로 건너뛴 레코드 수 (counter)
pub const INGEST_RECORDS_MALFORMED_TOTAL: &str = "reconbase_ingest_records_malformed_total";

/// 건너뛴 로그 파일 수 (counter, label: format)
pub const INGEST_FILES_SKIPPED_TOTAL: &str = "reconbase_ingest_files_skipped_total";

// ─── Sink 메트릭 ───────────────────────────────────────────────────

/// 스토리지에 삽입/병합된 레코드 수 (counter)
pub const SINK_RECORDS_COMMITTED_TOTAL: &str = "reconbase_sink_records_committed_total";

/// 커밋된 배치 수 (counter)
pub const SINK_BATCHES_TOTAL: &str = "reconbase_sink_batches_total";

/// enrichment 실패 수 (counter)
pub const SINK_ENRICH_FAILURES_TOTAL: &str = "reconbase_sink_enrich_failures_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`를 호출하여 Prometheus HELP 텍스트를
/// 설정합니다. 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        INGEST_RECORDS_READ_TOTAL,
        "Total number of raw records read from log files"
    );
    describe_counter!(
        INGEST_RECORDS_NORMALIZED_TOTAL,
        "Total number of records successfully normalized"
    );
    describe_counter!(
        INGEST_RECORDS_IGNORED_TOTAL,
        "Total number of records dropped by ignore rules"
    );
    describe_counter!(
        INGEST_RECORDS_MALFORMED_TOTAL,
        "Total number of records skipped due to format errors"
    );
    describe_counter!(
        INGEST_FILES_SKIPPED_TOTAL,
        "Total number of log files skipped (missing or unsupported)"
    );
    describe_counter!(
        SINK_RECORDS_COMMITTED_TOTAL,
        "Total number of records handed to the storage sink"
    );
    describe_counter!(SINK_BATCHES_TOTAL, "Total number of bulk batches committed");
    describe_counter!(
        SINK_ENRICH_FAILURES_TOTAL,
        "Total number of per-record enrichment failures"
    );
}
