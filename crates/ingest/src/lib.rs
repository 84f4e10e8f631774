#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`reader`]: Zeek TSV 로그 파일 리더 (헤더 지시어 파싱, 타입 변환)
//! - [`normalize`]: 로그 형식별 정규화기와 형식 식별자 레지스트리
//! - [`ignore`]: 센서/호스트 무시 규칙 (`always_ignore` / `never_ignore`)
//! - [`pipeline`]: 원시 레코드 → 정규화 → 필터를 잇는 lazy 스트림
//! - [`sink`]: 커밋 드라이버와 인메모리 스토리지 구현
//! - [`enrich`]: 커밋 직전 부가 정보 계산 (DNS 도메인 체인 등)
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! ZeekLogFile -> NormalizerRegistry -> IgnoreRules -> ObservationStream -> Committer -> PassiveSink
//!      |               |                    |                                  |
//!   TSV 파싱      형식별 정규화         drop / force-keep                enrichment + dedup
//! ```

pub mod config;
pub mod enrich;
pub mod error;
pub mod ignore;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod sink;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::ObservationStream;

// 설정
pub use config::PipelineConfig;

// 에러
pub use error::IngestError;

// 정규화
pub use normalize::{LogNormalizer, NormalizerRegistry, PassiveReconNormalizer};

// 무시 규칙
pub use ignore::{HostPattern, IgnoreRules};

// 리더
pub use reader::{ZeekLogFile, ZeekType};

// 싱크
pub use sink::{CommitStats, Committer, MemorySink, RecordKey, SinkEntry, StoredRecord};

// enrichment
pub use enrich::{EnrichFn, observation_infos};
