//! 로그 정규화 — 원시 레코드를 관측 레코드로 변환
//!
//! 로그 형식마다 [`LogNormalizer`] 구현이 하나씩 있고,
//! [`NormalizerRegistry`]가 형식 식별자(Zeek `#path` 값)로 구현을 찾아줍니다.
//! 등록되지 않은 형식의 파일은 파일 단위로 건너뜁니다.

mod passive_recon;

use std::collections::HashMap;

use reconbase_core::types::{Observation, RawRecord};

use crate::error::IngestError;

pub use passive_recon::PassiveReconNormalizer;

/// 로그 형식별 정규화기 trait
///
/// 새 로그 형식을 지원하려면 이 trait을 구현하고 레지스트리에 등록합니다.
/// 원시 레코드 하나가 관측 레코드 0개, 1개, 또는 여러 개가 될 수 있습니다.
pub trait LogNormalizer: Send + Sync {
    /// 담당하는 로그 형식 식별자 (Zeek `#path` 값)
    fn format_name(&self) -> &'static str;

    /// 원시 레코드를 정규화합니다.
    ///
    /// 형식에 맞지 않는 레코드는 [`IngestError::MalformedRecord`]를 반환하며,
    /// 호출자는 해당 레코드만 건너뛰고 스트림을 계속합니다.
    fn normalize(&self, record: RawRecord) -> Result<Vec<Observation>, IngestError>;
}

/// 형식 식별자 → 정규화기 레지스트리
pub struct NormalizerRegistry {
    normalizers: HashMap<&'static str, Box<dyn LogNormalizer>>,
}

impl NormalizerRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            normalizers: HashMap::new(),
        }
    }

    /// 기본 정규화기가 모두 등록된 레지스트리를 생성합니다.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PassiveReconNormalizer));
        registry
    }

    /// 정규화기를 등록합니다. 같은 형식 이름은 나중 등록이 덮어씁니다.
    pub fn register(&mut self, normalizer: Box<dyn LogNormalizer>) {
        self.normalizers
            .insert(normalizer.format_name(), normalizer);
    }

    /// 형식 식별자로 정규화기를 찾습니다.
    pub fn get(&self, format: &str) -> Option<&dyn LogNormalizer> {
        self.normalizers.get(format).map(Box::as_ref)
    }

    /// 등록된 형식 이름 목록
    pub fn formats(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.normalizers.keys().copied()
    }
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
