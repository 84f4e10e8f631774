//! 무시 규칙 — 센서/호스트 기반 레코드 필터
//!
//! 규칙은 TOML 파일로 선언합니다. `[always_ignore]`와 `[never_ignore]` 두
//! 테이블이 있고, 각 테이블은 센서 이름(또는 와일드카드 `"*"`)을 키로,
//! 호스트 패턴 목록을 값으로 가집니다.
//!
//! ```toml
//! [always_ignore]
//! "*" = ["10.0.0.0/8"]
//! gw0 = ["scanner.example.com", "192.0.2.1"]
//!
//! [never_ignore]
//! gw0 = ["10.0.5.0/24"]
//! ```
//!
//! # 평가 규칙
//!
//! `never_ignore`가 `always_ignore`보다 우선합니다. 어느 쪽이든 센서 전용
//! 항목과 와일드카드 항목 중 하나라도 매칭되면 해당 목록에 오른 것으로
//! 간주합니다. 규칙 파일이 없으면 아무 레코드도 거르지 않습니다.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use reconbase_core::error::{ConfigError, ReconbaseError};

/// 와일드카드 센서 키. 모든 센서(센서 미지정 포함)에 적용됩니다.
pub const WILDCARD_SENSOR: &str = "*";

/// 호스트 패턴
///
/// 규칙 파일의 문자열 항목 하나가 패턴 하나로 파싱됩니다. 주소 리터럴은
/// [`Addr`](HostPattern::Addr)로, CIDR 표기는 [`Net`](HostPattern::Net)으로,
/// 나머지는 대소문자 무시 정확 일치 [`Exact`](HostPattern::Exact)로 해석됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPattern {
    /// 호스트명 정확 일치 (대소문자 무시)
    Exact(String),
    /// 단일 IP 주소
    Addr(IpAddr),
    /// CIDR 네트워크
    Net {
        /// 네트워크 주소
        addr: IpAddr,
        /// 프리픽스 길이
        prefix: u8,
    },
}

impl HostPattern {
    /// 규칙 파일의 문자열 항목을 패턴으로 파싱합니다.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ignore_rules".to_owned(),
                reason: "empty host pattern".to_owned(),
            });
        }

        if let Some((addr_part, prefix_part)) = raw.split_once('/') {
            let addr: IpAddr = addr_part.parse().map_err(|_| ConfigError::InvalidValue {
                field: "ignore_rules".to_owned(),
                reason: format!("invalid network address in '{raw}'"),
            })?;
            let prefix: u8 = prefix_part.parse().map_err(|_| ConfigError::InvalidValue {
                field: "ignore_rules".to_owned(),
                reason: format!("invalid prefix length in '{raw}'"),
            })?;
            let max_prefix = match addr {
                IpAddr::V4(_) => 32,
                IpAddr::V6(_) => 128,
            };
            if prefix > max_prefix {
                return Err(ConfigError::InvalidValue {
                    field: "ignore_rules".to_owned(),
                    reason: format!("prefix /{prefix} exceeds /{max_prefix} in '{raw}'"),
                });
            }
            return Ok(Self::Net { addr, prefix });
        }

        if let Ok(addr) = raw.parse::<IpAddr>() {
            return Ok(Self::Addr(addr));
        }

        Ok(Self::Exact(raw.to_owned()))
    }

    /// 호스트가 이 패턴에 매칭되는지 확인합니다.
    pub fn matches(&self, host: &str) -> bool {
        match self {
            Self::Exact(name) => name.eq_ignore_ascii_case(host),
            Self::Addr(addr) => host.parse::<IpAddr>().is_ok_and(|h| h == *addr),
            Self::Net { addr, prefix } => host
                .parse::<IpAddr>()
                .is_ok_and(|h| net_contains(*addr, *prefix, h)),
        }
    }
}

fn net_contains(net: IpAddr, prefix: u8, host: IpAddr) -> bool {
    match (net, host) {
        (IpAddr::V4(net), IpAddr::V4(host)) => {
            if prefix == 0 {
                return true;
            }
            let net = u32::from(net);
            let host = u32::from(host);
            (net ^ host) >> (32 - u32::from(prefix)) == 0
        }
        (IpAddr::V6(net), IpAddr::V6(host)) => {
            if prefix == 0 {
                return true;
            }
            let net = u128::from(net);
            let host = u128::from(host);
            (net ^ host) >> (128 - u32::from(prefix)) == 0
        }
        // 주소 패밀리가 다르면 매칭되지 않음
        _ => false,
    }
}

/// 무시 규칙 파일 스키마
#[derive(Debug, Default, Deserialize)]
struct IgnoreRulesFile {
    #[serde(default)]
    always_ignore: HashMap<String, Vec<String>>,
    #[serde(default)]
    never_ignore: HashMap<String, Vec<String>>,
}

/// 컴파일된 무시 규칙
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    always_ignore: HashMap<String, Vec<HostPattern>>,
    never_ignore: HashMap<String, Vec<HostPattern>>,
}

impl IgnoreRules {
    /// 규칙 파일을 로드합니다. 경로가 `None`이면 빈 규칙(모두 통과)을 반환합니다.
    pub async fn load(path: Option<&Path>) -> Result<Self, ReconbaseError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReconbaseError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ReconbaseError::Io(e)
            }
        })?;
        let rules = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            always = rules.always_ignore.len(),
            never = rules.never_ignore.len(),
            "loaded ignore rules"
        );
        Ok(rules)
    }

    /// TOML 문자열에서 규칙을 파싱하고 패턴을 컴파일합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ReconbaseError> {
        let file: IgnoreRulesFile = toml::from_str(toml_str).map_err(|e| {
            ReconbaseError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })?;

        Ok(Self {
            always_ignore: compile_table(file.always_ignore)?,
            never_ignore: compile_table(file.never_ignore)?,
        })
    }

    /// 레코드를 버려야 하는지 판정합니다.
    ///
    /// `never_ignore`에 매칭되면 `always_ignore`에도 올라 있더라도 무조건
    /// 유지합니다(false). 그 외에는 `always_ignore` 매칭 여부를 따릅니다.
    pub fn should_ignore(&self, sensor: Option<&str>, host: &str) -> bool {
        if table_matches(&self.never_ignore, sensor, host) {
            return false;
        }
        table_matches(&self.always_ignore, sensor, host)
    }

    /// 규칙이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.always_ignore.is_empty() && self.never_ignore.is_empty()
    }
}

fn compile_table(
    raw: HashMap<String, Vec<String>>,
) -> Result<HashMap<String, Vec<HostPattern>>, ReconbaseError> {
    let mut compiled = HashMap::with_capacity(raw.len());
    for (sensor, entries) in raw {
        let patterns = entries
            .iter()
            .map(|entry| HostPattern::parse(entry))
            .collect::<Result<Vec<_>, _>>()?;
        compiled.insert(sensor, patterns);
    }
    Ok(compiled)
}

fn table_matches(
    table: &HashMap<String, Vec<HostPattern>>,
    sensor: Option<&str>,
    host: &str,
) -> bool {
    let sensor_hit = sensor
        .and_then(|s| table.get(s))
        .is_some_and(|patterns| patterns.iter().any(|p| p.matches(host)));
    if sensor_hit {
        return true;
    }
    table
        .get(WILDCARD_SENSOR)
        .is_some_and(|patterns| patterns.iter().any(|p| p.matches(host)))
}
