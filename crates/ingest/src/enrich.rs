//! Enrichment — 커밋 직전 부가 정보 계산
//!
//! 관측 레코드 자체는 바꾸지 않고, 스토리지에 함께 저장할 파생 메타데이터를
//! 계산합니다. 실패는 레코드 단위입니다: 커밋 드라이버가 경고만 남기고
//! 부가 정보 없이 레코드를 저장합니다.

use reconbase_core::types::{ExtraInfo, Observation};

use crate::error::IngestError;

/// enrichment 함수 타입
///
/// `Ok(None)`은 해당 레코드에 파생 정보가 없다는 뜻입니다.
pub type EnrichFn = dyn Fn(&Observation) -> Result<Option<ExtraInfo>, IngestError> + Send + Sync;

/// 기본 enrichment 구현
///
/// - DNS 관측: 대상 이름의 도메인 접미어 체인 (`www.example.com` →
///   `www.example.com`, `example.com`, `com`)
/// - HTTP 클라이언트 USER-AGENT 헤더: 첫 product 토큰
/// - 그 외 분류는 파생 정보 없음
pub fn observation_infos(observation: &Observation) -> Result<Option<ExtraInfo>, IngestError> {
    match observation.recon_type.as_str() {
        "DNS_ANSWERS" => dns_infos(observation),
        "HTTP_CLIENT_HEADER" if observation.source == "USER-AGENT" => {
            Ok(user_agent_infos(&observation.value))
        }
        _ => Ok(None),
    }
}

fn dns_infos(observation: &Observation) -> Result<Option<ExtraInfo>, IngestError> {
    let Some(name) = observation.targetval.as_deref() else {
        return Ok(None);
    };
    let name = name.trim_end_matches('.');
    if name.is_empty() || name.split('.').any(|label| label.is_empty()) {
        return Err(IngestError::Enrichment {
            host: observation.host.clone(),
            reason: format!("invalid DNS name '{name}'"),
        });
    }

    let mut extra = ExtraInfo::new();
    let mut rest = name;
    loop {
        extra.push("domain", rest);
        match rest.split_once('.') {
            Some((_, suffix)) => rest = suffix,
            None => break,
        }
    }
    Ok(Some(extra))
}

fn user_agent_infos(value: &str) -> Option<ExtraInfo> {
    let bare = value.split_whitespace().next()?;
    let mut extra = ExtraInfo::new();
    extra.push("useragent", bare);
    Some(extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn observation(recon_type: &str, source: &str, value: &str, targetval: Option<&str>) -> Observation {
        Observation {
            timestamp: UNIX_EPOCH,
            sensor: None,
            host: "192.0.2.7".to_owned(),
            srvport: None,
            recon_type: recon_type.to_owned(),
            source: source.to_owned(),
            value: value.to_owned(),
            targetval: targetval.map(str::to_owned),
        }
    }

    #[test]
    fn dns_answer_yields_domain_chain() {
        let obs = observation(
            "DNS_ANSWERS",
            "A-www.example.com",
            "192.0.2.7",
            Some("www.example.com"),
        );
        let extra = observation_infos(&obs).unwrap().unwrap();
        let domains: Vec<&str> = extra.values_of("domain").collect();
        assert_eq!(domains, vec!["www.example.com", "example.com", "com"]);
    }

    #[test]
    fn trailing_dot_is_stripped() {
        let obs = observation("DNS_ANSWERS", "A-x", "192.0.2.7", Some("example.com."));
        let extra = observation_infos(&obs).unwrap().unwrap();
        assert_eq!(extra.values_of("domain").count(), 2);
    }

    #[test]
    fn invalid_dns_name_is_enrichment_error() {
        let obs = observation("DNS_ANSWERS", "A-x", "192.0.2.7", Some("bad..name"));
        let err = observation_infos(&obs).unwrap_err();
        assert!(matches!(err, IngestError::Enrichment { .. }));
    }

    #[test]
    fn dns_answer_without_target_has_no_infos() {
        let obs = observation("DNS_ANSWERS", "A-x", "192.0.2.7", None);
        assert!(observation_infos(&obs).unwrap().is_none());
    }

    #[test]
    fn user_agent_header_yields_bare_agent() {
        let obs = observation(
            "HTTP_CLIENT_HEADER",
            "USER-AGENT",
            "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101",
            None,
        );
        let extra = observation_infos(&obs).unwrap().unwrap();
        assert_eq!(
            extra.values_of("useragent").collect::<Vec<_>>(),
            vec!["Mozilla/5.0"]
        );
    }

    #[test]
    fn other_http_headers_have_no_infos() {
        let obs = observation("HTTP_CLIENT_HEADER", "HOST", "example.com", None);
        assert!(observation_infos(&obs).unwrap().is_none());
    }

    #[test]
    fn unknown_recon_type_has_no_infos() {
        let obs = observation("SSH_SERVER", "SSH-SERVER", "OpenSSH_8.9", None);
        assert!(observation_infos(&obs).unwrap().is_none());
    }
}
