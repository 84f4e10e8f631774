//! Zeek TSV 로그 리더
//!
//! Zeek 로그는 `#separator`, `#fields`, `#types`, `#path` 같은 헤더 지시어로
//! 시작하고 탭 구분 데이터 라인이 이어지는 텍스트 파일입니다. 이 리더는
//! 헤더를 파싱한 뒤 데이터 라인을 하나씩 [`RawRecord`]로 변환하는
//! 단일 패스 Iterator입니다.
//!
//! - `#unset_field` (기본 `-`) 값은 레코드에서 아예 빠집니다.
//! - `#empty_field` (기본 `(empty)`) 값은 빈 문자열이 됩니다.
//! - `time` / `port` / `count` 타입 컬럼은 JSON 숫자로 변환됩니다.
//! - `#close` 지시어를 만나면 스트림이 끝납니다.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use serde_json::Value;

use reconbase_core::types::RawRecord;

use crate::error::IngestError;

/// Zeek `#types` 지시어의 컬럼 타입
///
/// 여기서 구분하지 않는 타입(`interval`, `enum` 등)은 전부 [`Str`](ZeekType::Str)로
/// 취급하여 문자열 그대로 보존합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeekType {
    /// epoch 초 단위 실수 시각
    Time,
    /// IP 주소
    Addr,
    /// 포트 번호
    Port,
    /// 부호 없는 정수
    Count,
    /// 불리언 (`T` / `F`)
    Bool,
    /// 그 외 전부 (문자열 보존)
    Str,
}

impl ZeekType {
    fn from_token(token: &str) -> Self {
        match token {
            "time" => Self::Time,
            "addr" => Self::Addr,
            "port" => Self::Port,
            "count" => Self::Count,
            "bool" => Self::Bool,
            _ => Self::Str,
        }
    }

    fn convert(self, raw: &str) -> Value {
        match self {
            Self::Time => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or_else(|| Value::String(raw.to_owned()), Value::Number),
            Self::Port | Self::Count => raw
                .parse::<u64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or_else(|_| Value::String(raw.to_owned())),
            Self::Bool => match raw {
                "T" => Value::Bool(true),
                "F" => Value::Bool(false),
                _ => Value::String(raw.to_owned()),
            },
            Self::Addr | Self::Str => Value::String(raw.to_owned()),
        }
    }
}

/// 열린 Zeek 로그 파일
///
/// `Iterator<Item = Result<RawRecord, IngestError>>`를 구현합니다.
/// 레코드 단위 오류(필드 개수 불일치)는 개별 `Err` 항목으로 나오고
/// 스트림은 계속됩니다.
#[derive(Debug)]
pub struct ZeekLogFile {
    lines: Lines<BufReader<File>>,
    separator: char,
    unset_field: String,
    empty_field: String,
    path_id: String,
    fields: Vec<String>,
    types: Vec<ZeekType>,
    // 헤더 파싱 중 먼저 읽힌 첫 데이터 라인
    pending: Option<String>,
    closed: bool,
}

impl ZeekLogFile {
    /// 로그 파일을 열고 헤더 지시어를 파싱합니다.
    ///
    /// 파일이 없으면 [`IngestError::MissingFile`], 헤더가 불완전하면
    /// [`IngestError::Header`]를 반환합니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IngestError::MissingFile {
                    path: path.display().to_string(),
                }
            } else {
                IngestError::Io(e)
            }
        })?;

        let mut lines = BufReader::new(file).lines();
        let mut separator = '\t';
        let mut unset_field = "-".to_owned();
        let mut empty_field = "(empty)".to_owned();
        let mut path_id = None;
        let mut fields = None;
        let mut types = None;
        let mut pending = None;

        for line in lines.by_ref() {
            let line = line?;
            let Some(directive) = line.strip_prefix('#') else {
                // 첫 데이터 라인: 헤더 끝
                pending = Some(line);
                break;
            };
            // `#separator` 라인만 공백 구분, 나머지는 separator 구분
            if let Some(value) = directive.strip_prefix("separator ") {
                separator = parse_separator(value).ok_or_else(|| IngestError::Header {
                    path: path.display().to_string(),
                    reason: format!("unsupported separator '{value}'"),
                })?;
                continue;
            }
            let mut tokens = directive.split(separator);
            match tokens.next() {
                Some("unset_field") => {
                    if let Some(value) = tokens.next() {
                        unset_field = value.to_owned();
                    }
                }
                Some("empty_field") => {
                    if let Some(value) = tokens.next() {
                        empty_field = value.to_owned();
                    }
                }
                Some("path") => path_id = tokens.next().map(str::to_owned),
                Some("fields") => fields = Some(tokens.map(str::to_owned).collect::<Vec<_>>()),
                Some("types") => {
                    types = Some(tokens.map(ZeekType::from_token).collect::<Vec<_>>());
                }
                // set_separator, open 등 나머지 지시어는 무시
                _ => {}
            }
        }

        let path_id = path_id.ok_or_else(|| IngestError::Header {
            path: path.display().to_string(),
            reason: "missing #path directive".to_owned(),
        })?;
        let fields = fields.ok_or_else(|| IngestError::Header {
            path: path.display().to_string(),
            reason: "missing #fields directive".to_owned(),
        })?;
        let types = types.unwrap_or_else(|| vec![ZeekType::Str; fields.len()]);
        if types.len() != fields.len() {
            return Err(IngestError::Header {
                path: path.display().to_string(),
                reason: format!(
                    "#fields/#types length mismatch ({} vs {})",
                    fields.len(),
                    types.len()
                ),
            });
        }

        Ok(Self {
            lines,
            separator,
            unset_field,
            empty_field,
            path_id,
            fields,
            types,
            pending,
            closed: false,
        })
    }

    /// 로그의 형식 식별자 (`#path` 지시어 값)
    pub fn path(&self) -> &str {
        &self.path_id
    }

    /// 컬럼 이름 목록 (`#fields` 지시어 값)
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// 컬럼 타입 목록 (`#types` 지시어 값)
    pub fn field_types(&self) -> &[ZeekType] {
        &self.types
    }

    fn parse_line(&self, line: &str) -> Result<RawRecord, IngestError> {
        let values: Vec<&str> = line.split(self.separator).collect();
        if values.len() != self.fields.len() {
            return Err(IngestError::MalformedRecord {
                reason: format!(
                    "expected {} fields, found {}",
                    self.fields.len(),
                    values.len()
                ),
            });
        }

        let mut record = RawRecord::new();
        for ((name, ty), raw) in self.fields.iter().zip(&self.types).zip(values) {
            if raw == self.unset_field {
                continue;
            }
            let value = if raw == self.empty_field {
                Value::String(String::new())
            } else {
                ty.convert(raw)
            };
            record.insert(name.clone(), value);
        }
        Ok(record)
    }
}

impl Iterator for ZeekLogFile {
    type Item = Result<RawRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        if let Some(line) = self.pending.take() {
            return Some(self.parse_line(&line));
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(IngestError::Io(e))),
            };
            if let Some(directive) = line.strip_prefix('#') {
                if directive.starts_with("close") {
                    self.closed = true;
                    return None;
                }
                // 데이터 구간에 섞인 지시어는 건너뜀
                continue;
            }
            if line.is_empty() {
                continue;
            }
            return Some(self.parse_line(&line));
        }
    }
}

/// `#separator` 지시어 값을 파싱합니다 (`\x09` 형태의 이스케이프 지원).
fn parse_separator(value: &str) -> Option<char> {
    if let Some(hex) = value.strip_prefix("\\x") {
        let byte = u8::from_str_radix(hex, 16).ok()?;
        return Some(char::from(byte));
    }
    let mut chars = value.chars();
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_LOG: &str = "#separator \\x09\n\
#set_separator\t,\n\
#empty_field\t(empty)\n\
#unset_field\t-\n\
#path\tpassiverecon\n\
#open\t2017-01-01-00-00-00\n\
#fields\tts\tuid\thost\tsrvport\trecon_type\tsource\tvalue\ttargetval\n\
#types\ttime\tstring\taddr\tport\tstring\tstring\tstring\tstring\n\
1483228800.123456\tC1\t192.168.1.10\t80\tPassiveRecon::HTTP_CLIENT_HEADER\tUSER-AGENT\tMozilla/5.0\t-\n\
1483228801.000000\tC2\t192.168.1.11\t-\tPassiveRecon::DNS_ANSWERS\tA-www.example.com\t192.0.2.7\twww.example.com\n\
#close\t2017-01-01-01-00-00\n";

    fn write_log(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn open_parses_header_directives() {
        let file = write_log(SAMPLE_LOG);
        let log = ZeekLogFile::open(file.path()).unwrap();
        assert_eq!(log.path(), "passiverecon");
        assert_eq!(log.field_names().len(), 8);
        assert_eq!(log.field_types()[0], ZeekType::Time);
        assert_eq!(log.field_types()[3], ZeekType::Port);
    }

    #[test]
    fn iterates_typed_records() {
        let file = write_log(SAMPLE_LOG);
        let log = ZeekLogFile::open(file.path()).unwrap();
        let records: Vec<RawRecord> = log.map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first["ts"].as_f64().unwrap(), 1483228800.123456);
        assert_eq!(first["srvport"].as_u64().unwrap(), 80);
        assert_eq!(
            first["recon_type"].as_str().unwrap(),
            "PassiveRecon::HTTP_CLIENT_HEADER"
        );
        // unset 필드는 레코드에서 빠짐
        assert!(!first.contains_key("targetval"));

        let second = &records[1];
        assert!(!second.contains_key("srvport"));
        assert_eq!(second["targetval"].as_str().unwrap(), "www.example.com");
    }

    #[test]
    fn stops_at_close_directive() {
        let with_trailing = format!("{SAMPLE_LOG}9999999999.0\tC3\tx\t-\t-\t-\t-\t-\n");
        let file = write_log(&with_trailing);
        let log = ZeekLogFile::open(file.path()).unwrap();
        // #close 이후 라인은 읽지 않음
        assert_eq!(log.count(), 2);
    }

    #[test]
    fn field_count_mismatch_is_row_level_error() {
        let log_text = "#separator \\x09\n\
#path\tpassiverecon\n\
#fields\tts\thost\n\
#types\ttime\taddr\n\
1.0\t10.0.0.1\n\
short-line\n\
2.0\t10.0.0.2\n";
        let file = write_log(log_text);
        let log = ZeekLogFile::open(file.path()).unwrap();
        let results: Vec<_> = log.collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(IngestError::MalformedRecord { .. })
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn missing_file_maps_to_missing_file_error() {
        let result = ZeekLogFile::open("/nonexistent/passiverecon.log");
        assert!(matches!(result, Err(IngestError::MissingFile { .. })));
    }

    #[test]
    fn missing_path_directive_is_header_error() {
        let log_text = "#separator \\x09\n#fields\tts\n#types\ttime\n1.0\n";
        let file = write_log(log_text);
        let result = ZeekLogFile::open(file.path());
        assert!(matches!(result, Err(IngestError::Header { .. })));
    }

    #[test]
    fn empty_field_marker_becomes_empty_string() {
        let log_text = "#separator \\x09\n\
#path\tpassiverecon\n\
#fields\tts\tvalue\n\
#types\ttime\tstring\n\
1.0\t(empty)\n";
        let file = write_log(log_text);
        let mut log = ZeekLogFile::open(file.path()).unwrap();
        let record = log.next().unwrap().unwrap();
        assert_eq!(record["value"].as_str().unwrap(), "");
    }

    #[test]
    fn separator_escape_parsing() {
        assert_eq!(parse_separator("\\x09"), Some('\t'));
        assert_eq!(parse_separator(","), Some(','));
        assert_eq!(parse_separator("too-long"), None);
    }
}
