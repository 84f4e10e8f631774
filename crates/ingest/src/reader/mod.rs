//! 로그 파일 리더
//!
//! 센서가 떨어뜨린 로그 파일을 원시 레코드([`RawRecord`]) 시퀀스로 읽어내는
//! 계층입니다. 현재는 Zeek TSV 형식만 지원합니다.
//!
//! [`RawRecord`]: reconbase_core::types::RawRecord

mod zeek;

pub use zeek::{ZeekLogFile, ZeekType};
