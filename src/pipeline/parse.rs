// src/pipeline/parse.rs

//! Field parser for tab-separated real-time log lines.
//!
//! Structural problems (wrong column count) fail the line. Conversion problems
//! in individual columns do not: the column keeps its default value and a
//! [`FieldWarning`] carrying the raw text is recorded and logged.

use std::fmt;
use std::net::IpAddr;

use crate::error::RecordError;
use crate::models::{FieldKind, LogRecord, LogSchema};

/// Text CloudFront writes for an empty column.
const ABSENT: &str = "-";

/// A column whose text could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    pub field: FieldKind,
    pub raw: String,
    pub message: String,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?}: {}",
            self.field.as_str(),
            self.raw,
            self.message
        )
    }
}

/// Output of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub record: LogRecord,
    pub warnings: Vec<FieldWarning>,
}

/// Parse one raw line against `schema`.
pub fn parse_line(line: &str, schema: &LogSchema) -> Result<ParsedLine, RecordError> {
    let line = strip_line_terminator(line);
    let parts: Vec<&str> = line.split('\t').collect();

    if parts.len() != schema.width() {
        return Err(RecordError::SchemaMismatch {
            expected: schema.width(),
            found: parts.len(),
        });
    }

    let mut record = LogRecord::default();
    let mut warnings = Vec::new();

    for (&field, &raw) in schema.fields.iter().zip(parts.iter()) {
        if let Err(message) = assign(&mut record, field, raw) {
            log::warn!(
                "Field {} has unparsable value {:?}: {}",
                field.as_str(),
                raw,
                message
            );
            warnings.push(FieldWarning {
                field,
                raw: raw.to_string(),
                message,
            });
        }
    }

    Ok(ParsedLine { record, warnings })
}

/// Remove a single trailing `\n` or `\r\n`.
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Store `raw` into the record column for `field`.
///
/// On error the column is left at its default.
fn assign(record: &mut LogRecord, field: FieldKind, raw: &str) -> Result<(), String> {
    match field {
        FieldKind::Timestamp => record.timestamp = parse_epoch_millis(raw)?,
        FieldKind::ClientIp => {
            record.client_ip = Some(raw.parse::<IpAddr>().map_err(|e| e.to_string())?)
        }
        FieldKind::Status => record.status = raw.parse::<u16>().map_err(|e| format!("{e}"))?,
        FieldKind::Bytes => record.bytes = raw.parse::<i64>().map_err(|e| format!("{e}"))?,
        FieldKind::TimeTaken => record.time_taken = parse_finite(raw)?,
        FieldKind::ContentLength => {
            if raw != ABSENT {
                record.content_length = Some(raw.parse::<i64>().map_err(|e| format!("{e}"))?);
            }
        }
        FieldKind::Method => record.method = raw.to_string(),
        FieldKind::Protocol => record.protocol = raw.to_string(),
        FieldKind::Host => record.host = raw.to_string(),
        FieldKind::UriStem => record.uri_stem = raw.to_string(),
        FieldKind::EdgeLocation => record.edge_location = raw.to_string(),
        FieldKind::EdgeRequestId => record.edge_request_id = raw.to_string(),
        FieldKind::HostHeader => record.host_header = raw.to_string(),
        FieldKind::ProtoVersion => record.proto_version = raw.to_string(),
        FieldKind::IpVersion => record.ip_version = raw.to_string(),
        FieldKind::UserAgent => record.user_agent = raw.to_string(),
        FieldKind::Referer => record.referer = raw.to_string(),
        FieldKind::Cookie => record.cookie = raw.to_string(),
        FieldKind::UriQuery => record.uri_query = raw.to_string(),
        FieldKind::EdgeResponseResultType => record.edge_response_result_type = raw.to_string(),
        FieldKind::SslProtocol => record.ssl_protocol = raw.to_string(),
        FieldKind::SslCipher => record.ssl_cipher = raw.to_string(),
        FieldKind::EdgeResultType => record.edge_result_type = raw.to_string(),
        FieldKind::ContentType => record.content_type = raw.to_string(),
        FieldKind::EdgeDetailedResultType => record.edge_detailed_result_type = raw.to_string(),
        FieldKind::Country => record.country = raw.to_string(),
        FieldKind::CacheBehaviorPathPattern => {
            record.cache_behavior_path_pattern = raw.to_string()
        }
    }
    Ok(())
}

/// Convert fractional epoch seconds (e.g. `1642349408.581`) to milliseconds.
fn parse_epoch_millis(raw: &str) -> Result<i64, String> {
    let seconds = parse_finite(raw)?;
    let millis = (seconds * 1000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err("timestamp out of range".to_string());
    }
    Ok(millis as i64)
}

fn parse_finite(raw: &str) -> Result<f64, String> {
    let value = raw.parse::<f64>().map_err(|e| format!("{e}"))?;
    if !value.is_finite() {
        return Err("value is not finite".to_string());
    }
    Ok(value)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Example line from the CloudFront real-time log documentation layout.
    pub(crate) const SAMPLE_LINE: &str = "1642349408.581\t123.123.123.123\t200\t3536\tGET\thttps\twww.example.com\t/news/today/\tIAD89-P2\tfv2T3ZdTRe4x0VV4Ro6YLWhfvD0LvfeKVRtJAXXWaev6SxFOPjhkjM==\td986b4ld3rmrlc.cloudfront.net\t0.130\tHTTP/1.1\tIPv4\tMozilla/5.0%20(compatible;%20SemrushBot/7%7Ebl;%20+http://www.semrush.com/bot.html)\t-\t-\t-\tMiss\tTLSv1.3\tTLS_AES_128_GCM_SHA256\tMiss\ttext/html\t-\tMiss\tGB\t*";

    /// Replace column `index` of the sample line.
    pub(crate) fn sample_with(index: usize, value: &str) -> String {
        let mut parts: Vec<&str> = SAMPLE_LINE.split('\t').collect();
        parts[index] = value;
        parts.join("\t")
    }

    #[test]
    fn test_parse_sample_line() {
        let parsed = parse_line(SAMPLE_LINE, &LogSchema::default()).unwrap();
        let record = parsed.record;

        assert!(parsed.warnings.is_empty());
        assert_eq!(record.timestamp, 1_642_349_408_581);
        assert_eq!(record.client_ip, "123.123.123.123".parse().ok());
        assert_eq!(record.status, 200);
        assert_eq!(record.bytes, 3536);
        assert_eq!(record.method, "GET");
        assert_eq!(record.host_header, "d986b4ld3rmrlc.cloudfront.net");
        assert_eq!(record.time_taken, 0.130);
        assert_eq!(record.content_length, None);
        assert_eq!(record.country, "GB");
        assert_eq!(record.cache_behavior_path_pattern, "*");
    }

    #[test]
    fn test_text_fields_are_verbatim() {
        let parsed = parse_line(SAMPLE_LINE, &LogSchema::default()).unwrap();
        let parts: Vec<&str> = SAMPLE_LINE.split('\t').collect();
        let record = parsed.record;

        assert_eq!(record.user_agent, parts[14]);
        assert_eq!(record.edge_request_id, parts[9]);
        assert_eq!(record.referer, "-");
        assert_eq!(record.uri_query, "-");
        assert_eq!(record.ssl_cipher, parts[20]);
    }

    #[test]
    fn test_wrong_field_count_is_schema_mismatch() {
        let short = "1642349408.581\t123.123.123.123\t200";
        let err = parse_line(short, &LogSchema::default()).unwrap_err();
        assert!(matches!(
            err,
            RecordError::SchemaMismatch {
                expected: 27,
                found: 3
            }
        ));

        let long = format!("{SAMPLE_LINE}\textra");
        let err = parse_line(&long, &LogSchema::default()).unwrap_err();
        assert!(matches!(err, RecordError::SchemaMismatch { found: 28, .. }));
    }

    #[test]
    fn test_trailing_newline_is_stripped() {
        let parsed = parse_line(&format!("{SAMPLE_LINE}\r\n"), &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.cache_behavior_path_pattern, "*");
    }

    #[test]
    fn test_empty_trailing_fields_are_kept() {
        let line = sample_with(26, "");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.cache_behavior_path_pattern, "");
    }

    #[test]
    fn test_bad_timestamp_defaults_to_zero_with_warning() {
        let line = sample_with(0, "not-a-time");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();

        assert_eq!(parsed.record.timestamp, 0);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].field, FieldKind::Timestamp);
        assert_eq!(parsed.warnings[0].raw, "not-a-time");
    }

    #[test]
    fn test_bad_ip_is_absent_with_warning() {
        let line = sample_with(1, "999.1.1.1");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.client_ip, None);
        assert_eq!(parsed.warnings[0].field, FieldKind::ClientIp);
    }

    #[test]
    fn test_ipv6_address() {
        let line = sample_with(1, "2001:db8::1");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.client_ip, "2001:db8::1".parse().ok());
    }

    #[test]
    fn test_numeric_failures_are_distinguishable_from_zero() {
        let line = sample_with(3, "-");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.bytes, 0);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].field, FieldKind::Bytes);

        let line = sample_with(3, "0");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.bytes, 0);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_content_length() {
        let line = sample_with(23, "1024");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.content_length, Some(1024));

        let line = sample_with(23, "lots");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.content_length, None);
        assert_eq!(parsed.warnings[0].field, FieldKind::ContentLength);
    }

    #[test]
    fn test_non_finite_time_taken_is_rejected() {
        let line = sample_with(11, "NaN");
        let parsed = parse_line(&line, &LogSchema::default()).unwrap();
        assert_eq!(parsed.record.time_taken, 0.0);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_custom_schema() {
        let schema = LogSchema {
            name: "minimal".to_string(),
            fields: vec![FieldKind::Status, FieldKind::Timestamp, FieldKind::Host],
        };
        let parsed = parse_line("404\t1642349408.5\texample.com", &schema).unwrap();
        assert_eq!(parsed.record.status, 404);
        assert_eq!(parsed.record.timestamp, 1_642_349_408_500);
        assert_eq!(parsed.record.host, "example.com");
        assert_eq!(parsed.record.method, "");
    }

    #[test]
    fn test_warning_display_includes_raw_text() {
        let warning = FieldWarning {
            field: FieldKind::Status,
            raw: "abc".to_string(),
            message: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "status \"abc\": invalid digit found in string"
        );
    }
}
