//! Encoding of AQI measurements as InfluxDB line protocol.

use crate::pipeline::types::AqiMeasurement;

/// Encodes one point per measurement, newline separated:
///
/// ```text
/// AQI,host=pi1,location=porch,sensor=pms5003 pm25=100i
/// ```
///
/// No timestamp is written; the server stamps points on arrival. Tags with
/// empty values are left out since line protocol cannot express them.
pub fn encode_batch(batch: &[AqiMeasurement]) -> String {
    batch.iter().map(encode_point).collect::<Vec<_>>().join("\n")
}

fn encode_point(m: &AqiMeasurement) -> String {
    let mut line = escape(AqiMeasurement::MEASUREMENT, false);

    // sorted by key
    for (key, value) in [
        ("host", &m.tags.host),
        ("location", &m.tags.location),
        ("sensor", &m.tags.sensor),
    ] {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(key);
        line.push('=');
        line.push_str(&escape(value, true));
    }

    line.push(' ');
    line.push_str(&escape(&m.field_name, true));
    line.push('=');
    line.push_str(&m.aqi_value.to_string());
    line.push('i');
    line
}

/// Measurement names escape commas and spaces; keys and tag values also
/// escape `=`.
fn escape(s: &str, escape_equals: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == ',' || c == ' ' || (escape_equals && c == '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
