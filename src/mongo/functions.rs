//! Shell constructors producing MongoDB Extended JSON.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use cmdbridge_core::FunctionTable;
use rand::RngCore;
use serde_json::{json, Value};
use uuid::Uuid;

/// Table with `ObjectId`, `ISODate`/`Date`, `NumberInt`, `NumberLong`,
/// `NumberDecimal`, `Timestamp`, `UUID`, `MinKey` and `MaxKey`.
pub fn mongo_functions() -> FunctionTable {
    FunctionTable::new()
        .with("ObjectId", object_id)
        .with("ISODate", iso_date)
        .with("Date", iso_date)
        .with("NumberInt", number_int)
        .with("NumberLong", number_long)
        .with("NumberDecimal", number_decimal)
        .with("Timestamp", timestamp)
        .with("UUID", uuid)
        .with("MinKey", |_| Ok(json!({"$minKey": 1})))
        .with("MaxKey", |_| Ok(json!({"$maxKey": 1})))
}

fn object_id(args: &[Value]) -> Result<Value, String> {
    let hex_id = match args.first() {
        None => {
            let mut bytes = [0u8; 12];
            let secs = Utc::now().timestamp() as u32;
            bytes[..4].copy_from_slice(&secs.to_be_bytes());
            rand::thread_rng().fill_bytes(&mut bytes[4..]);
            hex::encode(bytes)
        }
        Some(Value::String(s)) => {
            let decoded = hex::decode(s).map_err(|e| format!("invalid hex: {}", e))?;
            if decoded.len() != 12 {
                return Err(format!("expected 24 hex characters, got {}", s.len()));
            }
            s.to_ascii_lowercase()
        }
        Some(other) => return Err(format!("expected a hex string, got {}", other)),
    };
    Ok(json!({ "$oid": hex_id }))
}

fn iso_date(args: &[Value]) -> Result<Value, String> {
    let at: DateTime<Utc> = match args.first() {
        None => Utc::now(),
        Some(Value::Number(n)) => {
            let millis = n.as_i64().ok_or_else(|| format!("invalid epoch millis: {}", n))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| format!("epoch millis out of range: {}", millis))?
        }
        Some(Value::String(s)) => parse_date(s)?,
        Some(other) => return Err(format!("expected a date string, got {}", other)),
    };
    Ok(json!({ "$date": at.to_rfc3339_opts(SecondsFormat::Millis, true) }))
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("invalid date: {}", s))
}

/// Numeric argument as its decimal text, from a number or a numeric string.
fn numeric_text(args: &[Value]) -> Result<String, String> {
    match args.first() {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(format!("expected a number, got {}", other)),
        None => Ok("0".to_string()),
    }
}

fn number_int(args: &[Value]) -> Result<Value, String> {
    let text = numeric_text(args)?;
    let n: i32 = text.parse().map_err(|_| format!("not a 32-bit integer: {}", text))?;
    Ok(json!({ "$numberInt": n.to_string() }))
}

fn number_long(args: &[Value]) -> Result<Value, String> {
    let text = numeric_text(args)?;
    let n: i64 = text.parse().map_err(|_| format!("not a 64-bit integer: {}", text))?;
    Ok(json!({ "$numberLong": n.to_string() }))
}

fn number_decimal(args: &[Value]) -> Result<Value, String> {
    let text = numeric_text(args)?;
    if text.parse::<f64>().is_err() {
        return Err(format!("not a decimal: {}", text));
    }
    Ok(json!({ "$numberDecimal": text }))
}

fn timestamp(args: &[Value]) -> Result<Value, String> {
    let part = |i: usize| -> Result<u32, String> {
        match args.get(i) {
            None => Ok(0),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| format!("timestamp part must be an unsigned 32-bit integer, got {}", v)),
        }
    };
    Ok(json!({ "$timestamp": { "t": part(0)?, "i": part(1)? } }))
}

fn uuid(args: &[Value]) -> Result<Value, String> {
    let id = match args.first() {
        None => Uuid::new_v4(),
        Some(Value::String(s)) => Uuid::parse_str(s).map_err(|e| e.to_string())?,
        Some(other) => return Err(format!("expected a uuid string, got {}", other)),
    };
    Ok(json!({ "$uuid": id.hyphenated().to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id() {
        let table = mongo_functions();
        let v = table.call("ObjectId", &[json!("507F1F77BCF86CD799439011")]).unwrap();
        assert_eq!(v, json!({"$oid": "507f1f77bcf86cd799439011"}));

        let generated = table.call("ObjectId", &[]).unwrap();
        assert_eq!(generated["$oid"].as_str().map(str::len), Some(24));

        assert!(table.call("ObjectId", &[json!("xyz")]).is_err());
        assert!(table.call("ObjectId", &[json!("abcd")]).is_err());
    }

    #[test]
    fn test_iso_date() {
        let table = mongo_functions();
        assert_eq!(
            table.call("ISODate", &[json!("2024-03-01T10:20:30Z")]).unwrap(),
            json!({"$date": "2024-03-01T10:20:30.000Z"})
        );
        assert_eq!(
            table.call("ISODate", &[json!("2024-03-01")]).unwrap(),
            json!({"$date": "2024-03-01T00:00:00.000Z"})
        );
        assert_eq!(
            table.call("Date", &[json!(0)]).unwrap(),
            json!({"$date": "1970-01-01T00:00:00.000Z"})
        );
        assert!(table.call("ISODate", &[json!("yesterday")]).is_err());
    }

    #[test]
    fn test_numbers() {
        let table = mongo_functions();
        assert_eq!(table.call("NumberInt", &[json!(5)]).unwrap(), json!({"$numberInt": "5"}));
        assert_eq!(
            table.call("NumberLong", &[json!("9007199254740993")]).unwrap(),
            json!({"$numberLong": "9007199254740993"})
        );
        assert_eq!(
            table.call("NumberDecimal", &[json!("1.10")]).unwrap(),
            json!({"$numberDecimal": "1.10"})
        );
        assert!(table.call("NumberInt", &[json!(3_000_000_000u64)]).is_err());
    }

    #[test]
    fn test_timestamp_uuid_keys() {
        let table = mongo_functions();
        assert_eq!(
            table.call("Timestamp", &[json!(1700000000), json!(1)]).unwrap(),
            json!({"$timestamp": {"t": 1700000000, "i": 1}})
        );
        assert_eq!(
            table.call("UUID", &[json!("67E55044-10B1-426F-9247-BB680E5FE0C8")]).unwrap(),
            json!({"$uuid": "67e55044-10b1-426f-9247-bb680e5fe0c8"})
        );
        assert_eq!(table.call("minkey", &[]).unwrap(), json!({"$minKey": 1}));
        assert_eq!(table.call("MaxKey", &[]).unwrap(), json!({"$maxKey": 1}));
    }
}
