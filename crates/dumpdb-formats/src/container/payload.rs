//! Binary table encoding stored in entry payloads
//!
//! The raw payload is column-major:
//!
//! - `u32` column count, then each column name (`u16` length + UTF-8)
//! - `u64` row count
//! - `u32` index field count, then each field name
//! - for every column, one tagged value per row
//!
//! Value tags follow [`ValueKind::tag`]: missing has no body, integers and
//! floats are 8 bytes, strings are `u32` length + UTF-8, timestamps are
//! `i64` microseconds since the Unix epoch.
//!
//! The raw payload is zlib-compressed before it is written to disk.

use crate::container::error::{ContainerError, ContainerResult};
use crate::table::{Column, Table, Value, ValueKind};
use binrw::{BinReaderExt, BinWriterExt};
use chrono::{DateTime, NaiveDateTime};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Cursor, Read, Write};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Encode a table into its raw (uncompressed) payload
pub fn encode_table(table: &Table) -> ContainerResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());

    out.write_le(&count_u32(table.column_count())?)?;
    for column in table.columns() {
        write_name(&mut out, &column.name)?;
    }

    out.write_le(&(table.row_count() as u64))?;

    out.write_le(&count_u32(table.index_fields().len())?)?;
    for field in table.index_fields() {
        write_name(&mut out, field)?;
    }

    for column in table.columns() {
        for value in &column.values {
            write_value(&mut out, value)?;
        }
    }

    Ok(out.into_inner())
}

/// Decode a raw payload back into a table
pub fn decode_table(data: &[u8]) -> ContainerResult<Table> {
    let mut input = Cursor::new(data);

    let column_count: u32 = input.read_le()?;
    let mut names = Vec::new();
    for _ in 0..column_count {
        names.push(read_name(&mut input)?);
    }

    let row_count: u64 = input.read_le()?;

    let index_count: u32 = input.read_le()?;
    let mut index = Vec::new();
    for _ in 0..index_count {
        index.push(read_name(&mut input)?);
    }

    // Every value takes at least its tag byte
    let available = remaining(&input);
    if row_count.saturating_mul(u64::from(column_count)) > available {
        return Err(ContainerError::Corrupt(format!(
            "{row_count} rows x {column_count} columns exceed {available} payload bytes"
        )));
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let mut values = Vec::new();
        for _ in 0..row_count {
            values.push(read_value(&mut input)?);
        }
        columns.push(Column::new(name, values));
    }

    let trailing = remaining(&input);
    if trailing != 0 {
        return Err(ContainerError::Corrupt(format!(
            "{trailing} trailing bytes after table"
        )));
    }

    Ok(Table::from_columns(columns, index)?)
}

/// Zlib-compress a raw payload
pub fn compress(raw: &[u8], level: u32) -> ContainerResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Inflate a stored payload, refusing output larger than `raw_len`
pub fn decompress(stored: &[u8], raw_len: usize) -> ContainerResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(stored).take(raw_len as u64 + 1);
    let mut raw = Vec::with_capacity(raw_len);
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| ContainerError::Corrupt(format!("zlib decompression failed: {e}")))?;

    if raw.len() != raw_len {
        return Err(ContainerError::Corrupt(format!(
            "inflated {} bytes, header records {raw_len}",
            raw.len()
        )));
    }
    Ok(raw)
}

fn count_u32(count: usize) -> ContainerResult<u32> {
    u32::try_from(count).map_err(|_| ContainerError::Corrupt(format!("count {count} exceeds u32")))
}

fn write_name(out: &mut Cursor<Vec<u8>>, name: &str) -> ContainerResult<()> {
    let len = u16::try_from(name.len())
        .map_err(|_| ContainerError::Corrupt(format!("name too long: {} bytes", name.len())))?;
    out.write_le(&len)?;
    out.write_all(name.as_bytes())?;
    Ok(())
}

fn write_value(out: &mut Cursor<Vec<u8>>, value: &Value) -> ContainerResult<()> {
    out.write_le(&value.kind().tag())?;
    match value {
        Value::Missing => {}
        Value::Int(n) => out.write_le(n)?,
        Value::Float(x) => out.write_le(&x.to_bits())?,
        Value::Str(s) => {
            out.write_le(&count_u32(s.len())?)?;
            out.write_all(s.as_bytes())?;
        }
        Value::Timestamp(ts) => out.write_le(&ts.and_utc().timestamp_micros())?,
    }
    Ok(())
}

fn remaining(input: &Cursor<&[u8]>) -> u64 {
    (input.get_ref().len() as u64).saturating_sub(input.position())
}

fn read_bytes(input: &mut Cursor<&[u8]>, len: usize) -> ContainerResult<Vec<u8>> {
    if len as u64 > remaining(input) {
        return Err(ContainerError::Corrupt(format!(
            "string of {len} bytes runs past end of payload"
        )));
    }
    let mut buf = vec![0u8; len];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_string(input: &mut Cursor<&[u8]>, len: usize) -> ContainerResult<String> {
    String::from_utf8(read_bytes(input, len)?)
        .map_err(|e| ContainerError::Corrupt(format!("invalid UTF-8: {e}")))
}

fn read_name(input: &mut Cursor<&[u8]>) -> ContainerResult<String> {
    let len: u16 = input.read_le()?;
    read_string(input, usize::from(len))
}

fn read_value(input: &mut Cursor<&[u8]>) -> ContainerResult<Value> {
    let tag: u8 = input.read_le()?;
    let kind = ValueKind::from_tag(tag)
        .ok_or_else(|| ContainerError::Corrupt(format!("unknown value tag {tag}")))?;

    Ok(match kind {
        ValueKind::Missing => Value::Missing,
        ValueKind::Int => Value::Int(input.read_le()?),
        ValueKind::Float => Value::Float(f64::from_bits(input.read_le()?)),
        ValueKind::Str => {
            let len: u32 = input.read_le()?;
            Value::Str(read_string(input, len as usize)?)
        }
        ValueKind::Timestamp => {
            let micros: i64 = input.read_le()?;
            Value::Timestamp(timestamp_from_micros(micros)?)
        }
    })
}

fn timestamp_from_micros(micros: i64) -> ContainerResult<NaiveDateTime> {
    let secs = micros.div_euclid(MICROS_PER_SECOND);
    let nanos = (micros.rem_euclid(MICROS_PER_SECOND) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ContainerError::Corrupt(format!("timestamp out of range: {micros}")))
}
