//! Parsing of command-line numbers and printing of device data.

use std::fmt::Write as _;

use clap::ValueEnum;
use geckolink_core::PokeValue;

/// Width and interpretation of a peeked or poked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueType
{
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

/// Parse `0x`-prefixed hex or plain decimal into a `u64`.
fn parse_number(input: &str) -> Result<u64, String>
{
    let trimmed = input.trim().replace('_', "");
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|err| format!("invalid number '{input}': {err}"))
}

/// Parse a 32-bit number, hex or decimal.
pub fn parse_u32(input: &str) -> Result<u32, String>
{
    let value = parse_number(input)?;
    u32::try_from(value).map_err(|_| format!("'{input}' does not fit in 32 bits"))
}

/// Parse a value of the given type.
pub fn parse_value(input: &str, ty: ValueType) -> Result<PokeValue, String>
{
    let out_of_range = |bits: u32| format!("'{input}' does not fit in {bits} bits");
    Ok(match ty {
        ValueType::U8 => PokeValue::from(u8::try_from(parse_number(input)?).map_err(|_| out_of_range(8))?),
        ValueType::U16 => PokeValue::from(u16::try_from(parse_number(input)?).map_err(|_| out_of_range(16))?),
        ValueType::U32 => PokeValue::from(parse_u32(input)?),
        ValueType::U64 => PokeValue::from(parse_number(input)?),
        ValueType::F32 => PokeValue::from(
            input
                .trim()
                .parse::<f32>()
                .map_err(|err| format!("invalid float '{input}': {err}"))?,
        ),
        ValueType::F64 => PokeValue::from(
            input
                .trim()
                .parse::<f64>()
                .map_err(|err| format!("invalid float '{input}': {err}"))?,
        ),
    })
}

/// Parse a hex string such as `deadbeef` or `de ad be ef` into bytes.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, String>
{
    let digits: String = input
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.is_ascii() || digits.len() % 2 != 0 {
        return Err(format!("'{input}' is not an even number of hex digits"));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|err| format!("invalid hex '{input}': {err}")))
        .collect()
}

/// Classic 16-bytes-per-line hex dump with an ASCII column.
pub fn hex_dump(base: u32, data: &[u8]) -> String
{
    let mut out = String::new();
    let mut address = base;
    for line in data.chunks(16) {
        let _ = write!(out, "{address:08x}  ");
        for i in 0..16 {
            match line.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push(' ');
        out.extend(line.iter().map(|b| if b.is_ascii_graphic() || *b == b' ' { char::from(*b) } else { '.' }));
        out.push('\n');
        address = address.wrapping_add(16);
    }
    out
}
