//! Decode a raw capture of transceiver output and print temperature readings.
//!
//! Run with:
//!   cargo run --example decode-capture -- capture.bin
//!
//! Without an argument a short built-in capture is decoded.

use std::io::Read;
use std::sync::Arc;

use rfxcom::{FieldMap, FieldValue, Session};

const SAMPLE: &[u8] = b"\x14\x01\x07\x00\x07Copyright RFXCOM\x08\x50\x02\x11\x70\x02\x00\xa7\x69";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let capture = match std::env::args().nth(1) {
        Some(path) => std::fs::read(path)?,
        None => SAMPLE.to_vec(),
    };

    let mut session = Session::new(Arc::new(rfxcom::builtin::registry()?));
    session.register_handler("Temperature", |fields: &FieldMap| {
        let field = |name: &str| fields.get(name).and_then(FieldValue::as_byte);
        let byte = |name: &str| field(name).unwrap_or(0);
        let (id1, id2) = (byte("cId1"), byte("cId2"));
        let high = byte("cTemperatureHigh");
        let tenths = u16::from(high & 0x7f) << 8 | u16::from(byte("cTemperatureLow"));
        let sign = if high & 0x80 != 0 { "-" } else { "" };
        let (whole, fraction) = (tenths / 10, tenths % 10);
        println!("sensor {id1:02x}{id2:02x}: {sign}{whole}.{fraction} C");
    });
    session.set_default_handler(|schema: &str, _: &FieldMap| {
        println!("{schema}");
    });

    // Feed in small chunks, as a serial port would deliver them.
    let mut input = capture.as_slice();
    let mut chunk = [0u8; 7];
    let mut dispatched = 0;
    loop {
        let read = input.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        dispatched += session.receive(&chunk[..read]);
    }

    let left_over = session.buffered();
    eprintln!("{dispatched} messages, {left_over} bytes left over");
    Ok(())
}
