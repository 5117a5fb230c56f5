//! Reset the transceiver, ask for its status and print the response.
//!
//! Run with (serial port already configured for 38400 8N1):
//!   cargo run --example send-reset -- /dev/ttyUSB0

use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;

use rfxcom::frame::{FrameReader, FrameWriter};
use rfxcom::{FieldMap, FieldValue, Generator, Session};

fn command(cmnd: &str, seqnbr: u8) -> FieldMap {
    let mut values = FieldMap::new();
    values.insert("eSubtype".into(), "Interface Control".into());
    values.insert("cSeqnbr".into(), FieldValue::Byte(seqnbr));
    values.insert("eCmnd".into(), cmnd.into());
    for i in 1..=9 {
        values.insert(format!("cMsg{i}"), FieldValue::Byte(0));
    }
    values
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: send-reset <serial device>")?;
    let port = OpenOptions::new().read(true).write(true).open(&path)?;

    let registry = Arc::new(rfxcom::builtin::registry()?);
    let generator = Generator::new(Arc::clone(&registry));
    let session = Session::new(registry);

    let mut writer = FrameWriter::new(port.try_clone()?);
    let reset = generator.encode("InterfaceControl", &command("reset", 0))?;
    writer.send_raw(&reset)?;
    writer.flush()?;

    // The device ignores input for a short while after a reset.
    std::thread::sleep(Duration::from_millis(500));

    let get_status = generator.encode("InterfaceControl", &command("get status", 1))?;
    writer.send_raw(&get_status)?;
    writer.flush()?;

    let mut reader = FrameReader::new(port);
    let frame = reader.read_frame()?;
    let message = session.decode_frame(&frame)?;
    println!("{}:", message.schema);
    for (name, value) in &message.fields {
        println!("  {name} = {value}");
    }
    Ok(())
}
