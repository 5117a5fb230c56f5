use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use bytes::BytesMut;
use rfxcom_frame::{encode_frame, FrameError, FrameReader};
use rfxcom_protocol::Session;

use crate::cmd::{load_registry, DecodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat, schemas: Option<&Path>) -> CliResult<i32> {
    let session = Session::new(Arc::new(load_registry(schemas)?));

    let input: Box<dyn Read> = match &args.file {
        Some(path) if path.as_os_str() == "-" => Box::new(std::io::stdin().lock()),
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            Box::new(file)
        }
        None if args.hex.is_empty() => {
            return Err(CliError::new(USAGE, "provide HEX bytes or --file"));
        }
        None => Box::new(Cursor::new(parse_hex(&args.hex)?)),
    };

    let failures = decode_stream(&session, FrameReader::new(input), format)?;
    if failures > 0 {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

/// Decode and print every frame; returns the number of frames that failed.
fn decode_stream<R: Read>(
    session: &Session,
    mut reader: FrameReader<R>,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut failures = 0usize;
    let mut wire = BytesMut::new();

    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) if err.is_frame_local() => {
                eprintln!("frame error: {err}");
                failures += 1;
                continue;
            }
            Err(err) => return Err(frame_error("read failed", err)),
        };

        match session.decode_frame(&frame) {
            Ok(message) => {
                wire.clear();
                encode_frame(frame.type_code, &frame.payload, &mut wire)
                    .map_err(|err| frame_error("re-encode failed", err))?;
                print_message(&message, &wire, format)?;
            }
            Err(err) => {
                eprintln!("decode error: {err}");
                failures += 1;
            }
        }
    }

    if reader.buffered() > 0 {
        eprintln!("incomplete frame: {} trailing bytes", reader.buffered());
        failures += 1;
    }
    Ok(failures)
}

/// Join hex arguments, ignoring whitespace and `:` separators.
fn parse_hex(args: &[String]) -> CliResult<Vec<u8>> {
    let digits: String = args
        .iter()
        .flat_map(|arg| arg.chars())
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits)
        .map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}
