//! Pack a small document, read it back and print it as JSON.
//!
//! cargo run --package mpack --example demo [FILE.mp]
//!
//! With a file argument, every value in the file is read and printed instead.

use std::fs::File;
use std::io::BufReader;

use mpack::encode::{write_map_header, write_str};
use mpack::{Error, Pack, from_reader, from_slice};

fn main() -> Result<(), Error> {
    if let Some(path) = std::env::args().nth(1) {
        let mut src = BufReader::new(File::open(path)?);
        loop {
            match from_reader(&mut src) {
                Ok(value) => println!("{value}"),
                Err(Error::TruncatedStream) => break,
                Err(e) => return Err(e),
            }
        }
        return Ok(());
    }

    // {"compact": true, "schema": 0}
    let mut buf = Vec::new();
    write_map_header(&mut buf, 2)?;
    write_str(&mut buf, "compact")?;
    true.pack(&mut buf)?;
    write_str(&mut buf, "schema")?;
    0i64.pack(&mut buf)?;

    println!("{} bytes: {buf:02x?}", buf.len());
    println!("{}", from_slice(&buf)?);
    Ok(())
}
