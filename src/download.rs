use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;

use crate::error::{Error, Result};

/// Unwraps a gzip-framed body (gzip header around raw deflate) and decodes
/// the JSON inside.
pub(crate) fn decode_gzip_json(body: &[u8], uri: &str) -> Result<Value> {
    let mut text = String::new();
    GzDecoder::new(body)
        .read_to_string(&mut text)
        .map_err(|source| {
            let err = Error::Io {
                uri: uri.to_string(),
                source,
            };
            log::error!("{err}");
            err
        })?;

    serde_json::from_str(&text).map_err(|source| {
        let err = Error::Json {
            uri: uri.to_string(),
            source,
        };
        log::error!("{err}");
        err
    })
}

#[cfg(test)]
pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).expect("write to memory");
    enc.finish().expect("finish gzip stream")
}
