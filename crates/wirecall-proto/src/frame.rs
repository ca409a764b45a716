use bytes::Bytes;
use wirecall_codec::{Result as CodecResult, WireReader, WireWriter};

use crate::code::ResponseCode;

/// A decoded call frame payload: `request_id || route || argument bytes`.
#[derive(Debug, PartialEq, Eq)]
pub struct Call<'a> {
    pub request_id: u64,
    pub route: u64,
    pub args: &'a [u8],
}

/// A decoded response frame payload.
#[derive(Debug, PartialEq)]
pub struct Response<'a> {
    pub request_id: u64,
    pub body: ResponseBody<'a>,
}

#[derive(Debug, PartialEq)]
pub enum ResponseBody<'a> {
    /// Result bytes, handed to the caller's decoder untouched.
    Success(&'a [u8]),
    /// Non-success code plus the peer's error message.
    Failure { code: ResponseCode, message: String },
}

/// Build one call frame payload. The argument writer appends into the same
/// buffer as the header, so the frame is committed as a single unit.
pub fn write_call<F>(request_id: u64, route: u64, args: F) -> CodecResult<Bytes>
where
    F: FnOnce(&mut WireWriter) -> CodecResult<()>,
{
    let mut writer = WireWriter::new();
    writer.put_varint(request_id);
    writer.put_varint(route);
    args(&mut writer)?;
    Ok(writer.freeze())
}

pub fn read_call(payload: &[u8]) -> CodecResult<Call<'_>> {
    let mut reader = WireReader::new(payload);
    let request_id = reader.read_varint()?;
    let route = reader.read_varint()?;
    Ok(Call {
        request_id,
        route,
        args: reader.tail(),
    })
}

/// Build a success response; the result writer appends the result bytes.
pub fn write_ok_response<F>(request_id: u64, result: F) -> CodecResult<Bytes>
where
    F: FnOnce(&mut WireWriter) -> CodecResult<()>,
{
    let mut writer = WireWriter::new();
    writer.put_varint(request_id);
    writer.put_u8(ResponseCode::Success.to_wire());
    result(&mut writer)?;
    Ok(writer.freeze())
}

/// Build a failure response carrying `code` and a length-prefixed message.
pub fn write_err_response(request_id: u64, code: ResponseCode, message: &str) -> Bytes {
    let mut writer = WireWriter::new();
    writer.put_varint(request_id);
    writer.put_u8(code.to_wire());
    writer.put_text(message);
    writer.freeze()
}

pub fn read_response(payload: &[u8]) -> CodecResult<Response<'_>> {
    let mut reader = WireReader::new(payload);
    let request_id = reader.read_varint()?;
    let code = ResponseCode::from_wire(reader.read_u8()?);
    let body = if code.is_success() {
        ResponseBody::Success(reader.tail())
    } else {
        ResponseBody::Failure {
            code,
            message: reader.read_text()?,
        }
    };
    Ok(Response { request_id, body })
}
