use ewallet::Result;

use serde::Serialize;
use serde_json::Value;

/// What a single invocation prints: the status code it maps to and the response body
#[derive(Serialize, Debug)]
pub struct Envelope {
    pub status_code: u16,
    pub body: Value,
}

impl Envelope {
    pub fn new(status_code: u16, body: &impl Serialize) -> Result<Self> {
        let body = serde_json::to_value(body)?;

        return Ok(Self { status_code, body });
    }

    pub fn is_success(&self) -> bool {
        return self.status_code == 200;
    }
}

pub fn write_to_string(envelope: &Envelope) -> Result<String> {
    let string = serde_json::to_string(envelope)?;
    return Ok(string);
}
