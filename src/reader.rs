use ewallet::Result;

use std::io::{self, Read};

/// Returns the request body, reading it from stdin when the argument is `-`
pub fn read_body(arg: String) -> Result<String> {
    if arg != "-" {
        return Ok(arg);
    }

    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;

    return Ok(body);
}
