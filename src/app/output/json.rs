// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::collections::HashSet;

use super::*;

#[derive(Debug, Default)]
pub struct JsonOptions {
    /// Pretty formatting
    pretty: bool,
}

impl JsonOptions {
    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

#[derive(Debug, Default)]
pub struct JsonFormat {
    opts: JsonOptions,
}

impl JsonFormat {
    pub fn new(opts: JsonOptions) -> JsonFormat {
        JsonFormat { opts }
    }
}

impl<'a> TryFrom<Vec<&'a str>> for JsonOptions {
    type Error = Error;

    fn try_from(values: Vec<&'a str>) -> std::result::Result<Self, Self::Error> {
        let options: HashSet<&str> = values.into_iter().collect();
        if let Some(unknown) = options.iter().find(|x| **x != "pretty") {
            return Err(Error::ParserError {
                what: unknown.to_string(),
                to: "JsonOptions",
                why: "unsupported json option".to_string(),
            });
        }

        Ok(JsonOptions {
            pretty: options.contains("pretty"),
        })
    }
}

impl<T: Serialize> OutputFormat<T> for JsonFormat {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        if self.opts.pretty {
            serde_json::to_writer_pretty(&mut *writer, data)?;
        } else {
            serde_json::to_writer(&mut *writer, data)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
