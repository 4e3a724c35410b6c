// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::collections::HashSet;

use tabwriter::TabWriter;
use yansi::Paint;

use super::*;
use crate::app::output::styles::{self, caption_prefix, itemization_prefix};

#[derive(Debug)]
pub struct SummaryOptions {
    /// List every query per nameserver
    details: bool,
}

impl SummaryOptions {
    pub fn new(details: bool) -> SummaryOptions {
        SummaryOptions { details }
    }

    pub fn details(&self) -> bool {
        self.details
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions { details: true }
    }
}

impl<'a> TryFrom<Vec<&'a str>> for SummaryOptions {
    type Error = Error;

    fn try_from(values: Vec<&'a str>) -> std::result::Result<Self, Self::Error> {
        let options: HashSet<&str> = values.into_iter().collect();
        if let Some(unknown) = options.iter().find(|x| !matches!(**x, "details" | "condensed")) {
            return Err(Error::ParserError {
                what: unknown.to_string(),
                to: "SummaryOptions",
                why: "unsupported summary option".to_string(),
            });
        }

        Ok(SummaryOptions {
            details: !options.contains("condensed"),
        })
    }
}

#[derive(Debug, Default)]
pub struct SummaryFormat {
    opts: SummaryOptions,
}

impl SummaryFormat {
    pub fn new(opts: SummaryOptions) -> SummaryFormat {
        SummaryFormat { opts }
    }

    pub fn opts(&self) -> &SummaryOptions {
        &self.opts
    }
}

pub trait SummaryFormatter {
    fn output<W: Write>(&self, writer: &mut W, opts: &SummaryOptions) -> Result<()>;
}

impl<T: SummaryFormatter> OutputFormat<T> for SummaryFormat {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        data.output(writer, &self.opts)
    }
}

impl SummaryFormatter for BenchmarkReport<'_> {
    fn output<W: Write>(&self, writer: &mut W, opts: &SummaryOptions) -> Result<()> {
        for summary in self.ranking().summaries() {
            output_name_server(writer, summary, opts)?;
        }
        if self.extended_validation() {
            output_extended_validation_note(writer, self.ranking())?;
        }
        output_ranking(writer, self.ranking())?;

        Ok(())
    }
}

fn output_name_server<W: Write>(writer: &mut W, summary: &NameServerSummary, opts: &SummaryOptions) -> Result<()> {
    writeln!(
        writer,
        "{}",
        format!("{} {}", caption_prefix(), name_server_label(summary)).paint(styles::EMPH)
    )?;

    let mut tw = TabWriter::new(vec![]);
    if opts.details() {
        for result in summary.results() {
            writeln!(
                tw,
                " {} {}\t{}\t{}",
                itemization_prefix(),
                result.job().name(),
                format_ms(result.elapsed()),
                result_description(result)
            )?;
        }
    }
    writeln!(
        tw,
        " {} Average\t{}\t{}/{} successful",
        itemization_prefix(),
        summary.mean_latency().map(format_ms).unwrap_or_else(|| "N/A".to_string()),
        summary.successful(),
        summary.attempted()
    )?;
    write_tabwriter(writer, tw)?;
    writeln!(writer)?;

    Ok(())
}

fn output_extended_validation_note<W: Write>(writer: &mut W, ranking: &Ranking) -> Result<()> {
    let degraded: Vec<String> = ranking
        .summaries()
        .iter()
        .filter(|x| x.results().iter().any(QueryResult::is_degraded))
        .map(|x| x.name_server().to_string())
        .collect();
    if degraded.is_empty() {
        writeln!(writer, "Extended validation (DNSSEC) has been requested from all nameservers.")?;
    } else {
        writeln!(
            writer,
            "{} Extended validation (DNSSEC) has been requested, but not supported by {}.",
            styles::attention_prefix().paint(styles::ATTENTION),
            degraded.join(", ")
        )?;
    }
    writeln!(writer)?;

    Ok(())
}

fn output_ranking<W: Write>(writer: &mut W, ranking: &Ranking) -> Result<()> {
    writeln!(writer, "{}", format!("{} Ranking", caption_prefix()).paint(styles::EMPH))?;

    let mut tw = TabWriter::new(vec![]);
    for (rank, summary) in ranking.ranked().enumerate() {
        writeln!(
            tw,
            " {}.\t{}\t{}\t{}/{}",
            rank + 1,
            name_server_label(summary),
            summary.mean_latency().map(format_ms).unwrap_or_else(|| "N/A".to_string()),
            summary.successful(),
            summary.attempted()
        )?;
    }
    write_tabwriter(writer, tw)?;

    let fastest = ranking.fastest();
    if fastest.is_empty() {
        writeln!(
            writer,
            "{} No nameserver answered any query.",
            styles::error_prefix().paint(styles::ERROR)
        )?;
    } else {
        let fastest: Vec<_> = fastest.iter().map(|x| name_server_label(x)).collect();
        writeln!(
            writer,
            "{} Fastest: {}",
            styles::ok_prefix().paint(styles::OK),
            fastest.join(", ")
        )?;
    }

    Ok(())
}

fn write_tabwriter<W: Write>(writer: &mut W, tw: TabWriter<Vec<u8>>) -> Result<()> {
    let text_buffer = tw.into_inner().map_err(|_| Error::InternalError {
        msg: "finish TabWriter buffer",
    })?;
    let out = String::from_utf8(text_buffer).map_err(|_| Error::InternalError {
        msg: "convert TabWriter buffer to output",
    })?;
    write!(writer, "{}", out)?;

    Ok(())
}

fn name_server_label(summary: &NameServerSummary) -> String {
    match summary.name_server().name() {
        Some(name) => format!("{} ({})", summary.name_server(), name),
        None => summary.name_server().to_string(),
    }
}

fn result_description(result: &QueryResult) -> String {
    if let Some(failure) = result.failure() {
        return format!("Err: {}", failure);
    }
    let answers = match result.answers().len() {
        1 => "1 answer".to_string(),
        n => format!("{} answers", n),
    };
    let response_code = result.response_code().unwrap_or("-");
    if result.is_degraded() {
        format!("{}, {}, no EDNS", response_code, answers)
    } else {
        format!("{}, {}", response_code, answers)
    }
}

fn format_ms(duration: Duration) -> String {
    format!("{:.2} ms", duration.as_secs_f64() * 1000.0)
}
