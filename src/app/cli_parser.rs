//! This file is used by the build script. Therefore all functions generating the app command line parser must be included
//! here and must not depend on anything but `clap`.

use clap::builder::RangedU64ValueParser;
use clap::{value_parser, Arg, ArgAction, Command};

pub static SUPPORTED_RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "ANAME", "CAA", "CNAME", "HTTPS", "MX", "NS", "PTR", "SOA", "SRV", "SVCB", "TXT",
];

pub static SUPPORTED_OUTPUT_FORMATS: &[&str] = &["summary", "json"];

pub fn create_parser() -> Command {
    Command::new("nsbench")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("nameservers")
                .short('s')
                .long("nameservers")
                .value_name("HOSTNAME | IP ADDR[:PORT],...")
                .help("Sets comma separated list of nameservers to benchmark")
                .long_help(
                    r#"Sets comma separated list of nameservers to benchmark; Google, Cloudflare, and Quad9 are used if none are given. A nameserver is a hostname or IP address and an optional port number; port 53 is used if omitted. IPv6 addresses with port must be enclosed in brackets.
Examples:
* 9.9.9.9 is 9.9.9.9:53
* [2001:4860:4860::8888]:53
* dns.google:53
"#,
                ),
        )
        .arg(
            Arg::new("system-nameservers")
                .long("system-nameservers")
                .action(ArgAction::SetTrue)
                .help("Adds nameservers from /etc/resolv.conf to benchmark"),
        )
        .arg(
            Arg::new("resolv-conf")
                .long("resolv-conf")
                .value_name("FILE")
                .requires("system-nameservers")
                .help("Uses alternative resolv.conf file"),
        )
        .arg(
            Arg::new("domain-source")
                .short('d')
                .long("domain-source")
                .value_name("history | default_list | FILE")
                .default_value("history")
                .help("Sets source of domain names to query")
                .long_help(
                    "Sets source of domain names to query. 'history' uses host names from the Chrome browser history, 'default_list' uses a built-in list of popular domains, and any other value is read as a file with one domain per line. The built-in list is used whenever a source fails or yields no domains.",
                ),
        )
        .arg(
            Arg::new("count")
                .short('c')
                .long("count")
                .value_name("NUMBER")
                .default_value("20")
                .value_parser(value_parser!(usize))
                .help("Sets max. number of domains to query"),
        )
        .arg(
            Arg::new("history-days")
                .long("history-days")
                .value_name("DAYS")
                .default_value("30")
                .value_parser(value_parser!(u32))
                .help("Sets number of days to look back in browser history"),
        )
        .arg(
            Arg::new("record-type")
                .short('t')
                .long("record-type")
                .value_name("RECORD TYPE")
                .default_value("A")
                .help("Sets record type to lookup")
                .long_help(format!(
                    "Sets record type to lookup; common types are {}",
                    SUPPORTED_RECORD_TYPES.join(", ")
                )),
        )
        .arg(
            Arg::new("dnssec")
                .long("dnssec")
                .action(ArgAction::SetTrue)
                .help("Requests extended validation, i.e., EDNS(0) with DNSSEC OK bit"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("NUMBER")
                .default_value("8")
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
                .help("Sets number of concurrent workers sending requests"),
        )
        .arg(
            Arg::new("queue-length")
                .long("queue-length")
                .value_name("NUMBER")
                .default_value("65535")
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
                .help("Sets max. number of pending requests"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .default_value("2")
                .value_parser(value_parser!(u64).range(1..))
                .help("Sets timeout in seconds for responses"),
        )
        .arg(
            Arg::new("reuse-queue")
                .long("reuse-queue")
                .action(ArgAction::SetTrue)
                .help("Shares one set of workers across all nameservers"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FORMAT")
                .default_value("summary")
                .value_parser(SUPPORTED_OUTPUT_FORMATS.to_vec())
                .help("Sets the output format for result presentation"),
        )
        .arg(
            Arg::new("output-options")
                .long("output-options")
                .value_name("OPTIONS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Sets output options")
                .long_help(
                    "* Json: 'pretty': Prettifies output
* Summary: 'details': Lists every query per nameserver (default), 'condensed': Omits query details",
                ),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Does not print anything but results"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Disables colorful output"),
        )
        .arg(
            Arg::new("ascii")
                .long("ascii")
                .action(ArgAction::SetTrue)
                .help("Uses only ASCII compatible characters for output"),
        )
        .arg(
            Arg::new("v")
                .short('v')
                .action(ArgAction::Count)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Uses debug formatting for logging -- much more verbose"),
        )
}
