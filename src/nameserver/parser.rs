use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::digit1;
use nom::combinator::{eof, map, map_res, opt};
use nom::sequence::{delimited, preceded};
use nom::IResult;

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedNameServer<'a> {
    pub(crate) target: Target<'a>,
    pub(crate) port: Option<u16>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Target<'a> {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Name(&'a str),
}

/// Parses `host[:port]`
///
/// A bare IPv6 address cannot carry a port; use the bracketed form `[::1]:5353` instead.
pub(crate) fn parsed_name_server(input: &str) -> IResult<&str, ParsedNameServer> {
    let (input, target) = alt((bracketed_ipv6, bare_ipv6, host))(input)?;
    let (input, port) = opt(preceded(tag(":"), port))(input)?;
    let (input, _) = eof(input)?;

    Ok((input, ParsedNameServer { target, port }))
}

fn bracketed_ipv6(input: &str) -> IResult<&str, Target> {
    map(
        delimited(tag("["), map_res(take_while1(is_ipv6_char), Ipv6Addr::from_str), tag("]")),
        Target::Ipv6,
    )(input)
}

fn bare_ipv6(input: &str) -> IResult<&str, Target> {
    map(map_res(take_while1(is_ipv6_char), Ipv6Addr::from_str), Target::Ipv6)(input)
}

fn host(input: &str) -> IResult<&str, Target> {
    let (input, host) = take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')(input)?;
    let target = match Ipv4Addr::from_str(host) {
        Ok(ip) => Target::Ipv4(ip),
        Err(_) => Target::Name(host),
    };

    Ok((input, target))
}

fn port(input: &str) -> IResult<&str, u16> {
    map_res(digit1, u16::from_str)(input)
}

fn is_ipv6_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c == ':' || c == '.'
}
