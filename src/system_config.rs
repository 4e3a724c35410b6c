use std::fs::File;
use std::io::Read;
use std::path::Path;

use resolv_conf::Config;

use crate::{Error, Result};

pub static DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";

pub fn load_from_system_config<T: From<Config>>() -> Result<T> {
    load_from_system_config_path(DEFAULT_RESOLV_CONF)
}

pub fn load_from_system_config_path<P: AsRef<Path>, T: From<Config>>(path: P) -> Result<T> {
    let mut buf = Vec::with_capacity(4096);
    let mut f = File::open(path.as_ref())?;
    f.read_to_end(&mut buf)?;
    parse(&buf)
}

fn parse<T: From<Config>>(buf: &[u8]) -> Result<T> {
    let cfg = Config::parse(buf).map_err(|e| Error::ParserError {
        what: "resolv.conf".to_string(),
        to: "resolv_conf::Config",
        why: e.to_string(),
    })?;

    Ok(cfg.into())
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;
    use crate::nameserver::NameServerConfigGroup;

    #[test]
    fn nameservers_from_resolv_conf() {
        let resolv_conf = b"# comment\nnameserver 192.168.0.1\nnameserver ::1\nsearch example.com\n";

        let group: NameServerConfigGroup = parse(resolv_conf).unwrap();
        let strs: Vec<_> = group.iter().map(ToString::to_string).collect();

        assert_that(&strs).is_equal_to(vec!["192.168.0.1:53".to_string(), "[::1]:53".to_string()]);
        assert_that(&group.iter().next().and_then(|x| x.name())).is_some().is_equal_to("System");
    }

    #[test]
    fn missing_file() {
        let res: Result<NameServerConfigGroup> = load_from_system_config_path("/this/path/does/not/exist");

        assert_that(&res).is_err();
    }
}
