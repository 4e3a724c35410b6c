//! Nameservers benchmarked if none are given.

use crate::nameserver::{NameServerConfig, NameServerConfigGroup};

pub fn name_server_configs() -> Vec<NameServerConfig> {
    vec![google::udp(), cloudflare::udp(), quad9::udp()]
}

pub fn name_server_config_group() -> NameServerConfigGroup {
    NameServerConfigGroup::new(name_server_configs())
}

pub mod google {
    use std::net::Ipv4Addr;

    use crate::nameserver::NameServerConfig;

    static IPV4: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

    pub fn udp() -> NameServerConfig {
        NameServerConfig::udp_with_name((IPV4, 53), "Google".to_string())
    }
}

pub mod cloudflare {
    use std::net::Ipv4Addr;

    use crate::nameserver::NameServerConfig;

    static IPV4: Ipv4Addr = Ipv4Addr::new(1, 1, 1, 1);

    pub fn udp() -> NameServerConfig {
        NameServerConfig::udp_with_name((IPV4, 53), "Cloudflare".to_string())
    }
}

pub mod quad9 {
    use std::net::Ipv4Addr;

    use crate::nameserver::NameServerConfig;

    static IPV4: Ipv4Addr = Ipv4Addr::new(9, 9, 9, 9);

    pub fn udp() -> NameServerConfig {
        NameServerConfig::udp_with_name((IPV4, 53), "Quad9".to_string())
    }
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;

    #[test]
    fn defaults_in_order() {
        let strs: Vec<_> = name_server_configs().iter().map(ToString::to_string).collect();

        assert_that(&strs).is_equal_to(vec![
            "8.8.8.8:53".to_string(),
            "1.1.1.1:53".to_string(),
            "9.9.9.9:53".to_string(),
        ]);
    }
}
